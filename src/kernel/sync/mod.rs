// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Kernel Synchronization Primitives
//!
//! The exclusion primitive built directly on the atomics layer. It only
//! needs the lock-word pair (`test_set_lock` / `privileged_store`), so it
//! works on every backend and backs the global-lock backend itself.

pub mod spin;

// Re-exports
pub use spin::*;
