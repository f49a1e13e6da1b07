// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! ARM64 support
//!
//! The exclusive-pair backend is used directly in guest builds (the
//! `virtualized` feature). Bare-metal builds wrap it in the global-lock
//! emulation, which only borrows its barrier and width table.

pub mod atomics;
pub mod interrupts;

pub use atomics::Arm64Atomics;
pub use interrupts::Arm64Interrupts;
