// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Rustux Atomics
//!
//! Portable atomic memory operations for the Rustux kernel. Every supported
//! CPU gets the same contract (load, store, exchange, compare-exchange, the
//! fetch-and-modify family, test-and-set and a full fence), all with
//! sequentially consistent ordering. How each operation reaches the hardware
//! is decided at build time by the architecture backend in [`kernel::arch`].
//!
//! # Usage
//!
//! ```rust
//! use rustux_atomics::Atomic;
//!
//! let next_fd = Atomic::new(3usize);
//! assert_eq!(next_fd.fetch_add(1), 3);
//! assert_eq!(next_fd.load(), 4);
//! ```
//!
//! Widths the active backend cannot provide are rejected by the compiler:
//!
//! ```compile_fail
//! use rustux_atomics::Atomic;
//!
//! let wide = Atomic::new(0u128);
//! ```

#![cfg_attr(not(test), no_std)]

pub mod err;

#[macro_use]
pub mod kernel;

pub use kernel::arch::{Arch, ArchAtomics, AtomicOps};
pub use kernel::atomic::{
    fence, is_implemented, is_lock_free, AllowAtomic, AllowAtomicArithmetic, Atomic, AtomicFlag,
};
pub use kernel::sync::spin::{RawSpinLock, SpinLock};

/// Bring up the atomics layer for the running architecture.
///
/// Must run on the boot CPU before secondary CPUs start using atomics.
pub fn init() {
    kernel::init();
}
