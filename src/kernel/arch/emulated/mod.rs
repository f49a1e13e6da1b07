// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Emulated atomics
//!
//! Backends for CPUs (or configurations) without a usable compare-and-swap:
//!
//! - [`SingleCore`] makes each operation atomic by masking interrupts on a
//!   uniprocessor, and uses the CPU's raw swap instruction for the lock word.
//! - [`GlobalLock`] serializes every operation through one process-wide spin
//!   lock.
//!
//! Both are generic over the interrupt controller and the underlying CPU
//! operations, so the host build can run them on top of the native x86
//! backend.

use core::cell::UnsafeCell;

use super::ArchBarrier;
use crate::kernel::atomic::repr::AtomicRepr;
use crate::kernel::atomic::width::Widths;

pub mod global_lock;
pub mod single_core;

pub use global_lock::GlobalLock;
pub use single_core::SingleCore;

/// A CPU with an unconditional swap instruction
pub trait ArchSwap: ArchBarrier + 'static {
    /// Widths the swap instruction handles
    const SWAP_WIDTHS: Widths;
}

/// The swap instruction for one representation
pub trait SwapInsn<R: AtomicRepr>: ArchSwap {
    /// Atomically store `value` and return what was there before.
    ///
    /// No barriers are implied.
    fn swap(target: &UnsafeCell<R>, value: R) -> R;
}
