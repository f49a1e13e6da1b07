// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Architecture Abstraction Layer (AAL) for atomics
//!
//! This module defines the traits every atomics backend implements so that
//! the rest of the kernel sees one contract on ARMv5, ARMv7, AArch64, x86 and
//! x86-64.
//!
//! A backend is a zero-sized type. [`ArchAtomics`] carries what is common to
//! the whole backend (its width table, fence, and the two word-sized
//! operations the spin lock is built from), and [`AtomicOps`] is implemented
//! once per operand representation the backend supports. A width without an
//! `AtomicOps` impl simply does not compile.

use core::cell::UnsafeCell;

use crate::kernel::atomic::generic;
use crate::kernel::atomic::repr::{AtomicRepr, WordRepr};
use crate::kernel::atomic::width::Widths;

/// Architecture interrupt masking on the current CPU
///
/// Only the emulating backends consume this. Masking interrupts excludes
/// interrupt handlers on the same core and nothing else.
pub trait ArchInterrupts {
    /// Mask interrupts
    ///
    /// # Returns
    ///
    /// `true` if interrupts were enabled before the call
    fn disable() -> bool;

    /// Unmask interrupts if `was_enabled` says they were enabled before the
    /// matching [`disable`](Self::disable)
    fn enable_if(was_enabled: bool);
}

/// Full memory barrier
pub trait ArchBarrier {
    /// Emit one full (load and store) barrier instruction
    fn fence();
}

/// Strategy a backend uses to reach atomicity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Hardware compare-and-swap and fetch-and-add
    NativeCas,

    /// Load-exclusive / store-exclusive retry loops
    ExclusivePair,

    /// Raw swap instruction plus interrupt masking; one core only
    SingleCore,

    /// Every operation serialized through one global lock
    GlobalLock,
}

/// Backend-wide atomics interface
pub trait ArchAtomics: ArchBarrier + Sized + 'static {
    /// Human readable backend name
    const NAME: &'static str;

    /// How this backend is built
    const KIND: BackendKind;

    /// Widths with a native atomic instruction
    const LOCK_FREE: Widths;

    /// Widths available at all, natively or emulated
    const IMPLEMENTED: Widths;

    /// Interrupt control on this architecture
    type Interrupts: ArchInterrupts;

    /// One-time backend setup, run from `arch_init()` before any atomic use
    /// on a secondary CPU
    fn init() {}

    /// Swap `new_value` into a lock word and return the previous value.
    fn test_set_lock(lock: &UnsafeCell<WordRepr>, new_value: WordRepr) -> WordRepr;

    /// Store to a lock word without going through any lock this backend owns.
    ///
    /// This is the only store a mutual-exclusion primitive may use to release
    /// itself. On the global-lock backend it masks interrupts instead of
    /// taking the global lock and is therefore only correct on one core.
    fn privileged_store(lock: &UnsafeCell<WordRepr>, value: WordRepr);
}

/// Atomic operations on one operand representation
///
/// Every operation is sequentially consistent.
pub trait AtomicOps<R: AtomicRepr>: ArchAtomics {
    /// Whether this width uses a native instruction
    const IS_LOCK_FREE: bool = <Self as ArchAtomics>::LOCK_FREE.contains(R::WIDTH);

    /// Read the target
    fn load(target: &UnsafeCell<R>) -> R;

    /// Write the target
    fn store(target: &UnsafeCell<R>, value: R);

    /// Swap `value` in and return the previous contents
    fn exchange(target: &UnsafeCell<R>, value: R) -> R;

    /// If the target equals `*expected`, replace it with `desired` and return
    /// `true`. Otherwise copy the current value into `*expected` and return
    /// `false`.
    fn compare_exchange(target: &UnsafeCell<R>, expected: &mut R, desired: R) -> bool;

    /// Add `value` and return the previous contents
    fn fetch_add(target: &UnsafeCell<R>, value: R) -> R {
        generic::cas_fetch_add::<Self, R>(target, value)
    }
}
