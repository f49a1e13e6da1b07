// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! ARMv7 atomics
//!
//! Exchange and compare-exchange are `ldrex` / `strex` retry loops in byte,
//! halfword and word forms. A `strex` that reports failure (non-zero status)
//! always retries from the load. `dmb sy` around every operation makes them
//! sequentially consistent.

use core::arch::asm;
use core::cell::UnsafeCell;

use super::interrupts::ArmInterrupts;
use crate::kernel::arch::plain::{fenced_load, fenced_store};
use crate::kernel::arch::{ArchAtomics, ArchBarrier, AtomicOps, BackendKind};
use crate::kernel::atomic::repr::WordRepr;
use crate::kernel::atomic::width::Widths;

/// ARMv7 exclusive-pair backend
pub struct Armv7Atomics;

impl ArchBarrier for Armv7Atomics {
    #[inline(always)]
    fn fence() {
        // SAFETY: `dmb sy` has no operands and only orders memory accesses.
        unsafe {
            asm!("dmb sy", options(nostack, preserves_flags));
        }
    }
}

impl ArchAtomics for Armv7Atomics {
    const NAME: &'static str = "armv7 ldrex/strex";
    const KIND: BackendKind = BackendKind::ExclusivePair;
    const LOCK_FREE: Widths = Widths::W8.union(Widths::W16).union(Widths::W32);
    const IMPLEMENTED: Widths = Self::LOCK_FREE;

    type Interrupts = ArmInterrupts;

    #[inline]
    fn test_set_lock(lock: &UnsafeCell<WordRepr>, new_value: WordRepr) -> WordRepr {
        <Self as AtomicOps<WordRepr>>::exchange(lock, new_value)
    }

    #[inline]
    fn privileged_store(lock: &UnsafeCell<WordRepr>, value: WordRepr) {
        <Self as AtomicOps<WordRepr>>::store(lock, value)
    }
}

// Operands travel in full registers; the narrow loads zero-extend, so the
// comparison against a zero-extended `expected` is exact.
macro_rules! armv7_atomic_ops {
    ($ty:ty, $suffix:tt) => {
        impl AtomicOps<$ty> for Armv7Atomics {
            #[inline(always)]
            fn load(target: &UnsafeCell<$ty>) -> $ty {
                fenced_load::<Self, $ty>(target)
            }

            #[inline(always)]
            fn store(target: &UnsafeCell<$ty>, value: $ty) {
                fenced_store::<Self, $ty>(target, value)
            }

            #[inline(always)]
            fn exchange(target: &UnsafeCell<$ty>, value: $ty) -> $ty {
                let previous: u32;
                Self::fence();
                // SAFETY: `target.get()` is a valid, aligned `$ty`.
                unsafe {
                    asm!(
                        concat!("2: ldrex", $suffix, " {prev}, [{ptr}]"),
                        concat!("strex", $suffix, " {status}, {val}, [{ptr}]"),
                        "cmp {status}, #0",
                        "bne 2b",
                        prev = out(reg) previous,
                        status = out(reg) _,
                        val = in(reg) value as u32,
                        ptr = in(reg) target.get(),
                        options(nostack),
                    );
                }
                Self::fence();
                previous as $ty
            }

            #[inline(always)]
            fn compare_exchange(target: &UnsafeCell<$ty>, expected: &mut $ty, desired: $ty) -> bool {
                let actual: u32;
                Self::fence();
                // SAFETY: `target.get()` is a valid, aligned `$ty`. The mismatch
                // path drops the exclusive monitor with `clrex`.
                unsafe {
                    asm!(
                        concat!("2: ldrex", $suffix, " {actual}, [{ptr}]"),
                        "cmp {actual}, {expected}",
                        "bne 3f",
                        concat!("strex", $suffix, " {status}, {desired}, [{ptr}]"),
                        "cmp {status}, #0",
                        "bne 2b",
                        "b 4f",
                        "3: clrex",
                        "4:",
                        actual = out(reg) actual,
                        status = out(reg) _,
                        expected = in(reg) *expected as u32,
                        desired = in(reg) desired as u32,
                        ptr = in(reg) target.get(),
                        options(nostack),
                    );
                }
                Self::fence();

                let actual = actual as $ty;
                if actual == *expected {
                    true
                } else {
                    *expected = actual;
                    false
                }
            }
        }
    };
}

armv7_atomic_ops!(u8, "b");
armv7_atomic_ops!(u16, "h");
armv7_atomic_ops!(u32, "");
