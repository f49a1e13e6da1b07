// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! ARM64 atomics
//!
//! Acquire/release exclusive pairs (`ldaxr` / `stlxr`) in byte, halfword,
//! word and doubleword forms, with `dmb sy` on both sides so every operation
//! is sequentially consistent. A failed store-exclusive retries from the
//! load.

use core::arch::asm;
use core::cell::UnsafeCell;

use aarch64_cpu::asm::barrier;

use super::interrupts::Arm64Interrupts;
use crate::kernel::arch::plain::{fenced_load, fenced_store};
use crate::kernel::arch::{ArchAtomics, ArchBarrier, AtomicOps, BackendKind};
use crate::kernel::atomic::repr::WordRepr;
use crate::kernel::atomic::width::Widths;

/// ARM64 exclusive-pair backend
pub struct Arm64Atomics;

impl ArchBarrier for Arm64Atomics {
    #[inline(always)]
    fn fence() {
        // SAFETY: a full-system data memory barrier has no side effects
        // beyond ordering.
        unsafe {
            barrier::dmb(barrier::SY);
        }
    }
}

impl ArchAtomics for Arm64Atomics {
    const NAME: &'static str = "arm64 ldaxr/stlxr";
    const KIND: BackendKind = BackendKind::ExclusivePair;
    const LOCK_FREE: Widths = Widths::all();
    const IMPLEMENTED: Widths = Widths::all();

    type Interrupts = Arm64Interrupts;

    #[inline]
    fn test_set_lock(lock: &UnsafeCell<WordRepr>, new_value: WordRepr) -> WordRepr {
        <Self as AtomicOps<WordRepr>>::exchange(lock, new_value)
    }

    #[inline]
    fn privileged_store(lock: &UnsafeCell<WordRepr>, value: WordRepr) {
        <Self as AtomicOps<WordRepr>>::store(lock, value)
    }
}

// `$s` is the size suffix, `$r` the register view (`w` or `x`) and `$op` the
// register-sized type operands are carried in. Narrow exclusive loads
// zero-extend, so comparing against a zero-extended `expected` is exact.
macro_rules! arm64_atomic_ops {
    ($ty:ty, $s:tt, $r:tt, $op:ty) => {
        impl AtomicOps<$ty> for Arm64Atomics {
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
                let previous: $op;
                Self::fence();
                // SAFETY: `target.get()` is a valid, aligned `$ty`.
                unsafe {
                    asm!(
                        concat!("2: ldaxr", $s, " {prev:", $r, "}, [{ptr}]"),
                        concat!("stlxr", $s, " {status:w}, {val:", $r, "}, [{ptr}]"),
                        "cbnz {status:w}, 2b",
                        prev = out(reg) previous,
                        status = out(reg) _,
                        val = in(reg) value as $op,
                        ptr = in(reg) target.get(),
                        options(nostack, preserves_flags),
                    );
                }
                Self::fence();
                previous as $ty
            }

            #[inline(always)]
            fn compare_exchange(target: &UnsafeCell<$ty>, expected: &mut $ty, desired: $ty) -> bool {
                let actual: $op;
                Self::fence();
                // SAFETY: `target.get()` is a valid, aligned `$ty`. The mismatch
                // path drops the exclusive monitor with `clrex`.
                unsafe {
                    asm!(
                        concat!("2: ldaxr", $s, " {actual:", $r, "}, [{ptr}]"),
                        concat!("cmp {actual:", $r, "}, {expected:", $r, "}"),
                        "b.ne 3f",
                        concat!("stlxr", $s, " {status:w}, {desired:", $r, "}, [{ptr}]"),
                        "cbnz {status:w}, 2b",
                        "b 4f",
                        "3: clrex",
                        "4:",
                        actual = out(reg) actual,
                        status = out(reg) _,
                        expected = in(reg) *expected as $op,
                        desired = in(reg) desired as $op,
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

arm64_atomic_ops!(u8, "b", "w", u32);
arm64_atomic_ops!(u16, "h", "w", u32);
arm64_atomic_ops!(u32, "", "w", u32);
arm64_atomic_ops!(u64, "", "x", u64);
