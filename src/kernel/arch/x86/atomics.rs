// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! x86 / x86-64 atomics
//!
//! Native compare-and-swap and fetch-and-add: `xchg`, `lock cmpxchg` and
//! `lock xadd` map the primitives almost one to one. Locked instructions are
//! full barriers on x86, so only plain loads and stores need `mfence` around
//! them. AND, OR and XOR have no fetching instruction and use the generic
//! compare-exchange loop.

use core::arch::asm;
use core::cell::UnsafeCell;

use super::interrupts::X86Interrupts;
use crate::kernel::arch::emulated::{ArchSwap, SwapInsn};
use crate::kernel::arch::plain::{fenced_load, fenced_store};
use crate::kernel::arch::{ArchAtomics, ArchBarrier, AtomicOps, BackendKind};
use crate::kernel::atomic::repr::WordRepr;
use crate::kernel::atomic::width::Widths;

/// Native x86 backend
pub struct X86Atomics;

impl ArchBarrier for X86Atomics {
    #[inline(always)]
    fn fence() {
        // SAFETY: `mfence` has no operands and only orders memory accesses.
        unsafe {
            asm!("mfence", options(nostack, preserves_flags));
        }
    }
}

impl ArchAtomics for X86Atomics {
    const NAME: &'static str = "x86 native cmpxchg/xadd";
    const KIND: BackendKind = BackendKind::NativeCas;
    const LOCK_FREE: Widths = Widths::native_words();
    const IMPLEMENTED: Widths = Widths::native_words();

    type Interrupts = X86Interrupts;

    #[inline]
    fn test_set_lock(lock: &UnsafeCell<WordRepr>, new_value: WordRepr) -> WordRepr {
        <Self as AtomicOps<WordRepr>>::exchange(lock, new_value)
    }

    #[inline]
    fn privileged_store(lock: &UnsafeCell<WordRepr>, value: WordRepr) {
        <Self as AtomicOps<WordRepr>>::store(lock, value)
    }
}

// `$class` is the register class for the operand and `$acc` the accumulator
// register `cmpxchg` compares against; `$m` is the template modifier that
// names the right sub-register for the width.
macro_rules! x86_atomic_ops {
    ($ty:ty, $class:ident, $acc:tt, $m:tt) => {
        impl AtomicOps<$ty> for X86Atomics {
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
                let mut value = value;
                // SAFETY: `target.get()` is a valid, aligned `$ty`. `xchg` with a
                // memory operand is implicitly locked.
                unsafe {
                    asm!(
                        concat!("xchg [{ptr}], {val", $m, "}"),
                        ptr = in(reg) target.get(),
                        val = inout($class) value,
                        options(nostack, preserves_flags),
                    );
                }
                value
            }

            #[inline(always)]
            fn compare_exchange(target: &UnsafeCell<$ty>, expected: &mut $ty, desired: $ty) -> bool {
                let ok: u8;
                // SAFETY: `target.get()` is a valid, aligned `$ty`. On mismatch
                // `cmpxchg` loads the current value into the accumulator, which
                // is exactly the refreshed `expected`.
                unsafe {
                    asm!(
                        concat!("lock cmpxchg [{ptr}], {desired", $m, "}"),
                        "sete {ok}",
                        ptr = in(reg) target.get(),
                        desired = in($class) desired,
                        ok = out(reg_byte) ok,
                        inout($acc) *expected,
                        options(nostack),
                    );
                }
                ok != 0
            }

            #[inline(always)]
            fn fetch_add(target: &UnsafeCell<$ty>, value: $ty) -> $ty {
                let mut value = value;
                // SAFETY: `target.get()` is a valid, aligned `$ty`.
                unsafe {
                    asm!(
                        concat!("lock xadd [{ptr}], {val", $m, "}"),
                        ptr = in(reg) target.get(),
                        val = inout($class) value,
                        options(nostack),
                    );
                }
                value
            }
        }

        impl SwapInsn<$ty> for X86Atomics {
            #[inline(always)]
            fn swap(target: &UnsafeCell<$ty>, value: $ty) -> $ty {
                <Self as AtomicOps<$ty>>::exchange(target, value)
            }
        }
    };
}

x86_atomic_ops!(u8, reg_byte, "al", "");
x86_atomic_ops!(u16, reg, "ax", ":x");
x86_atomic_ops!(u32, reg, "eax", ":e");
#[cfg(target_arch = "x86_64")]
x86_atomic_ops!(u64, reg, "rax", ":r");

impl ArchSwap for X86Atomics {
    const SWAP_WIDTHS: Widths = Widths::native_words();
}
