// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! ARMv5 atomics
//!
//! The only atomic read-modify-write is `swp` (word) / `swpb` (byte), so
//! halfwords are not available at all and everything beyond a swap runs on
//! the single-core emulation.

use core::arch::asm;
use core::cell::UnsafeCell;

use super::interrupts::ArmInterrupts;
use crate::kernel::arch::emulated::{ArchSwap, SingleCore, SwapInsn};
use crate::kernel::arch::ArchBarrier;
use crate::kernel::atomic::width::Widths;

/// ARMv5 CPU operations
pub struct Armv5;

/// The ARMv5 atomics backend
pub type Armv5Atomics = SingleCore<ArmInterrupts, Armv5>;

impl ArchBarrier for Armv5 {
    #[inline(always)]
    fn fence() {
        // SAFETY: CP15 c7, c10, 4 is the ARMv5 data synchronization barrier;
        // it takes a should-be-zero register and has no other effect.
        unsafe {
            asm!(
                "mcr p15, 0, {zero}, c7, c10, 4",
                zero = in(reg) 0u32,
                options(nostack, preserves_flags),
            );
        }
    }
}

impl ArchSwap for Armv5 {
    const SWAP_WIDTHS: Widths = Widths::W8.union(Widths::W32);
}

impl SwapInsn<u8> for Armv5 {
    #[inline(always)]
    fn swap(target: &UnsafeCell<u8>, value: u8) -> u8 {
        let previous: u32;
        // SAFETY: `target.get()` is a valid byte. `out` keeps the destination
        // apart from both inputs, which `swpb` requires.
        unsafe {
            asm!(
                "swpb {prev}, {val}, [{ptr}]",
                prev = out(reg) previous,
                val = in(reg) value as u32,
                ptr = in(reg) target.get(),
                options(nostack, preserves_flags),
            );
        }
        previous as u8
    }
}

impl SwapInsn<u32> for Armv5 {
    #[inline(always)]
    fn swap(target: &UnsafeCell<u32>, value: u32) -> u32 {
        let previous: u32;
        // SAFETY: `target.get()` is a valid, aligned word; see the byte form.
        unsafe {
            asm!(
                "swp {prev}, {val}, [{ptr}]",
                prev = out(reg) previous,
                val = in(reg) value,
                ptr = in(reg) target.get(),
                options(nostack, preserves_flags),
            );
        }
        previous
    }
}
