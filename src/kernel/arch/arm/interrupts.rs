// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! ARM interrupt masking (CPSR.I)
//!
//! Uses `mrs` / `msr` rather than `cpsid`, which ARMv5 does not have.

use core::arch::asm;

use crate::kernel::arch::ArchInterrupts;

/// CPSR IRQ mask bit
const CPSR_I: u32 = 1 << 7;

/// Interrupt control through the CPSR I bit
pub struct ArmInterrupts;

impl ArchInterrupts for ArmInterrupts {
    #[inline]
    fn disable() -> bool {
        let cpsr: u32;
        // SAFETY: only changes the IRQ mask of the current mode; the kernel
        // runs privileged, where `msr cpsr_c` is allowed.
        unsafe {
            asm!(
                "mrs {cpsr}, cpsr",
                "orr {tmp}, {cpsr}, #{mask}",
                "msr cpsr_c, {tmp}",
                cpsr = out(reg) cpsr,
                tmp = out(reg) _,
                mask = const CPSR_I,
                options(nomem, nostack, preserves_flags),
            );
        }
        cpsr & CPSR_I == 0
    }

    #[inline]
    fn enable_if(was_enabled: bool) {
        if !was_enabled {
            return;
        }
        // SAFETY: see `disable`.
        unsafe {
            asm!(
                "mrs {tmp}, cpsr",
                "bic {tmp}, {tmp}, #{mask}",
                "msr cpsr_c, {tmp}",
                tmp = out(reg) _,
                mask = const CPSR_I,
                options(nomem, nostack, preserves_flags),
            );
        }
    }
}
