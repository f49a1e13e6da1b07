// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! ARM64 interrupt masking (DAIF.I)

use core::arch::asm;

use aarch64_cpu::registers::{Readable, DAIF};

use crate::kernel::arch::ArchInterrupts;

/// Interrupt control through the DAIF I bit
pub struct Arm64Interrupts;

impl ArchInterrupts for Arm64Interrupts {
    #[inline]
    fn disable() -> bool {
        let was_enabled = !DAIF.is_set(DAIF::I);
        // SAFETY: masks IRQs on the current CPU only; EL1 may write DAIF.
        unsafe {
            asm!("msr daifset, #2", options(nomem, nostack, preserves_flags));
        }
        was_enabled
    }

    #[inline]
    fn enable_if(was_enabled: bool) {
        if was_enabled {
            // SAFETY: see `disable`.
            unsafe {
                asm!("msr daifclr, #2", options(nomem, nostack, preserves_flags));
            }
        }
    }
}
