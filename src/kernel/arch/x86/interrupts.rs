// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! x86 interrupt masking (EFLAGS.IF)

use crate::kernel::arch::ArchInterrupts;

/// Interrupt control through `cli` / `sti`
pub struct X86Interrupts;

#[cfg(target_arch = "x86_64")]
impl ArchInterrupts for X86Interrupts {
    #[inline]
    fn disable() -> bool {
        use x86_64::instructions::interrupts;

        let was_enabled = interrupts::are_enabled();
        interrupts::disable();
        was_enabled
    }

    #[inline]
    fn enable_if(was_enabled: bool) {
        if was_enabled {
            x86_64::instructions::interrupts::enable();
        }
    }
}

#[cfg(target_arch = "x86")]
impl ArchInterrupts for X86Interrupts {
    #[inline]
    fn disable() -> bool {
        let flags: u32;
        // SAFETY: reads EFLAGS and clears IF; only legal at CPL 0, which is
        // where the kernel runs.
        unsafe {
            core::arch::asm!(
                "pushfd",
                "pop {flags}",
                "cli",
                flags = out(reg) flags,
            );
        }
        flags & (1 << 9) != 0
    }

    #[inline]
    fn enable_if(was_enabled: bool) {
        if was_enabled {
            // SAFETY: see `disable`.
            unsafe {
                core::arch::asm!("sti", options(nostack));
            }
        }
    }
}
