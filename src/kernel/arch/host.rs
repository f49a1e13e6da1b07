// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Host interrupt model
//!
//! Unit tests run as ordinary threads, which cannot mask interrupts. This
//! models the one thing the emulating backends rely on instead: while a
//! thread has "interrupts masked", no other thread runs code that also masks
//! them. All test threads therefore share one simulated core.

use core::sync::atomic::{AtomicBool, Ordering};
use std::cell::Cell;

use super::ArchInterrupts;

/// Set while some thread has interrupts masked
static CORE_OWNED: AtomicBool = AtomicBool::new(false);

std::thread_local! {
    static MASKED: Cell<bool> = const { Cell::new(false) };
}

/// Interrupt masking for unit tests
pub struct HostInterrupts;

impl HostInterrupts {
    /// Whether the calling thread currently has interrupts masked
    pub fn masked() -> bool {
        MASKED.with(Cell::get)
    }
}

impl ArchInterrupts for HostInterrupts {
    fn disable() -> bool {
        if Self::masked() {
            return false;
        }

        while CORE_OWNED
            .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            core::hint::spin_loop();
        }
        MASKED.with(|masked| masked.set(true));
        true
    }

    fn enable_if(was_enabled: bool) {
        if was_enabled {
            MASKED.with(|masked| masked.set(false));
            CORE_OWNED.store(false, Ordering::Release);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_disable() {
        let outer = HostInterrupts::disable();
        assert!(outer);
        assert!(HostInterrupts::masked());

        let inner = HostInterrupts::disable();
        assert!(!inner);
        HostInterrupts::enable_if(inner);
        assert!(HostInterrupts::masked());

        HostInterrupts::enable_if(outer);
        assert!(!HostInterrupts::masked());
    }

    #[test]
    fn test_masked_sections_exclude_each_other() {
        let inside = AtomicBool::new(false);

        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..1000 {
                        let was_enabled = HostInterrupts::disable();
                        assert!(!inside.swap(true, Ordering::Relaxed));
                        inside.store(false, Ordering::Relaxed);
                        HostInterrupts::enable_if(was_enabled);
                    }
                });
            }
        });
    }
}
