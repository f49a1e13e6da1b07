// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Global-lock backend
//!
//! Every atomic operation of every width takes one process-wide spin lock,
//! does a plain access, and releases the lock. Nothing is lock-free.
//!
//! The lock word itself cannot be handled through the lock, so
//! [`test_set_lock`](ArchAtomics::test_set_lock) and
//! [`privileged_store`](ArchAtomics::privileged_store) bypass it and mask
//! interrupts around a read followed by a write instead. That makes the whole
//! backend correct on a single core only.
//!
//! Interrupts stay masked for as long as the global lock is held, so an
//! interrupt handler using atomics cannot spin forever on a lock its own core
//! already owns.

use core::cell::UnsafeCell;
use core::marker::PhantomData;

use spin::Once;

use crate::kernel::arch::plain::{raw_read, raw_write};
use crate::kernel::arch::{ArchAtomics, ArchBarrier, ArchInterrupts, AtomicOps, BackendKind};
use crate::kernel::atomic::repr::{AtomicRepr, WordRepr};
use crate::kernel::atomic::width::Widths;
use crate::kernel::sync::spin::RawSpinLock;

/// The lock serializing every global-lock atomic
static GLOBAL_ATOMIC_LOCK: Once<RawSpinLock> = Once::new();

/// Get the global atomic lock, constructing it on first use.
fn global_atomic_lock() -> &'static RawSpinLock {
    GLOBAL_ATOMIC_LOCK.call_once(RawSpinLock::new)
}

/// Every operation behind one global lock
///
/// `I` masks interrupts on the current CPU, `B` provides the barrier and the
/// set of widths the CPU can address.
pub struct GlobalLock<I, B>(PhantomData<(I, B)>);

impl<I, B> GlobalLock<I, B>
where
    I: ArchInterrupts + 'static,
    B: ArchAtomics,
{
    /// Run `f` with interrupts masked and the global lock held.
    #[inline]
    fn locked<T>(f: impl FnOnce() -> T) -> T {
        let was_enabled = I::disable();
        let lock = global_atomic_lock();

        lock.acquire::<Self>();
        B::fence();
        let result = f();
        B::fence();
        lock.release::<Self>();

        I::enable_if(was_enabled);
        result
    }
}

impl<I, B> ArchBarrier for GlobalLock<I, B>
where
    I: ArchInterrupts + 'static,
    B: ArchAtomics,
{
    #[inline(always)]
    fn fence() {
        B::fence();
    }
}

impl<I, B> ArchAtomics for GlobalLock<I, B>
where
    I: ArchInterrupts + 'static,
    B: ArchAtomics,
{
    const NAME: &'static str = "global atomic lock";
    const KIND: BackendKind = BackendKind::GlobalLock;
    const LOCK_FREE: Widths = Widths::empty();
    const IMPLEMENTED: Widths = B::IMPLEMENTED;

    type Interrupts = I;

    fn init() {
        GLOBAL_ATOMIC_LOCK.call_once(|| {
            log_debug!("atomics: constructing global atomic lock");
            RawSpinLock::new()
        });
        log_warn!("atomics: global atomic lock backend is only correct on a single core");
    }

    fn test_set_lock(lock: &UnsafeCell<WordRepr>, new_value: WordRepr) -> WordRepr {
        let was_enabled = I::disable();
        B::fence();
        let previous = raw_read(lock);
        raw_write(lock, new_value);
        B::fence();
        I::enable_if(was_enabled);
        previous
    }

    #[inline]
    fn privileged_store(lock: &UnsafeCell<WordRepr>, value: WordRepr) {
        Self::test_set_lock(lock, value);
    }
}

impl<I, B, R> AtomicOps<R> for GlobalLock<I, B>
where
    I: ArchInterrupts + 'static,
    B: AtomicOps<R>,
    R: AtomicRepr,
{
    fn load(target: &UnsafeCell<R>) -> R {
        Self::locked(|| raw_read(target))
    }

    fn store(target: &UnsafeCell<R>, value: R) {
        Self::locked(|| raw_write(target, value))
    }

    fn exchange(target: &UnsafeCell<R>, value: R) -> R {
        Self::locked(|| {
            let previous = raw_read(target);
            raw_write(target, value);
            previous
        })
    }

    fn compare_exchange(target: &UnsafeCell<R>, expected: &mut R, desired: R) -> bool {
        Self::locked(|| {
            let actual = raw_read(target);
            if actual == *expected {
                raw_write(target, desired);
                true
            } else {
                *expected = actual;
                false
            }
        })
    }

    /// Add under one lock round trip.
    ///
    /// Unlike the other emulated paths, this does not go through the generic
    /// compare-exchange loop. The result is the same.
    fn fetch_add(target: &UnsafeCell<R>, value: R) -> R {
        Self::locked(|| {
            let previous = raw_read(target);
            raw_write(target, previous.wrapping_add(value));
            previous
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::arch::host::HostInterrupts;
    use crate::kernel::arch::x86::X86Atomics;
    use crate::kernel::atomic::generic;

    type Backend = GlobalLock<HostInterrupts, X86Atomics>;

    #[test]
    fn test_nothing_is_lock_free() {
        assert!(Backend::LOCK_FREE.is_empty());
        assert_eq!(Backend::IMPLEMENTED, Widths::native_words());
        assert!(!<Backend as AtomicOps<u8>>::IS_LOCK_FREE);
        assert!(!<Backend as AtomicOps<WordRepr>>::IS_LOCK_FREE);
    }

    #[test]
    fn test_init_constructs_lock_once() {
        Backend::init();
        let first = global_atomic_lock() as *const RawSpinLock;
        Backend::init();
        assert_eq!(first, global_atomic_lock() as *const RawSpinLock);
    }

    #[test]
    fn test_operations_release_lock_and_interrupts() {
        let cell = UnsafeCell::new(1u32);
        assert_eq!(Backend::exchange(&cell, 2), 1);
        let mut expected = 2u32;
        assert!(Backend::compare_exchange(&cell, &mut expected, 3));
        assert_eq!(Backend::fetch_add(&cell, 4), 3);
        assert_eq!(Backend::load(&cell), 7);

        assert!(!HostInterrupts::masked());
    }

    #[test]
    fn test_fetch_add_matches_cas_loop() {
        for (start, operand) in [(0u32, 1u32), (u32::MAX, 2), (0x8000_0000, 0x8000_0000)] {
            let locked = UnsafeCell::new(start);
            let looped = UnsafeCell::new(start);
            assert_eq!(
                Backend::fetch_add(&locked, operand),
                generic::cas_fetch_add::<Backend, u32>(&looped, operand)
            );
            assert_eq!(locked.into_inner(), looped.into_inner());
        }
        assert!(!HostInterrupts::masked());
    }

    #[test]
    fn test_compare_exchange_failure_refreshes_expected() {
        let cell = UnsafeCell::new(0x1111u16);
        let mut expected = 0u16;
        assert!(!Backend::compare_exchange(&cell, &mut expected, 5));
        assert_eq!(expected, 0x1111);
    }

    #[test]
    fn test_test_set_lock_bypasses_global_lock() {
        let lock = UnsafeCell::new(0 as WordRepr);
        assert_eq!(Backend::test_set_lock(&lock, 1), 0);
        assert_eq!(Backend::test_set_lock(&lock, 1), 1);
        Backend::privileged_store(&lock, 0);
        assert_eq!(Backend::load(&lock), 0);
    }

    #[test]
    fn test_word_store_goes_through_lock() {
        let word = UnsafeCell::new(0 as WordRepr);
        Backend::store(&word, 0xdead);
        assert_eq!(Backend::load(&word), 0xdead);
    }

    #[test]
    fn test_generic_ops() {
        let cell = UnsafeCell::new(0b1111_0000u8);
        assert_eq!(generic::fetch_and::<Backend, u8>(&cell, 0b0011_1111), 0b1111_0000);
        assert_eq!(generic::xor_fetch::<Backend, u8>(&cell, 0xff), 0b1100_1111);
        assert_eq!(generic::fetch_sub::<Backend, u8>(&cell, 0xd0), 0b1100_1111);
        assert_eq!(Backend::load(&cell), 0xff);
    }
}
