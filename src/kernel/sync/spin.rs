// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Spinlock Implementation
//!
//! This module provides a simple spinlock for kernel use.
//! Spinlocks are used when the expected wait time is very short.
//!
//! The lock word is taken with the backend's `test_set_lock` and released
//! with its `privileged_store`, never with an ordinary atomic. That is what
//! lets the global-lock backend build its own lock out of this type.

use core::cell::UnsafeCell;
use core::marker::PhantomData;
use core::ops::{Deref, DerefMut};

use crate::kernel::arch::plain::fenced_load;
use crate::kernel::arch::{Arch, ArchAtomics, ArchInterrupts};
use crate::kernel::atomic::repr::WordRepr;

/// A bare lock word
///
/// The backend is chosen per call so one `RawSpinLock` type serves every
/// backend, including the global-lock backend's own lock.
pub struct RawSpinLock {
    value: UnsafeCell<WordRepr>,
}

// SAFETY: the word is only accessed through backend lock-word operations.
unsafe impl Sync for RawSpinLock {}

impl RawSpinLock {
    /// Create an unlocked lock
    pub const fn new() -> Self {
        Self {
            value: UnsafeCell::new(0),
        }
    }

    /// Acquire the lock, spinning until it becomes available
    #[inline]
    pub fn acquire<A: ArchAtomics>(&self) {
        while A::test_set_lock(&self.value, 1) != 0 {
            core::hint::spin_loop();
        }
    }

    /// Try to acquire the lock without spinning
    #[inline]
    pub fn try_acquire<A: ArchAtomics>(&self) -> bool {
        A::test_set_lock(&self.value, 1) == 0
    }

    /// Release the lock
    ///
    /// The caller must hold it.
    #[inline]
    pub fn release<A: ArchAtomics>(&self) {
        A::privileged_store(&self.value, 0);
    }

    /// Whether the lock is held by anyone; only a snapshot
    pub fn is_locked<A: ArchAtomics>(&self) -> bool {
        fenced_load::<A, WordRepr>(&self.value) != 0
    }
}

impl Default for RawSpinLock {
    fn default() -> Self {
        Self::new()
    }
}

/// A spinlock protecting a `T`
pub struct SpinLock<T, A = Arch> {
    lock: RawSpinLock,
    data: UnsafeCell<T>,
    _backend: PhantomData<fn() -> A>,
}

unsafe impl<T: Send, A> Send for SpinLock<T, A> {}
unsafe impl<T: Send, A> Sync for SpinLock<T, A> {}

impl<T> SpinLock<T> {
    /// Create a new spinlock
    pub const fn new(data: T) -> Self {
        Self::with_backend(data)
    }
}

impl<T, A> SpinLock<T, A> {
    /// Create a new spinlock on backend `A`
    pub const fn with_backend(data: T) -> Self {
        Self {
            lock: RawSpinLock::new(),
            data: UnsafeCell::new(data),
            _backend: PhantomData,
        }
    }

    /// Mutable access without locking; `&mut self` proves exclusivity.
    pub fn get_mut(&mut self) -> &mut T {
        self.data.get_mut()
    }

    /// Consume the lock and return the data.
    pub fn into_inner(self) -> T {
        self.data.into_inner()
    }
}

impl<T, A: ArchAtomics> SpinLock<T, A> {
    /// Acquire the lock, spinning until it becomes available
    pub fn lock(&self) -> SpinLockGuard<'_, T, A> {
        self.lock.acquire::<A>();
        SpinLockGuard { lock: self }
    }

    /// Try to acquire the lock without spinning
    pub fn try_lock(&self) -> Option<SpinLockGuard<'_, T, A>> {
        if self.lock.try_acquire::<A>() {
            Some(SpinLockGuard { lock: self })
        } else {
            None
        }
    }

    /// Mask interrupts on this CPU, then acquire the lock.
    ///
    /// The previous interrupt state comes back when the guard drops, after
    /// the lock is released.
    pub fn lock_irqsave(&self) -> SpinLockIrqGuard<'_, T, A> {
        let was_enabled = A::Interrupts::disable();
        self.lock.acquire::<A>();
        SpinLockIrqGuard {
            lock: self,
            was_enabled,
        }
    }

    /// Whether someone holds the lock; only a snapshot
    pub fn is_locked(&self) -> bool {
        self.lock.is_locked::<A>()
    }
}

/// RAII guard for a SpinLock
pub struct SpinLockGuard<'a, T, A: ArchAtomics> {
    lock: &'a SpinLock<T, A>,
}

impl<'a, T, A: ArchAtomics> Drop for SpinLockGuard<'a, T, A> {
    fn drop(&mut self) {
        self.lock.lock.release::<A>();
    }
}

impl<'a, T, A: ArchAtomics> Deref for SpinLockGuard<'a, T, A> {
    type Target = T;
    fn deref(&self) -> &T {
        // SAFETY: the guard holds the lock.
        unsafe { &*self.lock.data.get() }
    }
}

impl<'a, T, A: ArchAtomics> DerefMut for SpinLockGuard<'a, T, A> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: the guard holds the lock.
        unsafe { &mut *self.lock.data.get() }
    }
}

/// RAII guard for a SpinLock taken with interrupts masked
pub struct SpinLockIrqGuard<'a, T, A: ArchAtomics> {
    lock: &'a SpinLock<T, A>,
    was_enabled: bool,
}

impl<'a, T, A: ArchAtomics> Drop for SpinLockIrqGuard<'a, T, A> {
    fn drop(&mut self) {
        self.lock.lock.release::<A>();
        A::Interrupts::enable_if(self.was_enabled);
    }
}

impl<'a, T, A: ArchAtomics> Deref for SpinLockIrqGuard<'a, T, A> {
    type Target = T;
    fn deref(&self) -> &T {
        // SAFETY: the guard holds the lock.
        unsafe { &*self.lock.data.get() }
    }
}

impl<'a, T, A: ArchAtomics> DerefMut for SpinLockIrqGuard<'a, T, A> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: the guard holds the lock.
        unsafe { &mut *self.lock.data.get() }
    }
}
