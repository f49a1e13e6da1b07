// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Atomic Operations Module
//!
//! The uniform atomic API of the kernel. [`Atomic<T>`] wraps a value of any
//! [`AllowAtomic`] type and forwards every operation to the build's backend
//! ([`Arch`]). All operations are sequentially consistent; there is no
//! ordering argument.
//!
//! # Usage
//!
//! ```rust
//! use rustux_atomics::Atomic;
//!
//! let refcount = Atomic::new(1u32);
//! refcount.fetch_add(1);
//! assert_eq!(refcount.sub_fetch(1), 1);
//!
//! let mut expected = 1;
//! assert!(refcount.compare_exchange(&mut expected, 0));
//! ```

use core::cell::UnsafeCell;
use core::fmt;
use core::marker::PhantomData;

use crate::kernel::arch::{Arch, ArchAtomics, ArchBarrier, AtomicOps};

pub mod generic;
pub mod repr;
pub mod width;

pub use repr::{AllowAtomic, AllowAtomicArithmetic, AtomicRepr, WordRepr};
pub use width::{capability, require, Capability, Widths};

/// A memory location accessed only atomically
///
/// `A` is the backend and defaults to the one selected for this build. Using
/// a `T` whose width the backend does not implement is a compile error.
#[repr(transparent)]
pub struct Atomic<T: AllowAtomic, A = Arch>(UnsafeCell<T>, PhantomData<fn() -> A>);

// SAFETY: every access to the inner value is atomic.
unsafe impl<T: AllowAtomic, A> Sync for Atomic<T, A> {}

// SAFETY: only the stored bits move with the atomic, as with `AtomicPtr`.
unsafe impl<T: AllowAtomic, A> Send for Atomic<T, A> {}

impl<T: AllowAtomic> Atomic<T> {
    /// Create a new atomic holding `v` on the build's backend.
    pub const fn new(v: T) -> Self {
        Self::with_backend(v)
    }
}

impl<T: AllowAtomic, A> Atomic<T, A> {
    /// Create a new atomic holding `v` on backend `A`.
    pub const fn with_backend(v: T) -> Self {
        Self(UnsafeCell::new(v), PhantomData)
    }

    /// View caller-owned memory as an atomic.
    ///
    /// # Safety
    ///
    /// - `ptr` is aligned for `T` and valid for reads and writes for `'a`.
    /// - For the whole of `'a`, the location is only accessed through
    ///   [`Atomic`] operations of the same backend.
    pub unsafe fn from_ptr<'a>(ptr: *mut T) -> &'a Self
    where
        T: 'a,
    {
        // SAFETY: `Atomic<T, A>` is transparent over `UnsafeCell<T>`, which is
        // transparent over `T`; the caller guarantees validity and exclusivity.
        unsafe { &*ptr.cast::<Self>() }
    }

    /// Raw pointer to the value
    pub const fn as_ptr(&self) -> *mut T {
        self.0.get()
    }

    /// Mutable access; `&mut self` rules out concurrent atomics.
    pub fn get_mut(&mut self) -> &mut T {
        self.0.get_mut()
    }

    /// Consume the atomic and return the value.
    pub fn into_inner(self) -> T {
        self.0.into_inner()
    }

    #[inline(always)]
    fn repr(&self) -> &UnsafeCell<T::Repr> {
        // SAFETY: `AllowAtomic` guarantees `T` and `T::Repr` share size and
        // alignment, and `UnsafeCell` is transparent.
        unsafe { &*(&self.0 as *const UnsafeCell<T>).cast::<UnsafeCell<T::Repr>>() }
    }
}

impl<T: AllowAtomic, A: AtomicOps<T::Repr>> Atomic<T, A> {
    /// Whether operations on this atomic use a native instruction
    pub const fn is_lock_free(&self) -> bool {
        <A as AtomicOps<T::Repr>>::IS_LOCK_FREE
    }

    /// Read the value.
    #[inline]
    pub fn load(&self) -> T {
        T::from_repr(A::load(self.repr()))
    }

    /// Write `v`.
    #[inline]
    pub fn store(&self, v: T) {
        A::store(self.repr(), v.into_repr())
    }

    /// Write `v` and return the previous value.
    #[inline]
    pub fn exchange(&self, v: T) -> T {
        T::from_repr(A::exchange(self.repr(), v.into_repr()))
    }

    /// Replace the value with `desired` if it equals `*expected`.
    ///
    /// On failure `*expected` is updated to the value found.
    ///
    /// # Returns
    ///
    /// `true` if the value was replaced
    #[inline]
    pub fn compare_exchange(&self, expected: &mut T, desired: T) -> bool {
        let mut current = expected.into_repr();
        if A::compare_exchange(self.repr(), &mut current, desired.into_repr()) {
            true
        } else {
            *expected = T::from_repr(current);
            false
        }
    }

    /// Apply `f` atomically, retrying until no other update intervenes.
    ///
    /// `f` may run more than once. Returns the value `f` was finally applied
    /// to.
    pub fn fetch_update<F: FnMut(T) -> T>(&self, mut f: F) -> T {
        T::from_repr(generic::fetch_update::<A, T::Repr, _>(self.repr(), |current| {
            f(T::from_repr(current)).into_repr()
        }))
    }
}

macro_rules! atomic_arith {
    ($($(#[$meta:meta])* $name:ident;)*) => {
        impl<T: AllowAtomicArithmetic, A: AtomicOps<T::Repr>> Atomic<T, A> {
            $(
                $(#[$meta])*
                #[inline]
                pub fn $name(&self, v: T) -> T {
                    T::from_repr(generic::$name::<A, T::Repr>(self.repr(), v.into_repr()))
                }
            )*

            /// Add `v` (wrapping) and return the previous value.
            #[inline]
            pub fn fetch_add(&self, v: T) -> T {
                T::from_repr(A::fetch_add(self.repr(), v.into_repr()))
            }
        }
    };
}

atomic_arith! {
    /// Subtract `v` (wrapping) and return the previous value.
    fetch_sub;
    /// Bitwise AND with `v`; returns the previous value.
    fetch_and;
    /// Bitwise OR with `v`; returns the previous value.
    fetch_or;
    /// Bitwise XOR with `v`; returns the previous value.
    fetch_xor;
    /// Add `v` (wrapping) and return the new value.
    add_fetch;
    /// Subtract `v` (wrapping) and return the new value.
    sub_fetch;
    /// Bitwise AND with `v`; returns the new value.
    and_fetch;
    /// Bitwise OR with `v`; returns the new value.
    or_fetch;
    /// Bitwise XOR with `v`; returns the new value.
    xor_fetch;
}

impl<A: ArchAtomics> Atomic<usize, A> {
    /// Swap `new_value` into a spin-lock word and return the previous value.
    ///
    /// Unlike [`exchange`](Self::exchange) this never takes a lock owned by
    /// the backend.
    #[inline]
    pub fn test_set_lock(&self, new_value: usize) -> usize {
        A::test_set_lock(self.repr(), new_value as WordRepr) as usize
    }
}

impl<T: AllowAtomic + Default, A> Default for Atomic<T, A> {
    fn default() -> Self {
        Self::with_backend(T::default())
    }
}

impl<T: AllowAtomic, A> From<T> for Atomic<T, A> {
    fn from(v: T) -> Self {
        Self::with_backend(v)
    }
}

impl<T: AllowAtomic + fmt::Debug, A: AtomicOps<T::Repr>> fmt::Debug for Atomic<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.load(), f)
    }
}

/// A set/clear flag
///
/// Set and clear go through the lock-word path of the backend, so a flag is
/// usable on every backend, including as the word of a home-grown lock.
pub struct AtomicFlag<A = Arch> {
    word: UnsafeCell<WordRepr>,
    _backend: PhantomData<fn() -> A>,
}

// SAFETY: the word is only accessed through backend atomics.
unsafe impl<A> Sync for AtomicFlag<A> {}

impl<A> AtomicFlag<A> {
    /// A cleared flag
    pub const fn new() -> Self {
        Self {
            word: UnsafeCell::new(0),
            _backend: PhantomData,
        }
    }
}

impl<A: ArchAtomics> AtomicFlag<A> {
    /// Set the flag and return whether it was already set.
    #[inline]
    pub fn test_and_set(&self) -> bool {
        A::test_set_lock(&self.word, 1) != 0
    }

    /// Clear the flag.
    #[inline]
    pub fn clear(&self) {
        A::privileged_store(&self.word, 0)
    }
}

impl<A: AtomicOps<WordRepr>> AtomicFlag<A> {
    /// Whether the flag is set
    #[inline]
    pub fn is_set(&self) -> bool {
        A::load(&self.word) != 0
    }
}

impl<A> Default for AtomicFlag<A> {
    fn default() -> Self {
        Self::new()
    }
}

/// Full memory barrier
#[inline]
pub fn fence() {
    <Arch as ArchBarrier>::fence()
}

/// Whether atomics of type `T` use a native instruction on this build
pub const fn is_lock_free<T: AllowAtomic>() -> bool {
    <Arch as ArchAtomics>::LOCK_FREE.contains(<T::Repr as AtomicRepr>::WIDTH)
}

/// Whether atomics of type `T` are available on this build at all
pub const fn is_implemented<T: AllowAtomic>() -> bool {
    <Arch as ArchAtomics>::IMPLEMENTED.contains(<T::Repr as AtomicRepr>::WIDTH)
}
