// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Atomic representations
//!
//! Backends only ever see four unsigned machine widths. Every other type that
//! may live in an [`Atomic`](super::Atomic) maps onto one of them through
//! [`AllowAtomic`].

use core::ops::{BitAnd, BitOr, BitXor};

use super::width::Widths;

mod private {
    /// Sealed trait marker to keep backend representations closed.
    pub trait Sealed {}
}

impl private::Sealed for u8 {}
impl private::Sealed for u16 {}
impl private::Sealed for u32 {}
impl private::Sealed for u64 {}

/// An unsigned integer a backend operates on directly.
///
/// This trait is sealed: the representations are exactly `u8`, `u16`, `u32`
/// and `u64`. Whether a backend implements a given one is a separate question
/// answered by its `AtomicOps` impls.
pub trait AtomicRepr:
    Copy
    + Eq
    + Send
    + Sync
    + 'static
    + BitAnd<Output = Self>
    + BitOr<Output = Self>
    + BitXor<Output = Self>
    + private::Sealed
{
    /// Width flag for this representation
    const WIDTH: Widths;

    /// Twos-complement addition
    fn wrapping_add(self, rhs: Self) -> Self;

    /// Twos-complement negation
    fn wrapping_neg(self) -> Self;
}

macro_rules! impl_atomic_repr {
    ($($ty:ty => $width:ident),* $(,)?) => {
        $(
            impl AtomicRepr for $ty {
                const WIDTH: Widths = Widths::$width;

                #[inline(always)]
                fn wrapping_add(self, rhs: Self) -> Self {
                    <$ty>::wrapping_add(self, rhs)
                }

                #[inline(always)]
                fn wrapping_neg(self) -> Self {
                    <$ty>::wrapping_neg(self)
                }
            }
        )*
    };
}

impl_atomic_repr!(u8 => W8, u16 => W16, u32 => W32, u64 => W64);

/// Representation of a machine word (`usize`)
#[cfg(target_pointer_width = "64")]
pub type WordRepr = u64;

/// Representation of a machine word (`usize`)
#[cfg(target_pointer_width = "32")]
pub type WordRepr = u32;

/// Types that may be stored in an [`Atomic`](super::Atomic).
///
/// # Safety
///
/// `Self` must have the same size and alignment as `Self::Repr`, and every
/// value produced by `into_repr` must convert back unchanged.
pub unsafe trait AllowAtomic: Sized + Copy {
    /// The backend representation
    type Repr: AtomicRepr;

    /// Converts into a [`Self::Repr`].
    fn into_repr(self) -> Self::Repr;

    /// Converts from a [`Self::Repr`].
    fn from_repr(repr: Self::Repr) -> Self;
}

/// Atomics that support the fetch-and-modify family.
///
/// Arithmetic wraps in the representation, so signed types get twos-complement
/// wraparound for free.
pub trait AllowAtomicArithmetic: AllowAtomic {}

macro_rules! impl_allow_atomic {
    ($($ty:ty => $repr:ty),* $(,)?) => {
        $(
            // SAFETY: `$ty` and `$repr` are integers of identical size and alignment.
            unsafe impl AllowAtomic for $ty {
                type Repr = $repr;

                #[inline(always)]
                fn into_repr(self) -> Self::Repr {
                    self as $repr
                }

                #[inline(always)]
                fn from_repr(repr: Self::Repr) -> Self {
                    repr as $ty
                }
            }

            impl AllowAtomicArithmetic for $ty {}
        )*
    };
}

impl_allow_atomic!(
    u8 => u8,
    u16 => u16,
    u32 => u32,
    u64 => u64,
    i8 => u8,
    i16 => u16,
    i32 => u32,
    i64 => u64,
    usize => WordRepr,
    isize => WordRepr,
);

// SAFETY: `bool` is one byte with alignment one, and `into_repr` only yields 0 or 1.
unsafe impl AllowAtomic for bool {
    type Repr = u8;

    #[inline(always)]
    fn into_repr(self) -> Self::Repr {
        self as u8
    }

    #[inline(always)]
    fn from_repr(repr: Self::Repr) -> Self {
        repr != 0
    }
}

// SAFETY: A `*mut T` has the size and alignment of `usize`. Only the address
// is stored; dereferencing it is the caller's business.
unsafe impl<T> AllowAtomic for *mut T {
    type Repr = WordRepr;

    #[inline(always)]
    fn into_repr(self) -> Self::Repr {
        self as usize as WordRepr
    }

    #[inline(always)]
    fn from_repr(repr: Self::Repr) -> Self {
        repr as usize as *mut T
    }
}
