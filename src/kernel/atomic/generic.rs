// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Generic fetch-and-modify operations
//!
//! Built on nothing but a backend's `load` and `compare_exchange`, shared by
//! every architecture. The one exception is addition, which goes through
//! [`AtomicOps::fetch_add`] so backends with a fetch-and-add instruction can
//! use it; subtraction is always addition of the negated operand.
//!
//! The `*_fetch` forms never touch memory a second time: they combine the
//! value returned by the `fetch_*` form with the operand using the same
//! operator.

use core::cell::UnsafeCell;

use super::repr::AtomicRepr;
use crate::kernel::arch::AtomicOps;

/// Read-modify-write with `f` until the compare-exchange succeeds.
///
/// Returns the value `f` was applied to.
#[inline]
pub fn fetch_update<B, R, F>(target: &UnsafeCell<R>, mut f: F) -> R
where
    B: AtomicOps<R>,
    R: AtomicRepr,
    F: FnMut(R) -> R,
{
    let mut current = B::load(target);
    loop {
        let new = f(current);
        // A failed compare-exchange refreshes `current`.
        if B::compare_exchange(target, &mut current, new) {
            break current;
        }
        core::hint::spin_loop();
    }
}

/// Fetch-and-add as a compare-exchange loop
#[inline]
pub fn cas_fetch_add<B: AtomicOps<R>, R: AtomicRepr>(target: &UnsafeCell<R>, value: R) -> R {
    fetch_update::<B, R, _>(target, |current| current.wrapping_add(value))
}

/// Subtract `value`, returning the previous contents
#[inline]
pub fn fetch_sub<B: AtomicOps<R>, R: AtomicRepr>(target: &UnsafeCell<R>, value: R) -> R {
    B::fetch_add(target, value.wrapping_neg())
}

/// AND in `mask`, returning the previous contents
#[inline]
pub fn fetch_and<B: AtomicOps<R>, R: AtomicRepr>(target: &UnsafeCell<R>, mask: R) -> R {
    fetch_update::<B, R, _>(target, |current| current & mask)
}

/// OR in `mask`, returning the previous contents
#[inline]
pub fn fetch_or<B: AtomicOps<R>, R: AtomicRepr>(target: &UnsafeCell<R>, mask: R) -> R {
    fetch_update::<B, R, _>(target, |current| current | mask)
}

/// XOR in `mask`, returning the previous contents
#[inline]
pub fn fetch_xor<B: AtomicOps<R>, R: AtomicRepr>(target: &UnsafeCell<R>, mask: R) -> R {
    fetch_update::<B, R, _>(target, |current| current ^ mask)
}

/// Add `value`, returning the new contents
#[inline]
pub fn add_fetch<B: AtomicOps<R>, R: AtomicRepr>(target: &UnsafeCell<R>, value: R) -> R {
    B::fetch_add(target, value).wrapping_add(value)
}

/// Subtract `value`, returning the new contents
#[inline]
pub fn sub_fetch<B: AtomicOps<R>, R: AtomicRepr>(target: &UnsafeCell<R>, value: R) -> R {
    fetch_sub::<B, R>(target, value).wrapping_add(value.wrapping_neg())
}

/// AND in `mask`, returning the new contents
#[inline]
pub fn and_fetch<B: AtomicOps<R>, R: AtomicRepr>(target: &UnsafeCell<R>, mask: R) -> R {
    fetch_and::<B, R>(target, mask) & mask
}

/// OR in `mask`, returning the new contents
#[inline]
pub fn or_fetch<B: AtomicOps<R>, R: AtomicRepr>(target: &UnsafeCell<R>, mask: R) -> R {
    fetch_or::<B, R>(target, mask) | mask
}

/// XOR in `mask`, returning the new contents
#[inline]
pub fn xor_fetch<B: AtomicOps<R>, R: AtomicRepr>(target: &UnsafeCell<R>, mask: R) -> R {
    fetch_xor::<B, R>(target, mask) ^ mask
}
