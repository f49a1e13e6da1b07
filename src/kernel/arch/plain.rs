// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Plain accesses shared by the backends
//!
//! Aligned loads and stores of up to one machine word are single-copy atomic
//! on every supported CPU, so a load or store only needs barriers around it to
//! become sequentially consistent. The emulating backends also use the raw
//! accessors inside their interrupt-masked or locked sections.

use core::cell::UnsafeCell;
use core::ptr;

use super::ArchBarrier;

/// Read without barriers.
#[inline(always)]
pub(crate) fn raw_read<R: Copy>(target: &UnsafeCell<R>) -> R {
    // SAFETY: `target.get()` is valid and aligned for `R`; every other access
    // to it goes through the atomics layer.
    unsafe { ptr::read_volatile(target.get()) }
}

/// Write without barriers.
#[inline(always)]
pub(crate) fn raw_write<R: Copy>(target: &UnsafeCell<R>, value: R) {
    // SAFETY: as for `raw_read`.
    unsafe { ptr::write_volatile(target.get(), value) }
}

/// Full fence, read, full fence
#[inline(always)]
pub(crate) fn fenced_load<B: ArchBarrier, R: Copy>(target: &UnsafeCell<R>) -> R {
    B::fence();
    let value = raw_read(target);
    B::fence();
    value
}

/// Full fence, write, full fence
#[inline(always)]
pub(crate) fn fenced_store<B: ArchBarrier, R: Copy>(target: &UnsafeCell<R>, value: R) {
    B::fence();
    raw_write(target, value);
    B::fence();
}
