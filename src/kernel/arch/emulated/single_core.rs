// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Single-core swap backend
//!
//! For CPUs whose only atomic read-modify-write is an unconditional swap
//! (ARMv5 `swp` / `swpb`). Exchange and the lock word use the swap
//! instruction. Compare-exchange has no instruction to map to, so it masks
//! interrupts around a plain read-compare-write; that only excludes other
//! code on the same core, and this backend is therefore correct on
//! uniprocessor systems only.
//!
//! Locking every atomic behind one global lock would work on SMP as well but
//! would cost every operation a lock round trip and leave nothing for the
//! spin lock itself to be built from.
//!
//! Only the widths the swap instruction covers are implemented. A CPU that
//! swaps bytes and words, like ARMv5, gets 8-bit and word atomics:
//!
//! ```rust
//! # use core::cell::UnsafeCell;
//! # use rustux_atomics::kernel::arch::emulated::{ArchSwap, SingleCore, SwapInsn};
//! # use rustux_atomics::kernel::arch::{ArchBarrier, ArchInterrupts};
//! # use rustux_atomics::kernel::atomic::{Atomic, AtomicRepr, Widths, WordRepr};
//! # struct NoIrq;
//! # impl ArchInterrupts for NoIrq {
//! #     fn disable() -> bool { false }
//! #     fn enable_if(_: bool) {}
//! # }
//! struct ByteWordSwap;
//! # impl ArchBarrier for ByteWordSwap {
//! #     fn fence() {}
//! # }
//!
//! impl ArchSwap for ByteWordSwap {
//!     const SWAP_WIDTHS: Widths = Widths::W8.union(<WordRepr as AtomicRepr>::WIDTH);
//! }
//!
//! impl SwapInsn<u8> for ByteWordSwap {
//!     fn swap(target: &UnsafeCell<u8>, value: u8) -> u8 {
//!         unsafe { core::ptr::replace(target.get(), value) }
//!     }
//! }
//!
//! impl SwapInsn<WordRepr> for ByteWordSwap {
//!     fn swap(target: &UnsafeCell<WordRepr>, value: WordRepr) -> WordRepr {
//!         unsafe { core::ptr::replace(target.get(), value) }
//!     }
//! }
//!
//! type Backend = SingleCore<NoIrq, ByteWordSwap>;
//!
//! let byte: Atomic<u8, Backend> = Atomic::with_backend(1);
//! assert_eq!(byte.exchange(2), 1);
//! assert_eq!(byte.fetch_add(3), 2);
//! assert_eq!(byte.load(), 5);
//! ```
//!
//! A 16-bit atomic on the same CPU does not compile:
//!
//! ```compile_fail
//! # use core::cell::UnsafeCell;
//! # use rustux_atomics::kernel::arch::emulated::{ArchSwap, SingleCore, SwapInsn};
//! # use rustux_atomics::kernel::arch::{ArchBarrier, ArchInterrupts};
//! # use rustux_atomics::kernel::atomic::{Atomic, AtomicRepr, Widths, WordRepr};
//! # struct NoIrq;
//! # impl ArchInterrupts for NoIrq {
//! #     fn disable() -> bool { false }
//! #     fn enable_if(_: bool) {}
//! # }
//! # struct ByteWordSwap;
//! # impl ArchBarrier for ByteWordSwap {
//! #     fn fence() {}
//! # }
//! # impl ArchSwap for ByteWordSwap {
//! #     const SWAP_WIDTHS: Widths = Widths::W8.union(<WordRepr as AtomicRepr>::WIDTH);
//! # }
//! # impl SwapInsn<u8> for ByteWordSwap {
//! #     fn swap(target: &UnsafeCell<u8>, value: u8) -> u8 {
//! #         unsafe { core::ptr::replace(target.get(), value) }
//! #     }
//! # }
//! # impl SwapInsn<WordRepr> for ByteWordSwap {
//! #     fn swap(target: &UnsafeCell<WordRepr>, value: WordRepr) -> WordRepr {
//! #         unsafe { core::ptr::replace(target.get(), value) }
//! #     }
//! # }
//! # type Backend = SingleCore<NoIrq, ByteWordSwap>;
//! let half: Atomic<u16, Backend> = Atomic::with_backend(1);
//! half.load();
//! ```

use core::cell::UnsafeCell;
use core::marker::PhantomData;

use super::{ArchSwap, SwapInsn};
use crate::kernel::arch::plain::{fenced_load, fenced_store, raw_read, raw_write};
use crate::kernel::arch::{ArchAtomics, ArchBarrier, ArchInterrupts, AtomicOps, BackendKind};
use crate::kernel::atomic::repr::{AtomicRepr, WordRepr};
use crate::kernel::atomic::width::Widths;

/// Swap instruction plus interrupt masking
///
/// `I` masks interrupts on the current CPU, `P` provides the swap
/// instruction and the barrier.
pub struct SingleCore<I, P>(PhantomData<(I, P)>);

impl<I, P> ArchBarrier for SingleCore<I, P>
where
    I: ArchInterrupts + 'static,
    P: ArchSwap,
{
    #[inline(always)]
    fn fence() {
        P::fence();
    }
}

impl<I, P> ArchAtomics for SingleCore<I, P>
where
    I: ArchInterrupts + 'static,
    P: SwapInsn<WordRepr>,
{
    const NAME: &'static str = "single-core swap with interrupt masking";
    const KIND: BackendKind = BackendKind::SingleCore;
    const LOCK_FREE: Widths = P::SWAP_WIDTHS;
    const IMPLEMENTED: Widths = P::SWAP_WIDTHS;

    type Interrupts = I;

    #[inline]
    fn test_set_lock(lock: &UnsafeCell<WordRepr>, new_value: WordRepr) -> WordRepr {
        <Self as AtomicOps<WordRepr>>::exchange(lock, new_value)
    }

    #[inline]
    fn privileged_store(lock: &UnsafeCell<WordRepr>, value: WordRepr) {
        // A single aligned word write cannot tear, and nothing here takes a lock.
        fenced_store::<P, WordRepr>(lock, value)
    }
}

impl<I, P, R> AtomicOps<R> for SingleCore<I, P>
where
    I: ArchInterrupts + 'static,
    P: SwapInsn<WordRepr> + SwapInsn<R>,
    R: AtomicRepr,
{
    #[inline]
    fn load(target: &UnsafeCell<R>) -> R {
        fenced_load::<P, R>(target)
    }

    #[inline]
    fn store(target: &UnsafeCell<R>, value: R) {
        fenced_store::<P, R>(target, value)
    }

    #[inline]
    fn exchange(target: &UnsafeCell<R>, value: R) -> R {
        P::fence();
        let previous = <P as SwapInsn<R>>::swap(target, value);
        P::fence();
        previous
    }

    fn compare_exchange(target: &UnsafeCell<R>, expected: &mut R, desired: R) -> bool {
        let was_enabled = I::disable();
        P::fence();

        let actual = raw_read(target);
        let swapped = if actual == *expected {
            raw_write(target, desired);
            true
        } else {
            *expected = actual;
            false
        };

        P::fence();
        I::enable_if(was_enabled);
        swapped
    }
}
