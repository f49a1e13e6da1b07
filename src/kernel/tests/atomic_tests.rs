// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Cross-Backend Conformance Test Suite
//!
//! Every property here is written once over a backend `B` and instantiated
//! for each backend that can run on the build host.
//!
//! The single-core backend only stays atomic between threads as long as
//! swap-based and compare-exchange-based operations are not mixed on one
//! target (on real hardware both run on one core). The contention tests keep
//! to one kind of operation per target.

use std::collections::BTreeSet;
use std::thread;

use crate::kernel::arch::{ArchAtomics, AtomicOps};
use crate::kernel::atomic::generic;
use crate::kernel::atomic::repr::WordRepr;
use crate::kernel::atomic::Atomic;
use crate::kernel::sync::spin::RawSpinLock;

const THREADS: usize = 8;
const ROUNDS: usize = 500;

// ============================================================================
// Single-Threaded Properties
// ============================================================================

/// Store then load returns the stored value, for every width
fn store_load_round_trip<B>()
where
    B: AtomicOps<u8> + AtomicOps<u16> + AtomicOps<u32> + AtomicOps<WordRepr>,
{
    let byte: Atomic<u8, B> = Atomic::with_backend(0);
    for v in [0u8, 1, 0x7f, 0x80, 0xff] {
        byte.store(v);
        assert_eq!(byte.load(), v);
    }

    let half: Atomic<u16, B> = Atomic::with_backend(0);
    for v in [0u16, 0x00ff, 0xff00, 0xffff] {
        half.store(v);
        assert_eq!(half.load(), v);
    }

    let word: Atomic<u32, B> = Atomic::with_backend(0);
    for v in [0u32, 0xdead_beef, u32::MAX] {
        word.store(v);
        assert_eq!(word.load(), v);
    }

    let machine: Atomic<usize, B> = Atomic::with_backend(0);
    for v in [0usize, 1, usize::MAX] {
        machine.store(v);
        assert_eq!(machine.load(), v);
    }
}

/// Both compare-exchange outcomes
fn compare_exchange_paths<B: AtomicOps<u32>>() {
    let a: Atomic<u32, B> = Atomic::with_backend(100);

    let mut expected = 100;
    assert!(a.compare_exchange(&mut expected, 200));
    assert_eq!(expected, 100);
    assert_eq!(a.load(), 200);

    let mut expected = 100;
    assert!(!a.compare_exchange(&mut expected, 300));
    assert_eq!(expected, 200);
    assert_eq!(a.load(), 200);
}

/// `x_fetch(v) == fetch_x(v) <op> v` for all five operators
fn apply_then_fetch_identity<B: AtomicOps<u16>>() {
    let start = 0xa5c3u16;
    for operand in [0u16, 1, 0x00ff, 0x8000, 0xffff] {
        let a: Atomic<u16, B> = Atomic::with_backend(start);
        let b: Atomic<u16, B> = Atomic::with_backend(start);
        assert_eq!(a.add_fetch(operand), b.fetch_add(operand).wrapping_add(operand));
        assert_eq!(a.load(), b.load());

        let a: Atomic<u16, B> = Atomic::with_backend(start);
        let b: Atomic<u16, B> = Atomic::with_backend(start);
        assert_eq!(a.sub_fetch(operand), b.fetch_sub(operand).wrapping_sub(operand));
        assert_eq!(a.load(), b.load());

        let a: Atomic<u16, B> = Atomic::with_backend(start);
        let b: Atomic<u16, B> = Atomic::with_backend(start);
        assert_eq!(a.and_fetch(operand), b.fetch_and(operand) & operand);
        assert_eq!(a.load(), b.load());

        let a: Atomic<u16, B> = Atomic::with_backend(start);
        let b: Atomic<u16, B> = Atomic::with_backend(start);
        assert_eq!(a.or_fetch(operand), b.fetch_or(operand) | operand);
        assert_eq!(a.load(), b.load());

        let a: Atomic<u16, B> = Atomic::with_backend(start);
        let b: Atomic<u16, B> = Atomic::with_backend(start);
        assert_eq!(a.xor_fetch(operand), b.fetch_xor(operand) ^ operand);
        assert_eq!(a.load(), b.load());
    }
}

/// The byte-mask AND case
fn byte_fetch_and<B: AtomicOps<u8>>() {
    let a: Atomic<u8, B> = Atomic::with_backend(0b1111_0000);
    assert_eq!(a.fetch_and(0b0011_1111), 0b1111_0000);
    assert_eq!(a.load(), 0b0011_0000);
}

/// The width table is consistent
fn width_table<B: ArchAtomics>() {
    assert!(B::IMPLEMENTED.contains(B::LOCK_FREE));
    assert!(!B::IMPLEMENTED.is_empty());
}

// ============================================================================
// Contention Properties
// ============================================================================

/// N threads exchanging distinct values lose and duplicate nothing
fn exchange_atomicity<B: AtomicOps<WordRepr>>() {
    let slot: Atomic<usize, B> = Atomic::with_backend(0);

    let seen: Vec<usize> = thread::scope(|s| {
        let handles: Vec<_> = (1..=THREADS)
            .map(|id| {
                let slot = &slot;
                s.spawn(move || {
                    (0..ROUNDS)
                        .map(|round| slot.exchange(id * ROUNDS + round))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect()
    });

    let mut all: Vec<usize> = seen;
    all.push(slot.load());
    all.sort_unstable();

    let mut expected: Vec<usize> = (1..=THREADS)
        .flat_map(|id| (0..ROUNDS).map(move |round| id * ROUNDS + round))
        .collect();
    expected.push(0);
    expected.sort_unstable();

    assert_eq!(all, expected);
}

/// Fetch-add from 0 by N contexts ends at N with olds {0..N-1}
fn fetch_add_contention<B: AtomicOps<u32>>() {
    let counter: Atomic<u32, B> = Atomic::with_backend(0);
    let total = (THREADS * ROUNDS) as u32;

    let olds: BTreeSet<u32> = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let counter = &counter;
                s.spawn(move || (0..ROUNDS).map(|_| counter.fetch_add(1)).collect::<Vec<_>>())
            })
            .collect();

        handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect()
    });

    assert_eq!(counter.load(), total);
    assert_eq!(olds, (0..total).collect::<BTreeSet<_>>());
}

/// Concurrent OR of distinct bits sets every bit exactly once
fn fetch_or_contention<B: AtomicOps<u64>>() {
    let bits: Atomic<u64, B> = Atomic::with_backend(0);

    let winners: usize = thread::scope(|s| {
        let handles: Vec<_> = (0..64u32)
            .map(|bit| {
                let bits = &bits;
                s.spawn(move || bits.fetch_or(1 << bit) & (1 << bit) == 0)
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().unwrap() as usize)
            .sum()
    });

    assert_eq!(winners, 64);
    assert_eq!(bits.load(), u64::MAX);
}

/// Exactly one contender sees the lock word clear
fn test_set_lock_race<B: ArchAtomics + AtomicOps<WordRepr>>() {
    let lock: Atomic<usize, B> = Atomic::with_backend(0);

    let winners: usize = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let lock = &lock;
                s.spawn(move || (lock.test_set_lock(1) == 0) as usize)
            })
            .collect();

        handles.into_iter().map(|h| h.join().unwrap()).sum()
    });

    assert_eq!(winners, 1);
    assert_eq!(lock.load(), 1);
}

/// A raw spin lock excludes concurrent critical sections
fn raw_lock_exclusion<B: AtomicOps<u32>>() {
    let lock = RawSpinLock::new();
    let inside: Atomic<u32, B> = Atomic::with_backend(0);
    let entered = core::cell::UnsafeCell::new(0usize);

    struct Shared<'a>(&'a core::cell::UnsafeCell<usize>);
    // SAFETY: only touched while `lock` is held.
    unsafe impl Sync for Shared<'_> {}
    let shared = Shared(&entered);

    thread::scope(|s| {
        for _ in 0..THREADS {
            let (lock, inside, shared) = (&lock, &inside, &shared);
            s.spawn(move || {
                for _ in 0..ROUNDS {
                    lock.acquire::<B>();
                    assert_eq!(inside.add_fetch(1), 1);
                    // SAFETY: the lock is held.
                    unsafe { *shared.0.get() += 1 };
                    assert_eq!(inside.sub_fetch(1), 0);
                    lock.release::<B>();
                }
            });
        }
    });

    assert_eq!(entered.into_inner(), THREADS * ROUNDS);
}

/// `fetch_update` retries until it applies to the current value
fn fetch_update_contention<B: AtomicOps<u32>>() {
    let value: Atomic<u32, B> = Atomic::with_backend(1);

    thread::scope(|s| {
        for _ in 0..THREADS {
            let value = &value;
            s.spawn(move || {
                for _ in 0..ROUNDS {
                    value.fetch_update(|v| v.wrapping_mul(3));
                }
            });
        }
    });

    let expected = (0..THREADS * ROUNDS).fold(1u32, |v, _| v.wrapping_mul(3));
    assert_eq!(value.load(), expected);
}

/// The generic layer's byte operations under contention
fn byte_xor_contention<B: AtomicOps<u8>>() {
    let cell = core::cell::UnsafeCell::new(0u8);
    struct Shared<'a>(&'a core::cell::UnsafeCell<u8>);
    // SAFETY: only accessed through backend atomics.
    unsafe impl Sync for Shared<'_> {}
    let shared = Shared(&cell);

    thread::scope(|s| {
        for _ in 0..THREADS {
            let shared = &shared;
            s.spawn(move || {
                for _ in 0..ROUNDS {
                    generic::fetch_xor::<B, u8>(shared.0, 0x5a);
                }
            });
        }
    });

    // An even number of XORs with the same mask cancels out.
    assert_eq!((THREADS * ROUNDS) % 2, 0);
    assert_eq!(cell.into_inner(), 0);
}

// ============================================================================
// Per-Backend Instantiation
// ============================================================================

macro_rules! conformance_suite {
    ($suite:ident, $backend:ty) => {
        mod $suite {
            use super::*;

            type Backend = $backend;

            #[test]
            fn test_store_load_round_trip() {
                store_load_round_trip::<Backend>();
            }

            #[test]
            fn test_compare_exchange_paths() {
                compare_exchange_paths::<Backend>();
            }

            #[test]
            fn test_apply_then_fetch_identity() {
                apply_then_fetch_identity::<Backend>();
            }

            #[test]
            fn test_byte_fetch_and() {
                byte_fetch_and::<Backend>();
            }

            #[test]
            fn test_width_table() {
                width_table::<Backend>();
            }

            #[test]
            fn test_exchange_atomicity() {
                exchange_atomicity::<Backend>();
            }

            #[test]
            fn test_fetch_add_contention() {
                fetch_add_contention::<Backend>();
            }

            #[test]
            fn test_test_set_lock_race() {
                test_set_lock_race::<Backend>();
            }

            #[test]
            fn test_raw_lock_exclusion() {
                raw_lock_exclusion::<Backend>();
            }

            #[test]
            fn test_fetch_update_contention() {
                fetch_update_contention::<Backend>();
            }

            #[test]
            fn test_byte_xor_contention() {
                byte_xor_contention::<Backend>();
            }
        }
    };
}

conformance_suite!(native, crate::kernel::arch::x86::X86Atomics);

conformance_suite!(
    single_core,
    crate::kernel::arch::emulated::SingleCore<
        crate::kernel::arch::host::HostInterrupts,
        crate::kernel::arch::x86::X86Atomics,
    >
);

conformance_suite!(
    global_lock,
    crate::kernel::arch::emulated::GlobalLock<
        crate::kernel::arch::host::HostInterrupts,
        crate::kernel::arch::x86::X86Atomics,
    >
);

#[cfg(target_pointer_width = "64")]
#[test]
fn test_quad_word_or_native() {
    fetch_or_contention::<crate::kernel::arch::x86::X86Atomics>();
}

#[cfg(target_pointer_width = "64")]
#[test]
fn test_quad_word_or_global_lock() {
    fetch_or_contention::<
        crate::kernel::arch::emulated::GlobalLock<
            crate::kernel::arch::host::HostInterrupts,
            crate::kernel::arch::x86::X86Atomics,
        >,
    >();
}
