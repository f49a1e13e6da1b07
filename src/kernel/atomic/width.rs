// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Width Capability Table
//!
//! Each backend publishes two compile-time width sets: the widths it has a
//! native atomic instruction for (`LOCK_FREE`) and the widths it can provide
//! at all, natively or emulated (`IMPLEMENTED`). The sets are plain data so
//! they can be logged and queried; the compile-time guarantee itself comes
//! from which `AtomicOps` impls exist.

use crate::err::{Error, Result};
use crate::kernel::arch::ArchAtomics;

bitflags::bitflags! {
    /// A set of atomic operand widths
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Widths: u8 {
        /// 1-byte operands
        const W8 = 1 << 0;
        /// 2-byte operands
        const W16 = 1 << 1;
        /// 4-byte operands
        const W32 = 1 << 2;
        /// 8-byte operands
        const W64 = 1 << 3;
    }
}

impl Widths {
    /// The width flag for an operand of `bytes` bytes
    pub const fn from_bytes(bytes: usize) -> Result<Widths> {
        match bytes {
            1 => Ok(Widths::W8),
            2 => Ok(Widths::W16),
            4 => Ok(Widths::W32),
            8 => Ok(Widths::W64),
            _ => Err(Error::InvalidWidth(bytes)),
        }
    }

    /// Every width a target with `usize`-sized words can address
    pub const fn native_words() -> Widths {
        if cfg!(target_pointer_width = "64") {
            Widths::all()
        } else {
            Widths::W8.union(Widths::W16).union(Widths::W32)
        }
    }
}

/// How a backend provides one operand width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// A native atomic instruction exists for this width
    LockFree,

    /// Implemented by emulation (interrupt masking or a lock)
    Emulated,

    /// Not available; using it does not compile
    Unsupported,
}

/// Look up how backend `A` handles operands of `bytes` bytes.
pub const fn capability<A: ArchAtomics>(bytes: usize) -> Result<Capability> {
    let width = match Widths::from_bytes(bytes) {
        Ok(width) => width,
        Err(e) => return Err(e),
    };

    Ok(if A::LOCK_FREE.contains(width) {
        Capability::LockFree
    } else if A::IMPLEMENTED.contains(width) {
        Capability::Emulated
    } else {
        Capability::Unsupported
    })
}

/// Like [`capability`], but an unimplemented width is an error.
pub fn require<A: ArchAtomics>(bytes: usize) -> Result<Capability> {
    match capability::<A>(bytes)? {
        Capability::Unsupported => Err(Error::Unsupported(bytes)),
        supported => Ok(supported),
    }
}
