// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Architecture Abstraction Layer (AAL)
//!
//! This module provides the architecture-specific atomics backends through
//! a common abstraction layer. Exactly one backend is selected per build and
//! exported as [`Arch`]:
//!
//! | target                        | backend                                  |
//! |-------------------------------|------------------------------------------|
//! | x86, x86-64                   | native `cmpxchg` / `xadd`                |
//! | AArch64 with `virtualized`    | `ldaxr` / `stlxr` exclusive pairs        |
//! | AArch64                       | global lock with interrupts masked       |
//! | ARMv7 (`target_feature="v7"`) | `ldrex` / `strex` exclusive pairs        |
//! | ARMv5                         | `swp` plus interrupt masking, one core   |

// Architecture traits (interface)
pub mod arch_traits;

// Plain fenced accesses shared by the backends
pub(crate) mod plain;

// Interrupt-masking and global-lock emulation
pub mod emulated;

// Architecture-specific implementations
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub mod x86;

#[cfg(target_arch = "arm")]
pub mod arm;

#[cfg(target_arch = "aarch64")]
pub mod arm64;

// Stand-in interrupt controller for running the emulating backends on the
// build host
#[cfg(test)]
pub mod host;

pub use arch_traits::*;

cfg_if::cfg_if! {
    if #[cfg(any(target_arch = "x86", target_arch = "x86_64"))] {
        /// The atomics backend for this build
        pub type Arch = x86::X86Atomics;
    } else if #[cfg(all(target_arch = "aarch64", feature = "virtualized"))] {
        /// The atomics backend for this build
        pub type Arch = arm64::Arm64Atomics;
    } else if #[cfg(target_arch = "aarch64")] {
        /// The atomics backend for this build
        pub type Arch = emulated::GlobalLock<arm64::Arm64Interrupts, arm64::Arm64Atomics>;
    } else if #[cfg(all(target_arch = "arm", target_feature = "v7"))] {
        /// The atomics backend for this build
        pub type Arch = arm::Armv7Atomics;
    } else if #[cfg(target_arch = "arm")] {
        /// The atomics backend for this build
        pub type Arch = arm::Armv5Atomics;
    } else {
        compile_error!("rustux-atomics has no backend for this target architecture");
    }
}

/// Strategy of the selected backend
pub const BACKEND: BackendKind = <Arch as ArchAtomics>::KIND;

/// Whether this is a guest build (the `virtualized` feature)
pub const VIRTUALIZED: bool = cfg!(feature = "virtualized");

/// Main architecture initialization for the atomics layer
pub fn arch_init() {
    Arch::init();

    log_info!(
        "atomics: backend \"{}\" ({:?}), lock-free {:?}, implemented {:?}",
        <Arch as ArchAtomics>::NAME,
        BACKEND,
        <Arch as ArchAtomics>::LOCK_FREE,
        <Arch as ArchAtomics>::IMPLEMENTED,
    );

    if VIRTUALIZED {
        log_debug!("atomics: built for a virtualized guest");
    }
}
