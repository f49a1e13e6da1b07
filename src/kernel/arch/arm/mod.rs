// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! 32-bit ARM support
//!
//! ARMv7 has exclusive load/store pairs for every width up to a word. ARMv5
//! only has `swp` / `swpb` and runs the single-core emulation on top of them.

pub mod interrupts;

#[cfg(not(target_feature = "v7"))]
pub mod armv5;

#[cfg(target_feature = "v7")]
pub mod armv7;

pub use interrupts::ArmInterrupts;

#[cfg(not(target_feature = "v7"))]
pub use armv5::{Armv5, Armv5Atomics};

#[cfg(target_feature = "v7")]
pub use armv7::Armv7Atomics;
