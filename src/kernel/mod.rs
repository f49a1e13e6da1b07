// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Rustux Atomics - Core Kernel Module
//!
//! This module contains the atomic operations layer and the pieces of the
//! kernel it is built from.

// Logging macros must be declared before the modules that use them
#[macro_use]
pub mod debug;

// Architecture module
pub mod arch;

// Uniform atomic API
pub mod atomic;

// Synchronization built on the atomic layer
pub mod sync;

#[cfg(test)]
mod tests;

/// Atomics initialization
///
/// Called once from `rustux_atomics::init()` on the boot CPU.
pub fn init() {
    arch::arch_init();
}
