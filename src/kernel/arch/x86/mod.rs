// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! x86 and x86-64 support

pub mod atomics;
pub mod interrupts;

pub use atomics::X86Atomics;
pub use interrupts::X86Interrupts;
