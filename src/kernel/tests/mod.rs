// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Rustux Atomics Test Suite
//!
//! Per-module unit tests live beside their modules. This suite holds the
//! properties every backend must satisfy identically, run on the host
//! against:
//!
//! - the native x86 backend,
//! - the single-core backend over the host interrupt model,
//! - the global-lock backend over the host interrupt model.
//!
//! # Organization
//!
//! - [`atomic_tests`] - Cross-backend conformance and contention tests

pub mod atomic_tests;
