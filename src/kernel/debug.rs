// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Kernel Logging
//!
//! Thin logging macros over the `log` facade. The kernel installs its own
//! logger (UART or early console); this crate only emits records.
//!
//! With the `logging` feature disabled the macros still type-check their
//! arguments but compile to nothing.
//!
//! # Usage
//!
//! ```rust,ignore
//! log_info!("atomics backend: {}", Arch::NAME);
//! log_warn!("global atomic lock is single-core only");
//! ```

/// Log at info level
macro_rules! log_info {
    ($($arg:tt)*) => {{
        #[cfg(feature = "logging")]
        ::log::info!($($arg)*);
        #[cfg(not(feature = "logging"))]
        let _ = format_args!($($arg)*);
    }};
}

/// Log at debug level
macro_rules! log_debug {
    ($($arg:tt)*) => {{
        #[cfg(feature = "logging")]
        ::log::debug!($($arg)*);
        #[cfg(not(feature = "logging"))]
        let _ = format_args!($($arg)*);
    }};
}

/// Log at warning level
macro_rules! log_warn {
    ($($arg:tt)*) => {{
        #[cfg(feature = "logging")]
        ::log::warn!($($arg)*);
        #[cfg(not(feature = "logging"))]
        let _ = format_args!($($arg)*);
    }};
}
