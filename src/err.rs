// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Atomics Error Codes
//!
//! The atomic operations themselves never fail at runtime: an unsupported
//! width is a build error and a compare-exchange mismatch is an ordinary
//! `false` result. The only fallible entry points are the runtime capability
//! queries, which report through these codes.

use core::fmt;

/// Kernel status code
#[allow(non_camel_case_types)]
pub type rx_status_t = i32;

/// Success status code
pub const RX_OK: rx_status_t = 0;

/// Invalid arguments error
pub const RX_ERR_INVALID_ARGS: rx_status_t = -10;

/// Not supported error
pub const RX_ERR_NOT_SUPPORTED: rx_status_t = -2;

/// Errors reported by the capability queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The byte count is not an atomic word size (1, 2, 4 or 8)
    InvalidWidth(usize),

    /// The width exists but the active backend does not implement it
    Unsupported(usize),
}

impl Error {
    /// Convert to the kernel status code
    pub const fn into_status(self) -> rx_status_t {
        match self {
            Error::InvalidWidth(_) => RX_ERR_INVALID_ARGS,
            Error::Unsupported(_) => RX_ERR_NOT_SUPPORTED,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidWidth(bytes) => write!(f, "{} bytes is not an atomic width", bytes),
            Error::Unsupported(bytes) => {
                write!(f, "{}-byte atomics are not implemented on this architecture", bytes)
            }
        }
    }
}

/// Result alias for the capability queries
pub type Result<T> = core::result::Result<T, Error>;

/// Collapse a result into a status code
pub fn status_of<T>(result: Result<T>) -> rx_status_t {
    match result {
        Ok(_) => RX_OK,
        Err(e) => e.into_status(),
    }
}
