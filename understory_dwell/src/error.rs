// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.

use thiserror::Error;

/// Rejected tracker configuration.
///
/// Returned by [`DwellConfig::from_millis_f64`](crate::config::DwellConfig::from_millis_f64)
/// when a host hands over a dwelling time that has no meaningful duration.
#[derive(Copy, Clone, Debug, Error, PartialEq)]
pub enum ConfigError {
    /// The dwelling time was below zero.
    #[error("dwelling time must not be negative, got {0} ms")]
    NegativeDwellingTime(f64),
    /// The dwelling time was NaN or infinite.
    #[error("dwelling time must be finite, got {0} ms")]
    NonFiniteDwellingTime(f64),
    /// The dwelling time does not fit in a [`Duration`](core::time::Duration).
    #[error("dwelling time of {0} ms is out of range")]
    DwellingTimeOutOfRange(f64),
}
