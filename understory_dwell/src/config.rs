// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracker configuration: dwelling time and pending-timer policy.
//!
//! ## Overview
//!
//! [`DwellConfig`] is a plain value. Build it with [`DwellConfig::default`] and the
//! `with_*` methods, or validate a host-supplied number of milliseconds with
//! [`DwellConfig::from_millis_f64`]. With the `serde` feature it deserializes from
//! camelCase keys:
//!
//! ```json
//! { "dwellingTime": 500, "slots": "perChild" }
//! ```
//!
//! Missing keys fall back to the defaults.

use core::time::Duration;

use crate::error::ConfigError;

/// Dwelling time used when none is configured.
pub const DEFAULT_DWELLING_TIME: Duration = Duration::from_millis(333);

/// How pending dwell timers are stored.
///
/// Appears on [`DwellConfig::slots`] and decides which timer a pointer-leave cancels.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum SlotPolicy {
    /// One pending timer per child, keyed by the child's identity.
    ///
    /// A leave cancels only the leaving child's own timer, so overlapping hovers
    /// over several children are tracked independently.
    #[default]
    PerChild,
    /// A single pending-timer slot shared by every child.
    ///
    /// Each enter overwrites the slot without cancelling what was there, and each
    /// leave cancels whatever the slot currently holds. When hovers overlap
    /// (enter A, enter B, leave A) the leave cancels B's timer and A's timer
    /// still fires. Kept for hosts that depend on that behavior.
    Shared,
}

/// Configuration for a [`DwellTracker`](crate::tracker::DwellTracker).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct DwellConfig {
    /// How long the pointer must stay over a child before the dwell callback fires.
    #[cfg_attr(feature = "serde", serde(with = "millis"))]
    pub dwelling_time: Duration,
    /// Pending-timer storage policy.
    pub slots: SlotPolicy,
}

impl Default for DwellConfig {
    fn default() -> Self {
        Self {
            dwelling_time: DEFAULT_DWELLING_TIME,
            slots: SlotPolicy::default(),
        }
    }
}

impl DwellConfig {
    /// Create a default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate a dwelling time given in (possibly fractional) milliseconds.
    ///
    /// Fails fast instead of coercing: NaN and infinities are rejected first,
    /// then negative values, then values too large for a [`Duration`].
    ///
    /// ```
    /// use core::time::Duration;
    /// use understory_dwell::config::DwellConfig;
    /// use understory_dwell::error::ConfigError;
    ///
    /// let cfg = DwellConfig::from_millis_f64(500.0).unwrap();
    /// assert_eq!(cfg.dwelling_time, Duration::from_millis(500));
    /// assert_eq!(
    ///     DwellConfig::from_millis_f64(-1.0),
    ///     Err(ConfigError::NegativeDwellingTime(-1.0))
    /// );
    /// ```
    pub fn from_millis_f64(ms: f64) -> Result<Self, ConfigError> {
        if !ms.is_finite() {
            return Err(ConfigError::NonFiniteDwellingTime(ms));
        }
        if ms < 0.0 {
            return Err(ConfigError::NegativeDwellingTime(ms));
        }
        let dwelling_time = Duration::try_from_secs_f64(ms / 1000.0)
            .map_err(|_| ConfigError::DwellingTimeOutOfRange(ms))?;
        Ok(Self {
            dwelling_time,
            ..Self::default()
        })
    }

    /// Replace the dwelling time.
    pub fn with_dwelling_time(mut self, dwelling_time: Duration) -> Self {
        self.dwelling_time = dwelling_time;
        self
    }

    /// Replace the pending-timer policy.
    pub fn with_slots(mut self, slots: SlotPolicy) -> Self {
        self.slots = slots;
        self
    }
}

/// `Duration` as milliseconds, matching how hosts usually write timeouts.
///
/// Whole milliseconds serialize as integers. Input is validated like
/// [`DwellConfig::from_millis_f64`].
#[cfg(feature = "serde")]
mod millis {
    use core::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    use super::DwellConfig;

    pub(super) fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        if d.subsec_nanos() % 1_000_000 == 0 {
            let ms = u64::try_from(d.as_millis()).unwrap_or(u64::MAX);
            s.serialize_u64(ms)
        } else {
            s.serialize_f64(d.as_secs_f64() * 1000.0)
        }
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let ms = f64::deserialize(d)?;
        DwellConfig::from_millis_f64(ms)
            .map(|cfg| cfg.dwelling_time)
            .map_err(serde::de::Error::custom)
    }
}
