//! Checkpoint catalog
//!
//! The fixed, ordered set of elapsed-time buckets at which a checkpoint
//! is expected after a post goes live.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A checkpoint kind
///
/// Variant order is catalog order, so the derived `Ord` sorts kinds
/// chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CheckpointKind {
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "3h")]
    ThreeHours,
    #[serde(rename = "6h")]
    SixHours,
    #[serde(rename = "12h")]
    TwelveHours,
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "2d")]
    TwoDays,
    #[serde(rename = "7d")]
    SevenDays,
    #[serde(rename = "14d")]
    FourteenDays,
    #[serde(rename = "30d")]
    ThirtyDays,
}

impl CheckpointKind {
    /// Every kind, in catalog order
    pub const ALL: [CheckpointKind; 9] = [
        Self::OneHour,
        Self::ThreeHours,
        Self::SixHours,
        Self::TwelveHours,
        Self::OneDay,
        Self::TwoDays,
        Self::SevenDays,
        Self::FourteenDays,
        Self::ThirtyDays,
    ];

    /// Elapsed time since publish after which this kind is expected
    pub const fn threshold_hours(self) -> i64 {
        match self {
            Self::OneHour => 1,
            Self::ThreeHours => 3,
            Self::SixHours => 6,
            Self::TwelveHours => 12,
            Self::OneDay => 24,
            Self::TwoDays => 48,
            Self::SevenDays => 7 * 24,
            Self::FourteenDays => 14 * 24,
            Self::ThirtyDays => 30 * 24,
        }
    }

    /// Elapsed time since publish before which an uncaptured kind is
    /// still "upcoming" rather than "missed"
    pub const fn grace_hours(self) -> i64 {
        self.threshold_hours() * 2
    }

    pub fn threshold(self) -> Duration {
        Duration::hours(self.threshold_hours())
    }

    pub fn grace_window(self) -> Duration {
        Duration::hours(self.grace_hours())
    }

    /// Instant at which this kind becomes expected for a post
    pub fn due_at(self, published_at: DateTime<Utc>) -> DateTime<Utc> {
        published_at + self.threshold()
    }

    /// Short label used for storage and display ("1h", "7d", ...)
    pub const fn label(self) -> &'static str {
        match self {
            Self::OneHour => "1h",
            Self::ThreeHours => "3h",
            Self::SixHours => "6h",
            Self::TwelveHours => "12h",
            Self::OneDay => "1d",
            Self::TwoDays => "2d",
            Self::SevenDays => "7d",
            Self::FourteenDays => "14d",
            Self::ThirtyDays => "30d",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.label() == label)
    }
}

impl fmt::Display for CheckpointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when parsing an unknown checkpoint label
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown checkpoint kind: {0}")]
pub struct UnknownCheckpointKind(pub String);

impl FromStr for CheckpointKind {
    type Err = UnknownCheckpointKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s.trim()).ok_or_else(|| UnknownCheckpointKind(s.to_string()))
    }
}
