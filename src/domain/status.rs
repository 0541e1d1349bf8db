//! Availability status codec.
//!
//! The upstream server reports media availability as a bare integer. This module is the
//! single place where those integers are translated into [`AvailabilityStatus`], so a
//! renumbering upstream only ever touches this file.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Availability of a title, season or episode, ordered by completeness.
///
/// `Unknown < Pending < Processing < PartiallyAvailable < Available`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AvailabilityStatus {
    Unknown,
    Pending,
    Processing,
    PartiallyAvailable,
    Available,
}

/// The upstream sent a status code outside the known `1..=5` range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Invalid availability status code: {code}")]
pub struct InvalidStatusCode {
    pub code: i64,
}

impl AvailabilityStatus {
    pub const ALL: [Self; 5] = [
        Self::Unknown,
        Self::Pending,
        Self::Processing,
        Self::PartiallyAvailable,
        Self::Available,
    ];

    /// Decodes an upstream media status code.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidStatusCode`] for anything outside `1..=5`. Callers display such
    /// records as [`AvailabilityStatus::Unknown`] but must report the failure.
    pub const fn decode(code: i64) -> Result<Self, InvalidStatusCode> {
        match code {
            1 => Ok(Self::Unknown),
            2 => Ok(Self::Pending),
            3 => Ok(Self::Processing),
            4 => Ok(Self::PartiallyAvailable),
            5 => Ok(Self::Available),
            _ => Err(InvalidStatusCode { code }),
        }
    }

    /// Inverse of [`decode`](Self::decode).
    #[must_use]
    pub const fn encode(self) -> i64 {
        match self {
            Self::Unknown => 1,
            Self::Pending => 2,
            Self::Processing => 3,
            Self::PartiallyAvailable => 4,
            Self::Available => 5,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::Pending => "PENDING",
            Self::Processing => "PROCESSING",
            Self::PartiallyAvailable => "PARTIALLY_AVAILABLE",
            Self::Available => "AVAILABLE",
        }
    }

    #[must_use]
    pub const fn is_available(self) -> bool {
        matches!(self, Self::Available)
    }
}

impl fmt::Display for AvailabilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<i64> for AvailabilityStatus {
    type Error = InvalidStatusCode;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        Self::decode(code)
    }
}

impl From<AvailabilityStatus> for i64 {
    fn from(status: AvailabilityStatus) -> Self {
        status.encode()
    }
}

/// Status of the request itself (as opposed to the media it points at).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestStatus {
    Pending,
    Approved,
    Declined,
    Failed,
    Completed,
}

impl RequestStatus {
    /// Request status codes are only used for filtering. An unknown code never matches a
    /// status-specific filter, and the projector logs it as drift.
    #[must_use]
    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::Pending),
            2 => Some(Self::Approved),
            3 => Some(Self::Declined),
            4 => Some(Self::Failed),
            5 => Some(Self::Completed),
            _ => None,
        }
    }
}
