//! Domain types for request normalization.
//!
//! Status decoding lives in [`status`], the parent/child availability rollup in
//! [`rollup`]. The enums here are the caller-facing query vocabulary.

pub mod rollup;
pub mod status;

pub use rollup::{MalformedAvailabilityInput, decode_children, rollup, rollup_codes};
pub use status::{AvailabilityStatus, InvalidStatusCode, RequestStatus};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A query value that does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid {field}: '{value}'. Expected one of: {}", .expected.join(", "))]
pub struct ParseVariantError {
    pub field: &'static str,
    pub value: String,
    pub expected: &'static [&'static str],
}

/// Request filter, matching the upstream `filter` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestFilter {
    #[default]
    All,
    Approved,
    Available,
    Pending,
    Processing,
    Unavailable,
    Failed,
}

impl RequestFilter {
    pub const NAMES: &'static [&'static str] = &[
        "all",
        "approved",
        "available",
        "pending",
        "processing",
        "unavailable",
        "failed",
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Approved => "approved",
            Self::Available => "available",
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Unavailable => "unavailable",
            Self::Failed => "failed",
        }
    }

    /// Whether a record with the given request status and decoded media status passes.
    #[must_use]
    pub fn matches(self, request: Option<RequestStatus>, media: AvailabilityStatus) -> bool {
        let media_missing = !media.is_available();
        match self {
            Self::All => true,
            Self::Approved => request == Some(RequestStatus::Approved),
            Self::Pending => request == Some(RequestStatus::Pending),
            Self::Failed => request == Some(RequestStatus::Failed),
            Self::Available => media.is_available(),
            Self::Processing => request == Some(RequestStatus::Approved) && media_missing,
            Self::Unavailable => {
                matches!(
                    request,
                    Some(RequestStatus::Pending | RequestStatus::Approved)
                ) && media_missing
            }
        }
    }
}

impl fmt::Display for RequestFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RequestFilter {
    type Err = ParseVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "approved" => Ok(Self::Approved),
            "available" => Ok(Self::Available),
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "unavailable" => Ok(Self::Unavailable),
            "failed" => Ok(Self::Failed),
            _ => Err(ParseVariantError {
                field: "filter",
                value: s.to_string(),
                expected: Self::NAMES,
            }),
        }
    }
}

/// Sort key. Both orders are newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestSort {
    /// By request creation time.
    #[default]
    Added,
    /// By last update time.
    Modified,
}

impl RequestSort {
    pub const NAMES: &'static [&'static str] = &["added", "modified"];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Modified => "modified",
        }
    }
}

impl fmt::Display for RequestSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RequestSort {
    type Err = ParseVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "added" => Ok(Self::Added),
            "modified" => Ok(Self::Modified),
            _ => Err(ParseVariantError {
                field: "sort",
                value: s.to_string(),
                expected: Self::NAMES,
            }),
        }
    }
}

/// Kind of media a request points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Tv,
}

impl MediaKind {
    /// Parses the upstream discriminator (`"movie"` / `"tv"`).
    #[must_use]
    pub fn from_upstream(value: &str) -> Option<Self> {
        match value {
            "movie" => Some(Self::Movie),
            "tv" => Some(Self::Tv),
            _ => None,
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Movie => write!(f, "movie"),
            Self::Tv => write!(f, "tv"),
        }
    }
}

/// Restricts a listing to one media kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaTypeFilter {
    #[default]
    All,
    Movie,
    Tv,
}

impl MediaTypeFilter {
    pub const NAMES: &'static [&'static str] = &["all", "movie", "tv"];

    #[must_use]
    pub const fn matches(self, kind: MediaKind) -> bool {
        match self {
            Self::All => true,
            Self::Movie => matches!(kind, MediaKind::Movie),
            Self::Tv => matches!(kind, MediaKind::Tv),
        }
    }
}

impl FromStr for MediaTypeFilter {
    type Err = ParseVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "movie" => Ok(Self::Movie),
            "tv" => Ok(Self::Tv),
            _ => Err(ParseVariantError {
                field: "media type",
                value: s.to_string(),
                expected: Self::NAMES,
            }),
        }
    }
}

/// Season label in the `S01` form.
#[must_use]
pub fn season_label(season_number: i64) -> String {
    format!("S{season_number:02}")
}

/// Episode number in the zero-padded `01` form.
#[must_use]
pub fn episode_label(episode_number: i64) -> String {
    format!("{episode_number:02}")
}
