//! Availability rollup from children (episodes or seasons) to their parent.
//!
//! The rollup is a priority rule rather than a maximum over the completeness order:
//! anything available mixed with anything missing is reported as partially available,
//! otherwise the most advanced in-flight state wins.

use super::status::{AvailabilityStatus, InvalidStatusCode};
use thiserror::Error;

/// A rollup was asked to aggregate a raw code that is not a known status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Malformed availability input at position {index}: {source}")]
pub struct MalformedAvailabilityInput {
    pub index: usize,
    #[source]
    pub source: InvalidStatusCode,
}

/// Rolls child statuses up into a single parent status.
///
/// Branches are evaluated in this order, first match wins:
///
/// 1. no children: `Unknown`
/// 2. every child available: `Available`
/// 3. every child unknown: `Unknown`
/// 4. some content available (an `Available` or `PartiallyAvailable` child): `PartiallyAvailable`
/// 5. any child processing: `Processing`
/// 6. any child pending: `Pending`
/// 7. otherwise `Unknown`
#[must_use]
pub fn rollup(children: &[AvailabilityStatus]) -> AvailabilityStatus {
    use AvailabilityStatus::{Available, PartiallyAvailable, Pending, Processing, Unknown};

    if children.is_empty() {
        return Unknown;
    }

    if children.iter().all(|s| *s == Available) {
        return Available;
    }

    if children.iter().all(|s| *s == Unknown) {
        return Unknown;
    }

    // Step 2 already ruled out "all available", so one hit here means a mix.
    if children
        .iter()
        .any(|s| matches!(s, Available | PartiallyAvailable))
    {
        return PartiallyAvailable;
    }

    if children.contains(&Processing) {
        return Processing;
    }

    if children.contains(&Pending) {
        return Pending;
    }

    Unknown
}

/// Decodes raw upstream codes and rolls them up.
///
/// # Errors
///
/// Returns [`MalformedAvailabilityInput`] for the first code outside the known range.
/// Nothing is guessed for the remaining children.
pub fn rollup_codes(codes: &[i64]) -> Result<AvailabilityStatus, MalformedAvailabilityInput> {
    let statuses = decode_children(codes)?;
    Ok(rollup(&statuses))
}

/// Decodes a list of child codes, failing on the first one that is out of range.
///
/// # Errors
///
/// Returns [`MalformedAvailabilityInput`] naming the offending position.
pub fn decode_children(
    codes: &[i64],
) -> Result<Vec<AvailabilityStatus>, MalformedAvailabilityInput> {
    codes
        .iter()
        .enumerate()
        .map(|(index, &code)| {
            AvailabilityStatus::decode(code)
                .map_err(|source| MalformedAvailabilityInput { index, source })
        })
        .collect()
}
