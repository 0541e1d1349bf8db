use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::constants::limits;
use crate::domain::{MediaTypeFilter, ParseVariantError, RequestFilter, RequestSort};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParameterError {
    #[error("Invalid take: {0}. Take must be between 1 and {max}", max = limits::MAX_TAKE)]
    Take(i64),

    #[error("Invalid skip: {0}. Skip must be zero or positive")]
    Skip(i64),

    #[error(transparent)]
    Variant(#[from] ParseVariantError),

    #[error("Invalid since timestamp '{0}'. Expected RFC 3339, e.g. 2020-09-12T10:00:27.000Z")]
    Since(String),

    #[error("Skip {skip} is past the end of {results} results")]
    SkipOutOfRange { skip: u32, results: u32 },
}

/// Validated listing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestQuery {
    pub take: u32,
    pub skip: u32,
    pub filter: RequestFilter,
    pub sort: RequestSort,
    pub media_type: MediaTypeFilter,
    pub since: Option<DateTime<Utc>>,
}

impl Default for RequestQuery {
    fn default() -> Self {
        Self {
            take: limits::DEFAULT_TAKE,
            skip: 0,
            filter: RequestFilter::default(),
            sort: RequestSort::default(),
            media_type: MediaTypeFilter::default(),
            since: None,
        }
    }
}

/// Unvalidated listing parameters as a caller hands them over.
#[derive(Debug, Clone, Default)]
pub struct RawRequestQuery {
    pub take: Option<i64>,
    pub skip: Option<i64>,
    pub filter: Option<String>,
    pub sort: Option<String>,
    pub media_type: Option<String>,
    pub since: Option<String>,
}

impl RawRequestQuery {
    /// Validates every parameter before any upstream or projection work happens.
    ///
    /// # Errors
    ///
    /// Returns the first [`ParameterError`] encountered.
    pub fn validate(&self, default_take: u32) -> Result<RequestQuery, ParameterError> {
        let take = match self.take {
            Some(take) => validate_take(take)?,
            None => default_take,
        };
        let skip = match self.skip {
            Some(skip) => validate_skip(skip)?,
            None => 0,
        };
        let filter = match self.filter.as_deref() {
            Some(filter) => filter.parse()?,
            None => RequestFilter::default(),
        };
        let sort = match self.sort.as_deref() {
            Some(sort) => sort.parse()?,
            None => RequestSort::default(),
        };
        let media_type = match self.media_type.as_deref() {
            Some(media_type) => media_type.parse()?,
            None => MediaTypeFilter::default(),
        };
        let since = self.since.as_deref().map(validate_since).transpose()?;

        Ok(RequestQuery {
            take,
            skip,
            filter,
            sort,
            media_type,
            since,
        })
    }
}

pub fn validate_take(take: i64) -> Result<u32, ParameterError> {
    if !(1..=i64::from(limits::MAX_TAKE)).contains(&take) {
        return Err(ParameterError::Take(take));
    }
    u32::try_from(take).map_err(|_| ParameterError::Take(take))
}

pub fn validate_skip(skip: i64) -> Result<u32, ParameterError> {
    if skip < 0 {
        return Err(ParameterError::Skip(skip));
    }
    u32::try_from(skip).map_err(|_| ParameterError::Skip(skip))
}

pub fn validate_since(since: &str) -> Result<DateTime<Utc>, ParameterError> {
    DateTime::parse_from_rfc3339(since.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ParameterError::Since(since.to_string()))
}

/// Checked once the filtered result count is known.
pub fn validate_skip_in_range(skip: u32, results: u32) -> Result<(), ParameterError> {
    if skip > 0 && skip >= results {
        return Err(ParameterError::SkipOutOfRange { skip, results });
    }
    Ok(())
}
