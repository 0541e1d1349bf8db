//! Request projection: raw upstream records in, normalized pages out.
//!
//! Everything in here is pure and synchronous. The same input always yields the same
//! page, including element order.

use chrono::{DateTime, Utc};
use std::cmp::Reverse;
use thiserror::Error;
use tracing::{debug, warn};

use super::validation::{ParameterError, RequestQuery, validate_skip_in_range};
use crate::clients::{
    RawMedia, RawMediaInfo, RawMovieDetail, RawRequest, RawSeasonDetail, RawSeasonStatus,
    RawTvDetail, UndecodableRequest,
};
use crate::constants::{defaults, metrics as metric_names};
use crate::domain::{
    AvailabilityStatus, InvalidStatusCode, MalformedAvailabilityInput, MediaKind, RequestSort,
    RequestStatus, decode_children, rollup, season_label,
};
use crate::models::{
    DuplicateEpisode, Episode, MovieDetail, MovieRequest, Page, ProjectionFailure, Season,
    SeasonDetail, TitleRequest, TvDetail, TvRequest, TvSeasonSummary,
};

/// A raw request plus the detail payloads needed to name it and break it into seasons.
#[derive(Debug, Clone)]
pub struct RequestRecord {
    pub request: RawRequest,
    pub movie: Option<RawMovieDetail>,
    pub tv: Option<RawTvDetail>,
    pub seasons: Vec<RawSeasonDetail>,
}

impl RequestRecord {
    #[must_use]
    pub const fn new(request: RawRequest) -> Self {
        Self {
            request,
            movie: None,
            tv: None,
            seasons: Vec::new(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error(transparent)]
    InvalidStatusCode(#[from] InvalidStatusCode),

    #[error(transparent)]
    MalformedAvailabilityInput(#[from] MalformedAvailabilityInput),

    #[error(transparent)]
    DuplicateEpisode(#[from] DuplicateEpisode),

    #[error("Request has no media record")]
    MissingMedia,

    #[error("Conflicting media type: {0}")]
    AmbiguousMediaType(String),

    #[error("Cannot tell whether the request is for a movie or a show")]
    UnknownMediaType,

    #[error("Show has no seasons in scope")]
    NoSeasons,
}

impl ProjectionError {
    /// Failures caused by status codes outside the known mapping.
    #[must_use]
    pub const fn is_contract_drift(&self) -> bool {
        matches!(
            self,
            Self::InvalidStatusCode(_) | Self::MalformedAvailabilityInput(_)
        )
    }
}

#[derive(Debug, Error)]
#[error("Projection failed for request {request_id}: {cause}")]
pub struct ProjectionFailed {
    pub request_id: i64,
    #[source]
    pub cause: ProjectionError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectionOptions {
    /// Leave season 0 out of TV projections.
    pub skip_specials: bool,
}

impl Default for ProjectionOptions {
    fn default() -> Self {
        Self {
            skip_specials: true,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Classified {
    kind: MediaKind,
    media_status: AvailabilityStatus,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RequestProjector {
    options: ProjectionOptions,
}

impl RequestProjector {
    #[must_use]
    pub const fn new(options: ProjectionOptions) -> Self {
        Self { options }
    }

    /// Filters, sorts, projects and windows a set of raw records.
    ///
    /// Records that fail to project are left out of `items` and `results` and reported
    /// in the page's error tally instead.
    ///
    /// # Errors
    ///
    /// Returns [`ParameterError::SkipOutOfRange`] if `skip` lands past the filtered set.
    pub fn project_page(
        &self,
        records: &[RequestRecord],
        query: &RequestQuery,
    ) -> Result<Page<TitleRequest>, ParameterError> {
        self.project_listing(records, &[], query)
    }

    /// Like [`project_page`](Self::project_page), with entries that could not be decoded
    /// at all added to the error tally.
    ///
    /// Undecodable entries are counted regardless of filters, since none can be evaluated.
    pub fn project_listing(
        &self,
        records: &[RequestRecord],
        rejected: &[UndecodableRequest],
        query: &RequestQuery,
    ) -> Result<Page<TitleRequest>, ParameterError> {
        let mut failures: Vec<ProjectionFailure> = rejected.iter().map(report_rejected).collect();
        let mut selected = Vec::with_capacity(records.len());

        for record in records {
            match classify(record, query) {
                Ok(Some(classified)) => selected.push((record, classified)),
                Ok(None) => {}
                Err(failed) => failures.push(report_failure(failed)),
            }
        }

        // Newest first; stable, so ties keep upstream order.
        selected.sort_by_key(|(record, _)| Reverse(sort_key(record, query.sort)));

        let mut items = Vec::new();
        for (record, classified) in selected {
            match self.project_classified(record, classified) {
                Ok(mut titles) => items.append(&mut titles),
                Err(cause) => failures.push(report_failure(ProjectionFailed {
                    request_id: record.request.id,
                    cause,
                })),
            }
        }

        debug!(
            projected = items.len(),
            failed = failures.len(),
            input = records.len(),
            "Projected request records"
        );

        let results = u32::try_from(items.len()).unwrap_or(u32::MAX);
        validate_skip_in_range(query.skip, results)?;

        Ok(Page::window(items, query.take, query.skip, failures))
    }

    /// Projects a single record with no filtering.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionFailed`] wrapping the first problem found in the record.
    pub fn project_record(
        &self,
        record: &RequestRecord,
    ) -> Result<Vec<TitleRequest>, ProjectionFailed> {
        let request_id = record.request.id;
        let fail = |cause: ProjectionError| ProjectionFailed { request_id, cause };

        let kind = media_kind(record).map_err(fail)?;
        let media = media_of(&record.request).map_err(fail)?;
        let media_status =
            AvailabilityStatus::decode(media.status).map_err(|e| fail(e.into()))?;

        self.project_classified(record, Classified { kind, media_status })
            .map_err(fail)
    }

    fn project_classified(
        &self,
        record: &RequestRecord,
        classified: Classified,
    ) -> Result<Vec<TitleRequest>, ProjectionError> {
        match classified.kind {
            MediaKind::Movie => Ok(vec![project_movie(record, classified.media_status)]),
            MediaKind::Tv => self.project_tv(record, classified.media_status),
        }
    }

    fn project_tv(
        &self,
        record: &RequestRecord,
        media_status: AvailabilityStatus,
    ) -> Result<Vec<TitleRequest>, ProjectionError> {
        let request = &record.request;
        let media = media_of(request)?;

        let numbers = self.seasons_in_scope(record, media);
        if numbers.is_empty() {
            return Err(ProjectionError::NoSeasons);
        }

        let seasons = numbers
            .into_iter()
            .map(|number| build_season(record, media, media_status, number))
            .collect::<Result<Vec<_>, _>>()?;

        let season_statuses: Vec<_> = seasons.iter().map(|s| s.availability).collect();
        let tv_title_availability = rollup(&season_statuses);

        let tv_title = record
            .tv
            .as_ref()
            .and_then(|tv| tv.name.clone())
            .unwrap_or_else(|| defaults::UNKNOWN_TV_TITLE.to_string());

        Ok(seasons
            .into_iter()
            .map(|season| {
                TitleRequest::Tv(TvRequest {
                    request_id: request.id,
                    tv_title: tv_title.clone(),
                    tv_title_availability,
                    tv_season: season.season,
                    tv_season_availability: season.availability,
                    tv_episodes: season.episodes,
                    request_date: request.created_at.clone(),
                })
            })
            .collect())
    }

    /// Requested seasons, falling back to every season the show lists.
    fn seasons_in_scope(&self, record: &RequestRecord, media: &RawMedia) -> Vec<i64> {
        let mut numbers: Vec<i64> = if !record.request.seasons.is_empty() {
            record
                .request
                .seasons
                .iter()
                .map(|s| s.season_number)
                .collect()
        } else if let Some(tv) = &record.tv
            && !tv.seasons.is_empty()
        {
            tv.seasons.iter().map(|s| s.season_number).collect()
        } else {
            media.seasons.iter().map(|s| s.season_number).collect()
        };

        if self.options.skip_specials {
            numbers.retain(|n| *n != 0);
        }
        numbers.sort_unstable();
        numbers.dedup();
        numbers
    }

    #[must_use]
    pub fn movie_detail(&self, raw: &RawMovieDetail) -> MovieDetail {
        let mut anomalies = Vec::new();
        let media_availability = raw
            .media_info
            .as_ref()
            .map(|info| decode_or_unknown(info.status, "mediaInfo.status", &mut anomalies));

        MovieDetail {
            id: raw.id,
            title: raw
                .title
                .clone()
                .unwrap_or_else(|| defaults::UNKNOWN_MOVIE_TITLE.to_string()),
            original_title: raw.original_title.clone(),
            release_date: raw.release_date.clone(),
            overview: raw.overview.clone(),
            backdrop_path: raw.backdrop_path.clone(),
            poster_path: raw.poster_path.clone(),
            media_availability,
            anomalies,
        }
    }

    #[must_use]
    pub fn tv_detail(&self, raw: &RawTvDetail) -> TvDetail {
        let mut anomalies = Vec::new();
        let media_info = raw.media_info.as_ref();
        let media_availability = media_info
            .map(|info| info.status)
            .map(|code| decode_or_unknown(code, "mediaInfo.status", &mut anomalies));

        let seasons = raw
            .seasons
            .iter()
            .map(|season| {
                let availability = media_info
                    .and_then(|info| find_season_status(&info.seasons, season.season_number))
                    .map(|code| {
                        let field = format!("mediaInfo.seasons[{}].status", season.season_number);
                        decode_or_unknown(code, &field, &mut anomalies)
                    });

                TvSeasonSummary {
                    season_number: season.season_number,
                    season: season_label(season.season_number),
                    name: season.name.clone(),
                    episode_count: season.episode_count,
                    air_date: season.air_date.clone(),
                    availability,
                }
            })
            .collect();

        TvDetail {
            id: raw.id,
            title: raw
                .name
                .clone()
                .unwrap_or_else(|| defaults::UNKNOWN_TV_TITLE.to_string()),
            original_title: raw.original_name.clone(),
            first_air_date: raw.first_air_date.clone(),
            overview: raw.overview.clone(),
            backdrop_path: raw.backdrop_path.clone(),
            poster_path: raw.poster_path.clone(),
            media_availability,
            seasons,
            anomalies,
        }
    }

    /// Projects a season listing. Availability comes from the show's media info when
    /// given; undecodable codes are shown as `UNKNOWN` and listed in `anomalies`.
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateEpisode`] if the listing repeats an episode number.
    pub fn season_detail(
        &self,
        raw: &RawSeasonDetail,
        media_info: Option<&RawMediaInfo>,
    ) -> Result<SeasonDetail, DuplicateEpisode> {
        let mut anomalies = Vec::new();
        let season_code = media_info.and_then(|info| {
            find_season_status(&info.seasons, raw.season_number).or_else(|| Some(info.status))
        });

        let episodes = raw
            .episodes
            .iter()
            .map(|ep| {
                let availability = match ep.status.or(season_code) {
                    Some(code) => {
                        let field = format!("episodes[{}].status", ep.episode_number);
                        decode_or_unknown(code, &field, &mut anomalies)
                    }
                    None => AvailabilityStatus::Unknown,
                };
                Episode::new(ep.episode_number, ep.name.clone(), availability)
            })
            .collect();

        let fallback =
            season_code.map(|code| decode_or_unknown(code, "season status", &mut anomalies));
        let season = Season::new(raw.season_number, episodes, fallback)?;

        Ok(SeasonDetail {
            id: raw.id,
            season_number: raw.season_number,
            season: season.season,
            name: raw.name.clone(),
            overview: raw.overview.clone(),
            air_date: raw.air_date.clone(),
            availability: season.availability,
            episodes: season.episodes,
            anomalies,
        })
    }
}

fn classify(
    record: &RequestRecord,
    query: &RequestQuery,
) -> Result<Option<Classified>, ProjectionFailed> {
    let request = &record.request;
    let request_id = request.id;
    let fail = |cause: ProjectionError| ProjectionFailed { request_id, cause };

    let kind = media_kind(record).map_err(fail)?;
    if !query.media_type.matches(kind) {
        return Ok(None);
    }

    // An undecodable media status can't be filtered either way, so it is always reported.
    let media = media_of(request).map_err(fail)?;
    let media_status = AvailabilityStatus::decode(media.status).map_err(|e| fail(e.into()))?;

    let request_status = RequestStatus::from_code(request.status);
    if request_status.is_none() {
        warn!(
            request_id,
            code = request.status,
            "Unrecognized request status code; status filters will not match"
        );
        metrics::counter!(metric_names::STATUS_CODE_DRIFT).increment(1);
    }

    if !query.filter.matches(request_status, media_status) {
        return Ok(None);
    }

    if let Some(since) = query.since {
        match parse_timestamp(&request.created_at) {
            Some(created) if created >= since => {}
            _ => return Ok(None),
        }
    }

    Ok(Some(Classified { kind, media_status }))
}

fn media_of(request: &RawRequest) -> Result<&RawMedia, ProjectionError> {
    request.media.as_ref().ok_or(ProjectionError::MissingMedia)
}

/// Request `type`, then `media.mediaType`, then which external ids are present.
fn media_kind(record: &RequestRecord) -> Result<MediaKind, ProjectionError> {
    if record.movie.is_some() && record.tv.is_some() {
        return Err(ProjectionError::AmbiguousMediaType(
            "record carries both movie and tv details".to_string(),
        ));
    }

    let request = &record.request;
    let declared = request.media_type.as_deref().and_then(MediaKind::from_upstream);
    let from_media = request
        .media
        .as_ref()
        .and_then(|m| m.media_type.as_deref())
        .and_then(MediaKind::from_upstream);

    let kind = match (declared, from_media) {
        (Some(a), Some(b)) if a != b => {
            return Err(ProjectionError::AmbiguousMediaType(format!(
                "request says {a}, media says {b}"
            )));
        }
        (Some(kind), _) | (None, Some(kind)) => kind,
        (None, None) => match &request.media {
            Some(media) if media.tvdb_id.is_some() => MediaKind::Tv,
            Some(media) if media.tmdb_id.is_some() => MediaKind::Movie,
            _ => return Err(ProjectionError::UnknownMediaType),
        },
    };

    let detail_kind = match (&record.movie, &record.tv) {
        (Some(_), _) => Some(MediaKind::Movie),
        (_, Some(_)) => Some(MediaKind::Tv),
        _ => None,
    };
    if let Some(detail_kind) = detail_kind
        && detail_kind != kind
    {
        return Err(ProjectionError::AmbiguousMediaType(format!(
            "request says {kind}, details are for {detail_kind}"
        )));
    }

    Ok(kind)
}

fn project_movie(record: &RequestRecord, media_status: AvailabilityStatus) -> TitleRequest {
    let title = record
        .movie
        .as_ref()
        .and_then(|m| m.title.clone())
        .unwrap_or_else(|| defaults::UNKNOWN_MOVIE_TITLE.to_string());

    TitleRequest::Movie(MovieRequest {
        request_id: record.request.id,
        title,
        media_availability: media_status,
        request_date: record.request.created_at.clone(),
    })
}

/// Episode status comes from the episode, else its season, else the whole title.
fn build_season(
    record: &RequestRecord,
    media: &RawMedia,
    media_status: AvailabilityStatus,
    number: i64,
) -> Result<Season, ProjectionError> {
    let season_code = find_season_status(&media.seasons, number).or_else(|| {
        record
            .tv
            .as_ref()
            .and_then(|tv| tv.media_info.as_ref())
            .and_then(|info| find_season_status(&info.seasons, number))
    });
    let inherited = season_code.unwrap_or_else(|| media_status.encode());

    let detail = record.seasons.iter().find(|s| s.season_number == number);
    let episodes: Vec<Episode> = match detail {
        Some(detail) => {
            let codes: Vec<i64> = detail
                .episodes
                .iter()
                .map(|ep| ep.status.unwrap_or(inherited))
                .collect();
            let statuses = decode_children(&codes)?;

            detail
                .episodes
                .iter()
                .zip(statuses)
                .map(|(ep, status)| Episode::new(ep.episode_number, ep.name.clone(), status))
                .collect()
        }
        None => Vec::new(),
    };

    // The inherited code only matters when no episode carries the season's status.
    let fallback = if episodes.is_empty() {
        Some(AvailabilityStatus::decode(inherited)?)
    } else {
        None
    };
    Ok(Season::new(number, episodes, fallback)?)
}

fn find_season_status(seasons: &[RawSeasonStatus], number: i64) -> Option<i64> {
    seasons
        .iter()
        .find(|s| s.season_number == number)
        .map(|s| s.status)
}

fn sort_key(record: &RequestRecord, sort: RequestSort) -> Option<DateTime<Utc>> {
    let request = &record.request;
    match sort {
        RequestSort::Added => parse_timestamp(&request.created_at),
        RequestSort::Modified => request
            .updated_at
            .as_deref()
            .and_then(parse_timestamp)
            .or_else(|| parse_timestamp(&request.created_at)),
    }
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn decode_or_unknown(code: i64, field: &str, anomalies: &mut Vec<String>) -> AvailabilityStatus {
    match AvailabilityStatus::decode(code) {
        Ok(status) => status,
        Err(e) => {
            warn!(
                field,
                code,
                "Upstream status contract drift; showing UNKNOWN"
            );
            metrics::counter!(metric_names::STATUS_CODE_DRIFT).increment(1);
            anomalies.push(format!("{field}: {e}"));
            AvailabilityStatus::Unknown
        }
    }
}

fn report_failure(failed: ProjectionFailed) -> ProjectionFailure {
    if failed.cause.is_contract_drift() {
        warn!(
            request_id = failed.request_id,
            error = %failed.cause,
            "Upstream status contract drift; record excluded"
        );
        metrics::counter!(metric_names::STATUS_CODE_DRIFT).increment(1);
    } else {
        warn!(
            request_id = failed.request_id,
            error = %failed.cause,
            "Failed to project request; record excluded"
        );
    }
    metrics::counter!(metric_names::PROJECTION_FAILURES).increment(1);

    ProjectionFailure {
        request_id: Some(failed.request_id),
        reason: failed.cause.to_string(),
    }
}

fn report_rejected(rejected: &UndecodableRequest) -> ProjectionFailure {
    warn!(
        request_id = rejected.request_id,
        reason = %rejected.reason,
        "Upstream record does not match the expected shape; record excluded"
    );
    metrics::counter!(metric_names::STATUS_CODE_DRIFT).increment(1);
    metrics::counter!(metric_names::PROJECTION_FAILURES).increment(1);

    ProjectionFailure {
        request_id: rejected.request_id,
        reason: rejected.to_string(),
    }
}
