//! Upstream collaborator: raw payload shapes and the HTTP client that fetches them.

pub mod overseerr;

pub use overseerr::{
    OverseerrClient, PageInfo, RawEpisode, RawMedia, RawMediaInfo, RawMovieDetail, RawRequest,
    RawRequestSeason, RawSeasonDetail, RawSeasonStatus, RawTvDetail, RawTvSeason,
    RequestListResponse, ServerStatus, UndecodableRequest,
};

use crate::domain::{RequestFilter, RequestSort};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upstream 4xx envelope, passed through as received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[serde(rename_all = "camelCase")]
#[error("Upstream error ({status}): {message}")]
pub struct UpstreamError {
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<serde_json::Value>,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid upstream URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Query for one page of `GET /request`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestListQuery {
    pub take: u32,
    pub skip: u32,
    pub filter: RequestFilter,
    pub sort: RequestSort,
}

/// Source of raw upstream payloads.
///
/// [`OverseerrClient`] talks HTTP; tests plug in fixtures.
#[async_trait]
pub trait UpstreamSource: Send + Sync {
    async fn status(&self) -> Result<ServerStatus, ClientError>;

    async fn requests(&self, query: &RequestListQuery) -> Result<RequestListResponse, ClientError>;

    async fn movie(&self, tmdb_id: i64) -> Result<RawMovieDetail, ClientError>;

    async fn tv(&self, tmdb_id: i64) -> Result<RawTvDetail, ClientError>;

    async fn season(
        &self,
        tmdb_id: i64,
        season_number: i64,
    ) -> Result<RawSeasonDetail, ClientError>;
}
