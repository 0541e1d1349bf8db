use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use url::Url;

use super::{ClientError, RequestListQuery, UpstreamError, UpstreamSource};
use crate::config::OverseerrConfig;

const API_PREFIX: &str = "/api/v1";

fn default_media_status() -> i64 {
    1
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub pages: i64,
    #[serde(default)]
    pub page_size: i64,
    pub results: i64,
    #[serde(default)]
    pub page: i64,
}

/// One page of `GET /request`.
///
/// Entries stay as raw JSON until [`into_requests`](Self::into_requests) so that one
/// malformed record cannot fail the whole page.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestListResponse {
    pub page_info: PageInfo,
    #[serde(default)]
    pub results: Vec<serde_json::Value>,
}

/// A request entry that does not have the expected shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Undecodable request record: {reason}")]
pub struct UndecodableRequest {
    pub request_id: Option<i64>,
    pub reason: String,
}

impl RequestListResponse {
    /// Decodes each entry on its own, splitting good records from malformed ones.
    #[must_use]
    pub fn into_requests(self) -> (Vec<RawRequest>, Vec<UndecodableRequest>) {
        let mut requests = Vec::with_capacity(self.results.len());
        let mut rejected = Vec::new();

        for value in self.results {
            let request_id = value.get("id").and_then(serde_json::Value::as_i64);
            match serde_json::from_value::<RawRequest>(value) {
                Ok(request) => requests.push(request),
                Err(e) => rejected.push(UndecodableRequest {
                    request_id,
                    reason: e.to_string(),
                }),
            }
        }

        (requests, rejected)
    }
}

/// One entry of `GET /request`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRequest {
    pub id: i64,

    pub status: i64,

    #[serde(default)]
    pub created_at: String,

    #[serde(default)]
    pub updated_at: Option<String>,

    #[serde(rename = "type", default)]
    pub media_type: Option<String>,

    #[serde(default)]
    pub is4k: bool,

    #[serde(default)]
    pub media: Option<RawMedia>,

    #[serde(default)]
    pub seasons: Vec<RawRequestSeason>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMedia {
    pub id: i64,

    #[serde(default)]
    pub tmdb_id: Option<i64>,

    #[serde(default)]
    pub tvdb_id: Option<i64>,

    #[serde(default = "default_media_status")]
    pub status: i64,

    #[serde(default)]
    pub media_type: Option<String>,

    #[serde(default)]
    pub seasons: Vec<RawSeasonStatus>,
}

/// Per-season availability as tracked on the media record.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSeasonStatus {
    pub season_number: i64,
    #[serde(default = "default_media_status")]
    pub status: i64,
}

/// A season listed on the request (the seasons the user asked for).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRequestSeason {
    pub season_number: i64,
    #[serde(default)]
    pub status: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMediaInfo {
    #[serde(default = "default_media_status")]
    pub status: i64,
    #[serde(default)]
    pub seasons: Vec<RawSeasonStatus>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMovieDetail {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub original_title: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub media_info: Option<RawMediaInfo>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTvDetail {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub original_name: Option<String>,
    #[serde(default)]
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub seasons: Vec<RawTvSeason>,
    #[serde(default)]
    pub media_info: Option<RawMediaInfo>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTvSeason {
    pub id: i64,
    pub season_number: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub episode_count: Option<i64>,
    #[serde(default)]
    pub air_date: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSeasonDetail {
    pub id: i64,
    pub season_number: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub air_date: Option<String>,
    #[serde(default)]
    pub episodes: Vec<RawEpisode>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEpisode {
    pub id: i64,
    pub episode_number: i64,
    #[serde(default)]
    pub season_number: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub air_date: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub still_path: Option<String>,
    /// Not part of the stock payload; present when the server tracks episodes individually.
    #[serde(default)]
    pub status: Option<i64>,
}

/// `GET /status`, passed through untouched.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerStatus {
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_available: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commits_behind: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restart_required: Option<bool>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorEnvelope {
    #[serde(default)]
    error_code: Option<serde_json::Value>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OverseerrClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OverseerrClient {
    #[must_use]
    pub fn new(config: &OverseerrConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(u64::from(config.request_timeout_seconds)))
            .user_agent("overseerr-bridge/0.1")
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build HTTP client with timeout: {e}");
                Client::new()
            });

        Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    fn url(&self, path: &str) -> Result<Url, ClientError> {
        Ok(Url::parse(&format!("{}{API_PREFIX}{path}", self.base_url))?)
    }

    async fn get_json<T>(&self, url: Url) -> Result<T, ClientError>
    where
        T: serde::de::DeserializeOwned,
    {
        debug!(url = %url, "GET");

        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .header("X-Api-Key", &self.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Upstream(upstream_error(status, &body)));
        }

        Ok(response.json().await?)
    }
}

fn upstream_error(status: StatusCode, body: &str) -> UpstreamError {
    let envelope: ErrorEnvelope = serde_json::from_str(body).unwrap_or_default();
    let message = envelope.message.unwrap_or_else(|| {
        if body.is_empty() {
            status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string()
        } else {
            body.to_string()
        }
    });

    UpstreamError {
        status: status.as_u16(),
        error_code: envelope.error_code,
        message,
    }
}

#[async_trait]
impl UpstreamSource for OverseerrClient {
    async fn status(&self) -> Result<ServerStatus, ClientError> {
        let url = self.url("/status")?;
        self.get_json(url).await
    }

    async fn requests(&self, query: &RequestListQuery) -> Result<RequestListResponse, ClientError> {
        let mut url = self.url("/request")?;
        url.query_pairs_mut()
            .append_pair("take", &query.take.to_string())
            .append_pair("skip", &query.skip.to_string())
            .append_pair("sort", query.sort.as_str())
            .append_pair("filter", query.filter.as_str());

        self.get_json(url).await
    }

    async fn movie(&self, tmdb_id: i64) -> Result<RawMovieDetail, ClientError> {
        let url = self.url(&format!("/movie/{tmdb_id}"))?;
        self.get_json(url).await
    }

    async fn tv(&self, tmdb_id: i64) -> Result<RawTvDetail, ClientError> {
        let url = self.url(&format!("/tv/{tmdb_id}"))?;
        self.get_json(url).await
    }

    async fn season(
        &self,
        tmdb_id: i64,
        season_number: i64,
    ) -> Result<RawSeasonDetail, ClientError> {
        let url = self.url(&format!("/tv/{tmdb_id}/season/{season_number}"))?;
        self.get_json(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_request_page() {
        let json = r#"{
            "pageInfo": { "pages": 3, "pageSize": 20, "results": 45, "page": 1 },
            "results": [
                {
                    "id": 7,
                    "status": 2,
                    "createdAt": "2020-09-12T10:00:27.000Z",
                    "updatedAt": "2020-09-12T10:00:27.000Z",
                    "type": "tv",
                    "is4k": false,
                    "media": {
                        "id": 3,
                        "tmdbId": 1399,
                        "tvdbId": 121361,
                        "status": 4,
                        "mediaType": "tv",
                        "seasons": [{ "id": 1, "seasonNumber": 1, "status": 5 }]
                    },
                    "seasons": [{ "id": 11, "seasonNumber": 1, "status": 2 }]
                }
            ]
        }"#;

        let page: RequestListResponse = serde_json::from_str(json).unwrap();
        assert_eq!(page.page_info.pages, 3);
        assert_eq!(page.results.len(), 1);

        let (requests, rejected) = page.into_requests();
        assert!(rejected.is_empty());
        let request = &requests[0];
        assert_eq!(request.media_type.as_deref(), Some("tv"));
        let media = request.media.as_ref().unwrap();
        assert_eq!(media.tvdb_id, Some(121_361));
        assert_eq!(media.seasons[0].status, 5);
        assert_eq!(request.seasons[0].season_number, 1);
    }

    #[test]
    fn malformed_entry_does_not_sink_the_page() {
        let json = r#"{
            "pageInfo": { "pages": 1, "pageSize": 20, "results": 3, "page": 1 },
            "results": [
                { "id": 1, "status": 2, "createdAt": "2024-01-01T00:00:00.000Z", "type": "movie",
                  "media": { "id": 10, "tmdbId": 603, "status": 5, "mediaType": "movie" } },
                { "id": 2, "status": 2, "createdAt": "2024-01-02T00:00:00.000Z", "type": "movie",
                  "media": { "id": 20, "tmdbId": 550, "status": null, "mediaType": "movie" } },
                { "id": 3, "status": "7", "createdAt": "2024-01-03T00:00:00.000Z" }
            ]
        }"#;

        let page: RequestListResponse = serde_json::from_str(json).unwrap();
        let (requests, rejected) = page.into_requests();

        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].id, 1);
        let ids: Vec<_> = rejected.iter().map(|r| r.request_id).collect();
        assert_eq!(ids, vec![Some(2), Some(3)]);
        assert!(rejected[0].reason.contains("null"));
    }

    #[test]
    fn missing_media_status_defaults_to_unknown_code() {
        let media: RawMedia = serde_json::from_str(r#"{ "id": 1, "tmdbId": 5 }"#).unwrap();
        assert_eq!(media.status, 1);
    }

    #[test]
    fn upstream_error_reads_envelope() {
        let err = upstream_error(
            StatusCode::NOT_FOUND,
            r#"{ "errorCode": "NOT_FOUND", "message": "Movie not found." }"#,
        );
        assert_eq!(err.status, 404);
        assert_eq!(err.message, "Movie not found.");
        assert_eq!(
            err.error_code,
            Some(serde_json::Value::String("NOT_FOUND".to_string()))
        );
    }

    #[test]
    fn upstream_error_falls_back_to_body() {
        let err = upstream_error(StatusCode::UNAUTHORIZED, "");
        assert_eq!(err.status, 401);
        assert_eq!(err.message, "Unauthorized");
        assert!(err.error_code.is_none());

        let err = upstream_error(StatusCode::BAD_REQUEST, "bad things");
        assert_eq!(err.message, "bad things");
    }

    #[test]
    fn server_status_keeps_unknown_fields() {
        let status: ServerStatus = serde_json::from_str(
            r#"{ "version": "1.33.2", "commitTag": "abc", "updateAvailable": false, "commitsBehind": 0, "restartRequired": false, "extraField": 42 }"#,
        )
        .unwrap();
        assert_eq!(status.version, "1.33.2");
        assert_eq!(status.extra.get("extraField"), Some(&serde_json::json!(42)));

        let back = serde_json::to_value(&status).unwrap();
        assert_eq!(back["extraField"], 42);
        assert_eq!(back["commitTag"], "abc");
    }
}
