//! Fetch-then-project orchestration over an [`UpstreamSource`].

use futures::stream::{self, StreamExt};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::projector::{ProjectionError, ProjectionOptions, RequestProjector, RequestRecord};
use super::validation::{ParameterError, RawRequestQuery};
use crate::clients::{
    ClientError, RawMovieDetail, RawRequest, RawSeasonDetail, RawTvDetail, RequestListQuery,
    ServerStatus, UpstreamError, UpstreamSource,
};
use crate::constants::limits;
use crate::domain::MediaKind;
use crate::models::{MovieDetail, Page, SeasonDetail, TitleRequest, TvDetail};

const DETAIL_CONCURRENCY: usize = 4;

#[derive(Debug, Error)]
pub enum RequestError {
    #[error(transparent)]
    Parameter(#[from] ParameterError),

    #[error(transparent)]
    Upstream(UpstreamError),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error(transparent)]
    Projection(#[from] ProjectionError),
}

impl From<ClientError> for RequestError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Upstream(e) => Self::Upstream(e),
            other => Self::Transport(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestServiceOptions {
    pub default_take: u32,
    pub upstream_page_size: u32,
    pub projection: ProjectionOptions,
}

impl Default for RequestServiceOptions {
    fn default() -> Self {
        Self {
            default_take: limits::DEFAULT_TAKE,
            upstream_page_size: limits::UPSTREAM_PAGE_SIZE,
            projection: ProjectionOptions::default(),
        }
    }
}

#[derive(Clone)]
pub struct RequestService {
    source: Arc<dyn UpstreamSource>,
    projector: RequestProjector,
    options: RequestServiceOptions,
}

impl RequestService {
    #[must_use]
    pub fn new(source: Arc<dyn UpstreamSource>, options: RequestServiceOptions) -> Self {
        Self {
            source,
            projector: RequestProjector::new(options.projection),
            options,
        }
    }

    pub async fn status(&self) -> Result<ServerStatus, RequestError> {
        Ok(self.source.status().await?)
    }

    /// Lists requests as normalized titles.
    ///
    /// Parameters are validated before anything is fetched. Every upstream page is
    /// collected first so that filtering happens before the pagination math.
    pub async fn list_requests(
        &self,
        raw_query: &RawRequestQuery,
    ) -> Result<Page<TitleRequest>, RequestError> {
        let query = raw_query.validate(self.options.default_take)?;

        let mut upstream = RequestListQuery {
            take: self.options.upstream_page_size.max(1),
            skip: 0,
            filter: query.filter,
            sort: query.sort,
        };

        let mut requests: Vec<RawRequest> = Vec::new();
        let mut rejected = Vec::new();
        loop {
            let response = self.source.requests(&upstream).await?;
            let pages = response.page_info.pages;
            let fetched = response.results.len();
            let (decoded, undecodable) = response.into_requests();
            requests.extend(decoded);
            rejected.extend(undecodable);

            let current_page = upstream.skip / upstream.take + 1;
            debug!(
                page = current_page,
                pages,
                fetched,
                "Fetched upstream request page"
            );

            if fetched == 0 || pages <= i64::from(current_page) {
                break;
            }
            upstream.skip += upstream.take;
        }

        let records = self.enrich(requests).await;
        let page = self
            .projector
            .project_listing(&records, &rejected, &query)?;

        info!(
            results = page.results,
            errors = page.errors,
            page = page.page,
            pages = page.pages,
            "Listed requests"
        );

        Ok(page)
    }

    pub async fn movie(&self, tmdb_id: i64) -> Result<MovieDetail, RequestError> {
        let raw = self.source.movie(tmdb_id).await?;
        Ok(self.projector.movie_detail(&raw))
    }

    pub async fn tv(&self, tmdb_id: i64) -> Result<TvDetail, RequestError> {
        let raw = self.source.tv(tmdb_id).await?;
        Ok(self.projector.tv_detail(&raw))
    }

    pub async fn season(
        &self,
        tmdb_id: i64,
        season_number: i64,
    ) -> Result<SeasonDetail, RequestError> {
        let (show, season) = futures::join!(
            self.source.tv(tmdb_id),
            self.source.season(tmdb_id, season_number)
        );
        let season = season?;

        // The season listing still projects without availability if the show lookup fails.
        let show = match show {
            Ok(show) => Some(show),
            Err(e) => {
                warn!(
                    tmdb_id,
                    error = %e,
                    "Failed to fetch show for season availability"
                );
                None
            }
        };
        let media_info = show.as_ref().and_then(|s| s.media_info.as_ref());

        self.projector
            .season_detail(&season, media_info)
            .map_err(|e| RequestError::Projection(e.into()))
    }

    /// Attaches title and season details to each request, fetching each id once.
    async fn enrich(&self, requests: Vec<RawRequest>) -> Vec<RequestRecord> {
        let mut movie_ids = BTreeSet::new();
        let mut tv_ids = BTreeSet::new();
        for request in &requests {
            match (kind_hint(request), tmdb_id(request)) {
                (Some(MediaKind::Movie), Some(id)) => {
                    movie_ids.insert(id);
                }
                (Some(MediaKind::Tv), Some(id)) => {
                    tv_ids.insert(id);
                }
                _ => {}
            }
        }

        let movies: HashMap<i64, RawMovieDetail> = self
            .fetch_all(movie_ids, |id| async move { self.source.movie(id).await })
            .await;
        let shows: HashMap<i64, RawTvDetail> = self
            .fetch_all(tv_ids, |id| async move { self.source.tv(id).await })
            .await;

        let mut season_keys = BTreeSet::new();
        for request in &requests {
            if kind_hint(request) != Some(MediaKind::Tv) {
                continue;
            }
            let Some(id) = tmdb_id(request) else {
                continue;
            };
            for number in self.season_numbers(request, shows.get(&id)) {
                season_keys.insert((id, number));
            }
        }

        let seasons: HashMap<(i64, i64), RawSeasonDetail> = self
            .fetch_all(season_keys, |(id, number)| async move {
                self.source.season(id, number).await
            })
            .await;

        requests
            .into_iter()
            .map(|request| {
                let mut record = RequestRecord::new(request);
                let hint = kind_hint(&record.request);
                let Some(id) = tmdb_id(&record.request) else {
                    return record;
                };

                match hint {
                    Some(MediaKind::Movie) => record.movie = movies.get(&id).cloned(),
                    Some(MediaKind::Tv) => {
                        let numbers = self.season_numbers(&record.request, shows.get(&id));
                        record.seasons = numbers
                            .into_iter()
                            .filter_map(|n| seasons.get(&(id, n)).cloned())
                            .collect();
                        record.tv = shows.get(&id).cloned();
                    }
                    None => {}
                }
                record
            })
            .collect()
    }

    async fn fetch_all<K, T, F, Fut>(&self, keys: BTreeSet<K>, fetch: F) -> HashMap<K, T>
    where
        K: Copy + Eq + std::hash::Hash + std::fmt::Debug,
        F: Fn(K) -> Fut,
        Fut: std::future::Future<Output = Result<T, ClientError>>,
    {
        stream::iter(keys)
            .map(|key| {
                let fut = fetch(key);
                async move { (key, fut.await) }
            })
            .buffer_unordered(DETAIL_CONCURRENCY)
            .filter_map(|(key, result)| async move {
                match result {
                    Ok(detail) => Some((key, detail)),
                    Err(e) => {
                        warn!(
                            key = ?key,
                            error = %e,
                            "Failed to fetch detail; using fallbacks"
                        );
                        None
                    }
                }
            })
            .collect()
            .await
    }

    fn season_numbers(&self, request: &RawRequest, show: Option<&RawTvDetail>) -> Vec<i64> {
        let mut numbers: Vec<i64> = if request.seasons.is_empty() {
            show.map(|s| s.seasons.iter().map(|season| season.season_number).collect())
                .unwrap_or_default()
        } else {
            request.seasons.iter().map(|s| s.season_number).collect()
        };

        if self.options.projection.skip_specials {
            numbers.retain(|n| *n != 0);
        }
        numbers.sort_unstable();
        numbers.dedup();
        numbers
    }
}

/// Best guess at the media kind, only used to decide which details to fetch.
fn kind_hint(request: &RawRequest) -> Option<MediaKind> {
    request
        .media_type
        .as_deref()
        .and_then(MediaKind::from_upstream)
        .or_else(|| {
            let media = request.media.as_ref()?;
            media
                .media_type
                .as_deref()
                .and_then(MediaKind::from_upstream)
                .or(if media.tvdb_id.is_some() {
                    Some(MediaKind::Tv)
                } else if media.tmdb_id.is_some() {
                    Some(MediaKind::Movie)
                } else {
                    None
                })
        })
}

fn tmdb_id(request: &RawRequest) -> Option<i64> {
    request.media.as_ref().and_then(|m| m.tmdb_id)
}
