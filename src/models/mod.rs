//! Normalized shapes handed to callers. Every value here is recomputed per query.

pub mod detail;
pub mod page;
pub mod request;

pub use detail::{MovieDetail, SeasonDetail, TvDetail, TvSeasonSummary};
pub use page::{Page, ProjectionFailure, page_count};
pub use request::{DuplicateEpisode, Episode, MovieRequest, Season, TitleRequest, TvRequest};
