use serde::Serialize;

use super::request::Episode;
use crate::domain::AvailabilityStatus;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieDetail {
    pub id: i64,
    pub title: String,
    pub original_title: Option<String>,
    pub release_date: Option<String>,
    pub overview: Option<String>,
    pub backdrop_path: Option<String>,
    pub poster_path: Option<String>,
    /// `None` when the title has never been requested.
    pub media_availability: Option<AvailabilityStatus>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub anomalies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TvSeasonSummary {
    pub season_number: i64,
    pub season: String,
    pub name: Option<String>,
    pub episode_count: Option<i64>,
    pub air_date: Option<String>,
    pub availability: Option<AvailabilityStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TvDetail {
    pub id: i64,
    pub title: String,
    pub original_title: Option<String>,
    pub first_air_date: Option<String>,
    pub overview: Option<String>,
    pub backdrop_path: Option<String>,
    pub poster_path: Option<String>,
    pub media_availability: Option<AvailabilityStatus>,
    pub seasons: Vec<TvSeasonSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub anomalies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonDetail {
    pub id: i64,
    pub season_number: i64,
    pub season: String,
    pub name: Option<String>,
    pub overview: Option<String>,
    pub air_date: Option<String>,
    pub availability: AvailabilityStatus,
    pub episodes: Vec<Episode>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub anomalies: Vec<String>,
}
