use serde::Serialize;
use thiserror::Error;

use crate::domain::{AvailabilityStatus, episode_label, rollup, season_label};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Duplicate episode {episode_number} in season {season}")]
pub struct DuplicateEpisode {
    pub season: String,
    pub episode_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Episode {
    #[serde(skip)]
    pub number: i64,
    pub episode_number: String,
    pub episode_name: String,
    pub availability: AvailabilityStatus,
}

impl Episode {
    #[must_use]
    pub fn new(number: i64, name: Option<String>, availability: AvailabilityStatus) -> Self {
        Self {
            number,
            episode_number: episode_label(number),
            episode_name: name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| format!("Episode {number}")),
            availability,
        }
    }
}

/// A season with its episodes ordered by number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Season {
    #[serde(skip)]
    pub number: i64,
    pub season: String,
    pub availability: AvailabilityStatus,
    pub episodes: Vec<Episode>,
}

impl Season {
    /// Builds a season and rolls its episodes up into the season status.
    ///
    /// `fallback` is used only when there are no episodes to roll up.
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateEpisode`] if two episodes share a number.
    pub fn new(
        number: i64,
        mut episodes: Vec<Episode>,
        fallback: Option<AvailabilityStatus>,
    ) -> Result<Self, DuplicateEpisode> {
        let season = season_label(number);

        // Stable, so already-ordered upstream listings come through untouched.
        episodes.sort_by_key(|e| e.number);
        if let Some(pair) = episodes.windows(2).find(|w| w[0].number == w[1].number) {
            return Err(DuplicateEpisode {
                season,
                episode_number: pair[1].episode_number.clone(),
            });
        }

        let availability = if episodes.is_empty() {
            fallback.unwrap_or(AvailabilityStatus::Unknown)
        } else {
            let statuses: Vec<_> = episodes.iter().map(|e| e.availability).collect();
            rollup(&statuses)
        };

        Ok(Self {
            number,
            season,
            availability,
            episodes,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovieRequest {
    pub request_id: i64,
    pub title: String,
    pub media_availability: AvailabilityStatus,
    pub request_date: String,
}

/// One requested season of a show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TvRequest {
    pub request_id: i64,
    pub tv_title: String,
    pub tv_title_availability: AvailabilityStatus,
    pub tv_season: String,
    pub tv_season_availability: AvailabilityStatus,
    pub tv_episodes: Vec<Episode>,
    pub request_date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "media_type", rename_all = "lowercase")]
pub enum TitleRequest {
    Movie(MovieRequest),
    Tv(TvRequest),
}

impl TitleRequest {
    #[must_use]
    pub const fn request_id(&self) -> i64 {
        match self {
            Self::Movie(m) => m.request_id,
            Self::Tv(t) => t.request_id,
        }
    }

    #[must_use]
    pub fn request_date(&self) -> &str {
        match self {
            Self::Movie(m) => &m.request_date,
            Self::Tv(t) => &t.request_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use AvailabilityStatus::{Available, PartiallyAvailable, Pending};

    #[test]
    fn episode_defaults_name_and_pads_number() {
        let ep = Episode::new(3, None, Pending);
        assert_eq!(ep.episode_number, "03");
        assert_eq!(ep.episode_name, "Episode 3");

        let ep = Episode::new(1, Some("Winter Is Coming".into()), Available);
        assert_eq!(ep.episode_name, "Winter Is Coming");
    }

    #[test]
    fn season_rolls_up_episodes() {
        let season = Season::new(
            1,
            vec![
                Episode::new(1, None, Available),
                Episode::new(2, None, Available),
                Episode::new(3, None, Pending),
            ],
            None,
        )
        .unwrap();

        assert_eq!(season.season, "S01");
        assert_eq!(season.availability, PartiallyAvailable);
    }

    #[test]
    fn season_orders_episodes_by_number() {
        let season = Season::new(
            2,
            vec![
                Episode::new(2, None, Available),
                Episode::new(1, None, Available),
            ],
            None,
        )
        .unwrap();

        let numbers: Vec<_> = season.episodes.iter().map(|e| e.number).collect();
        assert_eq!(numbers, vec![1, 2]);
    }

    #[test]
    fn season_rejects_duplicate_episodes() {
        let err = Season::new(
            1,
            vec![
                Episode::new(4, None, Available),
                Episode::new(4, Some("Again".into()), Pending),
            ],
            None,
        )
        .unwrap_err();

        assert_eq!(err.season, "S01");
        assert_eq!(err.episode_number, "04");
    }

    #[test]
    fn empty_season_uses_fallback() {
        let season = Season::new(1, vec![], Some(Pending)).unwrap();
        assert_eq!(season.availability, Pending);

        let season = Season::new(1, vec![], None).unwrap();
        assert_eq!(season.availability, AvailabilityStatus::Unknown);
    }

    #[test]
    fn title_request_is_tagged() {
        let request = TitleRequest::Movie(MovieRequest {
            request_id: 1,
            title: "Inception".into(),
            media_availability: Available,
            request_date: "2020-09-12T10:00:27.000Z".into(),
        });

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["media_type"], "movie");
        assert_eq!(json["media_availability"], "AVAILABLE");
        assert_eq!(json["request_date"], "2020-09-12T10:00:27.000Z");
    }
}
