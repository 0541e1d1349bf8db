use super::print_json;
use crate::services::RequestService;

pub async fn cmd_movie(service: &RequestService, tmdb_id: i64) -> anyhow::Result<()> {
    let movie = service.movie(tmdb_id).await?;
    print_json(&movie)
}

pub async fn cmd_tv(service: &RequestService, tmdb_id: i64) -> anyhow::Result<()> {
    let show = service.tv(tmdb_id).await?;
    print_json(&show)
}

pub async fn cmd_season(
    service: &RequestService,
    tmdb_id: i64,
    season_number: i64,
) -> anyhow::Result<()> {
    let season = service.season(tmdb_id, season_number).await?;
    print_json(&season)
}
