pub mod cli;
pub mod clients;
pub mod config;
pub mod constants;
pub mod domain;
pub mod models;
pub mod services;

use std::sync::Arc;

use clients::OverseerrClient;
use cli::{Cli, Commands};
pub use config::Config;
use services::{RawRequestQuery, RequestService};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

fn init_tracing(config: &Config, json_logs: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);

    // stdout carries command output, so logs always go to stderr.
    if json_logs || config.general.log_format.eq_ignore_ascii_case("json") {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

pub async fn run(config: Config, cli: Cli) -> anyhow::Result<()> {
    init_tracing(&config, cli.json_logs);

    if matches!(cli.command, Commands::Init) {
        if Config::create_default_if_missing()? {
            info!("Created config.toml; set [overseerr] url and api_key before use");
        } else {
            info!("config.toml already exists");
        }
        return Ok(());
    }

    config.validate()?;
    debug!(url = %config.overseerr.url, "Using Overseerr instance");

    let client = OverseerrClient::new(&config.overseerr);
    let service = RequestService::new(Arc::new(client), config.service_options());

    match cli.command {
        Commands::Status => cli::cmd_status(&service).await,

        Commands::Requests {
            take,
            skip,
            filter,
            sort,
            media_type,
            since,
        } => {
            let query = RawRequestQuery {
                take,
                skip,
                filter,
                sort,
                media_type,
                since,
            };
            cli::cmd_requests(&service, &query).await
        }

        Commands::Movie { tmdb_id } => cli::cmd_movie(&service, tmdb_id).await,

        Commands::Tv { tmdb_id } => cli::cmd_tv(&service, tmdb_id).await,

        Commands::Season {
            tmdb_id,
            season_number,
        } => cli::cmd_season(&service, tmdb_id, season_number).await,

        Commands::Init => Ok(()),
    }
}
