//! Command-line interface for the Overseerr bridge.
//!
//! Every command prints its result as pretty JSON on stdout. Logs go to stderr.

mod commands;

use clap::{Parser, Subcommand};

/// Normalized, rolled-up views of Overseerr requests
#[derive(Parser)]
#[command(name = "overseerr-bridge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the upstream server status
    Status,

    /// List requests as per-title (movies) and per-season (shows) records
    #[command(alias = "ls")]
    Requests {
        /// Page size
        #[arg(long, allow_negative_numbers = true)]
        take: Option<i64>,

        /// Number of matching records to skip
        #[arg(long, allow_negative_numbers = true)]
        skip: Option<i64>,

        /// all, approved, available, pending, processing, unavailable or failed
        #[arg(long)]
        filter: Option<String>,

        /// added or modified
        #[arg(long)]
        sort: Option<String>,

        /// all, movie or tv
        #[arg(long)]
        media_type: Option<String>,

        /// Only requests created at or after this RFC 3339 timestamp
        #[arg(long)]
        since: Option<String>,
    },

    /// Show movie availability
    Movie {
        /// TMDB id
        tmdb_id: i64,
    },

    /// Show a TV show with per-season availability
    Tv {
        /// TMDB id
        tmdb_id: i64,
    },

    /// Show one season with per-episode availability
    Season {
        /// TMDB id of the show
        tmdb_id: i64,
        /// Season number
        season_number: i64,
    },

    /// Create default config file
    Init,
}

pub use commands::*;
