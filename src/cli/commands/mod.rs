mod media;
mod requests;
mod status;

pub use media::{cmd_movie, cmd_season, cmd_tv};
pub use requests::cmd_requests;
pub use status::cmd_status;

use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
