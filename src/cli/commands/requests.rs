use tracing::warn;

use super::print_json;
use crate::services::{RawRequestQuery, RequestService};

pub async fn cmd_requests(service: &RequestService, query: &RawRequestQuery) -> anyhow::Result<()> {
    let page = service.list_requests(query).await?;

    if page.errors > 0 {
        warn!(
            errors = page.errors,
            "Some requests could not be projected and were left out"
        );
    }

    print_json(&page)
}
