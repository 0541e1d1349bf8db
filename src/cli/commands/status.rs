use super::print_json;
use crate::services::RequestService;

pub async fn cmd_status(service: &RequestService) -> anyhow::Result<()> {
    let status = service.status().await?;
    print_json(&status)
}
