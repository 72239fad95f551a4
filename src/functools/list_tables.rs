use crate::client::DatabricksClient;
use crate::error::Result;
use crate::markdown::format_tables;

pub async fn list_tables(client: Result<&DatabricksClient>) -> Result<String> {
    let list = client?.list_tables().await?;
    tracing::info!(count = list.tables.len(), truncated = list.truncated, "listed tables");
    Ok(format_tables(&list))
}
