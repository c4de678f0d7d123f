pub mod azure_devops;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::UpstreamQueryError;
use crate::model::work_item::RawWorkItem;

/// Read access to a work-tracking service.
#[async_trait]
pub trait WorkItemSource: Send + Sync {
    fn name(&self) -> &str;
    /// Ids of every Objective work item, ascending.
    async fn list_objective_ids(&self) -> Result<Vec<u64>, UpstreamQueryError>;
    async fn fetch_with_relations(&self, id: u64) -> Result<RawWorkItem, UpstreamQueryError>;
    async fn fetch_fields(&self, id: u64) -> Result<Map<String, Value>, UpstreamQueryError>;
}

/// Fetch every objective with its relation list.
///
/// A failing id query aborts. A single objective that answers with an error
/// status or times out is logged and skipped so the rest of the batch still
/// lands; any other failure aborts the batch.
pub async fn fetch_objectives(
    source: &dyn WorkItemSource,
) -> Result<Vec<RawWorkItem>, UpstreamQueryError> {
    let ids = source.list_objective_ids().await?;
    tracing::info!(count = ids.len(), source = source.name(), "objective ids listed");

    let mut objectives = Vec::with_capacity(ids.len());
    for id in ids {
        match source.fetch_with_relations(id).await {
            Ok(item) => objectives.push(item),
            Err(e) if e.is_recoverable() => {
                tracing::error!(
                    "Failed to fetch Objective {id} with relations: {:#}",
                    anyhow::Error::from(e)
                );
            }
            Err(e) => return Err(e),
        }
    }
    Ok(objectives)
}
