use futures::future::join_all;
use serde::Serialize;
use serde_json::Value;
use tracing::error;

use crm_connector_transport::GraphqlTransport;

use crate::client::CrmClient;
use crate::error::OperationError;
use crate::upsert::{UpsertAction, UpsertMatch};

/// Per-record outcome of a bulk operation, tagged by index so callers can
/// correlate outcomes with inputs after the concurrent fan-out.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum BulkOutcome {
    Succeeded { index: usize, record: Value },
    Failed { index: usize, error: String },
}

impl BulkOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, BulkOutcome::Succeeded { .. })
    }

    pub fn index(&self) -> usize {
        match self {
            BulkOutcome::Succeeded { index, .. } | BulkOutcome::Failed { index, .. } => *index,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum BulkUpsertOutcome {
    Succeeded {
        index: usize,
        action: UpsertAction,
        record: Value,
    },
    Failed {
        index: usize,
        error: String,
    },
}

#[derive(Clone, Debug)]
pub struct RecordUpdate {
    pub id: String,
    pub data: Value,
}

#[derive(Clone, Debug)]
pub struct RecordUpsert {
    pub matching: UpsertMatch,
    pub data: Value,
}

fn failed(index: usize, operation: &str, err: OperationError) -> BulkOutcome {
    error!(index, operation, error = %err, "bulk item failed");
    BulkOutcome::Failed {
        index,
        error: err.to_string(),
    }
}

/// Bulk operations fan every record out at once and await them all;
/// concurrency is unbounded by design. There is no transactionality: one
/// record's failure never aborts or rolls back its siblings, and callers
/// must inspect each outcome. The surrounding `Result` only fails before
/// dispatch, when the resource itself cannot be resolved.
impl<T: GraphqlTransport> CrmClient<T> {
    pub async fn create_many(
        &self,
        resource: &str,
        inputs: &[Value],
    ) -> Result<Vec<BulkOutcome>, OperationError> {
        let ctx = self.resource(resource).await?;
        let ctx = &ctx;
        let outcomes = inputs.iter().enumerate().map(|(index, data)| async move {
            match self.create_with(ctx, data).await {
                Ok(record) => BulkOutcome::Succeeded { index, record },
                Err(err) => failed(index, "create", err),
            }
        });
        Ok(join_all(outcomes).await)
    }

    pub async fn update_many(
        &self,
        resource: &str,
        updates: &[RecordUpdate],
    ) -> Result<Vec<BulkOutcome>, OperationError> {
        let ctx = self.resource(resource).await?;
        let ctx = &ctx;
        let outcomes = updates.iter().enumerate().map(|(index, update)| async move {
            match self.update_with(ctx, &update.id, &update.data).await {
                Ok(record) => BulkOutcome::Succeeded { index, record },
                Err(err) => failed(index, "update", err),
            }
        });
        Ok(join_all(outcomes).await)
    }

    pub async fn get_many(
        &self,
        resource: &str,
        ids: &[String],
    ) -> Result<Vec<BulkOutcome>, OperationError> {
        let ctx = self.resource(resource).await?;
        let ctx = &ctx;
        let outcomes = ids.iter().enumerate().map(|(index, id)| async move {
            match self.get_with(ctx, id).await {
                Ok(record) => BulkOutcome::Succeeded { index, record },
                Err(err) => failed(index, "get", err),
            }
        });
        Ok(join_all(outcomes).await)
    }

    pub async fn delete_many(
        &self,
        resource: &str,
        ids: &[String],
    ) -> Result<Vec<BulkOutcome>, OperationError> {
        let ctx = self.resource(resource).await?;
        let ctx = &ctx;
        let outcomes = ids.iter().enumerate().map(|(index, id)| async move {
            match self.delete_with(ctx, id).await {
                Ok(record) => BulkOutcome::Succeeded { index, record },
                Err(err) => failed(index, "delete", err),
            }
        });
        Ok(join_all(outcomes).await)
    }

    pub async fn upsert_many(
        &self,
        resource: &str,
        upserts: &[RecordUpsert],
    ) -> Result<Vec<BulkUpsertOutcome>, OperationError> {
        let ctx = self.resource(resource).await?;
        let ctx = &ctx;
        let outcomes = upserts.iter().enumerate().map(|(index, upsert)| async move {
            match self.upsert_with(ctx, &upsert.matching, &upsert.data).await {
                Ok(result) => BulkUpsertOutcome::Succeeded {
                    index,
                    action: result.action,
                    record: result.record,
                },
                Err(err) => {
                    error!(index, operation = "upsert", error = %err, "bulk item failed");
                    BulkUpsertOutcome::Failed {
                        index,
                        error: err.to_string(),
                    }
                }
            }
        });
        Ok(join_all(outcomes).await)
    }
}
