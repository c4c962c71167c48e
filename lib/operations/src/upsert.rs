use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crm_connector_transport::GraphqlTransport;

use crate::client::{CrmClient, ResourceContext};
use crate::error::OperationError;

/// How an upsert decides whether a record already exists.
#[derive(Clone, Debug)]
pub enum UpsertMatch {
    /// Probe with a direct record fetch for this id.
    ById(String),
    /// Fetch a candidate set and scan for a field-value match.
    ByField { field: String, value: Value },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpsertAction {
    Created,
    Updated,
}

#[derive(Clone, Debug)]
pub struct UpsertResult {
    pub action: UpsertAction,
    pub record: Value,
}

const UPSERT_SCAN_LIMIT: u32 = 100;

impl<T: GraphqlTransport> CrmClient<T> {
    /// Create-or-update. Not atomic: two concurrent upserts on the same
    /// logical key can both take the create branch.
    pub async fn upsert(
        &self,
        resource: &str,
        matching: &UpsertMatch,
        data: &Value,
    ) -> Result<UpsertResult, OperationError> {
        let ctx = self.resource(resource).await?;
        self.upsert_with(&ctx, matching, data).await
    }

    pub(crate) async fn upsert_with(
        &self,
        ctx: &ResourceContext,
        matching: &UpsertMatch,
        data: &Value,
    ) -> Result<UpsertResult, OperationError> {
        match self.find_existing(ctx, matching).await {
            Some(existing) => {
                let id = existing
                    .get("id")
                    .and_then(Value::as_str)
                    .ok_or(OperationError::MissingRecordId)?
                    .to_string();
                let record = self.update_with(ctx, &id, data).await?;
                Ok(UpsertResult {
                    action: UpsertAction::Updated,
                    record,
                })
            }
            None => {
                let record = self.create_with(ctx, data).await?;
                Ok(UpsertResult {
                    action: UpsertAction::Created,
                    record,
                })
            }
        }
    }

    /// Existence probe. Any probe failure, including a transient transport
    /// error, reads as "record absent" and routes to the create branch.
    async fn find_existing(
        &self,
        ctx: &ResourceContext,
        matching: &UpsertMatch,
    ) -> Option<Value> {
        match matching {
            UpsertMatch::ById(id) => match self.get_with(ctx, id).await {
                Ok(record) => Some(record),
                Err(err) => {
                    debug!(error = %err, "existence probe failed, treating record as absent");
                    None
                }
            },
            UpsertMatch::ByField { field, value } => {
                let records = match self.list_with(ctx, UPSERT_SCAN_LIMIT).await {
                    Ok(records) => records,
                    Err(err) => {
                        debug!(error = %err, "candidate fetch failed, treating record as absent");
                        return None;
                    }
                };
                records.into_iter().find(|record| {
                    record
                        .get(field)
                        .map(|candidate| values_match(candidate, value))
                        .unwrap_or(false)
                })
            }
        }
    }
}

/// Primitives compare by value; nested object and array values compare by
/// their serialized form.
fn values_match(candidate: &Value, target: &Value) -> bool {
    let structural = matches!(candidate, Value::Object(_) | Value::Array(_))
        || matches!(target, Value::Object(_) | Value::Array(_));
    if structural {
        candidate.to_string() == target.to_string()
    } else {
        candidate == target
    }
}
