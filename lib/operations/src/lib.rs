pub mod assemble;
pub mod bulk;
pub mod client;
pub mod error;
pub mod execute;
pub mod plan;
pub mod upsert;

#[cfg(test)]
mod tests;

pub use bulk::{BulkOutcome, BulkUpsertOutcome, RecordUpdate, RecordUpsert};
pub use client::CrmClient;
pub use error::OperationError;
pub use execute::execute_plan;
pub use plan::{QueryPlan, ResponseShape};
pub use upsert::{UpsertAction, UpsertMatch, UpsertResult};
