use std::sync::Arc;

use serde_json::Value;

use crm_connector_schema::{
    build_field_selections, find_object, FieldSelection, MetadataCache, ObjectMetadata,
};
use crm_connector_transport::GraphqlTransport;

use crate::assemble;
use crate::error::OperationError;
use crate::execute::execute_plan;

/// High-level connector client. Holds the transport and the metadata cache;
/// the cache is injectable so callers and tests can scope it themselves
/// instead of leaking process-wide state.
pub struct CrmClient<T: GraphqlTransport> {
    transport: T,
    metadata: MetadataCache,
}

/// Everything a single logical operation needs about a resource: its
/// metadata names and the field selection built once up front. Bulk
/// operations share one context across every record instead of re-deriving
/// the selection per record.
pub(crate) struct ResourceContext {
    pub(crate) object: ObjectMetadata,
    pub(crate) selection: FieldSelection,
}

impl<T: GraphqlTransport> CrmClient<T> {
    pub fn new(transport: T) -> Self {
        CrmClient::with_cache(transport, MetadataCache::new())
    }

    pub fn with_cache(transport: T, metadata: MetadataCache) -> Self {
        CrmClient {
            transport,
            metadata,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The cached object metadata schema; `force_refresh` re-fetches and
    /// replaces the cached snapshot unconditionally.
    pub async fn object_schema(
        &self,
        force_refresh: bool,
    ) -> Result<Arc<Vec<ObjectMetadata>>, OperationError> {
        Ok(self
            .metadata
            .get_schema(&self.transport, force_refresh)
            .await?)
    }

    pub(crate) async fn resource(
        &self,
        name_singular: &str,
    ) -> Result<ResourceContext, OperationError> {
        let objects = self.metadata.get_schema(&self.transport, false).await?;
        let object = find_object(&objects, name_singular)
            .cloned()
            .ok_or_else(|| OperationError::UnknownResource(name_singular.to_string()))?;
        let selection = build_field_selections(&self.transport, name_singular).await?;
        Ok(ResourceContext { object, selection })
    }

    pub async fn get(&self, resource: &str, id: &str) -> Result<Value, OperationError> {
        let ctx = self.resource(resource).await?;
        self.get_with(&ctx, id).await
    }

    pub async fn list(&self, resource: &str, limit: u32) -> Result<Vec<Value>, OperationError> {
        let ctx = self.resource(resource).await?;
        self.list_with(&ctx, limit).await
    }

    pub async fn create(&self, resource: &str, data: &Value) -> Result<Value, OperationError> {
        let ctx = self.resource(resource).await?;
        self.create_with(&ctx, data).await
    }

    pub async fn update(
        &self,
        resource: &str,
        id: &str,
        data: &Value,
    ) -> Result<Value, OperationError> {
        let ctx = self.resource(resource).await?;
        self.update_with(&ctx, id, data).await
    }

    pub async fn delete(&self, resource: &str, id: &str) -> Result<Value, OperationError> {
        let ctx = self.resource(resource).await?;
        self.delete_with(&ctx, id).await
    }

    pub(crate) async fn get_with(
        &self,
        ctx: &ResourceContext,
        id: &str,
    ) -> Result<Value, OperationError> {
        let plan = assemble::build_get_query(&ctx.object, id, &ctx.selection.selection_set);
        execute_plan(&self.transport, plan).await
    }

    pub(crate) async fn list_with(
        &self,
        ctx: &ResourceContext,
        limit: u32,
    ) -> Result<Vec<Value>, OperationError> {
        let plan = assemble::build_list_query(&ctx.object, limit, &ctx.selection.selection_set);
        match execute_plan(&self.transport, plan).await? {
            Value::Array(records) => Ok(records),
            _ => Err(OperationError::MalformedResponse(
                ctx.object.name_plural.clone(),
            )),
        }
    }

    pub(crate) async fn create_with(
        &self,
        ctx: &ResourceContext,
        data: &Value,
    ) -> Result<Value, OperationError> {
        let plan = assemble::build_create_mutation(&ctx.object, data, &ctx.selection.selection_set);
        execute_plan(&self.transport, plan).await
    }

    pub(crate) async fn update_with(
        &self,
        ctx: &ResourceContext,
        id: &str,
        data: &Value,
    ) -> Result<Value, OperationError> {
        let plan =
            assemble::build_update_mutation(&ctx.object, id, data, &ctx.selection.selection_set);
        execute_plan(&self.transport, plan).await
    }

    pub(crate) async fn delete_with(
        &self,
        ctx: &ResourceContext,
        id: &str,
    ) -> Result<Value, OperationError> {
        let plan = assemble::build_delete_mutation(&ctx.object, id);
        execute_plan(&self.transport, plan).await
    }
}
