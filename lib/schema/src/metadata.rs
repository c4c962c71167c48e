use std::sync::Arc;

use arc_swap::ArcSwapOption;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crm_connector_transport::{GraphqlEndpoint, GraphqlRequest, GraphqlTransport};

use crate::error::SchemaError;

/// Per-resource entry from the secondary metadata API. Authoritative for
/// custom fields and display labels; built-in fields and enums are only
/// visible through introspection. Neither source alone is complete.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMetadata {
    pub name_singular: String,
    pub name_plural: String,
    pub label_singular: String,
    pub label_plural: String,
    #[serde(default)]
    pub fields: Vec<FieldMetadata>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldMetadata {
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub is_nullable: bool,
    pub is_writable: bool,
    pub is_active: bool,
    pub is_system: bool,
    pub options: Option<Value>,
}

const OBJECT_METADATA_DOCUMENT: &str = "query ObjectMetadataItems {
\tobjects(paging: { first: 1000 }) {
\t\tedges {
\t\t\tnode {
\t\t\t\tnameSingular
\t\t\t\tnamePlural
\t\t\t\tlabelSingular
\t\t\t\tlabelPlural
\t\t\t\tfields(paging: { first: 1000 }) {
\t\t\t\t\tedges {
\t\t\t\t\t\tnode {
\t\t\t\t\t\t\tname
\t\t\t\t\t\t\tlabel
\t\t\t\t\t\t\ttype
\t\t\t\t\t\t\tisNullable
\t\t\t\t\t\t\tisWritable
\t\t\t\t\t\t\tisActive
\t\t\t\t\t\t\tisSystem
\t\t\t\t\t\t\toptions
\t\t\t\t\t\t}
\t\t\t\t\t}
\t\t\t\t}
\t\t\t}
\t\t}
\t}
}";

#[derive(Deserialize)]
struct Paginated<T> {
    edges: Vec<Edge<T>>,
}

#[derive(Deserialize)]
struct Edge<T> {
    node: T,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectNode {
    name_singular: String,
    name_plural: String,
    label_singular: String,
    label_plural: String,
    #[serde(default)]
    fields: Option<Paginated<FieldMetadata>>,
}

#[derive(Deserialize)]
struct MetadataData {
    objects: Paginated<ObjectNode>,
}

/// Fetches the full object metadata schema from the metadata endpoint.
pub async fn fetch_object_metadata(
    transport: &dyn GraphqlTransport,
) -> Result<Vec<ObjectMetadata>, SchemaError> {
    let request = GraphqlRequest::new(OBJECT_METADATA_DOCUMENT);
    let data = transport.execute(GraphqlEndpoint::Metadata, request).await?;
    let data: MetadataData =
        serde_json::from_value(data).map_err(|e| SchemaError::MalformedMetadata(e.to_string()))?;

    Ok(data
        .objects
        .edges
        .into_iter()
        .map(|edge| {
            let node = edge.node;
            ObjectMetadata {
                name_singular: node.name_singular,
                name_plural: node.name_plural,
                label_singular: node.label_singular,
                label_plural: node.label_plural,
                fields: node
                    .fields
                    .map(|fields| fields.edges.into_iter().map(|e| e.node).collect())
                    .unwrap_or_default(),
            }
        })
        .collect())
}

pub fn find_object<'a>(
    objects: &'a [ObjectMetadata],
    name_singular: &str,
) -> Option<&'a ObjectMetadata> {
    objects.iter().find(|o| o.name_singular == name_singular)
}

/// Single-slot, time-unbounded cache of the object metadata schema. An
/// explicit object rather than module state so tests and callers can hold
/// their own instance. No TTL and no invalidation on writes; a mid-session
/// custom-field change is only picked up through `force_refresh`.
///
/// Concurrent refreshes race last-write-wins without locking; every fetch
/// is an idempotent snapshot of server-authoritative data, so the race only
/// decides which equally-valid snapshot stays cached.
#[derive(Debug, Default)]
pub struct MetadataCache {
    slot: ArcSwapOption<Vec<ObjectMetadata>>,
}

impl MetadataCache {
    pub fn new() -> Self {
        MetadataCache {
            slot: ArcSwapOption::empty(),
        }
    }

    pub async fn get_schema(
        &self,
        transport: &dyn GraphqlTransport,
        force_refresh: bool,
    ) -> Result<Arc<Vec<ObjectMetadata>>, SchemaError> {
        if !force_refresh {
            if let Some(cached) = self.slot.load_full() {
                debug!("serving object metadata from cache");
                return Ok(cached);
            }
        }
        let objects = Arc::new(fetch_object_metadata(transport).await?);
        self.slot.store(Some(objects.clone()));
        Ok(objects)
    }
}
