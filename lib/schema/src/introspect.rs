use serde::Deserialize;
use tracing::debug;

use crm_connector_transport::{GraphqlEndpoint, GraphqlRequest, GraphqlTransport};

use crate::classify::{classify, TypeKind, TypeRef};
use crate::error::SchemaError;

/// One queryable field on a type, classified and ready for selection
/// building. Constructed fresh per introspection call, never mutated.
#[derive(Clone, Debug)]
pub struct FieldDescriptor {
    pub name: String,
    pub type_name: String,
    pub type_kind: TypeKind,
    pub is_connection: bool,
    pub is_scalar: bool,
    pub is_enum: bool,
    pub is_object: bool,
}

/// The type name is spliced into the document rather than passed as a
/// variable: it is derived from the resource name, never user scalar data,
/// and the introspection request shape carries no variables.
fn introspection_document(type_name: &str) -> String {
    format!(
        "query {{\n\t__type(name: \"{type_name}\") {{\n\t\tname\n\t\tfields {{\n\t\t\tname\n\t\t\ttype {{ name kind ofType {{ name kind ofType {{ name kind }} }} }}\n\t\t}}\n\t}}\n}}"
    )
}

#[derive(Deserialize)]
struct IntrospectionData {
    #[serde(rename = "__type")]
    type_info: Option<IntrospectionType>,
}

#[derive(Deserialize)]
struct IntrospectionType {
    #[serde(default)]
    fields: Option<Vec<IntrospectionField>>,
}

#[derive(Deserialize)]
struct IntrospectionField {
    name: String,
    #[serde(rename = "type")]
    type_ref: TypeRef,
}

/// Asks the server to describe `type_name`. A missing type (`__type: null`)
/// yields an empty list, which is the documented trigger for the selection
/// builder's fallback path; transport failures propagate to the caller.
pub async fn introspect_type(
    transport: &dyn GraphqlTransport,
    type_name: &str,
) -> Result<Vec<FieldDescriptor>, SchemaError> {
    let request = GraphqlRequest::new(introspection_document(type_name));
    let data = transport.execute(GraphqlEndpoint::Core, request).await?;
    let data: IntrospectionData = serde_json::from_value(data)
        .map_err(|e| SchemaError::MalformedIntrospection(type_name.to_string(), e.to_string()))?;

    let Some(type_info) = data.type_info else {
        debug!(type_name, "type not present in the GraphQL schema");
        return Ok(Vec::new());
    };

    Ok(type_info
        .fields
        .unwrap_or_default()
        .into_iter()
        .filter(|field| field.name != "__typename")
        .map(|field| {
            let classification = classify(&field.type_ref);
            FieldDescriptor {
                name: field.name,
                type_name: classification.type_name,
                type_kind: classification.type_kind,
                is_connection: classification.is_connection,
                is_scalar: classification.is_scalar,
                is_enum: classification.is_enum,
                is_object: classification.is_object,
            }
        })
        .collect())
}
