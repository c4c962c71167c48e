//! Pure string-template assemblers for the six operations. Every
//! user-supplied scalar travels as a GraphQL variable; the only string that
//! reaches the document from outside is the cosmetic operation name, built
//! from a display label with whitespace stripped, and it never appears in a
//! value position.

use serde_json::{Map, Value};

use crm_connector_schema::{capitalize_first, ObjectMetadata};

use crate::plan::{QueryPlan, ResponseShape};

fn operation_label(label: &str) -> String {
    label.split_whitespace().collect()
}

fn indent(block: &str, depth: usize) -> String {
    let prefix = "\t".repeat(depth);
    block
        .lines()
        .map(|line| format!("{prefix}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Fetch a single record by id. Queries the plural root field with an id
/// filter and takes `edges[0].node`: the singular root field does not
/// support filtering the way the plural one does, so the plural shape is
/// required, not a style choice.
pub fn build_get_query(
    object: &ObjectMetadata,
    record_id: &str,
    field_selections: &str,
) -> QueryPlan {
    let label = operation_label(&object.label_singular);
    let plural = &object.name_plural;
    let query = format!(
        "query Find{label}($id: UUID!) {{\n\t{plural}(filter: {{ id: {{ eq: $id }} }}) {{\n\t\tedges {{\n\t\t\tnode {{\n{selections}\n\t\t\t}}\n\t\t}}\n\t}}\n}}",
        selections = indent(field_selections, 4),
    );
    let mut variables = Map::new();
    variables.insert("id".to_string(), Value::String(record_id.to_string()));
    QueryPlan {
        query,
        variables,
        operation_field: plural.clone(),
        shape: ResponseShape::EdgesFirst,
    }
}

/// List records. The limit is a flat `first` argument, not a nested
/// `paging: { first }` wrapper; the server requires this shape.
pub fn build_list_query(object: &ObjectMetadata, limit: u32, field_selections: &str) -> QueryPlan {
    let label = operation_label(&object.label_plural);
    let plural = &object.name_plural;
    let query = format!(
        "query FindMany{label}($limit: Int) {{\n\t{plural}(first: $limit) {{\n\t\tedges {{\n\t\t\tnode {{\n{selections}\n\t\t\t}}\n\t\t}}\n\t}}\n}}",
        selections = indent(field_selections, 4),
    );
    let mut variables = Map::new();
    variables.insert("limit".to_string(), Value::from(limit));
    QueryPlan {
        query,
        variables,
        operation_field: plural.clone(),
        shape: ResponseShape::Edges,
    }
}

/// Create a record. The response re-requests the full selection set so the
/// caller gets a complete post-mutation record in one round trip.
pub fn build_create_mutation(
    object: &ObjectMetadata,
    data: &Value,
    field_selections: &str,
) -> QueryPlan {
    let type_name = capitalize_first(&object.name_singular);
    let label = operation_label(&object.label_singular);
    let operation_field = format!("create{type_name}");
    let query = format!(
        "mutation Create{label}($data: {type_name}CreateInput!) {{\n\t{operation_field}(data: $data) {{\n{selections}\n\t}}\n}}",
        selections = indent(field_selections, 2),
    );
    let mut variables = Map::new();
    variables.insert("data".to_string(), data.clone());
    QueryPlan {
        query,
        variables,
        operation_field,
        shape: ResponseShape::Direct,
    }
}

pub fn build_update_mutation(
    object: &ObjectMetadata,
    record_id: &str,
    data: &Value,
    field_selections: &str,
) -> QueryPlan {
    let type_name = capitalize_first(&object.name_singular);
    let label = operation_label(&object.label_singular);
    let operation_field = format!("update{type_name}");
    let query = format!(
        "mutation Update{label}($id: UUID!, $data: {type_name}UpdateInput!) {{\n\t{operation_field}(id: $id, data: $data) {{\n{selections}\n\t}}\n}}",
        selections = indent(field_selections, 2),
    );
    let mut variables = Map::new();
    variables.insert("id".to_string(), Value::String(record_id.to_string()));
    variables.insert("data".to_string(), data.clone());
    QueryPlan {
        query,
        variables,
        operation_field,
        shape: ResponseShape::Direct,
    }
}

/// Delete requests only `id` back; the record is gone.
pub fn build_delete_mutation(object: &ObjectMetadata, record_id: &str) -> QueryPlan {
    let type_name = capitalize_first(&object.name_singular);
    let label = operation_label(&object.label_singular);
    let operation_field = format!("delete{type_name}");
    let query = format!(
        "mutation Delete{label}($id: UUID!) {{\n\t{operation_field}(id: $id) {{\n\t\tid\n\t}}\n}}"
    );
    let mut variables = Map::new();
    variables.insert("id".to_string(), Value::String(record_id.to_string()));
    QueryPlan {
        query,
        variables,
        operation_field,
        shape: ResponseShape::Direct,
    }
}
