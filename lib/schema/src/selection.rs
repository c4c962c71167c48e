use tracing::{debug, warn};

use crm_connector_transport::GraphqlTransport;

use crate::error::SchemaError;
use crate::introspect::introspect_type;
use crate::registry::ComplexType;

/// A ready-to-splice GraphQL selection-set body plus the fields that were
/// deliberately left out, so callers can answer "why is field X missing"
/// without reading source.
#[derive(Clone, Debug)]
pub struct FieldSelection {
    pub selection_set: String,
    pub skipped: Vec<SkippedField>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedField {
    pub name: String,
    pub type_name: String,
    pub reason: SkipReason,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// Relations need their own paginated queries.
    Connection,
    /// Object type with no registry entry; guessing subfields would make
    /// the whole query fail server-side validation.
    UnregisteredObject,
    UnknownKind,
}

/// ASCII-only capitalization of the first letter; resource names map to
/// GraphQL type names this way throughout the API.
pub fn capitalize_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

const FALLBACK_FIELDS: [&str; 4] = ["id", "createdAt", "updatedAt", "deletedAt"];

/// Resources whose `name` field is a structured FullName object rather than
/// a plain string. The fallback must request it with subfields: a bare
/// `name` here is a hard server-side validation error.
const STRUCTURED_NAME_RESOURCES: [&str; 2] = ["person", "workspaceMember"];

fn object_field(name: &str, subfields: &str) -> String {
    let indented = subfields
        .lines()
        .map(|line| format!("\t{line}"))
        .collect::<Vec<_>>()
        .join("\n");
    format!("{name} {{\n{indented}\n}}")
}

fn fallback_selection(name_singular: &str) -> FieldSelection {
    let mut lines: Vec<String> = FALLBACK_FIELDS.iter().map(|f| f.to_string()).collect();
    if STRUCTURED_NAME_RESOURCES.contains(&name_singular) {
        lines.push(object_field("name", ComplexType::FullName.subfields()));
    } else {
        lines.push("name".to_string());
    }
    FieldSelection {
        selection_set: lines.join("\n"),
        skipped: Vec::new(),
    }
}

/// Discovers the fields of the resource's type and assembles the selection
/// set: scalars and enums verbatim, registered complex objects with their
/// subfields, everything else skipped. Introspection order is preserved.
/// Not cached; callers needing repeated builds should reuse the result.
pub async fn build_field_selections(
    transport: &dyn GraphqlTransport,
    name_singular: &str,
) -> Result<FieldSelection, SchemaError> {
    let type_name = capitalize_first(name_singular);
    let fields = introspect_type(transport, &type_name).await?;

    if fields.is_empty() {
        warn!(
            resource = name_singular,
            "introspection returned no fields, using the minimal fallback selection"
        );
        return Ok(fallback_selection(name_singular));
    }

    let mut lines = Vec::with_capacity(fields.len());
    let mut skipped = Vec::new();
    for field in fields {
        if field.is_connection {
            debug!(field = %field.name, type_name = %field.type_name, "skipping connection field");
            skipped.push(SkippedField {
                name: field.name,
                type_name: field.type_name,
                reason: SkipReason::Connection,
            });
        } else if field.is_scalar || field.is_enum {
            lines.push(field.name);
        } else if field.is_object {
            match ComplexType::from_type_name(&field.type_name) {
                Some(complex) => lines.push(object_field(&field.name, complex.subfields())),
                None => {
                    debug!(
                        field = %field.name,
                        type_name = %field.type_name,
                        "skipping object field with no registered subfields"
                    );
                    skipped.push(SkippedField {
                        name: field.name,
                        type_name: field.type_name,
                        reason: SkipReason::UnregisteredObject,
                    });
                }
            }
        } else {
            skipped.push(SkippedField {
                name: field.name,
                type_name: field.type_name,
                reason: SkipReason::UnknownKind,
            });
        }
    }

    Ok(FieldSelection {
        selection_set: lines.join("\n"),
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use crm_connector_transport::testing::MockTransport;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn fields_response(fields: serde_json::Value) -> serde_json::Value {
        json!({ "__type": { "name": "Whatever", "fields": fields } })
    }

    #[tokio::test]
    async fn person_scenario_orders_and_nests_fields() {
        let transport = MockTransport::new(|_, _| {
            Ok(fields_response(json!([
                { "name": "id", "type": { "name": "UUID", "kind": "SCALAR" } },
                { "name": "name", "type": { "name": "FullName", "kind": "OBJECT" } },
                { "name": "email", "type": { "name": "String", "kind": "SCALAR" } }
            ])))
        });

        let selection = build_field_selections(&transport, "person").await.unwrap();
        assert_eq!(
            selection.selection_set,
            "id\nname {\n\tfirstName\n\tlastName\n}\nemail"
        );
        assert!(selection.skipped.is_empty());
    }

    #[tokio::test]
    async fn skips_connections_and_unregistered_objects() {
        let transport = MockTransport::new(|_, _| {
            Ok(fields_response(json!([
                { "name": "id", "type": { "name": "UUID", "kind": "SCALAR" } },
                { "name": "status", "type": { "name": "TaskStatus", "kind": "ENUM" } },
                { "name": "address", "type": { "name": "Address", "kind": "OBJECT" } },
                { "name": "mystery", "type": { "name": "SomethingInternal", "kind": "OBJECT" } },
                { "name": "people", "type": { "name": "PersonConnection", "kind": "OBJECT" } }
            ])))
        });

        let selection = build_field_selections(&transport, "company").await.unwrap();
        assert!(selection.selection_set.contains("id"));
        assert!(selection.selection_set.contains("status"));
        assert!(selection.selection_set.contains("address {"));
        assert!(selection.selection_set.contains("addressStreet1"));
        assert!(!selection.selection_set.contains("mystery"));
        assert!(!selection.selection_set.contains("people"));

        assert_eq!(selection.skipped.len(), 2);
        assert_eq!(selection.skipped[0].name, "mystery");
        assert_eq!(selection.skipped[0].reason, SkipReason::UnregisteredObject);
        assert_eq!(selection.skipped[1].name, "people");
        assert_eq!(selection.skipped[1].reason, SkipReason::Connection);
    }

    #[tokio::test]
    async fn fallback_never_emits_a_bare_structured_name() {
        // Regression test: an auth outage plus the generic bare fallback
        // once produced `name` without subfields for person records, which
        // the server rejects outright.
        let transport = MockTransport::new(|_, _| Ok(json!({ "__type": null })));

        let selection = build_field_selections(&transport, "person").await.unwrap();
        assert_eq!(
            selection.selection_set,
            "id\ncreatedAt\nupdatedAt\ndeletedAt\nname {\n\tfirstName\n\tlastName\n}"
        );
        assert!(!selection.selection_set.contains("\nname\n"));
    }

    #[tokio::test]
    async fn fallback_uses_plain_name_for_string_named_resources() {
        let transport = MockTransport::new(|_, _| Ok(json!({ "__type": null })));

        let selection = build_field_selections(&transport, "company").await.unwrap();
        assert_eq!(
            selection.selection_set,
            "id\ncreatedAt\nupdatedAt\ndeletedAt\nname"
        );
    }

    #[tokio::test]
    async fn capitalizes_resource_name_for_introspection() {
        let transport = MockTransport::new(|_, _| Ok(json!({ "__type": null })));
        build_field_selections(&transport, "workspaceMember")
            .await
            .unwrap();
        let calls = transport.calls();
        assert!(calls[0].1.query.contains("__type(name: \"WorkspaceMember\")"));
    }

    #[test]
    fn capitalize_is_ascii_only() {
        assert_eq!(capitalize_first("company"), "Company");
        assert_eq!(capitalize_first(""), "");
        assert_eq!(capitalize_first("x"), "X");
    }
}
