use serde::Deserialize;

/// `__TypeKind` as reported by introspection, narrowed to the kinds the
/// connector distinguishes. Anything unrecognized collapses to `Unknown`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TypeKind {
    Scalar,
    Object,
    Interface,
    Union,
    Enum,
    InputObject,
    List,
    NonNull,
    #[serde(other)]
    Unknown,
}

/// A possibly-wrapped type descriptor from introspection. The introspection
/// document resolves `ofType` two levels deep, which covers every wrapper
/// chain the CRM schema produces (`T`, `T!`, `[T]`, `[T!]`).
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeRef {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub kind: Option<TypeKind>,
    #[serde(default)]
    pub of_type: Option<Box<TypeRef>>,
}

/// Well-known primitive names. Some backends report these with kind OBJECT
/// or otherwise inconsistent kind metadata, so scalar classification falls
/// back to this list in addition to the reported kind.
pub const PRIMITIVE_TYPE_NAMES: [&str; 9] = [
    "ID", "String", "Int", "Float", "Boolean", "DateTime", "Date", "Time", "UUID",
];

pub const CONNECTION_SUFFIX: &str = "Connection";
pub const UNKNOWN_TYPE_NAME: &str = "Unknown";

/// Semantic classification of a field's type. At most one of the booleans
/// is true; all false means the field must be skipped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldClassification {
    pub type_name: String,
    pub type_kind: TypeKind,
    pub is_connection: bool,
    pub is_scalar: bool,
    pub is_enum: bool,
    pub is_object: bool,
}

impl FieldClassification {
    fn unknown() -> Self {
        FieldClassification {
            type_name: UNKNOWN_TYPE_NAME.to_string(),
            type_kind: TypeKind::Unknown,
            is_connection: false,
            is_scalar: false,
            is_enum: false,
            is_object: false,
        }
    }
}

/// Pure and total: malformed input degrades to `Unknown` with every boolean
/// false, so the caller skips the field instead of failing the whole build.
pub fn classify(type_ref: &TypeRef) -> FieldClassification {
    let mut current = type_ref;
    for _ in 0..2 {
        match (current.kind, &current.of_type) {
            (Some(TypeKind::NonNull) | Some(TypeKind::List), Some(inner)) => current = inner,
            _ => break,
        }
    }

    let type_name = match &current.name {
        Some(name) if !name.is_empty() => name.clone(),
        _ => return FieldClassification::unknown(),
    };
    let type_kind = current.kind.unwrap_or(TypeKind::Unknown);

    let is_connection = type_name.ends_with(CONNECTION_SUFFIX);
    let is_scalar = !is_connection
        && (type_kind == TypeKind::Scalar || PRIMITIVE_TYPE_NAMES.contains(&type_name.as_str()));
    let is_enum = !is_connection && !is_scalar && type_kind == TypeKind::Enum;
    let is_object = !is_connection && !is_scalar && !is_enum && type_kind == TypeKind::Object;

    FieldClassification {
        type_name,
        type_kind,
        is_connection,
        is_scalar,
        is_enum,
        is_object,
    }
}
