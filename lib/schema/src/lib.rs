pub mod classify;
pub mod error;
pub mod introspect;
pub mod metadata;
pub mod registry;
pub mod selection;

pub use classify::{classify, FieldClassification, TypeKind, TypeRef};
pub use error::SchemaError;
pub use introspect::{introspect_type, FieldDescriptor};
pub use metadata::{fetch_object_metadata, find_object, FieldMetadata, MetadataCache, ObjectMetadata};
pub use registry::ComplexType;
pub use selection::{
    build_field_selections, capitalize_first, FieldSelection, SkipReason, SkippedField,
};
