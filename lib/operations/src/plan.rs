use serde_json::{Map, Value};

/// How the operation's payload sits inside the response `data`. The shape
/// is known statically per assembler, so unwrapping follows this contract
/// instead of probing object keys at runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResponseShape {
    /// `{ <field>: { edges: [{ node }] } }`, first node wins.
    EdgesFirst,
    /// `{ <field>: { edges: [{ node }] } }`, all nodes.
    Edges,
    /// `{ <field>: <value> }`.
    Direct,
}

/// A complete parametrized GraphQL document plus its variables. Transient:
/// produced by an assembler, consumed by the executor, never cached.
#[derive(Clone, Debug)]
pub struct QueryPlan {
    pub query: String,
    pub variables: Map<String, Value>,
    pub operation_field: String,
    pub shape: ResponseShape,
}
