use serde_json::Value;

use crm_connector_transport::{GraphqlEndpoint, GraphqlRequest, GraphqlTransport};

use crate::error::OperationError;
use crate::plan::{QueryPlan, ResponseShape};

/// Sends a plan over the transport and unwraps the payload according to the
/// plan's declared response shape. Server-side errors surface verbatim
/// through the transport error; nothing is classified or retried here.
pub async fn execute_plan(
    transport: &dyn GraphqlTransport,
    plan: QueryPlan,
) -> Result<Value, OperationError> {
    let QueryPlan {
        query,
        variables,
        operation_field,
        shape,
    } = plan;
    let request = GraphqlRequest::with_variables(query, variables);
    let data = transport.execute(GraphqlEndpoint::Core, request).await?;
    unwrap_operation(data, &operation_field, shape)
}

pub(crate) fn unwrap_operation(
    mut data: Value,
    operation_field: &str,
    shape: ResponseShape,
) -> Result<Value, OperationError> {
    let payload = data
        .get_mut(operation_field)
        .map(Value::take)
        .ok_or_else(|| OperationError::MalformedResponse(operation_field.to_string()))?;

    match shape {
        ResponseShape::Direct => Ok(payload),
        ResponseShape::Edges => Ok(Value::Array(take_nodes(payload, operation_field)?)),
        ResponseShape::EdgesFirst => take_nodes(payload, operation_field)?
            .into_iter()
            .next()
            .ok_or_else(|| OperationError::RecordNotFound(operation_field.to_string())),
    }
}

fn take_nodes(payload: Value, operation_field: &str) -> Result<Vec<Value>, OperationError> {
    let Value::Object(mut connection) = payload else {
        return Err(OperationError::MalformedResponse(operation_field.to_string()));
    };
    let Some(Value::Array(edges)) = connection.remove("edges") else {
        return Err(OperationError::MalformedResponse(format!(
            "{operation_field}.edges"
        )));
    };
    edges
        .into_iter()
        .map(|mut edge| {
            edge.get_mut("node").map(Value::take).ok_or_else(|| {
                OperationError::MalformedResponse(format!("{operation_field}.edges.node"))
            })
        })
        .collect()
}
