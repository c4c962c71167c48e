//! Test doubles for the transport boundary.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::TransportError;
use crate::graphql::{GraphQLError, GraphqlRequest};
use crate::http::{GraphqlEndpoint, GraphqlTransport};

type Handler =
    dyn Fn(GraphqlEndpoint, &GraphqlRequest) -> Result<Value, TransportError> + Send + Sync;

/// In-memory transport driven by a handler closure. Records every request
/// so tests can assert on the documents and variables that were sent.
pub struct MockTransport {
    handler: Box<Handler>,
    calls: Mutex<Vec<(GraphqlEndpoint, GraphqlRequest)>>,
}

impl MockTransport {
    pub fn new(
        handler: impl Fn(GraphqlEndpoint, &GraphqlRequest) -> Result<Value, TransportError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        MockTransport {
            handler: Box::new(handler),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(GraphqlEndpoint, GraphqlRequest)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl GraphqlTransport for MockTransport {
    async fn execute(
        &self,
        endpoint: GraphqlEndpoint,
        request: GraphqlRequest,
    ) -> Result<Value, TransportError> {
        self.calls.lock().unwrap().push((endpoint, request.clone()));
        (self.handler)(endpoint, &request)
    }
}

/// A canned server-side failure with the given message.
pub fn graphql_failure(message: &str) -> TransportError {
    TransportError::Graphql {
        endpoint: "mock".to_string(),
        errors: vec![GraphQLError::from(message.to_string())],
    }
}
