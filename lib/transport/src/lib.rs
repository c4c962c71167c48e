pub mod error;
pub mod graphql;
pub mod http;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use error::TransportError;
pub use graphql::{GraphQLError, GraphQLErrorLocation, GraphqlRequest, GraphqlResponse};
pub use http::{GraphqlEndpoint, GraphqlTransport, HttpGraphqlTransport, HttpGraphqlTransportBuilder};
