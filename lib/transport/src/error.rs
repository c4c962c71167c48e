use crate::graphql::{join_error_messages, GraphQLError};

#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    #[error("Creating HTTP client failed: {0}")]
    ClientBuild(reqwest::Error),
    #[error("Invalid API token: {0}")]
    InvalidToken(reqwest::header::InvalidHeaderValue),
    #[error("Missing configuration option: {0}")]
    MissingConfigurationOption(String),
    #[error("Failed to send request to \"{0}\": {1}")]
    Request(String, reqwest::Error),
    #[error("Endpoint \"{0}\" returned HTTP status {1}")]
    HttpStatus(String, reqwest::StatusCode),
    #[error("Failed to parse response from \"{0}\": {1}")]
    ResponseParse(String, reqwest::Error),
    // Server-side errors are passed through verbatim, never classified.
    #[error("GraphQL request to \"{endpoint}\" failed: {}", join_error_messages(.errors))]
    Graphql {
        endpoint: String,
        errors: Vec<GraphQLError>,
    },
    #[error("Response from \"{0}\" contained neither data nor errors")]
    EmptyResponse(String),
}
