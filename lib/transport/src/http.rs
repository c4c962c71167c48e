use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;
use tracing::debug;

use crate::error::TransportError;
use crate::graphql::{GraphqlRequest, GraphqlResponse};

/// The CRM exposes two GraphQL endpoints: the core data API and the object
/// metadata API describing custom fields and labels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GraphqlEndpoint {
    Core,
    Metadata,
}

#[async_trait]
pub trait GraphqlTransport: Send + Sync {
    /// Executes a GraphQL request and returns the unwrapped `data` value.
    /// A non-empty `errors` array fails the whole request, even when the
    /// server also returned partial data.
    async fn execute(
        &self,
        endpoint: GraphqlEndpoint,
        request: GraphqlRequest,
    ) -> Result<Value, TransportError>;
}

/// Bearer-authenticated reqwest transport. No retries, no backoff and no
/// cancellation; a dispatched request runs to completion or failure.
#[derive(Debug)]
pub struct HttpGraphqlTransport {
    core_url: String,
    metadata_url: String,
    client: reqwest::Client,
}

impl HttpGraphqlTransport {
    pub fn builder() -> HttpGraphqlTransportBuilder {
        HttpGraphqlTransportBuilder::default()
    }

    fn url_for(&self, endpoint: GraphqlEndpoint) -> &str {
        match endpoint {
            GraphqlEndpoint::Core => &self.core_url,
            GraphqlEndpoint::Metadata => &self.metadata_url,
        }
    }

    async fn post(&self, url: &str, request: GraphqlRequest) -> Result<Value, TransportError> {
        let response = self
            .client
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(|e| TransportError::Request(url.to_string(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::HttpStatus(url.to_string(), status));
        }

        let envelope: GraphqlResponse = response
            .json()
            .await
            .map_err(|e| TransportError::ResponseParse(url.to_string(), e))?;

        if let Some(errors) = envelope.errors {
            if !errors.is_empty() {
                return Err(TransportError::Graphql {
                    endpoint: url.to_string(),
                    errors,
                });
            }
        }

        debug!(url, "GraphQL request succeeded");
        envelope
            .data
            .ok_or_else(|| TransportError::EmptyResponse(url.to_string()))
    }
}

#[async_trait]
impl GraphqlTransport for HttpGraphqlTransport {
    async fn execute(
        &self,
        endpoint: GraphqlEndpoint,
        request: GraphqlRequest,
    ) -> Result<Value, TransportError> {
        self.post(self.url_for(endpoint), request).await
    }
}

#[derive(Debug)]
pub struct HttpGraphqlTransportBuilder {
    core_url: Option<String>,
    metadata_url: Option<String>,
    api_token: Option<String>,
    connect_timeout: Duration,
    request_timeout: Duration,
    user_agent: Option<String>,
}

impl Default for HttpGraphqlTransportBuilder {
    fn default() -> Self {
        HttpGraphqlTransportBuilder {
            core_url: None,
            metadata_url: None,
            api_token: None,
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(30),
            user_agent: None,
        }
    }
}

impl HttpGraphqlTransportBuilder {
    pub fn core_url(mut self, url: impl Into<String>) -> Self {
        self.core_url = Some(url.into());
        self
    }

    /// Overrides the metadata endpoint. When absent it is derived from the
    /// core endpoint by replacing a trailing `/graphql` with `/metadata`.
    pub fn metadata_url(mut self, url: impl Into<String>) -> Self {
        self.metadata_url = Some(url.into());
        self
    }

    pub fn api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn build(self) -> Result<HttpGraphqlTransport, TransportError> {
        let core_url = self
            .core_url
            .ok_or_else(|| TransportError::MissingConfigurationOption("core_url".to_string()))?;
        let api_token = self
            .api_token
            .ok_or_else(|| TransportError::MissingConfigurationOption("api_token".to_string()))?;
        let metadata_url = self
            .metadata_url
            .unwrap_or_else(|| derive_metadata_url(&core_url));

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", api_token))
            .map_err(TransportError::InvalidToken)?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let mut client = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(self.connect_timeout)
            .timeout(self.request_timeout);
        if let Some(user_agent) = self.user_agent {
            client = client.user_agent(user_agent);
        }
        let client = client.build().map_err(TransportError::ClientBuild)?;

        Ok(HttpGraphqlTransport {
            core_url,
            metadata_url,
            client,
        })
    }
}

fn derive_metadata_url(core_url: &str) -> String {
    let trimmed = core_url.trim_end_matches('/');
    match trimmed.strip_suffix("/graphql") {
        Some(base) => format!("{}/metadata", base),
        None => format!("{}/metadata", trimmed),
    }
}
