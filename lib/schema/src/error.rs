use crm_connector_transport::TransportError;

#[derive(thiserror::Error, Debug)]
pub enum SchemaError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("Introspection response for type \"{0}\" was malformed: {1}")]
    MalformedIntrospection(String, String),
    #[error("Object metadata response was malformed: {0}")]
    MalformedMetadata(String),
}
