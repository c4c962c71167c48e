use crm_connector_schema::SchemaError;
use crm_connector_transport::TransportError;

#[derive(thiserror::Error, Debug)]
pub enum OperationError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("Unknown resource \"{0}\": not present in the object metadata")]
    UnknownResource(String),
    #[error("The \"{0}\" query returned no matching record")]
    RecordNotFound(String),
    #[error("Response shape mismatch at \"{0}\"")]
    MalformedResponse(String),
    #[error("Matched record has no usable \"id\" field")]
    MissingRecordId,
}
