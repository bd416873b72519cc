use convoy_sources::error::SourceError;

pub type ProcessorResult<T> = Result<T, ProcessorError>;

#[derive(Debug, thiserror::Error)]
pub enum ProcessorError {
    #[error("invalid processor configuration: {0}")]
    Configuration(String),
    #[error("field \"{0}\" not found in current source")]
    FieldNotFound(String),
    #[error("cannot read field \"{0}\" as {1}: cell holds {2}")]
    TypeMismatch(String, &'static str, &'static str),
    #[error(transparent)]
    Source(#[from] SourceError),
}
