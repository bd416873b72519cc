use convoy_format::error::FormatError;

pub type SourceResult<T> = std::result::Result<T, SourceError>;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Failed to open source \"{0}\" at {1}: {2}")]
    Open(String, String, #[source] FormatError),
    #[error("Container at {0} holds \"{1}\", requested \"{2}\"")]
    NameMismatch(String, String, String),
    #[error("No source registered at {0}")]
    NotRegistered(String),
    #[error("field \"{0}\" not found in current source")]
    FieldNotFound(String),
    #[error("Row {0} is out of bounds for source \"{1}\" with {2} entries")]
    RowOutOfBounds(u64, String, u64),
    #[error("Invalid row for source \"{0}\": {1}")]
    InvalidRow(String, String),
    #[error(transparent)]
    Format(#[from] FormatError),
}
