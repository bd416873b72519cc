pub type FormatResult<T> = std::result::Result<T, FormatError>;

#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("Invalid name \"{0}\" for {1}: {2}")]
    InvalidName(String, String, &'static str),
    #[error("Duplicate field \"{0}\" in schema")]
    DuplicateField(String),
    #[error("Invalid field \"{0}\": {1}")]
    InvalidField(String, &'static str),
    #[error("Locator holds {0} position, requested {1}")]
    LocatorPositionMismatch(&'static str, &'static str),
    #[error("Locator kind {0:#04x} must not appear in a persisted descriptor")]
    NonSerializableLocator(u8),
    #[error("Column type {0} cannot be persisted")]
    NonSerializableColumnType(&'static str),
    #[error("Unknown column type ordinal {0}")]
    UnknownColumnType(u16),
    #[error("Structure kind {0} cannot be persisted")]
    NonSerializableStructure(&'static str),
    #[error("Cell for field \"{0}\" does not match the declared column: expected {1}, got {2}")]
    CellTypeMismatch(String, &'static str, &'static str),
    #[error("Row {0} is outside the container's {1} entries")]
    RowOutOfBounds(u64, u64),
    #[error("No page covers element {2} of field \"{0}\" in cluster {1}")]
    PageNotFound(String, u64, u64),
    #[error("Failed to fetch descriptor at {0}: {1}")]
    DescriptorFetch(String, object_store::Error),
    #[error("Failed to parse descriptor at {0}: {1}")]
    DescriptorParse(String, serde_json::Error),
    #[error("Descriptor format version {0} is newer than supported version {1}")]
    DescriptorVersion(u32, u32),
    #[error("Corrupt descriptor: {0}")]
    DescriptorCorrupt(String),
    #[error("Failed to serialize descriptor: {0}")]
    DescriptorSerialize(serde_json::Error),
    #[error("Failed to fetch page bytes at {0}: {1}")]
    PageFetch(String, object_store::Error),
    #[error("Failed to decode page payload for field \"{0}\": {1}")]
    PageDecode(String, String),
    #[error("Failed to encode cell for field \"{0}\": {1}")]
    CellEncode(String, &'static str),
    #[error("Failed to encode page payload for field \"{0}\": {1}")]
    PageEncode(String, serde_json::Error),
    #[error("Failed to write container object at {0}: {1}")]
    ContainerWrite(String, object_store::Error),
}
