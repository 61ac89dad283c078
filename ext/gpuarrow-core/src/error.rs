use thiserror::Error;

/// Core error type for shared region reads
#[derive(Error, Debug)]
pub enum GpuArrowError {
    /// The metadata parser reported a failure, or the metadata document is malformed
    #[error("Metadata parsing error: {0}")]
    MetadataParsing(String),

    /// An element type outside the recognized (kind, bit-width) table
    #[error("Unsupported type: {kind} {bitwidth}-bits")]
    UnsupportedType { kind: String, bitwidth: u32 },

    /// A slice derived from a descriptor does not fit the shared region
    #[error("Size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// A buffer address cannot be reinterpreted as the requested element type
    #[error("Misaligned buffer: {type_name} requires {align}-byte alignment")]
    Misaligned { type_name: &'static str, align: usize },

    /// Positional column access outside `[0, count)`
    #[error("Column index {index} out of range for {count} columns")]
    IndexOutOfRange { index: usize, count: usize },

    /// Two metadata entries share a column name
    #[error("Duplicate column name: {0}")]
    DuplicateColumn(String),

    /// Invalid argument errors
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Region contents disagree with the metadata describing them
    #[error("Data validation error: {0}")]
    DataValidation(String),

    /// Arrow errors from array construction
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow_schema::ArrowError),
}

/// Result type alias for shared region reads
pub type Result<T> = std::result::Result<T, GpuArrowError>;

impl GpuArrowError {
    /// Create a new metadata parsing error
    pub fn metadata_parsing<S: Into<String>>(msg: S) -> Self {
        GpuArrowError::MetadataParsing(msg.into())
    }

    /// Create a new unsupported type error
    pub fn unsupported_type<S: Into<String>>(kind: S, bitwidth: u32) -> Self {
        GpuArrowError::UnsupportedType {
            kind: kind.into(),
            bitwidth,
        }
    }

    /// Create a new size mismatch error
    pub fn size_mismatch(expected: usize, actual: usize) -> Self {
        GpuArrowError::SizeMismatch { expected, actual }
    }

    /// Create a new invalid argument error
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        GpuArrowError::InvalidArgument(msg.into())
    }

    /// Create a new data validation error
    pub fn data_validation<S: Into<String>>(msg: S) -> Self {
        GpuArrowError::DataValidation(msg.into())
    }
}

impl From<serde_json::Error> for GpuArrowError {
    fn from(err: serde_json::Error) -> Self {
        GpuArrowError::MetadataParsing(err.to_string())
    }
}
