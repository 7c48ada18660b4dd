use thiserror::Error;

/// Errors raised while clustering pixel colors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuantizeError {
    #[error("Cannot quantize an empty point set")]
    NoPoints,
}

/// Errors raised while turning an image into a board
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("Source image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    #[error("Failed to decode source image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Failed to read source image: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Quantize(#[from] QuantizeError),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Violations of the snapshot/progress shape invariants
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DocumentError {
    #[error("Grid must be at least 1x1, got {cols}x{rows}")]
    EmptyGrid { cols: u32, rows: u32 },

    #[error("Label grid has {actual} cells, expected {expected}")]
    LabelGridSize { expected: usize, actual: usize },

    #[error("Palette must hold between 1 and 256 colors, got {0}")]
    PaletteSize(usize),

    #[error("Cell {index} has label {label} but the palette only has {palette_len} colors")]
    LabelOutOfRange { index: usize, label: u8, palette_len: usize },

    #[error("Fill mask has {actual} cells, expected {expected}")]
    MaskSize { expected: usize, actual: usize },
}

/// Byte array <-> text conversion failures
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Errors from the key/value backend underneath the persistence store
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to serialize record: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage quota exceeded: writing {requested} bytes would exceed {quota} bytes")]
    QuotaExceeded { requested: usize, quota: usize },

    #[error("Invalid record `{key}`: {reason}")]
    InvalidRecord { key: String, reason: String },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors raised by [`crate::command::Command::execute`]
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommandError {
    /// The color does not exist or is already completed
    #[error("Color {0} cannot be selected")]
    ColorUnavailable(usize),
}

/// Errors surfaced by session management
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("No saved puzzle definition for artwork `{0}`")]
    MissingSnapshot(String),

    #[error("No saved progress for artwork `{0}`")]
    MissingProgress(String),

    #[error("No active session")]
    NoSession,

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error(transparent)]
    Generate(#[from] GenerateError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors raised while rendering or encoding exports
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to encode image: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Failed to write export: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] serde_json::Error),
}
