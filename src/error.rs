//! crate error type

use thiserror::Error;

/// everything that can go wrong while wiring up or loading a flipbook
#[derive(Debug, Error)]
pub enum FlipbookError {
    /// file or stream failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// bad json in storage or a message
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// no container id was given
    #[error("Container id is required")]
    MissingContainer,

    /// the stage has no element with this id
    #[error("Container `{0}` was not found")]
    ContainerNotFound(String),

    /// the source is empty
    #[error("A source is required")]
    MissingSource,

    /// the source shape does not fit the content type
    #[error("Unsupported source for content type {0}")]
    UnsupportedSource(String),

    /// an image book was given a single string
    #[error("Image sources must be a list of URLs")]
    ImagesRequireList,

    /// pdf content without a rasteriser
    #[error("No PDF backend is available to render this document")]
    NoPdfBackend,

    /// the pdf backend failed
    #[error("PDF error: {0}")]
    Pdf(String),

    /// encoding or decoding pixels failed
    #[error("Image error: {0}")]
    Image(String),

    /// a remote resource could not be downloaded
    #[error("Failed to fetch content: {0}")]
    Fetch(String),

    /// malformed `data:` uri
    #[error("Invalid data URI: {0}")]
    InvalidDataUri(String),

    /// bookmark storage is unavailable
    #[error("Storage error: {0}")]
    Storage(String),

    /// configuration did not parse or validate
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// the viewer was used before `init`
    #[error("Viewer is not initialized")]
    NotInitialized,

    /// anything else
    #[error("{0}")]
    Other(String),
}

impl From<String> for FlipbookError {
    fn from(value: String) -> Self {
        Self::Other(value)
    }
}

impl From<reqwest::Error> for FlipbookError {
    fn from(value: reqwest::Error) -> Self {
        Self::Fetch(value.to_string())
    }
}

impl From<base64::DecodeError> for FlipbookError {
    fn from(value: base64::DecodeError) -> Self {
        Self::InvalidDataUri(value.to_string())
    }
}

impl From<image::ImageError> for FlipbookError {
    fn from(value: image::ImageError) -> Self {
        Self::Image(value.to_string())
    }
}

impl From<toml::de::Error> for FlipbookError {
    fn from(value: toml::de::Error) -> Self {
        Self::Config(value.to_string())
    }
}

impl miette::Diagnostic for FlipbookError {}

/// result type used across the crate
pub type Result<T> = std::result::Result<T, FlipbookError>;
