//! Error types for studio processing operations

use thiserror::Error;

/// Result type alias for studio operations
pub type Result<T> = std::result::Result<T, StudioError>;

/// Error taxonomy for the image pipeline and its collaborators
#[derive(Error, Debug)]
pub enum StudioError {
    /// Source image could not be fetched or decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Requested backdrop style is not one of the known styles
    #[error("Unsupported style: '{0}' (supported: brown-gradient, minimal-white)")]
    UnsupportedStyle(String),

    /// Width or height outside the accepted range
    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// Images handed to the compositor differ in size
    #[error("Dimension mismatch: background is {background:?}, foreground is {foreground:?}")]
    DimensionMismatch {
        background: (u32, u32),
        foreground: (u32, u32),
    },

    /// External generation service did not answer the availability probe
    #[error("External service unavailable: {0}")]
    ExternalServiceUnavailable(String),

    /// Call to the external generation service timed out or lost its connection
    #[error("External service request failed: {0}")]
    ExternalServiceTransport(String),

    /// External generation service answered with a non-success status
    #[error("External service error: HTTP {status}")]
    ExternalService { status: u16 },

    /// External generation service answered 2xx with an unusable payload
    #[error("External service returned an invalid response: {0}")]
    ExternalServiceResponse(String),

    /// Failure raised by the background removal collaborator
    #[error("Background removal failed: {0}")]
    BackgroundRemoval(String),

    /// Selected backend exists as a variant but has no implementation
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    /// Image encoding failure
    #[error("Encode error: {0}")]
    Encode(String),

    /// Invalid configuration or parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Segmentation model loading or inference errors
    #[error("Model error: {0}")]
    Model(String),

    /// Input/output errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error for unexpected conditions
    #[error("Internal error: {0}")]
    Internal(String),
}

impl StudioError {
    /// Create a new decode error
    pub fn decode<S: Into<String>>(msg: S) -> Self {
        Self::Decode(msg.into())
    }

    /// Create a new unsupported style error
    pub fn unsupported_style<S: Into<String>>(style: S) -> Self {
        Self::UnsupportedStyle(style.into())
    }

    /// Create a new background removal error
    pub fn background_removal<S: Into<String>>(msg: S) -> Self {
        Self::BackgroundRemoval(msg.into())
    }

    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a new model error
    pub fn model<S: Into<String>>(msg: S) -> Self {
        Self::Model(msg.into())
    }

    /// Create a new encode error
    pub fn encode<S: Into<String>>(msg: S) -> Self {
        Self::Encode(msg.into())
    }

    /// Create a new not-implemented error
    pub fn not_implemented<S: Into<String>>(what: S) -> Self {
        Self::NotImplemented(what.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }

    /// Create a response error with the operation that produced it
    pub fn invalid_response(operation: &str, details: &str) -> Self {
        Self::ExternalServiceResponse(format!("{}: {}", operation, details))
    }

    /// Create a fetch error for an unreachable source image
    ///
    /// Unfetchable sources share the decode category: the caller cannot
    /// tell a dead link from a corrupt payload and neither is retried.
    pub fn fetch_error(url: &str, details: &str) -> Self {
        Self::Decode(format!("Failed to fetch source image '{}': {}", url, details))
    }

    /// Create configuration error with valid ranges
    pub fn config_value_error<T: std::fmt::Display>(
        parameter: &str,
        value: T,
        valid_range: &str,
    ) -> Self {
        Self::InvalidConfig(format!(
            "Invalid {}: {} (valid: {})",
            parameter, value, valid_range
        ))
    }

    /// Whether the error comes from the external generation service
    #[must_use]
    pub fn is_external(&self) -> bool {
        matches!(
            self,
            Self::ExternalServiceUnavailable(_)
                | Self::ExternalServiceTransport(_)
                | Self::ExternalService { .. }
                | Self::ExternalServiceResponse(_)
        )
    }
}
