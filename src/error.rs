//! Error handling for HSI Synth
//!
//! Every failing operation reports which argument was wrong and which
//! constraint it broke, so callers can surface a precise message.

use thiserror::Error;

/// Result type alias for synthesis operations
pub type Result<T> = std::result::Result<T, SynthError>;

/// Coarse error taxonomy shared by all variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad dimensions, counts, radii or peak parameters
    InvalidArgument,
    /// A layout refers to a class that has no spectrum
    IndexOutOfRange,
    /// File system or serialization failure
    Io,
}

/// Main error type for synthesis operations
#[derive(Error, Debug)]
pub enum SynthError {
    // Argument Errors
    #[error("Invalid argument `{param}`: {reason}")]
    InvalidArgument { param: String, reason: String },

    #[error("Spectrum '{spectrum}' has {actual} bands, expected {expected}")]
    BandCountMismatch {
        spectrum: String,
        expected: usize,
        actual: usize,
    },

    #[error("Pixel ({x}, {y}) has no class assigned")]
    UnassignedPixel { x: usize, y: usize },

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: String, actual: String },

    // Index Errors
    #[error("Class index {index} at pixel ({x}, {y}) is out of range ({available} spectra available)")]
    ClassIndexOutOfRange {
        index: usize,
        available: usize,
        x: usize,
        y: usize,
    },

    #[error("No spectrum at index {index} ({len} spectra defined)")]
    SpectrumNotFound { index: usize, len: usize },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SynthError {
    /// Shorthand for building an `InvalidArgument` error
    pub fn invalid(param: impl Into<String>, reason: impl Into<String>) -> Self {
        SynthError::InvalidArgument {
            param: param.into(),
            reason: reason.into(),
        }
    }

    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            SynthError::InvalidArgument { .. } => "INVALID_ARGUMENT",
            SynthError::BandCountMismatch { .. } => "BAND_COUNT_MISMATCH",
            SynthError::UnassignedPixel { .. } => "UNASSIGNED_PIXEL",
            SynthError::DimensionMismatch { .. } => "DIMENSION_MISMATCH",
            SynthError::ClassIndexOutOfRange { .. } => "CLASS_INDEX_OUT_OF_RANGE",
            SynthError::SpectrumNotFound { .. } => "SPECTRUM_NOT_FOUND",
            SynthError::Io(_) => "IO_ERROR",
            SynthError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Which part of the taxonomy this error belongs to
    pub fn kind(&self) -> ErrorKind {
        match self {
            SynthError::InvalidArgument { .. }
            | SynthError::BandCountMismatch { .. }
            | SynthError::UnassignedPixel { .. }
            | SynthError::DimensionMismatch { .. } => ErrorKind::InvalidArgument,
            SynthError::ClassIndexOutOfRange { .. } | SynthError::SpectrumNotFound { .. } => {
                ErrorKind::IndexOutOfRange
            }
            SynthError::Io(_) | SynthError::Serialization(_) => ErrorKind::Io,
        }
    }

    /// Returns a suggested recovery action for this error
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            Self::InvalidArgument { .. } => "Adjust the argument to satisfy the stated constraint",
            Self::BandCountMismatch { .. } => "Regenerate all spectra with the same number of bands",
            Self::UnassignedPixel { .. } => "Generate a layout pattern before blending or exporting",
            Self::ClassIndexOutOfRange { .. } => {
                "Regenerate the layout after adding or removing class spectra"
            }
            Self::SpectrumNotFound { .. } => "Pick an existing spectrum",
            _ => "Check the error details and try again",
        }
    }
}
