//! Common error types for the qMRI tools

use std::path::PathBuf;
use thiserror::Error;

/// Common result type for qMRI operations
pub type Result<T> = std::result::Result<T, Error>;

/// Broad error category
///
/// None of these are transient, so callers never retry; the orchestration
/// layer uses the kind to decide between skipping a subject and aborting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No matching files, index rows or derivatives
    NotFound,
    /// More than one candidate where exactly one is required
    AmbiguousData,
    /// Filename or sidecar content does not satisfy the expected format
    MalformedInput,
    /// Filesystem access failed
    Io,
    /// Configuration could not be loaded
    Config,
}

/// Common error types across the qMRI tools
#[derive(Error, Debug)]
pub enum Error {
    /// Scan root does not exist
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// Scan root exists but is not a directory
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// No image matched the subject/session/acquisition filter
    #[error(
        "No MPRAGE images found for sub-{subject}, ses-{}, acq-{acquisition}",
        .session.as_deref().unwrap_or("*")
    )]
    NoImagesFound {
        subject: String,
        session: Option<String>,
        acquisition: String,
    },

    /// Lookup of a fixed (inversion, echo, part) row failed
    #[error("No {part} image at inv-{inversion} echo-{echo} for acq-{acquisition}")]
    ImageNotFoundInIndex {
        acquisition: String,
        inversion: u32,
        echo: u32,
        part: String,
    },

    /// Image has no sidecar document to join against
    #[error("No JSON sidecar found for {0}")]
    MissingMetadata(PathBuf),

    /// Image joins against more than one sidecar document
    #[error("Ambiguous metadata for {image}: {} sidecars match", .sidecars.len())]
    AmbiguousMetadataJoin {
        image: PathBuf,
        sidecars: Vec<PathBuf>,
    },

    /// Two image files map onto the same (acquisition, inversion, echo, part) key
    #[error("Duplicate image key {key}: {first} and {second}")]
    DuplicateImage {
        key: String,
        first: PathBuf,
        second: PathBuf,
    },

    /// More than one calibration map for one subject/session
    #[error("Expected at most one B1 map, found {}", .0.len())]
    AmbiguousB1Map(Vec<PathBuf>),

    /// Required derivative does not exist
    #[error("Derivative not found: {0}")]
    DerivativeNotFound(String),

    /// More than one derivative candidate
    #[error("Ambiguous derivative, {} candidates: {:?}", .0.len(), .0)]
    AmbiguousDerivative(Vec<PathBuf>),

    /// Named output not produced by the fitting routine
    #[error("Fit output not available: {0}")]
    FitOutputNotFound(String),

    /// Filename does not follow the acquisition grammar
    #[error("Malformed filename: {0}")]
    MalformedFilename(String),

    /// Sidecar unreadable, or a required field missing or invalid
    #[error("Malformed metadata in {path}: {reason}")]
    MalformedMetadata { path: PathBuf, reason: String },

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File access error with the offending path
    #[error("File access error {0}: {1}")]
    FileAccess(PathBuf, String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::PathNotFound(_)
            | Error::NoImagesFound { .. }
            | Error::ImageNotFoundInIndex { .. }
            | Error::MissingMetadata(_)
            | Error::DerivativeNotFound(_)
            | Error::FitOutputNotFound(_) => ErrorKind::NotFound,
            Error::AmbiguousMetadataJoin { .. }
            | Error::DuplicateImage { .. }
            | Error::AmbiguousB1Map(_)
            | Error::AmbiguousDerivative(_) => ErrorKind::AmbiguousData,
            Error::MalformedFilename(_) | Error::MalformedMetadata { .. } => {
                ErrorKind::MalformedInput
            }
            Error::NotADirectory(_) | Error::Io(_) | Error::FileAccess(..) => ErrorKind::Io,
            Error::Config(_) => ErrorKind::Config,
        }
    }

    /// Shorthand for a `MalformedMetadata` error
    pub fn malformed_metadata(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::MalformedMetadata {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
