//! Error types for the gallery client
//!
//! Store failures are classified the same way regardless of which operation
//! produced them; every class is recovered from by reloading the gallery.

use thiserror::Error;

use crate::models::MediaId;

/// Failure of a single MediaStore call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The request did not complete (timeout, connectivity)
    #[error("Network failure: {0}")]
    Network(String),

    /// The store rejected the request (4xx)
    #[error("Request rejected ({status}): {message}")]
    Validation { status: u16, message: String },

    /// The store failed while handling the request (5xx)
    #[error("Store error ({status}): {message}")]
    Server { status: u16, message: String },

    /// A successful response carried a body that could not be read
    #[error("Unexpected response from store: {0}")]
    Decode(String),

    /// The request could not be built
    #[error("Could not encode request: {0}")]
    Encode(String),
}

impl StoreError {
    /// Classify a non-2xx response by its status code
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        if (400..500).contains(&status) {
            StoreError::Validation { status, message }
        } else {
            StoreError::Server { status, message }
        }
    }

    /// Message suitable for showing to the user
    pub fn user_message(&self) -> String {
        match self {
            StoreError::Network(_) => {
                "Could not reach the photo store. Please check your connection.".to_string()
            }
            StoreError::Validation { message, .. } | StoreError::Server { message, .. } => {
                message.clone()
            }
            StoreError::Decode(_) | StoreError::Encode(_) => {
                "Something went wrong while talking to the photo store.".to_string()
            }
        }
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            StoreError::Decode(err.to_string())
        } else if err.is_builder() {
            StoreError::Encode(err.to_string())
        } else {
            StoreError::Network(err.to_string())
        }
    }
}

/// Type alias for Result with StoreError
pub type StoreResult<T> = Result<T, StoreError>;

/// Rejection of a file or batch by the upload queue
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    #[error("File type {content_type} is not accepted")]
    UnsupportedType { content_type: String },

    #[error("File {file_name} is {size} bytes, the limit is {limit}")]
    FileTooLarge {
        file_name: String,
        size: usize,
        limit: usize,
    },

    #[error("File {file_name} is empty")]
    EmptyFile { file_name: String },

    #[error("At most {limit} files can be staged at once")]
    TooManyFiles { limit: usize },

    #[error("No files are queued for upload")]
    EmptyBatch,

    #[error("An upload is already in progress")]
    UploadInProgress,

    #[error("No staged upload at index {0}")]
    NoSuchEntry(usize),
}

/// Invalid index passed to an ordering operation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderingError {
    #[error("Index {index} is out of bounds for a gallery of {len} items")]
    IndexOutOfBounds { index: usize, len: usize },
}

/// Error returned by gallery controller operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GalleryError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Ordering(#[from] OrderingError),

    #[error("No gallery is open")]
    NoGallery,

    #[error("Media item {0} is not part of this gallery")]
    UnknownItem(MediaId),

    #[error("No drag gesture is in progress")]
    NoDrag,
}

/// Type alias for Result with GalleryError
pub type GalleryResult<T> = Result<T, GalleryError>;
