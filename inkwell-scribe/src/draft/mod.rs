//! Draft entries: upload validation, the Page Collection and the Submission Pipeline

pub mod pages;
pub mod pipeline;
pub mod upload;

use thiserror::Error;

use crate::capability::CapabilityError;

pub use pages::{CursorMove, Page, PageCollection, PageToken, Transcription, WriteBack};
pub use pipeline::{DraftPhase, DraftSnapshot, PageStatus, PageView, SubmissionPipeline, TitleStatus};
pub use upload::{validate_batch, validate_image, UploadedImage};

/// Input rejected before any remote call
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Unsupported file type: {file_name}. Supported formats: JPEG, PNG, GIF, BMP")]
    UnsupportedFileType { file_name: String },

    #[error("A title is required")]
    EmptyTitle,

    #[error("The entry has no pages")]
    NoPages,
}

/// Failure of a draft operation
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A submission is already in flight for this draft
    #[error("Submission already in progress")]
    SubmissionInFlight,

    #[error("Pages are still being transcribed")]
    TranscriptionPending,

    #[error("No page at position {0}")]
    PageNotFound(usize),

    #[error(transparent)]
    Capability(#[from] CapabilityError),

    #[error("Internal error: {0}")]
    Internal(String),
}
