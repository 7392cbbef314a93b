//! Curriculum validation errors.

use thiserror::Error;

/// Errors raised before a curriculum request is sent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CurriculumError {
    /// Two topics share a name after trimming and case folding.
    #[error("Topic names must be unique. Duplicate topics found: {}", .names.join(", "))]
    DuplicateTopics { names: Vec<String> },

    #[error("Please select a course before continuing")]
    MissingCourse,

    #[error("Please add at least one topic")]
    NoTopics,

    #[error("Please fill all topic fields or remove empty ones")]
    BlankTopic,
}

/// Result type alias using CurriculumError.
pub type CurriculumResult<T> = Result<T, CurriculumError>;
