//! Mentor API error types.

use curriculum_editor::CurriculumError;
use mentor_auth::ApiError;
use thiserror::Error;

/// Validation errors for class schedules, raised before any request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Please select both a topic and a date.")]
    MissingTopicOrDate,

    #[error("Please select a date.")]
    MissingDate,

    #[error("Invalid time '{0}', expected HH:MM")]
    InvalidTime(String),

    /// Local time skipped or repeated by a clock change.
    #[error("{0} is not a valid local time")]
    AmbiguousTime(String),

    #[error("Cannot schedule a class in the past")]
    PastSchedule,

    #[error("Class id must not be empty")]
    MissingClassId,

    /// Ids are single path segments of letters, digits, `-` and `_`.
    #[error("Invalid class id '{0}'")]
    InvalidClassId(String),
}

/// Error type for mentor API operations.
#[derive(Error, Debug)]
pub enum MentorApiError {
    /// Request failed
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Curriculum rejected before sending
    #[error(transparent)]
    Curriculum(#[from] CurriculumError),

    /// Schedule rejected before sending
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}

impl MentorApiError {
    /// Returns true for failures raised before any request was sent.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            MentorApiError::Curriculum(_) | MentorApiError::Schedule(_)
        )
    }

    /// Returns true if this error is transient and the operation can be retried.
    pub fn is_transient(&self) -> bool {
        match self {
            MentorApiError::Api(e) => e.is_transient(),
            _ => false,
        }
    }

    /// Message to show the mentor: validation text, the server's own
    /// message, or `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            MentorApiError::Api(ApiError::Unauthenticated) => self.to_string(),
            MentorApiError::Api(e) => e
                .server_message()
                .map(str::to_string)
                .unwrap_or_else(|| fallback.to_string()),
            _ => self.to_string(),
        }
    }
}

/// Result type alias using MentorApiError.
pub type MentorApiResult<T> = Result<T, MentorApiError>;
