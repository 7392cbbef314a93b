//! Curriculum model and edit reconciliation for the mentor portal.
//!
//! This crate provides:
//! - The curriculum wire model (`Curriculum`, `CurriculumTopic`)
//! - `EditSession`: a working copy diffed against the last-fetched topics
//! - `NewCurriculumDraft`: validation for creating a curriculum

mod edit_session;
mod error;
mod new_draft;
mod types;

pub use edit_session::EditSession;
pub use error::{CurriculumError, CurriculumResult};
pub use new_draft::NewCurriculumDraft;
pub use types::{
    is_placeholder_id, placeholder_id, CreateCurriculumRequest, Curriculum, CurriculumTopic,
    TopicPayload, UpdateCurriculumRequest, PLACEHOLDER_PREFIX,
};
