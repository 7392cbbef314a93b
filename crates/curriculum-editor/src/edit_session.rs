//! Edit reconciliation for an existing curriculum.
//!
//! An `EditSession` holds a working copy of a curriculum next to the topic
//! list it was opened from. Deletions are marks, not removals, so they can be
//! undone until the payload is built.

use crate::types::{duplicate_names, is_placeholder_id};
use crate::{
    CurriculumError, CurriculumResult, Curriculum, CurriculumTopic, TopicPayload,
    UpdateCurriculumRequest,
};
use std::collections::BTreeSet;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct EditSession {
    working: Curriculum,
    original_topics: Vec<CurriculumTopic>,
    deleted: BTreeSet<String>,
}

impl EditSession {
    /// Open a session on a copy of `curriculum`.
    pub fn begin(curriculum: &Curriculum) -> Self {
        Self {
            working: curriculum.clone(),
            original_topics: curriculum.topics.clone(),
            deleted: BTreeSet::new(),
        }
    }

    pub fn working_copy(&self) -> &Curriculum {
        &self.working
    }

    pub fn original_topics(&self) -> &[CurriculumTopic] {
        &self.original_topics
    }

    pub fn deleted_topic_ids(&self) -> impl Iterator<Item = &str> {
        self.deleted.iter().map(String::as_str)
    }

    pub fn is_deleted(&self, id: &str) -> bool {
        self.deleted.contains(id)
    }

    /// Rename a topic in the working copy. Deleted and completed topics are
    /// left untouched. Returns whether the rename was applied.
    pub fn rename_topic(&mut self, id: &str, name: &str) -> bool {
        if self.deleted.contains(id) {
            return false;
        }
        match self.working.topics.iter_mut().find(|t| t.id == id) {
            Some(topic) if !topic.completed => {
                topic.name = name.to_string();
                true
            }
            _ => false,
        }
    }

    /// Mark or unmark a topic for deletion. Returns whether the topic is now
    /// marked. Ids not in the working copy are ignored.
    pub fn toggle_delete(&mut self, id: &str) -> bool {
        if !self.working.topics.iter().any(|t| t.id == id) {
            return false;
        }
        if self.deleted.remove(id) {
            false
        } else {
            self.deleted.insert(id.to_string());
            true
        }
    }

    /// Append a blank topic and return its placeholder id.
    pub fn add_topic(&mut self) -> String {
        let topic = CurriculumTopic::placeholder();
        let id = topic.id.clone();
        self.working.topics.push(topic);
        id
    }

    /// Whether the working copy differs from the opened topics.
    ///
    /// Names are compared by position, not by id: swapping two names reads
    /// as a change even though the set of names is the same.
    pub fn has_pending_changes(&self) -> bool {
        if !self.deleted.is_empty() {
            return true;
        }
        if self.working.topics.len() != self.original_topics.len() {
            return true;
        }
        self.original_topics
            .iter()
            .zip(&self.working.topics)
            .any(|(original, current)| original.name != current.name)
    }

    /// Reject the working copy if two surviving, non-blank names collide
    /// after trimming and case folding.
    pub fn validate_unique(&self) -> CurriculumResult<()> {
        let names = self
            .working
            .topics
            .iter()
            .filter(|t| !self.deleted.contains(&t.id))
            .map(|t| t.name.as_str());

        let duplicates = duplicate_names(names);
        if duplicates.is_empty() {
            Ok(())
        } else {
            Err(CurriculumError::DuplicateTopics { names: duplicates })
        }
    }

    /// Build the update body: deleted topics dropped, placeholder ids
    /// stripped, server ids kept.
    pub fn build_save_payload(&self) -> UpdateCurriculumRequest {
        let curriculum = self
            .working
            .topics
            .iter()
            .filter(|t| !self.deleted.contains(&t.id))
            .map(|t| TopicPayload {
                id: (!is_placeholder_id(&t.id)).then(|| t.id.clone()),
                topic: t.name.clone(),
                status: t.completed,
                date: t.completion_date,
            })
            .collect();

        UpdateCurriculumRequest {
            course_id: self.working.id.clone(),
            curriculum,
        }
    }

    /// Validate, then build the payload.
    pub fn prepare_save(&self) -> CurriculumResult<UpdateCurriculumRequest> {
        self.validate_unique()?;
        let payload = self.build_save_payload();
        debug!(
            curriculum_id = %payload.course_id,
            topics = payload.curriculum.len(),
            deleted = self.deleted.len(),
            "Prepared curriculum update"
        );
        Ok(payload)
    }
}
