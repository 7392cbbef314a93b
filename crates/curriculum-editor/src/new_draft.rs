//! Draft for creating a curriculum under an assigned course.

use crate::types::duplicate_names;
use crate::{CreateCurriculumRequest, CurriculumError, CurriculumResult};

/// A course selection plus an ordered list of topic fields.
///
/// Starts with one empty field, like the add-curriculum form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCurriculumDraft {
    course_id: Option<String>,
    topics: Vec<String>,
}

impl Default for NewCurriculumDraft {
    fn default() -> Self {
        Self {
            course_id: None,
            topics: vec![String::new()],
        }
    }
}

impl NewCurriculumDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draft pre-filled with a course and topics.
    pub fn with_topics<I, S>(course_id: impl Into<String>, topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            course_id: Some(course_id.into()),
            topics: topics.into_iter().map(Into::into).collect(),
        }
    }

    pub fn select_course(&mut self, course_id: impl Into<String>) {
        self.course_id = Some(course_id.into());
    }

    pub fn course_id(&self) -> Option<&str> {
        self.course_id.as_deref()
    }

    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    /// Append an empty topic field and return its index.
    pub fn add_topic(&mut self) -> usize {
        self.topics.push(String::new());
        self.topics.len() - 1
    }

    pub fn remove_topic(&mut self, index: usize) -> Option<String> {
        (index < self.topics.len()).then(|| self.topics.remove(index))
    }

    /// Replace the topic at `index`. Returns false when out of range.
    pub fn update_topic(&mut self, index: usize, value: impl Into<String>) -> bool {
        match self.topics.get_mut(index) {
            Some(slot) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }

    /// Check the draft and return the trimmed topic names.
    pub fn validate(&self) -> CurriculumResult<Vec<String>> {
        if self.course_id.as_deref().map_or(true, |id| id.trim().is_empty()) {
            return Err(CurriculumError::MissingCourse);
        }

        let trimmed: Vec<String> = self
            .topics
            .iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();

        if trimmed.is_empty() {
            return Err(CurriculumError::NoTopics);
        }
        if trimmed.len() != self.topics.len() {
            return Err(CurriculumError::BlankTopic);
        }

        let duplicates = duplicate_names(trimmed.iter().map(String::as_str));
        if !duplicates.is_empty() {
            return Err(CurriculumError::DuplicateTopics { names: duplicates });
        }

        Ok(trimmed)
    }

    /// Validate and build the create body.
    pub fn to_request(&self) -> CurriculumResult<CreateCurriculumRequest> {
        let topics = self.validate()?;
        Ok(CreateCurriculumRequest {
            course_id: self.course_id.clone().unwrap_or_default(),
            topics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_draft_has_one_empty_field() {
        let draft = NewCurriculumDraft::new();
        assert_eq!(draft.topics(), &[String::new()]);
        assert_eq!(draft.course_id(), None);
    }

    #[test]
    fn test_requires_course() {
        let draft = NewCurriculumDraft {
            course_id: None,
            topics: vec!["Algebra".into()],
        };
        assert_eq!(draft.validate(), Err(CurriculumError::MissingCourse));
    }

    #[test]
    fn test_requires_a_topic() {
        let mut draft = NewCurriculumDraft::new();
        draft.select_course("course-1");
        assert_eq!(draft.validate(), Err(CurriculumError::NoTopics));
    }

    #[test]
    fn test_rejects_blank_fields() {
        let mut draft = NewCurriculumDraft::new();
        draft.select_course("course-1");
        draft.update_topic(0, "Algebra");
        draft.add_topic();

        assert_eq!(draft.validate(), Err(CurriculumError::BlankTopic));

        assert_eq!(draft.remove_topic(1), Some(String::new()));
        assert!(draft.validate().is_ok());
        assert_eq!(draft.remove_topic(5), None);
    }

    #[test]
    fn test_rejects_duplicates() {
        let draft = NewCurriculumDraft::with_topics("course-1", ["Algebra", " algebra"]);
        assert!(matches!(
            draft.validate(),
            Err(CurriculumError::DuplicateTopics { .. })
        ));
    }

    #[test]
    fn test_request_trims_topics() {
        let draft = NewCurriculumDraft::with_topics("course-1", [" Algebra ", "Geometry"]);
        let request = draft.to_request().unwrap();

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({ "courseId": "course-1", "topics": ["Algebra", "Geometry"] })
        );
    }

    #[test]
    fn test_update_out_of_range() {
        let mut draft = NewCurriculumDraft::new();
        assert!(!draft.update_topic(3, "Algebra"));
    }
}
