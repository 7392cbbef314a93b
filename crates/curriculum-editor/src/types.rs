//! Curriculum wire types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Prefix of ids minted locally for topics not yet persisted.
pub const PLACEHOLDER_PREFIX: &str = "temp-";

/// Mint a placeholder id for a new topic.
pub fn placeholder_id() -> String {
    format!("{}{}", PLACEHOLDER_PREFIX, Uuid::new_v4())
}

/// Check whether `id` was minted locally rather than by the server.
pub fn is_placeholder_id(id: &str) -> bool {
    id.starts_with(PLACEHOLDER_PREFIX)
}

/// One topic of a curriculum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurriculumTopic {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "topic", default)]
    pub name: String,
    #[serde(rename = "status", default)]
    pub completed: bool,
    #[serde(rename = "date", default, skip_serializing_if = "Option::is_none")]
    pub completion_date: Option<DateTime<Utc>>,
}

impl CurriculumTopic {
    /// A blank, uncompleted topic with a placeholder id.
    pub fn placeholder() -> Self {
        Self {
            id: placeholder_id(),
            name: String::new(),
            completed: false,
            completion_date: None,
        }
    }
}

/// A course curriculum as returned by `/course/my-curriculums`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Curriculum {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "course_name", default)]
    pub course_name: String,
    #[serde(rename = "curriculum", default)]
    pub topics: Vec<CurriculumTopic>,
    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl Curriculum {
    pub fn completed_count(&self) -> usize {
        self.topics.iter().filter(|t| t.completed).count()
    }

    /// Share of completed topics, 0–100. An empty curriculum is 0.
    pub fn completion_percentage(&self) -> f64 {
        if self.topics.is_empty() {
            return 0.0;
        }
        self.completed_count() as f64 / self.topics.len() as f64 * 100.0
    }
}

/// A topic as sent to `/course/update-curriculum`. A missing id asks the
/// server to create the topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicPayload {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub topic: String,
    pub status: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
}

/// Body of `PUT /course/update-curriculum`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCurriculumRequest {
    pub course_id: String,
    pub curriculum: Vec<TopicPayload>,
}

/// Body of `POST /course/createcurriculum`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCurriculumRequest {
    pub course_id: String,
    pub topics: Vec<String>,
}

/// Names that collide after trimming and case folding. Blank names never
/// collide.
pub(crate) fn duplicate_names<'a, I>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = BTreeSet::new();
    let mut duplicates = BTreeSet::new();

    for name in names {
        let key = name.trim().to_lowercase();
        if key.is_empty() {
            continue;
        }
        if !seen.insert(key.clone()) {
            duplicates.insert(key);
        }
    }

    duplicates.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_curriculum_wire_format() {
        let curriculum: Curriculum = serde_json::from_value(json!({
            "_id": "c1",
            "course_name": "Mathematics",
            "curriculum": [
                { "_id": "t1", "topic": "Algebra", "status": true, "date": "2025-03-01T10:00:00Z" },
                { "_id": "t2", "topic": "Geometry", "status": false }
            ],
            "updatedAt": "2025-03-02T08:30:00.000Z"
        }))
        .unwrap();

        assert_eq!(curriculum.course_name, "Mathematics");
        assert_eq!(curriculum.topics.len(), 2);
        assert!(curriculum.topics[0].completed);
        assert!(curriculum.topics[0].completion_date.is_some());
        assert!(curriculum.topics[1].completion_date.is_none());
        assert!(curriculum.last_updated.is_some());
    }

    #[test]
    fn test_completion_percentage() {
        let mut curriculum = Curriculum {
            id: "c1".into(),
            course_name: "Physics".into(),
            topics: Vec::new(),
            last_updated: None,
        };
        assert_eq!(curriculum.completion_percentage(), 0.0);

        for (i, completed) in [true, false, false, true].into_iter().enumerate() {
            curriculum.topics.push(CurriculumTopic {
                id: format!("t{}", i),
                name: format!("Topic {}", i),
                completed,
                completion_date: None,
            });
        }
        assert_eq!(curriculum.completed_count(), 2);
        assert_eq!(curriculum.completion_percentage(), 50.0);
    }

    #[test]
    fn test_placeholder_ids() {
        let a = placeholder_id();
        let b = placeholder_id();
        assert!(is_placeholder_id(&a));
        assert_ne!(a, b);
        assert!(!is_placeholder_id("65f1c0ffee"));
    }

    #[test]
    fn test_duplicate_names() {
        assert_eq!(duplicate_names(["Algebra", "algebra "]), vec!["algebra"]);
        assert!(duplicate_names(["Algebra", "Geometry"]).is_empty());
        assert!(duplicate_names(["", "  ", "Algebra"]).is_empty());
    }

    #[test]
    fn test_topic_payload_omits_missing_id() {
        let payload = TopicPayload {
            id: None,
            topic: "Vectors".into(),
            status: false,
            date: None,
        };
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({ "topic": "Vectors", "status": false })
        );
    }
}
