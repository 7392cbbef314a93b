//! Wire types for course, topic and class endpoints.

use chrono::{DateTime, Utc};
use curriculum_editor::Curriculum;
use serde::{Deserialize, Serialize};

/// A course assigned to the mentor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseOption {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// A topic the mentor can schedule a class for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicOption {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Courses and topics offered by the class scheduler.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassOptions {
    #[serde(default)]
    pub courses: Vec<CourseOption>,
    #[serde(default)]
    pub topics: Vec<TopicOption>,
}

/// A class on the mentor's calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledClass {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub topic: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_name: Option<String>,
    #[serde(rename = "scheduledAt", alias = "schedule")]
    pub scheduled_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Body of `POST /class/schedule-class`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleClassRequest {
    pub topic: String,
    pub schedule: DateTime<Utc>,
}

/// Body of `PATCH /class/reschedule`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RescheduleRequest {
    pub class_id: String,
    pub schedule: DateTime<Utc>,
}

// ==========================================
// Response envelopes
// ==========================================

#[derive(Deserialize)]
pub(crate) struct CoursesResponse {
    #[serde(default)]
    pub data: Vec<CourseOption>,
}

#[derive(Deserialize)]
pub(crate) struct TopicsResponse {
    #[serde(default)]
    pub topics: Vec<TopicOption>,
}

/// `/course/my-curriculums` answers with a list, a single curriculum, or
/// nothing at all.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum CurriculumsResponse {
    Many(Vec<Curriculum>),
    One(Box<Curriculum>),
}

impl CurriculumsResponse {
    pub fn into_vec(this: Option<Self>) -> Vec<Curriculum> {
        match this {
            Some(CurriculumsResponse::Many(list)) => list,
            Some(CurriculumsResponse::One(single)) => vec![*single],
            None => Vec::new(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum UpcomingResponse {
    List(Vec<ScheduledClass>),
    Wrapped {
        #[serde(default)]
        classes: Vec<ScheduledClass>,
    },
}

impl UpcomingResponse {
    pub fn into_vec(self) -> Vec<ScheduledClass> {
        match self {
            UpcomingResponse::List(classes) | UpcomingResponse::Wrapped { classes } => classes,
        }
    }
}
