//! Typed client for the mentor portal's course, curriculum and class endpoints.
//!
//! This crate provides:
//! - `MentorApi`: one method per endpoint, over an authenticated `ApiClient`
//! - `ClassScheduleDraft`: validation for scheduling and rescheduling classes
//! - `group_by_day`: the day-by-day agenda of upcoming classes

mod client;
mod error;
mod schedule;
mod types;

pub use client::MentorApi;
pub use error::{MentorApiError, MentorApiResult, ScheduleError};
pub use schedule::{classes_on, group_by_day, ClassScheduleDraft, DayAgenda, DEFAULT_CLASS_TIME};
pub use types::{
    ClassOptions, CourseOption, RescheduleRequest, ScheduleClassRequest, ScheduledClass,
    TopicOption,
};
