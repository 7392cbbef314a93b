//! Class scheduling commands.
//!
//! Dates and times are read and shown in the local time zone.

use super::{confirm, failure, Portal};
use crate::output::{self, OutputFormat};
use anyhow::Result;
use chrono::{Local, NaiveDate, Utc};
use mentor_api::{classes_on, group_by_day, ClassScheduleDraft, MentorApiError, ScheduledClass};

const CLASSES_ROUTE: &str = "/classes";

fn print_class(class: &ScheduledClass) {
    let at = class.scheduled_at.with_timezone(&Local).format("%H:%M");
    let course = class.course_name.as_deref().unwrap_or("-");
    let status = class.status.as_deref().unwrap_or("scheduled");
    println!(
        "  {}  {:<30} {:<24} {:<10} {}",
        at, class.topic, course, status, class.id
    );
}

/// Show upcoming classes, grouped by day or for one day.
pub async fn classes_upcoming(
    portal: &Portal,
    date: Option<NaiveDate>,
    format: &OutputFormat,
) -> Result<()> {
    portal.require_mentor(CLASSES_ROUTE).await?;

    let classes = portal
        .api
        .upcoming_classes()
        .await
        .map_err(|e| failure(e, "Failed to load classes"))?;

    if let Some(date) = date {
        let day = classes_on(&classes, date, &Local);
        return output::render(&day, format, |day| {
            output::print_heading(&date.format("%A, %B %-d, %Y").to_string());
            if day.is_empty() {
                println!("  No classes scheduled");
            }
            for class in day {
                print_class(class);
            }
        });
    }

    let agenda = group_by_day(&classes, &Local);
    output::render(&agenda, format, |agenda| {
        if agenda.is_empty() {
            println!("No upcoming classes");
            return;
        }
        for day in agenda {
            output::print_heading(&day.date.format("%A, %B %-d, %Y").to_string());
            for class in &day.classes {
                print_class(class);
            }
        }
    })
}

/// Show the courses and topics a class can be scheduled for.
pub async fn classes_options(portal: &Portal, format: &OutputFormat) -> Result<()> {
    portal.require_mentor(CLASSES_ROUTE).await?;

    let options = portal
        .api
        .class_options()
        .await
        .map_err(|e| failure(e, "Failed to load class options"))?;

    output::render(&options, format, |options| {
        output::print_heading("Courses");
        for course in &options.courses {
            println!("  {:<26} {}", course.id, course.name);
        }
        output::print_heading("Topics");
        for topic in &options.topics {
            println!("  {:<26} {}", topic.id, topic.name);
        }
    })
}

/// Schedule a class for `topic` at `date` `time`, local time.
pub async fn classes_schedule(
    portal: &Portal,
    topic: Option<String>,
    date: Option<NaiveDate>,
    time: &str,
    format: &OutputFormat,
) -> Result<()> {
    portal.require_mentor(CLASSES_ROUTE).await?;

    let mut draft = ClassScheduleDraft::new();
    if let Some(topic) = topic {
        draft.select_topic(topic);
    }
    if let Some(date) = date {
        draft.select_date(date);
    }
    draft.set_time(time);

    let request = draft
        .to_request(&Local, Utc::now())
        .map_err(|e| failure(MentorApiError::from(e), "Failed to schedule class"))?;

    portal
        .api
        .schedule_class(&request)
        .await
        .map_err(|e| failure(e, "Failed to schedule class"))?;

    output::print_success(
        &format!(
            "Class scheduled for {}",
            request.schedule.with_timezone(&Local).format("%Y-%m-%d %H:%M")
        ),
        format,
    );
    Ok(())
}

/// Move a class to a new local date and time.
pub async fn classes_reschedule(
    portal: &Portal,
    class_id: &str,
    date: NaiveDate,
    time: &str,
    format: &OutputFormat,
) -> Result<()> {
    portal.require_mentor(CLASSES_ROUTE).await?;

    let mut draft = ClassScheduleDraft::new();
    draft.select_date(date);
    draft.set_time(time);

    let request = draft
        .to_reschedule(class_id, &Local, Utc::now())
        .map_err(|e| failure(MentorApiError::from(e), "Failed to reschedule class"))?;

    portal
        .api
        .reschedule_class(&request)
        .await
        .map_err(|e| failure(e, "Failed to reschedule class"))?;

    output::print_success(
        &format!(
            "Class rescheduled to {}",
            request.schedule.with_timezone(&Local).format("%Y-%m-%d %H:%M")
        ),
        format,
    );
    Ok(())
}

/// Cancel a class, asking first unless `yes` is set.
pub async fn classes_cancel(
    portal: &Portal,
    class_id: &str,
    yes: bool,
    format: &OutputFormat,
) -> Result<()> {
    portal.require_mentor(CLASSES_ROUTE).await?;

    if !yes && !confirm(&format!("Cancel class {}?", class_id)) {
        output::print_success("Cancelled nothing", format);
        return Ok(());
    }

    portal
        .api
        .cancel_class(class_id)
        .await
        .map_err(|e| failure(e, "Failed to cancel class"))?;

    output::print_success("Class cancelled", format);
    Ok(())
}
