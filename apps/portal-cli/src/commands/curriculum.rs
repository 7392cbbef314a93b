//! Course and curriculum commands.

use super::{failure, Portal};
use crate::output::{self, OutputFormat};
use anyhow::{Context, Result};
use curriculum_editor::{EditSession, NewCurriculumDraft};
use std::collections::HashSet;
use tracing::debug;

const DASHBOARD_ROUTE: &str = "/dashboard";
const CURRICULUM_ROUTE: &str = "/curriculum";

/// List courses assigned to the mentor.
pub async fn courses(portal: &Portal, format: &OutputFormat) -> Result<()> {
    portal.require_mentor(DASHBOARD_ROUTE).await?;

    let courses = portal
        .api
        .courses()
        .await
        .map_err(|e| failure(e, "Failed to load courses"))?;

    output::render(&courses, format, |courses| {
        if courses.is_empty() {
            println!("No courses assigned");
            return;
        }
        println!("{:<26} {}", "ID", "Name");
        output::print_divider();
        for course in courses {
            println!("{:<26} {}", course.id, course.name);
        }
    })
}

/// List the mentor's topics.
pub async fn topics(portal: &Portal, format: &OutputFormat) -> Result<()> {
    portal.require_mentor(DASHBOARD_ROUTE).await?;

    let topics = portal
        .api
        .topics()
        .await
        .map_err(|e| failure(e, "Failed to load topics"))?;

    output::render(&topics, format, |topics| {
        if topics.is_empty() {
            println!("No topics found");
            return;
        }
        println!("{:<26} {}", "ID", "Name");
        output::print_divider();
        for topic in topics {
            println!("{:<26} {}", topic.id, topic.name);
        }
    })
}

/// Show every curriculum with its progress.
pub async fn curriculum_list(portal: &Portal, format: &OutputFormat) -> Result<()> {
    portal.require_mentor(CURRICULUM_ROUTE).await?;

    let curriculums = portal
        .api
        .my_curriculums()
        .await
        .map_err(|e| failure(e, "Failed to load curriculums"))?;

    output::render(&curriculums, format, |curriculums| {
        if curriculums.is_empty() {
            println!("No curriculums yet. Create one with 'mentor-portal curriculum create'.");
            return;
        }
        for curriculum in curriculums {
            output::print_heading(&format!(
                "{} [{}] {}/{} topics, {:.0}% complete",
                curriculum.course_name,
                curriculum.id,
                curriculum.completed_count(),
                curriculum.topics.len(),
                curriculum.completion_percentage()
            ));
            for topic in &curriculum.topics {
                let mark = if topic.completed { "x" } else { " " };
                println!("  [{}] {:<40} {}", mark, topic.name, topic.id);
            }
        }
    })
}

/// Create a curriculum for `course_id`.
pub async fn curriculum_create(
    portal: &Portal,
    course_id: &str,
    topics: Vec<String>,
    format: &OutputFormat,
) -> Result<()> {
    portal.require_mentor(CURRICULUM_ROUTE).await?;

    let draft = NewCurriculumDraft::with_topics(course_id, topics);
    portal
        .api
        .create_curriculum(&draft)
        .await
        .map_err(|e| failure(e, "Unable to save curriculum"))?;

    output::print_success("Curriculum created successfully", format);
    Ok(())
}

/// Changes requested for one curriculum.
pub struct CurriculumEdits {
    /// `TOPIC_ID=NAME` pairs.
    pub renames: Vec<String>,
    pub deletes: Vec<String>,
    pub additions: Vec<String>,
}

/// Apply `edits` to a fresh session. Returns a warning for every edit that
/// had no effect. Repeated delete ids count once.
fn apply_edits(session: &mut EditSession, edits: &CurriculumEdits) -> Result<Vec<String>> {
    let mut warnings = Vec::new();

    for rename in &edits.renames {
        let (topic_id, name) = rename
            .split_once('=')
            .with_context(|| format!("Invalid rename '{}', expected TOPIC_ID=NAME", rename))?;
        let topic_id = topic_id.trim();
        if !session.rename_topic(topic_id, name) {
            warnings.push(format!(
                "Topic {} cannot be renamed (completed or unknown)",
                topic_id
            ));
        }
    }

    let mut seen = HashSet::new();
    for topic_id in &edits.deletes {
        let topic_id = topic_id.trim();
        if !seen.insert(topic_id) {
            continue;
        }
        if !session.toggle_delete(topic_id) && !session.is_deleted(topic_id) {
            warnings.push(format!("Topic {} not found", topic_id));
        }
    }

    for name in &edits.additions {
        let id = session.add_topic();
        session.rename_topic(&id, name);
    }

    Ok(warnings)
}

/// Apply renames, deletions and additions to a curriculum and save them.
pub async fn curriculum_edit(
    portal: &Portal,
    curriculum_id: &str,
    edits: CurriculumEdits,
    format: &OutputFormat,
) -> Result<()> {
    portal.require_mentor(CURRICULUM_ROUTE).await?;

    let curriculums = portal
        .api
        .my_curriculums()
        .await
        .map_err(|e| failure(e, "Failed to load curriculums"))?;
    let curriculum = curriculums
        .iter()
        .find(|c| c.id == curriculum_id)
        .with_context(|| format!("Curriculum {} not found", curriculum_id))?;

    let mut session = EditSession::begin(curriculum);
    for warning in apply_edits(&mut session, &edits)? {
        output::print_warning(&warning, format);
    }

    if !session.has_pending_changes() {
        output::print_success("No changes to save", format);
        return Ok(());
    }

    debug!(
        curriculum_id,
        deleted = session.deleted_topic_ids().count(),
        "Saving curriculum edits"
    );

    portal
        .api
        .update_curriculum(&session)
        .await
        .map_err(|e| failure(e, "Failed to update curriculum"))?;

    output::print_success("Curriculum updated successfully", format);
    Ok(())
}
