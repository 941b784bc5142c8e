//! Sprint creation and pomodoro chaining.
//!
//! A sprint with a trailing break leads into a successor. Once a successor
//! exists it is returned as-is, so get-or-create is idempotent whatever start
//! time later callers propose.

use crate::error::CoreError;
use crate::project::Project;
use crate::repository::Repository;
use crate::sprint::{NewSprint, Sprint};
use crate::types::Timestamp;

/// Outcome of [`get_or_create_next_sprint`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextSprint {
    Existing(Sprint),
    Created(Sprint),
}

impl NextSprint {
    pub fn sprint(&self) -> &Sprint {
        match self {
            NextSprint::Existing(s) | NextSprint::Created(s) => s,
        }
    }

    pub fn into_sprint(self) -> Sprint {
        match self {
            NextSprint::Existing(s) | NextSprint::Created(s) => s,
        }
    }

    pub fn was_created(&self) -> bool {
        matches!(self, NextSprint::Created(_))
    }
}

/// Validate and insert a new sprint on `project`.
pub async fn create_sprint(
    repo: &dyn Repository,
    project: &Project,
    time_start: Timestamp,
    duration: i32,
    pomodoro_break: i32,
) -> Result<Sprint, CoreError> {
    let new_sprint = NewSprint::new(project.id, time_start, duration, pomodoro_break)?;
    let sprint = repo.insert_sprint(&new_sprint).await?;
    tracing::info!(
        project_id = project.id,
        sprint_slug = %sprint.slug,
        duration,
        pomodoro_break,
        "Sprint created"
    );
    Ok(sprint)
}

/// The successor of `sprint`: the earliest sprint of the same project that
/// starts strictly after `sprint` ends.
///
/// Single sprints have no successor by definition.
pub async fn find_next_sprint(repo: &dyn Repository, sprint: &Sprint) -> Result<Sprint, CoreError> {
    if sprint.is_single_sprint() {
        return Err(CoreError::not_found("Next sprint", &sprint.slug));
    }
    repo.first_sprint_after(sprint.project_id, sprint.time_end())
        .await?
        .ok_or_else(|| CoreError::not_found("Next sprint", &sprint.slug))
}

/// Return the existing successor of `sprint`, or create one at `candidate`
/// inheriting duration and break.
///
/// `candidate` is ignored when a successor already exists. Otherwise it is
/// required and, once truncated to whole seconds, must fall strictly after
/// `sprint` ends; a start exactly on the end would not be found again as a
/// successor.
pub async fn get_or_create_next_sprint(
    repo: &dyn Repository,
    sprint: &Sprint,
    candidate: Option<Timestamp>,
) -> Result<NextSprint, CoreError> {
    match find_next_sprint(repo, sprint).await {
        Ok(existing) => return Ok(NextSprint::Existing(existing)),
        Err(CoreError::NotFound { .. }) if !sprint.is_single_sprint() => {}
        Err(e) => return Err(e),
    }

    let time_start = candidate.ok_or_else(|| {
        CoreError::Validation("a start time is required to create the next sprint".into())
    })?;

    // Checked on the stored (whole-second) start, not the raw candidate.
    let new_sprint = NewSprint::new(
        sprint.project_id,
        time_start,
        sprint.duration,
        sprint.pomodoro_break,
    )?;
    if new_sprint.time_start <= sprint.time_end() {
        return Err(CoreError::Validation(format!(
            "next sprint must start after {} (got {})",
            sprint.time_end(),
            new_sprint.time_start
        )));
    }
    let created = repo.insert_sprint(&new_sprint).await?;
    tracing::info!(
        project_id = sprint.project_id,
        previous = %sprint.slug,
        sprint_slug = %created.slug,
        "Chained sprint created"
    );
    Ok(NextSprint::Created(created))
}
