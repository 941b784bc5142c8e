//! Sharing a sprint with writers from other projects.
//!
//! A host sprint hands out invite slugs. Joining through one copies the host
//! timing into a new, fully independent sprint on the guest's project and
//! records a host-to-guest link for later listing.

use crate::error::CoreError;
use crate::project::Project;
use crate::repository::Repository;
use crate::sprint::{NewSprint, Sprint};
use crate::types::Timestamp;

/// `<host slug>.<hex unix nanos of now>`.
pub fn invite_slug(host_slug: &str, now: Timestamp) -> Result<String, CoreError> {
    let nanos = now
        .timestamp_nanos_opt()
        .ok_or_else(|| CoreError::Internal(format!("clock value {now} is out of range")))?;
    Ok(format!("{host_slug}.{nanos:x}"))
}

/// Open `host` to guests and return the new invite slug.
///
/// Each call yields a distinct invite; earlier ones stay valid.
pub async fn open_to_guests(
    repo: &dyn Repository,
    host: &Sprint,
    comment: &str,
    now: Timestamp,
) -> Result<String, CoreError> {
    let slug = invite_slug(&host.slug, now)?;
    repo.insert_invite(host.id, &slug, comment).await?;
    tracing::info!(host_sprint = %host.slug, invite_slug = %slug, "Sprint opened to guests");
    Ok(slug)
}

/// Create a guest sprint on `guest_project` copying start, duration and
/// break from `host`.
///
/// Rejected with [`CoreError::Conflict`] once the host sprint is over, and
/// with [`CoreError::Validation`] when joining from the host's own project.
pub async fn new_guest_sprint(
    repo: &dyn Repository,
    guest_project: &Project,
    host: &Sprint,
    now: Timestamp,
) -> Result<Sprint, CoreError> {
    if host.over(now) {
        return Err(CoreError::Conflict(format!(
            "sprint {} is over and can no longer be joined",
            host.slug
        )));
    }
    if guest_project.id == host.project_id {
        return Err(CoreError::Validation(format!(
            "sprint {} already belongs to project {}",
            host.slug, guest_project.slug
        )));
    }

    let new_sprint = NewSprint::new(
        guest_project.id,
        host.time_start,
        host.duration,
        host.pomodoro_break,
    )?;
    let guest = repo.insert_guest_sprint(host.id, &new_sprint).await?;
    tracing::info!(
        host_sprint = %host.slug,
        guest_sprint = %guest.slug,
        guest_project_id = guest_project.id,
        "Guest sprint created"
    );
    Ok(guest)
}

/// Sprints created by guests joining `host`.
pub async fn guest_sprints(repo: &dyn Repository, host: &Sprint) -> Result<Vec<Sprint>, CoreError> {
    repo.guest_sprints(host.id).await
}
