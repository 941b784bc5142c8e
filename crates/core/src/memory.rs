//! In-process [`Repository`] holding everything in memory.
//!
//! Mirrors the constraints of the PostgreSQL schema (unique usernames,
//! per-owner project slugs, global sprint and invite slugs, cascading
//! deletes) so tests exercise the same conflict paths.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::CoreError;
use crate::milestone::{MilestoneWindow, SprintMetric};
use crate::project::{Project, ProjectDetails};
use crate::repository::{RepoResult, Repository};
use crate::sprint::{NewSprint, Sprint};
use crate::types::{DbId, Timestamp};
use crate::user::{NewUser, User};

#[derive(Debug)]
struct Invite {
    id: DbId,
    host_sprint_id: DbId,
    slug: String,
    comment: String,
}

#[derive(Debug, Default)]
struct State {
    last_id: DbId,
    users: Vec<User>,
    projects: Vec<Project>,
    sprints: Vec<Sprint>,
    invites: Vec<Invite>,
    /// `(host_sprint_id, guest_sprint_id)`
    guest_links: Vec<(DbId, DbId)>,
}

impl State {
    fn next_id(&mut self) -> DbId {
        self.last_id += 1;
        self.last_id
    }

    /// Attach the latest invite, as the database view does.
    fn hydrate(&self, sprint: &Sprint) -> Sprint {
        let mut sprint = sprint.clone();
        if let Some(invite) = self
            .invites
            .iter()
            .filter(|i| i.host_sprint_id == sprint.id)
            .max_by_key(|i| i.id)
        {
            sprint.invite_slug = Some(invite.slug.clone());
            sprint.invite_comment = Some(invite.comment.clone());
        }
        sprint
    }

    fn project_sprints(&self, project_id: DbId) -> impl Iterator<Item = &Sprint> {
        self.sprints.iter().filter(move |s| s.project_id == project_id)
    }

    fn insert_sprint(&mut self, new_sprint: &NewSprint) -> RepoResult<Sprint> {
        if self.sprints.iter().any(|s| s.slug == new_sprint.slug) {
            return Err(CoreError::Conflict(format!(
                "sprint slug {} already exists",
                new_sprint.slug
            )));
        }
        if !self.projects.iter().any(|p| p.id == new_sprint.project_id) {
            return Err(CoreError::Storage(format!(
                "project {} does not exist",
                new_sprint.project_id
            )));
        }
        let sprint = Sprint {
            id: self.next_id(),
            slug: new_sprint.slug.clone(),
            project_id: new_sprint.project_id,
            time_start: new_sprint.time_start,
            duration: new_sprint.duration,
            word_count: 0,
            pomodoro_break: new_sprint.pomodoro_break,
            is_milestone: false,
            comment: String::new(),
            invite_slug: None,
            invite_comment: None,
        };
        self.sprints.push(sprint.clone());
        Ok(sprint)
    }

    fn remove_sprints(&mut self, doomed: impl Fn(&Sprint) -> bool) -> usize {
        let ids: Vec<DbId> = self
            .sprints
            .iter()
            .filter(|s| doomed(s))
            .map(|s| s.id)
            .collect();
        self.sprints.retain(|s| !ids.contains(&s.id));
        self.invites.retain(|i| !ids.contains(&i.host_sprint_id));
        self.guest_links
            .retain(|(host, guest)| !ids.contains(host) && !ids.contains(guest));
        ids.len()
    }
}

/// Thread-safe, process-local repository.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    state: Mutex<State>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn health_check(&self) -> RepoResult<()> {
        Ok(())
    }

    async fn user_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let state = self.state.lock().await;
        Ok(state.users.iter().find(|u| u.username == username).cloned())
    }

    async fn insert_user(&self, user: &NewUser) -> RepoResult<User> {
        let mut state = self.state.lock().await;
        if state.users.iter().any(|u| u.username == user.username) {
            return Err(CoreError::Conflict(format!(
                "username {} is taken",
                user.username
            )));
        }
        let user = User {
            id: state.next_id(),
            username: user.username.clone(),
            password_hash: user.password_hash.clone(),
            scopes: user.scopes.clone(),
        };
        state.users.push(user.clone());
        Ok(user)
    }

    async fn projects_by_owner(&self, user_id: DbId) -> RepoResult<Vec<Project>> {
        let state = self.state.lock().await;
        let mut projects: Vec<Project> = state
            .projects
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        projects.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(projects)
    }

    async fn project_by_id(&self, id: DbId) -> RepoResult<Option<Project>> {
        let state = self.state.lock().await;
        Ok(state.projects.iter().find(|p| p.id == id).cloned())
    }

    async fn project_by_slug(&self, user_id: DbId, slug: &str) -> RepoResult<Option<Project>> {
        let state = self.state.lock().await;
        Ok(state
            .projects
            .iter()
            .find(|p| p.user_id == user_id && p.slug == slug)
            .cloned())
    }

    async fn insert_project(
        &self,
        user_id: DbId,
        details: &ProjectDetails,
    ) -> RepoResult<Project> {
        let mut state = self.state.lock().await;
        if state
            .projects
            .iter()
            .any(|p| p.user_id == user_id && p.slug == details.slug)
        {
            return Err(CoreError::Conflict(format!(
                "project slug {} already exists",
                details.slug
            )));
        }
        let project = Project {
            id: state.next_id(),
            user_id,
            name: details.name.clone(),
            slug: details.slug.clone(),
            date_start: details.date_start,
            date_end: details.date_end,
            word_count_start: details.word_count_start,
            word_count_goal: details.word_count_goal,
        };
        state.projects.push(project.clone());
        Ok(project)
    }

    async fn update_project(
        &self,
        id: DbId,
        details: &ProjectDetails,
    ) -> RepoResult<Option<Project>> {
        let mut state = self.state.lock().await;
        let Some(project) = state.projects.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        project.name = details.name.clone();
        project.date_start = details.date_start;
        project.date_end = details.date_end;
        project.word_count_start = details.word_count_start;
        project.word_count_goal = details.word_count_goal;
        Ok(Some(project.clone()))
    }

    async fn delete_project(&self, id: DbId) -> RepoResult<bool> {
        let mut state = self.state.lock().await;
        let before = state.projects.len();
        state.projects.retain(|p| p.id != id);
        if state.projects.len() == before {
            return Ok(false);
        }
        state.remove_sprints(|s| s.project_id == id);
        Ok(true)
    }

    async fn sprints_by_project(&self, project_id: DbId) -> RepoResult<Vec<Sprint>> {
        let state = self.state.lock().await;
        let mut sprints: Vec<Sprint> = state
            .project_sprints(project_id)
            .map(|s| state.hydrate(s))
            .collect();
        sprints.sort_by_key(|s| s.time_start);
        Ok(sprints)
    }

    async fn sprint_by_id(&self, id: DbId) -> RepoResult<Option<Sprint>> {
        let state = self.state.lock().await;
        Ok(state
            .sprints
            .iter()
            .find(|s| s.id == id)
            .map(|s| state.hydrate(s)))
    }

    async fn sprint_by_slug(&self, slug: &str) -> RepoResult<Option<Sprint>> {
        let state = self.state.lock().await;
        Ok(state
            .sprints
            .iter()
            .find(|s| s.slug == slug)
            .map(|s| state.hydrate(s)))
    }

    async fn sprint_by_invite_slug(&self, invite_slug: &str) -> RepoResult<Option<Sprint>> {
        let state = self.state.lock().await;
        let Some(invite) = state.invites.iter().find(|i| i.slug == invite_slug) else {
            return Ok(None);
        };
        Ok(state
            .sprints
            .iter()
            .find(|s| s.id == invite.host_sprint_id)
            .map(|s| state.hydrate(s)))
    }

    async fn insert_sprint(&self, sprint: &NewSprint) -> RepoResult<Sprint> {
        let mut state = self.state.lock().await;
        state.insert_sprint(sprint)
    }

    async fn update_sprint(&self, sprint: &Sprint) -> RepoResult<bool> {
        let mut state = self.state.lock().await;
        let Some(stored) = state.sprints.iter_mut().find(|s| s.id == sprint.id) else {
            return Ok(false);
        };
        stored.word_count = sprint.word_count;
        stored.is_milestone = sprint.is_milestone;
        stored.comment = sprint.comment.clone();
        Ok(true)
    }

    async fn delete_sprint(&self, id: DbId) -> RepoResult<bool> {
        let mut state = self.state.lock().await;
        Ok(state.remove_sprints(|s| s.id == id) > 0)
    }

    async fn first_sprint_after(
        &self,
        project_id: DbId,
        after: Timestamp,
    ) -> RepoResult<Option<Sprint>> {
        let state = self.state.lock().await;
        Ok(state
            .project_sprints(project_id)
            .filter(|s| s.time_start > after)
            .min_by_key(|s| s.time_start)
            .map(|s| state.hydrate(s)))
    }

    async fn first_sprint_start(&self, project_id: DbId) -> RepoResult<Option<Timestamp>> {
        let state = self.state.lock().await;
        Ok(state.project_sprints(project_id).map(|s| s.time_start).min())
    }

    async fn latest_milestone_before(
        &self,
        project_id: DbId,
        before: Timestamp,
    ) -> RepoResult<Option<Sprint>> {
        let state = self.state.lock().await;
        Ok(state
            .project_sprints(project_id)
            .filter(|s| s.is_milestone && s.time_start < before)
            .max_by_key(|s| s.time_start)
            .map(|s| state.hydrate(s)))
    }

    async fn count_milestones(&self, project_id: DbId, up_to: Timestamp) -> RepoResult<i64> {
        let state = self.state.lock().await;
        let count = state
            .project_sprints(project_id)
            .filter(|s| s.is_milestone && s.time_start <= up_to)
            .count();
        Ok(count as i64)
    }

    async fn sum_in_window(
        &self,
        project_id: DbId,
        window: &MilestoneWindow,
        metric: SprintMetric,
    ) -> RepoResult<i64> {
        let state = self.state.lock().await;
        Ok(state
            .project_sprints(project_id)
            .filter(|s| window.contains(s.time_start))
            .map(|s| match metric {
                SprintMetric::WordCount => i64::from(s.word_count),
                SprintMetric::Duration => i64::from(s.duration),
            })
            .sum())
    }

    async fn insert_invite(
        &self,
        host_sprint_id: DbId,
        invite_slug: &str,
        comment: &str,
    ) -> RepoResult<()> {
        let mut state = self.state.lock().await;
        if state.invites.iter().any(|i| i.slug == invite_slug) {
            return Err(CoreError::Conflict(format!(
                "invite slug {invite_slug} already exists"
            )));
        }
        if !state.sprints.iter().any(|s| s.id == host_sprint_id) {
            return Err(CoreError::Storage(format!(
                "sprint {host_sprint_id} does not exist"
            )));
        }
        let id = state.next_id();
        state.invites.push(Invite {
            id,
            host_sprint_id,
            slug: invite_slug.to_string(),
            comment: comment.to_string(),
        });
        Ok(())
    }

    async fn insert_guest_sprint(
        &self,
        host_sprint_id: DbId,
        sprint: &NewSprint,
    ) -> RepoResult<Sprint> {
        let mut state = self.state.lock().await;
        if !state.sprints.iter().any(|s| s.id == host_sprint_id) {
            return Err(CoreError::Storage(format!(
                "sprint {host_sprint_id} does not exist"
            )));
        }
        let guest = state.insert_sprint(sprint)?;
        state.guest_links.push((host_sprint_id, guest.id));
        Ok(guest)
    }

    async fn guest_sprints(&self, host_sprint_id: DbId) -> RepoResult<Vec<Sprint>> {
        let state = self.state.lock().await;
        Ok(state
            .guest_links
            .iter()
            .filter(|(host, _)| *host == host_sprint_id)
            .filter_map(|(_, guest)| state.sprints.iter().find(|s| s.id == *guest))
            .map(|s| state.hydrate(s))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::parse_date;
    use crate::sprint::tests::at;
    use assert_matches::assert_matches;

    fn details(slug: &str) -> ProjectDetails {
        ProjectDetails {
            name: slug.to_uppercase(),
            slug: slug.into(),
            date_start: parse_date("2025-01-01").unwrap(),
            date_end: parse_date("2025-12-31").unwrap(),
            word_count_start: 0,
            word_count_goal: 1_000,
        }
    }

    #[tokio::test]
    async fn test_project_slug_unique_per_owner() {
        let repo = MemoryRepository::new();
        let ada = repo.insert_user(&NewUser::new("ada", "h")).await.unwrap();
        let bob = repo.insert_user(&NewUser::new("bob", "h")).await.unwrap();

        repo.insert_project(ada.id, &details("proj1")).await.unwrap();
        repo.insert_project(bob.id, &details("proj1")).await.unwrap();
        assert_matches!(
            repo.insert_project(ada.id, &details("proj1")).await,
            Err(CoreError::Conflict(_))
        );
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let repo = MemoryRepository::new();
        repo.insert_user(&NewUser::new("ada", "h")).await.unwrap();
        assert_matches!(
            repo.insert_user(&NewUser::new("ada", "h2")).await,
            Err(CoreError::Conflict(_))
        );
    }

    #[tokio::test]
    async fn test_delete_project_cascades() {
        let repo = MemoryRepository::new();
        let ada = repo.insert_user(&NewUser::new("ada", "h")).await.unwrap();
        let project = repo.insert_project(ada.id, &details("proj1")).await.unwrap();
        let sprint = repo
            .insert_sprint(&NewSprint::new(project.id, at(9, 0), 25, 5).unwrap())
            .await
            .unwrap();
        repo.insert_invite(sprint.id, "inv", "").await.unwrap();

        assert!(repo.delete_project(project.id).await.unwrap());
        assert!(repo.sprint_by_slug(&sprint.slug).await.unwrap().is_none());
        assert!(repo.sprint_by_invite_slug("inv").await.unwrap().is_none());
        assert!(!repo.delete_project(project.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_sprints_listed_by_start_time() {
        let repo = MemoryRepository::new();
        let ada = repo.insert_user(&NewUser::new("ada", "h")).await.unwrap();
        let project = repo.insert_project(ada.id, &details("proj1")).await.unwrap();
        for (h, m) in [(11, 0), (9, 0), (10, 0)] {
            repo.insert_sprint(&NewSprint::new(project.id, at(h, m), 25, 0).unwrap())
                .await
                .unwrap();
        }
        let starts: Vec<_> = repo
            .sprints_by_project(project.id)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.time_start)
            .collect();
        assert_eq!(starts, vec![at(9, 0), at(10, 0), at(11, 0)]);
    }

    #[tokio::test]
    async fn test_empty_window_sums_to_zero() {
        let repo = MemoryRepository::new();
        let window = MilestoneWindow {
            after: None,
            up_to: at(9, 0),
        };
        assert_eq!(
            repo.sum_in_window(42, &window, SprintMetric::WordCount)
                .await
                .unwrap(),
            0
        );
    }
}
