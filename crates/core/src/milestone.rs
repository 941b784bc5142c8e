//! Progress accounting between milestones.
//!
//! Every query is windowed on start time: the window opens just after the
//! previous milestone sprint (excluded) and closes on the queried sprint
//! (included). Without a previous milestone it opens at project genesis.

use chrono::Duration;
use serde::Serialize;

use crate::error::CoreError;
use crate::repository::Repository;
use crate::sprint::Sprint;
use crate::types::{DbId, Timestamp};

/// Column summed over a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SprintMetric {
    WordCount,
    Duration,
}

/// `after < time_start <= up_to`, with no lower bound when `after` is `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MilestoneWindow {
    pub after: Option<Timestamp>,
    pub up_to: Timestamp,
}

impl MilestoneWindow {
    pub fn contains(&self, time_start: Timestamp) -> bool {
        time_start <= self.up_to && self.after.map_or(true, |after| time_start > after)
    }
}

/// Result of looking back for the latest milestone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviousMilestone {
    Milestone(Sprint),
    /// No earlier milestone: accounting starts with the project's first sprint.
    Genesis { time_start: Option<Timestamp> },
}

impl PreviousMilestone {
    pub fn time_start(&self) -> Option<Timestamp> {
        match self {
            PreviousMilestone::Milestone(s) => Some(s.time_start),
            PreviousMilestone::Genesis { time_start } => *time_start,
        }
    }

    /// Window closing on `sprint`. Genesis leaves it open-ended so the first
    /// sprint of the project is counted.
    pub fn window_for(&self, sprint: &Sprint) -> MilestoneWindow {
        let after = match self {
            PreviousMilestone::Milestone(s) => Some(s.time_start),
            PreviousMilestone::Genesis { .. } => None,
        };
        MilestoneWindow {
            after,
            up_to: sprint.time_start,
        }
    }
}

/// Milestone figures for one sprint, as shown next to it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneSummary {
    pub index: i64,
    /// Slug of the previous milestone sprint, `null` at genesis.
    pub previous_milestone: Option<String>,
    /// Start of the previous milestone sprint, or of the first sprint.
    pub since: Option<Timestamp>,
    pub word_count: i64,
    /// Minutes.
    pub time_spent: i64,
}

pub async fn previous_milestone(
    repo: &dyn Repository,
    sprint: &Sprint,
) -> Result<PreviousMilestone, CoreError> {
    match repo
        .latest_milestone_before(sprint.project_id, sprint.time_start)
        .await?
    {
        Some(milestone) => Ok(PreviousMilestone::Milestone(milestone)),
        None => Ok(PreviousMilestone::Genesis {
            time_start: repo.first_sprint_start(sprint.project_id).await?,
        }),
    }
}

/// Milestones up to and including `sprint`; counts `sprint` if it is flagged.
pub async fn milestone_index(repo: &dyn Repository, sprint: &Sprint) -> Result<i64, CoreError> {
    repo.count_milestones(sprint.project_id, sprint.time_start).await
}

/// Words written since the previous milestone, including `sprint`.
pub async fn milestone_word_count(
    repo: &dyn Repository,
    sprint: &Sprint,
) -> Result<i64, CoreError> {
    let previous = previous_milestone(repo, sprint).await?;
    sum(repo, sprint.project_id, &previous.window_for(sprint), SprintMetric::WordCount).await
}

/// Writing time since the previous milestone, including `sprint`.
pub async fn milestone_time_spent(
    repo: &dyn Repository,
    sprint: &Sprint,
) -> Result<Duration, CoreError> {
    let previous = previous_milestone(repo, sprint).await?;
    let minutes =
        sum(repo, sprint.project_id, &previous.window_for(sprint), SprintMetric::Duration).await?;
    Ok(Duration::minutes(minutes))
}

/// All milestone figures, resolving the previous milestone only once.
pub async fn milestone_summary(
    repo: &dyn Repository,
    sprint: &Sprint,
) -> Result<MilestoneSummary, CoreError> {
    let previous = previous_milestone(repo, sprint).await?;
    let window = previous.window_for(sprint);

    let index = milestone_index(repo, sprint).await?;
    let word_count = sum(repo, sprint.project_id, &window, SprintMetric::WordCount).await?;
    let time_spent = sum(repo, sprint.project_id, &window, SprintMetric::Duration).await?;

    let previous_slug = match &previous {
        PreviousMilestone::Milestone(s) => Some(s.slug.clone()),
        PreviousMilestone::Genesis { .. } => None,
    };

    Ok(MilestoneSummary {
        index,
        previous_milestone: previous_slug,
        since: previous.time_start(),
        word_count,
        time_spent,
    })
}

async fn sum(
    repo: &dyn Repository,
    project_id: DbId,
    window: &MilestoneWindow,
    metric: SprintMetric,
) -> Result<i64, CoreError> {
    let total = repo.sum_in_window(project_id, window, metric).await?;
    tracing::debug!(project_id, ?metric, ?window, total, "Milestone window summed");
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryRepository;
    use crate::project::{parse_date, Project, ProjectDetails};
    use crate::sprint::tests::at;
    use crate::sprint::{NewSprint, SprintUpdate};
    use crate::user::NewUser;

    async fn project(repo: &MemoryRepository) -> Project {
        let user = repo
            .insert_user(&NewUser::new("ada", "hash"))
            .await
            .unwrap();
        repo.insert_project(
            user.id,
            &ProjectDetails {
                name: "Novel".into(),
                slug: "proj1".into(),
                date_start: parse_date("2025-01-01").unwrap(),
                date_end: parse_date("2025-12-31").unwrap(),
                word_count_start: 0,
                word_count_goal: 50_000,
            },
        )
        .await
        .unwrap()
    }

    /// Insert a 25-minute sprint at `h:m` with the given words and flag.
    async fn add(
        repo: &MemoryRepository,
        project: &Project,
        (h, m): (u32, u32),
        words: i32,
        milestone: bool,
    ) -> Sprint {
        let mut sprint = repo
            .insert_sprint(&NewSprint::new(project.id, at(h, m), 25, 5).unwrap())
            .await
            .unwrap();
        sprint.apply(SprintUpdate {
            word_count: words,
            is_milestone: milestone,
            comment: String::new(),
        });
        repo.update_sprint(&sprint).await.unwrap();
        sprint
    }

    #[test]
    fn test_window_bounds() {
        let window = MilestoneWindow {
            after: Some(at(9, 0)),
            up_to: at(10, 0),
        };
        assert!(!window.contains(at(9, 0)));
        assert!(window.contains(at(9, 1)));
        assert!(window.contains(at(10, 0)));
        assert!(!window.contains(at(10, 1)));

        let open = MilestoneWindow {
            after: None,
            up_to: at(10, 0),
        };
        assert!(open.contains(at(0, 0)));
    }

    #[tokio::test]
    async fn test_genesis_without_milestones() {
        let repo = MemoryRepository::new();
        let p = project(&repo).await;
        add(&repo, &p, (8, 0), 100, false).await;
        let s = add(&repo, &p, (9, 0), 200, false).await;

        let previous = previous_milestone(&repo, &s).await.unwrap();
        assert_eq!(
            previous,
            PreviousMilestone::Genesis {
                time_start: Some(at(8, 0))
            }
        );
        assert_eq!(milestone_word_count(&repo, &s).await.unwrap(), 300);
        assert_eq!(
            milestone_time_spent(&repo, &s).await.unwrap(),
            Duration::minutes(50)
        );
    }

    #[tokio::test]
    async fn test_window_excludes_previous_milestone_and_includes_current() {
        let repo = MemoryRepository::new();
        let p = project(&repo).await;
        add(&repo, &p, (8, 0), 1_000, false).await;
        let m1 = add(&repo, &p, (9, 0), 500, true).await;
        add(&repo, &p, (10, 0), 300, false).await;
        let s = add(&repo, &p, (11, 0), 200, false).await;
        add(&repo, &p, (12, 0), 7_000, false).await;

        let previous = previous_milestone(&repo, &s).await.unwrap();
        assert_eq!(previous, PreviousMilestone::Milestone(m1));
        assert_eq!(milestone_word_count(&repo, &s).await.unwrap(), 500);
        assert_eq!(
            milestone_time_spent(&repo, &s).await.unwrap(),
            Duration::minutes(50)
        );
    }

    #[tokio::test]
    async fn test_flagged_sprint_does_not_close_its_own_window() {
        let repo = MemoryRepository::new();
        let p = project(&repo).await;
        add(&repo, &p, (8, 0), 100, true).await;
        add(&repo, &p, (9, 0), 40, false).await;
        let s = add(&repo, &p, (10, 0), 60, true).await;

        // The previous milestone is strictly earlier, so s counts itself.
        assert_eq!(milestone_word_count(&repo, &s).await.unwrap(), 100);
    }

    #[tokio::test]
    async fn test_milestone_index_counts_self_when_flagged() {
        let repo = MemoryRepository::new();
        let p = project(&repo).await;
        add(&repo, &p, (8, 0), 0, true).await;
        add(&repo, &p, (9, 0), 0, true).await;
        add(&repo, &p, (10, 0), 0, true).await;
        let mut s = add(&repo, &p, (11, 0), 0, false).await;
        add(&repo, &p, (12, 0), 0, true).await;

        assert_eq!(milestone_index(&repo, &s).await.unwrap(), 3);

        s.is_milestone = true;
        repo.update_sprint(&s).await.unwrap();
        assert_eq!(milestone_index(&repo, &s).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_summary_matches_individual_queries() {
        let repo = MemoryRepository::new();
        let p = project(&repo).await;
        let m1 = add(&repo, &p, (9, 0), 500, true).await;
        let s = add(&repo, &p, (10, 0), 250, false).await;

        let summary = milestone_summary(&repo, &s).await.unwrap();
        assert_eq!(summary.index, 1);
        assert_eq!(summary.previous_milestone, Some(m1.slug));
        assert_eq!(summary.since, Some(at(9, 0)));
        assert_eq!(summary.word_count, 250);
        assert_eq!(summary.time_spent, 25);
    }

    #[tokio::test]
    async fn test_other_projects_are_ignored() {
        let repo = MemoryRepository::new();
        let p = project(&repo).await;
        let other = repo
            .insert_project(
                p.user_id,
                &ProjectDetails {
                    name: "Essays".into(),
                    slug: "proj2".into(),
                    date_start: p.date_start,
                    date_end: p.date_end,
                    word_count_start: 0,
                    word_count_goal: 10,
                },
            )
            .await
            .unwrap();
        add(&repo, &other, (8, 0), 9_999, true).await;
        let s = add(&repo, &p, (9, 0), 10, false).await;

        assert_eq!(milestone_index(&repo, &s).await.unwrap(), 0);
        assert_eq!(milestone_word_count(&repo, &s).await.unwrap(), 10);
    }
}
