//! Writing projects and the by-day projection of their sprints.

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::CoreError;
use crate::sprint::Sprint;
use crate::types::{Date, DbId, Timestamp};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A user-owned writing project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: DbId,
    pub user_id: DbId,
    pub name: String,
    /// Unique per owner, not globally.
    pub slug: String,
    pub date_start: Date,
    pub date_end: Date,
    pub word_count_start: i32,
    pub word_count_goal: i32,
}

/// Project together with its sprints, ordered by start time.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectWithSprints {
    #[serde(flatten)]
    pub project: Project,
    pub sprints: Vec<Sprint>,
}

/// Editable project fields, validated as a whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDetails {
    pub name: String,
    pub slug: String,
    pub date_start: Date,
    pub date_end: Date,
    pub word_count_start: i32,
    pub word_count_goal: i32,
}

impl ProjectDetails {
    /// Check the project invariants: non-empty name and slug, ordered dates,
    /// and a goal that is not below the starting word count.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.name.trim().is_empty() {
            return Err(CoreError::Validation("project name must not be empty".into()));
        }
        if self.slug.trim().is_empty() {
            return Err(CoreError::Validation("project slug must not be empty".into()));
        }
        if self.slug.contains('/') {
            return Err(CoreError::Validation(format!(
                "project slug '{}' must not contain '/'",
                self.slug
            )));
        }
        if self.date_end < self.date_start {
            return Err(CoreError::Validation(format!(
                "end date {} is before start date {}",
                self.date_end, self.date_start
            )));
        }
        if self.word_count_start < 0 {
            return Err(CoreError::Validation(
                "starting word count must not be negative".into(),
            ));
        }
        if self.word_count_goal < self.word_count_start {
            return Err(CoreError::Validation(format!(
                "word count goal {} is below starting word count {}",
                self.word_count_goal, self.word_count_start
            )));
        }
        Ok(())
    }
}

/// Sprints sharing a UTC calendar day.
#[derive(Debug, Clone, Serialize)]
pub struct DateSprints {
    /// Midnight UTC of the shared day.
    pub date: Timestamp,
    pub sprints: Vec<Sprint>,
}

/// Group sprints by UTC day, keeping days in order of first appearance and
/// sprints in their input order within each day.
pub fn group_by_date(sprints: &[Sprint]) -> Vec<DateSprints> {
    let mut groups: Vec<DateSprints> = Vec::new();
    for sprint in sprints {
        let date = midnight(sprint.time_start);
        match groups.iter_mut().find(|g| g.date == date) {
            Some(group) => group.sprints.push(sprint.clone()),
            None => groups.push(DateSprints {
                date,
                sprints: vec![sprint.clone()],
            }),
        }
    }
    groups
}

fn midnight(t: Timestamp) -> Timestamp {
    t.date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .unwrap_or(t)
}

/// Parse a `YYYY-MM-DD` project date.
pub fn parse_date(raw: &str) -> Result<Date, CoreError> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|e| CoreError::Validation(format!("invalid date '{raw}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sprint::tests::{at, sprint};
    use assert_matches::assert_matches;
    use chrono::{Duration, TimeZone, Utc};

    fn details() -> ProjectDetails {
        ProjectDetails {
            name: "Novel".into(),
            slug: "proj1".into(),
            date_start: parse_date("2025-01-01").unwrap(),
            date_end: parse_date("2025-12-31").unwrap(),
            word_count_start: 0,
            word_count_goal: 50_000,
        }
    }

    #[test]
    fn test_valid_project() {
        assert!(details().validate().is_ok());
    }

    #[test]
    fn test_same_day_project_is_valid() {
        let mut d = details();
        d.date_end = d.date_start;
        d.word_count_goal = d.word_count_start;
        assert!(d.validate().is_ok());
    }

    #[test]
    fn test_invalid_projects() {
        let mut d = details();
        d.date_end = parse_date("2024-12-31").unwrap();
        assert_matches!(d.validate(), Err(CoreError::Validation(_)));

        let mut d = details();
        d.word_count_goal = -1;
        assert_matches!(d.validate(), Err(CoreError::Validation(_)));

        let mut d = details();
        d.word_count_start = -5;
        d.word_count_goal = 10;
        assert_matches!(d.validate(), Err(CoreError::Validation(_)));

        let mut d = details();
        d.slug = " ".into();
        assert_matches!(d.validate(), Err(CoreError::Validation(_)));

        let mut d = details();
        d.name = String::new();
        assert_matches!(d.validate(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2025-12-31").unwrap(),
            NaiveDate::from_ymd_opt(2025, 12, 31).unwrap()
        );
        assert_matches!(parse_date("31/12/2025"), Err(CoreError::Validation(_)));
    }

    #[test]
    fn test_group_by_date() {
        let next_day = Utc.with_ymd_and_hms(2025, 1, 2, 23, 59, 0).unwrap();
        let sprints = vec![
            sprint(at(9, 0), 25, 5),
            sprint(at(9, 30), 25, 0),
            sprint(next_day, 10, 0),
        ];

        let groups = group_by_date(&sprints);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].date, at(0, 0));
        assert_eq!(groups[0].sprints.len(), 2);
        assert_eq!(groups[1].date, at(0, 0) + Duration::days(1));
        assert_eq!(groups[1].sprints[0].time_start, next_day);
    }

    #[test]
    fn test_group_by_date_empty() {
        assert!(group_by_date(&[]).is_empty());
    }

    #[test]
    fn test_project_with_sprints_serializes_flat() {
        let project = Project {
            id: 3,
            user_id: 7,
            name: "Novel".into(),
            slug: "proj1".into(),
            date_start: parse_date("2025-01-01").unwrap(),
            date_end: parse_date("2025-12-31").unwrap(),
            word_count_start: 0,
            word_count_goal: 50_000,
        };
        let json = serde_json::to_value(ProjectWithSprints {
            project,
            sprints: vec![],
        })
        .unwrap();
        assert_eq!(json["userId"], 7);
        assert_eq!(json["dateStart"], "2025-01-01");
        assert_eq!(json["wordCountGoal"], 50_000);
        assert!(json["sprints"].as_array().unwrap().is_empty());
    }
}
