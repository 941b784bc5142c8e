//! Sprint entity, its time-derived state, and creation rules.
//!
//! A sprint never stores its state: [`SprintState`] is recomputed from the
//! start time, the duration and the caller-supplied `now` on every read.

use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// Shortest allowed sprint, in minutes.
pub const MIN_DURATION_MINS: i32 = 1;

/// Accepted legacy format for sprint start times, e.g. `2025-01-01T09:00:00+0100`.
const LEGACY_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

/// A timed writing session on a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Sprint {
    pub id: DbId,
    /// Globally unique, derived from the project id and the start time.
    pub slug: String,
    pub project_id: DbId,
    pub time_start: Timestamp,
    /// Minutes, always `>= 1`.
    pub duration: i32,
    pub word_count: i32,
    /// Trailing break in minutes. Zero marks the end of a chain.
    #[serde(rename = "break")]
    pub pomodoro_break: i32,
    pub is_milestone: bool,
    pub comment: String,
    /// Latest invite slug, present only once the sprint is open to guests.
    pub invite_slug: Option<String>,
    pub invite_comment: Option<String>,
}

/// Where a sprint stands relative to a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SprintState {
    Upcoming,
    Running,
    Over,
}

impl Sprint {
    /// `time_start + duration`.
    pub fn time_end(&self) -> Timestamp {
        self.time_start + Duration::minutes(i64::from(self.duration))
    }

    /// Start of the following sprint in the chain: `time_end + break`.
    pub fn next_start(&self) -> Timestamp {
        self.time_end() + Duration::minutes(i64::from(self.pomodoro_break))
    }

    /// State of the sprint over the half-open interval `[time_start, time_end)`.
    pub fn state_at(&self, now: Timestamp) -> SprintState {
        if now < self.time_start {
            SprintState::Upcoming
        } else if now < self.time_end() {
            SprintState::Running
        } else {
            SprintState::Over
        }
    }

    pub fn upcoming(&self, now: Timestamp) -> bool {
        self.state_at(now) == SprintState::Upcoming
    }

    pub fn running(&self, now: Timestamp) -> bool {
        self.state_at(now) == SprintState::Running
    }

    pub fn over(&self, now: Timestamp) -> bool {
        self.state_at(now) == SprintState::Over
    }

    /// A sprint without a trailing break is not part of a pomodoro streak.
    pub fn is_single_sprint(&self) -> bool {
        self.pomodoro_break == 0
    }

    pub fn is_open_to_guests(&self) -> bool {
        self.invite_slug.as_deref().is_some_and(|s| !s.is_empty())
    }

    /// Apply the mutable part of a sprint. Start, duration, break and slug are fixed.
    pub fn apply(&mut self, update: SprintUpdate) {
        self.word_count = update.word_count;
        self.is_milestone = update.is_milestone;
        self.comment = update.comment;
    }
}

/// A validated sprint ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSprint {
    pub slug: String,
    pub project_id: DbId,
    pub time_start: Timestamp,
    pub duration: i32,
    pub pomodoro_break: i32,
}

impl NewSprint {
    /// Validate durations, normalise the start time and derive the slug.
    ///
    /// Start times are kept at whole-second precision so the slug always
    /// matches what the database stores.
    pub fn new(
        project_id: DbId,
        time_start: Timestamp,
        duration: i32,
        pomodoro_break: i32,
    ) -> Result<Self, CoreError> {
        if duration < MIN_DURATION_MINS {
            return Err(CoreError::Validation(format!(
                "duration must be at least {MIN_DURATION_MINS} minute, got {duration}"
            )));
        }
        if pomodoro_break < 0 {
            return Err(CoreError::Validation(format!(
                "break must not be negative, got {pomodoro_break}"
            )));
        }

        let time_start = time_start.trunc_subsecs(0);
        Ok(Self {
            slug: sprint_slug(project_id, time_start)?,
            project_id,
            time_start,
            duration,
            pomodoro_break,
        })
    }
}

/// Mutable fields of a sprint, as sent by the owner after writing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintUpdate {
    pub word_count: i32,
    pub is_milestone: bool,
    #[serde(default)]
    pub comment: String,
}

/// Hex-encoded `<project id>.<start unix nanos>`.
///
/// Two sprints of the same project starting on the same second share a slug;
/// the persistence layer rejects the second one as a conflict.
pub fn sprint_slug(project_id: DbId, time_start: Timestamp) -> Result<String, CoreError> {
    let nanos = time_start
        .timestamp_nanos_opt()
        .ok_or_else(|| CoreError::Validation(format!("time start {time_start} is out of range")))?;
    Ok(format!("{project_id:x}.{nanos:x}"))
}

/// Parse a sprint start time given as RFC 3339 or `YYYY-MM-DDTHH:MM:SS±HHMM`.
pub fn parse_time_start(raw: &str) -> Result<Timestamp, CoreError> {
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, LEGACY_TIME_FORMAT))
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| CoreError::Validation(format!("invalid time start '{raw}': {e}")))
}
