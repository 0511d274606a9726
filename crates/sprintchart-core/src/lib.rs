//! # sprintchart-core
//!
//! Core domain model and traits for the sprintchart chart engine.
//!
//! This crate provides:
//! - Domain types: `Sprint`, `Task`, `User`, `OffDay`, `Worklog`, `Conflict`
//! - Working-time arithmetic: `Duration` and the office-hour constants
//! - The `Renderer` trait and `RenderError`
//!
//! Everything here is read-only input for the chart renderers. Nothing in
//! the render pipeline mutates a `Sprint`.
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use sprintchart_core::{Duration, Sprint, Task, User};
//!
//! let monday = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
//! let friday = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
//!
//! let mut sprint = Sprint::new(1, "Sprint 1");
//! sprint.users.push(User::new(7, "alice").login("alice.b"));
//! sprint.tasks.push(
//!     Task::new(1)
//!         .name("Design")
//!         .span(monday.and_hms_opt(8, 0, 0).unwrap(), friday.and_hms_opt(16, 30, 0).unwrap())
//!         .estimate(Duration::work_days(5))
//!         .assign(7),
//! );
//! assert_eq!(sprint.estimated_work(), Duration::work_days(5));
//! ```

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// ============================================================================
// Type Aliases
// ============================================================================

/// Stable numeric identifier of a task
pub type TaskId = u64;

/// Stable numeric identifier of a user (resource)
pub type UserId = u64;

// ============================================================================
// Working Time
// ============================================================================

/// Length of one working day: 08:00 to 16:30 minus one hour lunch (7.5 h)
pub const SECONDS_PER_WORK_DAY: i64 = 75 * 6 * 60;

/// Five working days
pub const SECONDS_PER_WORK_WEEK: i64 = 5 * SECONDS_PER_WORK_DAY;

/// Twenty working days
pub const SECONDS_PER_WORK_MONTH: i64 = 20 * SECONDS_PER_WORK_DAY;

/// Office hours, as seconds after midnight
pub const WORK_DAY_START_SECS: i64 = 8 * 3600;
pub const LUNCH_START_SECS: i64 = 12 * 3600;
pub const LUNCH_END_SECS: i64 = 13 * 3600;
pub const WORK_DAY_END_SECS: i64 = 16 * 3600 + 30 * 60;

/// Seconds after midnight of a timestamp
pub fn seconds_of_day(instant: NaiveDateTime) -> i64 {
    i64::from(instant.time().num_seconds_from_midnight())
}

/// Working time, exact to the second
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Duration {
    /// Number of seconds
    pub seconds: i64,
}

impl Duration {
    pub const fn zero() -> Self {
        Self { seconds: 0 }
    }

    pub const fn seconds(s: i64) -> Self {
        Self { seconds: s }
    }

    pub const fn minutes(m: i64) -> Self {
        Self { seconds: m * 60 }
    }

    pub const fn hours(h: i64) -> Self {
        Self { seconds: h * 3600 }
    }

    pub const fn work_days(d: i64) -> Self {
        Self {
            seconds: d * SECONDS_PER_WORK_DAY,
        }
    }

    pub const fn work_weeks(w: i64) -> Self {
        Self {
            seconds: w * SECONDS_PER_WORK_WEEK,
        }
    }

    pub const fn work_months(m: i64) -> Self {
        Self {
            seconds: m * SECONDS_PER_WORK_MONTH,
        }
    }

    /// Wall-clock distance between two instants
    pub fn between(start: NaiveDateTime, finish: NaiveDateTime) -> Self {
        Self {
            seconds: (finish - start).num_seconds(),
        }
    }

    pub const fn is_zero(&self) -> bool {
        self.seconds == 0
    }

    pub fn as_work_days(&self) -> f64 {
        self.seconds as f64 / SECONDS_PER_WORK_DAY as f64
    }

    /// Scale by a fraction, truncating toward zero
    pub fn scale(self, factor: f64) -> Self {
        Self {
            seconds: (self.seconds as f64 * factor) as i64,
        }
    }
}

impl std::ops::Add for Duration {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self {
            seconds: self.seconds + rhs.seconds,
        }
    }
}

impl std::ops::Sub for Duration {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self {
            seconds: self.seconds - rhs.seconds,
        }
    }
}

impl std::ops::AddAssign for Duration {
    fn add_assign(&mut self, rhs: Self) {
        self.seconds += rhs.seconds;
    }
}

impl std::ops::SubAssign for Duration {
    fn sub_assign(&mut self, rhs: Self) {
        self.seconds -= rhs.seconds;
    }
}

impl std::iter::Sum for Duration {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), |acc, d| acc + d)
    }
}

/// Formats as working days, hours and minutes, e.g. `2d 3h 30m`
impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.seconds == 0 {
            return write!(f, "0m");
        }
        if self.seconds < 0 {
            write!(f, "-")?;
        }
        let total = self.seconds.abs();
        let days = total / SECONDS_PER_WORK_DAY;
        let hours = (total % SECONDS_PER_WORK_DAY) / 3600;
        let minutes = (total % 3600) / 60;

        let mut parts = Vec::new();
        if days > 0 {
            parts.push(format!("{}d", days));
        }
        if hours > 0 {
            parts.push(format!("{}h", hours));
        }
        if minutes > 0 {
            parts.push(format!("{}m", minutes));
        }
        if parts.is_empty() {
            parts.push(format!("{}s", total));
        }
        write!(f, "{}", parts.join(" "))
    }
}

// ============================================================================
// Task
// ============================================================================

fn default_true() -> bool {
    true
}

/// How a task was placed on the calendar
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchedulingMode {
    /// Placed by the leveling engine
    #[default]
    Auto,
    /// Pinned by a user
    Manual,
}

/// Finish-to-start relation to a predecessor
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    pub predecessor: TaskId,
}

/// A leveled task: start, finish and the critical flag come from the scheduler
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier
    pub id: TaskId,
    /// Human-readable name
    pub name: String,
    /// Parent task in the outline
    #[serde(default)]
    pub parent: Option<TaskId>,
    /// Child tasks in the outline
    #[serde(default)]
    pub children: Vec<TaskId>,
    /// Scheduled start (None while unscheduled)
    #[serde(default)]
    pub start: Option<NaiveDateTime>,
    /// Scheduled finish (None while unscheduled)
    #[serde(default)]
    pub finish: Option<NaiveDateTime>,
    /// Working duration
    #[serde(default)]
    pub duration: Duration,
    /// Estimated effort when the sprint was planned
    #[serde(default)]
    pub original_estimate: Duration,
    /// On the critical path
    #[serde(default)]
    pub critical: bool,
    /// Explicit milestone flag
    #[serde(default)]
    pub milestone: bool,
    /// Assigned resource
    #[serde(default)]
    pub resource: Option<UserId>,
    #[serde(default)]
    pub predecessors: Vec<Relation>,
    #[serde(default)]
    pub scheduling: SchedulingMode,
    /// Completion in [0, 1]
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
    /// Invalid tasks (placeholders) are not rendered
    #[serde(default = "default_true")]
    pub valid: bool,
    /// Whether the effort counts toward the sprint cost (delivery buffers do not)
    #[serde(default = "default_true")]
    pub impact_on_cost: bool,
    /// Validation messages attached upstream
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl Task {
    /// Create a new task with the given ID
    pub fn new(id: TaskId) -> Self {
        Self {
            id,
            name: format!("Task {}", id),
            parent: None,
            children: Vec::new(),
            start: None,
            finish: None,
            duration: Duration::zero(),
            original_estimate: Duration::zero(),
            critical: false,
            milestone: false,
            resource: None,
            predecessors: Vec::new(),
            scheduling: SchedulingMode::Auto,
            progress: None,
            notes: None,
            valid: true,
            impact_on_cost: true,
            warnings: Vec::new(),
        }
    }

    /// Set the task name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set start and finish, deriving the wall-clock duration
    pub fn span(mut self, start: NaiveDateTime, finish: NaiveDateTime) -> Self {
        self.start = Some(start);
        self.finish = Some(finish);
        self.duration = Duration::between(start, finish);
        self
    }

    /// Set the working duration
    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Set the original estimate
    pub fn estimate(mut self, estimate: Duration) -> Self {
        self.original_estimate = estimate;
        self
    }

    /// Mark as critical
    pub fn critical(mut self) -> Self {
        self.critical = true;
        self
    }

    /// Mark as milestone (zero duration)
    pub fn milestone(mut self) -> Self {
        self.milestone = true;
        self.duration = Duration::zero();
        self
    }

    /// Assign a resource
    pub fn assign(mut self, user: UserId) -> Self {
        self.resource = Some(user);
        self
    }

    /// Add a finish-to-start predecessor
    pub fn depends_on(mut self, predecessor: TaskId) -> Self {
        self.predecessors.push(Relation { predecessor });
        self
    }

    /// Set the parent task
    pub fn parent(mut self, parent: TaskId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Add a child task
    pub fn child(mut self, child: TaskId) -> Self {
        self.children.push(child);
        self
    }

    /// Set completion (0.0 ..= 1.0)
    pub fn progress(mut self, progress: f64) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Mark as manually scheduled
    pub fn manual(mut self) -> Self {
        self.scheduling = SchedulingMode::Manual;
        self
    }

    /// Exclude from rendering
    pub fn invalid(mut self) -> Self {
        self.valid = false;
        self
    }

    /// Exclude from the cost baseline
    pub fn without_cost_impact(mut self) -> Self {
        self.impact_on_cost = false;
        self
    }

    /// Attach a validation warning
    pub fn warn(mut self, message: impl Into<String>) -> Self {
        self.warnings.push(message.into());
        self
    }

    /// Is this a leaf task (no children)?
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Is this a summary task (has children)?
    pub fn is_story(&self) -> bool {
        !self.children.is_empty()
    }

    /// Zero working duration, or an explicit milestone
    pub fn is_zero_duration(&self) -> bool {
        self.milestone || self.duration.is_zero()
    }

    pub fn is_manual(&self) -> bool {
        self.scheduling == SchedulingMode::Manual
    }
}

// ============================================================================
// Users and Off Days
// ============================================================================

/// Category of absence
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OffDayType {
    Vacation,
    Sick,
    Trip,
    Holiday,
}

impl OffDayType {
    pub const ALL: [OffDayType; 4] = [
        OffDayType::Vacation,
        OffDayType::Sick,
        OffDayType::Trip,
        OffDayType::Holiday,
    ];

    /// Legend and tooltip text
    pub fn label(&self) -> &'static str {
        match self {
            OffDayType::Vacation => "Vacation",
            OffDayType::Sick => "Sick Leave",
            OffDayType::Trip => "Business Trip",
            OffDayType::Holiday => "Holiday",
        }
    }
}

/// An inclusive range of days a user is away
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffDay {
    pub kind: OffDayType,
    pub first_day: NaiveDate,
    pub last_day: NaiveDate,
}

impl OffDay {
    pub fn new(kind: OffDayType, first_day: NaiveDate, last_day: NaiveDate) -> Self {
        Self {
            kind,
            first_day,
            last_day,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.first_day <= date && date <= self.last_day
    }

    /// Every calendar day in the range, weekends included
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.first_day
            .iter_days()
            .take_while(move |day| *day <= self.last_day)
    }
}

/// A team member who can be assigned to tasks and author worklogs
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// Display name
    pub name: String,
    /// Additional identities this user logs work under
    #[serde(default)]
    pub logins: Vec<String>,
    /// Fraction of a working day available to the sprint
    #[serde(default = "default_availability")]
    pub availability: f64,
    #[serde(default)]
    pub off_days: Vec<OffDay>,
}

fn default_availability() -> f64 {
    1.0
}

impl User {
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            logins: Vec::new(),
            availability: 1.0,
            off_days: Vec::new(),
        }
    }

    /// Add a login alias
    pub fn login(mut self, login: impl Into<String>) -> Self {
        self.logins.push(login.into());
        self
    }

    pub fn availability(mut self, availability: f64) -> Self {
        self.availability = availability;
        self
    }

    /// Add an absence
    pub fn off_day(mut self, kind: OffDayType, first_day: NaiveDate, last_day: NaiveDate) -> Self {
        self.off_days.push(OffDay::new(kind, first_day, last_day));
        self
    }

    /// Name first, then logins
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.logins.iter().map(String::as_str))
    }

    /// The absence covering `date`, if any. The first matching record wins.
    pub fn off_day_on(&self, date: NaiveDate) -> Option<OffDayType> {
        self.off_days
            .iter()
            .find(|off| off.contains(date))
            .map(|off| off.kind)
    }
}

// ============================================================================
// Worklogs and Conflicts
// ============================================================================

/// Time booked by an author against a task
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Worklog {
    pub task: TaskId,
    pub author: UserId,
    pub start: NaiveDateTime,
    pub time_spent: Duration,
    #[serde(default)]
    pub comment: String,
}

/// Overlap detected by the leveling engine, shown as markers on the task bar
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
    pub task: TaskId,
    pub start: NaiveDateTime,
    pub finish: NaiveDateTime,
    /// Only original conflicts are drawn
    #[serde(default)]
    pub original_conflict: bool,
}

// ============================================================================
// Sprint
// ============================================================================

/// A leveled sprint: the unit one chart is rendered from
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Sprint {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub start: Option<NaiveDateTime>,
    #[serde(default)]
    pub end: Option<NaiveDateTime>,
    /// Estimated release date
    #[serde(default)]
    pub release: Option<NaiveDateTime>,
    #[serde(default)]
    pub closed: bool,
    /// Tasks in outline order
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub worklogs: Vec<Worklog>,
    #[serde(default)]
    pub conflicts: Vec<Conflict>,
}

impl Sprint {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn user(&self, id: UserId) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    /// Case-insensitive lookup by name or login
    pub fn user_by_identifier(&self, identifier: &str) -> Option<&User> {
        self.users.iter().find(|u| {
            u.identifiers()
                .any(|ident| ident.eq_ignore_ascii_case(identifier))
        })
    }

    /// Leaf tasks with real duration that contribute to the date range
    fn work_tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks
            .iter()
            .filter(|t| t.valid && t.is_leaf() && !t.is_zero_duration())
    }

    /// Earliest start over all leaf work tasks (milestones ignored)
    pub fn earliest_start(&self) -> Option<NaiveDateTime> {
        self.work_tasks().filter_map(|t| t.start).min()
    }

    /// Latest finish over all leaf work tasks (milestones ignored)
    pub fn latest_finish(&self) -> Option<NaiveDateTime> {
        self.work_tasks().filter_map(|t| t.finish).max()
    }

    /// Sum of the original estimates of all leaf work tasks
    pub fn estimated_work(&self) -> Duration {
        self.tasks
            .iter()
            .filter(|t| t.valid && t.is_leaf() && !t.milestone)
            .map(|t| t.original_estimate)
            .sum()
    }

    pub fn first_worklog(&self) -> Option<NaiveDateTime> {
        self.worklogs.iter().map(|w| w.start).min()
    }

    pub fn last_worklog(&self) -> Option<NaiveDateTime> {
        self.worklogs.iter().map(|w| w.start).max()
    }

    pub fn conflicts_for(&self, task: TaskId) -> impl Iterator<Item = &Conflict> {
        self.conflicts.iter().filter(move |c| c.task == task)
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Chart rendering
pub trait Renderer {
    type Output;

    /// Render a chart of the sprint
    fn render(&self, sprint: &Sprint) -> Result<Self::Output, RenderError>;
}

// ============================================================================
// Errors
// ============================================================================

/// Rendering error
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Milestone timeline queried before calculate()")]
    TimelineNotCalculated,

    #[error("{0} queried before it was finalized")]
    NotFinalized(&'static str),

    #[error("Unknown user: {0}")]
    UnknownUser(String),
}

// ============================================================================
// Tests
// ============================================================================
