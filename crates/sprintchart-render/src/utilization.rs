//! Per-resource daily utilization: assigned work and time out of office.

use crate::burndown::working_time_on;
use crate::calendar::CalendarAxis;
use crate::style::is_weekend;
use sprintchart_core::{OffDay, OffDayType, Sprint, UserId, SECONDS_PER_WORK_DAY};
use std::collections::HashMap;
use tracing::debug;

/// Category of a utilization entry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UtilizationKind {
    Assigned,
    Vacation,
    Sickness,
    /// Trips and public holidays
    NonProject,
}

impl From<OffDayType> for UtilizationKind {
    fn from(kind: OffDayType) -> Self {
        match kind {
            OffDayType::Vacation => UtilizationKind::Vacation,
            OffDayType::Sick => UtilizationKind::Sickness,
            OffDayType::Trip | OffDayType::Holiday => UtilizationKind::NonProject,
        }
    }
}

/// Four day-indexed arrays for one resource
///
/// Values are in days (1.0 is a full working day). Writes to index 0 or at
/// or beyond the length are dropped.
#[derive(Clone, Debug, PartialEq)]
pub struct UtilizationSeries {
    len: usize,
    assigned: Vec<f64>,
    vacation: Option<Vec<f64>>,
    sickness: Option<Vec<f64>>,
    non_project: Option<Vec<f64>>,
    max_unit: Option<f64>,
}

impl UtilizationSeries {
    pub fn new(len: usize) -> Self {
        Self {
            len,
            assigned: vec![0.0; len],
            vacation: None,
            sickness: None,
            non_project: None,
            max_unit: None,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn slot(&self, index: i64) -> Option<usize> {
        usize::try_from(index).ok().filter(|i| *i > 0 && *i < self.len)
    }

    fn array_mut(&mut self, kind: UtilizationKind) -> &mut Vec<f64> {
        let len = self.len;
        match kind {
            UtilizationKind::Assigned => &mut self.assigned,
            UtilizationKind::Vacation => self.vacation.get_or_insert_with(|| vec![0.0; len]),
            UtilizationKind::Sickness => self.sickness.get_or_insert_with(|| vec![0.0; len]),
            UtilizationKind::NonProject => self.non_project.get_or_insert_with(|| vec![0.0; len]),
        }
    }

    fn array(&self, kind: UtilizationKind) -> Option<&Vec<f64>> {
        match kind {
            UtilizationKind::Assigned => Some(&self.assigned),
            UtilizationKind::Vacation => self.vacation.as_ref(),
            UtilizationKind::Sickness => self.sickness.as_ref(),
            UtilizationKind::NonProject => self.non_project.as_ref(),
        }
    }

    /// Additive write; returns whether the index was accepted
    pub fn add(&mut self, kind: UtilizationKind, index: i64, value: f64) -> bool {
        let Some(i) = self.slot(index) else {
            return false;
        };
        self.array_mut(kind)[i] += value;
        true
    }

    /// Value on a day; `None` outside `0..len`, zero if never written
    pub fn get(&self, kind: UtilizationKind, index: i64) -> Option<f64> {
        let i = usize::try_from(index).ok().filter(|i| *i < self.len)?;
        Some(self.array(kind).map_or(0.0, |values| values[i]))
    }

    /// Whether a category has been touched at all
    pub fn has(&self, kind: UtilizationKind) -> bool {
        self.array(kind).is_some()
    }

    /// Display reference line; only the first value sticks
    pub fn set_max_unit(&mut self, value: f64) {
        if self.max_unit.is_none() {
            self.max_unit = Some(value);
        }
    }

    pub fn max_unit(&self) -> Option<f64> {
        self.max_unit
    }

    /// +1.0 for every calendar day of the off-day range, weekends included
    pub fn add_off_day(&mut self, axis: &CalendarAxis, off_day: &OffDay) {
        let kind = UtilizationKind::from(off_day.kind);
        for day in off_day.days() {
            self.add(kind, axis.day_index(day), 1.0);
        }
    }

    /// Vacation or sickness recorded on a day
    pub fn is_out_of_office(&self, index: i64) -> bool {
        [UtilizationKind::Vacation, UtilizationKind::Sickness]
            .into_iter()
            .any(|kind| self.get(kind, index).is_some_and(|v| v > 0.0))
    }
}

/// Utilization series for every resource of one chart
#[derive(Clone, Debug, Default)]
pub struct UtilizationTable {
    days: usize,
    series: HashMap<UserId, UtilizationSeries>,
}

impl UtilizationTable {
    pub fn new(days: usize) -> Self {
        Self {
            days,
            series: HashMap::new(),
        }
    }

    /// Series of a user, created on first reference
    pub fn series_mut(&mut self, user: UserId) -> &mut UtilizationSeries {
        let days = self.days;
        self.series
            .entry(user)
            .or_insert_with(|| UtilizationSeries::new(days))
    }

    pub fn get(&self, user: UserId) -> Option<&UtilizationSeries> {
        self.series.get(&user)
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Off-days and assigned leaf-task work of every sprint user, indexed
    /// from the axis' first milestone over its milestone span
    pub fn from_sprint(sprint: &Sprint, axis: &CalendarAxis) -> Self {
        let days = usize::try_from(axis.span_days()).unwrap_or(0);
        let mut table = Self::new(days);
        for user in &sprint.users {
            let series = table.series_mut(user.id);
            series.set_max_unit(user.availability);
            for off_day in &user.off_days {
                series.add_off_day(axis, off_day);
            }
        }

        let leaves = sprint
            .tasks
            .iter()
            .filter(|t| t.valid && t.is_leaf() && !t.is_zero_duration());
        for task in leaves {
            let (Some(user), Some(start), Some(finish)) = (task.resource, task.start, task.finish)
            else {
                continue;
            };
            let series = table.series_mut(user);
            for day in start.date().iter_days().take_while(|d| *d <= finish.date()) {
                if is_weekend(day) {
                    continue;
                }
                let work = working_time_on(day, start, finish);
                if !work.is_zero() {
                    let fraction = work.seconds as f64 / SECONDS_PER_WORK_DAY as f64;
                    series.add(UtilizationKind::Assigned, axis.day_index(day), fraction);
                }
            }
        }
        debug!(users = table.len(), days, "utilization table built");
        table
    }
}
