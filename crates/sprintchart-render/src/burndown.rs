//! Day-indexed work accumulation and the remaining-work curve.

use chrono::{NaiveDate, NaiveDateTime};
use sprintchart_core::{
    seconds_of_day, Duration, RenderError, LUNCH_END_SECS, LUNCH_START_SECS, WORK_DAY_END_SECS,
    WORK_DAY_START_SECS,
};

/// Per-day work, turned into a cumulative "remaining" curve by `finalize()`
#[derive(Clone, Debug, Default)]
pub struct BurndownAccumulator {
    work: Vec<Duration>,
    curve: Option<Vec<Duration>>,
}

impl BurndownAccumulator {
    /// Accumulator covering day indices `0..days`
    pub fn new(days: usize) -> Self {
        Self {
            work: vec![Duration::zero(); days],
            curve: None,
        }
    }

    /// Accumulator whose last day index is `end_index`
    pub fn ending_at(end_index: i64) -> Self {
        Self::new(usize::try_from(end_index + 1).unwrap_or(0))
    }

    pub fn len(&self) -> usize {
        self.work.len()
    }

    pub fn is_empty(&self) -> bool {
        self.work.is_empty()
    }

    /// Add work on a day; indices outside `0..days` are dropped
    ///
    /// Returns whether the amount was recorded.
    pub fn add(&mut self, day_index: i64, amount: Duration) -> bool {
        let Some(slot) = usize::try_from(day_index)
            .ok()
            .and_then(|i| self.work.get_mut(i))
        else {
            return false;
        };
        *slot += amount;
        self.curve = None;
        true
    }

    /// Work recorded on a day
    pub fn work(&self, day_index: usize) -> Duration {
        self.work.get(day_index).copied().unwrap_or_default()
    }

    pub fn total(&self) -> Duration {
        self.work.iter().copied().sum()
    }

    /// Build the curve: `curve[0]` is the total, each next entry subtracts
    /// the previous day's work, down to `curve[days]`
    pub fn finalize(&mut self) -> &[Duration] {
        let mut remaining = self.total();
        let mut curve = Vec::with_capacity(self.work.len() + 1);
        curve.push(remaining);
        for amount in &self.work {
            remaining -= *amount;
            curve.push(remaining);
        }
        self.curve.insert(curve)
    }

    pub fn is_finalized(&self) -> bool {
        self.curve.is_some()
    }

    /// The curve, `days + 1` entries long
    pub fn curve(&self) -> Result<&[Duration], RenderError> {
        self.curve
            .as_deref()
            .ok_or(RenderError::NotFinalized("burndown curve"))
    }

    /// Remaining work at the start of a day
    pub fn remaining(&self, day_index: usize) -> Result<Option<Duration>, RenderError> {
        Ok(self.curve()?.get(day_index).copied())
    }
}

/// Office time between `start` and `finish` that falls on `day`
///
/// Office hours are 08:00 to 16:30 with a lunch break from 12:00 to 13:00,
/// so a full day yields 7.5 hours.
pub fn working_time_on(day: NaiveDate, start: NaiveDateTime, finish: NaiveDateTime) -> Duration {
    let day_secs = |instant: NaiveDateTime| {
        if instant.date() < day {
            0
        } else if instant.date() > day {
            24 * 3600
        } else {
            seconds_of_day(instant)
        }
    };
    let from = day_secs(start).max(WORK_DAY_START_SECS);
    let to = day_secs(finish).min(WORK_DAY_END_SECS);
    if to <= from {
        return Duration::zero();
    }
    let lunch = (to.min(LUNCH_END_SECS) - from.max(LUNCH_START_SECS)).max(0);
    Duration::seconds(to - from - lunch)
}
