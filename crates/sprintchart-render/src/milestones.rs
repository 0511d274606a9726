//! Milestone timeline: the named dates that bound and annotate a chart.

use crate::calendar::CalendarAxis;
use crate::canvas::{Canvas, Rect, Stroke, TextAlign};
use crate::style::{ChartStyle, Color};
use chrono::NaiveDate;
use sprintchart_core::RenderError;
use std::collections::HashMap;
use tracing::trace;

/// Well-known milestone symbols
pub mod symbol {
    pub const START: &str = "S";
    pub const END: &str = "E";
    pub const NOW: &str = "N";
    pub const RELEASE: &str = "R";
    pub const FIRST_WORKLOG: &str = "F";
    pub const LAST_WORKLOG: &str = "L";
}

/// Days a closed chart keeps showing "now" past its end
pub const HIDE_NOW_AFTER_DAYS: i64 = 7;

const FLAG_WIDTH: i32 = 14;
const FLAG_HEIGHT: i32 = 11;

/// Placeholder date meaning "never set"; adding it is a no-op
pub fn unset_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or(NaiveDate::MIN)
}

#[derive(Clone, Debug, PartialEq)]
pub struct Milestone {
    pub time: NaiveDate,
    pub symbol: String,
    pub name: String,
    pub color: Color,
    /// Hidden milestones bound the date range but are not painted
    pub hidden: bool,
    /// Drawn as a full-height line instead of a thin marker
    pub now_line: bool,
}

/// Ordered set of milestones, unique by symbol
#[derive(Clone, Debug, Default)]
pub struct MilestoneTimeline {
    list: Vec<Milestone>,
    by_symbol: HashMap<String, usize>,
    bounds: Option<(NaiveDate, NaiveDate)>,
}

impl MilestoneTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a visible milestone
    ///
    /// Returns false if `time` is missing or the unset placeholder.
    pub fn add(
        &mut self,
        time: Option<NaiveDate>,
        symbol: &str,
        name: impl Into<String>,
        color: Color,
    ) -> bool {
        self.insert(time, symbol, name.into(), color, false)
    }

    /// Insert or replace a milestone that only bounds the date range
    pub fn add_hidden(
        &mut self,
        time: Option<NaiveDate>,
        symbol: &str,
        name: impl Into<String>,
        color: Color,
    ) -> bool {
        self.insert(time, symbol, name.into(), color, true)
    }

    fn insert(
        &mut self,
        time: Option<NaiveDate>,
        symbol: &str,
        name: String,
        color: Color,
        hidden: bool,
    ) -> bool {
        let Some(time) = time.filter(|t| *t != unset_date()) else {
            return false;
        };
        let milestone = Milestone {
            time,
            symbol: symbol.to_string(),
            name,
            color,
            hidden,
            now_line: symbol == symbol::NOW,
        };
        match self.by_symbol.get(symbol) {
            Some(&index) => self.list[index] = milestone,
            None => {
                self.by_symbol.insert(symbol.to_string(), self.list.len());
                self.list.push(milestone);
            }
        }
        self.bounds = None;
        true
    }

    /// Remove by symbol
    pub fn remove(&mut self, symbol: &str) -> Option<Milestone> {
        let index = self.by_symbol.remove(symbol)?;
        let removed = self.list.remove(index);
        self.reindex();
        self.bounds = None;
        Some(removed)
    }

    /// Sort by time and fix the first/last anchors
    pub fn calculate(&mut self) -> Result<(), RenderError> {
        self.list.sort_by_key(|m| m.time);
        self.reindex();
        let (Some(first), Some(last)) = (self.list.first(), self.list.last()) else {
            return Err(RenderError::InvalidData(
                "a chart needs at least one milestone".into(),
            ));
        };
        self.bounds = Some((first.time, last.time));
        for m in &self.list {
            trace!(symbol = %m.symbol, time = %m.time, hidden = m.hidden, "{}", m.name);
        }
        Ok(())
    }

    fn reindex(&mut self) {
        self.by_symbol = self
            .list
            .iter()
            .enumerate()
            .map(|(i, m)| (m.symbol.clone(), i))
            .collect();
    }

    /// Earliest milestone; fails until `calculate()` has run
    pub fn first(&self) -> Result<NaiveDate, RenderError> {
        self.bounds
            .map(|(first, _)| first)
            .ok_or(RenderError::TimelineNotCalculated)
    }

    /// Latest milestone; fails until `calculate()` has run
    pub fn last(&self) -> Result<NaiveDate, RenderError> {
        self.bounds
            .map(|(_, last)| last)
            .ok_or(RenderError::TimelineNotCalculated)
    }

    pub fn get(&self, symbol: &str) -> Option<&Milestone> {
        self.by_symbol.get(symbol).map(|&i| &self.list[i])
    }

    pub fn time_of(&self, symbol: &str) -> Option<NaiveDate> {
        self.get(symbol).map(|m| m.time)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Milestone> {
        self.list.iter()
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// True when nothing would be painted: every milestone is hidden
    pub fn is_empty(&self) -> bool {
        self.list.iter().all(|m| m.hidden)
    }

    /// Drop "now" from a closed chart once it lies more than a week past the end
    pub fn hide_stale_now(&mut self, closed: bool) -> bool {
        let (Some(now), Some(end)) = (self.time_of(symbol::NOW), self.time_of(symbol::END)) else {
            return false;
        };
        if closed && (now - end).num_days() > HIDE_NOW_AFTER_DAYS {
            self.remove(symbol::NOW);
            return true;
        }
        false
    }

    /// Flags in the milestone row and vertical markers down to `bottom`
    pub fn draw(
        &self,
        canvas: &mut Canvas,
        axis: &CalendarAxis,
        style: &ChartStyle,
        top: i32,
        bottom: i32,
    ) {
        for m in self.list.iter().filter(|m| !m.hidden) {
            let x = axis.day_x(m.time);
            let flag_top = top + 2;
            if m.now_line {
                canvas.line(x, flag_top, x, bottom, style.now_line, Stroke::dashed(1.0, 3.0));
            } else {
                canvas.fill_rect(x, flag_top, 1, bottom - flag_top, m.color);
            }
            let flag = Rect::new(x, flag_top, FLAG_WIDTH, FLAG_HEIGHT);
            canvas.fill_rect(flag.x, flag.y, flag.width, flag.height, style.milestone_flag);
            canvas.stroke_rect(flag, m.color, Stroke::solid(1.0));
            canvas.text(
                x + FLAG_WIDTH / 2,
                flag_top + FLAG_HEIGHT / 2,
                m.symbol.clone(),
                &style.milestone_font,
                style.milestone_text,
                TextAlign::Center,
            );
            canvas.region(
                flag,
                None,
                vec![m.name.clone(), m.time.format("%Y-%m-%d").to_string()],
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn blue() -> Color {
        Color::rgb(0, 0, 0xff)
    }

    #[test]
    fn calculate_sorts_and_sets_bounds() {
        let mut tl = MilestoneTimeline::new();
        tl.add(Some(date(2025, 1, 10)), symbol::END, "End", blue());
        tl.add(Some(date(2025, 1, 8)), symbol::NOW, "Now", blue());
        tl.add(Some(date(2025, 1, 6)), symbol::START, "Start", blue());
        tl.calculate().unwrap();

        assert_eq!(tl.first().unwrap(), date(2025, 1, 6));
        assert_eq!(tl.last().unwrap(), date(2025, 1, 10));
        let order: Vec<&str> = tl.iter().map(|m| m.symbol.as_str()).collect();
        assert_eq!(order, vec!["S", "N", "E"]);
        assert_eq!(tl.get(symbol::NOW).map(|m| m.time), Some(date(2025, 1, 8)));
    }

    #[test]
    fn queries_fail_before_calculate() {
        let mut tl = MilestoneTimeline::new();
        tl.add(Some(date(2025, 1, 6)), symbol::START, "Start", blue());
        assert!(matches!(tl.first(), Err(RenderError::TimelineNotCalculated)));
        assert!(matches!(tl.last(), Err(RenderError::TimelineNotCalculated)));
    }

    #[test]
    fn mutation_invalidates_bounds() {
        let mut tl = MilestoneTimeline::new();
        tl.add(Some(date(2025, 1, 6)), symbol::START, "Start", blue());
        tl.calculate().unwrap();
        tl.add(Some(date(2025, 2, 1)), symbol::END, "End", blue());
        assert!(tl.last().is_err());
        tl.calculate().unwrap();
        assert_eq!(tl.last().unwrap(), date(2025, 2, 1));
    }

    #[test]
    fn add_ignores_missing_and_unset_dates() {
        let mut tl = MilestoneTimeline::new();
        assert!(!tl.add(None, symbol::RELEASE, "Release", blue()));
        assert!(!tl.add(Some(unset_date()), symbol::RELEASE, "Release", blue()));
        assert_eq!(tl.len(), 0);
        assert!(tl.calculate().is_err());
    }

    #[test]
    fn duplicate_symbol_replaces() {
        let mut tl = MilestoneTimeline::new();
        tl.add(Some(date(2025, 1, 6)), symbol::START, "Start", blue());
        tl.add(Some(date(2025, 1, 3)), symbol::START, "Start (moved)", blue());
        tl.calculate().unwrap();
        assert_eq!(tl.len(), 1);
        assert_eq!(tl.first().unwrap(), date(2025, 1, 3));
    }

    #[test]
    fn remove_keeps_index_consistent() {
        let mut tl = MilestoneTimeline::new();
        tl.add(Some(date(2025, 1, 6)), symbol::START, "Start", blue());
        tl.add(Some(date(2025, 1, 8)), symbol::NOW, "Now", blue());
        tl.add(Some(date(2025, 1, 10)), symbol::END, "End", blue());
        assert!(tl.remove(symbol::START).is_some());
        assert!(tl.remove(symbol::START).is_none());
        assert_eq!(tl.get(symbol::END).map(|m| m.time), Some(date(2025, 1, 10)));
        tl.calculate().unwrap();
        assert_eq!(tl.first().unwrap(), date(2025, 1, 8));
    }

    #[test]
    fn empty_means_all_hidden() {
        let mut tl = MilestoneTimeline::new();
        tl.add_hidden(Some(date(2025, 1, 6)), symbol::LAST_WORKLOG, "last value", Color::RED);
        assert!(tl.is_empty());
        tl.add(Some(date(2025, 1, 7)), symbol::START, "Start", blue());
        assert!(!tl.is_empty());
    }

    #[test]
    fn hidden_milestones_still_bound_the_range() {
        let mut tl = MilestoneTimeline::new();
        tl.add(Some(date(2025, 1, 6)), symbol::START, "Start", blue());
        tl.add_hidden(Some(date(2025, 1, 20)), symbol::LAST_WORKLOG, "last", blue());
        tl.calculate().unwrap();
        assert_eq!(tl.last().unwrap(), date(2025, 1, 20));

        let axis = CalendarAxis::from_timeline(&tl).unwrap();
        let mut canvas = Canvas::new();
        tl.draw(&mut canvas, &axis, &ChartStyle::light(), 0, 100);
        assert_eq!(canvas.count_text("S"), 1);
        assert_eq!(canvas.count_text("L"), 0);
    }

    #[test]
    fn stale_now_is_hidden_for_closed_charts() {
        let mut tl = MilestoneTimeline::new();
        tl.add(Some(date(2025, 1, 10)), symbol::END, "End", blue());
        tl.add(Some(date(2025, 1, 17)), symbol::NOW, "Now", blue());
        assert!(!tl.hide_stale_now(true));

        tl.add(Some(date(2025, 1, 18)), symbol::NOW, "Now", blue());
        assert!(!tl.hide_stale_now(false));
        assert!(tl.hide_stale_now(true));
        assert!(tl.get(symbol::NOW).is_none());
    }

    #[test]
    fn now_is_drawn_as_line() {
        let mut tl = MilestoneTimeline::new();
        tl.add(Some(date(2025, 1, 8)), symbol::NOW, "Now", blue());
        assert!(tl.get(symbol::NOW).unwrap().now_line);
        assert!(!tl.add(None, symbol::END, "End", blue()));
    }
}
