//! Burndown chart renderer.
//!
//! Plots remaining work over the sprint calendar: the planned guide taken
//! from the leveled schedule, a linear optimal guide, the remaining-work
//! line from worklogs and the release extrapolation.
//!
//! Features:
//! - Y axis in person-days, person-weeks or person-months
//! - Start, end, now, release and first/last punch milestones
//! - `CLOSED` watermark for closed sprints
//! - Author legend colored from the author registry

use crate::authors::AuthorRegistry;
use crate::burndown::{working_time_on, BurndownAccumulator};
use crate::calendar::{CalendarAxis, MAX_DAY_WIDTH, MILESTONE_ROW_HEIGHT};
use crate::canvas::{ApproximateTextMeasure, Canvas, Chart, Rect, Stroke, TextAlign, TextMeasure};
use crate::milestones::{symbol, MilestoneTimeline};
use crate::style::{is_weekend, ChartStyle, Color};
use chrono::{NaiveDate, NaiveDateTime};
use sprintchart_core::{
    Duration, RenderError, Renderer, Sprint, SECONDS_PER_WORK_DAY, SECONDS_PER_WORK_MONTH,
    SECONDS_PER_WORK_WEEK,
};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Width reserved left of the first day column for the y axis labels
pub const Y_AXIS_WIDTH: i32 = 50;
/// Y axis labels closer than this are skipped
pub const MIN_TICK_SPACING: i32 = 12;
pub const DEFAULT_CHART_HEIGHT: i32 = 400;

const TICK_LENGTH: i32 = 4;
const GRID_ALPHA: u8 = 32;
const LEGEND_WIDTH: i32 = 130;
const LEGEND_LINE: i32 = 14;
const LEGEND_SWATCH: i32 = 10;
const WATERMARK_INSET: i32 = 10;

/// Burndown chart renderer configuration
#[derive(Clone, Debug)]
pub struct BurndownChart {
    pub now: Option<NaiveDateTime>,
    /// Fit the days into this width, y axis included
    pub chart_width: Option<i32>,
    pub chart_height: i32,
    pub style: ChartStyle,
}

impl Default for BurndownChart {
    fn default() -> Self {
        Self {
            now: None,
            chart_width: None,
            chart_height: DEFAULT_CHART_HEIGHT,
            style: ChartStyle::light(),
        }
    }
}

impl BurndownChart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(mut self, now: NaiveDateTime) -> Self {
        self.now = Some(now);
        self
    }

    pub fn chart_width(mut self, width: i32) -> Self {
        self.chart_width = Some(width);
        self
    }

    pub fn chart_height(mut self, height: i32) -> Self {
        self.chart_height = height;
        self
    }

    pub fn style(mut self, style: ChartStyle) -> Self {
        self.style = style;
        self
    }

    pub fn dark_theme(mut self) -> Self {
        self.style = ChartStyle::dark();
        self
    }

    /// Sprint start and end fall back to the span of the scheduled tasks
    fn sprint_bounds(sprint: &Sprint) -> (Option<NaiveDate>, Option<NaiveDate>) {
        let start = sprint.start.or_else(|| sprint.earliest_start());
        let end = sprint.end.or_else(|| sprint.latest_finish());
        (start.map(|s| s.date()), end.map(|e| e.date()))
    }

    /// Start, end, now, release and first/last punch milestones
    pub fn timeline(&self, sprint: &Sprint) -> Result<MilestoneTimeline, RenderError> {
        let blue = Color::rgb(0, 0, 0xff);
        let (start, end) = Self::sprint_bounds(sprint);
        let mut timeline = MilestoneTimeline::new();
        timeline.add(start, symbol::START, "Start (start of sprint)", blue);
        timeline.add(self.now.map(|n| n.date()), symbol::NOW, "Now (current date)", blue);
        timeline.add(end, symbol::END, "End (end of sprint)", blue);
        timeline.add(
            sprint.release.map(|r| r.date()),
            symbol::RELEASE,
            "Release (estimated release date)",
            blue,
        );
        timeline.hide_stale_now(sprint.closed);

        let first = sprint.first_worklog().map(|f| f.date());
        if first.is_some() && first != start {
            timeline.add(first, symbol::FIRST_WORKLOG, "First punch-in", blue);
        }
        let last = sprint.last_worklog().map(|l| l.date());
        if last.is_some() && last != end {
            timeline.add(last, symbol::LAST_WORKLOG, "Last punch-out", blue);
        }
        timeline.calculate()?;
        Ok(timeline)
    }

    /// Axis starting right of the y axis; with a chart width the day width
    /// is fitted and the remaining columns are shown too
    pub fn axis(&self, timeline: &MilestoneTimeline) -> Result<CalendarAxis, RenderError> {
        let axis = CalendarAxis::from_timeline(timeline)?.origin(Y_AXIS_WIDTH);
        Ok(match self.chart_width {
            Some(width) => {
                let available = (width - Y_AXIS_WIDTH).max(1);
                let days = axis.span_days().max(1);
                let day_width = ((i64::from(available) / days) as i32).clamp(1, MAX_DAY_WIDTH);
                axis.with_day_width(day_width)
                    .with_display_days(i64::from(available / day_width))
            }
            None => axis.with_day_width(MAX_DAY_WIDTH),
        })
    }

    /// Planned remaining work per day, derived from the leveled schedule
    ///
    /// Every valid leaf task with a resource and an impact on cost
    /// contributes its office time per weekday, weighted by the resource's
    /// availability. Contributions outside the axis span are dropped.
    pub fn planned_guide(sprint: &Sprint, axis: &CalendarAxis) -> BurndownAccumulator {
        let mut guide = BurndownAccumulator::ending_at(axis.span_days() - 1);
        let mut dropped = 0usize;
        let tasks = sprint
            .tasks
            .iter()
            .filter(|t| t.valid && t.is_leaf() && !t.milestone && t.impact_on_cost);
        for task in tasks {
            let (Some(user), Some(start), Some(finish)) = (
                task.resource.and_then(|id| sprint.user(id)),
                task.start,
                task.finish,
            ) else {
                continue;
            };
            if finish <= start {
                warn!(task = task.id, name = %task.name, "finish is not after start, ignoring task");
                continue;
            }
            for day in start.date().iter_days().take_while(|d| *d <= finish.date()) {
                if is_weekend(day) {
                    continue;
                }
                let work = working_time_on(day, start, finish).scale(user.availability);
                if !work.is_zero() && !guide.add(axis.day_index(day), work) {
                    dropped += 1;
                }
            }
        }
        if dropped > 0 {
            warn!(dropped, "work outside the chart range was ignored");
        }
        guide.finalize();
        guide
    }

    pub fn render_measured(
        &self,
        sprint: &Sprint,
        measure: &dyn TextMeasure,
    ) -> Result<Chart, RenderError> {
        let timeline = self.timeline(sprint)?;
        let axis = self.axis(&timeline)?;
        let width = Y_AXIS_WIDTH + axis.width();
        let height = self.chart_height;
        let header_top = height - axis.header_height();
        if header_top <= MILESTONE_ROW_HEIGHT {
            return Err(RenderError::InvalidData(format!(
                "chart height {} leaves no room for the diagram (needs more than {})",
                height,
                MILESTONE_ROW_HEIGHT + axis.header_height()
            )));
        }
        let diagram = Rect::from_corners(Y_AXIS_WIDTH, MILESTONE_ROW_HEIGHT, width, header_top);
        debug!(
            width,
            height,
            day_width = axis.day_width(),
            diagram_height = diagram.height,
            "burndown chart size"
        );

        let guide = Self::planned_guide(sprint, &axis);
        let planned = guide.curve()?;
        let estimated = sprint.estimated_work();
        let max = estimated.max(planned.first().copied().unwrap_or_default());

        let mut painter = BurndownPainter {
            axis: &axis,
            timeline: &timeline,
            style: &self.style,
            measure,
            canvas: Canvas::new(),
            diagram,
            max,
        };
        painter.canvas.fill_rect(0, 0, width, height, self.style.background);
        axis.draw_day_bars(&mut painter.canvas, &self.style, diagram.y, diagram.height);
        axis.draw_header(&mut painter.canvas, &self.style, measure, header_top);
        timeline.draw(&mut painter.canvas, &axis, &self.style, 0, diagram.bottom());

        let authors = worklog_authors(sprint)?;
        painter.draw_author_legend(&authors, width);
        painter.draw_guide_legend(width);

        if max.is_zero() {
            debug!("nothing to burn down");
        } else {
            painter.draw_y_axis();
            painter.draw_remaining(sprint, estimated);
            if sprint.closed {
                painter.draw_watermark("CLOSED");
            }
            painter.draw_planned_guide(planned);
            painter.draw_optimal_guide(estimated);
            painter.draw_release(estimated);
        }

        Ok(Chart {
            width,
            height,
            canvas: painter.canvas,
        })
    }
}

impl Renderer for BurndownChart {
    type Output = Chart;

    fn render(&self, sprint: &Sprint) -> Result<Chart, RenderError> {
        self.render_measured(sprint, &ApproximateTextMeasure)
    }
}

/// Worklog authors by name, colored in roster order
fn worklog_authors(sprint: &Sprint) -> Result<AuthorRegistry, RenderError> {
    let mut names = Vec::new();
    for log in &sprint.worklogs {
        let user = sprint
            .user(log.author)
            .ok_or_else(|| RenderError::UnknownUser(log.author.to_string()))?;
        names.push(user.name.as_str());
    }
    names.sort_unstable();
    names.dedup();

    let mut registry = AuthorRegistry::new();
    for name in names {
        registry.add(name);
    }
    registry.calculate_colors(&sprint.users, true);
    Ok(registry)
}

/// Weekdays from `first` to `last`, inclusive
fn working_days_including(first: NaiveDate, last: NaiveDate) -> i64 {
    first
        .iter_days()
        .take_while(|d| *d <= last)
        .filter(|d| !is_weekend(*d))
        .count() as i64
}

/// Y axis mark step and its unit label
fn mark_unit(max: Duration) -> (Duration, &'static str) {
    let fifth = max.seconds / 5;
    if fifth > SECONDS_PER_WORK_MONTH {
        (Duration::seconds(SECONDS_PER_WORK_MONTH), "pm")
    } else if fifth > SECONDS_PER_WORK_WEEK {
        (Duration::seconds(SECONDS_PER_WORK_WEEK), "pw")
    } else {
        (Duration::seconds(SECONDS_PER_WORK_DAY), "pd")
    }
}

struct BurndownPainter<'a> {
    axis: &'a CalendarAxis,
    timeline: &'a MilestoneTimeline,
    style: &'a ChartStyle,
    measure: &'a dyn TextMeasure,
    canvas: Canvas,
    diagram: Rect,
    max: Duration,
}

impl BurndownPainter<'_> {
    /// Pixel y of an amount of remaining work
    fn y(&self, work: Duration) -> i32 {
        let height = i64::from(self.diagram.height);
        let offset = work.seconds * height / self.max.seconds.max(1);
        self.diagram.bottom() - offset as i32
    }

    /// Left edge of the start column, or of the first day if there is no start
    fn start_left(&self) -> i32 {
        let start = self
            .timeline
            .time_of(symbol::START)
            .unwrap_or_else(|| self.axis.first());
        self.axis.day_left(start)
    }

    fn draw_y_axis(&mut self) {
        let (mark, unit) = mark_unit(self.max);
        let start_left = self.start_left();
        let grid = self.style.ticks.with_alpha(GRID_ALPHA);
        let mut last_y = i32::MAX;
        let mut value = Duration::zero();
        while value < self.max {
            let y = self.y(value) - 1;
            if last_y.saturating_sub(y) > MIN_TICK_SPACING {
                self.canvas
                    .fill_rect(start_left - TICK_LENGTH, y, TICK_LENGTH, 1, self.style.ticks);
                self.canvas
                    .fill_rect(start_left, y, self.diagram.right() - start_left, 1, grid);
                self.canvas.text(
                    Y_AXIS_WIDTH - 5,
                    y,
                    format!("{}{}", value.seconds / mark.seconds, unit),
                    &self.style.font,
                    self.style.tick_text,
                    TextAlign::Right,
                );
                last_y = y;
            }
            value += mark;
        }
    }

    /// Planned guide from the day-indexed curve, one point per day boundary
    fn draw_planned_guide(&mut self, curve: &[Duration]) {
        let points: Vec<(i32, i32)> = curve
            .iter()
            .enumerate()
            .map(|(i, remaining)| {
                let day = self.axis.date_at_index(i as i64);
                (self.axis.day_left(day) + 1, self.y(*remaining))
            })
            .collect();
        for pair in points.windows(2) {
            let ((x1, y1), (x2, y2)) = (pair[0], pair[1]);
            self.canvas
                .line(x1, y1, x2, y2, self.style.planned_guide, Stroke::dashed(1.0, 3.0));
        }
    }

    /// Linear burn of the estimate over the working days from start to end
    fn draw_optimal_guide(&mut self, estimated: Duration) {
        let (Some(first), Some(last)) = (
            self.timeline.time_of(symbol::START),
            self.timeline.time_of(symbol::END),
        ) else {
            return;
        };
        let working_days = working_days_including(first, last).max(1);
        let per_day = estimated.seconds / working_days;
        let half = self.axis.day_width() / 2;
        let mut last_x = self.axis.day_left(first) + 1;
        let mut last_y = self.y(estimated);
        let mut burned = 0;
        for day in first.iter_days().take_while(|d| *d <= last) {
            if !is_weekend(day) {
                burned += 1;
            }
            let x = self.axis.day_x(day) + half - 1;
            let y = self.y(Duration::seconds(estimated.seconds - burned * per_day));
            self.canvas
                .line(last_x, last_y, x, y, self.style.optimal_guide, Stroke::dashed(1.0, 3.0));
            last_x = x;
            last_y = y;
        }
    }

    /// Estimated work minus cumulative worklogs, stepped per day up to now
    fn draw_remaining(&mut self, sprint: &Sprint, estimated: Duration) {
        let now = self.timeline.time_of(symbol::NOW);
        let mut per_day: BTreeMap<NaiveDate, Duration> = BTreeMap::new();
        for log in &sprint.worklogs {
            let day = log.start.date();
            if now.is_some_and(|n| day >= n) {
                continue;
            }
            *per_day.entry(day.max(self.axis.first())).or_default() += log.time_spent;
        }
        if per_day.is_empty() {
            return;
        }

        let color = self.style.burndown_line;
        let stroke = Stroke::solid(2.0);
        let mut last_x = self.start_left();
        let mut last_y = self.y(estimated);
        let mut worked = Duration::zero();
        for (day, work) in per_day {
            worked += work;
            let remaining = estimated - worked;
            let x = self.axis.day_left(day);
            let y = self.y(remaining);
            self.canvas.line(last_x, last_y, x, y, color, stroke);
            self.canvas.region(
                Rect::new(x, self.diagram.y, self.axis.day_width().max(1), self.diagram.height),
                None,
                vec![
                    day.format("%Y-%m-%d").to_string(),
                    format!("Worked {}", work),
                    format!("Remaining {}", remaining),
                ],
            );
            last_x = x;
            last_y = y;
        }
        if let Some(now) = now {
            let x = self.axis.day_left(now);
            if x != last_x {
                self.canvas.line(last_x, last_y, x, last_y, color, stroke);
            }
        }
    }

    /// Straight line from the full estimate at start down to zero at release
    fn draw_release(&mut self, estimated: Duration) {
        let Some(release) = self.timeline.time_of(symbol::RELEASE) else {
            return;
        };
        let late = self
            .timeline
            .time_of(symbol::END)
            .is_some_and(|end| release > end);
        let color = if late { self.style.delay } else { self.style.in_time };
        let x1 = self.start_left() + 1;
        let y1 = self.y(estimated);
        let x2 = self.axis.day_x(release);
        self.canvas
            .line(x1, y1, x2, self.diagram.bottom(), color, Stroke::solid(1.0));
    }

    fn draw_watermark(&mut self, text: &str) {
        self.canvas.text(
            self.start_left() + WATERMARK_INSET,
            self.diagram.bottom() - WATERMARK_INSET,
            text,
            &self.style.watermark_font,
            self.style.watermark,
            TextAlign::Left,
        );
    }

    fn draw_guide_legend(&mut self, chart_width: i32) {
        let x = chart_width - LEGEND_WIDTH;
        let release = match (
            self.timeline.time_of(symbol::RELEASE),
            self.timeline.time_of(symbol::END),
        ) {
            (Some(release), Some(end)) if release > end => self.style.delay,
            _ => self.style.in_time,
        };
        let entries = [
            ("Planned", self.style.planned_guide),
            ("Optimal", self.style.optimal_guide),
            ("Remaining", self.style.burndown_line),
            ("Release", release),
        ];
        for (row, (label, color)) in entries.into_iter().enumerate() {
            let y = self.diagram.y + LEGEND_LINE / 2 + row as i32 * LEGEND_LINE;
            self.canvas.line(x, y, x + 20, y, color, Stroke::solid(2.0));
            self.canvas
                .text(x + 25, y, label, &self.style.font, self.style.text, TextAlign::Left);
        }
    }

    fn draw_author_legend(&mut self, authors: &AuthorRegistry, chart_width: i32) {
        let font = &self.style.milestone_font;
        let text_width = authors
            .iter()
            .map(|a| self.measure.text_width(&a.name, font))
            .fold(20, i32::max);
        let x = chart_width - LEGEND_WIDTH - text_width - LEGEND_SWATCH - 10;
        for (row, author) in authors.iter().enumerate() {
            let y = self.diagram.y + row as i32 * LEGEND_LINE + 2;
            let color = author.color.unwrap_or(self.style.task_fill);
            self.canvas.fill_rect(x, y, LEGEND_SWATCH, LEGEND_SWATCH, color);
            self.canvas.text(
                x + LEGEND_SWATCH + 3,
                y + LEGEND_SWATCH / 2,
                author.name.clone(),
                font,
                self.style.text,
                TextAlign::Left,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::DrawCommand;
    use pretty_assertions::assert_eq;
    use sprintchart_core::{Task, User, Worklog};

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn at(year: i32, month: u32, day: u32, hour: u32) -> NaiveDateTime {
        date(year, month, day).and_hms_opt(hour, 0, 0).unwrap()
    }

    fn create_test_sprint() -> Sprint {
        let mut sprint = Sprint::new(1, "Sprint 1");
        sprint.start = Some(at(2025, 1, 6, 8));
        sprint.end = Some(at(2025, 1, 10, 16));
        sprint.users.push(User::new(1, "alice"));
        sprint.users.push(User::new(2, "bob").availability(0.5));
        sprint.tasks.push(
            Task::new(1)
                .name("Design")
                .span(at(2025, 1, 6, 8), date(2025, 1, 7).and_hms_opt(16, 30, 0).unwrap())
                .estimate(Duration::work_days(2))
                .assign(1),
        );
        sprint.tasks.push(
            Task::new(2)
                .name("Build")
                .span(at(2025, 1, 8, 8), date(2025, 1, 10).and_hms_opt(16, 30, 0).unwrap())
                .estimate(Duration::work_days(3))
                .assign(2),
        );
        sprint
    }

    fn log(author: u64, start: NaiveDateTime, hours: i64) -> Worklog {
        Worklog {
            task: 1,
            author,
            start,
            time_spent: Duration::hours(hours),
            comment: String::new(),
        }
    }

    #[test]
    fn mark_unit_follows_magnitude() {
        assert_eq!(mark_unit(Duration::work_days(4)).1, "pd");
        assert_eq!(mark_unit(Duration::work_weeks(6)).1, "pw");
        assert_eq!(mark_unit(Duration::work_months(6)).1, "pm");
    }

    #[test]
    fn working_days_skip_weekends() {
        assert_eq!(working_days_including(date(2025, 1, 6), date(2025, 1, 12)), 5);
        assert_eq!(working_days_including(date(2025, 1, 11), date(2025, 1, 12)), 0);
    }

    #[test]
    fn planned_guide_weights_by_availability() {
        let sprint = create_test_sprint();
        let chart = BurndownChart::new();
        let timeline = chart.timeline(&sprint).unwrap();
        let axis = chart.axis(&timeline).unwrap();
        let guide = BurndownChart::planned_guide(&sprint, &axis);

        let day = Duration::work_days(1);
        assert_eq!(guide.work(0), day);
        assert_eq!(guide.work(1), day);
        assert_eq!(guide.work(2), Duration::seconds(day.seconds / 2));
        let curve = guide.curve().unwrap();
        assert_eq!(curve[0], Duration::seconds(2 * day.seconds + 3 * day.seconds / 2));
        assert_eq!(curve.last().copied(), Some(Duration::zero()));
    }

    #[test]
    fn tasks_without_cost_impact_do_not_plan_work() {
        let mut sprint = create_test_sprint();
        sprint.tasks[1] = sprint.tasks[1].clone().without_cost_impact();
        let chart = BurndownChart::new();
        let timeline = chart.timeline(&sprint).unwrap();
        let axis = chart.axis(&timeline).unwrap();
        let guide = BurndownChart::planned_guide(&sprint, &axis);
        assert_eq!(guide.total(), Duration::work_days(2));
    }

    #[test]
    fn first_and_last_punch_only_when_different() {
        let mut sprint = create_test_sprint();
        sprint.worklogs.push(log(1, at(2025, 1, 6, 9), 2));
        sprint.worklogs.push(log(2, at(2025, 1, 8, 9), 2));
        let timeline = BurndownChart::new().timeline(&sprint).unwrap();
        assert!(timeline.get(symbol::FIRST_WORKLOG).is_none());
        assert_eq!(timeline.time_of(symbol::LAST_WORKLOG), Some(date(2025, 1, 8)));
    }

    #[test]
    fn fitted_axis_fills_the_chart_width() {
        let sprint = create_test_sprint();
        let chart = BurndownChart::new().chart_width(250);
        let timeline = chart.timeline(&sprint).unwrap();
        let axis = chart.axis(&timeline).unwrap();
        // 200 px over 5 days clamps to the widest column, 10 columns shown
        assert_eq!(axis.day_width(), MAX_DAY_WIDTH);
        assert_eq!(axis.width(), 200);
        assert_eq!(axis.origin_x(), Y_AXIS_WIDTH);
    }

    #[test]
    fn closed_sprint_carries_watermark() {
        let mut sprint = create_test_sprint();
        sprint.closed = true;
        let chart = BurndownChart::new().now(at(2025, 1, 9, 12)).render(&sprint).unwrap();
        assert_eq!(chart.canvas.count_text("CLOSED"), 1);
    }

    #[test]
    fn too_short_chart_is_rejected() {
        let sprint = create_test_sprint();
        let result = BurndownChart::new()
            .chart_height(MILESTONE_ROW_HEIGHT + 10)
            .render(&sprint);
        assert!(matches!(result, Err(RenderError::InvalidData(_))));

        let chart = BurndownChart::new().chart_height(200).render(&sprint).unwrap();
        assert_eq!(chart.height, 200);
    }

    #[test]
    fn unknown_worklog_author_is_an_error() {
        let mut sprint = create_test_sprint();
        sprint.worklogs.push(log(99, at(2025, 1, 7, 9), 1));
        let result = BurndownChart::new().render(&sprint);
        assert!(matches!(result, Err(RenderError::UnknownUser(id)) if id == "99"));
    }

    #[test]
    fn remaining_line_stops_before_now() {
        let mut sprint = create_test_sprint();
        sprint.worklogs.push(log(1, at(2025, 1, 6, 9), 4));
        sprint.worklogs.push(log(2, at(2025, 1, 7, 9), 4));
        sprint.worklogs.push(log(2, at(2025, 1, 9, 9), 4));
        let chart = BurndownChart::new().now(at(2025, 1, 8, 12)).render(&sprint).unwrap();

        let days: Vec<&str> = chart
            .canvas
            .regions
            .iter()
            .filter(|r| r.task.is_none() && r.tooltip.len() == 3)
            .map(|r| r.tooltip[0].as_str())
            .collect();
        assert_eq!(days, vec!["2025-01-06", "2025-01-07"]);
    }

    #[test]
    fn release_after_end_uses_delay_color() {
        let mut sprint = create_test_sprint();
        sprint.release = Some(at(2025, 1, 14, 12));
        let style = ChartStyle::light();
        let chart = BurndownChart::new().render(&sprint).unwrap();
        let lines = chart
            .canvas
            .commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Line { color, stroke, .. } if *color == style.delay && stroke.width == 1.0))
            .count();
        assert_eq!(lines, 1);
    }

    #[test]
    fn empty_sprint_still_renders_axis() {
        let mut sprint = Sprint::new(2, "Empty");
        sprint.start = Some(at(2025, 1, 6, 8));
        sprint.end = Some(at(2025, 1, 10, 16));
        let chart = BurndownChart::new().render(&sprint).unwrap();
        assert_eq!(chart.width, Y_AXIS_WIDTH + 5 * MAX_DAY_WIDTH);
        assert_eq!(chart.canvas.count_text("0pd"), 0);
    }
}
