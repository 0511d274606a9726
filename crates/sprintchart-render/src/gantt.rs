//! Gantt layout engine and chart renderer.
//!
//! The layout pass assigns one lane per valid task in outline order and
//! derives bar geometry, shape and relation connectors. The renderer then
//! paints the calendar, milestones and every lane onto a [`Canvas`].
//!
//! Features:
//! - Milestone diamonds, story frames and "no detailed schedule" ribbons
//! - Task bars in the assignee's author color with progress sub-bars
//! - Critical path borders and right-angle relation connectors
//! - Conflict, manual scheduling and out-of-office markers
//! - Tooltip hit regions for an image map

use crate::authors::AuthorRegistry;
use crate::calendar::{CalendarAxis, MAX_DAY_WIDTH, MILESTONE_ROW_HEIGHT};
use crate::canvas::{
    ApproximateTextMeasure, Canvas, Chart, Point, Rect, Stroke, TextAlign, TextMeasure,
};
use crate::milestones::{symbol, MilestoneTimeline};
use crate::style::{is_weekend, ChartStyle, Color};
use crate::utilization::UtilizationTable;
use chrono::NaiveDateTime;
use sprintchart_core::{RenderError, Renderer, Sprint, Task, TaskId};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, warn};

/// Height of one text line inside a lane
pub const LINE_HEIGHT: i32 = 18;
/// Extra height of a lane on top of its text lines
pub const LANE_PADDING: i32 = 4;
/// Vertical inset of a task body inside its lane
pub const TASK_BODY_BORDER: i32 = 4;
/// Gap between two lanes
pub const LANE_GAP: i32 = 1;
/// Seconds from 08:00 to 16:30, lunch included
pub const GANTT_SECONDS_PER_DAY: i64 = 85 * 6 * 60;
pub const DEFAULT_PRE_RUN_DAYS: i64 = 7;
pub const DEFAULT_POST_RUN_DAYS: i64 = 14;

const RELATION_CORNER_LENGTH: i32 = 14;
const RESOURCE_NAME_TO_TASK_GAP: i32 = 3;
const TASK_NAME_TO_TASK_GAP: i32 = 13;
const STORY_FRAME: i32 = 2;
const ARROW_SIZE: i32 = 5;
const RIBBON_OFFSET: i32 = 25;
const RIBBON_WIDTH: i32 = 16;
const NON_WORKING_ALPHA: u8 = 64;

// ============================================================================
// Layout model
// ============================================================================

/// How a task is drawn, derived once at layout time
#[derive(Clone, Debug, PartialEq)]
pub enum TaskShape {
    /// Zero duration and no children: a diamond
    Milestone,
    /// Has children: a frame, or a striped ribbon carrying the marker text
    Story { ribbon: Option<String> },
    /// Everything else: a bar with optional progress in `0.0..=1.0`
    LeafTask { progress: Option<f64> },
}

impl TaskShape {
    /// First match wins: milestone, story, leaf task
    pub fn classify(task: &Task, ribbon: Option<String>) -> Self {
        if task.is_zero_duration() && task.is_leaf() {
            TaskShape::Milestone
        } else if task.is_story() {
            TaskShape::Story { ribbon }
        } else {
            TaskShape::LeafTask {
                progress: task.progress.map(|p| p.clamp(0.0, 1.0)),
            }
        }
    }
}

/// Geometry of one lane
#[derive(Clone, Debug, PartialEq)]
pub struct TaskLayout {
    pub task: TaskId,
    pub lane: usize,
    /// Top of the lane
    pub y: i32,
    pub height: i32,
    pub x1: i32,
    pub x2: i32,
    pub start: NaiveDateTime,
    pub finish: NaiveDateTime,
    pub shape: TaskShape,
    pub critical: bool,
    /// Upstream task warnings followed by those found during layout
    pub warnings: Vec<String>,
}

impl TaskLayout {
    pub fn center_y(&self) -> i32 {
        self.y + self.height / 2
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn body_top(&self) -> i32 {
        self.y + TASK_BODY_BORDER
    }

    pub fn body_height(&self) -> i32 {
        self.height - 2 * TASK_BODY_BORDER
    }

    /// Vertical extent of the lane, `[y, bottom)`
    pub fn lane_range(&self) -> std::ops::Range<i32> {
        self.y..self.bottom()
    }
}

/// Right-angle connector from a predecessor's finish to a successor's start
#[derive(Clone, Debug, PartialEq)]
pub struct Connector {
    pub predecessor: TaskId,
    pub successor: TaskId,
    /// Horizontal segment, then vertical segment
    pub path: Vec<Point>,
    pub arrow: Vec<Point>,
    pub critical: bool,
    /// The successor lies below the predecessor
    pub downward: bool,
}

/// Per-task problems that do not abort the chart
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("task {task} '{name}' has no {missing} date and cannot be placed")]
    Unscheduled {
        task: TaskId,
        name: String,
        missing: &'static str,
    },

    #[error("task {task} depends on task {predecessor}, which is not on the chart")]
    MissingPredecessor { task: TaskId, predecessor: TaskId },
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GanttLayout {
    pub lanes: Vec<TaskLayout>,
    pub connectors: Vec<Connector>,
    pub errors: Vec<LayoutError>,
    /// Height of all lanes, gaps included
    pub body_height: i32,
}

impl GanttLayout {
    pub fn lane_of(&self, task: TaskId) -> Option<&TaskLayout> {
        self.lanes.iter().find(|l| l.task == task)
    }
}

// ============================================================================
// Layout engine
// ============================================================================

/// Assigns lanes and bar geometry against a calendar axis
#[derive(Clone, Debug)]
pub struct GanttLayoutEngine<'a> {
    axis: &'a CalendarAxis,
    top: i32,
    lines_per_task: i32,
    ribbon_marker: String,
}

impl<'a> GanttLayoutEngine<'a> {
    pub fn new(axis: &'a CalendarAxis) -> Self {
        Self {
            axis,
            top: 0,
            lines_per_task: 1,
            ribbon_marker: "no detailed schedule".to_string(),
        }
    }

    /// Y of the first lane
    pub fn top(mut self, y: i32) -> Self {
        self.top = y;
        self
    }

    pub fn lines_per_task(mut self, lines: i32) -> Self {
        self.lines_per_task = lines.max(1);
        self
    }

    /// Text carried by stories without any scheduled child
    pub fn ribbon_marker(mut self, marker: impl Into<String>) -> Self {
        self.ribbon_marker = marker.into();
        self
    }

    pub fn lane_height(&self) -> i32 {
        LINE_HEIGHT * self.lines_per_task + LANE_PADDING
    }

    /// Bar x of an instant, shifted left by half a day onto the day boundary
    pub fn x(&self, instant: NaiveDateTime) -> i32 {
        self.axis.instant_x(instant) - self.axis.day_width() / 2
    }

    pub fn layout(&self, sprint: &Sprint) -> GanttLayout {
        let mut layout = GanttLayout::default();
        let lane_height = self.lane_height();
        let mut y = self.top;

        for task in sprint.tasks.iter().filter(|t| t.valid) {
            let (start, finish) = match (task.start, task.finish) {
                (Some(start), Some(finish)) => (start, finish),
                (start, _) => {
                    let error = LayoutError::Unscheduled {
                        task: task.id,
                        name: task.name.clone(),
                        missing: if start.is_none() { "start" } else { "finish" },
                    };
                    warn!("{error}");
                    layout.errors.push(error);
                    continue;
                }
            };

            let x1 = self.x(start);
            let x2 = self.x(finish).max(x1 + 1);
            let ribbon = (!task.children.is_empty() && !has_scheduled_child(sprint, task))
                .then(|| self.ribbon_marker.clone());

            layout.lanes.push(TaskLayout {
                task: task.id,
                lane: layout.lanes.len(),
                y,
                height: lane_height,
                x1,
                x2,
                start,
                finish,
                shape: TaskShape::classify(task, ribbon),
                critical: task.critical,
                warnings: task_warnings(sprint, task, start),
            });
            y += lane_height + LANE_GAP;
        }
        layout.body_height = y - self.top;

        let (connectors, errors) = self.route(sprint, &layout);
        layout.connectors = connectors;
        layout.errors.extend(errors);
        debug!(
            lanes = layout.lanes.len(),
            connectors = layout.connectors.len(),
            errors = layout.errors.len(),
            "gantt layout"
        );
        layout
    }

    fn route(&self, sprint: &Sprint, layout: &GanttLayout) -> (Vec<Connector>, Vec<LayoutError>) {
        let by_id: HashMap<TaskId, &TaskLayout> =
            layout.lanes.iter().map(|l| (l.task, l)).collect();
        let mut connectors = Vec::new();
        let mut errors = Vec::new();

        for successor in &layout.lanes {
            let Some(task) = sprint.task(successor.task) else {
                continue;
            };
            for relation in &task.predecessors {
                match by_id.get(&relation.predecessor) {
                    Some(predecessor) => connectors.push(connect(predecessor, successor)),
                    None => {
                        let error = LayoutError::MissingPredecessor {
                            task: task.id,
                            predecessor: relation.predecessor,
                        };
                        warn!("{error}");
                        errors.push(error);
                    }
                }
            }
        }
        (connectors, errors)
    }
}

fn has_scheduled_child(sprint: &Sprint, story: &Task) -> bool {
    story
        .children
        .iter()
        .filter_map(|id| sprint.task(*id))
        .any(|child| child.start.is_some() && child.finish.is_some())
}

fn task_warnings(sprint: &Sprint, task: &Task, start: NaiveDateTime) -> Vec<String> {
    let mut warnings = task.warnings.clone();
    if let Some(progress) = task.progress.filter(|p| !(0.0..=1.0).contains(p)) {
        warnings.push(format!("progress {progress} is outside 0..1"));
    }
    for relation in &task.predecessors {
        let late = sprint
            .task(relation.predecessor)
            .and_then(|p| p.finish)
            .is_some_and(|finish| finish > start);
        if late {
            warnings.push(format!(
                "starts before predecessor {} finishes",
                relation.predecessor
            ));
        }
    }
    for conflict in sprint.conflicts_for(task.id).filter(|c| c.original_conflict) {
        warnings.push(format!(
            "resource conflict from {} to {}",
            conflict.start.format("%Y-%m-%d %H:%M"),
            conflict.finish.format("%Y-%m-%d %H:%M")
        ));
    }
    warnings
}

fn connect(predecessor: &TaskLayout, successor: &TaskLayout) -> Connector {
    let y1 = predecessor.center_y();
    let inset = successor.height / 2 - TASK_BODY_BORDER;
    let downward = successor.center_y() > y1;
    let x1 = predecessor.x2;
    let x2 = successor.x1 + RELATION_CORNER_LENGTH - RESOURCE_NAME_TO_TASK_GAP;

    let (y2, y3, arrow) = if downward {
        let y2 = successor.center_y() - inset;
        let base = y2 - ARROW_SIZE + 1;
        (
            y2,
            y2 - ARROW_SIZE,
            vec![
                Point::new(x2 - ARROW_SIZE, base),
                Point::new(x2 + ARROW_SIZE, base),
                Point::new(x2, y2 + 1),
            ],
        )
    } else {
        let y2 = successor.center_y() + inset;
        let base = y2 + ARROW_SIZE - 1;
        (
            y2,
            y2 + ARROW_SIZE,
            vec![
                Point::new(x2 + ARROW_SIZE, base),
                Point::new(x2 - ARROW_SIZE, base),
                Point::new(x2, y2 - 1),
            ],
        )
    };

    Connector {
        predecessor: predecessor.task,
        successor: successor.task,
        path: vec![Point::new(x1 + 1, y1), Point::new(x2, y1), Point::new(x2, y3)],
        arrow,
        critical: predecessor.critical && successor.critical,
        downward,
    }
}

// ============================================================================
// Chart renderer
// ============================================================================

/// Gantt chart renderer configuration
#[derive(Clone, Debug)]
pub struct GanttChart {
    /// Current instant, shown as the "now" milestone
    pub now: Option<NaiveDateTime>,
    /// Fit the days into this width; `None` uses the widest day column
    pub chart_width: Option<i32>,
    pub pre_run: i64,
    pub post_run: i64,
    pub lines_per_task: i32,
    /// Draw the task id column at the left edge
    pub show_ids: bool,
    pub ribbon_marker: String,
    pub style: ChartStyle,
}

impl Default for GanttChart {
    fn default() -> Self {
        Self {
            now: None,
            chart_width: None,
            pre_run: DEFAULT_PRE_RUN_DAYS,
            post_run: DEFAULT_POST_RUN_DAYS,
            lines_per_task: 1,
            show_ids: true,
            ribbon_marker: "no detailed schedule".to_string(),
            style: ChartStyle::light(),
        }
    }
}

impl GanttChart {
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

    pub fn pre_run(mut self, days: i64) -> Self {
        self.pre_run = days;
        self
    }

    pub fn post_run(mut self, days: i64) -> Self {
        self.post_run = days;
        self
    }

    pub fn lines_per_task(mut self, lines: i32) -> Self {
        self.lines_per_task = lines;
        self
    }

    pub fn hide_ids(mut self) -> Self {
        self.show_ids = false;
        self
    }

    pub fn ribbon_marker(mut self, marker: impl Into<String>) -> Self {
        self.ribbon_marker = marker.into();
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

    /// Now, start, end and release milestones of a sprint
    pub fn timeline(&self, sprint: &Sprint) -> Result<MilestoneTimeline, RenderError> {
        let blue = Color::rgb(0, 0, 0xff);
        let mut timeline = MilestoneTimeline::new();
        timeline.add(self.now.map(|n| n.date()), symbol::NOW, "Now (current date)", blue);
        timeline.add(
            sprint.earliest_start().map(|s| s.date()),
            symbol::START,
            "Start (start of sprint)",
            blue,
        );
        timeline.add(
            sprint.latest_finish().map(|f| f.date()),
            symbol::END,
            "End (end of sprint)",
            blue,
        );
        timeline.add(
            sprint.release.map(|r| r.date()),
            symbol::RELEASE,
            "Release (planned release)",
            self.style.delay,
        );
        timeline.hide_stale_now(sprint.closed);
        timeline.calculate()?;
        Ok(timeline)
    }

    /// Calendar axis over the timeline, padded by pre-run and post-run
    pub fn axis(&self, timeline: &MilestoneTimeline) -> Result<CalendarAxis, RenderError> {
        let axis = CalendarAxis::from_timeline(timeline)?
            .pre_run(self.pre_run)
            .post_run(self.post_run)
            .with_seconds_per_day(GANTT_SECONDS_PER_DAY);
        Ok(match self.chart_width {
            Some(width) => {
                let fitted = axis.fit_width(width);
                let day_width = fitted.day_width().clamp(1, MAX_DAY_WIDTH);
                fitted.with_day_width(day_width)
            }
            None => axis.with_day_width(MAX_DAY_WIDTH),
        })
    }

    /// Render and also return the layout, including per-task errors
    pub fn render_with_layout(&self, sprint: &Sprint) -> Result<(Chart, GanttLayout), RenderError> {
        self.render_measured(sprint, &ApproximateTextMeasure)
    }

    pub fn render_measured(
        &self,
        sprint: &Sprint,
        measure: &dyn TextMeasure,
    ) -> Result<(Chart, GanttLayout), RenderError> {
        let timeline = self.timeline(sprint)?;
        let axis = self.axis(&timeline)?;
        let header_top = MILESTONE_ROW_HEIGHT;
        let body_top = header_top + axis.header_height();

        let layout = GanttLayoutEngine::new(&axis)
            .top(body_top)
            .lines_per_task(self.lines_per_task)
            .ribbon_marker(self.ribbon_marker.clone())
            .layout(sprint);

        let width = axis.width();
        let height = body_top + layout.body_height;
        debug!(width, height, day_width = axis.day_width(), "gantt chart size");

        let mut painter = GanttPainter {
            sprint,
            axis: &axis,
            style: &self.style,
            measure,
            canvas: Canvas::new(),
            utilization: UtilizationTable::from_sprint(sprint, &axis),
            authors: assignee_registry(sprint),
            lines_per_task: self.lines_per_task,
        };
        painter
            .canvas
            .fill_rect(0, 0, width, height, self.style.background);
        axis.draw(
            &mut painter.canvas,
            &self.style,
            measure,
            header_top,
            layout.body_height,
        );
        timeline.draw(&mut painter.canvas, &axis, &self.style, 0, height);
        for lane in &layout.lanes {
            painter.draw_lane(lane, self.show_ids);
        }
        for connector in &layout.connectors {
            painter.draw_connector(connector);
        }

        let chart = Chart {
            width,
            height,
            canvas: painter.canvas,
        };
        Ok((chart, layout))
    }
}

impl Renderer for GanttChart {
    type Output = Chart;

    fn render(&self, sprint: &Sprint) -> Result<Chart, RenderError> {
        self.render_with_layout(sprint).map(|(chart, _)| chart)
    }
}

/// Assignees of valid tasks, colored in roster order
fn assignee_registry(sprint: &Sprint) -> AuthorRegistry {
    let mut names: Vec<&str> = sprint
        .tasks
        .iter()
        .filter(|t| t.valid)
        .filter_map(|t| t.resource)
        .filter_map(|id| sprint.user(id))
        .map(|u| u.name.as_str())
        .collect();
    names.sort_unstable();
    names.dedup();

    let mut registry = AuthorRegistry::new();
    for name in names {
        registry.add(name);
    }
    registry.calculate_colors(&sprint.users, true);
    registry
}

/// Per-render drawing state
struct GanttPainter<'a> {
    sprint: &'a Sprint,
    axis: &'a CalendarAxis,
    style: &'a ChartStyle,
    measure: &'a dyn TextMeasure,
    canvas: Canvas,
    utilization: UtilizationTable,
    authors: AuthorRegistry,
    lines_per_task: i32,
}

impl GanttPainter<'_> {
    fn draw_lane(&mut self, lane: &TaskLayout, show_ids: bool) {
        let sprint = self.sprint;
        let Some(task) = sprint.task(lane.task) else {
            return;
        };
        if matches!(lane.shape, TaskShape::LeafTask { .. }) {
            self.draw_out_of_office(task, lane);
        }
        match &lane.shape {
            TaskShape::Milestone => self.draw_milestone(task, lane),
            TaskShape::Story { ribbon } => self.draw_story(task, lane, ribbon.as_deref()),
            TaskShape::LeafTask { progress } => self.draw_leaf(task, lane, *progress),
        }
        if show_ids {
            self.draw_id(task, lane);
        }
    }

    fn draw_id(&mut self, task: &Task, lane: &TaskLayout) {
        let dw = self.axis.day_width();
        let x = self.axis.origin_x();
        self.canvas
            .fill_rect(x + 1, lane.y, dw - 1, lane.height, self.style.id_band);
        self.canvas.text(
            x + 4,
            lane.center_y(),
            format!("{:02}", task.id),
            &self.style.font,
            self.style.id_text,
            TextAlign::Left,
        );
    }

    /// Translucent band and an "O" on every day the assignee is away
    fn draw_out_of_office(&mut self, task: &Task, lane: &TaskLayout) {
        let Some(series) = task.resource.and_then(|id| self.utilization.get(id)) else {
            return;
        };
        let (Some(first), Some(last)) = (self.sprint.earliest_start(), self.sprint.latest_finish())
        else {
            return;
        };
        let dw = self.axis.day_width();
        let last = last.date();
        for day in first.date().iter_days().take_while(|d| *d < last) {
            if !series.is_out_of_office(self.axis.day_index(day)) {
                continue;
            }
            let x = self.axis.day_x(day);
            self.canvas.fill_rect(
                x - (dw / 2 - 1),
                lane.y,
                dw - 1,
                lane.height,
                self.style.out_of_office,
            );
            self.canvas.text(
                x,
                lane.center_y(),
                "O",
                &self.style.out_of_office_font,
                self.style.out_of_office_text,
                TextAlign::Center,
            );
        }
    }

    fn draw_milestone(&mut self, task: &Task, lane: &TaskLayout) {
        let half = lane.height / 2 - TASK_BODY_BORDER;
        let (x, y) = (lane.x1, lane.center_y());
        self.canvas.polygon(
            vec![
                Point::new(x, y - half),
                Point::new(x + half, y),
                Point::new(x, y + half),
                Point::new(x - half, y),
            ],
            self.style.milestone,
        );
        if task.is_manual() {
            self.canvas
                .fill_rect(x, lane.y, 1, lane.height, self.style.manual_marker);
        }
        self.canvas.text(
            x + 10 + half / 2,
            y,
            format!("{} ({})", task.name, lane.start.format("%Y-%m-%d %H:%M")),
            &self.style.font,
            self.style.task_text,
            TextAlign::Left,
        );
        let tooltip = self.tooltip(task, lane, None);
        self.canvas.region(
            Rect::from_corners(x - half, lane.y, x + half, lane.bottom()),
            Some(task.id),
            tooltip,
        );
    }

    fn draw_story(&mut self, task: &Task, lane: &TaskLayout, ribbon: Option<&str>) {
        let (x1, x2) = (lane.x1, lane.x2);
        match ribbon {
            None => {
                self.draw_tick(lane.start, x1, lane, TextAlign::Right);
                self.draw_tick(lane.finish, x2, lane, TextAlign::Left);
                let top = lane.body_top();
                let side = lane.body_height() - STORY_FRAME;
                let color = self.style.story;
                self.canvas.fill_rect(x1, top, x2 - x1 + 1, STORY_FRAME, color);
                self.canvas
                    .fill_rect(x1, top + STORY_FRAME, STORY_FRAME, side, color);
                self.canvas
                    .fill_rect(x2 - 1, top + STORY_FRAME, STORY_FRAME, side, color);
            }
            Some(_) => self.draw_ribbon(lane, self.style.story),
        }
        self.canvas.text(
            x2 + 10,
            lane.center_y(),
            task.name.clone(),
            &self.style.story_font,
            self.style.story_text,
            TextAlign::Left,
        );
        let tooltip = self.tooltip(task, lane, ribbon);
        self.region(task, lane, tooltip);
    }

    /// Alternating slanted stripes clipped to the bar
    fn draw_ribbon(&mut self, lane: &TaskLayout, color: Color) {
        let (left, right) = (lane.x1 + 1, lane.x2);
        let y1 = lane.y + 1;
        let y2 = y1 + lane.height - 2;
        let clip = |x: i32| x.clamp(left, right);
        let mut stripe = color;
        let mut x = lane.x1 - RIBBON_WIDTH;
        while x < lane.x2 {
            let w = RIBBON_WIDTH - 1;
            self.canvas.polygon(
                vec![
                    Point::new(clip(x), y2),
                    Point::new(clip(x + RIBBON_OFFSET), y1),
                    Point::new(clip(x + RIBBON_OFFSET + w), y1),
                    Point::new(clip(x + w), y2),
                ],
                stripe,
            );
            stripe = if stripe == color { Color::WHITE } else { color };
            x += RIBBON_WIDTH;
        }
    }

    fn draw_leaf(&mut self, task: &Task, lane: &TaskLayout, progress: Option<f64>) {
        let fill = task
            .resource
            .and_then(|id| self.sprint.user(id))
            .and_then(|user| self.authors.color_of_user(user))
            .unwrap_or(self.style.task_fill);
        let (x1, x2) = (lane.x1, lane.x2);

        if x2 - x1 - 2 > 0 {
            self.draw_tick(lane.start, x1, lane, TextAlign::Right);
            self.draw_tick(lane.finish, x2, lane, TextAlign::Left);
            self.draw_day_segments(lane, fill);
        } else {
            self.canvas
                .fill_rect(x1, lane.body_top(), 1, lane.body_height(), fill);
        }

        if let Some(progress) = progress.filter(|p| *p > 0.0 && self.lines_per_task == 1) {
            self.draw_progress(lane, progress);
        }
        self.draw_conflicts(task, lane);
        self.draw_border(lane);
        if task.is_manual() {
            self.canvas
                .fill_rect(x1, lane.y, 1, lane.height, self.style.manual_marker);
            self.canvas.text(
                x1 - RESOURCE_NAME_TO_TASK_GAP,
                lane.bottom() - TASK_BODY_BORDER,
                lane.start.format("%Y-%m-%d %H:%M").to_string(),
                &self.style.small_font,
                self.style.manual_marker,
                TextAlign::Right,
            );
        }

        self.canvas.text(
            x2 + TASK_NAME_TO_TASK_GAP,
            lane.center_y(),
            task.name.clone(),
            &self.style.font,
            self.style.task_text,
            TextAlign::Left,
        );
        if let Some(name) = self.resource_name(task) {
            self.canvas.text(
                x1 - RESOURCE_NAME_TO_TASK_GAP,
                lane.y + LINE_HEIGHT / 2 - 1,
                name,
                &self.style.font,
                self.style.task_text,
                TextAlign::Right,
            );
        }
        let tooltip = self.tooltip(task, lane, None);
        self.region(task, lane, tooltip);
    }

    /// One body segment per day; non-working days are nearly transparent
    fn draw_day_segments(&mut self, lane: &TaskLayout, fill: Color) {
        let dw = self.axis.day_width();
        let last = lane.finish.date();
        for day in lane.start.date().iter_days().take_while(|d| *d <= last) {
            let left = self.axis.day_left(day).max(lane.x1);
            let right = (self.axis.day_left(day) + dw).min(lane.x2);
            if right <= left {
                continue;
            }
            let color = if is_weekend(day) {
                fill.with_alpha(NON_WORKING_ALPHA)
            } else {
                fill
            };
            self.canvas
                .fill_rect(left, lane.body_top(), right - left, lane.body_height(), color);
        }
    }

    fn draw_progress(&mut self, lane: &TaskLayout, progress: f64) {
        let span = lane.x2 - lane.x1;
        let done = (f64::from(span) * progress) as i32 - 1;
        self.canvas.fill_rect(
            lane.x1,
            lane.y + 3,
            done.max(0),
            lane.height - 6,
            self.style.progress,
        );
        if progress < 1.0 {
            self.canvas
                .fill_rect(lane.x1 + done, lane.y + 2, 1, lane.height - 4, Color::BLACK);
        }
        let label = format!("{:2.0}%", progress * 100.0);
        if self.measure.text_width(&label, &self.style.small_font) < span {
            self.canvas.text(
                lane.x1 + span / 2 + 1,
                lane.center_y(),
                label,
                &self.style.small_font,
                self.style.progress_text,
                TextAlign::Center,
            );
        }
    }

    fn draw_conflicts(&mut self, task: &Task, lane: &TaskLayout) {
        let half_day = self.axis.day_width() / 2;
        let conflicts: Vec<(i32, i32)> = self
            .sprint
            .conflicts_for(task.id)
            .filter(|c| c.original_conflict)
            .map(|c| {
                (
                    self.axis.instant_x(c.start) - half_day,
                    self.axis.instant_x(c.finish) - half_day,
                )
            })
            .collect();
        for (c1, c2) in conflicts {
            let width = (c2 - c1 - 1).max(1);
            self.canvas
                .fill_rect(c1, lane.y, width, 2, self.style.conflict);
            self.canvas
                .fill_rect(c1, lane.bottom() - 1, width, 2, self.style.conflict);
        }
    }

    fn draw_border(&mut self, lane: &TaskLayout) {
        let color = if lane.critical {
            self.style.critical_task_border
        } else {
            self.style.task_border
        };
        let (x1, x2) = (lane.x1, lane.x2);
        let top = lane.body_top();
        let bottom = top + lane.body_height() - 1;
        let side = lane.body_height() - 2;
        self.canvas.fill_rect(x1, top, x2 - x1 + 1, 1, color);
        self.canvas.fill_rect(x1, bottom, x2 - x1 + 1, 1, color);
        self.canvas.fill_rect(x1, top + 1, 1, side, color);
        self.canvas.fill_rect(x2, top + 1, 1, side, color);
    }

    /// Short tick above the bar end with the time of day
    fn draw_tick(&mut self, time: NaiveDateTime, x: i32, lane: &TaskLayout, align: TextAlign) {
        let y = lane.body_top() - 2;
        self.canvas.fill_rect(x, y, 1, 2, self.style.tick_line);
        self.canvas.text(
            x,
            y - 2,
            time.format("%H:%M").to_string(),
            &self.style.tick_font,
            self.style.tick_label,
            align,
        );
    }

    fn draw_connector(&mut self, connector: &Connector) {
        let color = if connector.critical {
            self.style.critical_relation
        } else {
            self.style.relation
        };
        for pair in connector.path.windows(2) {
            self.canvas.line(
                pair[0].x,
                pair[0].y,
                pair[1].x,
                pair[1].y,
                color,
                Stroke::solid(1.0),
            );
        }
        self.canvas.polygon(connector.arrow.clone(), color);
    }

    fn region(&mut self, task: &Task, lane: &TaskLayout, tooltip: Vec<String>) {
        // Inset by the border unless that would leave nothing to hit
        let rect = if lane.x2 - lane.x1 > 2 {
            Rect::from_corners(lane.x1 + 1, lane.y, lane.x2 - 1, lane.bottom())
        } else {
            Rect::new(lane.x1, lane.y, (lane.x2 - lane.x1).max(1), lane.height)
        };
        self.canvas.region(
            rect,
            Some(task.id),
            tooltip,
        );
    }

    fn resource_name(&self, task: &Task) -> Option<String> {
        let id = task.resource?;
        Some(match self.sprint.user(id) {
            Some(user) => user.name.clone(),
            None => format!("#{id}"),
        })
    }

    fn tooltip(&self, task: &Task, lane: &TaskLayout, marker: Option<&str>) -> Vec<String> {
        const STAMP: &str = "%Y-%m-%d %H:%M:%S";
        let mut lines = Vec::new();
        if let Some(marker) = marker {
            lines.push(marker.to_string());
        }
        let leaf = matches!(lane.shape, TaskShape::LeafTask { .. });
        if let Some(name) = self.resource_name(task) {
            let availability = task
                .resource
                .and_then(|id| self.sprint.user(id))
                .map_or(1.0, |u| u.availability);
            lines.push(format!("Resource {name} {:.0}%", availability * 100.0));
        } else if leaf {
            lines.push("Resource -".to_string());
        }
        lines.push(format!("Duration {}", task.duration));
        lines.push(format!("Start {}", lane.start.format(STAMP)));
        lines.push(format!("Finish {}", lane.finish.format(STAMP)));
        if let TaskShape::LeafTask {
            progress: Some(progress),
        } = lane.shape
        {
            lines.push(format!("Progress {:2.0}%", progress * 100.0));
        }
        if let Some(notes) = &task.notes {
            lines.push(format!("Notes {notes}"));
        }
        lines.extend(lane.warnings.iter().map(|w| format!("Warning {w}")));
        lines
    }
}
