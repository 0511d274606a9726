//! # sprintchart-render
//!
//! Calendar-driven chart engine for sprintchart sprints.
//!
//! This crate provides:
//! - The calendar coordinate system and milestone timeline every chart shares
//! - Burndown accumulation and per-resource utilization series
//! - Deterministic author colors
//! - Gantt layout (lanes, shapes, relation connectors) and rendering
//! - Burndown chart and per-user year calendar renderers
//! - An SVG encoder for the resulting draw lists
//!
//! Renderers produce a [`Chart`]: a size plus an ordered list of draw
//! commands and hit regions. Encoding to pixels or markup is a separate step.
//!
//! ## Example
//!
//! ```rust,ignore
//! use sprintchart_core::{Renderer, Sprint};
//! use sprintchart_render::{BurndownChart, GanttChart, SvgEncoder};
//!
//! let gantt = GanttChart::new().chart_width(800).render(&sprint)?;
//! let svg = SvgEncoder::new().encode(&gantt)?;
//!
//! let burndown = BurndownChart::new().now(now).render(&sprint)?;
//! std::fs::write("burndown.svg", SvgEncoder::new().encode(&burndown)?)?;
//! ```

pub mod authors;
pub mod burndown;
pub mod burndown_chart;
pub mod calendar;
pub mod canvas;
pub mod gantt;
pub mod milestones;
pub mod style;
pub mod svg;
pub mod user_calendar;
pub mod utilization;

pub use authors::{author_color, Author, AuthorRegistry, AUTHOR_PALETTE};
pub use burndown::{working_time_on, BurndownAccumulator};
pub use burndown_chart::BurndownChart;
pub use calendar::{Band, CalendarAxis, MAX_DAY_WIDTH};
pub use canvas::{
    ApproximateTextMeasure, Canvas, Chart, DrawCommand, HitRegion, Point, Rect, Stroke,
    TextAlign, TextMeasure,
};
pub use gantt::{
    Connector, GanttChart, GanttLayout, GanttLayoutEngine, LayoutError, TaskLayout, TaskShape,
};
pub use milestones::{symbol, Milestone, MilestoneTimeline};
pub use style::{ChartStyle, Color, Font, OffDayColors};
pub use crate::svg::SvgEncoder;
pub use user_calendar::{OffDayCounts, UserCalendarChart};
pub use utilization::{UtilizationKind, UtilizationSeries, UtilizationTable};
