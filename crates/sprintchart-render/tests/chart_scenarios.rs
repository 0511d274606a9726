//! End-to-end chart engine scenarios
//!
//! Exercises the calendar axis, burndown accumulation, utilization series,
//! author colors and Gantt lanes through the public API only.

use chrono::{NaiveDate, NaiveDateTime};
use pretty_assertions::assert_eq;
use sprintchart_core::{Duration, OffDay, OffDayType, Renderer, Sprint, Task, User};
use sprintchart_render::{
    AuthorRegistry, Band, BurndownAccumulator, CalendarAxis, GanttChart, GanttLayoutEngine,
    MilestoneTimeline, UtilizationKind, UtilizationSeries, Color, AUTHOR_PALETTE,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
    date(y, m, d).and_hms_opt(h, 0, 0).unwrap()
}

fn week_axis() -> CalendarAxis {
    CalendarAxis::new(date(2025, 1, 6), date(2025, 1, 10))
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn scenario_a_five_day_axis() {
    let mut timeline = MilestoneTimeline::new();
    timeline.add(Some(date(2025, 1, 6)), "S", "Start", Color::BLACK);
    timeline.add(Some(date(2025, 1, 10)), "E", "End", Color::BLACK);
    timeline.calculate().unwrap();

    let axis = CalendarAxis::from_timeline(&timeline).unwrap().fit_width(500);

    assert_eq!(axis.total_days(), 5);
    assert_eq!(axis.day_width(), 100);
    assert_eq!(axis.day_x(date(2025, 1, 8)), axis.origin_x() + 50 + 200);
}

#[test]
fn scenario_b_burndown_curve() {
    let mut acc = BurndownAccumulator::new(5);
    acc.add(2, Duration::minutes(10));
    acc.finalize();

    let expected: Vec<Duration> = [10, 10, 10, 0, 0, 0].into_iter().map(Duration::minutes).collect();
    assert_eq!(acc.curve().unwrap(), expected.as_slice());
}

#[test]
fn scenario_c_vacation_series() {
    let axis = week_axis();
    let mut series = UtilizationSeries::new(5);
    series.add_off_day(
        &axis,
        &OffDay::new(OffDayType::Vacation, date(2025, 1, 7), date(2025, 1, 8)),
    );

    let vacation: Vec<f64> = (0..5)
        .map(|i| series.get(UtilizationKind::Vacation, i).unwrap())
        .collect();
    assert_eq!(vacation, vec![0.0, 1.0, 1.0, 0.0, 0.0]);
}

#[test]
fn scenario_c_index_zero_is_never_written() {
    let axis = week_axis();
    let mut series = UtilizationSeries::new(5);
    series.add_off_day(
        &axis,
        &OffDay::new(OffDayType::Sick, date(2025, 1, 6), date(2025, 1, 6)),
    );
    assert_eq!(series.get(UtilizationKind::Sickness, 0), Some(0.0));
}

#[test]
fn scenario_d_identical_tasks_get_separate_lanes() {
    let mut sprint = Sprint::new(1, "Parallel");
    sprint.tasks = vec![
        Task::new(1).name("Left").span(at(2025, 1, 6, 8), at(2025, 1, 8, 16)),
        Task::new(2).name("Right").span(at(2025, 1, 6, 8), at(2025, 1, 8, 16)),
    ];
    let axis = week_axis();
    let layout = GanttLayoutEngine::new(&axis).layout(&sprint);

    assert_eq!(layout.lanes.len(), 2);
    let (a, b) = (&layout.lanes[0], &layout.lanes[1]);
    assert_ne!(a.y, b.y);
    assert!(a.bottom() <= b.y || b.bottom() <= a.y);
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn pixel_x_is_monotonic() {
    let axis = CalendarAxis::new(date(2025, 1, 1), date(2025, 3, 31))
        .pre_run(7)
        .post_run(14)
        .with_day_width(3);
    assert_eq!(axis.day_index(axis.first()), 0);

    let days: Vec<NaiveDate> = axis.visible_days().collect();
    for pair in days.windows(2) {
        assert!(axis.day_x(pair[0]) < axis.day_x(pair[1]));
    }
}

#[test]
fn curve_conserves_work_and_never_rises() {
    let mut acc = BurndownAccumulator::new(10);
    for (day, minutes) in [(0, 30), (1, 0), (3, 90), (3, 15), (7, 240), (9, 5)] {
        assert!(acc.add(day, Duration::minutes(minutes)));
    }
    assert!(!acc.add(10, Duration::hours(1)));
    assert!(!acc.add(-1, Duration::hours(1)));

    let total = acc.total();
    let curve = acc.finalize().to_vec();
    assert_eq!(curve[0], total);
    assert_eq!(curve[10], Duration::zero());
    assert!(curve.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn lanes_never_overlap() {
    let mut sprint = Sprint::new(1, "Outline");
    sprint.tasks = vec![
        Task::new(1).name("Story").child(2).child(3).span(at(2025, 1, 6, 8), at(2025, 1, 10, 16)),
        Task::new(2).name("A").parent(1).span(at(2025, 1, 6, 8), at(2025, 1, 7, 16)),
        Task::new(3).name("B").parent(1).span(at(2025, 1, 7, 8), at(2025, 1, 10, 16)),
        Task::new(4).name("Placeholder").invalid(),
        Task::new(5).name("Done").milestone().span(at(2025, 1, 10, 16), at(2025, 1, 10, 16)),
    ];
    let axis = week_axis();
    let layout = GanttLayoutEngine::new(&axis).lines_per_task(2).layout(&sprint);

    assert_eq!(layout.lanes.len(), 4);
    for (i, a) in layout.lanes.iter().enumerate() {
        for b in &layout.lanes[i + 1..] {
            let a_range = a.lane_range();
            let b_range = b.lane_range();
            assert!(a_range.end <= b_range.start || b_range.end <= a_range.start);
        }
    }
}

fn colors_of(registry: &AuthorRegistry) -> Vec<(String, Option<Color>)> {
    registry.iter().map(|a| (a.name.clone(), a.color)).collect()
}

#[test]
fn author_colors_are_deterministic() {
    let roster = vec![
        User::new(1, "Alice").login("ali"),
        User::new(2, "Bob"),
    ];
    let run = || {
        let mut registry = AuthorRegistry::new();
        for name in ["zed", "Bob", "ali", "mia"] {
            registry.add(name);
        }
        registry.calculate_colors(&roster, true);
        colors_of(&registry)
    };
    assert_eq!(run(), run());
}

#[test]
fn later_name_takes_earlier_color_slot() {
    let mut registry = AuthorRegistry::new();
    registry.add("anna");
    registry.add("zoe");
    registry.calculate_colors(&[], false);

    assert_eq!(registry.color_of("zoe"), Some(AUTHOR_PALETTE[0]));
    assert_eq!(registry.color_of("anna"), Some(AUTHOR_PALETTE[1]));
}

#[test]
fn day_of_week_band_threshold() {
    assert!(!week_axis().with_day_width(9).is_visible(Band::DayOfWeek));
    assert!(week_axis().with_day_width(10).is_visible(Band::DayOfWeek));
}

#[test]
fn gantt_chart_reports_unscheduled_tasks() {
    let mut sprint = Sprint::new(1, "Partial");
    sprint.tasks = vec![
        Task::new(1).name("Placed").span(at(2025, 1, 6, 8), at(2025, 1, 7, 16)),
        Task::new(2).name("Floating"),
    ];
    let (chart, layout) = GanttChart::new().render_with_layout(&sprint).unwrap();

    assert_eq!(layout.lanes.len(), 1);
    assert_eq!(layout.errors.len(), 1);
    assert!(chart.width > 0 && chart.height > 0);
    assert!(GanttChart::new().render(&sprint).is_ok());
}
