//! Calendar coordinate system.
//!
//! Maps calendar days and intra-day instants to horizontal pixels and back,
//! and draws the calendar header. Which header bands appear depends on the
//! day width: a band below its threshold is omitted, never shrunk.
//!
//! ```text
//! | year      2025                                      |
//! | month     Jan                  | Feb                |
//! | week      W2        | W3       | W4      | W5       |
//! | day       6 7 8 9 10 11 12 13 ...                   |
//! | weekday   M T W T F  S  S  M  ...                   |
//! ```

use crate::canvas::{Canvas, TextAlign, TextMeasure};
use crate::milestones::MilestoneTimeline;
use crate::style::{is_weekend, ChartStyle, Color};
use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, Weekday};
use sprintchart_core::{
    seconds_of_day, RenderError, SECONDS_PER_WORK_DAY, WORK_DAY_START_SECS,
};
use tracing::debug;

/// Widest day column any chart uses
pub const MAX_DAY_WIDTH: i32 = 20;

/// Height of the milestone flag row above the calendar bands
pub const MILESTONE_ROW_HEIGHT: i32 = 11 + 14;

const WEEKDAY_LETTERS: [&str; 7] = ["M", "T", "W", "T", "F", "S", "S"];
const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Shift a date by a signed number of days, saturating at the calendar limits
pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    let delta = Days::new(days.unsigned_abs());
    if days >= 0 {
        date.checked_add_days(delta).unwrap_or(NaiveDate::MAX)
    } else {
        date.checked_sub_days(delta).unwrap_or(NaiveDate::MIN)
    }
}

/// Whole days from `from` to `to` (negative if `to` is earlier)
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

// ============================================================================
// Bands
// ============================================================================

/// A horizontal strip of the calendar
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Band {
    /// Vertical day stripes behind the chart body
    DayBars,
    DayOfWeek,
    DayOfMonth,
    Week,
    Month,
    Year,
}

impl Band {
    /// Header bands, top to bottom
    pub const HEADER: [Band; 5] = [
        Band::Year,
        Band::Month,
        Band::Week,
        Band::DayOfMonth,
        Band::DayOfWeek,
    ];

    /// Paint passes, first to last
    pub const PAINT_ORDER: [Band; 6] = [
        Band::DayBars,
        Band::DayOfWeek,
        Band::DayOfMonth,
        Band::Week,
        Band::Month,
        Band::Year,
    ];

    /// Smallest day width (inclusive) at which the band is drawn
    pub const fn min_day_width(self) -> i32 {
        match self {
            Band::DayBars => 4,
            Band::DayOfWeek => 10,
            Band::DayOfMonth => 16,
            Band::Week => 2,
            Band::Month => 1,
            Band::Year => 0,
        }
    }

    /// Row height in the header, margin included
    pub const fn height(self) -> i32 {
        match self {
            Band::DayBars => 0,
            Band::DayOfWeek => 14,
            Band::DayOfMonth => 14,
            Band::Week => 14,
            Band::Month => 16,
            Band::Year => 17,
        }
    }

    /// Does a new box start on this day?
    fn starts_run(self, day: NaiveDate) -> bool {
        match self {
            Band::Week => day.weekday() == Weekday::Mon,
            Band::Month => day.day() == 1,
            Band::Year => day.ordinal() == 1,
            Band::DayBars | Band::DayOfWeek | Band::DayOfMonth => true,
        }
    }

    /// Natural last day of the box starting at `day`
    fn run_end(self, day: NaiveDate) -> NaiveDate {
        match self {
            Band::Week => add_days(day, 6 - i64::from(day.weekday().num_days_from_monday())),
            Band::Month => month_end(day),
            Band::Year => NaiveDate::from_ymd_opt(day.year(), 12, 31).unwrap_or(day),
            Band::DayBars | Band::DayOfWeek | Band::DayOfMonth => day,
        }
    }
}

fn month_end(day: NaiveDate) -> NaiveDate {
    let (year, month) = if day.month() == 12 {
        (day.year() + 1, 1)
    } else {
        (day.year(), day.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first| first.pred_opt())
        .unwrap_or(day)
}

/// One contiguous box of a band
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BandRun {
    pub first: NaiveDate,
    pub last: NaiveDate,
}

// ============================================================================
// CalendarAxis
// ============================================================================

/// Date to pixel mapping for one chart
///
/// Day index 0 is the first milestone. Pre-run days pad the visible range
/// before it, post-run days after the last milestone.
#[derive(Clone, Debug, PartialEq)]
pub struct CalendarAxis {
    first: NaiveDate,
    last: NaiveDate,
    pre_run: i64,
    post_run: i64,
    day_width: i32,
    origin_x: i32,
    seconds_per_day: i64,
    display_days: Option<i64>,
}

impl CalendarAxis {
    pub fn new(first: NaiveDate, last: NaiveDate) -> Self {
        Self {
            first,
            last: last.max(first),
            pre_run: 0,
            post_run: 0,
            day_width: MAX_DAY_WIDTH,
            origin_x: 0,
            seconds_per_day: SECONDS_PER_WORK_DAY,
            display_days: None,
        }
    }

    /// Anchor on the first and last milestone of a calculated timeline
    pub fn from_timeline(timeline: &MilestoneTimeline) -> Result<Self, RenderError> {
        Ok(Self::new(timeline.first()?, timeline.last()?))
    }

    /// Days of context before the first milestone
    pub fn pre_run(mut self, days: i64) -> Self {
        self.pre_run = days.max(0);
        self
    }

    /// Days of context after the last milestone
    pub fn post_run(mut self, days: i64) -> Self {
        self.post_run = days.max(0);
        self
    }

    /// Pixel x of the left edge of the first visible day
    pub fn origin(mut self, x: i32) -> Self {
        self.origin_x = x;
        self
    }

    /// Length of the day used to place intra-day instants
    pub fn with_seconds_per_day(mut self, seconds: i64) -> Self {
        self.seconds_per_day = seconds.max(1);
        self
    }

    /// Fixed day width
    pub fn with_day_width(mut self, width: i32) -> Self {
        self.day_width = width;
        self
    }

    /// Spread the spanned days over `chart_width` pixels
    pub fn fit_width(mut self, chart_width: i32) -> Self {
        let days = self.total_days().max(1);
        self.day_width = (i64::from(chart_width) / days) as i32;
        debug!(
            chart_width,
            days,
            day_width = self.day_width,
            "fitted calendar"
        );
        self
    }

    /// Number of day columns the chart actually shows, if wider than the span
    pub fn with_display_days(mut self, days: i64) -> Self {
        self.display_days = Some(days);
        self
    }

    pub fn first(&self) -> NaiveDate {
        self.first
    }

    pub fn last(&self) -> NaiveDate {
        self.last
    }

    pub fn day_width(&self) -> i32 {
        self.day_width
    }

    pub fn origin_x(&self) -> i32 {
        self.origin_x
    }

    pub fn pre_run_days(&self) -> i64 {
        self.pre_run
    }

    pub fn post_run_days(&self) -> i64 {
        self.post_run
    }

    /// Milestone span plus pre-run and post-run padding
    pub fn total_days(&self) -> i64 {
        days_between(self.first, self.last) + 1 + self.pre_run + self.post_run
    }

    /// Days from the first milestone to the last, inclusive
    pub fn span_days(&self) -> i64 {
        days_between(self.first, self.last) + 1
    }

    /// Pixel width of all visible day columns
    pub fn width(&self) -> i32 {
        let (start, end) = self.visible_range();
        ((days_between(start, end) + 1) * i64::from(self.day_width)) as i32
    }

    /// Day index relative to the first milestone
    pub fn day_index(&self, date: NaiveDate) -> i64 {
        days_between(self.first, date)
    }

    pub fn date_at_index(&self, index: i64) -> NaiveDate {
        add_days(self.first, index)
    }

    /// Pixel x of the center of a day column
    pub fn day_x(&self, date: NaiveDate) -> i32 {
        let dw = i64::from(self.day_width);
        let column = self.day_index(date) + self.pre_run;
        (i64::from(self.origin_x) + dw / 2 + column * dw) as i32
    }

    /// Pixel x of the left edge of a day column
    pub fn day_left(&self, date: NaiveDate) -> i32 {
        self.day_x(date) - self.day_width / 2
    }

    /// Pixel x of an instant: day center plus the time since the start of
    /// the working day, scaled by the configured day length
    pub fn instant_x(&self, instant: NaiveDateTime) -> i32 {
        let since_start = seconds_of_day(instant) - WORK_DAY_START_SECS;
        let offset = since_start * i64::from(self.day_width) / self.seconds_per_day;
        self.day_x(instant.date()) + offset as i32
    }

    /// The day whose column contains pixel `x`
    pub fn date_at_x(&self, x: i32) -> Option<NaiveDate> {
        if self.day_width <= 0 {
            return None;
        }
        let column = i64::from(x - self.origin_x).div_euclid(i64::from(self.day_width));
        Some(self.date_at_index(column - self.pre_run))
    }

    /// First and last day drawn
    ///
    /// Never truncates: if the chart shows more day columns than the
    /// padded milestone span, the range extends to fill them.
    pub fn visible_range(&self) -> (NaiveDate, NaiveDate) {
        let start = add_days(self.first, -self.pre_run);
        let padded_end = add_days(self.last, self.post_run);
        let end = match self.display_days {
            Some(days) => padded_end.max(add_days(start, days - 1)),
            None => padded_end,
        };
        (start, end)
    }

    pub fn visible_days(&self) -> impl Iterator<Item = NaiveDate> {
        let (start, end) = self.visible_range();
        start.iter_days().take_while(move |day| *day <= end)
    }

    pub fn is_visible(&self, band: Band) -> bool {
        self.day_width >= band.min_day_width()
    }

    /// Height of all visible header bands
    pub fn header_height(&self) -> i32 {
        Band::HEADER
            .iter()
            .filter(|band| self.is_visible(**band))
            .map(|band| band.height())
            .sum()
    }

    /// Offset of a band's row from the header top, if the band is visible
    pub fn band_offset(&self, band: Band) -> Option<i32> {
        if band == Band::DayBars || !self.is_visible(band) {
            return None;
        }
        let mut offset = 0;
        for candidate in Band::HEADER {
            if candidate == band {
                return Some(offset);
            }
            if self.is_visible(candidate) {
                offset += candidate.height();
            }
        }
        None
    }

    /// Boxes of a band over the visible range
    ///
    /// A box starts at its natural start (Monday, 1st of month, 1st of
    /// January) or at the first visible day, and ends at its natural end or
    /// the last visible day, whichever comes first.
    pub fn runs(&self, band: Band) -> Vec<BandRun> {
        let (start, end) = self.visible_range();
        let mut runs = Vec::new();
        for day in self.visible_days() {
            if day == start || band.starts_run(day) {
                runs.push(BandRun {
                    first: day,
                    last: band.run_end(day).min(end),
                });
            }
        }
        runs
    }

    // ========================================================================
    // Drawing
    // ========================================================================

    /// Day bars behind a body area, then the header below `header_top`
    pub fn draw(
        &self,
        canvas: &mut Canvas,
        style: &ChartStyle,
        measure: &dyn TextMeasure,
        header_top: i32,
        body_height: i32,
    ) {
        let body_top = header_top + self.header_height();
        self.draw_day_bars(canvas, style, body_top, body_height);
        self.draw_header(canvas, style, measure, header_top);
    }

    /// Vertical stripes, one per visible day
    pub fn draw_day_bars(&self, canvas: &mut Canvas, style: &ChartStyle, top: i32, height: i32) {
        if !self.is_visible(Band::DayBars) || height <= 0 {
            return;
        }
        for day in self.visible_days() {
            canvas.fill_rect(
                self.day_left(day),
                top,
                self.day_width,
                height,
                style.day_stripe(day),
            );
        }
    }

    /// Header bands in paint order: day-of-week, day-of-month, week, month, year
    pub fn draw_header(
        &self,
        canvas: &mut Canvas,
        style: &ChartStyle,
        measure: &dyn TextMeasure,
        top: i32,
    ) {
        for band in Band::PAINT_ORDER {
            let Some(offset) = self.band_offset(band) else {
                continue;
            };
            let y = top + offset;
            for run in self.runs(band) {
                let (fill, label) = self.run_style(band, run, style);
                let x = self.day_left(run.first);
                let width = self.day_left(run.last) + self.day_width - x;
                let height = band.height() - 1;
                canvas.fill_rect(x, y, (width - 1).max(1), height, fill);

                let font = &style.band_font;
                if measure.text_width(&label, font) < width {
                    let color = if matches!(band, Band::DayOfWeek) {
                        style.text
                    } else {
                        style.band_text
                    };
                    canvas.text(x + width / 2, y + height / 2, label, font, color, TextAlign::Center);
                }
            }
        }
    }

    fn run_style(&self, band: Band, run: BandRun, style: &ChartStyle) -> (Color, String) {
        let day = run.first;
        match band {
            Band::DayOfWeek => (
                style.weekday_color(day),
                WEEKDAY_LETTERS[day.weekday().num_days_from_monday() as usize].to_string(),
            ),
            Band::DayOfMonth => {
                let fill = if is_weekend(day) {
                    style.day_of_month_weekend
                } else {
                    style.day_of_month_band
                };
                (fill, day.day().to_string())
            }
            Band::Week => {
                let label = if self.is_visible(Band::DayOfWeek) {
                    format!("W{}", day.iso_week().week())
                } else {
                    day.day().to_string()
                };
                (style.week_band, label)
            }
            Band::Month => (style.month_color(day), MONTH_NAMES[day.month0() as usize].to_string()),
            Band::Year => (style.year_band, day.year().to_string()),
            Band::DayBars => (style.day_stripe(day), String::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{ApproximateTextMeasure, DrawCommand};
    use pretty_assertions::assert_eq;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn work_week() -> CalendarAxis {
        CalendarAxis::new(date(2025, 1, 6), date(2025, 1, 10))
    }

    #[test]
    fn fit_width_divides_by_spanned_days() {
        let axis = work_week().fit_width(500);
        assert_eq!(axis.total_days(), 5);
        assert_eq!(axis.day_width(), 100);
    }

    #[test]
    fn total_days_includes_padding() {
        let axis = work_week().pre_run(7).post_run(14);
        assert_eq!(axis.total_days(), 26);
        assert_eq!(axis.span_days(), 5);
    }

    #[test]
    fn day_x_centers_on_column() {
        let axis = work_week().fit_width(500).origin(30);
        assert_eq!(axis.day_x(date(2025, 1, 6)), 30 + 50);
        assert_eq!(axis.day_x(date(2025, 1, 8)), 30 + 50 + 200);
        assert_eq!(axis.day_left(date(2025, 1, 8)), 30 + 200);
    }

    #[test]
    fn pre_run_shifts_columns_right() {
        let axis = work_week().pre_run(2).with_day_width(10);
        assert_eq!(axis.day_x(date(2025, 1, 6)), 5 + 20);
        assert_eq!(axis.day_x(date(2025, 1, 4)), 5);
        assert_eq!(axis.day_index(date(2025, 1, 6)), 0);
        assert_eq!(axis.day_index(date(2025, 1, 4)), -2);
    }

    #[test]
    fn instant_x_adds_time_of_day() {
        let axis = work_week().with_day_width(20).with_seconds_per_day(85 * 6 * 60);
        let day = date(2025, 1, 7);
        let morning = day.and_hms_opt(8, 0, 0).unwrap();
        let noon = day.and_hms_opt(12, 15, 0).unwrap();
        let evening = day.and_hms_opt(16, 30, 0).unwrap();
        assert_eq!(axis.instant_x(morning), axis.day_x(day));
        assert_eq!(axis.instant_x(noon), axis.day_x(day) + 10);
        assert_eq!(axis.instant_x(evening), axis.day_x(day) + 20);
    }

    #[test]
    fn date_at_x_inverts_day_x() {
        let axis = work_week().pre_run(3).post_run(3).with_day_width(12).origin(7);
        for day in axis.visible_days() {
            assert_eq!(axis.date_at_x(axis.day_x(day)), Some(day));
            assert_eq!(axis.date_at_x(axis.day_left(day)), Some(day));
        }
        assert_eq!(work_week().with_day_width(0).date_at_x(10), None);
    }

    #[test]
    fn band_visibility_thresholds() {
        let axis = work_week();
        assert!(!axis.clone().with_day_width(9).is_visible(Band::DayOfWeek));
        assert!(axis.clone().with_day_width(10).is_visible(Band::DayOfWeek));
        assert!(!axis.clone().with_day_width(15).is_visible(Band::DayOfMonth));
        assert!(axis.clone().with_day_width(16).is_visible(Band::DayOfMonth));
        assert!(!axis.clone().with_day_width(3).is_visible(Band::DayBars));
        assert!(axis.clone().with_day_width(4).is_visible(Band::DayBars));
        assert!(!axis.clone().with_day_width(1).is_visible(Band::Week));
        assert!(axis.clone().with_day_width(2).is_visible(Band::Week));
        assert!(!axis.clone().with_day_width(0).is_visible(Band::Month));
        assert!(axis.clone().with_day_width(1).is_visible(Band::Month));
    }

    #[test]
    fn header_height_sums_visible_bands() {
        assert_eq!(work_week().with_day_width(20).header_height(), 17 + 16 + 14 + 14 + 14);
        assert_eq!(work_week().with_day_width(12).header_height(), 17 + 16 + 14 + 14);
        assert_eq!(work_week().with_day_width(1).header_height(), 17 + 16);
    }

    #[test]
    fn band_offsets_skip_hidden_bands() {
        let axis = work_week().with_day_width(12);
        assert_eq!(axis.band_offset(Band::Year), Some(0));
        assert_eq!(axis.band_offset(Band::Month), Some(17));
        assert_eq!(axis.band_offset(Band::Week), Some(33));
        assert_eq!(axis.band_offset(Band::DayOfMonth), None);
        assert_eq!(axis.band_offset(Band::DayOfWeek), Some(47));
    }

    #[test]
    fn week_runs_start_on_monday_or_first_visible_day() {
        // Thursday 2025-01-09 to Wednesday 2025-01-22
        let axis = CalendarAxis::new(date(2025, 1, 9), date(2025, 1, 22));
        let runs = axis.runs(Band::Week);
        assert_eq!(
            runs,
            vec![
                BandRun { first: date(2025, 1, 9), last: date(2025, 1, 12) },
                BandRun { first: date(2025, 1, 13), last: date(2025, 1, 19) },
                BandRun { first: date(2025, 1, 20), last: date(2025, 1, 22) },
            ]
        );
    }

    #[test]
    fn month_and_year_runs_cross_new_year() {
        let axis = CalendarAxis::new(date(2024, 12, 20), date(2025, 2, 3));
        let months: Vec<_> = axis.runs(Band::Month).iter().map(|r| (r.first, r.last)).collect();
        assert_eq!(
            months,
            vec![
                (date(2024, 12, 20), date(2024, 12, 31)),
                (date(2025, 1, 1), date(2025, 1, 31)),
                (date(2025, 2, 1), date(2025, 2, 3)),
            ]
        );
        assert_eq!(axis.runs(Band::Year).len(), 2);
    }

    #[test]
    fn visible_range_never_truncates() {
        let axis = work_week().pre_run(1).post_run(1);
        assert_eq!(axis.visible_range(), (date(2025, 1, 5), date(2025, 1, 11)));
        let wide = axis.clone().with_display_days(10);
        assert_eq!(wide.visible_range(), (date(2025, 1, 5), date(2025, 1, 14)));
        let narrow = axis.with_display_days(3);
        assert_eq!(narrow.visible_range().1, date(2025, 1, 11));
    }

    #[test]
    fn month_end_handles_december_and_leap_years() {
        assert_eq!(month_end(date(2024, 2, 10)), date(2024, 2, 29));
        assert_eq!(month_end(date(2024, 12, 1)), date(2024, 12, 31));
    }

    #[test]
    fn header_draws_one_box_per_run() {
        let axis = CalendarAxis::new(date(2025, 1, 27), date(2025, 2, 9)).with_day_width(20);
        let mut canvas = Canvas::new();
        axis.draw_header(&mut canvas, &ChartStyle::light(), &ApproximateTextMeasure, 0);

        let month_y = axis.band_offset(Band::Month).unwrap();
        let month_boxes = canvas
            .commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::FillRect { rect, .. } if rect.y == month_y))
            .count();
        assert_eq!(month_boxes, 2);
        assert_eq!(canvas.count_text("W5"), 1);
        assert_eq!(canvas.count_text("W6"), 1);
        assert_eq!(canvas.count_text("M"), 2);
    }

    #[test]
    fn week_label_falls_back_to_day_number() {
        let axis = CalendarAxis::new(date(2025, 1, 6), date(2025, 3, 2)).with_day_width(6);
        let mut canvas = Canvas::new();
        axis.draw_header(&mut canvas, &ChartStyle::light(), &ApproximateTextMeasure, 0);
        assert_eq!(canvas.count_text("W2"), 0);
        assert_eq!(canvas.count_text("13"), 1);
    }

    #[test]
    fn day_bars_only_when_wide_enough() {
        let style = ChartStyle::light();
        let mut canvas = Canvas::new();
        work_week().with_day_width(3).draw_day_bars(&mut canvas, &style, 0, 100);
        assert!(canvas.commands.is_empty());
        work_week().with_day_width(4).draw_day_bars(&mut canvas, &style, 0, 100);
        assert_eq!(canvas.commands.len(), 5);
    }
}
