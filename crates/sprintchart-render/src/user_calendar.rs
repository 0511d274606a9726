//! Per-user year calendar: twelve month grids showing absences.

use crate::canvas::{Canvas, Chart, Rect, Stroke, TextAlign};
use crate::style::{is_weekend, ChartStyle, Color, Font};
use chrono::{Datelike, Days, Months, NaiveDate};
use sprintchart_core::{OffDayType, RenderError, Renderer, Sprint, User};
use tracing::debug;

pub const MONTHS_PER_ROW: i32 = 4;
pub const MONTHS_PER_COLUMN: i32 = 3;
pub const MONTH_WIDTH: i32 = 200;
pub const MONTH_HEIGHT: i32 = 180;
pub const MONTH_GAP: i32 = 20;
pub const DAY_SIZE: i32 = 24;

const YEAR_HEIGHT: i32 = 20;
const MONTH_NAME_HEIGHT: i32 = 25;
const WEEKDAY_HEADER_HEIGHT: i32 = 20;
const DAYS_PADDING: i32 = 10;
const MONTH_INSET: i32 = 10;
const LEGEND_HEIGHT: i32 = 2 * DAY_SIZE;
const LEGEND_ITEM_WIDTH: i32 = 100;
const LEGEND_SQUARE: i32 = 16;
const WEEKDAY_LETTERS: [&str; 7] = ["M", "T", "W", "T", "F", "S", "S"];

/// Working days per absence type in one year; weekends are not counted
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OffDayCounts {
    pub vacation: u32,
    pub sick: u32,
    pub trip: u32,
    pub holiday: u32,
}

impl OffDayCounts {
    pub fn for_year(user: &User, year: i32) -> Self {
        let mut counts = Self::default();
        let (Some(first), Some(last)) = (
            NaiveDate::from_ymd_opt(year, 1, 1),
            NaiveDate::from_ymd_opt(year, 12, 31),
        ) else {
            return counts;
        };
        for day in first.iter_days().take_while(|d| *d <= last) {
            if is_weekend(day) {
                continue;
            }
            if let Some(kind) = user.off_day_on(day) {
                counts.add(kind);
            }
        }
        counts
    }

    pub fn add(&mut self, kind: OffDayType) {
        *self.slot(kind) += 1;
    }

    pub fn get(&self, kind: OffDayType) -> u32 {
        match kind {
            OffDayType::Vacation => self.vacation,
            OffDayType::Sick => self.sick,
            OffDayType::Trip => self.trip,
            OffDayType::Holiday => self.holiday,
        }
    }

    pub fn total(&self) -> u32 {
        self.vacation + self.sick + self.trip + self.holiday
    }

    fn slot(&mut self, kind: OffDayType) -> &mut u32 {
        match kind {
            OffDayType::Vacation => &mut self.vacation,
            OffDayType::Sick => &mut self.sick,
            OffDayType::Trip => &mut self.trip,
            OffDayType::Holiday => &mut self.holiday,
        }
    }
}

/// Year calendar renderer; one chart per user
#[derive(Clone, Debug)]
pub struct UserCalendarChart {
    pub year: i32,
    /// Outlined with an oval if it falls into the year
    pub today: Option<NaiveDate>,
    pub style: ChartStyle,
}

impl UserCalendarChart {
    pub fn new(year: i32) -> Self {
        Self {
            year,
            today: None,
            style: ChartStyle::light(),
        }
    }

    pub fn today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
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

    pub const fn width() -> i32 {
        MONTH_WIDTH * MONTHS_PER_ROW + MONTH_GAP * (MONTHS_PER_ROW - 1)
    }

    pub const fn height() -> i32 {
        Self::months_top()
            + MONTH_HEIGHT * MONTHS_PER_COLUMN
            + MONTH_GAP * (MONTHS_PER_COLUMN - 1)
            + LEGEND_HEIGHT
    }

    const fn months_top() -> i32 {
        YEAR_HEIGHT + MONTH_GAP
    }

    /// Calendar of the user found by name or login
    pub fn render_named(&self, sprint: &Sprint, name: &str) -> Result<Chart, RenderError> {
        let user = sprint
            .user_by_identifier(name)
            .ok_or_else(|| RenderError::UnknownUser(name.to_string()))?;
        self.render_user(user)
    }

    pub fn render_user(&self, user: &User) -> Result<Chart, RenderError> {
        if NaiveDate::from_ymd_opt(self.year, 1, 1).is_none() {
            return Err(RenderError::InvalidData(format!(
                "year {} is out of range",
                self.year
            )));
        }
        let mut canvas = Canvas::new();
        let (width, height) = (Self::width(), Self::height());
        canvas.fill_rect(0, 0, width, height, self.style.background);
        canvas.text(
            5,
            YEAR_HEIGHT / 2,
            self.year.to_string(),
            &Font::new("Arial", 24),
            self.style.text,
            TextAlign::Left,
        );

        for month in 1..=12u32 {
            if let Some(first) = NaiveDate::from_ymd_opt(self.year, month, 1) {
                self.draw_month(&mut canvas, user, first);
            }
        }

        let counts = OffDayCounts::for_year(user, self.year);
        debug!(user = %user.name, year = self.year, off_days = counts.total(), "user calendar");
        self.draw_legend(&mut canvas, &counts);
        Ok(Chart {
            width,
            height,
            canvas,
        })
    }

    /// Top left corner of a month box
    fn month_origin(month0: u32) -> (i32, i32) {
        let row = month0 as i32 / MONTHS_PER_ROW;
        let column = month0 as i32 % MONTHS_PER_ROW;
        (
            column * (MONTH_WIDTH + MONTH_GAP),
            Self::months_top() + row * (MONTH_HEIGHT + MONTH_GAP),
        )
    }

    /// Top left corner of the cell for a grid slot, Monday first
    fn cell_origin(month_x: i32, month_y: i32, slot: i32) -> (i32, i32) {
        let days_top = month_y + MONTH_NAME_HEIGHT + WEEKDAY_HEADER_HEIGHT + DAYS_PADDING;
        (
            month_x + MONTH_INSET + (slot % 7) * DAY_SIZE,
            days_top + (slot / 7) * DAY_SIZE,
        )
    }

    fn draw_month(&self, canvas: &mut Canvas, user: &User, first: NaiveDate) {
        let style = &self.style;
        let (x, y) = Self::month_origin(first.month0());
        let day_font = style.milestone_font.clone();
        canvas.text(
            x + MONTH_INSET + DAY_SIZE / 2 - 5,
            y + MONTH_NAME_HEIGHT / 2,
            first.format("%B").to_string(),
            &Font::new("Arial", 14),
            style.text,
            TextAlign::Left,
        );
        for (i, letter) in WEEKDAY_LETTERS.iter().enumerate() {
            canvas.text(
                x + MONTH_INSET + i as i32 * DAY_SIZE + DAY_SIZE / 2,
                y + MONTH_NAME_HEIGHT + WEEKDAY_HEADER_HEIGHT / 2,
                *letter,
                &day_font,
                style.text,
                TextAlign::Center,
            );
        }

        let lead = first.weekday().num_days_from_monday() as i32;
        let days: Vec<NaiveDate> = first
            .iter_days()
            .take_while(|d| d.month() == first.month())
            .collect();

        // filler days of the neighbouring months
        let previous = first.pred_opt();
        for i in 0..lead {
            let back = Days::new((lead - 1 - i) as u64);
            if let Some(day) = previous.and_then(|p| p.checked_sub_days(back)) {
                let (cx, cy) = Self::cell_origin(x, y, i);
                self.day_number(canvas, cx, cy, day, style.past_event);
            }
        }
        let used = lead + days.len() as i32;
        let next = first.checked_add_months(Months::new(1));
        for i in 0..(7 - used % 7) % 7 {
            if let Some(day) = next.and_then(|n| n.checked_add_days(Days::new(i as u64))) {
                let (cx, cy) = Self::cell_origin(x, y, used + i);
                self.day_number(canvas, cx, cy, day, style.past_event);
            }
        }

        for (i, day) in days.into_iter().enumerate() {
            let (cx, cy) = Self::cell_origin(x, y, lead + i as i32);
            let cell = Rect::new(cx + 1, cy + 1, DAY_SIZE - 1, DAY_SIZE - 1);
            let mut text = style.text;
            if is_weekend(day) {
                canvas.fill_rect(cell.x, cell.y, cell.width, cell.height, style.weekend);
            } else if let Some(kind) = user.off_day_on(day) {
                canvas.fill_rect(cell.x, cell.y, cell.width, cell.height, style.off_days.get(kind));
                canvas.region(
                    cell,
                    None,
                    vec![day.format("%Y-%m-%d").to_string(), kind.label().to_string()],
                );
                text = Color::WHITE;
            }
            if self.today == Some(day) {
                canvas.oval(cell, style.today, Stroke::solid(1.5));
            }
            self.day_number(canvas, cx, cy, day, text);
        }
    }

    fn day_number(&self, canvas: &mut Canvas, x: i32, y: i32, day: NaiveDate, color: Color) {
        canvas.text(
            x + DAY_SIZE / 2,
            y + DAY_SIZE / 2,
            day.day().to_string(),
            &self.style.milestone_font,
            color,
            TextAlign::Center,
        );
    }

    fn draw_legend(&self, canvas: &mut Canvas, counts: &OffDayCounts) {
        let style = &self.style;
        let y = Self::height() - LEGEND_HEIGHT + (LEGEND_HEIGHT - LEGEND_SQUARE) / 2;
        let order = [
            OffDayType::Vacation,
            OffDayType::Sick,
            OffDayType::Holiday,
            OffDayType::Trip,
        ];
        for (i, kind) in order.into_iter().enumerate() {
            let x = 15 + i as i32 * LEGEND_ITEM_WIDTH;
            canvas.fill_rect(x, y, LEGEND_SQUARE, LEGEND_SQUARE, style.off_days.get(kind));
            canvas.text(
                x + LEGEND_SQUARE / 2,
                y + LEGEND_SQUARE / 2,
                counts.get(kind).to_string(),
                &style.milestone_font,
                Color::WHITE,
                TextAlign::Center,
            );
            canvas.text(
                x + LEGEND_SQUARE + 5,
                y + LEGEND_SQUARE / 2,
                kind.label(),
                &style.font,
                style.text,
                TextAlign::Left,
            );
        }
    }
}

/// One calendar per sprint user, keyed by user name
impl Renderer for UserCalendarChart {
    type Output = Vec<(String, Chart)>;

    fn render(&self, sprint: &Sprint) -> Result<Self::Output, RenderError> {
        sprint
            .users
            .iter()
            .map(|user| Ok((user.name.clone(), self.render_user(user)?)))
            .collect()
    }
}
