//! Chart style: colors and fonts shared by every renderer.
//!
//! One flat struct, passed by reference. Every field can be overridden from
//! a config file; missing fields fall back to the light theme.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use sprintchart_core::OffDayType;
use std::fmt;
use thiserror::Error;

// ============================================================================
// Color
// ============================================================================

/// RGBA color, serialized as `#rrggbb` or `#rrggbbaa`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const RED: Color = Color::rgb(0xff, 0, 0);
    pub const DARK_GRAY: Color = Color::rgb(0x40, 0x40, 0x40);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xff }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// From a packed `0xRRGGBB` value, fully opaque
    pub const fn hex(rgb: u32) -> Self {
        Self {
            r: ((rgb >> 16) & 0xff) as u8,
            g: ((rgb >> 8) & 0xff) as u8,
            b: (rgb & 0xff) as u8,
            a: 0xff,
        }
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// `#rrggbb`, without alpha
    pub fn to_rgb_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn opacity(&self) -> f64 {
        f64::from(self.a) / 255.0
    }

    pub fn is_opaque(&self) -> bool {
        self.a == 0xff
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{:02x}{:02x}{:02x}{:02x}",
            self.r, self.g, self.b, self.a
        )
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid color '{0}': expected #rrggbb or #rrggbbaa")]
pub struct ColorParseError(String);

impl std::str::FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ColorParseError(s.to_string());
        let digits = s.strip_prefix('#').ok_or_else(err)?;
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(err());
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| err());
        match digits.len() {
            6 => Ok(Color::rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Ok(Color::rgba(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => Err(err()),
        }
    }
}

impl TryFrom<String> for Color {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

// ============================================================================
// Fonts
// ============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Font {
    pub family: String,
    pub size: u32,
    #[serde(default)]
    pub bold: bool,
}

impl Font {
    pub fn new(family: impl Into<String>, size: u32) -> Self {
        Self {
            family: family.into(),
            size,
            bold: false,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }
}

// ============================================================================
// Off-day colors
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct OffDayColors {
    pub vacation: Color,
    pub sick: Color,
    pub trip: Color,
    pub holiday: Color,
}

impl OffDayColors {
    pub fn get(&self, kind: OffDayType) -> Color {
        match kind {
            OffDayType::Vacation => self.vacation,
            OffDayType::Sick => self.sick,
            OffDayType::Trip => self.trip,
            OffDayType::Holiday => self.holiday,
        }
    }
}

// ============================================================================
// ChartStyle
// ============================================================================

/// Every color and font a renderer may look up
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartStyle {
    pub background: Color,
    pub border: Color,
    pub grid: Color,
    pub text: Color,

    // Calendar header
    pub band_text: Color,
    pub band_border: Color,
    pub year_band: Color,
    pub week_band: Color,
    pub day_of_month_band: Color,
    pub day_of_month_weekend: Color,
    pub month_colors: [Color; 12],
    /// Day-of-week band fill, Monday first
    pub weekday_colors: [Color; 7],
    /// Day bars behind the chart body, Monday first
    pub day_stripes: [Color; 7],

    // Milestones
    pub milestone_flag: Color,
    pub milestone_text: Color,
    pub now_line: Color,
    pub past_event: Color,

    // Gantt
    pub relation: Color,
    pub critical_relation: Color,
    pub milestone: Color,
    pub story: Color,
    pub story_text: Color,
    pub task_fill: Color,
    pub task_text: Color,
    pub task_border: Color,
    pub critical_task_border: Color,
    pub progress: Color,
    pub progress_text: Color,
    pub conflict: Color,
    pub manual_marker: Color,
    pub out_of_office: Color,
    pub out_of_office_text: Color,
    pub tick_line: Color,
    pub tick_label: Color,
    pub id_band: Color,
    pub id_text: Color,

    // Burndown
    pub ticks: Color,
    pub tick_text: Color,
    pub optimal_guide: Color,
    pub planned_guide: Color,
    pub burndown_line: Color,
    pub in_time: Color,
    pub delay: Color,
    pub watermark: Color,

    // Calendar chart
    pub off_days: OffDayColors,
    pub weekend: Color,
    pub today: Color,

    pub font: Font,
    pub band_font: Font,
    pub milestone_font: Font,
    pub watermark_font: Font,
    pub story_font: Font,
    /// Progress labels and small annotations
    pub small_font: Font,
    pub tick_font: Font,
    pub out_of_office_font: Font,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self::light()
    }
}

const MONTH_ALPHA: u8 = 0x7f;

impl ChartStyle {
    pub fn light() -> Self {
        let grid = Color::rgba(0xe4, 0xe8, 0xf3, 0x7f);
        let band = Color::hex(0x7a7a7a);
        Self {
            background: Color::WHITE,
            border: Color::hex(0xaaaaaa),
            grid,
            text: Color::rgb(0x30, 0x30, 0x30),

            band_text: Color::WHITE,
            band_border: Color::WHITE,
            year_band: band,
            week_band: band,
            day_of_month_band: band,
            day_of_month_weekend: Color::hex(0xb0b0b0),
            month_colors: [
                Color::hex(0x187dc3).with_alpha(MONTH_ALPHA),
                Color::hex(0x24aeef).with_alpha(MONTH_ALPHA),
                Color::hex(0x279e68).with_alpha(MONTH_ALPHA),
                Color::hex(0x62b742).with_alpha(MONTH_ALPHA),
                Color::hex(0xacc231).with_alpha(MONTH_ALPHA),
                Color::hex(0xf9b71b).with_alpha(MONTH_ALPHA),
                Color::hex(0xf1751d).with_alpha(MONTH_ALPHA),
                Color::hex(0xe54629).with_alpha(MONTH_ALPHA),
                Color::hex(0xe71657).with_alpha(MONTH_ALPHA),
                Color::hex(0xad3483).with_alpha(MONTH_ALPHA),
                Color::hex(0x654198).with_alpha(MONTH_ALPHA),
                Color::hex(0x0855a3).with_alpha(MONTH_ALPHA),
            ],
            weekday_colors: [
                Color::WHITE,
                Color::WHITE,
                Color::WHITE,
                Color::WHITE,
                Color::WHITE,
                Color::hex(0xd7d7d7),
                Color::hex(0xd7d7d7),
            ],
            day_stripes: [
                Color::WHITE,
                Color::WHITE,
                Color::WHITE,
                Color::WHITE,
                Color::WHITE,
                Color::hex(0xfafafa),
                Color::hex(0xf7f7f7),
            ],

            milestone_flag: Color::WHITE,
            milestone_text: Color::rgb(0x50, 0x50, 0x50),
            now_line: Color::rgb(0x80, 0x80, 0x80),
            past_event: Color::hex(0xc0c0c0),

            relation: Color::rgba(0x34, 0x66, 0xed, 0x7f),
            critical_relation: Color::rgba(0xff, 0, 0, 0x7f),
            milestone: Color::rgb(0x4f, 0xbb, 0xc2),
            story: Color::BLACK,
            story_text: Color::DARK_GRAY,
            task_fill: Color::rgba(0x34, 0x66, 0xed, 0x7f),
            task_text: Color::rgb(0x30, 0x30, 0x30),
            task_border: Color::rgba(0x30, 0x30, 0x30, 0x7f),
            critical_task_border: Color::rgba(0xff, 0, 0, 0xc0),
            progress: Color::rgba(0x30, 0x30, 0x30, 0x60),
            progress_text: Color::WHITE,
            conflict: Color::RED,
            manual_marker: Color::RED,
            out_of_office: Color::rgba(0xff, 0x33, 0x33, 0x33),
            out_of_office_text: Color::WHITE,
            tick_line: Color::hex(0x808080),
            tick_label: Color::hex(0x808080),
            id_band: Color::hex(0xe0e0e0),
            id_text: Color::DARK_GRAY,

            ticks: Color::hex(0xc9c9c9),
            tick_text: Color::DARK_GRAY,
            optimal_guide: Color::hex(0xa0a0a0),
            planned_guide: Color::hex(0x7f7f7f),
            burndown_line: Color::rgba(0xff, 0xcc, 0x00, 0x77),
            in_time: Color::rgb(0x00, 0x80, 0x00),
            delay: Color::RED,
            watermark: Color::rgba(0x10, 0x10, 0x10, 0x10),

            off_days: OffDayColors {
                vacation: Color::hex(0x99ccff),
                sick: Color::hex(0xff9999),
                trip: Color::hex(0xcc99ff),
                holiday: Color::hex(0xffcc66),
            },
            weekend: Color::hex(0xd7d7d7),
            today: Color::RED,

            font: Font::new("Arial", 12),
            band_font: Font::new("Arial", 10),
            milestone_font: Font::new("Arial", 10).bold(),
            watermark_font: Font::new("Arial", 64).bold(),
            story_font: Font::new("Arial", 12).bold(),
            small_font: Font::new("Arial", 8),
            tick_font: Font::new("Arial", 5),
            out_of_office_font: Font::new("Arial", 20).bold(),
        }
    }

    pub fn dark() -> Self {
        let light = Self::light();
        let band = Color::hex(0x2d2d44);
        Self {
            background: Color::hex(0x1a1a2e),
            border: Color::hex(0x444466),
            grid: Color::rgba(0x2d, 0x2d, 0x44, 0x7f),
            text: Color::hex(0xeaeaea),
            year_band: band,
            week_band: band,
            day_of_month_band: band,
            day_of_month_weekend: Color::hex(0x16213e),
            weekday_colors: [
                Color::hex(0x23233a),
                Color::hex(0x23233a),
                Color::hex(0x23233a),
                Color::hex(0x23233a),
                Color::hex(0x23233a),
                Color::hex(0x16213e),
                Color::hex(0x16213e),
            ],
            day_stripes: [
                Color::hex(0x1a1a2e),
                Color::hex(0x1a1a2e),
                Color::hex(0x1a1a2e),
                Color::hex(0x1a1a2e),
                Color::hex(0x1a1a2e),
                Color::hex(0x1e1e34),
                Color::hex(0x202038),
            ],
            milestone_flag: Color::hex(0x2d2d44),
            milestone_text: Color::hex(0xeaeaea),
            story: Color::hex(0xeaeaea),
            story_text: Color::hex(0xc0c0c0),
            task_text: Color::hex(0xeaeaea),
            task_border: Color::rgba(0xea, 0xea, 0xea, 0x7f),
            tick_text: Color::hex(0xc0c0c0),
            id_band: Color::hex(0x2d2d44),
            id_text: Color::hex(0xeaeaea),
            watermark: Color::rgba(0xf0, 0xf0, 0xf0, 0x10),
            weekend: Color::hex(0x16213e),
            ..light
        }
    }

    /// Month band fill for a date
    pub fn month_color(&self, date: NaiveDate) -> Color {
        self.month_colors[date.month0() as usize]
    }

    /// Day-of-week band fill for a date
    pub fn weekday_color(&self, date: NaiveDate) -> Color {
        self.weekday_colors[weekday_slot(date.weekday())]
    }

    /// Day bar behind the chart body for a date
    pub fn day_stripe(&self, date: NaiveDate) -> Color {
        self.day_stripes[weekday_slot(date.weekday())]
    }
}

fn weekday_slot(day: Weekday) -> usize {
    day.num_days_from_monday() as usize
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}
