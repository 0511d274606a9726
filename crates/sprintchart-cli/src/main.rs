//! sprintchart CLI - sprint chart renderer
//!
//! Command-line interface rendering Gantt, burndown and user calendar
//! charts of a sprint to SVG.

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use sprintchart_core::{Renderer, Sprint, User};
use sprintchart_render::{BurndownChart, ChartStyle, GanttChart, SvgEncoder, UserCalendarChart};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "sprintchart")]
#[command(author, version, about = "Sprint chart renderer", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every chart
#[derive(clap::Args)]
struct ChartArgs {
    /// Sprint JSON file
    #[arg(value_name = "SPRINT")]
    file: PathBuf,

    /// Chart style overrides (TOML)
    #[arg(long, value_name = "FILE")]
    style: Option<PathBuf>,

    /// Start from the dark theme
    #[arg(long)]
    dark: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a Gantt chart
    Gantt {
        #[command(flatten)]
        chart: ChartArgs,

        /// Output SVG file
        #[arg(short, long)]
        output: PathBuf,

        /// Current time, e.g. 2025-01-08T12:00
        #[arg(long, value_parser = parse_datetime)]
        now: Option<NaiveDateTime>,

        /// Fit the chart into this many pixels
        #[arg(long)]
        width: Option<i32>,
    },

    /// Render a burndown chart
    Burndown {
        #[command(flatten)]
        chart: ChartArgs,

        /// Output SVG file
        #[arg(short, long)]
        output: PathBuf,

        /// Current time, e.g. 2025-01-08T12:00
        #[arg(long, value_parser = parse_datetime)]
        now: Option<NaiveDateTime>,

        /// Fit the chart into this many pixels
        #[arg(long)]
        width: Option<i32>,

        /// Chart height in pixels
        #[arg(long)]
        height: Option<i32>,
    },

    /// Render one year calendar per user
    Calendar {
        #[command(flatten)]
        chart: ChartArgs,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,

        /// Calendar year
        #[arg(long)]
        year: i32,

        /// Only this user (name or login)
        #[arg(long)]
        user: Option<String>,

        /// Day to outline, e.g. 2025-06-02
        #[arg(long)]
        today: Option<NaiveDate>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Gantt {
            chart,
            output,
            now,
            width,
        } => {
            let sprint = load_sprint(&chart.file)?;
            let mut gantt = GanttChart::new().style(load_style(&chart)?);
            if let Some(now) = now {
                gantt = gantt.now(now);
            }
            if let Some(width) = width {
                gantt = gantt.chart_width(width);
            }
            let (rendered, layout) = gantt
                .render_with_layout(&sprint)
                .with_context(|| format!("Failed to render Gantt chart of '{}'", sprint.name))?;
            for error in &layout.errors {
                eprintln!("warning: {}", error);
            }
            write_svg(&SvgEncoder::new().encode(&rendered)?, &output)?;
            println!(
                "Gantt chart {}x{} with {} tasks written to {}",
                rendered.width,
                rendered.height,
                layout.lanes.len(),
                output.display()
            );
        }
        Commands::Burndown {
            chart,
            output,
            now,
            width,
            height,
        } => {
            let sprint = load_sprint(&chart.file)?;
            let mut burndown = BurndownChart::new().style(load_style(&chart)?);
            if let Some(now) = now {
                burndown = burndown.now(now);
            }
            if let Some(width) = width {
                burndown = burndown.chart_width(width);
            }
            if let Some(height) = height {
                burndown = burndown.chart_height(height);
            }
            let rendered = burndown
                .render(&sprint)
                .with_context(|| format!("Failed to render burndown chart of '{}'", sprint.name))?;
            write_svg(&SvgEncoder::new().encode(&rendered)?, &output)?;
            println!(
                "Burndown chart {}x{} ({:.1} pd estimated) written to {}",
                rendered.width,
                rendered.height,
                sprint.estimated_work().as_work_days(),
                output.display()
            );
        }
        Commands::Calendar {
            chart,
            output,
            year,
            user,
            today,
        } => {
            let sprint = load_sprint(&chart.file)?;
            let mut calendar = UserCalendarChart::new(year).style(load_style(&chart)?);
            if let Some(today) = today {
                calendar = calendar.today(today);
            }
            let users: Vec<&User> = match &user {
                Some(name) => match sprint.user_by_identifier(name) {
                    Some(found) => vec![found],
                    None => bail!("No user named '{}' in sprint '{}'", name, sprint.name),
                },
                None => sprint.users.iter().collect(),
            };
            std::fs::create_dir_all(&output)
                .with_context(|| format!("Failed to create {}", output.display()))?;

            let written = users
                .par_iter()
                .map(|user| -> Result<PathBuf> {
                    let rendered = calendar
                        .render_user(user)
                        .with_context(|| format!("Failed to render calendar of {}", user.name))?;
                    let path = output.join(calendar_file_name(&user.name, year));
                    write_svg(&SvgEncoder::new().encode(&rendered)?, &path)?;
                    Ok(path)
                })
                .collect::<Result<Vec<_>>>()?;
            println!(
                "{} calendar(s) for {} written to {}",
                written.len(),
                year,
                output.display()
            );
        }
    }

    Ok(())
}

/// `RUST_LOG` wins; otherwise each `-v` raises the level one step
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn parse_datetime(value: &str) -> Result<NaiveDateTime, String> {
    const FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"];
    FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| format!("'{}' is not a date or date-time", value))
}

fn load_sprint(path: &Path) -> Result<Sprint> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let sprint: Sprint = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse sprint {}", path.display()))?;
    info!(
        sprint = %sprint.name,
        tasks = sprint.tasks.len(),
        users = sprint.users.len(),
        "loaded sprint"
    );
    Ok(sprint)
}

/// Light or dark theme, with overrides from a TOML file on top
///
/// The override file is merged field by field: a table in the file
/// replaces only the keys it names.
fn load_style(args: &ChartArgs) -> Result<ChartStyle> {
    let base = if args.dark {
        ChartStyle::dark()
    } else {
        ChartStyle::light()
    };
    let Some(path) = &args.style else {
        return Ok(base);
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let overrides: toml::Table = toml::from_str(&content)
        .with_context(|| format!("Failed to parse style {}", path.display()))?;

    let toml::Value::Table(mut merged) =
        toml::Value::try_from(&base).context("Failed to serialize base style")?
    else {
        bail!("Base style did not serialize to a table");
    };
    merge(&mut merged, overrides);
    let style = toml::Value::Table(merged)
        .try_into()
        .with_context(|| format!("Invalid style {}", path.display()))?;
    debug!(path = %path.display(), "loaded style overrides");
    Ok(style)
}

fn merge(base: &mut toml::Table, overrides: toml::Table) {
    for (key, value) in overrides {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(nested)) => {
                merge(existing, nested);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

fn calendar_file_name(user: &str, year: i32) -> String {
    let safe: String = user
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    format!("{}-{}.svg", safe, year)
}

fn write_svg(svg: &str, path: &Path) -> Result<()> {
    std::fs::write(path, svg).with_context(|| format!("Failed to write {}", path.display()))
}
