//! End-to-end tests of the `sprintchart` binary
//!
//! Each test renders the sample sprint into a temporary directory and
//! checks exit status and the produced SVG files.
//!
//! | Exit Code | Meaning |
//! |-----------|---------|
//! | 0 | Chart written |
//! | 1 | Input, lookup or render failure |

use std::path::PathBuf;
use std::process::{Command, Output};

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/sprint.json")
}

fn sprintchart(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sprintchart"))
        .args(args)
        .output()
        .expect("Failed to execute sprintchart")
}

fn read_svg(path: &std::path::Path) -> String {
    let svg = std::fs::read_to_string(path).expect("chart file missing");
    assert!(svg.starts_with("<svg"), "not an SVG document: {}", &svg[..svg.len().min(80)]);
    svg
}

#[test]
fn gantt_writes_svg() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("gantt.svg");
    let output = sprintchart(&[
        "gantt",
        fixture().to_str().unwrap(),
        "-o",
        out.to_str().unwrap(),
        "--now",
        "2025-01-08T12:00",
        "--width",
        "600",
    ]);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let svg = read_svg(&out);
    assert!(svg.contains("API"));
    assert!(svg.contains("Storage"));
    assert!(String::from_utf8_lossy(&output.stdout).contains("Gantt chart"));
}

#[test]
fn burndown_writes_svg() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("burndown.svg");
    let output = sprintchart(&[
        "burndown",
        fixture().to_str().unwrap(),
        "-o",
        out.to_str().unwrap(),
        "--now",
        "2025-01-10",
        "--dark",
    ]);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let svg = read_svg(&out);
    assert!(svg.contains("Remaining"));
    assert!(svg.contains("Alice"));
}

#[test]
fn calendar_writes_one_file_per_user() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("calendars");
    let output = sprintchart(&[
        "calendar",
        fixture().to_str().unwrap(),
        "-o",
        out.to_str().unwrap(),
        "--year",
        "2025",
    ]);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let alice = read_svg(&out.join("Alice-2025.svg"));
    assert!(alice.contains("Vacation"));
    read_svg(&out.join("Bob-2025.svg"));
}

#[test]
fn calendar_selects_user_by_login() {
    let dir = tempfile::tempdir().unwrap();
    let output = sprintchart(&[
        "calendar",
        fixture().to_str().unwrap(),
        "-o",
        dir.path().to_str().unwrap(),
        "--year",
        "2025",
        "--user",
        "ALI",
    ]);

    assert!(output.status.success());
    assert!(dir.path().join("Alice-2025.svg").exists());
    assert!(!dir.path().join("Bob-2025.svg").exists());
}

#[test]
fn unknown_user_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = sprintchart(&[
        "calendar",
        fixture().to_str().unwrap(),
        "-o",
        dir.path().to_str().unwrap(),
        "--year",
        "2025",
        "--user",
        "Mallory",
    ]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Mallory"));
}

#[test]
fn missing_sprint_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = sprintchart(&[
        "gantt",
        dir.path().join("nope.json").to_str().unwrap(),
        "-o",
        dir.path().join("gantt.svg").to_str().unwrap(),
    ]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to read"));
}

#[test]
fn style_file_overrides_colors() {
    let dir = tempfile::tempdir().unwrap();
    let style = dir.path().join("style.toml");
    std::fs::write(&style, "background = \"#123456\"\n").unwrap();
    let out = dir.path().join("gantt.svg");
    let output = sprintchart(&[
        "gantt",
        fixture().to_str().unwrap(),
        "-o",
        out.to_str().unwrap(),
        "--style",
        style.to_str().unwrap(),
    ]);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(read_svg(&out).contains("#123456"));
}

#[test]
fn bad_date_is_rejected_by_argument_parser() {
    let output = sprintchart(&["gantt", "x.json", "-o", "y.svg", "--now", "someday"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("someday"));
}
