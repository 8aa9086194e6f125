//! Terminal tables for the diff report, the build summary and yank results
//!
//! Every function returns the finished text; printing is left to the binary.

use colored::{ColoredString, Colorize};

use crate::sync::diff::{DiffReport, VersionStatus};
use crate::sync::dispatcher::BuildOutcome;
use crate::sync::plan::ReplaceMode;
use crate::sync::runner::SyncReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tone {
    Plain,
    Cyan,
    Green,
    GreenBold,
    Yellow,
    YellowBold,
    Red,
    RedBold,
    Dim,
}

impl Tone {
    fn paint(self, text: &str) -> ColoredString {
        match self {
            Tone::Plain => text.normal(),
            Tone::Cyan => text.cyan(),
            Tone::Green => text.green(),
            Tone::GreenBold => text.green().bold(),
            Tone::Yellow => text.yellow(),
            Tone::YellowBold => text.yellow().bold(),
            Tone::Red => text.red(),
            Tone::RedBold => text.red().bold(),
            Tone::Dim => text.dimmed(),
        }
    }
}

struct Cell {
    text: String,
    tone: Tone,
}

impl Cell {
    /// Multi-line text is folded onto one line so rows stay intact
    fn new(text: impl Into<String>, tone: Tone) -> Self {
        let text: String = text.into();
        let text = if text.contains(['\n', '\r']) {
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        } else {
            text
        };
        Self { text, tone }
    }
}

fn width(text: &str) -> usize {
    text.chars().count()
}

/// Box-drawn table. Widths are measured on the plain text so colour codes
/// never shift the columns.
fn table(title: Option<&str>, headers: &[&str], rows: &[Vec<Cell>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| width(h)).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(width(&cell.text));
        }
    }

    let rule = |left: &str, mid: &str, right: &str| {
        let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
        format!("{}{}{}", left, segments.join(mid), right)
    };
    let line = |cells: Vec<String>| format!("│ {} │", cells.join(" │ "));

    let mut out = Vec::new();
    if let Some(title) = title {
        out.push(title.bold().to_string());
    }
    out.push(rule("┌", "┬", "┐"));
    out.push(line(
        headers
            .iter()
            .zip(&widths)
            .map(|(h, w)| format!("{:<w$}", h, w = w).bold().to_string())
            .collect(),
    ));
    out.push(rule("├", "┼", "┤"));
    for row in rows {
        out.push(line(
            row.iter()
                .zip(&widths)
                .map(|(cell, w)| {
                    let padded = format!("{:<w$}", cell.text, w = w);
                    cell.tone.paint(&padded).to_string()
                })
                .collect(),
        ));
    }
    out.push(rule("└", "┴", "┘"));
    out.join("\n")
}

fn mark(present: bool) -> &'static str {
    if present { "✓" } else { "✗" }
}

fn status_tone(status: VersionStatus) -> Tone {
    match status {
        VersionStatus::Skipped => Tone::YellowBold,
        VersionStatus::Missing => Tone::RedBold,
        VersionStatus::Synced => Tone::Green,
        VersionStatus::Extra => Tone::Yellow,
        VersionStatus::Unknown => Tone::Dim,
    }
}

pub fn render_diff(report: &DiffReport) -> String {
    let rows: Vec<Vec<Cell>> = report
        .rows
        .iter()
        .map(|row| {
            vec![
                Cell::new(row.version.to_string(), Tone::Cyan),
                Cell::new(mark(row.in_releases), Tone::Green),
                Cell::new(mark(row.in_published), Tone::Yellow),
                Cell::new(row.status.as_str(), status_tone(row.status)),
                Cell::new(row.note.clone().unwrap_or_default(), Tone::Dim),
            ]
        })
        .collect();

    let mut out = table(
        Some("Version Comparison"),
        &["Version", "GitHub", "Docker Hub", "Status", "Notes"],
        &rows,
    );

    if report.skipped_count > 0 {
        out.push_str(&format!(
            "\n\n{}",
            format!(
                "{} versions skipped due to configuration",
                report.skipped_count
            )
            .yellow()
        ));
    }

    let footer = if report.available_missing_count > 0 {
        format!(
            "{} versions missing from Docker Hub (excluding skipped)",
            report.available_missing_count
        )
        .red()
        .bold()
    } else if report.all_synced() {
        "All versions are synced! 🎉".green().bold()
    } else {
        "All available versions are synced! 🎉".green().bold()
    };
    out.push_str(&format!("\n\n{}", footer));
    out
}

fn plan_line(report: &SyncReport) -> ColoredString {
    match &report.mode {
        ReplaceMode::Missing => format!(
            "Found {} missing versions, building {} (excluding skipped)",
            report.missing_count, report.attempted
        )
        .yellow(),
        ReplaceMode::All => format!(
            "Replace mode: Resyncing ALL versions, building {} version(s)",
            report.attempted
        )
        .yellow(),
        ReplaceMode::Version(version) => format!(
            "Replace mode: Resyncing version {}, building {} version(s)",
            version, report.attempted
        )
        .yellow(),
    }
}

pub fn render_sync_summary(report: &SyncReport) -> String {
    if report.nothing_to_build() && report.skipped.is_empty() {
        return "All versions are already synced! 🎉".green().to_string();
    }

    let mut lines = vec![plan_line(report).to_string()];

    if report.nothing_to_build() {
        lines.push(
            format!("Skipping {} version(s):", report.skipped.len())
                .yellow()
                .to_string(),
        );
        for (version, reason) in &report.skipped {
            lines.push(format!("  {}", format!("{}: {}", version, reason).dimmed()));
        }
        lines.push(
            "No versions to build after filtering! 🎉"
                .green()
                .to_string(),
        );
        return lines.join("\n");
    }

    let mut rows: Vec<Vec<Cell>> = report
        .outcomes
        .iter()
        .map(|outcome| {
            let status = if outcome.success {
                Cell::new("✓ Success", Tone::Green)
            } else {
                Cell::new("✗ Failed", Tone::Red)
            };
            vec![
                Cell::new(outcome.version.to_string(), Tone::Cyan),
                status,
                Cell::new(outcome.message.clone(), Tone::Plain),
            ]
        })
        .collect();
    rows.extend(report.skipped.iter().map(|(version, reason)| {
        vec![
            Cell::new(version.to_string(), Tone::Cyan),
            Cell::new("⚠ Skipped", Tone::Yellow),
            Cell::new(reason.clone(), Tone::Plain),
        ]
    }));

    lines.push(String::new());
    lines.push("Build Summary:".blue().bold().to_string());
    lines.push(table(None, &["Version", "Status", "Message"], &rows));
    lines.push(String::new());

    let verb = if report.mode.is_replace() {
        "rebuilt"
    } else {
        "built"
    };
    lines.push(
        format!(
            "Successfully {} {}/{} images",
            verb,
            report.succeeded(),
            report.attempted
        )
        .green()
        .to_string(),
    );

    if !report.skipped.is_empty() {
        lines.push(
            format!(
                "Skipped {} version(s) due to configuration",
                report.skipped.len()
            )
            .yellow()
            .to_string(),
        );
    }

    let failed = report.failed();
    if !failed.is_empty() {
        let names: Vec<String> = failed.iter().map(|v| v.to_string()).collect();
        lines.push(
            format!("Failed builds: {}", names.join(", "))
                .red()
                .to_string(),
        );
    }

    lines.join("\n")
}

pub fn render_yank(outcome: &BuildOutcome) -> String {
    let status = if outcome.success {
        Cell::new("✓ Yanked", Tone::Green)
    } else {
        Cell::new("✗ Failed", Tone::Red)
    };
    table(
        None,
        &["Version", "Status", "Message"],
        &[vec![
            Cell::new(outcome.version.to_string(), Tone::Cyan),
            status,
            Cell::new(outcome.message.clone(), Tone::Plain),
        ]],
    )
}
