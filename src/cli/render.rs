//! Report rendering for the terminal and for `--out` files

use std::fmt::Write as _;
use std::path::Path;

use clap::ValueEnum;

use crate::domain::summary::{ReviewSnapshot, SnapshotReport};

/// Output format for the report on stdout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

pub fn render(report: &SnapshotReport, format: OutputFormat) -> serde_json::Result<String> {
    match format {
        OutputFormat::Table => Ok(render_table(report)),
        OutputFormat::Json => to_json(report),
    }
}

/// Pretty JSON with a trailing newline
pub fn to_json(report: &SnapshotReport) -> serde_json::Result<String> {
    let mut json = serde_json::to_string_pretty(report)?;
    json.push('\n');
    Ok(json)
}

pub fn write_json(report: &SnapshotReport, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    std::fs::write(path, to_json(report)?)?;
    Ok(())
}

pub fn render_table(report: &SnapshotReport) -> String {
    let mut out = String::new();
    let source = if report.from_cache { " (cached)" } else { "" };

    let _ = writeln!(
        out,
        "Steam snapshot for {} (app {}), {} review(s){}",
        report.entry.title(),
        report.entry.app_id(),
        report.review_count,
        source
    );

    if report.review_count == 0 {
        out.push_str("No reviews found.\n");
        return out;
    }

    if let Some(summary) = &report.summary {
        let rows = vec![vec![summary.sentiment.to_string(), summary.tldr.clone()]];
        out.push('\n');
        out.push_str(&table(&["Sentiment", "TL;DR"], &rows));
    }

    if !report.snapshots.is_empty() {
        let rows: Vec<Vec<String>> = report.snapshots.iter().map(snapshot_row).collect();
        out.push('\n');
        out.push_str(&table(&["Rec?", "Sentiment", "TL;DR", "Author"], &rows));
    }

    if let Some(reviews) = &report.reviews {
        out.push_str("\nRaw reviews:\n");
        for (i, review) in reviews.iter().enumerate() {
            let _ = writeln!(
                out,
                "[{}] {}: {}",
                i + 1,
                review.author().unwrap_or("?"),
                review.body().trim()
            );
        }
    }

    out
}

fn snapshot_row(snapshot: &ReviewSnapshot) -> Vec<String> {
    let author = snapshot.author.clone().unwrap_or_else(|| "?".to_string());

    match (&snapshot.summary, &snapshot.error) {
        (Some(summary), _) => vec![
            recommended_label(snapshot.recommended).to_string(),
            summary.sentiment.to_string(),
            summary.tldr.clone(),
            author,
        ],
        (None, error) => vec![
            "!".to_string(),
            "error".to_string(),
            error.clone().unwrap_or_default(),
            author,
        ],
    }
}

fn recommended_label(recommended: Option<bool>) -> &'static str {
    match recommended {
        Some(true) => "yes",
        Some(false) => "no",
        None => "?",
    }
}

fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();

    for row in std::iter::once(&header).chain(std::iter::once(&rule)).chain(rows) {
        let last = row.len().saturating_sub(1);
        let line: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                if i == last {
                    cell.clone()
                } else {
                    let pad = widths[i].saturating_sub(cell.chars().count());
                    format!("{}{}", cell, " ".repeat(pad))
                }
            })
            .collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    }

    out
}
