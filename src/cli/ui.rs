//! Terminal output helpers for the CLI: status lines, the progress
//! spinner, and the rendered evaluation report.

use crate::core::analyzers::{AnalyzerStatus, MetricValue};
use crate::core::evaluation::EvaluationReport;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// Print a success message with a green check mark.
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print a warning message with a yellow marker.
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an error message with a red cross to stderr.
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Spinner shown while the pipeline stages run.
pub fn create_progress_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

#[derive(Tabled)]
struct ComponentRow {
    #[tabled(rename = "Component")]
    component: String,
    #[tabled(rename = "Score")]
    score: String,
    #[tabled(rename = "Status")]
    status: String,
}

fn status_label(status: AnalyzerStatus) -> String {
    match status {
        AnalyzerStatus::Ok => "ok".green().to_string(),
        AnalyzerStatus::Degraded => "degraded".yellow().to_string(),
        AnalyzerStatus::Failed => "failed".red().to_string(),
        AnalyzerStatus::Skipped => "skipped".dimmed().to_string(),
    }
}

fn score_color(score: i64) -> String {
    let text = format!("{}/100", score);
    if score >= 80 {
        text.green().to_string()
    } else if score >= 60 {
        text.yellow().to_string()
    } else {
        text.red().to_string()
    }
}

/// Render the full evaluation report to the terminal.
pub fn display_report(report: &EvaluationReport) {
    println!();
    println!(
        "{} {} ({})",
        "Overall score:".bold(),
        score_color(report.final_score),
        report.rating.cyan()
    );
    println!();

    let rows: Vec<ComponentRow> = report
        .analyzers
        .iter()
        .map(|result| ComponentRow {
            component: result.analyzer_id.clone(),
            score: format!("{}", result.score.round() as i64),
            status: status_label(result.status),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}", table);

    println!();
    println!("{}", "Transcript".bold());
    println!(
        "  {} words, {} pauses, {:.2} words/s",
        report
            .transcript
            .text
            .split_whitespace()
            .count(),
        report.transcript.pause_count,
        report.transcript.speaking_rate
    );
    if !report.transcript.annotated.is_empty() {
        println!("  {}", report.transcript.annotated.dimmed());
    }

    for result in &report.analyzers {
        if result.feedback.is_empty() && result.metrics.is_empty() {
            continue;
        }
        println!();
        println!("{}", format!("{} details", result.analyzer_id).bold());
        for (key, value) in &result.metrics {
            let rendered = match value {
                MetricValue::Number(n) => format!("{}", n),
                MetricValue::Text(t) => t.clone(),
                MetricValue::List(items) => items.join(", "),
            };
            println!("  {}: {}", key.dimmed(), rendered);
        }
        for line in &result.feedback {
            println!("  - {}", line);
        }
        if let Some(error) = &result.error {
            println!("  {} {}", "note:".yellow(), error);
        }
    }

    if !report.suggestions.is_empty() {
        println!();
        println!("{}", "Improvement suggestions".bold());
        for suggestion in &report.suggestions {
            println!("  - {}", suggestion);
        }
    }
    println!();
}
