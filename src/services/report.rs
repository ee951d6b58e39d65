//! Plain-text rendering of rankings and history.

use crate::services::ranking::RankingReport;
use crate::types::{CoinStats, HistoryEntry, ReportRow, RunResult};
use std::fmt::Write;

const MAX_FACTORS_SHOWN: usize = 4;

fn medal(rank: usize) -> String {
    match rank {
        1 => "🥇".to_string(),
        2 => "🥈".to_string(),
        3 => "🥉".to_string(),
        n => format!("{:>2}.", n),
    }
}

/// One-line summary of a ranked row, as stored in the history log.
pub fn format_row(row: &ReportRow) -> String {
    let mut line = format!(
        "{} {:<6} | Score: {:>5.1} | {}",
        medal(row.rank),
        row.symbol,
        row.score,
        row.category.label()
    );
    if let Some(forecast) = row.forecast_percent {
        let _ = write!(line, " | Forecast: {:+.1}%", forecast);
    }
    line
}

/// History record for a finished run.
pub fn run_result(report: &RankingReport) -> RunResult {
    let rows = report.rows();
    let lines = rows.iter().map(format_row).collect();
    RunResult::success(rows, lines)
}

/// Full console table: one summary line per coin plus its leading factors.
pub fn render_report(report: &RankingReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Top {} of {} scored coins ({})",
        report.predictions.len(),
        report.scored_count,
        report.generated_at.format("%Y-%m-%d %H:%M UTC")
    );
    let _ = writeln!(out, "{}", "-".repeat(60));

    for row in report.rows() {
        let _ = writeln!(out, "{}", format_row(&row));
        for factor in row.factors.iter().take(MAX_FACTORS_SHOWN) {
            let _ = writeln!(out, "      • {}", factor);
        }
        if row.factors.len() > MAX_FACTORS_SHOWN {
            let _ = writeln!(
                out,
                "      … {} more",
                row.factors.len() - MAX_FACTORS_SHOWN
            );
        }
    }

    if !report.failed_symbols.is_empty() {
        let _ = writeln!(out, "{}", "-".repeat(60));
        let _ = writeln!(out, "Skipped: {}", report.failed_symbols.join(", "));
    }
    out
}

/// Recent runs, newest first.
pub fn render_history(entries: &[HistoryEntry], total: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Prediction history: {} runs stored", total);

    for (i, entry) in entries.iter().enumerate() {
        let _ = writeln!(
            out,
            "\n{}. {}",
            i + 1,
            entry.timestamp.format("%Y-%m-%d %H:%M UTC")
        );
        if entry.result.success {
            for line in &entry.result.all_coins {
                let _ = writeln!(out, "   {}", line.trim());
            }
        } else {
            let _ = writeln!(
                out,
                "   failed: {}",
                entry.result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }
    out
}

/// Coin frequency table for one period.
pub fn render_stats(label: &str, stats: &[CoinStats], limit: usize) -> String {
    let mut out = String::new();
    if stats.is_empty() {
        let _ = writeln!(out, "{}: no runs", label);
        return out;
    }
    let _ = writeln!(out, "{}:", label);
    for s in stats.iter().take(limit) {
        let _ = writeln!(
            out,
            "   {:<6} seen {:>3}x | avg {:>5.1} | max {:>5.1} | min {:>5.1}",
            s.symbol, s.appearances, s.avg_score, s.max_score, s.min_score
        );
    }
    out
}
