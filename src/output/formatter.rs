use owo_colors::OwoColorize;
use serde::Serialize;
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};

use crate::persistence::SimulationRecord;
use crate::profile::{Profile, Scenario};
use crate::scoring::{Projection, WeightBreakdown, WeightVector, MAX_SCORE, MIN_SCORE};
use crate::timeline::TimelinePoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Good,
    Fair,
    Poor,
    VeryPoor,
}

impl ScoreBand {
    pub fn of(score: i32) -> Self {
        if score >= 740 {
            ScoreBand::Good
        } else if score >= 670 {
            ScoreBand::Fair
        } else if score >= 580 {
            ScoreBand::Poor
        } else {
            ScoreBand::VeryPoor
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScoreBand::Good => "good",
            ScoreBand::Fair => "fair",
            ScoreBand::Poor => "poor",
            ScoreBand::VeryPoor => "very poor",
        }
    }
}

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to None for pipes
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

fn paint_score(score: i32, use_colors: bool) -> String {
    let text = score.to_string();
    if !use_colors {
        return text;
    }
    match ScoreBand::of(score) {
        ScoreBand::Good => text.green().bold().to_string(),
        ScoreBand::Fair => text.cyan().bold().to_string(),
        ScoreBand::Poor => text.yellow().bold().to_string(),
        ScoreBand::VeryPoor => text.red().bold().to_string(),
    }
}

/// Whole dollars with thousands separators: 11000.4 -> "$11,000"
pub fn format_money(amount: f64) -> String {
    let rounded = amount.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if rounded < 0 {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

/// Headline numbers for a projection.
pub fn format_kpis(projection: &Projection, scenario: Scenario, use_colors: bool) -> String {
    let heading = format!("Projection ({})", scenario.label());
    let gain = format!("{:+}", projection.score_gain);

    let mut lines = vec![
        if use_colors {
            heading.bold().to_string()
        } else {
            heading
        },
        format!(
            "  Current score:     {} ({})",
            paint_score(projection.initial_score, use_colors),
            ScoreBand::of(projection.initial_score).label()
        ),
        format!(
            "  Low point:         {}",
            paint_score(projection.low_point_score, use_colors)
        ),
        format!(
            "  Projected score:   {} ({}) after {} months",
            paint_score(projection.projected_score, use_colors),
            ScoreBand::of(projection.projected_score).label(),
            projection.recovery_months
        ),
        format!(
            "  Change:            {}",
            if use_colors {
                if projection.score_gain >= 0 {
                    gain.green().to_string()
                } else {
                    gain.red().to_string()
                }
            } else {
                gain
            }
        ),
        format!(
            "  Estimated savings: {}",
            format_money(projection.estimated_savings_usd)
        ),
        format!(
            "  Post-program DTI:  {:.1}%",
            projection.post_program_dti_pct
        ),
    ];

    if scenario == Scenario::NewClient {
        lines.push(format!(
            "  Enrollment dip:    -{} points",
            projection.impact_penalty
        ));
    }

    lines.join("\n")
}

pub fn format_milestones(projection: &Projection, use_colors: bool) -> String {
    let m = &projection.milestones;
    format!(
        "Milestones\n  Dip:            {}\n  Stabilization:  {}\n  Recovery:       {}",
        paint_score(m.dip, use_colors),
        paint_score(m.stabilization, use_colors),
        paint_score(m.recovery, use_colors)
    )
}

/// Horizontal bar chart of the timeline, one row per point.
/// Bars span the 300-850 range; `width` is the total line width available.
pub fn format_chart(points: &[TimelinePoint], width: Option<usize>, use_colors: bool) -> String {
    if points.is_empty() {
        return String::new();
    }

    // "Month 60  Stabilization  850  " = 31 chars before the bar
    let label_width = 31;
    let bar_width = width
        .map(|w| w.saturating_sub(label_width + 1))
        .unwrap_or(40)
        .clamp(10, 60);

    let span = (MAX_SCORE - MIN_SCORE) as f64;

    points
        .iter()
        .map(|point| {
            let fraction = ((point.score - MIN_SCORE) as f64 / span).clamp(0.0, 1.0);
            let filled = ((fraction * bar_width as f64).round() as usize).max(1);
            let bar = "#".repeat(filled);
            let bar = if use_colors {
                match ScoreBand::of(point.score) {
                    ScoreBand::Good => bar.green().to_string(),
                    ScoreBand::Fair => bar.cyan().to_string(),
                    ScoreBand::Poor => bar.yellow().to_string(),
                    ScoreBand::VeryPoor => bar.red().to_string(),
                }
            } else {
                bar
            };
            format!(
                "Month {:>2}  {:<13}  {:>3}  {}",
                point.month,
                point.stage.label(),
                point.score,
                bar
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Chart sized to the current terminal.
pub fn format_timeline(points: &[TimelinePoint], use_colors: bool) -> String {
    format!(
        "Timeline\n{}",
        format_chart(points, get_terminal_width(), use_colors)
    )
}

fn format_weight_row(name: &str, value: f64) -> String {
    format!("  {:<16} {:>5.1}%", name, value * 100.0)
}

pub fn format_weights(weights: &WeightVector) -> String {
    [
        ("Payment history", weights.payment_history),
        ("Utilization", weights.utilization),
        ("Account age", weights.account_age),
        ("Credit mix", weights.credit_mix),
        ("New credit", weights.new_credit),
    ]
    .iter()
    .map(|(name, value)| format_weight_row(name, *value))
    .collect::<Vec<_>>()
    .join("\n")
}

/// Verbose explanation of how the weights were derived.
pub fn format_weight_breakdown(breakdown: &WeightBreakdown) -> String {
    let mut lines = vec!["Weight adjustments".to_string()];
    if breakdown.steps.is_empty() {
        lines.push("  (none, base weights used)".to_string());
    }
    for step in &breakdown.steps {
        lines.push(format!("  {}: {}", step.label, step.description));
    }
    lines.push("Normalized weights".to_string());
    lines.push(format_weights(&breakdown.normalized));
    lines.join("\n")
}

pub fn format_gains(projection: &Projection) -> String {
    let g = &projection.gains;
    [
        "Projected gain".to_string(),
        format!("  Utilization:      {:+.1}", g.utilization),
        format!("  Payment history:  {:+.1}", g.payment_history),
        format!("  Account age:      {:+.1}", g.account_age),
        format!("  Credit tools:     {:+.1}", g.tools),
        format!("  Total:            {:+.1}", g.total),
    ]
    .join("\n")
}

#[derive(Serialize)]
struct JsonReport<'a> {
    profile: &'a Profile,
    projection: &'a Projection,
    timeline: &'a [TimelinePoint],
}

/// Pretty JSON for scripting.
pub fn format_json(
    profile: &Profile,
    projection: &Projection,
    timeline: &[TimelinePoint],
) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&JsonReport {
        profile,
        projection,
        timeline,
    })
}

/// Saved simulations, one per line, most recent first as given.
pub fn format_history<'a>(
    records: impl IntoIterator<Item = &'a SimulationRecord>,
    use_colors: bool,
) -> String {
    let lines: Vec<String> = records
        .into_iter()
        .enumerate()
        .map(|(idx, record)| {
            let when = record
                .saved_at
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "unsaved".to_string());
            let p = &record.projection;
            let index = format!("{:>2}.", idx + 1);
            format!(
                "{} {}  {:<12}  {} -> {}  ({:+}, {} months, {} saved)",
                if use_colors {
                    index.dimmed().to_string()
                } else {
                    index
                },
                when,
                record.user_id,
                paint_score(p.initial_score, use_colors),
                paint_score(p.projected_score, use_colors),
                p.score_gain,
                p.recovery_months,
                format_money(p.estimated_savings_usd)
            )
        })
        .collect();

    if lines.is_empty() {
        "No saved simulations.".to_string()
    } else {
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::types::sample_profile;
    use crate::scoring::{explain_weights, run_simulation};
    use crate::timeline::build_timeline;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_score_bands() {
        assert_eq!(ScoreBand::of(850), ScoreBand::Good);
        assert_eq!(ScoreBand::of(740), ScoreBand::Good);
        assert_eq!(ScoreBand::of(739), ScoreBand::Fair);
        assert_eq!(ScoreBand::of(670), ScoreBand::Fair);
        assert_eq!(ScoreBand::of(580), ScoreBand::Poor);
        assert_eq!(ScoreBand::of(579), ScoreBand::VeryPoor);
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(0.0), "$0");
        assert_eq!(format_money(999.4), "$999");
        assert_eq!(format_money(11000.0), "$11,000");
        assert_eq!(format_money(1_234_567.0), "$1,234,567");
        assert_eq!(format_money(-2500.0), "-$2,500");
    }

    #[test]
    fn test_format_kpis_new_client() {
        let projection = run_simulation(&sample_profile());
        let result = format_kpis(&projection, Scenario::NewClient, false);
        assert!(result.contains("Projection (New client)"));
        assert!(result.contains("Current score:     650 (poor)"));
        assert!(result.contains("Low point:         613"));
        assert!(result.contains("Projected score:   741 (good) after 36 months"));
        assert!(result.contains("Change:            +91"));
        assert!(result.contains("Estimated savings: $11,000"));
        assert!(result.contains("Post-program DTI:  0.9%"));
        assert!(result.contains("Enrollment dip:    -37 points"));
    }

    #[test]
    fn test_format_kpis_existing_client_has_no_dip_line() {
        let mut profile = sample_profile();
        profile.scenario = Scenario::ExistingClient;
        let projection = run_simulation(&profile);
        let result = format_kpis(&projection, Scenario::ExistingClient, false);
        assert!(!result.contains("Enrollment dip"));
    }

    #[test]
    fn test_format_milestones() {
        let projection = run_simulation(&sample_profile());
        let result = format_milestones(&projection, false);
        assert!(result.contains("Dip:            613"));
        assert!(result.contains("Stabilization:  632"));
        assert!(result.contains("Recovery:       696"));
    }

    #[test]
    fn test_format_chart_rows() {
        let projection = run_simulation(&sample_profile());
        let points = build_timeline(&projection, Scenario::NewClient);
        let result = format_chart(&points, Some(80), false);
        let lines: Vec<&str> = result.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("Month  0  Today"));
        assert!(lines[4].starts_with("Month 36  Projected"));
        assert!(lines[4].contains(" 741 "));

        // Higher scores get longer bars
        let bar_len = |line: &str| line.chars().filter(|c| *c == '#').count();
        assert!(bar_len(lines[4]) > bar_len(lines[1]));
    }

    #[test]
    fn test_format_chart_bar_width_bounds() {
        let projection = run_simulation(&sample_profile());
        let points = build_timeline(&projection, Scenario::NewClient);

        let narrow = format_chart(&points, Some(20), false);
        let wide = format_chart(&points, Some(500), false);
        let max_bar = |s: &str| {
            s.lines()
                .map(|l| l.chars().filter(|c| *c == '#').count())
                .max()
                .unwrap_or(0)
        };
        assert!(max_bar(&narrow) <= 10);
        assert!(max_bar(&wide) <= 60);
        assert_eq!(format_chart(&[], Some(80), false), "");
    }

    #[test]
    fn test_format_weight_breakdown() {
        let result = format_weight_breakdown(&explain_weights(&sample_profile()));
        assert!(result.contains("Positive accounts: 1 positive account(s) kept open"));
        assert!(result.contains("Payment history   30.0%"));
        assert!(result.contains("Credit mix        15.0%"));
    }

    #[test]
    fn test_format_gains() {
        let projection = run_simulation(&sample_profile());
        let result = format_gains(&projection);
        assert!(result.contains("Utilization:      +75.0"));
        assert!(result.contains("Total:            +127.5"));
    }

    #[test]
    fn test_format_json() {
        let profile = sample_profile();
        let projection = run_simulation(&profile);
        let timeline = build_timeline(&projection, profile.scenario);
        let json = format_json(&profile, &projection, &timeline).unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["projection"]["projected_score"], 741);
        assert_eq!(value["profile"]["scenario"], "new_client");
        assert_eq!(value["timeline"][1]["stage"], "dip");
    }

    #[test]
    fn test_format_history_empty() {
        let records: Vec<SimulationRecord> = vec![];
        assert_eq!(format_history(&records, false), "No saved simulations.");
    }

    #[test]
    fn test_format_history_rows() {
        let profile = sample_profile();
        let projection = run_simulation(&profile);
        let mut record = SimulationRecord::new("alice", profile, projection);
        record.saved_at = Some(Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap());

        let records = vec![record];
        let result = format_history(&records, false);
        assert!(result.starts_with(" 1. 2026-03-01 09:30  alice"));
        assert!(result.contains("650 -> 741"));
        assert!(result.contains("(+91, 36 months, $11,000 saved)"));
    }
}
