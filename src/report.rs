// src/report.rs
// =============================================================================
// Everything a reader of the results needs, built from an AnalysisRun:
// - a JSON report (timestamped summary + one entry per finding)
// - a plain-text transcript suitable for pasting as feedback
// - the display order and status labels used by the terminal table
//
// None of this changes a finding; it only arranges and formats them.
// =============================================================================

use crate::document::line_of;
use crate::engine::AnalysisRun;
use crate::rules::{Finding, Severity};
use crate::score::Verdict;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::{self, Write};

/// The exported report
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub timestamp: String,
    pub summary: Summary,
    pub results: Vec<ReportEntry>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_score: i32,
    pub percentage: f64,
    pub status: Verdict,
    pub passed_rules: usize,
    pub failed_rules: usize,
}

/// One finding, flattened for export
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportEntry {
    pub rule_id: &'static str,
    pub rule_name: &'static str,
    pub rule_type: Severity,
    pub passed: bool,
    pub message: String,
    pub suggestion: Option<String>,
    pub points: i32,
    /// Source line of the first implicated element, when it can be found
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl Report {
    /// Builds a report stamped with the current time
    pub fn new(run: &AnalysisRun, raw: &str) -> Self {
        Self::at(run, raw, Utc::now())
    }

    /// Builds a report stamped with the given time
    pub fn at(run: &AnalysisRun, raw: &str, timestamp: DateTime<Utc>) -> Self {
        let results = run
            .findings
            .iter()
            .map(|finding| ReportEntry {
                rule_id: finding.rule.id,
                rule_name: finding.rule.description,
                rule_type: finding.rule.severity,
                passed: finding.passed(),
                message: finding.outcome.message.clone(),
                suggestion: finding.outcome.suggestion.clone(),
                points: finding.points(),
                line: first_line(finding, raw),
            })
            .collect();

        Self {
            timestamp: timestamp.to_rfc3339(),
            summary: Summary {
                total_score: run.score.total_score,
                percentage: run.score.percentage,
                status: run.verdict,
                passed_rules: run.score.passed_count,
                failed_rules: run.score.failed_count,
            },
            results,
        }
    }
}

/// Line of the first element a finding points at
pub fn first_line(finding: &Finding, raw: &str) -> Option<usize> {
    finding
        .outcome
        .matches
        .first()
        .and_then(|node| line_of(node, raw))
}

/// Findings in reading order: failures first, errors before warnings
///
/// The sort is stable, so execution order survives within each group.
pub fn display_order(findings: &[Finding]) -> Vec<&Finding> {
    let mut ordered: Vec<&Finding> = findings.iter().collect();
    ordered.sort_by_key(|finding| (finding.passed(), finding.rule.severity != Severity::Error));
    ordered
}

/// Short status tag for one finding
pub fn status_label(finding: &Finding) -> &'static str {
    match (finding.passed(), finding.rule.severity) {
        (true, _) => "✅ PASSED",
        (false, Severity::Error) => "❌ ERROR",
        (false, Severity::Warning) => "⚠️  WARNING",
    }
}

/// Points with an explicit sign for positive values
pub fn signed_points(points: i32) -> String {
    if points > 0 {
        format!("+{}", points)
    } else {
        points.to_string()
    }
}

/// Cuts a string to at most `max` characters, marking the cut with "..."
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}

/// Plain-text feedback for the whole run
pub fn transcript(run: &AnalysisRun, generated: DateTime<Utc>) -> String {
    let mut out = String::new();
    write_transcript(&mut out, run, generated).expect("writing to a String cannot fail");
    out
}

/// Writes the transcript into any formatter sink
pub fn write_transcript(
    out: &mut impl fmt::Write,
    run: &AnalysisRun,
    generated: DateTime<Utc>,
) -> fmt::Result {
    writeln!(out, "HTML CODE REVIEW")?;
    writeln!(out, "{}\n", "=".repeat(37))?;
    writeln!(out, "SUMMARY:")?;
    writeln!(out, "- Score: {} points", run.score.total_score)?;
    writeln!(out, "- Percentage: {:.1}%", run.score.percentage)?;
    writeln!(out, "- Status: {}", run.verdict.label())?;
    writeln!(out, "- Passed rules: {}", run.score.passed_count)?;
    writeln!(out, "- Failed rules: {}\n", run.score.failed_count)?;

    writeln!(out, "DETAILED FINDINGS:")?;
    writeln!(out, "{}\n", "=".repeat(18))?;

    for (index, finding) in run.findings.iter().enumerate() {
        writeln!(
            out,
            "{}. [{}] {} ({} pts)",
            index + 1,
            status_label(finding),
            finding.rule.description,
            signed_points(finding.points())
        )?;
        writeln!(out, "   {}", finding.outcome.message)?;
        if let Some(suggestion) = &finding.outcome.suggestion {
            writeln!(out, "   💡 Suggestion: {}", suggestion)?;
        }
        writeln!(out)?;
    }

    writeln!(out, "\nGenerated by: html-grader")?;
    writeln!(out, "Date: {}", generated.format("%Y-%m-%d %H:%M:%S UTC"))
}
