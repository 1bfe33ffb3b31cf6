// src/score.rs
// =============================================================================
// Turns a list of findings into a score and a verdict.
//
// - total score: sum of each finding's points (pass or fail points)
// - percentage: the total normalized to 0..100 as if every rule were worth
//   +1 on pass and -2 on fail, then clamped
// - verdict: passed at >= 60%, improvable at >= 30%, failed below that
// =============================================================================

use crate::config::{DEFAULT_ERROR_POINTS, DEFAULT_SUCCESS_POINTS, PASSING_SCORE};
use crate::rules::Finding;
use serde::Serialize;
use std::fmt;

/// Aggregate numbers for one run
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Score {
    pub total_score: i32,
    pub passed_count: usize,
    pub failed_count: usize,
    pub percentage: f64,
}

/// Pass/fail classification of a percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Passed,
    Improvable,
    Failed,
}

impl Verdict {
    /// Classifies a percentage against the fixed passing score
    pub fn classify(percentage: f64) -> Self {
        if percentage >= PASSING_SCORE {
            Verdict::Passed
        } else if percentage >= PASSING_SCORE / 2.0 {
            Verdict::Improvable
        } else {
            Verdict::Failed
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Passed => "Passed",
            Verdict::Improvable => "Needs improvement",
            Verdict::Failed => "Failed",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Score {
    pub fn verdict(&self) -> Verdict {
        Verdict::classify(self.percentage)
    }
}

/// Scores a set of findings
pub fn score(findings: &[Finding]) -> Score {
    let total_score: i32 = findings.iter().map(Finding::points).sum();
    let passed_count = findings.iter().filter(|f| f.passed()).count();
    let failed_count = findings.len() - passed_count;

    let percentage = if findings.is_empty() {
        0.0
    } else {
        let adjusted = total_score as f64 + failed_count as f64 * DEFAULT_ERROR_POINTS.abs() as f64;
        let nominal = findings.len() as f64 * DEFAULT_SUCCESS_POINTS as f64;
        (adjusted / nominal * 100.0).clamp(0.0, 100.0)
    };

    Score {
        total_score,
        passed_count,
        failed_count,
        percentage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{Outcome, RuleInfo, Severity};

    fn finding(passed: bool, on_pass: i32, on_fail: i32) -> Finding {
        let rule = RuleInfo {
            id: "test-rule",
            description: "Test rule",
            severity: Severity::Error,
            points_on_pass: on_pass,
            points_on_fail: on_fail,
        };
        let outcome = if passed {
            Outcome::pass("ok")
        } else {
            Outcome::fail("bad", "fix it")
        };
        Finding::new(rule, outcome)
    }

    #[test]
    fn test_one_pass_one_fail() {
        let result = score(&[finding(true, 1, -2), finding(false, 1, -2)]);
        assert_eq!(result.total_score, -1);
        assert_eq!(result.passed_count, 1);
        assert_eq!(result.failed_count, 1);
        // (-1 + 1 * 2) / (2 * 1) * 100
        assert_eq!(result.percentage, 50.0);
        assert_eq!(result.verdict(), Verdict::Improvable);
    }

    #[test]
    fn test_percentage_clamped_at_zero() {
        let findings: Vec<_> = (0..10).map(|_| finding(false, 0, -5)).collect();
        let result = score(&findings);
        assert_eq!(result.total_score, -50);
        assert_eq!(result.percentage, 0.0);
        assert_eq!(result.verdict(), Verdict::Failed);
    }

    #[test]
    fn test_percentage_clamped_at_hundred() {
        let result = score(&[finding(true, 2, -3), finding(true, 2, -5)]);
        assert_eq!(result.total_score, 4);
        assert_eq!(result.percentage, 100.0);
        assert_eq!(result.verdict(), Verdict::Passed);
    }

    #[test]
    fn test_empty_findings() {
        let result = score(&[]);
        assert_eq!(result.total_score, 0);
        assert_eq!(result.percentage, 0.0);
    }

    #[test]
    fn test_percentage_always_in_range() {
        for passes in 0..6 {
            for fails in 0..6 {
                let mut findings: Vec<_> = (0..passes).map(|_| finding(true, 2, -5)).collect();
                findings.extend((0..fails).map(|_| finding(false, 2, -5)));
                let result = score(&findings);
                assert!((0.0..=100.0).contains(&result.percentage));
            }
        }
    }

    #[test]
    fn test_verdict_thresholds() {
        assert_eq!(Verdict::classify(60.0), Verdict::Passed);
        assert_eq!(Verdict::classify(59.9), Verdict::Improvable);
        assert_eq!(Verdict::classify(30.0), Verdict::Improvable);
        assert_eq!(Verdict::classify(29.9), Verdict::Failed);
    }
}
