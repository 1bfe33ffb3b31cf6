// src/sanity.rs
// =============================================================================
// Red-flag checks on the raw text, run BEFORE parsing.
//
// The HTML parser is forgiving: it quietly closes a heading that was never
// closed, or untangles badly nested tags. That's great for browsers but it
// hides exactly the mistakes we want to report. These regex probes look at
// the untouched source instead.
//
// Each probe that fires adds one failing error Finding worth -5 points.
// There is no tree yet, so these findings never point at any element.
// =============================================================================

use crate::rules::{Finding, Outcome, RuleInfo, Severity};
use once_cell::sync::Lazy;
use regex::Regex;

const SUGGESTION: &str =
    "Review the HTML structure and make sure every tag is properly closed and nested.";

struct Probe {
    id: &'static str,
    message: &'static str,
    // The probe fires if any of these match
    patterns: Vec<Regex>,
}

static PROBES: Lazy<Vec<Probe>> = Lazy::new(|| {
    vec![
        Probe {
            id: "malformed-headers",
            message: "nested or unclosed heading tags",
            patterns: vec![Regex::new(r"(?i)<h[1-6][^>]*>\s*<h[1-6][^>]*>")
                .expect("valid heading probe")],
        },
        Probe {
            id: "malformed-nesting",
            message: "duplicated or badly nested tags",
            patterns: ["div", "p", "span"]
                .iter()
                .map(|tag| {
                    Regex::new(&format!(r"(?i)<{tag}\b[^>]*>\s*<{tag}\b[^>]*>"))
                        .expect("valid nesting probe")
                })
                .collect(),
        },
        Probe {
            id: "malformed-closing",
            message: "several consecutive closing tags",
            patterns: vec![Regex::new(r"</[^>]+>\s*</[^>]+>").expect("valid closing probe")],
        },
    ]
});

/// Metadata shared by every pre-parse finding
fn probe_rule(id: &'static str) -> RuleInfo {
    RuleInfo {
        id,
        description: "Malformed HTML detected",
        severity: Severity::Error,
        points_on_pass: 0,
        points_on_fail: -5,
    }
}

/// Runs every probe against the raw text
pub fn check(raw: &str) -> Vec<Finding> {
    PROBES
        .iter()
        .filter(|probe| probe.patterns.iter().any(|pattern| pattern.is_match(raw)))
        .map(|probe| {
            tracing::debug!(probe = probe.id, "pre-parse probe fired");
            Finding::new(
                probe_rule(probe.id),
                Outcome::fail(format!("Critical: {}", probe.message), SUGGESTION),
            )
        })
        .collect()
}
