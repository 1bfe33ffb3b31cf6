// src/lib.rs
// =============================================================================
// html-grader: a rule engine that grades HTML documents.
//
// A run takes raw HTML text and returns an AnalysisRun: one Finding per rule
// (plus any red flags from the pre-parse probes), a total score, a percentage
// and a verdict. The engine keeps no state between runs.
//
// Module map:
// - document: parsing and node handles
// - rules:    the Rule trait, the registry and every rule
// - sanity:   regex probes on the raw text
// - engine:   executor, async image-size phase, run assembly
// - score:    aggregation and verdicts
// - report:   JSON report, text transcript, display helpers
// - config:   constants and tunable settings
// - error:    error types
// =============================================================================

pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod report;
pub mod rules;
pub mod sanity;
pub mod score;

pub use config::GraderConfig;
pub use document::read_source;
pub use engine::{analyze, analyze_offline, prepare, AnalysisRun, PreparedRun};
pub use error::{GraderError, RuleError};
pub use rules::{Finding, Outcome, Rule, RuleInfo, RuleRegistry, Severity};
pub use score::{Score, Verdict};
