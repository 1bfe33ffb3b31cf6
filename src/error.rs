// src/error.rs
// =============================================================================
// Error types for the grading engine.
//
// Only a few things can go wrong at the top level:
// - The input is blank or has no markup at all (fatal parse error)
// - The input file can't be read
// - The HTTP client for image probes can't be built
//
// Everything that goes wrong *inside* a rule or a probe is NOT an error here:
// it is turned into a Finding (see engine/executor.rs and engine/images.rs).
// =============================================================================

use thiserror::Error;

/// Errors that abort an analysis run before any rule executes
#[derive(Debug, Error)]
pub enum GraderError {
    /// Input was empty or whitespace only
    #[error("the submitted document is empty")]
    EmptyInput,

    /// Input contains no markup tag at all
    #[error("the submitted document contains no HTML markup")]
    NotHtml,

    /// Reading the input failed
    #[error("could not read input: {0}")]
    Io(#[from] std::io::Error),

    /// The HTTP client for image probes could not be created
    #[error("could not build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Raised by a rule's detection logic when it cannot produce an outcome
#[derive(Debug, Error)]
pub enum RuleError {
    /// A CSS selector failed to parse
    #[error("invalid selector `{0}`")]
    Selector(String),

    /// A rule panicked while running
    #[error("rule panicked: {0}")]
    Panicked(String),

    /// Anything else a rule wants to report
    #[error("{0}")]
    Other(String),
}

pub type Result<T, E = GraderError> = std::result::Result<T, E>;
