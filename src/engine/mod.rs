// src/engine/mod.rs
// =============================================================================
// One analysis run, start to finish.
//
// The flow:
// 1. Pre-parse sanity probes on the raw text
// 2. Parse (blank or markup-free input stops here with an error)
// 3. Run every rule synchronously (executor.rs)
// 4. Optionally finish the async image-size check (images.rs)
// 5. Score the findings
//
// After step 3 the run is already complete and scoreable: `provisional()`
// gives the optimistic result. `finish()` swaps in the real image-size
// verdict. Dropping the prepared run (or the future returned by finish)
// abandons any probes still in flight.
// =============================================================================

pub mod executor;
pub mod images;
pub mod probe;

pub use probe::{HttpProbe, ImageProbe, ProbeError};

use crate::config::GraderConfig;
use crate::document::Document;
use crate::error::Result;
use crate::rules::{Finding, RuleRegistry};
use crate::sanity;
use crate::score::{score, Score, Verdict};
use executor::{PendingRefinement, PendingWork};
use serde::Serialize;
use tracing::{debug, info};

/// All findings for one document, plus the aggregate score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisRun {
    pub findings: Vec<Finding>,
    pub score: Score,
    pub verdict: Verdict,
}

impl AnalysisRun {
    fn from_findings(findings: Vec<Finding>) -> Self {
        let score = score(&findings);
        Self {
            verdict: score.verdict(),
            findings,
            score,
        }
    }
}

/// A run whose synchronous phase is done
///
/// Holds no reference to the parsed tree, so it can be moved across tasks.
#[derive(Debug)]
pub struct PreparedRun {
    findings: Vec<Finding>,
    pending: Vec<PendingRefinement>,
}

/// Runs the sanity probes and every rule; no network involved
pub fn prepare(raw: &str, registry: &RuleRegistry) -> Result<PreparedRun> {
    let mut findings = sanity::check(raw);
    let document = Document::parse(raw)?;
    debug!(elements = document.element_count(), "document parsed");

    let offset = findings.len();
    let execution = executor::run(registry.rules(), &document, raw);
    findings.extend(execution.findings);

    // Sanity findings come first, so every pending slot shifts by their count
    let pending = execution
        .pending
        .into_iter()
        .map(|mut refinement| {
            refinement.slot += offset;
            refinement
        })
        .collect();

    Ok(PreparedRun { findings, pending })
}

impl PreparedRun {
    /// The findings as they stand, async-backed rules still optimistic
    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    /// Whether any rule is still waiting for async evidence
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Scores the run without waiting for the async phase
    pub fn provisional(&self) -> AnalysisRun {
        AnalysisRun::from_findings(self.findings.clone())
    }

    /// Completes every pending refinement, then scores the run
    pub async fn finish(mut self, probe: &dyn ImageProbe, config: &GraderConfig) -> AnalysisRun {
        for refinement in std::mem::take(&mut self.pending) {
            let outcome = match refinement.work {
                PendingWork::ImageSizes(targets) => {
                    images::check_image_sizes(targets, probe, config).await
                }
            };
            if let Some(finding) = self.findings.get_mut(refinement.slot) {
                finding.outcome = outcome;
            }
        }
        AnalysisRun::from_findings(self.findings)
    }
}

/// Analyzes a document with the standard rules, probing images over HTTPS
/// unless the config turns the network phase off
pub async fn analyze(raw: &str, config: &GraderConfig) -> Result<AnalysisRun> {
    let registry = RuleRegistry::standard();
    let prepared = prepare(raw, &registry)?;

    if !config.check_image_sizes || !prepared.has_pending() {
        return Ok(prepared.provisional());
    }

    let probe = HttpProbe::new(config.probe_timeout)?;
    let run = prepared.finish(&probe, config).await;
    info!(
        percentage = run.score.percentage,
        verdict = %run.verdict,
        "analysis finished"
    );
    Ok(run)
}

/// Analyzes a document with the standard rules and no network access
///
/// The image-size rule keeps its optimistic placeholder.
pub fn analyze_offline(raw: &str) -> Result<AnalysisRun> {
    Ok(prepare(raw, &RuleRegistry::standard())?.provisional())
}
