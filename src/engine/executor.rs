// src/engine/executor.rs
// =============================================================================
// Runs the rules against a parsed document, one at a time, in order.
//
// Every call to a rule's detect() is fenced off: if the rule returns an error
// OR panics, that rule gets a synthetic failing Finding and the loop moves on.
// One broken rule never takes the rest of the batch down with it.
//
// Rules that need network evidence (only image-size today) keep their
// optimistic placeholder here. The executor records which slot to overwrite
// and gathers the plain data the async phase will need, so that phase never
// touches the parsed tree.
// =============================================================================

use super::images::{collect_targets, ImageTarget};
use crate::document::Document;
use crate::error::RuleError;
use crate::rules::{Finding, Outcome, Refinement, Rule};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, warn};

const INTERNAL_ERROR_MESSAGE: &str = "Internal error during validation.";
const INTERNAL_ERROR_SUGGESTION: &str = "Contact the instructor if this error persists.";

/// Async work still owed to one Finding
#[derive(Debug, Clone)]
pub struct PendingRefinement {
    /// Index of the Finding to replace
    pub slot: usize,
    pub work: PendingWork,
}

/// The data each kind of refinement carries
#[derive(Debug, Clone)]
pub enum PendingWork {
    ImageSizes(Vec<ImageTarget>),
}

/// Output of the synchronous phase
#[derive(Debug, Default)]
pub struct Execution {
    pub findings: Vec<Finding>,
    pub pending: Vec<PendingRefinement>,
}

/// Runs every rule in order, isolating failures
pub fn run(rules: &[Box<dyn Rule>], document: &Document, raw: &str) -> Execution {
    let mut execution = Execution::default();

    for rule in rules {
        let info = rule.info();
        debug!(rule = info.id, "running rule");

        let outcome = match isolated(rule.as_ref(), document, raw) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(rule = info.id, error = %e, "rule failed, recording internal error");
                Outcome::fail(INTERNAL_ERROR_MESSAGE, INTERNAL_ERROR_SUGGESTION)
            }
        };

        // Only a rule that actually ran gets its placeholder refined
        if outcome.passed {
            if let Some(refinement) = rule.refinement() {
                match prepare_work(refinement, document) {
                    Ok(work) => execution.pending.push(PendingRefinement {
                        slot: execution.findings.len(),
                        work,
                    }),
                    Err(e) => {
                        warn!(rule = info.id, error = %e, "could not prepare async check")
                    }
                }
            }
        }

        execution.findings.push(Finding::new(info.clone(), outcome));
    }

    execution
}

fn isolated(rule: &dyn Rule, document: &Document, raw: &str) -> Result<Outcome, RuleError> {
    match panic::catch_unwind(AssertUnwindSafe(|| rule.detect(document, raw))) {
        Ok(result) => result,
        Err(payload) => Err(RuleError::Panicked(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn prepare_work(refinement: Refinement, document: &Document) -> Result<PendingWork, RuleError> {
    match refinement {
        Refinement::ImageSizes => Ok(PendingWork::ImageSizes(collect_targets(document)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{ImageSize, NoTables, RuleInfo, Severity};

    struct Failing(RuleInfo);
    struct Panicking(RuleInfo);

    fn info(id: &'static str) -> RuleInfo {
        RuleInfo {
            id,
            description: "Broken rule",
            severity: Severity::Error,
            points_on_pass: 1,
            points_on_fail: -2,
        }
    }

    impl Rule for Failing {
        fn info(&self) -> &RuleInfo {
            &self.0
        }

        fn detect(&self, _: &Document, _: &str) -> Result<Outcome, RuleError> {
            Err(RuleError::Other("boom".into()))
        }
    }

    impl Rule for Panicking {
        fn info(&self) -> &RuleInfo {
            &self.0
        }

        fn detect(&self, _: &Document, _: &str) -> Result<Outcome, RuleError> {
            panic!("rule exploded")
        }
    }

    #[test]
    fn test_broken_rules_are_isolated() {
        let raw = "<p>text</p>";
        let doc = Document::parse(raw).unwrap();
        let rules: Vec<Box<dyn Rule>> = vec![
            Box::new(Failing(info("failing"))),
            Box::new(NoTables),
            Box::new(Panicking(info("panicking"))),
        ];

        let execution = run(&rules, &doc, raw);
        let ids: Vec<_> = execution.findings.iter().map(|f| f.rule_id()).collect();
        assert_eq!(ids, vec!["failing", "no-tables", "panicking"]);

        for broken in [&execution.findings[0], &execution.findings[2]] {
            assert!(!broken.passed());
            assert_eq!(broken.outcome.message, INTERNAL_ERROR_MESSAGE);
            assert_eq!(
                broken.outcome.suggestion.as_deref(),
                Some(INTERNAL_ERROR_SUGGESTION)
            );
            assert_eq!(broken.points(), -2);
        }
        assert!(execution.findings[1].passed());
        assert!(execution.pending.is_empty());
    }

    #[test]
    fn test_image_size_leaves_pending_work() {
        let raw = r#"<p>x</p><img src="https://a.example.com/cat.png" alt="cat">"#;
        let doc = Document::parse(raw).unwrap();
        let rules: Vec<Box<dyn Rule>> = vec![Box::new(NoTables), Box::new(ImageSize)];

        let execution = run(&rules, &doc, raw);
        assert!(execution.findings[1].passed());
        assert_eq!(execution.pending.len(), 1);
        assert_eq!(execution.pending[0].slot, 1);

        let PendingWork::ImageSizes(targets) = &execution.pending[0].work;
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].src, "https://a.example.com/cat.png");
    }

    #[test]
    fn test_panic_message_extraction() {
        let payload: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(payload.as_ref()), "owned");
        let payload: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic");
    }
}
