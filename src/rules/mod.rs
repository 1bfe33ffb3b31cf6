// src/rules/mod.rs
// =============================================================================
// This module defines what a rule is and holds the fixed rule set.
//
// A rule is a pure check: given the parsed document and the raw text it
// returns an Outcome (passed or not, which elements were involved, a message
// and maybe a suggestion). Rules never modify the document.
//
// Submodules (grouped by what they look at):
// - headings: h1 uniqueness and the heading/landmark sequence
// - markup: element/attribute restrictions (li, href, src, button, table...)
// - structure: document skeleton, landmarks, tag balance, semantic ratio
// - head: <title>, charset and viewport
// - navigation: the NAV > UL > LI > A shape
// - media: audio/video controls, alt text, image size placeholder
// - files: file and document naming
// =============================================================================

mod files;
mod head;
mod headings;
mod markup;
mod media;
mod navigation;
mod structure;

pub use files::{ValidDocumentNames, ValidFilenames};
pub use head::{DocumentTitle, Utf8Encoding, ValidViewport};
pub use headings::{HeadingHierarchy, UniqueH1};
pub use markup::{ButtonsInForms, HrefOnlyInA, LiInUl, NoTables, NoVisualTags, SrcOnlyInImg};
pub use media::{ImageAlt, ImageSize, MediaControls};
pub use navigation::NavStructure;
pub use structure::{ClosedTags, HtmlStructure, RequiredStructure, SemanticTags};

use crate::document::{Document, NodeRef};
use crate::error::RuleError;
use serde::Serialize;
use std::fmt;

/// How serious a failed rule is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// The fixed, descriptive part of a rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleInfo {
    /// Unique kebab-case identifier
    pub id: &'static str,
    /// Human-readable label
    pub description: &'static str,
    pub severity: Severity,
    /// Points added when the rule passes (>= 0)
    pub points_on_pass: i32,
    /// Points added when the rule fails (<= 0)
    pub points_on_fail: i32,
}

/// Result of running one rule once
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub passed: bool,
    /// Elements implicated in the finding (evidence only)
    pub matches: Vec<NodeRef>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl Outcome {
    /// A passing outcome with no suggestion
    pub fn pass(message: impl Into<String>) -> Self {
        Self {
            passed: true,
            matches: Vec::new(),
            message: message.into(),
            suggestion: None,
        }
    }

    /// A failing outcome with a remediation hint
    pub fn fail(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self {
            passed: false,
            matches: Vec::new(),
            message: message.into(),
            suggestion: Some(suggestion.into()),
        }
    }

    /// Attaches the elements this outcome is about
    pub fn with_matches(mut self, matches: Vec<NodeRef>) -> Self {
        self.matches = matches;
        self
    }
}

/// An outcome joined with the rule that produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub rule: RuleInfo,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl Finding {
    pub fn new(rule: RuleInfo, outcome: Outcome) -> Self {
        Self { rule, outcome }
    }

    pub fn rule_id(&self) -> &'static str {
        self.rule.id
    }

    pub fn passed(&self) -> bool {
        self.outcome.passed
    }

    /// Points this finding contributes to the total score
    pub fn points(&self) -> i32 {
        if self.outcome.passed {
            self.rule.points_on_pass
        } else {
            self.rule.points_on_fail
        }
    }
}

/// Extra asynchronous work a rule needs before its verdict is final
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refinement {
    /// Measure referenced images over the network
    ImageSizes,
}

/// A named, scored, pure check against a parsed document
pub trait Rule: Send + Sync {
    /// Identity, label, severity and points
    fn info(&self) -> &RuleInfo;

    /// Runs the check
    fn detect(&self, document: &Document, raw: &str) -> Result<Outcome, RuleError>;

    /// Async work that replaces this rule's provisional outcome, if any
    fn refinement(&self) -> Option<Refinement> {
        None
    }
}

/// The ordered set of rules an analysis runs
pub struct RuleRegistry {
    rules: Vec<Box<dyn Rule>>,
}

impl RuleRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// The full rule set, in registration order
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(UniqueH1));
        registry.register(Box::new(LiInUl));
        registry.register(Box::new(HrefOnlyInA));
        registry.register(Box::new(SrcOnlyInImg));
        registry.register(Box::new(ButtonsInForms));
        registry.register(Box::new(NoTables));
        registry.register(Box::new(NoVisualTags));
        registry.register(Box::new(SemanticTags));
        registry.register(Box::new(RequiredStructure));
        registry.register(Box::new(ValidFilenames));
        registry.register(Box::new(ImageSize));
        registry.register(Box::new(DocumentTitle));
        registry.register(Box::new(Utf8Encoding));
        registry.register(Box::new(MediaControls));
        registry.register(Box::new(ValidDocumentNames));
        registry.register(Box::new(NavStructure));
        registry.register(Box::new(HtmlStructure));
        registry.register(Box::new(ClosedTags));
        registry.register(Box::new(ValidViewport));
        registry.register(Box::new(HeadingHierarchy));
        registry.register(Box::new(ImageAlt));
        registry
    }

    /// Adds a rule at the end
    ///
    /// Ids must be unique; registering a duplicate is a programming error.
    pub fn register(&mut self, rule: Box<dyn Rule>) {
        debug_assert!(
            self.get(rule.info().id).is_none(),
            "duplicate rule id {}",
            rule.info().id
        );
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[Box<dyn Rule>] {
        &self.rules
    }

    /// Looks a rule up by id
    pub fn get(&self, id: &str) -> Option<&dyn Rule> {
        self.rules
            .iter()
            .find(|rule| rule.info().id == id)
            .map(|rule| rule.as_ref())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
