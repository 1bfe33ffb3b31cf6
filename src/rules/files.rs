// src/rules/files.rs
// =============================================================================
// Rules about the names of referenced files.
//
// Local file names may only use lowercase letters, digits, dots, dashes and
// underscores. Absolute URLs (http..., //...) and in-page fragments (#...)
// are not local files, so they are skipped.
// =============================================================================

use super::{Outcome, Rule, RuleInfo, Severity};
use crate::document::Document;
use crate::error::RuleError;
use once_cell::sync::Lazy;
use regex::Regex;

static VALID_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9._-]+$").expect("valid filename regex"));

// True for references that don't point at a local file
fn is_external(reference: &str) -> bool {
    reference.starts_with("http") || reference.starts_with("//") || reference.starts_with('#')
}

/// Last path segment with any query or fragment removed
pub fn filename_of(reference: &str) -> &str {
    let segment = reference.rsplit('/').next().unwrap_or(reference);
    segment.split(['?', '#']).next().unwrap_or(segment)
}

/// Every local href/src uses a safe file name
pub struct ValidFilenames;

const VALID_FILENAMES: RuleInfo = RuleInfo {
    id: "valid-filenames",
    description: "Valid file names",
    severity: Severity::Warning,
    points_on_pass: 1,
    points_on_fail: -1,
};

impl Rule for ValidFilenames {
    fn info(&self) -> &RuleInfo {
        &VALID_FILENAMES
    }

    fn detect(&self, document: &Document, _raw: &str) -> Result<Outcome, RuleError> {
        let invalid: Vec<_> = document
            .select("[href], [src]")?
            .into_iter()
            .filter(|element| {
                let element = element.value();
                let Some(reference) = element.attr("href").or_else(|| element.attr("src")) else {
                    return false;
                };
                if reference.is_empty() || is_external(reference) {
                    return false;
                }
                let filename = filename_of(reference);
                !filename.is_empty() && !VALID_NAME.is_match(filename)
            })
            .collect();

        if invalid.is_empty() {
            Ok(Outcome::pass("All file names are valid."))
        } else {
            Ok(Outcome::fail(
                format!("{} files have invalid names.", invalid.len()),
                "File names may only use lowercase letters, digits, dashes (-), dots (.) and \
                 underscores (_). No spaces, accents or Ñ.",
            )
            .with_matches(document.nodes(invalid)))
        }
    }
}

/// Linked HTML documents use safe file names
pub struct ValidDocumentNames;

const VALID_DOCUMENT_NAMES: RuleInfo = RuleInfo {
    id: "valid-document-names",
    description: "Valid document names",
    severity: Severity::Warning,
    points_on_pass: 1,
    points_on_fail: -1,
};

impl Rule for ValidDocumentNames {
    fn info(&self) -> &RuleInfo {
        &VALID_DOCUMENT_NAMES
    }

    fn detect(&self, document: &Document, _raw: &str) -> Result<Outcome, RuleError> {
        let invalid: Vec<_> = document
            .select("a[href], link[href]")?
            .into_iter()
            .filter(|link| {
                let href = link.value().attr("href").unwrap_or("");
                href.ends_with(".html")
                    && !href.starts_with("http")
                    && !href.starts_with("//")
                    && !VALID_NAME.is_match(filename_of(href))
            })
            .collect();

        if invalid.is_empty() {
            Ok(Outcome::pass("All HTML document names are valid."))
        } else {
            Ok(Outcome::fail(
                format!("{} HTML documents have invalid names.", invalid.len()),
                "HTML file names follow the same rules: only lowercase letters, digits, dashes and dots.",
            )
            .with_matches(document.nodes(invalid)))
        }
    }
}
