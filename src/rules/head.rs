// src/rules/head.rs
// =============================================================================
// Rules about the document <head>: title, character encoding and viewport.
// =============================================================================

use super::{Outcome, Rule, RuleInfo, Severity};
use crate::document::Document;
use crate::error::RuleError;

/// A non-empty <title> in the <head>
pub struct DocumentTitle;

const DOCUMENT_TITLE: RuleInfo = RuleInfo {
    id: "document-title",
    description: "Document title",
    severity: Severity::Error,
    points_on_pass: 1,
    points_on_fail: -2,
};

impl Rule for DocumentTitle {
    fn info(&self) -> &RuleInfo {
        &DOCUMENT_TITLE
    }

    fn detect(&self, document: &Document, _raw: &str) -> Result<Outcome, RuleError> {
        let Some(title) = document.select_first("head title")? else {
            return Ok(Outcome::fail(
                "No <title> element found in the <head>.",
                "Add a <title> element inside the <head> with the title of the document.",
            ));
        };

        let text: String = title.text().collect();
        let text = text.trim();
        let matches = document.nodes([title]);

        if text.is_empty() {
            Ok(Outcome::fail(
                "The <title> element is empty.",
                "The <title> must contain text describing the content of the document.",
            )
            .with_matches(matches))
        } else {
            Ok(
                Outcome::pass(format!("The document has a valid title: \"{}\".", text))
                    .with_matches(matches),
            )
        }
    }
}

/// A meta tag declares UTF-8
pub struct Utf8Encoding;

const UTF8_ENCODING: RuleInfo = RuleInfo {
    id: "utf8-encoding",
    description: "UTF-8 encoding",
    severity: Severity::Error,
    points_on_pass: 1,
    points_on_fail: -2,
};

impl Rule for Utf8Encoding {
    fn info(&self) -> &RuleInfo {
        &UTF8_ENCODING
    }

    fn detect(&self, document: &Document, _raw: &str) -> Result<Outcome, RuleError> {
        // <meta charset="utf-8">
        let charset = document.select("meta[charset]")?.into_iter().find(|meta| {
            meta.value()
                .attr("charset")
                .is_some_and(|value| value.trim().eq_ignore_ascii_case("utf-8"))
        });

        // <meta http-equiv="Content-Type" content="text/html; charset=utf-8">
        let declared = match charset {
            Some(meta) => Some(meta),
            None => document.select("meta[http-equiv]")?.into_iter().find(|meta| {
                let element = meta.value();
                let is_content_type = element
                    .attr("http-equiv")
                    .is_some_and(|value| value.eq_ignore_ascii_case("content-type"));
                let says_utf8 = element
                    .attr("content")
                    .is_some_and(|value| value.to_ascii_lowercase().contains("charset=utf-8"));
                is_content_type && says_utf8
            }),
        };

        match declared {
            Some(meta) => Ok(Outcome::pass("Found a UTF-8 encoding declaration.")
                .with_matches(document.nodes([meta]))),
            None => Ok(Outcome::fail(
                "No UTF-8 encoding declaration found.",
                "Add <meta charset=\"UTF-8\"> at the start of the <head>.",
            )),
        }
    }
}

/// A responsive viewport meta tag
pub struct ValidViewport;

const VALID_VIEWPORT: RuleInfo = RuleInfo {
    id: "valid-viewport",
    description: "Meta viewport for responsive design",
    severity: Severity::Warning,
    points_on_pass: 1,
    points_on_fail: -1,
};

impl Rule for ValidViewport {
    fn info(&self) -> &RuleInfo {
        &VALID_VIEWPORT
    }

    fn detect(&self, document: &Document, _raw: &str) -> Result<Outcome, RuleError> {
        let viewport = document.select("meta[name]")?.into_iter().find(|meta| {
            meta.value()
                .attr("name")
                .is_some_and(|name| name.eq_ignore_ascii_case("viewport"))
        });

        let Some(viewport) = viewport else {
            return Ok(Outcome::fail(
                "The viewport meta tag is missing.",
                "Add <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\"> \
                 to the <head> for responsive design.",
            ));
        };

        let matches = document.nodes([viewport]);
        let responsive = viewport
            .value()
            .attr("content")
            .is_some_and(|content| content.contains("width=device-width"));

        if responsive {
            Ok(Outcome::pass("The viewport meta tag is set up for responsive design.")
                .with_matches(matches))
        } else {
            Ok(Outcome::fail(
                "The viewport meta tag has no responsive configuration.",
                "Use content=\"width=device-width, initial-scale=1.0\" on the viewport meta tag.",
            )
            .with_matches(matches))
        }
    }
}
