// src/rules/structure.rs
// =============================================================================
// Rules about the overall shape of the document.
//
// - semantic-tags: not too many <div>/<span> compared to semantic elements
// - required-structure: header, nav, main and footer are all present
// - html-structure: doctype, html/head/body skeleton, tag counts add up
// - closed-tags: commonly misused tags are opened and closed equally often
//
// The last two look at the raw text as well as the tree. The parser repairs
// broken markup silently (it will invent a missing <body>, close an open
// <p>...), so the only place some mistakes are still visible is the source.
// =============================================================================

use super::{Outcome, Rule, RuleInfo, Severity};
use crate::document::Document;
use crate::error::RuleError;
use once_cell::sync::Lazy;
use regex::Regex;

/// Elements with no closing tag by definition
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Prefer semantic elements over generic containers
pub struct SemanticTags;

const SEMANTIC_TAGS: RuleInfo = RuleInfo {
    id: "semantic-tags",
    description: "Prefer HTML5 semantic tags",
    severity: Severity::Warning,
    points_on_pass: 1,
    points_on_fail: -1,
};

impl Rule for SemanticTags {
    fn info(&self) -> &RuleInfo {
        &SEMANTIC_TAGS
    }

    fn detect(&self, document: &Document, _raw: &str) -> Result<Outcome, RuleError> {
        let divs = document.select("div")?;
        let spans = document.select("span")?;
        let semantic = document
            .select("header, nav, main, section, article, aside, footer, figure, figcaption")?;

        let generic_count = divs.len() + spans.len();
        let semantic_count = semantic.len();
        // No generic containers at all counts as a perfect ratio
        let ratio = if generic_count > 0 {
            semantic_count as f64 / generic_count as f64
        } else {
            1.0
        };

        if generic_count <= 3 || ratio >= 0.3 {
            Ok(Outcome::pass(format!(
                "Good use of semantic tags ({} semantic vs {} generic).",
                semantic_count, generic_count
            ))
            .with_matches(document.nodes(semantic)))
        } else {
            Ok(Outcome::fail(
                format!(
                    "Too many DIV/SPAN elements ({}) with few semantic tags ({}).",
                    generic_count, semantic_count
                ),
                "Replace some <div> elements with semantic ones: <header>, <nav>, <main>, \
                 <section>, <article>, <aside>, <footer>.",
            )
            .with_matches(document.nodes(divs.into_iter().take(5))))
        }
    }
}

/// header, nav, main and footer all exist
pub struct RequiredStructure;

const REQUIRED_STRUCTURE: RuleInfo = RuleInfo {
    id: "required-structure",
    description: "Required minimal structure",
    severity: Severity::Error,
    points_on_pass: 2,
    points_on_fail: -3,
};

const REQUIRED_LANDMARKS: [&str; 4] = ["header", "nav", "main", "footer"];

impl Rule for RequiredStructure {
    fn info(&self) -> &RuleInfo {
        &REQUIRED_STRUCTURE
    }

    fn detect(&self, document: &Document, _raw: &str) -> Result<Outcome, RuleError> {
        let mut found = Vec::new();
        let mut missing = Vec::new();

        for tag in REQUIRED_LANDMARKS {
            match document.select_first(tag)? {
                Some(element) => found.push(element),
                None => missing.push(tag),
            }
        }

        if missing.is_empty() {
            return Ok(
                Outcome::pass("The document contains every required structural element.")
                    .with_matches(document.nodes(found)),
            );
        }

        let wanted: Vec<String> = missing.iter().map(|tag| format!("<{}>", tag)).collect();
        Ok(Outcome::fail(
            format!("Missing structural elements: {}.", missing.join(", ")),
            format!(
                "Add the missing elements: {}. They are required for a correct semantic structure.",
                wanted.join(", ")
            ),
        )
        .with_matches(document.nodes(found)))
    }
}

/// Doctype, skeleton elements and overall tag balance
pub struct HtmlStructure;

const HTML_STRUCTURE: RuleInfo = RuleInfo {
    id: "html-structure",
    description: "Valid basic HTML structure",
    severity: Severity::Error,
    points_on_pass: 2,
    points_on_fail: -5,
};

const DOCTYPE: &str = "<!doctype html>";

// Open/close counts may drift this much before we complain
const TAG_BALANCE_TOLERANCE: i64 = 2;

static EXPLICIT_HTML: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<html[\s>]").expect("valid html regex"));
static EXPLICIT_HEAD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<head[\s>]").expect("valid head regex"));
static EXPLICIT_BODY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<body[\s>]").expect("valid body regex"));
static OPEN_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<([A-Za-z][A-Za-z0-9-]*)[^>]*>").expect("valid open-tag regex"));
static CLOSE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"</[^>]+>").expect("valid close-tag regex"));

impl Rule for HtmlStructure {
    fn info(&self) -> &RuleInfo {
        &HTML_STRUCTURE
    }

    fn detect(&self, document: &Document, raw: &str) -> Result<Outcome, RuleError> {
        let mut issues = Vec::new();

        if !raw.trim().to_lowercase().starts_with(DOCTYPE) {
            issues.push("missing DOCTYPE html declaration".to_string());
        }

        // html5ever always builds html/head/body, so also require them in the source
        let html = document.select_first("html")?.filter(|_| EXPLICIT_HTML.is_match(raw));
        let head = document.select_first("head")?.filter(|_| EXPLICIT_HEAD.is_match(raw));
        let body = document.select_first("body")?.filter(|_| EXPLICIT_BODY.is_match(raw));

        if html.is_none() {
            issues.push("missing <html> element".to_string());
        }
        if head.is_none() {
            issues.push("missing <head> element".to_string());
        }
        if body.is_none() {
            issues.push("missing <body> element".to_string());
        }

        if let (Some(head_at), Some(body_at)) = (EXPLICIT_HEAD.find(raw), EXPLICIT_BODY.find(raw))
        {
            if head_at.start() > body_at.start() {
                issues.push("<head> must come before <body>".to_string());
            }
        }

        let (expected_closes, closes) = tag_balance(raw);
        if (closes - expected_closes).abs() > TAG_BALANCE_TOLERANCE {
            issues.push("possibly unclosed or malformed tags".to_string());
        }

        if issues.is_empty() {
            let skeleton = [html, head, body].into_iter().flatten();
            Ok(Outcome::pass("The basic HTML structure is valid.")
                .with_matches(document.nodes(skeleton)))
        } else {
            Ok(Outcome::fail(
                format!("Critical: {}.", issues.join(", ")),
                "Make sure the document is well formed, with <!DOCTYPE html>, <html>, <head> and \
                 <body> in the right order.",
            ))
        }
    }
}

// (closing tags the opening tags call for, closing tags actually present)
fn tag_balance(raw: &str) -> (i64, i64) {
    let mut expected = 0i64;
    for tag in OPEN_TAG.captures_iter(raw) {
        let name = tag[1].to_ascii_lowercase();
        let self_closing = tag[0].ends_with("/>");
        if !self_closing && !VOID_ELEMENTS.contains(&name.as_str()) {
            expected += 1;
        }
    }
    let closes = CLOSE_TAG.find_iter(raw).count() as i64;
    (expected, closes)
}

/// Each commonly misused tag is closed as often as it is opened
pub struct ClosedTags;

const CLOSED_TAGS: RuleInfo = RuleInfo {
    id: "closed-tags",
    description: "Correctly closed tags",
    severity: Severity::Error,
    points_on_pass: 1,
    points_on_fail: -3,
};

const CHECKED_TAGS: [&str; 20] = [
    "h1", "h2", "h3", "h4", "h5", "h6", "p", "div", "span", "a", "header", "nav", "main",
    "footer", "section", "article", "aside", "ul", "ol", "li",
];

// Mismatches listed in the message before it is cut off
const SHOWN_MISMATCHES: usize = 3;

struct TagCounter {
    name: &'static str,
    open: Regex,
    self_closing: Regex,
    close: Regex,
}

static TAG_COUNTERS: Lazy<Vec<TagCounter>> = Lazy::new(|| {
    CHECKED_TAGS
        .iter()
        .map(|&name| TagCounter {
            name,
            open: Regex::new(&format!(r"(?i)<{}(?:[\s/][^>]*)?>", name))
                .expect("valid open regex"),
            self_closing: Regex::new(&format!(r"(?i)<{}(?:[\s/][^>]*)?/>", name))
                .expect("valid self-closing regex"),
            close: Regex::new(&format!(r"(?i)</{}\s*>", name)).expect("valid close regex"),
        })
        .collect()
});

impl Rule for ClosedTags {
    fn info(&self) -> &RuleInfo {
        &CLOSED_TAGS
    }

    fn detect(&self, _document: &Document, raw: &str) -> Result<Outcome, RuleError> {
        let mut issues = Vec::new();

        for counter in TAG_COUNTERS.iter() {
            let opened = counter
                .open
                .find_iter(raw)
                .count()
                .saturating_sub(counter.self_closing.find_iter(raw).count());
            let closed = counter.close.find_iter(raw).count();
            if opened != closed {
                issues.push(format!(
                    "<{}>: {} opened, {} closed",
                    counter.name, opened, closed
                ));
            }
        }

        if issues.is_empty() {
            return Ok(Outcome::pass("Tags are correctly closed."));
        }

        let shown = issues
            .iter()
            .take(SHOWN_MISMATCHES)
            .cloned()
            .collect::<Vec<_>>()
            .join(", ");
        let more = if issues.len() > SHOWN_MISMATCHES { "..." } else { "" };

        Ok(Outcome::fail(
            format!("Badly closed tags - {}{}.", shown, more),
            "Check that every opening tag has a matching closing tag. An editor with syntax \
             highlighting helps spot these.",
        ))
    }
}
