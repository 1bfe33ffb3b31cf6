// src/document/mod.rs
// =============================================================================
// This module turns raw HTML text into a tree the rules can query.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever (Mozilla's HTML parser)
//
// Findings never hold on to tree nodes directly. Instead every element gets a
// small `NodeRef` handle (its position in document order plus its tag name),
// so reports can outlive the parsed tree.
//
// Submodules:
// - lines: best-effort mapping from a NodeRef back to a source line
// =============================================================================

mod lines;

pub use lines::line_of;

use crate::error::{GraderError, Result, RuleError};
use ego_tree::NodeId;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::{self, Read};
use std::path::Path;
use tracing::debug;

// Anything that looks like the start of a tag or a declaration
static TAG_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[A-Za-z!/]").expect("valid tag-start regex"));

/// A lightweight handle to an element of a parsed document
///
/// `index` is the element's position in document order, `occurrence` is how
/// many elements with the same tag name came before it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeRef {
    pub index: usize,
    pub tag: String,
    pub occurrence: usize,
}

/// A parsed HTML document plus the lookup table for node handles
pub struct Document {
    html: Html,
    positions: HashMap<NodeId, NodeRef>,
}

impl Document {
    /// Parses raw HTML into a document
    ///
    /// Blank input and input with no markup at all are fatal. html5ever
    /// recovers from everything else, so its own parse errors are only logged.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Err(GraderError::EmptyInput);
        }
        if !TAG_START.is_match(raw) {
            return Err(GraderError::NotHtml);
        }

        let html = Html::parse_document(raw);
        if !html.errors.is_empty() {
            debug!(count = html.errors.len(), "parser recovered from errors");
        }

        let mut positions = HashMap::new();
        let mut seen: HashMap<String, usize> = HashMap::new();
        for (index, element) in html
            .tree
            .root()
            .descendants()
            .filter_map(ElementRef::wrap)
            .enumerate()
        {
            let tag = element.value().name().to_string();
            let counter = seen.entry(tag.clone()).or_insert(0);
            positions.insert(
                element.id(),
                NodeRef {
                    index,
                    tag,
                    occurrence: *counter,
                },
            );
            *counter += 1;
        }

        Ok(Self { html, positions })
    }

    /// All elements matching a CSS selector, in document order
    pub fn select(&self, css: &str) -> Result<Vec<ElementRef<'_>>, RuleError> {
        let selector = parse_selector(css)?;
        Ok(self.html.select(&selector).collect())
    }

    /// The first element matching a CSS selector
    pub fn select_first(&self, css: &str) -> Result<Option<ElementRef<'_>>, RuleError> {
        let selector = parse_selector(css)?;
        Ok(self.html.select(&selector).next())
    }

    /// The `<body>` element (html5ever always synthesizes one)
    pub fn body(&self) -> Option<ElementRef<'_>> {
        self.html
            .root_element()
            .children()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().name() == "body")
    }

    /// The handle for an element of this document
    pub fn node(&self, element: ElementRef<'_>) -> NodeRef {
        self.positions
            .get(&element.id())
            .cloned()
            .unwrap_or_else(|| NodeRef {
                index: usize::MAX,
                tag: element.value().name().to_string(),
                occurrence: 0,
            })
    }

    /// Handles for many elements at once, keeping their order
    pub fn nodes<'a, I>(&self, elements: I) -> Vec<NodeRef>
    where
        I: IntoIterator<Item = ElementRef<'a>>,
    {
        elements.into_iter().map(|el| self.node(el)).collect()
    }

    /// Number of elements in the tree
    pub fn element_count(&self) -> usize {
        self.positions.len()
    }
}

/// Reads a document from a file, or from stdin when the path is "-"
pub fn read_source(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut raw = String::new();
        io::stdin().read_to_string(&mut raw)?;
        Ok(raw)
    } else {
        Ok(fs::read_to_string(path)?)
    }
}

/// Parses a CSS selector, turning scraper's error into a RuleError
pub fn parse_selector(css: &str) -> Result<Selector, RuleError> {
    Selector::parse(css).map_err(|_| RuleError::Selector(css.to_string()))
}

/// Tag name of an element (always lowercase for HTML documents)
pub fn tag_name<'a>(element: &ElementRef<'a>) -> &'a str {
    element.value().name()
}

/// The element's direct parent, if that parent is an element
pub fn parent_element<'a>(element: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    element.parent().and_then(ElementRef::wrap)
}

/// The element's direct element children
pub fn child_elements<'a>(element: &ElementRef<'a>) -> Vec<ElementRef<'a>> {
    element.children().filter_map(ElementRef::wrap).collect()
}

/// Whether any ancestor (at any distance) has the given tag name
pub fn has_ancestor(element: &ElementRef<'_>, name: &str) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| ancestor.value().name() == name)
}

/// Heading level for h1..h6, None for anything else
pub fn heading_level(element: &ElementRef<'_>) -> Option<u8> {
    let name = element.value().name();
    let level = name.strip_prefix('h')?.parse::<u8>().ok()?;
    (1..=6).contains(&level).then_some(level)
}

/// Whether an element carries an attribute (value may be empty)
pub fn has_attr(element: &ElementRef<'_>, name: &str) -> bool {
    element.value().attr(name).is_some()
}
