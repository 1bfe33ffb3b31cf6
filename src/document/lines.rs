// src/document/lines.rs
// =============================================================================
// Best-effort line numbers for matched elements.
//
// The parser doesn't keep source positions, so we go back to the raw text:
// an element that is the Nth <tag> in the tree is assumed to be the Nth
// "<tag" opening in the source. Elements the parser invented (a missing
// <body>, an implied <tbody>) break that assumption, so when the count
// doesn't line up we return None rather than guess. Comments and the text
// content of script-like elements are skipped while counting.
// =============================================================================

use super::NodeRef;
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

// An unterminated comment runs to the end of the input
static COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!--.*?(?:-->|\z)").expect("valid comment regex"));

// Elements whose content is text, never markup
static TEXT_ONLY: Lazy<Vec<Regex>> = Lazy::new(|| {
    ["script", "style", "textarea", "title"]
        .iter()
        .map(|tag| {
            Regex::new(&format!(r"(?is)<{tag}\b[^>]*>(.*?)</{tag}\s*>"))
                .expect("valid text-only regex")
        })
        .collect()
});

/// 1-based line of the element's opening tag in `raw`, if it can be found
///
/// Tag-like text inside comments and inside script, style, textarea or
/// title content is not counted.
pub fn line_of(node: &NodeRef, raw: &str) -> Option<usize> {
    let pattern = format!(r"(?i)<{}[\s/>]", regex::escape(&node.tag));
    let opening = Regex::new(&pattern).ok()?;
    let hidden = hidden_ranges(raw);

    let start = opening
        .find_iter(raw)
        .filter(|found| !hidden.iter().any(|range| range.contains(&found.start())))
        .nth(node.occurrence)?
        .start();
    Some(raw[..start].matches('\n').count() + 1)
}

// Byte ranges of raw text the parser never turns into elements
fn hidden_ranges(raw: &str) -> Vec<Range<usize>> {
    let mut ranges: Vec<Range<usize>> = COMMENT.find_iter(raw).map(|found| found.range()).collect();
    for pattern in TEXT_ONLY.iter() {
        ranges.extend(
            pattern
                .captures_iter(raw)
                .filter_map(|captures| captures.get(1))
                .map(|content| content.range()),
        );
    }
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    #[test]
    fn test_line_of_second_paragraph() {
        let raw = "<!DOCTYPE html>\n<html>\n<body>\n<p>one</p>\n<p>two</p>\n</body>\n</html>";
        let doc = Document::parse(raw).unwrap();
        let paragraphs = doc.nodes(doc.select("p").unwrap());

        assert_eq!(line_of(&paragraphs[0], raw), Some(4));
        assert_eq!(line_of(&paragraphs[1], raw), Some(5));
    }

    #[test]
    fn test_does_not_confuse_similar_tags() {
        let raw = "<article>\n<a href=\"x.html\">x</a>\n</article>";
        let doc = Document::parse(raw).unwrap();
        let anchor = doc.node(doc.select_first("a").unwrap().unwrap());
        assert_eq!(line_of(&anchor, raw), Some(2));
    }

    #[test]
    fn test_commented_out_tags_are_skipped() {
        let raw = "<!-- <p>old</p> -->\n<script>let s = '<p>';</script>\n<p>real</p>";
        let doc = Document::parse(raw).unwrap();
        let paragraph = doc.node(doc.select_first("p").unwrap().unwrap());
        assert_eq!(line_of(&paragraph, raw), Some(3));
    }

    #[test]
    fn test_only_commented_tag_has_no_line() {
        let raw = "<div>\n<!-- <section>draft</section> -->\n</div>";
        let section = NodeRef {
            index: 0,
            tag: "section".to_string(),
            occurrence: 0,
        };
        assert_eq!(line_of(&section, raw), None);
    }

    #[test]
    fn test_synthesized_element_has_no_line() {
        let raw = "<p>no explicit body here</p>";
        let doc = Document::parse(raw).unwrap();
        let body = doc.node(doc.body().unwrap());
        assert_eq!(line_of(&body, raw), None);
    }
}
