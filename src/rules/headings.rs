// src/rules/headings.rs
// =============================================================================
// Heading rules.
//
// - unique-h1: exactly one <h1> per document
// - heading-hierarchy: headings go 1, 2, 3... without skips, and the main
//   landmarks (header, nav, main, aside, footer) hold the right headings and
//   appear in a sensible order
// =============================================================================

use super::{Outcome, Rule, RuleInfo, Severity};
use crate::document::{child_elements, heading_level, parse_selector, tag_name, Document};
use crate::error::RuleError;
use scraper::ElementRef;

const HEADINGS: &str = "h1, h2, h3, h4, h5, h6";

/// Exactly one top-level heading
pub struct UniqueH1;

const UNIQUE_H1: RuleInfo = RuleInfo {
    id: "unique-h1",
    description: "Single H1 per document",
    severity: Severity::Error,
    points_on_pass: 1,
    points_on_fail: -2,
};

impl Rule for UniqueH1 {
    fn info(&self) -> &RuleInfo {
        &UNIQUE_H1
    }

    fn detect(&self, document: &Document, _raw: &str) -> Result<Outcome, RuleError> {
        let h1s = document.select("h1")?;

        let outcome = match h1s.len() {
            0 => Outcome::fail(
                "No <h1> element found. The document must have exactly one <h1>.",
                "Add an <h1> element containing the main title of the document.",
            ),
            1 => Outcome::pass("The document has exactly one <h1> element.")
                .with_matches(document.nodes(h1s)),
            count => Outcome::fail(
                format!("Found {} <h1> elements. There must be only one.", count),
                "Use <h2>, <h3>, etc. for subtitles. The <h1> must be unique and hold the main title.",
            )
            .with_matches(document.nodes(h1s)),
        };

        Ok(outcome)
    }
}

/// Heading levels and landmark placement
pub struct HeadingHierarchy;

const HEADING_HIERARCHY: RuleInfo = RuleInfo {
    id: "heading-hierarchy",
    description: "Heading hierarchy and landmark order",
    severity: Severity::Error,
    points_on_pass: 2,
    points_on_fail: -3,
};

// Issues and offending elements collected across all sub-checks
#[derive(Default)]
struct SequenceReport<'a> {
    issues: Vec<String>,
    offenders: Vec<ElementRef<'a>>,
}

impl<'a> SequenceReport<'a> {
    fn flag(&mut self, element: ElementRef<'a>, issue: String) {
        self.issues.push(issue);
        self.offenders.push(element);
    }
}

impl Rule for HeadingHierarchy {
    fn info(&self) -> &RuleInfo {
        &HEADING_HIERARCHY
    }

    fn detect(&self, document: &Document, _raw: &str) -> Result<Outcome, RuleError> {
        let mut report = SequenceReport::default();

        check_heading_sequence(&document.select(HEADINGS)?, &mut report);
        for header in document.select("header")? {
            check_header_headings(header, &mut report)?;
        }
        for nav in document.select("nav")? {
            check_nav_headings(nav, &mut report)?;
            check_nav_lists(nav, &mut report)?;
        }
        if let Some(body) = document.body() {
            check_landmark_order(body, &mut report);
        }

        if report.issues.is_empty() {
            return Ok(Outcome::pass(
                "Headings follow a valid hierarchy and landmarks appear in a valid order.",
            ));
        }

        let mut matches = document.nodes(report.offenders);
        matches.sort_by_key(|node| node.index);
        matches.dedup();

        Ok(Outcome::fail(
            format!(
                "Heading and landmark structure problems: {}.",
                report.issues.join("; ")
            ),
            "Start with a single <h1>, go down one level at a time (h1 > h2 > h3), keep only the <h1> \
             inside <header>, no headings inside <nav>, and order landmarks header, nav, main, footer.",
        )
        .with_matches(matches))
    }
}

// 1. The first heading is h1, no heading precedes the h1, no level is skipped
fn check_heading_sequence<'a>(headings: &[ElementRef<'a>], report: &mut SequenceReport<'a>) {
    let mut previous: Option<u8> = None;
    let mut seen_h1 = false;

    for heading in headings {
        let Some(level) = heading_level(heading) else {
            continue;
        };

        match previous {
            None if level != 1 => report.flag(
                *heading,
                format!("the first heading is <h{}> instead of <h1>", level),
            ),
            Some(_) if !seen_h1 && level == 1 => report.flag(
                *heading,
                "<h1> is not the first heading of the document".to_string(),
            ),
            Some(_) if !seen_h1 => report.flag(
                *heading,
                format!("<h{}> appears before any <h1>", level),
            ),
            _ => {}
        }

        if let Some(prev) = previous {
            if level > prev + 1 {
                report.flag(
                    *heading,
                    format!(
                        "<h{}> follows <h{}>, skipping <h{}>",
                        level,
                        prev,
                        prev + 1
                    ),
                );
            }
        }

        if level == 1 {
            seen_h1 = true;
        }
        previous = Some(level);
    }
}

// 2. A header holds exactly one h1 and no other heading level
fn check_header_headings<'a>(
    header: ElementRef<'a>,
    report: &mut SequenceReport<'a>,
) -> Result<(), RuleError> {
    let selector = parse_selector(HEADINGS)?;
    let levels: Vec<u8> = header
        .select(&selector)
        .filter_map(|heading| heading_level(&heading))
        .collect();

    let h1_count = levels.iter().filter(|&&level| level == 1).count();
    let other_count = levels.len() - h1_count;

    if other_count > 0 && h1_count == 0 {
        report.flag(
            header,
            "a <header> contains <h2>-<h6> headings without an <h1>".to_string(),
        );
    }
    if other_count > 0 && h1_count > 0 {
        report.flag(
            header,
            "a <header> mixes its <h1> with other heading levels".to_string(),
        );
    }
    if h1_count > 1 {
        report.flag(
            header,
            format!("a <header> contains {} <h1> elements", h1_count),
        );
    }
    Ok(())
}

// 3. A nav holds no headings at all
fn check_nav_headings<'a>(
    nav: ElementRef<'a>,
    report: &mut SequenceReport<'a>,
) -> Result<(), RuleError> {
    let selector = parse_selector(HEADINGS)?;
    let count = nav.select(&selector).count();
    if count > 0 {
        report.flag(nav, format!("a <nav> contains {} heading(s)", count));
    }
    Ok(())
}

// 4. List items in a nav live inside a list
fn check_nav_lists<'a>(
    nav: ElementRef<'a>,
    report: &mut SequenceReport<'a>,
) -> Result<(), RuleError> {
    let direct_items = child_elements(&nav)
        .iter()
        .filter(|child| tag_name(child) == "li")
        .count();
    if direct_items > 0 {
        report.flag(
            nav,
            "a <nav> has <li> elements as direct children".to_string(),
        );
    }

    let items = nav.select(&parse_selector("li")?).count();
    let lists = nav.select(&parse_selector("ul, ol")?).count();
    if items > 0 && lists == 0 {
        report.flag(
            nav,
            "a <nav> has list items but no <ul> or <ol>".to_string(),
        );
    }
    Ok(())
}

// 5. main comes after header and nav; footer is last unless only asides follow
fn check_landmark_order<'a>(body: ElementRef<'a>, report: &mut SequenceReport<'a>) {
    let landmarks: Vec<ElementRef<'a>> = child_elements(&body)
        .into_iter()
        .filter(|child| {
            matches!(
                tag_name(child),
                "header" | "nav" | "main" | "aside" | "footer"
            )
        })
        .collect();

    for (position, landmark) in landmarks.iter().enumerate() {
        let later = &landmarks[position + 1..];
        match tag_name(landmark) {
            "main" => {
                for follower in later {
                    let name = tag_name(follower);
                    if name == "header" || name == "nav" {
                        report.flag(
                            *landmark,
                            format!("<main> appears before <{}>", name),
                        );
                    }
                }
            }
            "footer" => {
                if let Some(follower) = later.iter().find(|el| tag_name(el) != "aside") {
                    report.flag(
                        *landmark,
                        format!("<footer> is followed by <{}>", tag_name(follower)),
                    );
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(rule: &dyn Rule, html: &str) -> Outcome {
        let doc = Document::parse(html).unwrap();
        rule.detect(&doc, html).unwrap()
    }

    #[test]
    fn test_no_h1_fails() {
        let outcome = run(&UniqueH1, "<body><h2>x</h2></body>");
        assert!(!outcome.passed);
        assert!(outcome.message.contains("No <h1>"));
        assert!(outcome.matches.is_empty());
    }

    #[test]
    fn test_single_h1_passes() {
        let outcome = run(&UniqueH1, "<body><h1>Title</h1></body>");
        assert!(outcome.passed);
        assert_eq!(outcome.matches.len(), 1);
        assert!(outcome.suggestion.is_none());
    }

    #[test]
    fn test_multiple_h1_lists_count() {
        let outcome = run(&UniqueH1, "<h1>a</h1><h1>b</h1><h1>c</h1>");
        assert!(!outcome.passed);
        assert!(outcome.message.contains("Found 3"));
        assert_eq!(outcome.matches.len(), 3);
    }

    #[test]
    fn test_valid_hierarchy_passes() {
        let html = "<body><header><h1>T</h1></header><nav><ul><li><a href='#'>x</a></li></ul></nav>\
                    <main><h2>A</h2><h3>B</h3><h2>C</h2></main><footer></footer></body>";
        assert!(run(&HeadingHierarchy, html).passed);
    }

    #[test]
    fn test_first_heading_not_h1() {
        let outcome = run(&HeadingHierarchy, "<h2>a</h2><h1>b</h1>");
        assert!(!outcome.passed);
        assert!(outcome.message.contains("the first heading is <h2>"));
        assert!(outcome.message.contains("<h1> is not the first heading"));
    }

    #[test]
    fn test_later_heading_before_h1() {
        let outcome = run(&HeadingHierarchy, "<h2>a</h2><h3>b</h3><h1>c</h1>");
        assert!(!outcome.passed);
        assert!(outcome.message.contains("<h3> appears before any <h1>"));
        assert!(!outcome.message.contains("<h2> appears before any <h1>"));
    }

    #[test]
    fn test_nav_list_items_outside_a_list() {
        let outcome = run(&HeadingHierarchy, "<h1>T</h1><nav><li><a href='#'>x</a></li></nav>");
        assert!(!outcome.passed);
        assert!(outcome
            .message
            .contains("a <nav> has <li> elements as direct children"));
        assert!(outcome
            .message
            .contains("a <nav> has list items but no <ul> or <ol>"));
        assert_eq!(outcome.matches.len(), 1);
        assert_eq!(outcome.matches[0].tag, "nav");
    }

    #[test]
    fn test_skipped_level() {
        let outcome = run(&HeadingHierarchy, "<h1>a</h1><h3>b</h3>");
        assert!(!outcome.passed);
        assert!(outcome.message.contains("<h3> follows <h1>, skipping <h2>"));
        assert_eq!(outcome.matches.len(), 1);
        assert_eq!(outcome.matches[0].tag, "h3");
    }

    #[test]
    fn test_header_with_subheading_only() {
        let outcome = run(&HeadingHierarchy, "<header><h2>x</h2></header>");
        assert!(!outcome.passed);
        assert!(outcome.message.contains("without an <h1>"));
    }

    #[test]
    fn test_header_mixing_levels() {
        let outcome = run(&HeadingHierarchy, "<header><h1>x</h1><h2>y</h2></header>");
        assert!(!outcome.passed);
        assert!(outcome.message.contains("mixes its <h1>"));
    }

    #[test]
    fn test_heading_inside_nav() {
        let html = "<h1>x</h1><nav><h2>Menu</h2><ul><li><a href='#'>a</a></li></ul></nav>";
        let outcome = run(&HeadingHierarchy, html);
        assert!(!outcome.passed);
        assert!(outcome.message.contains("a <nav> contains 1 heading(s)"));
    }

    #[test]
    fn test_main_before_nav() {
        let html = "<body><header><h1>x</h1></header><main></main><nav></nav></body>";
        let outcome = run(&HeadingHierarchy, html);
        assert!(!outcome.passed);
        assert!(outcome.message.contains("<main> appears before <nav>"));
    }

    #[test]
    fn test_footer_followed_by_aside_is_fine() {
        let html = "<body><header><h1>x</h1></header><main></main><footer></footer><aside></aside></body>";
        assert!(run(&HeadingHierarchy, html).passed);
    }

    #[test]
    fn test_footer_not_last() {
        let html = "<body><header><h1>x</h1></header><footer></footer><main></main></body>";
        let outcome = run(&HeadingHierarchy, html);
        assert!(!outcome.passed);
        assert!(outcome.message.contains("<footer> is followed by <main>"));
    }

    #[test]
    fn test_matches_are_unioned_without_duplicates() {
        // The <header> trips two sub-checks but is reported once
        let html = "<body><header><h1>a</h1><h2>b</h2><h1>c</h1></header></body>";
        let outcome = run(&HeadingHierarchy, html);
        assert!(!outcome.passed);
        let headers = outcome.matches.iter().filter(|m| m.tag == "header").count();
        assert_eq!(headers, 1);
    }
}
