// src/rules/navigation.rs
// =============================================================================
// The navigation rule: every <nav> must be built as NAV > UL > LI > A.
//
// A nav is checked against several conditions and collects one reason per
// violation. Reasons are kept as they come (two bare list items give the
// same reason twice), and a nav fails if it has any reason at all.
// =============================================================================

use super::{Outcome, Rule, RuleInfo, Severity};
use crate::document::{child_elements, parent_element, parse_selector, tag_name, Document};
use crate::error::RuleError;
use scraper::ElementRef;

/// NAV > UL > LI > A
pub struct NavStructure;

const NAV_STRUCTURE: RuleInfo = RuleInfo {
    id: "nav-structure",
    description: "NAV > UL > LI > A structure",
    severity: Severity::Error,
    points_on_pass: 1,
    points_on_fail: -2,
};

impl Rule for NavStructure {
    fn info(&self) -> &RuleInfo {
        &NAV_STRUCTURE
    }

    fn detect(&self, document: &Document, _raw: &str) -> Result<Outcome, RuleError> {
        let navs = document.select("nav")?;
        if navs.is_empty() {
            return Ok(Outcome::pass("No NAV elements to check."));
        }

        let mut invalid = Vec::new();
        let mut reasons = Vec::new();
        for nav in &navs {
            let nav_reasons = nav_violations(*nav)?;
            if !nav_reasons.is_empty() {
                invalid.push(*nav);
                reasons.extend(nav_reasons);
            }
        }

        if invalid.is_empty() {
            return Ok(Outcome::pass(format!(
                "All NAV elements ({}) follow the NAV > UL > LI > A structure.",
                navs.len()
            ))
            .with_matches(document.nodes(navs)));
        }

        Ok(Outcome::fail(
            format!(
                "{} of {} NAV elements do not follow the correct structure: {}.",
                invalid.len(),
                navs.len(),
                reasons.join("; ")
            ),
            "NAV elements must follow the structure <nav><ul><li><a href=\"...\">Link</a></li></ul></nav>. \
             Don't put links directly inside NAV.",
        )
        .with_matches(document.nodes(invalid)))
    }
}

// Every reason this nav breaks the NAV > UL > LI > A shape
fn nav_violations(nav: ElementRef<'_>) -> Result<Vec<String>, RuleError> {
    let mut reasons = Vec::new();
    let children = child_elements(&nav);

    if !children.iter().any(|child| tag_name(child) == "ul") {
        reasons.push("has no UL as a direct child".to_string());
    }

    for item in nav.select(&parse_selector("li")?) {
        let in_ul = parent_element(&item).is_some_and(|parent| tag_name(&parent) == "ul");
        if !in_ul {
            reasons.push("has LI elements that are not direct children of a UL".to_string());
            continue;
        }
        let has_link = child_elements(&item)
            .iter()
            .any(|child| tag_name(child) == "a");
        if !has_link {
            reasons.push("has LI elements without a direct A link".to_string());
        }
    }

    if children.iter().any(|child| tag_name(child) == "a") {
        reasons.push("has A links as direct children (they belong in an LI)".to_string());
    }

    for link in nav.select(&parse_selector("a")?) {
        let item = parent_element(&link).filter(|parent| tag_name(parent) == "li");
        let list = item
            .as_ref()
            .and_then(parent_element)
            .filter(|parent| tag_name(parent) == "ul");
        if list.is_none() {
            reasons.push("has A links outside the UL > LI structure".to_string());
        }
    }

    Ok(reasons)
}
