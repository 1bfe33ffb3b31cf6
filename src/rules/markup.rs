// src/rules/markup.rs
// =============================================================================
// Rules about which elements and attributes may appear where.
//
// Each rule selects the elements it cares about with a CSS selector, then
// keeps the ones that break the rule. Passing outcomes point at everything
// that was checked; failing outcomes point only at the offenders.
// =============================================================================

use super::{Outcome, Rule, RuleInfo, Severity};
use crate::document::{has_ancestor, parent_element, tag_name, Document};
use crate::error::RuleError;

/// Every <li> sits directly inside a <ul>
pub struct LiInUl;

const LI_IN_UL: RuleInfo = RuleInfo {
    id: "li-in-ul",
    description: "LI inside UL",
    severity: Severity::Error,
    points_on_pass: 1,
    points_on_fail: -2,
};

impl Rule for LiInUl {
    fn info(&self) -> &RuleInfo {
        &LI_IN_UL
    }

    fn detect(&self, document: &Document, _raw: &str) -> Result<Outcome, RuleError> {
        let items = document.select("li")?;
        let invalid: Vec<_> = items
            .iter()
            .copied()
            .filter(|li| {
                parent_element(li)
                    .map(|parent| tag_name(&parent) != "ul")
                    .unwrap_or(true)
            })
            .collect();

        if invalid.is_empty() {
            Ok(Outcome::pass(format!(
                "All LI elements ({}) are inside UL elements.",
                items.len()
            ))
            .with_matches(document.nodes(items)))
        } else {
            Ok(Outcome::fail(
                format!("{} LI elements are not inside a UL.", invalid.len()),
                "Wrap every <li> in a <ul>. List items can't stand alone or sit inside an <ol>.",
            )
            .with_matches(document.nodes(invalid)))
        }
    }
}

/// Only <a> elements carry href
pub struct HrefOnlyInA;

const HREF_ONLY_IN_A: RuleInfo = RuleInfo {
    id: "href-only-in-a",
    description: "href only on A tags",
    severity: Severity::Error,
    points_on_pass: 1,
    points_on_fail: -2,
};

impl Rule for HrefOnlyInA {
    fn info(&self) -> &RuleInfo {
        &HREF_ONLY_IN_A
    }

    fn detect(&self, document: &Document, _raw: &str) -> Result<Outcome, RuleError> {
        let with_href = document.select("[href]")?;
        let invalid: Vec<_> = with_href
            .iter()
            .copied()
            .filter(|el| tag_name(el) != "a")
            .collect();

        if invalid.is_empty() {
            Ok(Outcome::pass(format!(
                "All href attributes ({}) are on A elements.",
                with_href.len()
            ))
            .with_matches(document.nodes(with_href)))
        } else {
            Ok(Outcome::fail(
                format!("{} elements with href are not A tags.", invalid.len()),
                "Use href only on <a> elements. Other elements take attributes such as src or data-*.",
            )
            .with_matches(document.nodes(invalid)))
        }
    }
}

/// Only <img> elements carry src, and every <img> has a non-empty one
pub struct SrcOnlyInImg;

const SRC_ONLY_IN_IMG: RuleInfo = RuleInfo {
    id: "src-only-in-img",
    description: "src only on IMG",
    severity: Severity::Error,
    points_on_pass: 1,
    points_on_fail: -2,
};

impl Rule for SrcOnlyInImg {
    fn info(&self) -> &RuleInfo {
        &SRC_ONLY_IN_IMG
    }

    fn detect(&self, document: &Document, _raw: &str) -> Result<Outcome, RuleError> {
        let with_src = document.select("[src]")?;
        let not_images: Vec<_> = with_src
            .iter()
            .copied()
            .filter(|el| tag_name(el) != "img")
            .collect();
        let images_without_src: Vec<_> = document
            .select("img")?
            .into_iter()
            .filter(|img| img.value().attr("src").map_or(true, str::is_empty))
            .collect();

        if not_images.is_empty() && images_without_src.is_empty() {
            return Ok(Outcome::pass("All src attributes are on valid IMG elements.")
                .with_matches(document.nodes(with_src)));
        }

        let mut errors = Vec::new();
        if !not_images.is_empty() {
            errors.push(format!("{} elements with src are not IMG", not_images.len()));
        }
        if !images_without_src.is_empty() {
            errors.push(format!(
                "{} IMG elements without a valid src",
                images_without_src.len()
            ));
        }

        let mut matches = document.nodes(not_images);
        matches.extend(document.nodes(images_without_src));

        Ok(Outcome::fail(
            format!("{}.", errors.join(", ")),
            "Use src only on <img> elements, and give every <img> a valid, non-empty src.",
        )
        .with_matches(matches))
    }
}

/// Every <button> has a <form> somewhere above it
pub struct ButtonsInForms;

const BUTTONS_IN_FORMS: RuleInfo = RuleInfo {
    id: "buttons-in-forms",
    description: "Buttons inside forms",
    severity: Severity::Error,
    points_on_pass: 1,
    points_on_fail: -2,
};

impl Rule for ButtonsInForms {
    fn info(&self) -> &RuleInfo {
        &BUTTONS_IN_FORMS
    }

    fn detect(&self, document: &Document, _raw: &str) -> Result<Outcome, RuleError> {
        let buttons = document.select("button")?;
        let invalid: Vec<_> = buttons
            .iter()
            .copied()
            .filter(|button| !has_ancestor(button, "form"))
            .collect();

        if invalid.is_empty() {
            Ok(Outcome::pass(format!(
                "All buttons ({}) are inside forms.",
                buttons.len()
            ))
            .with_matches(document.nodes(buttons)))
        } else {
            Ok(Outcome::fail(
                format!("{} buttons are not inside a FORM element.", invalid.len()),
                "Put every <button> inside a <form>, or use <a> elements for navigation.",
            )
            .with_matches(document.nodes(invalid)))
        }
    }
}

/// No table markup at all
pub struct NoTables;

const NO_TABLES: RuleInfo = RuleInfo {
    id: "no-tables",
    description: "Tables are not allowed",
    severity: Severity::Error,
    points_on_pass: 1,
    points_on_fail: -2,
};

impl Rule for NoTables {
    fn info(&self) -> &RuleInfo {
        &NO_TABLES
    }

    fn detect(&self, document: &Document, _raw: &str) -> Result<Outcome, RuleError> {
        let table_parts = document.select("table, thead, tbody, tfoot, tr, td, th")?;

        if table_parts.is_empty() {
            Ok(Outcome::pass("No table elements were used."))
        } else {
            Ok(Outcome::fail(
                format!("Found {} forbidden table elements.", table_parts.len()),
                "Use CSS Grid or Flexbox for layout. Tables are only for real tabular data.",
            )
            .with_matches(document.nodes(table_parts)))
        }
    }
}

/// No <u>, <b> or <i>
pub struct NoVisualTags;

const NO_VISUAL_TAGS: RuleInfo = RuleInfo {
    id: "no-visual-tags",
    description: "Avoid presentational tags",
    severity: Severity::Error,
    points_on_pass: 1,
    points_on_fail: -2,
};

impl Rule for NoVisualTags {
    fn info(&self) -> &RuleInfo {
        &NO_VISUAL_TAGS
    }

    fn detect(&self, document: &Document, _raw: &str) -> Result<Outcome, RuleError> {
        let visual = document.select("u, b, i")?;

        if visual.is_empty() {
            Ok(Outcome::pass("No presentational tags (<u>, <b>, <i>) were used."))
        } else {
            Ok(Outcome::fail(
                format!("Found {} forbidden presentational tags.", visual.len()),
                "Style with CSS and use semantic tags: <strong> instead of <b>, <em> instead of <i>, \
                 CSS text-decoration for underlines.",
            )
            .with_matches(document.nodes(visual)))
        }
    }
}
