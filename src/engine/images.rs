// src/engine/images.rs
// =============================================================================
// The asynchronous half of the image-size rule.
//
// How it works:
// 1. Collect every <img src> while the document is still at hand
// 2. Decide which sources can be probed at all:
//    - data: URLs are embedded, nothing to measure (skipped)
//    - https:// (and protocol-relative //) URLs are probed
//    - http:// URLs are never requested, they count as unverifiable
//    - relative paths are resolved against the base URL if there is one
// 3. Probe them concurrently, each under its own timeout
// 4. Merge the per-image results into one Outcome
//
// A probe that fails, times out or gets no Content-Length makes its image
// "unverifiable". That is reported but never fails the rule; only images
// known to be larger than the limit do.
// =============================================================================

use super::probe::ImageProbe;
use crate::config::GraderConfig;
use crate::document::{Document, NodeRef};
use crate::error::RuleError;
use crate::rules::Outcome;
use futures::stream::{self, StreamExt}; // StreamExt gives us .buffer_unordered()
use tokio::time::timeout;
use tracing::{debug, warn};
use url::Url;

/// An image referenced by the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageTarget {
    pub node: NodeRef,
    pub src: String,
}

/// What we learned about one image
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageStatus {
    /// Size is known and within the limit
    Within(u64),
    /// Size is known and over the limit
    Oversized(u64),
    /// Size could not be determined
    Unverifiable(String),
}

/// Every image with a src, in document order
pub fn collect_targets(document: &Document) -> Result<Vec<ImageTarget>, RuleError> {
    Ok(document
        .select("img[src]")?
        .into_iter()
        .filter_map(|img| {
            let src = img.value().attr("src")?.trim();
            Some(ImageTarget {
                node: document.node(img),
                src: src.to_string(),
            })
        })
        .collect())
}

// Where to send the HEAD request, or why we won't
enum ProbePlan {
    Request(String),
    Unverifiable(String),
}

// None for sources with nothing to measure (empty or embedded data)
fn plan(src: &str, base: Option<&Url>) -> Option<ProbePlan> {
    if src.is_empty() || src.starts_with("data:") {
        return None;
    }

    let absolute = if src.starts_with("//") {
        format!("https:{}", src)
    } else if src.starts_with("http://") || src.starts_with("https://") {
        src.to_string()
    } else {
        match base.and_then(|base| base.join(src).ok()) {
            Some(url) => url.to_string(),
            None => {
                return Some(ProbePlan::Unverifiable(
                    "relative source without a base URL".into(),
                ))
            }
        }
    };

    if absolute.starts_with("https://") {
        Some(ProbePlan::Request(absolute))
    } else {
        Some(ProbePlan::Unverifiable("not served over HTTPS".into()))
    }
}

/// Probes every image and builds the final image-size outcome
pub async fn check_image_sizes(
    targets: Vec<ImageTarget>,
    probe: &dyn ImageProbe,
    config: &GraderConfig,
) -> Outcome {
    let base = config
        .base_url
        .as_deref()
        .and_then(|base| Url::parse(base).ok());

    let planned: Vec<(NodeRef, ProbePlan)> = targets
        .into_iter()
        .filter_map(|target| {
            let plan = plan(&target.src, base.as_ref())?;
            Some((target.node, plan))
        })
        .collect();

    if planned.is_empty() {
        return Outcome::pass("No images to check.");
    }

    // One future per image; each owns its own result, merged after the join
    let futures = planned.into_iter().map(|(node, plan)| async move {
        let status = match plan {
            ProbePlan::Request(url) => measure(probe, &url, config).await,
            ProbePlan::Unverifiable(reason) => ImageStatus::Unverifiable(reason),
        };
        (node, status)
    });

    let results: Vec<(NodeRef, ImageStatus)> = stream::iter(futures)
        .buffer_unordered(config.probe_concurrency.max(1))
        .collect()
        .await;

    summarize(results, config.max_image_bytes)
}

async fn measure(probe: &dyn ImageProbe, url: &str, config: &GraderConfig) -> ImageStatus {
    debug!(url, "probing image size");
    match timeout(config.probe_timeout, probe.content_length(url)).await {
        Ok(Ok(Some(bytes))) if bytes > config.max_image_bytes => ImageStatus::Oversized(bytes),
        Ok(Ok(Some(bytes))) => ImageStatus::Within(bytes),
        Ok(Ok(None)) => {
            warn!(url, "no Content-Length, image size unverifiable");
            ImageStatus::Unverifiable("no Content-Length header".into())
        }
        Ok(Err(e)) => {
            warn!(url, error = %e, "image probe failed");
            ImageStatus::Unverifiable(e.to_string())
        }
        Err(_) => {
            warn!(url, "image probe timed out");
            ImageStatus::Unverifiable("timed out".into())
        }
    }
}

fn summarize(mut results: Vec<(NodeRef, ImageStatus)>, limit: u64) -> Outcome {
    // buffer_unordered finishes in any order; report in document order
    results.sort_by_key(|(node, _)| node.index);

    let mut oversized = Vec::new();
    let mut checked = 0usize;
    let mut unverifiable = 0usize;
    for (node, status) in results {
        match status {
            ImageStatus::Within(_) => checked += 1,
            ImageStatus::Oversized(_) => {
                checked += 1;
                oversized.push(node);
            }
            ImageStatus::Unverifiable(_) => unverifiable += 1,
        }
    }

    let limit_kb = limit / 1024;
    let passed = oversized.is_empty();
    let mut message = if checked == 0 {
        "The image sizes could not be verified.".to_string()
    } else if passed {
        format!("All verified images ({}) are ≤ {}KB.", checked, limit_kb)
    } else {
        format!("{} images are larger than {}KB.", oversized.len(), limit_kb)
    };
    if unverifiable > 0 {
        message.push_str(&format!(" {} images could not be verified.", unverifiable));
    }

    if passed {
        Outcome::pass(message)
    } else {
        Outcome::fail(
            message,
            format!(
                "Optimize the images so they weigh less than {}KB. Use compression tools or \
                 more efficient formats such as WebP.",
                limit_kb
            ),
        )
        .with_matches(oversized)
    }
}
