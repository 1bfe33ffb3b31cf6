// src/rules/media.rs
// =============================================================================
// Rules about images, audio and video.
//
// - media-controls: audio needs controls, video needs controls and muted
// - image-alt: every image has alt text (an empty alt is suspicious)
// - image-size: images must be at most 500 KB. Measuring that needs the
//   network, so the synchronous check only returns a provisional pass and
//   the engine replaces it later (see engine/images.rs)
// =============================================================================

use super::{Outcome, Refinement, Rule, RuleInfo, Severity};
use crate::document::{has_attr, Document};
use crate::error::RuleError;

/// File extensions that mark a source as an image file
pub const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "webp", "avif", "bmp", "svg", "tif", "tiff", "ico",
];

/// Audio and video carry the attributes users need
pub struct MediaControls;

const MEDIA_CONTROLS: RuleInfo = RuleInfo {
    id: "media-controls",
    description: "Media with controls",
    severity: Severity::Error,
    points_on_pass: 1,
    points_on_fail: -2,
};

impl Rule for MediaControls {
    fn info(&self) -> &RuleInfo {
        &MEDIA_CONTROLS
    }

    fn detect(&self, document: &Document, _raw: &str) -> Result<Outcome, RuleError> {
        let audios = document.select("audio")?;
        let videos = document.select("video")?;
        let total = audios.len() + videos.len();

        if total == 0 {
            return Ok(Outcome::pass("No media elements found."));
        }

        let mut invalid: Vec<_> = audios
            .iter()
            .copied()
            .filter(|audio| !has_attr(audio, "controls"))
            .collect();
        invalid.extend(
            videos
                .iter()
                .copied()
                .filter(|video| !has_attr(video, "controls") || !has_attr(video, "muted")),
        );

        if invalid.is_empty() {
            let mut all = audios;
            all.extend(videos);
            Ok(Outcome::pass(format!(
                "All media elements ({}) have the required attributes.",
                total
            ))
            .with_matches(document.nodes(all)))
        } else {
            Ok(Outcome::fail(
                format!(
                    "{} media elements are missing required attributes.",
                    invalid.len()
                ),
                "<audio> and <video> elements need \"controls\". <video> elements also need \"muted\".",
            )
            .with_matches(document.nodes(invalid)))
        }
    }
}

/// Every image has alt text
pub struct ImageAlt;

const IMAGE_ALT: RuleInfo = RuleInfo {
    id: "image-alt",
    description: "Images with alternative text",
    severity: Severity::Error,
    points_on_pass: 1,
    points_on_fail: -2,
};

impl Rule for ImageAlt {
    fn info(&self) -> &RuleInfo {
        &IMAGE_ALT
    }

    fn detect(&self, document: &Document, _raw: &str) -> Result<Outcome, RuleError> {
        let images = document.select("img")?;
        let mut missing = Vec::new();
        let mut suspect = Vec::new();

        for image in &images {
            let element = image.value();
            match element.attr("alt") {
                None => missing.push(*image),
                Some(alt) if alt.trim().is_empty() => {
                    // Empty alt marks decoration, which image files rarely are
                    if element.attr("src").is_some_and(has_image_extension) {
                        suspect.push(*image);
                    }
                }
                Some(_) => {}
            }
        }

        if missing.is_empty() && suspect.is_empty() {
            return Ok(Outcome::pass(format!(
                "All images ({}) have alternative text.",
                images.len()
            ))
            .with_matches(document.nodes(images)));
        }

        let mut problems = Vec::new();
        if !missing.is_empty() {
            problems.push(format!("{} images are missing the alt attribute", missing.len()));
        }
        if !suspect.is_empty() {
            problems.push(format!(
                "{} images have a suspicious empty alt",
                suspect.len()
            ));
        }

        let mut matches = document.nodes(missing);
        matches.extend(document.nodes(suspect));
        matches.sort_by_key(|node| node.index);

        Ok(Outcome::fail(
            format!("{}.", problems.join(", ")),
            "Give every <img> an alt attribute describing the image. Leave alt empty only for \
             purely decorative images.",
        )
        .with_matches(matches))
    }
}

/// Whether a source URL ends in an image file extension
pub fn has_image_extension(src: &str) -> bool {
    let path = src.split(['?', '#']).next().unwrap_or(src);
    let filename = path.rsplit('/').next().unwrap_or(path);
    filename
        .rsplit_once('.')
        .is_some_and(|(_, ext)| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Images are at most 500 KB
///
/// The synchronous outcome is a placeholder; the verdict comes from the
/// image-size refinement once the probes have finished.
pub struct ImageSize;

const IMAGE_SIZE: RuleInfo = RuleInfo {
    id: "image-size",
    description: "Images ≤ 500KB",
    severity: Severity::Warning,
    points_on_pass: 1,
    points_on_fail: -1,
};

impl Rule for ImageSize {
    fn info(&self) -> &RuleInfo {
        &IMAGE_SIZE
    }

    fn detect(&self, _document: &Document, _raw: &str) -> Result<Outcome, RuleError> {
        Ok(Outcome::pass("Image size check completed."))
    }

    fn refinement(&self) -> Option<Refinement> {
        Some(Refinement::ImageSizes)
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
    fn test_no_media_passes_with_distinct_message() {
        let outcome = run(&MediaControls, "<p>x</p>");
        assert!(outcome.passed);
        assert_eq!(outcome.message, "No media elements found.");
    }

    #[test]
    fn test_video_needs_muted_too() {
        let outcome = run(
            &MediaControls,
            r#"<audio controls src="a.mp3"></audio><video controls src="v.mp4"></video>"#,
        );
        assert!(!outcome.passed);
        assert_eq!(outcome.matches.len(), 1);
        assert_eq!(outcome.matches[0].tag, "video");
    }

    #[test]
    fn test_media_with_attributes_passes() {
        let outcome = run(
            &MediaControls,
            r#"<audio controls></audio><video controls muted></video>"#,
        );
        assert!(outcome.passed);
        assert_eq!(outcome.matches.len(), 2);
    }

    #[test]
    fn test_missing_alt() {
        let outcome = run(&ImageAlt, r#"<img src="a.png">"#);
        assert!(!outcome.passed);
        assert!(outcome.message.contains("missing the alt attribute"));
    }

    #[test]
    fn test_empty_alt_on_photo_is_suspect() {
        let outcome = run(&ImageAlt, r#"<img src="a.png" alt="">"#);
        assert!(!outcome.passed);
        assert!(outcome.message.contains("suspicious empty alt"));
        assert!(!outcome.message.contains("missing"));
    }

    #[test]
    fn test_descriptive_alt_passes() {
        assert!(run(&ImageAlt, r#"<img src="a.png" alt="a cat">"#).passed);
    }

    #[test]
    fn test_empty_alt_without_image_extension_is_decorative() {
        assert!(run(&ImageAlt, r#"<img src="/spacer" alt="">"#).passed);
    }

    #[test]
    fn test_missing_and_suspect_are_tallied_separately() {
        let html = r#"<img src="a.png"><img src="b.jpg" alt=""><img src="c.gif" alt="">"#;
        let outcome = run(&ImageAlt, html);
        assert_eq!(
            outcome.message,
            "1 images are missing the alt attribute, 2 images have a suspicious empty alt."
        );
        assert_eq!(outcome.matches.len(), 3);
    }

    #[test]
    fn test_image_extension_detection() {
        assert!(has_image_extension("photos/Cat.JPG"));
        assert!(has_image_extension("https://cdn.example.com/a.webp?w=200#top"));
        assert!(!has_image_extension("https://example.com/image"));
        assert!(!has_image_extension("files.v2/readme"));
    }

    #[test]
    fn test_image_size_placeholder_is_optimistic() {
        let outcome = run(&ImageSize, r#"<img src="https://example.com/big.png" alt="x">"#);
        assert!(outcome.passed);
        assert!(outcome.suggestion.is_none());
        assert_eq!(ImageSize.refinement(), Some(Refinement::ImageSizes));
    }
}
