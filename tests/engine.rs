// tests/engine.rs
// =============================================================================
// End-to-end runs of the engine over complete documents, through the public
// library API only.
// =============================================================================

use async_trait::async_trait;
use html_grader::engine::{ImageProbe, ProbeError};
use html_grader::report::Report;
use html_grader::score::score;
use html_grader::{
    analyze_offline, prepare, read_source, AnalysisRun, Finding, GraderConfig, GraderError,
    Outcome, RuleInfo, RuleRegistry, Severity, Verdict,
};
use pretty_assertions::assert_eq;
use std::path::Path;
use std::time::Duration;

const GOOD_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>My cats</title>
</head>
<body>
  <header><h1>My cats</h1></header>
  <nav>
    <ul>
      <li><a href="index.html">Home</a></li>
      <li><a href="about-us.html">About</a></li>
    </ul>
  </nav>
  <main>
    <section>
      <h2>Tom</h2>
      <p>Tom likes boxes. <img src="https://img.example.com/tom.png" alt="Tom in a box"></p>
    </section>
  </main>
  <footer><p>Made by hand</p></footer>
</body>
</html>"#;

fn finding<'a>(run: &'a AnalysisRun, id: &str) -> &'a Finding {
    run.findings
        .iter()
        .find(|finding| finding.rule_id() == id)
        .unwrap_or_else(|| panic!("no finding for {}", id))
}

// Wraps a body fragment in a complete, valid skeleton
fn page(body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>T</title>\n</head>\n\
         <body>\n{}\n</body>\n</html>",
        body
    )
}

#[test]
fn good_page_passes_every_rule() {
    let run = analyze_offline(GOOD_PAGE).unwrap();
    let registry = RuleRegistry::standard();

    for rule in registry.rules() {
        let result = finding(&run, rule.info().id);
        assert!(result.passed(), "{}: {}", result.rule_id(), result.outcome.message);
    }
    assert_eq!(run.verdict, Verdict::Passed);
}

#[test]
fn rerunning_gives_identical_results() {
    let first = analyze_offline(GOOD_PAGE).unwrap();
    let second = analyze_offline(GOOD_PAGE).unwrap();
    assert_eq!(first, second);

    let broken = "<div><div><p>x<p>y</div>";
    assert_eq!(analyze_offline(broken).unwrap(), analyze_offline(broken).unwrap());
}

#[test]
fn unreadable_input_is_an_io_error() {
    let result = read_source(Path::new("/nonexistent/html-grader/index.html"));
    assert!(matches!(result, Err(GraderError::Io(_))));
}

#[test]
fn blank_or_markup_free_input_is_fatal() {
    assert!(matches!(analyze_offline(""), Err(GraderError::EmptyInput)));
    assert!(matches!(analyze_offline(" \n\t"), Err(GraderError::EmptyInput)));
    assert!(matches!(
        analyze_offline("no tags at all"),
        Err(GraderError::NotHtml)
    ));
}

#[test]
fn h1_must_be_unique() {
    let none = analyze_offline(&page("<p>no title</p>")).unwrap();
    let result = finding(&none, "unique-h1");
    assert!(!result.passed());
    assert!(result.outcome.message.starts_with("No <h1> element found"));

    let one = analyze_offline(&page("<h1>Title</h1>")).unwrap();
    assert!(finding(&one, "unique-h1").passed());

    let two = analyze_offline(&page("<h1>A</h1>\n<h1>B</h1>")).unwrap();
    let result = finding(&two, "unique-h1");
    assert!(!result.passed());
    assert_eq!(
        result.outcome.message,
        "Found 2 <h1> elements. There must be only one."
    );
    assert_eq!(result.outcome.matches.len(), 2);
}

#[test]
fn skeleton_must_be_written_out() {
    let minimal = "<!DOCTYPE html><html><head></head><body></body></html>";
    let run = analyze_offline(minimal).unwrap();
    assert!(finding(&run, "html-structure").passed());

    let no_body = "<!DOCTYPE html><html><head></head></html>";
    let run = analyze_offline(no_body).unwrap();
    let result = finding(&run, "html-structure");
    assert!(!result.passed());
    assert!(result.outcome.message.contains("missing <body> element"));
    assert_eq!(result.points(), -5);
}

#[test]
fn nav_links_must_sit_in_list_items() {
    let good = page(r##"<nav><ul><li><a href="#">x</a></li></ul></nav>"##);
    assert!(finding(&analyze_offline(&good).unwrap(), "nav-structure").passed());

    let bare = page(r##"<nav><a href="#">x</a></nav>"##);
    assert!(!finding(&analyze_offline(&bare).unwrap(), "nav-structure").passed());
}

#[test]
fn images_need_meaningful_alt_text() {
    let missing = analyze_offline(&page(r#"<img src="a.png">"#)).unwrap();
    let result = finding(&missing, "image-alt");
    assert!(!result.passed());
    assert!(result.outcome.message.contains("missing the alt attribute"));

    let empty = analyze_offline(&page(r#"<img src="a.png" alt="">"#)).unwrap();
    let result = finding(&empty, "image-alt");
    assert!(!result.passed());
    assert!(result.outcome.message.contains("suspicious empty alt"));

    let described = analyze_offline(&page(r#"<img src="a.png" alt="a cat">"#)).unwrap();
    assert!(finding(&described, "image-alt").passed());
}

#[test]
fn one_pass_and_one_error_score_minus_one() {
    let rule = |id| RuleInfo {
        id,
        description: "Rule",
        severity: Severity::Error,
        points_on_pass: 1,
        points_on_fail: -2,
    };
    let findings = vec![
        Finding::new(rule("first"), Outcome::pass("ok")),
        Finding::new(rule("second"), Outcome::fail("bad", "fix")),
    ];

    let result = score(&findings);
    assert_eq!(result.total_score, -1);
    assert_eq!(result.passed_count, 1);
    assert_eq!(result.failed_count, 1);
}

#[test]
fn malformed_markup_is_reported_before_rules() {
    let run = analyze_offline(&page("<h2>\n<h3>Nested</h3></h2>")).unwrap();
    assert_eq!(run.findings[0].rule_id(), "malformed-headers");
    assert_eq!(run.findings[0].points(), -5);
    assert!(run.findings[0].outcome.matches.is_empty());
}

#[test]
fn json_report_covers_every_finding() {
    let run = analyze_offline(GOOD_PAGE).unwrap();
    let json = serde_json::to_value(Report::new(&run, GOOD_PAGE)).unwrap();

    let results = json["results"].as_array().unwrap();
    assert_eq!(results.len(), run.findings.len());
    assert_eq!(json["summary"]["status"], "passed");
    assert_eq!(json["summary"]["totalScore"], run.score.total_score);
}

// Answers by file name: "slow" hangs, "big" is 2MB, anything else is 10KB
struct FakeImages;

#[async_trait]
impl ImageProbe for FakeImages {
    async fn content_length(&self, url: &str) -> Result<Option<u64>, ProbeError> {
        if url.contains("slow") {
            tokio::time::sleep(Duration::from_secs(60)).await;
        }
        if url.contains("broken") {
            return Err(ProbeError::Status(500));
        }
        Ok(Some(if url.contains("big") { 2 * 1024 * 1024 } else { 10 * 1024 }))
    }
}

fn probe_config() -> GraderConfig {
    GraderConfig {
        probe_timeout: Duration::from_millis(200),
        ..GraderConfig::default()
    }
}

#[tokio::test]
async fn slow_probe_does_not_hide_oversized_images() {
    let raw = page(
        r#"<h1>Gallery</h1>
<img src="https://img.example.com/slow.png" alt="slow">
<img src="https://img.example.com/big.png" alt="big">
<img src="https://img.example.com/broken.png" alt="broken">
<img src="https://img.example.com/small.png" alt="small">"#,
    );
    let prepared = prepare(&raw, &RuleRegistry::standard()).unwrap();
    let run = tokio::time::timeout(
        Duration::from_secs(10),
        prepared.finish(&FakeImages, &probe_config()),
    )
    .await
    .expect("async phase must not hang");

    let result = finding(&run, "image-size");
    assert!(!result.passed());
    assert_eq!(
        result.outcome.message,
        "1 images are larger than 500KB. 2 images could not be verified."
    );
    assert_eq!(result.outcome.matches.len(), 1);
    assert_eq!(result.outcome.matches[0].occurrence, 1);
}

#[tokio::test]
async fn unverifiable_images_never_fail_the_rule() {
    let raw = page(
        r#"<h1>Gallery</h1>
<img src="http://plain.example.com/a.png" alt="a">
<img src="img/local.png" alt="local">
<img src="data:image/gif;base64,R0lGODlhAQABAAAAACw=" alt="dot">"#,
    );
    let prepared = prepare(&raw, &RuleRegistry::standard()).unwrap();
    let run = prepared.finish(&FakeImages, &probe_config()).await;

    let result = finding(&run, "image-size");
    assert!(result.passed());
    assert_eq!(
        result.outcome.message,
        "The image sizes could not be verified. 2 images could not be verified."
    );
}

#[tokio::test]
async fn base_url_makes_relative_images_checkable() {
    let raw = page(r#"<h1>Gallery</h1><img src="photos/big.jpg" alt="big">"#);
    let config = GraderConfig {
        base_url: Some("https://site.example.com/".to_string()),
        ..probe_config()
    };
    let prepared = prepare(&raw, &RuleRegistry::standard()).unwrap();
    let run = prepared.finish(&FakeImages, &config).await;

    assert!(!finding(&run, "image-size").passed());
}

#[tokio::test]
async fn provisional_result_is_available_before_probes() {
    let raw = page(r#"<h1>Gallery</h1><img src="https://img.example.com/big.png" alt="big">"#);
    let prepared = prepare(&raw, &RuleRegistry::standard()).unwrap();

    let provisional = prepared.provisional();
    assert!(finding(&provisional, "image-size").passed());
    assert_eq!(prepared.findings(), provisional.findings.as_slice());
    assert!(prepared.has_pending());

    let finished = prepared.finish(&FakeImages, &probe_config()).await;
    assert!(!finding(&finished, "image-size").passed());
    assert_eq!(finished.findings.len(), provisional.findings.len());
}
