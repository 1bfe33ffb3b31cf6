// src/main.rs
// =============================================================================
// This is the entry point of the html-grader CLI.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (stderr, so JSON on stdout stays clean)
// 3. Read the document, run the engine, print the results
// 4. Exit with proper code (0 = passed, 1 = needs work or failed, 2 = error)
// =============================================================================

mod cli; // src/cli.rs - command-line parsing

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use html_grader::report::{self, Report};
use html_grader::{analyze, read_source, AnalysisRun, GraderConfig, RuleRegistry, Verdict};
use std::path::Path;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // Fatal parse errors and I/O problems end up here
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

fn init_logging(verbose: bool) {
    // RUST_LOG wins when set; otherwise --verbose picks the level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("html_grader=debug")
        } else {
            EnvFilter::new("html_grader=warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check {
            input,
            json,
            transcript,
            no_network,
            base_url,
            timeout_secs,
            concurrency,
            verbose,
        } => {
            init_logging(verbose);
            let config = GraderConfig {
                probe_timeout: Duration::from_secs(timeout_secs),
                probe_concurrency: concurrency,
                check_image_sizes: !no_network,
                base_url,
                ..GraderConfig::default()
            };
            handle_check(&input, &config, json, transcript).await
        }
        Commands::Rules => {
            print_rules(&RuleRegistry::standard());
            Ok(0)
        }
    }
}

// Handles the 'check' subcommand
async fn handle_check(input: &Path, config: &GraderConfig, json: bool, transcript: bool) -> Result<i32> {
    // "-" means stdin, anything else is a file path
    let raw = read_source(input).with_context(|| format!("could not read {}", input.display()))?;
    let run = analyze(&raw, config).await?;

    if json {
        let report = Report::new(&run, &raw);
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if transcript {
        print!("{}", report::transcript(&run, chrono::Utc::now()));
    } else {
        print_table(&run, &raw);
    }

    Ok(match run.verdict {
        Verdict::Passed => 0,
        Verdict::Improvable | Verdict::Failed => 1,
    })
}

// Prints findings as a human-readable table, failures first
fn print_table(run: &AnalysisRun, raw: &str) {
    println!("{:<14} {:<24} {:>5} {:>6}  {}", "STATUS", "RULE", "PTS", "LINE", "MESSAGE");
    println!("{}", "=".repeat(110));

    for finding in report::display_order(&run.findings) {
        let line = report::first_line(finding, raw)
            .map(|line| line.to_string())
            .unwrap_or_else(|| "-".to_string());

        println!(
            "{:<14} {:<24} {:>5} {:>6}  {}",
            report::status_label(finding),
            finding.rule_id(),
            report::signed_points(finding.points()),
            line,
            report::truncate(&finding.outcome.message, 60)
        );
        if !finding.passed() {
            if let Some(suggestion) = &finding.outcome.suggestion {
                println!("{:<52}💡 {}", "", suggestion);
            }
        }
    }

    println!();
    println!("📊 Summary:");
    println!("   Score: {} points ({:.1}%)", run.score.total_score, run.score.percentage);
    println!("   ✅ Passed: {}", run.score.passed_count);
    println!("   ❌ Failed: {}", run.score.failed_count);
    println!("   📋 Verdict: {}", run.verdict);
}

// Prints the registry in execution order
fn print_rules(registry: &RuleRegistry) {
    println!("{:<24} {:<8} {:>5} {:>5}  {}", "RULE", "TYPE", "PASS", "FAIL", "DESCRIPTION");
    println!("{}", "=".repeat(80));

    for rule in registry.rules() {
        let info = rule.info();
        println!(
            "{:<24} {:<8} {:>5} {:>5}  {}",
            info.id,
            info.severity.to_string(),
            report::signed_points(info.points_on_pass),
            info.points_on_fail,
            info.description
        );
    }
}
