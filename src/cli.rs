// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Two subcommands:
// - check: grade one HTML file (or stdin with "-")
// - rules: list every rule with its severity and points
//
// The flags of `check` only touch output format, logging and the network
// phase. The grading scale itself is fixed.
// =============================================================================

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "html-grader",
    version,
    about = "Grades HTML documents against a fixed set of structure and semantics rules",
    long_about = "html-grader parses an HTML document, runs every rule against it and prints \
                  a score with one finding per rule. The exit code tells CI whether the \
                  document passed."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Grade an HTML document
    ///
    /// Example: html-grader check index.html --base-url https://example.com/
    Check {
        /// Path to the HTML file, or "-" to read stdin
        input: PathBuf,

        /// Output the report as JSON instead of a table
        #[arg(long, conflicts_with = "transcript")]
        json: bool,

        /// Output a plain-text transcript instead of a table
        #[arg(long)]
        transcript: bool,

        /// Skip the image-size probes (the rule stays optimistic)
        #[arg(long)]
        no_network: bool,

        /// Base URL used to resolve relative image sources
        #[arg(long)]
        base_url: Option<String>,

        /// Seconds before a single image probe gives up
        #[arg(long, default_value_t = 10)]
        timeout_secs: u64,

        /// How many image probes may run at once
        #[arg(long, default_value_t = 8)]
        concurrency: usize,

        /// Log every rule and probe to stderr
        #[arg(short, long)]
        verbose: bool,
    },

    /// List the rules in the order they run
    Rules,
}
