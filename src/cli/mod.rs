//! Command-line interface for docsearch.

mod commands;

use clap::{Parser, Subcommand};

/// docsearch - document search service with per-user quotas
#[derive(Parser)]
#[command(name = "docsearch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the startup phase, then serve HTTP (default)
    #[command(alias = "web")]
    Serve,

    /// Scrape the configured page once and store the fragments
    Ingest,

    /// Remove cached search results older than the configured max age
    SweepCache {
        /// Override the max age in hours
        #[arg(long)]
        max_age_hours: Option<u32>,
    },

    /// Insert the five sample documents
    Seed,

    /// List stored documents
    #[command(alias = "ls")]
    List {
        /// Only show documents scoring at least this much
        #[arg(long)]
        min_score: Option<f64>,
    },

    /// Create default config file
    #[command(alias = "--init")]
    Init,
}

pub use commands::*;
