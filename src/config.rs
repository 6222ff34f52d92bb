//! Command-line configuration.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::Parser;

use crate::source::MockOptions;

/// A terminal client for paginated feeds backed by mock data.
#[derive(Debug, Clone, Parser)]
#[command(name = "pagefeed", version, about)]
pub struct Config {
    /// Items requested per page.
    #[arg(long, default_value_t = 10)]
    pub page_size: u32,

    /// Pages each mock source pretends to have.
    #[arg(long, default_value_t = 5)]
    pub max_pages: u32,

    /// Simulated network latency per request, in milliseconds.
    #[arg(long, default_value_t = 600)]
    pub latency_ms: u64,

    /// Probability in [0, 1] that a simulated request fails.
    #[arg(long, default_value_t = 0.1)]
    pub failure_rate: f64,

    /// Seed for generated data; omit for different numbers on every run.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Rows from the end of a list at which the next page is requested.
    #[arg(long, default_value_t = 1)]
    pub lookahead: usize,

    /// File that receives log output (RUST_LOG filters it).
    #[arg(long, default_value = "pagefeed.log")]
    pub log_file: PathBuf,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            bail!("--page-size must be at least 1");
        }
        if self.max_pages == 0 {
            bail!("--max-pages must be at least 1");
        }
        if !(0.0..=1.0).contains(&self.failure_rate) {
            bail!("--failure-rate must be between 0 and 1, got {}", self.failure_rate);
        }
        Ok(())
    }

    pub fn mock_options(&self) -> MockOptions {
        MockOptions {
            latency: Duration::from_millis(self.latency_ms),
            max_pages: self.max_pages,
            failure_rate: self.failure_rate,
            seed: self.seed,
        }
    }

    /// Publishing takes longer than a page fetch and never fails at random.
    pub fn publish_options(&self) -> MockOptions {
        MockOptions {
            latency: Duration::from_millis(self.latency_ms.max(1000)),
            failure_rate: 0.0,
            ..self.mock_options()
        }
    }
}
