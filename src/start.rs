//! Startup helpers for the digest binary.
//!
//! Reads `DIGEST_*` configuration from the environment, runs the pipeline once
//! and writes the summaries to stdout as a JSON array.

use std::io::Write;
use std::process::ExitCode;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use crate::digest::{ConversationDigest, ConversationSummary, DigestConfig};

/// Run one digest and print it.
///
/// # Returns
/// `ExitCode::SUCCESS` when the summaries were written, `1` on any failure.
#[must_use]
pub fn run() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .init();

    tracing::info!("Starting conversation digest v{}", env!("CARGO_PKG_VERSION"));

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to create runtime: {e}");
            return ExitCode::from(1);
        }
    };

    match rt.block_on(fetch_summaries()).and_then(|s| write_json(&s)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Digest failed: {e:#}");
            ExitCode::from(1)
        }
    }
}

/// Build the client from the environment and fetch summaries.
///
/// # Errors
/// Returns an error if configuration is invalid or any pipeline stage fails.
pub async fn fetch_summaries() -> anyhow::Result<Vec<ConversationSummary>> {
    let config = DigestConfig::from_env().context("loading configuration")?;
    tracing::info!("API endpoint: {}", config.base_url);

    let digest = ConversationDigest::new(&config).context("building HTTP client")?;
    digest
        .recent_summaries()
        .await
        .context("building conversation summaries")
}

/// `RUST_LOG` directives when set and valid, `info` otherwise.
fn env_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

fn write_json(summaries: &[ConversationSummary]) -> anyhow::Result<()> {
    let mut out = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, summaries).context("writing summaries")?;
    writeln!(out).context("writing summaries")?;
    Ok(())
}
