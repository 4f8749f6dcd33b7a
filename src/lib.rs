//! Static investor dashboard for Bombo.
//!
//! The crate is built around [`formatting`], a set of total functions that turn
//! raw metrics into display strings (`$70.0M`, `801K`, `25.3%`), and
//! [`data::bombo_data`], the read-only table those metrics come from. The
//! remaining modules render that table as an HTML page, CSV/JSON exports and a
//! terminal summary.

pub mod charts;
pub mod cli;
pub mod data;
pub mod export;
pub mod formatting;
pub mod metrics;
pub mod progress;
pub mod report;
pub mod summary;

use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;

/// Writes `bytes` to `path`, creating parent directories as needed.
pub async fn write_output_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }

    fs::write(path, bytes)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;

    Ok(())
}
