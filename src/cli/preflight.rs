//! Pre-flight checks before expensive operations.
//!
//! Validates that required tools and configuration are available
//! before starting operations that would otherwise fail midway.

use crate::config::Settings;
use crate::error::{CodeeError, Result};
use std::process::Command;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Ingestion needs yt-dlp unless transcripts are read from disk, and an
    /// API key unless embeddings are computed locally.
    Ingest,
    /// Chatting and asking need an API key.
    Ask,
    /// Search needs an API key only for the query embedding.
    Search,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings, api_key: Option<&str>) -> Result<()> {
    let needs_key = settings.embedding.provider == "openai";
    match operation {
        Operation::Ingest => {
            if needs_key {
                check_api_key(api_key)?;
            }
            if settings.sources.transcript_dir.is_none() {
                check_tool("yt-dlp")?;
            }
        }
        Operation::Ask => {
            check_api_key(api_key)?;
        }
        Operation::Search => {
            if needs_key {
                check_api_key(api_key)?;
            }
        }
    }
    Ok(())
}

/// Check that an API key was supplied.
fn check_api_key(api_key: Option<&str>) -> Result<()> {
    match api_key {
        Some(key) if !key.trim().is_empty() => Ok(()),
        _ => Err(CodeeError::MissingCredential),
    }
}

/// Check if an external tool is available.
pub fn check_tool(name: &str) -> Result<()> {
    match Command::new(name).arg("--version").output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(CodeeError::ToolNotFound(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(CodeeError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(CodeeError::ToolNotFound(format!("{}: {}", name, e))),
    }
}
