//! Engine limit resolution for the CLI.
//!
//! Each limit is taken from its command-line flag if given, otherwise from
//! its environment variable, otherwise from the default.

use anyhow::{Context, Result};
use jsbridge_common::limits::parse_byte_size;
use jsbridge_common::EngineLimits;

/// Resolves the session limits from optional flag values.
///
/// # Errors
///
/// Returns an error if a flag or environment value is not a byte size, or if
/// the resulting limits do not validate.
pub fn resolve_limits(memory_limit: Option<&str>, gc_threshold: Option<&str>) -> Result<EngineLimits> {
    let mut limits = EngineLimits::default()
        .with_env_overrides()
        .context("Invalid engine limit in environment")?;

    if let Some(raw) = memory_limit {
        let bytes = parse_byte_size(raw).map_err(|e| anyhow::anyhow!("--memory-limit: {}", e))?;
        limits = limits.with_memory_limit(bytes);
    }
    if let Some(raw) = gc_threshold {
        let bytes = parse_byte_size(raw).map_err(|e| anyhow::anyhow!("--gc-threshold: {}", e))?;
        limits = limits.with_gc_threshold(bytes);
    }

    limits.validate()?;
    Ok(limits)
}
