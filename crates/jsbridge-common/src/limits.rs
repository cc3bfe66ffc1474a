//! Memory limits for a QuickJS session.
//!
//! A session's runtime is created with an explicit allocation ceiling and a
//! garbage-collection trigger threshold. Exceeding the ceiling surfaces as an
//! ordinary engine allocation error inside the running script.

use crate::protocol::error::{BridgeError, Result};

/// Environment variable overriding [`EngineLimits::memory_limit_bytes`].
pub const MEMORY_LIMIT_ENV: &str = "JSBRIDGE_MEMORY_LIMIT";
/// Environment variable overriding [`EngineLimits::gc_threshold_bytes`].
pub const GC_THRESHOLD_ENV: &str = "JSBRIDGE_GC_THRESHOLD";

const DEFAULT_MEMORY_LIMIT: usize = 64 * 1024 * 1024;
const DEFAULT_GC_THRESHOLD: usize = 1024 * 1024;

/// Memory limits applied to a session's runtime at initialization.
///
/// # Fields
///
/// - `memory_limit_bytes` - Allocation ceiling for the runtime (default: 64 MiB)
/// - `gc_threshold_bytes` - Allocated size that triggers a GC cycle (default: 1 MiB)
///
/// Both defaults are sized for a mobile environment.
///
/// # Example
///
/// ```
/// use jsbridge_common::EngineLimits;
///
/// let limits = EngineLimits::new()
///     .with_memory_limit(16 * 1024 * 1024)
///     .with_gc_threshold(512 * 1024);
/// assert!(limits.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineLimits {
    pub memory_limit_bytes: usize,
    pub gc_threshold_bytes: usize,
}

impl Default for EngineLimits {
    fn default() -> Self {
        Self {
            memory_limit_bytes: DEFAULT_MEMORY_LIMIT,
            gc_threshold_bytes: DEFAULT_GC_THRESHOLD,
        }
    }
}

impl EngineLimits {
    /// Creates limits with the default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the allocation ceiling.
    pub fn with_memory_limit(mut self, bytes: usize) -> Self {
        self.memory_limit_bytes = bytes;
        self
    }

    /// Sets the GC trigger threshold.
    pub fn with_gc_threshold(mut self, bytes: usize) -> Self {
        self.gc_threshold_bytes = bytes;
        self
    }

    /// Applies `JSBRIDGE_MEMORY_LIMIT` / `JSBRIDGE_GC_THRESHOLD` when set.
    ///
    /// Values are byte counts, optionally suffixed with `k`, `m` or `g`.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::InvalidConfig` if a variable is set but unparseable.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(
            std::env::var(MEMORY_LIMIT_ENV).ok().as_deref(),
            std::env::var(GC_THRESHOLD_ENV).ok().as_deref(),
        )
    }

    fn with_overrides(mut self, memory_limit: Option<&str>, gc_threshold: Option<&str>) -> Result<Self> {
        if let Some(raw) = memory_limit {
            self.memory_limit_bytes = parse_byte_size(raw).map_err(|e| {
                BridgeError::InvalidConfig(format!("{}: {}", MEMORY_LIMIT_ENV, e))
            })?;
        }
        if let Some(raw) = gc_threshold {
            self.gc_threshold_bytes = parse_byte_size(raw).map_err(|e| {
                BridgeError::InvalidConfig(format!("{}: {}", GC_THRESHOLD_ENV, e))
            })?;
        }
        Ok(self)
    }

    /// Validates the limits.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Either value is zero
    /// - The GC threshold is larger than the memory limit
    pub fn validate(&self) -> Result<()> {
        if self.memory_limit_bytes == 0 {
            return Err(BridgeError::InvalidConfig(
                "memory limit must be greater than zero".to_string(),
            ));
        }

        if self.gc_threshold_bytes == 0 {
            return Err(BridgeError::InvalidConfig(
                "GC threshold must be greater than zero".to_string(),
            ));
        }

        if self.gc_threshold_bytes > self.memory_limit_bytes {
            return Err(BridgeError::InvalidConfig(format!(
                "GC threshold ({} bytes) must not exceed the memory limit ({} bytes)",
                self.gc_threshold_bytes, self.memory_limit_bytes
            )));
        }

        Ok(())
    }
}

/// Parses `"65536"`, `"64k"`, `"64m"` or `"1g"` into a byte count.
pub fn parse_byte_size(raw: &str) -> std::result::Result<usize, String> {
    let trimmed = raw.trim();
    let lower = trimmed.to_ascii_lowercase();
    let (digits, multiplier) = match lower.chars().last() {
        Some('k') => (&lower[..lower.len() - 1], 1024),
        Some('m') => (&lower[..lower.len() - 1], 1024 * 1024),
        Some('g') => (&lower[..lower.len() - 1], 1024 * 1024 * 1024),
        _ => (lower.as_str(), 1),
    };

    let value: usize = digits
        .trim()
        .parse()
        .map_err(|_| format!("invalid byte size '{}'", trimmed))?;

    value
        .checked_mul(multiplier)
        .ok_or_else(|| format!("byte size '{}' is too large", trimmed))
}
