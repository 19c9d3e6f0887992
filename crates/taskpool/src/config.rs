use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::TaskPoolError;

// ── Defaults ─────────────────────────────────────────────────────────

fn default_workers() -> usize {
    2
}

fn default_queue_capacity() -> usize {
    32
}

fn default_push_timeout_ms() -> u64 {
    50
}

// ── PoolConfig ───────────────────────────────────────────────────────

/// Configuration for a [`TaskPool`](crate::pool::TaskPool).
///
/// Parsed from TOML with per-field defaults, so a partial config file (or
/// an empty one) yields a usable pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Number of long-lived worker tasks popping the dispatch queue.
    /// Fixed at pool creation; bounds the number of concurrently running
    /// job callbacks.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Bounded capacity of the dispatch queue. A full queue makes
    /// immediate scheduling fail rather than backlog without limit.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Upper bound in milliseconds on the admission wait when pushing to
    /// a momentarily full queue.
    #[serde(default = "default_push_timeout_ms")]
    pub push_timeout_ms: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            queue_capacity: default_queue_capacity(),
            push_timeout_ms: default_push_timeout_ms(),
        }
    }
}

impl PoolConfig {
    /// Create a config with the given worker count and queue capacity,
    /// keeping the default push timeout.
    pub fn new(workers: usize, queue_capacity: usize) -> Self {
        Self {
            workers,
            queue_capacity,
            push_timeout_ms: default_push_timeout_ms(),
        }
    }

    /// Parse a config from a TOML string and validate it.
    pub fn from_toml(toml_str: &str) -> Result<Self, TaskPoolError> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a file path.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TaskPoolError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&content)
    }

    /// Check the config for values the pool cannot operate with.
    pub fn validate(&self) -> Result<(), TaskPoolError> {
        if self.workers == 0 {
            return Err(TaskPoolError::Config(
                "worker count must be at least 1".into(),
            ));
        }
        if self.queue_capacity == 0 {
            return Err(TaskPoolError::Config(
                "queue capacity must be at least 1".into(),
            ));
        }
        if self.push_timeout_ms == 0 {
            return Err(TaskPoolError::Config(
                "push timeout must be at least 1 ms".into(),
            ));
        }
        Ok(())
    }

    /// The admission wait as a [`Duration`].
    pub fn push_timeout(&self) -> Duration {
        Duration::from_millis(self.push_timeout_ms)
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let cfg = PoolConfig::default();
        assert_eq!(cfg.workers, 2);
        assert_eq!(cfg.queue_capacity, 32);
        assert_eq!(cfg.push_timeout_ms, 50);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn empty_toml_uses_defaults() {
        let cfg = PoolConfig::from_toml("").unwrap();
        assert_eq!(cfg.workers, 2);
        assert_eq!(cfg.queue_capacity, 32);
    }

    #[test]
    fn partial_toml_fills_missing_fields() {
        let cfg = PoolConfig::from_toml("workers = 8").unwrap();
        assert_eq!(cfg.workers, 8);
        assert_eq!(cfg.queue_capacity, 32, "unset fields fall back to defaults");
    }

    #[test]
    fn full_toml_round_trip() {
        let cfg = PoolConfig::from_toml(
            "workers = 4\nqueue_capacity = 128\npush_timeout_ms = 10",
        )
        .unwrap();
        assert_eq!(cfg.workers, 4);
        assert_eq!(cfg.queue_capacity, 128);
        assert_eq!(cfg.push_timeout(), Duration::from_millis(10));
    }

    #[test]
    fn zero_workers_rejected() {
        let err = PoolConfig::from_toml("workers = 0").unwrap_err();
        assert!(matches!(err, TaskPoolError::Config(_)));
    }

    #[test]
    fn zero_queue_capacity_rejected() {
        let cfg = PoolConfig {
            queue_capacity: 0,
            ..PoolConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn zero_push_timeout_rejected() {
        let cfg = PoolConfig {
            push_timeout_ms: 0,
            ..PoolConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = PoolConfig::from_toml("workers = \"many\"").unwrap_err();
        assert!(matches!(err, TaskPoolError::ConfigParse(_)));
    }
}
