//! Run configuration for the evaluation tool
//!
//! Defaults can be overridden from the environment; CLI flags override both.

use std::path::PathBuf;

use bitsim_core::Radix;

/// Directory scanned for judgment datasets when nothing else is given
pub const DEFAULT_DATASETS_DIR: &str = "datasets/";

/// Judgments read per dataset file
pub const DEFAULT_MAX_LINES: usize = 3500;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalConfig {
    pub datasets_dir: PathBuf,
    pub max_lines: usize,
    pub radix: Radix,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            datasets_dir: PathBuf::from(DEFAULT_DATASETS_DIR),
            max_lines: DEFAULT_MAX_LINES,
            radix: Radix::Decimal,
        }
    }
}

impl EvalConfig {
    /// Defaults overridden by `BITSIM_DATASETS_DIR` and `BITSIM_MAX_LINES`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(dir) = lookup("BITSIM_DATASETS_DIR").filter(|d| !d.is_empty()) {
            config.datasets_dir = PathBuf::from(dir);
        }
        if let Some(raw) = lookup("BITSIM_MAX_LINES") {
            match raw.parse() {
                Ok(n) => config.max_lines = n,
                Err(_) => tracing::warn!(
                    "Ignoring BITSIM_MAX_LINES={:?}, using {}",
                    raw,
                    config.max_lines
                ),
            }
        }
        config
    }

    /// Apply explicit CLI values on top of this configuration
    pub fn with_overrides(
        mut self,
        datasets_dir: Option<PathBuf>,
        max_lines: Option<usize>,
        radix: Option<Radix>,
    ) -> Self {
        if let Some(dir) = datasets_dir {
            self.datasets_dir = dir;
        }
        if let Some(n) = max_lines {
            self.max_lines = n;
        }
        if let Some(r) = radix {
            self.radix = r;
        }
        self
    }
}
