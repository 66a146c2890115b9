//! Runtime configuration for the climgroup command-line tool.

use std::{
    env,
    path::{Path, PathBuf},
};

use serde::Deserialize;

/// Settings resolved from `.env`, the environment and defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// `chrono` format of the date column in input CSV files.
    pub date_format: String,
    /// Dimension name given to the value columns of multi-column inputs.
    pub extra_dim: String,
    /// Group used when a command does not pass `--group`.
    pub default_group: String,
    /// Root folder for relative `--output` paths.
    pub outputs_dir: PathBuf,
    /// Default tracing directive when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Settings {
    /// Load configuration from environment with reasonable defaults.
    pub fn load() -> Self {
        dotenvy::dotenv().ok();
        Self {
            date_format: env_or("CLIMGROUP_DATE_FORMAT", "%Y-%m-%d"),
            extra_dim: env_or("CLIMGROUP_EXTRA_DIM", "site"),
            default_group: env_or("CLIMGROUP_DEFAULT_GROUP", "time"),
            outputs_dir: env::var("CLIMGROUP_OUTPUTS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./outputs")),
            log_level: env_or("CLIMGROUP_LOG", "info"),
        }
    }

    /// Resolve an output path: absolute paths are kept, relative ones land
    /// under `outputs_dir`.
    pub fn join_output<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        self.outputs_dir.join(path)
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
