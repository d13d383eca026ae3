use super::types::LogLevel;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// The `[logging]` table.
///
/// ```toml
/// [logging]
/// level = "info"
/// json = false
/// file = "/var/log/sealcred.log"
///
/// [logging.targets]
/// sealcred_ledger = "debug"
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    /// Append here instead of writing to stderr.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    /// One JSON object per event.
    pub json: bool,
    /// Per-target levels layered over `level`.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub targets: BTreeMap<String, LogLevel>,
}

impl LoggingConfig {
    /// `EnvFilter` directive for the given CLI flags. `--quiet` wins over
    /// `-v`, and any `-v` replaces the configured levels.
    pub fn directive(&self, quiet: bool, verbose: u8) -> String {
        if quiet {
            return LogLevel::Warn.as_filter().to_string();
        }
        match verbose {
            0 => {
                let mut directive = self.level.as_filter().to_string();
                for (target, level) in &self.targets {
                    directive.push_str(&format!(",{}={}", target, level));
                }
                directive
            }
            1 => "info,sealcred_ledger=debug,sealcred_node=debug".to_string(),
            2 => "debug".to_string(),
            _ => "trace".to_string(),
        }
    }

    /// Where events go: the CLI's `--log-file`, else the configured file,
    /// else stderr (`None`).
    pub fn destination<'a>(&'a self, cli_file: Option<&'a Path>) -> Option<&'a Path> {
        cli_file.or(self.file.as_deref())
    }

    /// `SEALCRED_LOG_LEVEL` and `SEALCRED_LOG_JSON`.
    pub(super) fn apply_env_overrides(&mut self) {
        if let Ok(level) = std::env::var("SEALCRED_LOG_LEVEL") {
            self.level = level.parse().unwrap_or_default();
        }
        if std::env::var("SEALCRED_LOG_JSON").is_ok() {
            self.json = true;
        }
    }
}
