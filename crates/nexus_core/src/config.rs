//! Process configuration resolved from the environment.
//!
//! # Invariants
//! - Blank environment values count as unset.
//! - The process-wide config is resolved once and never changes afterwards.

use crate::db::DB_FILE_NAME;
use crate::logging::default_log_level;
use once_cell::sync::OnceCell;
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "NEXUS_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "NEXUS_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "NEXUS_LOG_DIR";

static CORE_CONFIG: OnceCell<CoreConfig> = OnceCell::new();

/// Settings needed to bring the core up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// Store file location.
    pub db_path: PathBuf,
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Rolling log directory; logging stays off when `None`.
    pub log_dir: Option<PathBuf>,
}

impl CoreConfig {
    /// Builds a config from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |name: &str| {
            lookup(name)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Self {
            db_path: read(DB_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| std::env::temp_dir().join(DB_FILE_NAME)),
            log_level: read(LOG_LEVEL_ENV).unwrap_or_else(|| default_log_level().to_string()),
            log_dir: read(LOG_DIR_ENV).map(PathBuf::from),
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }
}

/// Returns the process-wide config, reading the environment on first use.
pub fn core_config() -> &'static CoreConfig {
    CORE_CONFIG.get_or_init(CoreConfig::from_env)
}

#[cfg(test)]
mod tests {
    use super::{CoreConfig, DB_PATH_ENV, LOG_DIR_ENV, LOG_LEVEL_ENV};
    use crate::db::DB_FILE_NAME;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn config_from(pairs: &[(&str, &str)]) -> CoreConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        CoreConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = config_from(&[]);
        assert_eq!(config.db_path, std::env::temp_dir().join(DB_FILE_NAME));
        assert_eq!(config.log_level, crate::logging::default_log_level());
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn explicit_values_are_trimmed() {
        let config = config_from(&[
            (DB_PATH_ENV, " /var/lib/nexus/hub.sqlite3 "),
            (LOG_LEVEL_ENV, "warn"),
            (LOG_DIR_ENV, "/var/log/nexus"),
        ]);
        assert_eq!(config.db_path, PathBuf::from("/var/lib/nexus/hub.sqlite3"));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/nexus")));
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = config_from(&[(DB_PATH_ENV, "   "), (LOG_DIR_ENV, "")]);
        assert_eq!(config.db_path, std::env::temp_dir().join(DB_FILE_NAME));
        assert_eq!(config.log_dir, None);
    }
}
