//! Configuration loading for Stepwise.
//!
//! Configuration follows a precedence chain:
//! 1. Environment variables (highest priority)
//! 2. Project config (`.stepwise/config.toml`)
//! 3. User config (`~/.stepwise/config.toml`)
//! 4. Defaults (lowest priority)
//!
//! All configuration is optional. The engine runs with the built-in
//! curriculum and default settings when no config exists.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::core::unlock::DEFAULT_GATING_LEVEL;
use crate::error::{FailOpen, Result, StepwiseError};
use crate::util::read_to_string_limited;

/// Main configuration struct for Stepwise.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Progress persistence configuration.
    pub storage: StorageConfig,
    /// Code validation configuration.
    pub validation: ValidationConfig,
    /// Track gating configuration.
    pub tracks: TrackConfig,
    /// Content catalog configuration.
    pub content: ContentConfig,
}

/// Progress persistence configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// Name of the persisted progress record.
    pub record_name: String,
}

impl StorageConfig {
    /// Record names are plain file names.
    pub fn is_valid_record_name(value: &str) -> bool {
        !value.trim().is_empty() && !value.starts_with('.') && !value.contains(['/', '\\'])
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            record_name: "progress".to_string(),
        }
    }
}

/// Code validation configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ValidationConfig {
    /// Simulated execution delay before a submission is checked.
    pub delay_ms: u64,
}

/// Longest accepted simulated delay (one minute).
pub const MAX_DELAY_MS: u64 = 60_000;

impl ValidationConfig {
    pub fn is_valid_delay_ms(value: u64) -> bool {
        value <= MAX_DELAY_MS
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self { delay_ms: 1500 }
    }
}

/// Track gating configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrackConfig {
    /// Primary-track level number whose completion opens the other tracks.
    pub gating_level: u32,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            gating_level: DEFAULT_GATING_LEVEL,
        }
    }
}

/// Content catalog configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ContentConfig {
    /// JSON catalog replacing the built-in curriculum.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration with full precedence chain.
    ///
    /// Precedence (highest to lowest):
    /// 1. Environment variables
    /// 2. Project config (`.stepwise/config.toml` in cwd or an ancestor)
    /// 3. User config (`~/.stepwise/config.toml`)
    /// 4. Defaults
    pub fn load() -> Self {
        match env::current_dir() {
            Ok(cwd) => Self::load_from_cwd(&cwd),
            Err(_) => {
                let mut config = Config::default();
                if let Some(user_config) = Self::load_user_config() {
                    config = config.merge(user_config);
                }
                config.apply_env_overrides();
                config
            }
        }
    }

    /// Load configuration with a specific working directory.
    pub fn load_from_cwd(cwd: &Path) -> Self {
        let mut config = Config::default();

        if let Some(user_config) = Self::load_user_config() {
            config = config.merge(user_config);
        }

        if let Some(project_config) = Self::load_project_config(cwd) {
            config = config.merge(project_config);
        }

        config.apply_env_overrides();

        config
    }

    /// Load user config from `~/.stepwise/config.toml`.
    fn load_user_config() -> Option<Config> {
        let home = stepwise_home()?;
        Self::load_optional(&home.join("config.toml"))
    }

    /// Load project config from the nearest `.stepwise/config.toml`.
    fn load_project_config(cwd: &Path) -> Option<Config> {
        let config_path = project_stepwise_dir(cwd).join("config.toml");
        Self::load_optional(&config_path)
    }

    /// Missing files are silent; broken ones are reported and skipped.
    fn load_optional(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        match Self::load_from_file(path) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring config file");
                None
            }
        }
    }

    /// Load config from a specific file path.
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let content = read_to_string_limited(path)?;
        toml::from_str(&content).map_err(|e| StepwiseError::config(e.to_string()))
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        // STEPWISE_RECORD_NAME
        if let Ok(val) = env::var("STEPWISE_RECORD_NAME") {
            if StorageConfig::is_valid_record_name(&val) {
                self.storage.record_name = val;
            } else {
                eprintln!(
                    "Warning: Invalid STEPWISE_RECORD_NAME value '{}'. \
                    Expected a plain file name. Using '{}'.",
                    val, self.storage.record_name
                );
            }
        }

        // STEPWISE_VALIDATION_DELAY_MS
        if let Ok(val) = env::var("STEPWISE_VALIDATION_DELAY_MS") {
            match val.parse::<u64>() {
                Ok(n) if ValidationConfig::is_valid_delay_ms(n) => {
                    self.validation.delay_ms = n;
                }
                Ok(n) => eprintln!(
                    "Warning: Invalid STEPWISE_VALIDATION_DELAY_MS value '{}'. \
                    Must be <= {}. Using '{}'.",
                    n, MAX_DELAY_MS, self.validation.delay_ms
                ),
                Err(_) => eprintln!(
                    "Warning: Invalid STEPWISE_VALIDATION_DELAY_MS value '{}'. \
                    Expected a non-negative integer. Using '{}'.",
                    val, self.validation.delay_ms
                ),
            }
        }

        // STEPWISE_GATING_LEVEL
        if let Ok(val) = env::var("STEPWISE_GATING_LEVEL") {
            match val.parse::<u32>() {
                Ok(n) => self.tracks.gating_level = n,
                Err(_) => eprintln!(
                    "Warning: Invalid STEPWISE_GATING_LEVEL value '{}'. \
                    Expected a non-negative integer. Using '{}'.",
                    val, self.tracks.gating_level
                ),
            }
        }

        // STEPWISE_CONTENT_PATH
        if let Ok(val) = env::var("STEPWISE_CONTENT_PATH") {
            if val.trim().is_empty() {
                eprintln!("Warning: STEPWISE_CONTENT_PATH is empty. Ignoring.");
            } else {
                self.content.path = Some(PathBuf::from(val));
            }
        }
    }

    /// Merge another config into this one (other takes precedence).
    ///
    /// Fields are merged individually: a value from `other` wins only when
    /// it differs from the default. A higher layer that explicitly sets a
    /// default value therefore cannot undo a lower layer's customization.
    fn merge(mut self, other: Config) -> Self {
        let default_storage = StorageConfig::default();
        if other.storage.record_name != default_storage.record_name {
            self.storage.record_name = other.storage.record_name;
        }

        let default_validation = ValidationConfig::default();
        if other.validation.delay_ms != default_validation.delay_ms {
            self.validation.delay_ms = other.validation.delay_ms;
        }

        let default_tracks = TrackConfig::default();
        if other.tracks.gating_level != default_tracks.gating_level {
            self.tracks.gating_level = other.tracks.gating_level;
        }

        if other.content.path.is_some() {
            self.content.path = other.content.path;
        }

        self
    }

    /// Check values that cannot be fixed by falling back to defaults.
    pub fn validate(&self) -> Result<()> {
        if !StorageConfig::is_valid_record_name(&self.storage.record_name) {
            return Err(StepwiseError::config(format!(
                "storage.record_name '{}' must be a plain file name",
                self.storage.record_name
            )));
        }
        if !ValidationConfig::is_valid_delay_ms(self.validation.delay_ms) {
            return Err(StepwiseError::config(format!(
                "validation.delay_ms {} exceeds {}",
                self.validation.delay_ms, MAX_DELAY_MS
            )));
        }
        Ok(())
    }

    /// Load config with fail-open behavior.
    ///
    /// Invalid merged values are replaced by defaults.
    pub fn load_fail_open() -> Self {
        let config = Self::load();
        config
            .validate()
            .map(|()| config)
            .fail_open_default("validating config")
    }
}

/// Get the Stepwise home directory.
///
/// Checks `STEPWISE_HOME` environment variable first, then falls back to
/// `~/.stepwise`.
///
/// An empty `STEPWISE_HOME` is ignored.
pub fn stepwise_home() -> Option<PathBuf> {
    if let Ok(home) = env::var("STEPWISE_HOME") {
        if home.is_empty() {
            tracing::warn!("STEPWISE_HOME is empty, using default");
        } else {
            let path = PathBuf::from(&home);
            if path.is_absolute() {
                return Some(path);
            }
            if let Ok(canonical) = path.canonicalize() {
                return Some(canonical);
            }
            tracing::warn!("STEPWISE_HOME is relative and doesn't exist, using as-is");
            return Some(path);
        }
    }

    if let Some(home) = dirs::home_dir() {
        return Some(home.join(".stepwise"));
    }

    let fallback_path = fallback_stepwise_home();
    tracing::warn!(
        "HOME not set, using fallback location: {}",
        fallback_path.display()
    );
    Some(fallback_path)
}

/// Get fallback home path when HOME is unavailable.
#[cfg(unix)]
fn fallback_stepwise_home() -> PathBuf {
    use std::os::unix::fs::MetadataExt;
    let uid = std::fs::metadata("/").map(|m| m.uid()).unwrap_or(0);
    PathBuf::from(format!("/tmp/stepwise-{}", uid))
}

/// Get fallback home path when HOME is unavailable.
#[cfg(not(unix))]
fn fallback_stepwise_home() -> PathBuf {
    std::env::temp_dir().join("stepwise")
}

/// Find the project root for a given working directory.
///
/// The nearest ancestor (or `cwd` itself) holding a `.stepwise/` directory
/// wins. Without one, `cwd` is the project root.
pub fn find_project_root(cwd: &Path) -> PathBuf {
    cwd.ancestors()
        .find(|ancestor| ancestor.join(".stepwise").is_dir())
        .unwrap_or(cwd)
        .to_path_buf()
}

/// Get the project `.stepwise/` directory for a given working directory.
pub fn project_stepwise_dir(cwd: &Path) -> PathBuf {
    find_project_root(cwd).join(".stepwise")
}

/// Get the crash log path.
///
/// Returns `<stepwise_home>/crash.log`.
pub fn crash_log_path() -> Option<PathBuf> {
    stepwise_home().map(|h| h.join("crash.log"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    const ENV_VARS: [&str; 4] = [
        "STEPWISE_RECORD_NAME",
        "STEPWISE_VALIDATION_DELAY_MS",
        "STEPWISE_GATING_LEVEL",
        "STEPWISE_CONTENT_PATH",
    ];

    fn clear_env() {
        for var in ENV_VARS {
            env::remove_var(var);
        }
    }

    fn write_project_config(dir: &Path, toml_content: &str) {
        let stepwise_dir = dir.join(".stepwise");
        fs::create_dir_all(&stepwise_dir).unwrap();
        fs::write(stepwise_dir.join("config.toml"), toml_content).unwrap();
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.storage.record_name, "progress");
        assert_eq!(config.validation.delay_ms, 1500);
        assert_eq!(config.tracks.gating_level, 2);
        assert!(config.content.path.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.toml");

        let toml_content = r#"
[validation]
delay_ms = 0

[tracks]
gating_level = 1
"#;
        fs::write(&config_path, toml_content).unwrap();

        let config = Config::load_from_file(&config_path).unwrap();

        assert_eq!(config.validation.delay_ms, 0);
        assert_eq!(config.tracks.gating_level, 1);
        // Other fields should be defaults
        assert_eq!(config.storage.record_name, "progress");
    }

    #[test]
    fn test_load_from_file_missing() {
        let result = Config::load_from_file(Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_file_invalid_toml() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "this is not valid toml [[[").unwrap();

        let result = Config::load_from_file(&config_path);
        assert!(matches!(result, Err(StepwiseError::Config { .. })));
    }

    #[test]
    #[serial]
    fn test_project_config_precedence() {
        clear_env();
        let dir = TempDir::new().unwrap();
        write_project_config(dir.path(), "[storage]\nrecord_name = \"learner\"\n");

        let config = Config::load_from_cwd(dir.path());

        assert_eq!(config.storage.record_name, "learner");
        assert_eq!(config.validation.delay_ms, 1500);
    }

    #[test]
    #[serial]
    fn test_project_config_found_from_subdirectory() {
        clear_env();
        let dir = TempDir::new().unwrap();
        write_project_config(dir.path(), "[tracks]\ngating_level = 4\n");
        let nested = dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();

        let config = Config::load_from_cwd(&nested);
        assert_eq!(config.tracks.gating_level, 4);
    }

    #[test]
    #[serial]
    fn test_env_var_precedence() {
        clear_env();
        let dir = TempDir::new().unwrap();
        write_project_config(dir.path(), "[validation]\ndelay_ms = 200\n");

        env::set_var("STEPWISE_VALIDATION_DELAY_MS", "10");
        let config = Config::load_from_cwd(dir.path());

        // Env var takes precedence over project config
        assert_eq!(config.validation.delay_ms, 10);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_env_var_overrides() {
        clear_env();
        env::set_var("STEPWISE_RECORD_NAME", "other");
        env::set_var("STEPWISE_VALIDATION_DELAY_MS", "0");
        env::set_var("STEPWISE_GATING_LEVEL", "1");
        env::set_var("STEPWISE_CONTENT_PATH", "/tmp/catalog.json");

        let mut config = Config::default();
        config.apply_env_overrides();

        assert_eq!(config.storage.record_name, "other");
        assert_eq!(config.validation.delay_ms, 0);
        assert_eq!(config.tracks.gating_level, 1);
        assert_eq!(config.content.path, Some(PathBuf::from("/tmp/catalog.json")));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_env_var_invalid_values_ignored() {
        clear_env();
        env::set_var("STEPWISE_RECORD_NAME", "../escape");
        env::set_var("STEPWISE_VALIDATION_DELAY_MS", "soon");
        env::set_var("STEPWISE_GATING_LEVEL", "-1");
        env::set_var("STEPWISE_CONTENT_PATH", "  ");

        let mut config = Config::default();
        config.apply_env_overrides();

        assert_eq!(config, Config::default());

        clear_env();
    }

    #[test]
    #[serial]
    fn test_env_var_delay_above_limit_ignored() {
        clear_env();
        env::set_var("STEPWISE_VALIDATION_DELAY_MS", "600000");

        let mut config = Config::default();
        config.apply_env_overrides();
        assert_eq!(config.validation.delay_ms, 1500);

        clear_env();
    }

    #[test]
    fn test_merge_field_by_field_preserves_non_default_values() {
        let mut user = Config::default();
        user.validation.delay_ms = 0;
        user.content.path = Some(PathBuf::from("/user/catalog.json"));

        let mut project = Config::default();
        project.tracks.gating_level = 1;

        let merged = Config::default().merge(user).merge(project);

        assert_eq!(merged.validation.delay_ms, 0);
        assert_eq!(merged.tracks.gating_level, 1);
        assert_eq!(merged.content.path, Some(PathBuf::from("/user/catalog.json")));
        assert_eq!(merged.storage.record_name, "progress");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.storage.record_name = "a/b".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.validation.delay_ms = MAX_DELAY_MS + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_is_valid_record_name() {
        assert!(StorageConfig::is_valid_record_name("progress"));
        assert!(StorageConfig::is_valid_record_name("learner-2"));
        assert!(!StorageConfig::is_valid_record_name(""));
        assert!(!StorageConfig::is_valid_record_name(".hidden"));
        assert!(!StorageConfig::is_valid_record_name("a\\b"));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str("[content]\npath = \"cat.json\"\n").unwrap();

        assert_eq!(config.content.path, Some(PathBuf::from("cat.json")));
        assert_eq!(config.validation, ValidationConfig::default());
        assert_eq!(config.tracks, TrackConfig::default());
    }

    #[test]
    fn test_full_toml_roundtrip() {
        let mut config = Config::default();
        config.storage.record_name = "learner".to_string();
        config.validation.delay_ms = 250;
        config.tracks.gating_level = 3;
        config.content.path = Some(PathBuf::from("/content/catalog.json"));

        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    #[serial]
    fn test_stepwise_home_with_env() {
        env::set_var("STEPWISE_HOME", "/custom/stepwise");
        assert_eq!(stepwise_home(), Some(PathBuf::from("/custom/stepwise")));
        env::remove_var("STEPWISE_HOME");
    }

    #[test]
    #[serial]
    fn test_stepwise_home_empty_env() {
        env::set_var("STEPWISE_HOME", "");
        let home = stepwise_home().unwrap();
        assert!(home.ends_with(".stepwise") || home.to_string_lossy().contains("stepwise-"));
        env::remove_var("STEPWISE_HOME");
    }

    #[test]
    #[serial]
    fn test_crash_log_path() {
        env::set_var("STEPWISE_HOME", "/custom/stepwise");
        assert_eq!(
            crash_log_path(),
            Some(PathBuf::from("/custom/stepwise/crash.log"))
        );
        env::remove_var("STEPWISE_HOME");
    }

    #[test]
    #[serial]
    fn test_user_config_is_applied() {
        clear_env();
        let home = TempDir::new().unwrap();
        fs::write(
            home.path().join("config.toml"),
            "[validation]\ndelay_ms = 42\n",
        )
        .unwrap();
        env::set_var("STEPWISE_HOME", home.path());

        let cwd = TempDir::new().unwrap();
        let config = Config::load_from_cwd(cwd.path());
        assert_eq!(config.validation.delay_ms, 42);

        env::remove_var("STEPWISE_HOME");
    }

    #[test]
    fn test_find_project_root_fallback() {
        let dir = TempDir::new().unwrap();
        assert_eq!(find_project_root(dir.path()), dir.path().to_path_buf());
        assert_eq!(
            project_stepwise_dir(dir.path()),
            dir.path().join(".stepwise")
        );
    }
}
