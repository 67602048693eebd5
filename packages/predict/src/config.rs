//! Artifact locations.
//!
//! Settings come from a TOML file and may be overridden per artifact by
//! environment variables:
//!
//! ```toml
//! [artifacts]
//! regression_model = "data/models/regression_model.json"
//! classification_model = "data/models/classification_model.json"
//! label_encoders = "data/models/label_encoders.json"
//! ```
//!
//! The file is `--config` if given, else `$WATERBORNE_CONFIG`, else
//! `waterborne.toml` in the working directory if it exists. Without any
//! file the defaults above apply. Relative paths inside a file resolve
//! against the file's directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Config file looked for in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "waterborne.toml";
/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "WATERBORNE_CONFIG";
/// Overrides [`ArtifactPaths::regression_model`].
pub const REGRESSION_MODEL_ENV: &str = "WATERBORNE_REGRESSION_MODEL";
/// Overrides [`ArtifactPaths::classification_model`].
pub const CLASSIFICATION_MODEL_ENV: &str = "WATERBORNE_CLASSIFICATION_MODEL";
/// Overrides [`ArtifactPaths::label_encoders`].
pub const LABEL_ENCODERS_ENV: &str = "WATERBORNE_LABEL_ENCODERS";

/// Errors that can occur while reading the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read config {}: {source}", path.display())]
    Io {
        /// Path of the config file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The config file is not valid TOML or has unknown keys.
    #[error("Invalid config {}: {source}", path.display())]
    Toml {
        /// Path of the config file.
        path: PathBuf,
        /// Underlying parse error.
        source: toml::de::Error,
    },
}

/// Where the three model artifacts live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArtifactPaths {
    /// Gradient-boosted case-count model.
    pub regression_model: PathBuf,
    /// Risk-level classifier.
    pub classification_model: PathBuf,
    /// Label encoders for the categorical inputs and the risk level.
    pub label_encoders: PathBuf,
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self {
            regression_model: PathBuf::from("data/models/regression_model.json"),
            classification_model: PathBuf::from("data/models/classification_model.json"),
            label_encoders: PathBuf::from("data/models/label_encoders.json"),
        }
    }
}

/// Predictor configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PredictorConfig {
    pub artifacts: ArtifactPaths,
}

impl PredictorConfig {
    /// Parses a config from TOML. Relative artifact paths are joined onto
    /// `base_dir` when one is given.
    ///
    /// # Errors
    ///
    /// Returns the TOML error if the text is invalid or has unknown keys.
    pub fn from_toml(text: &str, base_dir: Option<&Path>) -> Result<Self, toml::de::Error> {
        let mut config: Self = toml::from_str(text)?;
        if let Some(base) = base_dir {
            config.artifacts.resolve_against(base);
        }
        Ok(config)
    }

    /// Reads a config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let base = path.parent().filter(|dir| !dir.as_os_str().is_empty());
        Self::from_toml(&text, base).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Replaces artifact paths with any overrides `lookup` returns for the
    /// `WATERBORNE_*` variables. Empty values are ignored.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let overrides = [
            (REGRESSION_MODEL_ENV, &mut self.artifacts.regression_model),
            (
                CLASSIFICATION_MODEL_ENV,
                &mut self.artifacts.classification_model,
            ),
            (LABEL_ENCODERS_ENV, &mut self.artifacts.label_encoders),
        ];
        for (var, slot) in overrides {
            if let Some(value) = lookup(var).filter(|v| !v.trim().is_empty()) {
                log::debug!("{var} overrides artifact path with {value}");
                *slot = PathBuf::from(value);
            }
        }
    }

    /// Loads the configuration from the process environment and file
    /// system.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a config file was selected but cannot be
    /// read or parsed.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with(
            explicit,
            |var| std::env::var(var).ok(),
            |path| path.is_file(),
        )
    }

    /// [`Self::load`] with the environment and file-existence checks
    /// supplied by the caller.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a config file was selected but cannot be
    /// read or parsed.
    pub fn load_with(
        explicit: Option<&Path>,
        lookup: impl Fn(&str) -> Option<String>,
        exists: impl Fn(&Path) -> bool,
    ) -> Result<Self, ConfigError> {
        let mut config = match config_path(explicit, &lookup, exists) {
            Some(path) => {
                log::info!("Using config {}", path.display());
                Self::from_file(&path)?
            }
            None => {
                log::debug!("No config file found, using default artifact paths");
                Self::default()
            }
        };
        config.apply_env_overrides(lookup);
        Ok(config)
    }
}

impl ArtifactPaths {
    fn resolve_against(&mut self, base: &Path) {
        for path in [
            &mut self.regression_model,
            &mut self.classification_model,
            &mut self.label_encoders,
        ] {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}

/// Picks the config file: explicit path, then [`CONFIG_ENV`], then
/// [`DEFAULT_CONFIG_FILE`] if it exists.
fn config_path(
    explicit: Option<&Path>,
    lookup: &impl Fn(&str) -> Option<String>,
    exists: impl Fn(&Path) -> bool,
) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Some(path) = lookup(CONFIG_ENV).filter(|v| !v.trim().is_empty()) {
        return Some(PathBuf::from(path));
    }
    let fallback = Path::new(DEFAULT_CONFIG_FILE);
    exists(fallback).then(|| fallback.to_path_buf())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: BTreeMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_toml_gives_defaults() {
        let config = PredictorConfig::from_toml("", None).unwrap();
        assert_eq!(config, PredictorConfig::default());
        assert_eq!(
            config.artifacts.label_encoders,
            PathBuf::from("data/models/label_encoders.json")
        );
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config = PredictorConfig::from_toml(
            "[artifacts]\nregression_model = \"models/xgb.json\"\n",
            None,
        )
        .unwrap();
        assert_eq!(
            config.artifacts.regression_model,
            PathBuf::from("models/xgb.json")
        );
        assert_eq!(
            config.artifacts.classification_model,
            ArtifactPaths::default().classification_model
        );
    }

    #[test]
    fn relative_paths_resolve_against_config_dir() {
        let config = PredictorConfig::from_toml(
            "[artifacts]\nregression_model = \"models/xgb.json\"\nlabel_encoders = \"/srv/encoders.json\"\n",
            Some(Path::new("/etc/waterborne")),
        )
        .unwrap();
        assert_eq!(
            config.artifacts.regression_model,
            PathBuf::from("/etc/waterborne/models/xgb.json")
        );
        assert_eq!(
            config.artifacts.label_encoders,
            PathBuf::from("/srv/encoders.json")
        );
        assert_eq!(
            config.artifacts.classification_model,
            PathBuf::from("/etc/waterborne/data/models/classification_model.json")
        );
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(
            PredictorConfig::from_toml("[artifacts]\nregresion_model = \"x\"\n", None).is_err()
        );
        assert!(PredictorConfig::from_toml("[server]\nport = 3000\n", None).is_err());
    }

    #[test]
    fn env_overrides_take_precedence() {
        let mut config = PredictorConfig::from_toml(
            "[artifacts]\nclassification_model = \"from_file.json\"\n",
            None,
        )
        .unwrap();
        config.apply_env_overrides(env(&[
            (CLASSIFICATION_MODEL_ENV, "/tmp/rf.json"),
            (LABEL_ENCODERS_ENV, "  "),
        ]));
        assert_eq!(
            config.artifacts.classification_model,
            PathBuf::from("/tmp/rf.json")
        );
        assert_eq!(
            config.artifacts.label_encoders,
            ArtifactPaths::default().label_encoders
        );
    }

    #[test]
    fn config_path_precedence() {
        let lookup = env(&[(CONFIG_ENV, "/from/env.toml")]);
        assert_eq!(
            config_path(Some(Path::new("cli.toml")), &lookup, |_| true),
            Some(PathBuf::from("cli.toml"))
        );
        assert_eq!(
            config_path(None, &lookup, |_| true),
            Some(PathBuf::from("/from/env.toml"))
        );

        let no_env = env(&[]);
        assert_eq!(
            config_path(None, &no_env, |_| true),
            Some(PathBuf::from(DEFAULT_CONFIG_FILE))
        );
        assert_eq!(config_path(None, &no_env, |_| false), None);
    }

    #[test]
    fn load_without_file_uses_defaults_and_env() {
        let config = PredictorConfig::load_with(
            None,
            env(&[(REGRESSION_MODEL_ENV, "override.json")]),
            |_| false,
        )
        .unwrap();
        assert_eq!(
            config.artifacts.regression_model,
            PathBuf::from("override.json")
        );
        assert_eq!(
            config.artifacts.label_encoders,
            ArtifactPaths::default().label_encoders
        );
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = PredictorConfig::load_with(
            Some(Path::new("does/not/exist.toml")),
            env(&[]),
            |_| false,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }), "unexpected: {err}");
    }
}
