//! Configuration file loader with multi-source merging

use super::file_config::{ConfigError, FileConfig};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

/// Project-level file names, checked in order.
const PROJECT_FILES: [&str; 2] = ["pmcro.toml", ".pmcro.toml"];

/// Prefix for environment overrides, e.g. `PMCRO_ORACLE__MODEL=qwen2.5`.
const ENV_PREFIX: &str = "PMCRO_";

/// Where a configuration layer comes from, for `--show-config`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSource {
    pub label: &'static str,
    pub location: String,
    pub found: bool,
}

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate configuration from all sources.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment: `PMCRO_<SECTION>__<KEY>`
    /// 2. Explicit config path (if provided; must exist)
    /// 3. Project root: `./pmcro.toml` or `./.pmcro.toml`
    /// 4. Global: `$XDG_CONFIG_HOME/pmcro/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&Path>) -> Result<FileConfig, ConfigError> {
        if let Some(path) = config_path
            && !path.exists()
        {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let figment = Self::figment(
            Self::global_config_path().as_deref(),
            Self::project_config_path().as_deref(),
            config_path,
        );
        Self::extract(figment)
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// Assemble the layered provider chain from explicit file locations.
    pub fn figment(global: Option<&Path>, project: Option<&Path>, explicit: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        for path in [global, project, explicit].into_iter().flatten() {
            if path.exists() {
                figment = figment.merge(Toml::file(path));
            }
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Extract and validate.
    pub fn extract(figment: Figment) -> Result<FileConfig, ConfigError> {
        let config: FileConfig = figment.extract().map_err(Box::new)?;
        config.validate()?;
        Ok(config)
    }

    /// `$XDG_CONFIG_HOME/pmcro/config.toml`, or the platform equivalent.
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("pmcro").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        Self::project_config_in(Path::new("."))
    }

    fn project_config_in(dir: &Path) -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists())
    }

    /// The configuration layers in priority order, highest first.
    pub fn config_sources(config_path: Option<&Path>) -> Vec<ConfigSource> {
        let mut sources = vec![ConfigSource {
            label: "Env",
            location: format!("{}<SECTION>__<KEY>", ENV_PREFIX),
            found: std::env::vars().any(|(key, _)| key.starts_with(ENV_PREFIX)),
        }];

        if let Some(path) = config_path {
            sources.push(ConfigSource {
                label: "Explicit",
                location: path.display().to_string(),
                found: path.exists(),
            });
        }

        sources.push(match Self::project_config_path() {
            Some(path) => ConfigSource {
                label: "Project",
                location: path.display().to_string(),
                found: true,
            },
            None => ConfigSource {
                label: "Project",
                location: "./pmcro.toml or ./.pmcro.toml".to_string(),
                found: false,
            },
        });

        if let Some(path) = Self::global_config_path() {
            sources.push(ConfigSource {
                label: "Global",
                location: path.display().to_string(),
                found: path.exists(),
            });
        }

        sources.push(ConfigSource {
            label: "Default",
            location: "built-in defaults".to_string(),
            found: true,
        });
        sources
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DispatcherMode;

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert_eq!(config, FileConfig::default());
    }

    #[test]
    fn test_global_config_path_returns_some() {
        let path = ConfigLoader::global_config_path().unwrap();
        assert!(path.to_string_lossy().contains("pmcro"));
        assert!(path.ends_with("config.toml"));
    }

    #[test]
    fn test_layers_override_in_priority_order() {
        let dir = tempfile::tempdir().unwrap();
        let global = write(
            dir.path(),
            "global.toml",
            "[oracle]\nmodel = \"global-model\"\nplanning_timeout_secs = 11\n",
        );
        let project = write(dir.path(), "pmcro.toml", "[oracle]\nmodel = \"project-model\"\n");
        let explicit = write(
            dir.path(),
            "explicit.toml",
            "[dispatcher]\ncall_timeout_secs = 7\n",
        );

        let config = ConfigLoader::extract(ConfigLoader::figment(
            Some(&global),
            Some(&project),
            Some(&explicit),
        ))
        .unwrap();

        assert_eq!(config.oracle.model, "project-model");
        assert_eq!(config.oracle.planning_timeout_secs, 11);
        assert_eq!(config.dispatcher.call_timeout_secs, 7);
        assert_eq!(config.oracle.validation_timeout_secs, 300);
    }

    #[test]
    fn test_missing_layers_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let absent = dir.path().join("absent.toml");
        let config =
            ConfigLoader::extract(ConfigLoader::figment(Some(&absent), None, None)).unwrap();
        assert_eq!(config.dispatcher.mode, DispatcherMode::Local);
    }

    #[test]
    fn test_extract_validates() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "bad.toml", "[dispatcher]\nmode = \"remote\"\n");
        let err = ConfigLoader::extract(ConfigLoader::figment(None, None, Some(&path))).unwrap_err();
        assert!(matches!(err, ConfigError::MissingRemoteUrl));
    }

    #[test]
    fn test_malformed_file_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "broken.toml", "[oracle\nmodel = ");
        let err = ConfigLoader::extract(ConfigLoader::figment(None, None, Some(&path))).unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
    }

    #[test]
    fn test_explicit_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = ConfigLoader::load(Some(&missing)).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_project_config_prefers_plain_name() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ConfigLoader::project_config_in(dir.path()).is_none());

        write(dir.path(), ".pmcro.toml", "");
        let found = ConfigLoader::project_config_in(dir.path()).unwrap();
        assert!(found.ends_with(".pmcro.toml"));

        write(dir.path(), "pmcro.toml", "");
        let found = ConfigLoader::project_config_in(dir.path()).unwrap();
        assert!(found.ends_with("pmcro.toml"));
        assert!(!found.ends_with(".pmcro.toml"));
    }

    #[test]
    fn test_config_sources_ordering() {
        let dir = tempfile::tempdir().unwrap();
        let explicit = write(dir.path(), "explicit.toml", "");
        let sources = ConfigLoader::config_sources(Some(&explicit));

        assert_eq!(sources[0].label, "Env");
        assert_eq!(sources[1].label, "Explicit");
        assert!(sources[1].found);
        assert_eq!(sources.last().unwrap().label, "Default");
    }
}
