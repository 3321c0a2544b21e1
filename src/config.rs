//! Controller configuration with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/guidetree/guidetree.toml`
//! 3. Local config: `<dir>/.guidetree.toml` (usually the working directory)
//! 4. Environment variables: `GUIDETREE_*` prefix
//!
//! Command-line flags are applied on top by the CLI layer.

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::expand_env_vars;

/// Unified configuration for the controller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Actions are drawn uniformly from `[0, action_space)`
    pub action_space: u32,
    /// Episodes per `run`
    pub episodes: usize,
    /// State dictionary file (state string → id)
    pub state_dict: PathBuf,
    /// Longest wait for a line of guided program output
    pub read_timeout_secs: u64,
    /// Explore/restore rounds per `explore`
    pub iterations: usize,
    /// Upper bound of random actions per exploration round
    pub explore_steps: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            action_space: 32,
            episodes: 100,
            state_dict: PathBuf::from("statedict.toml"),
            read_timeout_secs: 5,
            iterations: 100,
            explore_steps: 100,
        }
    }
}

/// Raw settings for intermediate parsing (`None` → not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub action_space: Option<u32>,
    pub episodes: Option<usize>,
    pub state_dict: Option<PathBuf>,
    pub read_timeout_secs: Option<u64>,
    pub iterations: Option<usize>,
    pub explore_steps: Option<usize>,
}

/// Get the XDG config directory.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "guidetree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("guidetree.toml"))
}

/// Get the path to the local config file in `dir`.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".guidetree.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        let expanded = expand_env_vars(self.state_dict.to_string_lossy().as_ref());
        self.state_dict = PathBuf::from(expanded);
    }

    /// Overlay wins wherever it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            action_space: overlay.action_space.unwrap_or(self.action_space),
            episodes: overlay.episodes.unwrap_or(self.episodes),
            state_dict: overlay
                .state_dict
                .clone()
                .unwrap_or_else(|| self.state_dict.clone()),
            read_timeout_secs: overlay.read_timeout_secs.unwrap_or(self.read_timeout_secs),
            iterations: overlay.iterations.unwrap_or(self.iterations),
            explore_steps: overlay.explore_steps.unwrap_or(self.explore_steps),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a `.guidetree.toml`
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                current = current.merge_with(&load_raw_settings(&local_path)?);
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();
        current.validate()?;
        Ok(current)
    }

    /// Apply GUIDETREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("GUIDETREE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get::<u32>("action_space") {
            settings.action_space = val;
        }
        if let Ok(val) = config.get::<usize>("episodes") {
            settings.episodes = val;
        }
        if let Ok(val) = config.get_string("state_dict") {
            settings.state_dict = PathBuf::from(val);
        }
        if let Ok(val) = config.get::<u64>("read_timeout_secs") {
            settings.read_timeout_secs = val;
        }
        if let Ok(val) = config.get::<usize>("iterations") {
            settings.iterations = val;
        }
        if let Ok(val) = config.get::<usize>("explore_steps") {
            settings.explore_steps = val;
        }
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ApplicationError> {
        if self.action_space == 0 {
            return Err(ApplicationError::Config {
                message: "action_space must be at least 1".into(),
            });
        }
        if self.read_timeout_secs == 0 {
            return Err(ApplicationError::Config {
                message: "read_timeout_secs must be at least 1".into(),
            });
        }
        if self.explore_steps == 0 {
            return Err(ApplicationError::Config {
                message: "explore_steps must be at least 1".into(),
            });
        }
        Ok(())
    }

    /// Serialize settings to TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: e.to_string(),
        })
    }

    /// Commented configuration file template.
    pub fn template() -> String {
        r#"# guidetree configuration
# Global: ~/.config/guidetree/guidetree.toml
# Local:  ./.guidetree.toml
# Env:    GUIDETREE_ACTION_SPACE, GUIDETREE_EPISODES, ...

# Actions are drawn uniformly from [0, action_space)
# action_space = 32

# Episodes per `guidetree run`
# episodes = 100

# State dictionary file (~ and $VAR are expanded)
# state_dict = "statedict.toml"

# Longest wait in seconds for a line of guided program output
# read_timeout_secs = 5

# Explore/restore rounds per `guidetree explore`
# iterations = 100

# Each exploration round sends between 1 and explore_steps random actions
# explore_steps = 100
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
