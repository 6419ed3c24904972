use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::llm::ModelConfig;

/// Directory name under `$XDG_CONFIG_HOME`.
const APP_DIR: &str = "cao";
/// Directory name under the home directory when XDG is not set.
const HOME_DIR: &str = ".cao";
const CONFIG_FILE: &str = "config.json";

/// Model used when nothing else is configured.
pub const DEFAULT_MODEL: &str = "deepseek";

fn builtin_models() -> BTreeMap<String, ModelConfig> {
    [
        ("deepseek", "https://api.deepseek.com/v1", "deepseek-coder"),
        ("openai", "https://api.openai.com/v1", "gpt-4o"),
        ("ollama", "http://localhost:11434/v1", "qwen2.5-coder:7b"),
    ]
    .into_iter()
    .map(|(name, api_base, model)| {
        (
            name.to_string(),
            ModelConfig::new(api_base, model).with_provider(name),
        )
    })
    .collect()
}

/// Main application configuration: the known models and which one to use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub models: BTreeMap<String, ModelConfig>,
    pub default_model: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            models: builtin_models(),
            default_model: DEFAULT_MODEL.to_string(),
        }
    }
}

/// What a user's file may contain. Anything missing comes from the defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UserConfig {
    models: BTreeMap<String, ModelConfig>,
    default_model: Option<String>,
}

/// Pick the configuration directory: `$XDG_CONFIG_HOME/cao` or `~/.cao`.
pub fn config_dir(xdg_config_home: Option<PathBuf>, home: Option<PathBuf>) -> Option<PathBuf> {
    match xdg_config_home.filter(|p| !p.as_os_str().is_empty()) {
        Some(xdg) => Some(xdg.join(APP_DIR)),
        None => home.map(|h| h.join(HOME_DIR)),
    }
}

impl Config {
    /// Returns the default config file path.
    pub fn default_path() -> Option<PathBuf> {
        config_dir(
            std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
            dirs::home_dir(),
        )
        .map(|dir| dir.join(CONFIG_FILE))
    }

    /// Load configuration from the default path.
    ///
    /// A missing file is created with the defaults; an unreadable one is
    /// reported and replaced by the defaults in memory only.
    pub fn load() -> Self {
        let Some(path) = Self::default_path() else {
            error!("could not determine the configuration directory");
            return Self::default();
        };

        if !path.exists() {
            let config = Self::default();
            if let Err(e) = config.save_to_path(&path) {
                error!(path = %path.display(), "failed to write default configuration: {:#}", e);
            }
            return config;
        }

        Self::load_from_path(&path).unwrap_or_else(|e| {
            error!(path = %path.display(), "failed to load configuration: {:#}", e);
            Self::default()
        })
    }

    /// Load configuration from a specific path, merged over the defaults.
    pub fn load_from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let user: UserConfig = serde_json::from_str(&contents)
            .with_context(|| format!("parsing {}", path.display()))?;
        debug!(path = %path.display(), models = user.models.len(), "loaded configuration");
        Ok(Self::default().merged_with(user))
    }

    fn merged_with(mut self, user: UserConfig) -> Self {
        self.models.extend(user.models);
        if let Some(name) = user.default_model {
            if self.models.contains_key(&name) {
                self.default_model = name;
            }
        }
        self
    }

    /// Save configuration to the default path.
    pub fn save(&self) -> anyhow::Result<()> {
        match Self::default_path() {
            Some(path) => self.save_to_path(&path),
            None => bail!("Could not determine config directory"),
        }
    }

    /// Save configuration to a specific path as pretty-printed JSON.
    pub fn save_to_path(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }

    /// Names of all configured models, sorted.
    pub fn model_names(&self) -> Vec<&str> {
        self.models.keys().map(String::as_str).collect()
    }

    /// The model entry for `name`, with `provider` defaulted to `name`.
    pub fn model(&self, name: &str) -> Option<ModelConfig> {
        let mut config = self.models.get(name)?.clone();
        if config.provider.as_deref().map_or(true, str::is_empty) {
            config.provider = Some(name.to_string());
        }
        Some(config)
    }

    /// Add or replace a model. Its provider is set to its name.
    pub fn add_model(
        &mut self,
        name: &str,
        api_base: &str,
        model: &str,
        api_key: Option<String>,
    ) {
        let mut entry = ModelConfig::new(api_base, model).with_provider(name);
        entry.api_key = api_key.filter(|k| !k.is_empty());
        self.models.insert(name.to_string(), entry);
    }

    /// Remove a model. The current default cannot be removed.
    pub fn remove_model(&mut self, name: &str) -> anyhow::Result<()> {
        if !self.models.contains_key(name) {
            bail!("model '{}' is not configured", name);
        }
        if name == self.default_model {
            bail!("model '{}' is the default model and cannot be removed", name);
        }
        self.models.remove(name);
        Ok(())
    }

    /// Make `name` the default model.
    pub fn set_default_model(&mut self, name: &str) -> anyhow::Result<()> {
        if !self.models.contains_key(name) {
            bail!("model '{}' is not configured", name);
        }
        self.default_model = name.to_string();
        Ok(())
    }
}
