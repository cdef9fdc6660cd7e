use crate::document::Highlight;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const LOCAL_CONFIG: &str = ".amend.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_highlight_words")]
    pub max_highlight_words: usize,

    #[serde(default = "default_min_highlight_chars")]
    pub min_highlight_chars: usize,

    #[serde(default = "default_highlight")]
    pub highlight: Highlight,

    #[serde(default = "default_context_before")]
    pub context_before: usize,

    #[serde(default = "default_context_after")]
    pub context_after: usize,
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_max_highlight_words() -> usize {
    50
}

fn default_min_highlight_chars() -> usize {
    2
}

fn default_highlight() -> Highlight {
    Highlight::Yellow
}

fn default_context_before() -> usize {
    5
}

fn default_context_after() -> usize {
    3
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: default_model(),
            endpoint: default_endpoint(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
            max_highlight_words: default_max_highlight_words(),
            min_highlight_chars: default_min_highlight_chars(),
            highlight: default_highlight(),
            context_before: default_context_before(),
            context_after: default_context_after(),
        }
    }
}

impl Config {
    /// Load configuration with priority: CLI args > local config > global config > defaults
    pub fn load(model: Option<String>) -> Result<Self> {
        Self::load_layers(
            Self::global_config_path().as_deref(),
            Path::new(LOCAL_CONFIG),
            model,
        )
    }

    pub fn load_layers(global: Option<&Path>, local: &Path, model: Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(global_path) = global {
            if global_path.exists() {
                let global_config = Self::from_file(global_path)?;
                config = config.merge(global_config);
            }
        }

        // Local config overrides global
        if local.exists() {
            let local_config = Self::from_file(local)?;
            config = config.merge(local_config);
        }

        if let Some(model) = model {
            config.model = model;
        }

        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    fn merge(mut self, other: Self) -> Self {
        // other's values override self's if they differ from defaults
        if other.model != default_model() {
            self.model = other.model;
        }
        if other.endpoint != default_endpoint() {
            self.endpoint = other.endpoint;
        }
        if other.api_key_env != default_api_key_env() {
            self.api_key_env = other.api_key_env;
        }
        if other.timeout_secs != default_timeout_secs() {
            self.timeout_secs = other.timeout_secs;
        }
        if other.max_highlight_words != default_max_highlight_words() {
            self.max_highlight_words = other.max_highlight_words;
        }
        if other.min_highlight_chars != default_min_highlight_chars() {
            self.min_highlight_chars = other.min_highlight_chars;
        }
        if other.highlight != default_highlight() {
            self.highlight = other.highlight;
        }
        if other.context_before != default_context_before() {
            self.context_before = other.context_before;
        }
        if other.context_after != default_context_after() {
            self.context_after = other.context_after;
        }
        self
    }

    pub fn global_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "amend").map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.model, "gemini-2.0-flash");
        assert_eq!(config.max_highlight_words, 50);
        assert_eq!(config.min_highlight_chars, 2);
        assert_eq!(config.highlight, Highlight::Yellow);
    }

    #[test]
    fn test_merge_configs() {
        let base = Config {
            context_after: 7,
            ..Default::default()
        };
        let override_config = Config {
            model: "gemini-1.5-pro".to_string(),
            ..Default::default()
        };

        let merged = base.merge(override_config);
        assert_eq!(merged.model, "gemini-1.5-pro");
        assert_eq!(merged.context_after, 7);
    }

    #[test]
    fn test_layers_and_cli_override() {
        let dir = tempdir().unwrap();
        let global = dir.path().join("global.toml");
        let local = dir.path().join("local.toml");
        fs::write(&global, "timeout_secs = 10\nhighlight = \"green\"\n").unwrap();
        fs::write(&local, "timeout_secs = 20\nmodel = \"local-model\"\n").unwrap();

        let config = Config::load_layers(Some(&global), &local, None).unwrap();
        assert_eq!(config.timeout_secs, 20);
        assert_eq!(config.highlight, Highlight::Green);
        assert_eq!(config.model, "local-model");

        let config = Config::load_layers(Some(&global), &local, Some("cli-model".into())).unwrap();
        assert_eq!(config.model, "cli-model");
    }

    #[test]
    fn test_missing_files_give_defaults() {
        let dir = tempdir().unwrap();
        let config =
            Config::load_layers(None, &dir.path().join("absent.toml"), None).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_bad_config_is_reported() {
        let dir = tempdir().unwrap();
        let local = dir.path().join("local.toml");
        fs::write(&local, "timeout_secs = \"soon\"").unwrap();
        let err = Config::load_layers(None, &local, None).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
