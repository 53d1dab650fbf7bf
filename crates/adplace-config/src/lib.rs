use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Engine configuration for adplace
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Max distinct ads per page render, 0 = unlimited
    #[serde(default)]
    pub max_ads_per_page: u32,

    #[serde(default)]
    pub frequency: FrequencyConfig,

    #[serde(default)]
    pub content: ContentConfig,

    #[serde(default)]
    pub markup: MarkupConfig,

    #[serde(default)]
    pub host: HostConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrequencyConfig {
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Paragraph boundary, matched literally and case-insensitively
    #[serde(default = "default_delimiter")]
    pub paragraph_delimiter: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkupConfig {
    /// Wrap placement output in a container div
    #[serde(default = "default_true")]
    pub wrapper: bool,

    #[serde(default = "default_class_prefix")]
    pub class_prefix: String,
}

/// Optional host software the site runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfig {
    #[serde(default = "default_true")]
    pub comments: bool,

    #[serde(default = "default_true")]
    pub widgets: bool,

    #[serde(default)]
    pub forum: bool,

    #[serde(default)]
    pub activity: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_ads_per_page: 0,
            frequency: FrequencyConfig::default(),
            content: ContentConfig::default(),
            markup: MarkupConfig::default(),
            host: HostConfig::default(),
        }
    }
}

impl Default for FrequencyConfig {
    fn default() -> Self {
        Self {
            session_ttl_secs: default_session_ttl(),
        }
    }
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            paragraph_delimiter: default_delimiter(),
        }
    }
}

impl Default for MarkupConfig {
    fn default() -> Self {
        Self {
            wrapper: true,
            class_prefix: default_class_prefix(),
        }
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            comments: true,
            widgets: true,
            forum: false,
            activity: false,
        }
    }
}

fn default_session_ttl() -> u64 {
    86_400
}

fn default_delimiter() -> String {
    "</p>".to_string()
}

fn default_class_prefix() -> String {
    "adplace".to_string()
}

fn default_true() -> bool {
    true
}

impl FrequencyConfig {
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }
}

impl Config {
    /// Load config from default location or create default if not found
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::config_path();

        if path.exists() {
            Self::load_from(&path)
        } else {
            // Create default config file
            let config = Config::default();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let content = toml::to_string_pretty(&config)?;
            std::fs::write(&path, content)?;
            Ok(config)
        }
    }

    /// Load config from an explicit file
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Get config file path
    pub fn config_path() -> PathBuf {
        if let Some(dirs) = directories::ProjectDirs::from("com", "adplace", "adplace") {
            dirs.config_dir().join("config.toml")
        } else {
            PathBuf::from("~/.adplace/config.toml")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.max_ads_per_page, 0);
        assert_eq!(config.frequency.session_ttl(), Duration::from_secs(86_400));
        assert_eq!(config.content.paragraph_delimiter, "</p>");
        assert!(config.markup.wrapper);
        assert!(config.host.comments);
        assert!(!config.host.forum);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.markup.class_prefix, config.markup.class_prefix);
        assert_eq!(parsed.frequency.session_ttl_secs, config.frequency.session_ttl_secs);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
max_ads_per_page = 3

[markup]
class_prefix = "sp"

[host]
forum = true
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.max_ads_per_page, 3);
        assert_eq!(config.markup.class_prefix, "sp");
        assert!(config.markup.wrapper);
        assert!(config.host.forum);
        assert!(config.host.comments);
        assert_eq!(config.content.paragraph_delimiter, "</p>");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "max_ads_per_page = 5\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.max_ads_per_page, 5);
        assert!(Config::load_from(&dir.path().join("missing.toml")).is_err());
    }
}
