//! Generator configuration and factory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use learnquest_core::traits::QuestionGenerator;

use crate::http::{HttpQuestionGenerator, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
use crate::offline::OfflineGenerator;

/// Env var that points the generator at a different service.
pub const GENERATOR_URL_ENV: &str = "LEARNQUEST_GENERATOR_URL";

/// Which question generator backend to use.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure in logs.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum GeneratorConfig {
    Http {
        #[serde(default = "default_base_url")]
        base_url: String,
        #[serde(default)]
        api_key: Option<String>,
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },
    /// Never reaches the network; every quiz is served from the fallback bank.
    Offline,
}

impl std::fmt::Debug for GeneratorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeneratorConfig::Http {
                base_url,
                api_key,
                timeout_secs,
            } => f
                .debug_struct("Http")
                .field("base_url", base_url)
                .field("api_key", &api_key.as_ref().map(|_| "***"))
                .field("timeout_secs", timeout_secs)
                .finish(),
            GeneratorConfig::Offline => f.write_str("Offline"),
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig::Http {
            base_url: default_base_url(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Provider side of `learnquest.toml`. Engine tables are parsed by
/// `learnquest_core::config` and ignored here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LearnquestConfig {
    #[serde(default)]
    pub generator: GeneratorConfig,
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

fn resolve_generator_config(config: &GeneratorConfig) -> GeneratorConfig {
    match config {
        GeneratorConfig::Http {
            base_url,
            api_key,
            timeout_secs,
        } => GeneratorConfig::Http {
            base_url: resolve_env_vars(base_url),
            api_key: api_key
                .as_ref()
                .map(|k| resolve_env_vars(k))
                .filter(|k| !k.is_empty()),
            timeout_secs: *timeout_secs,
        },
        GeneratorConfig::Offline => GeneratorConfig::Offline,
    }
}

/// Point the generator at `url`, switching an offline config to HTTP.
fn apply_url_override(config: &mut LearnquestConfig, url: Option<String>) {
    let Some(url) = url.filter(|u| !u.is_empty()) else {
        return;
    };
    match &mut config.generator {
        GeneratorConfig::Http { base_url, .. } => *base_url = url,
        GeneratorConfig::Offline => {
            config.generator = GeneratorConfig::Http {
                base_url: url,
                api_key: None,
                timeout_secs: default_timeout_secs(),
            }
        }
    }
}

/// Find the config file to use.
///
/// Search order:
/// 1. the explicit path, which must exist
/// 2. `learnquest.toml` in the current directory
/// 3. `~/.config/learnquest/config.toml`
pub fn find_config_path(path: Option<&Path>) -> Result<Option<PathBuf>> {
    if let Some(p) = path {
        if p.exists() {
            return Ok(Some(p.to_path_buf()));
        }
        anyhow::bail!("config file not found: {}", p.display());
    }

    let local = PathBuf::from("learnquest.toml");
    if local.exists() {
        return Ok(Some(local));
    }
    Ok(dirs_path()
        .map(|home| home.join("config.toml"))
        .filter(|global| global.exists()))
}

/// Load configuration from well-known paths.
///
/// Environment variable override: `LEARNQUEST_GENERATOR_URL`.
pub fn load_config() -> Result<LearnquestConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<LearnquestConfig> {
    let mut config = match find_config_path(path)? {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config_str(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => LearnquestConfig::default(),
    };

    apply_url_override(&mut config, std::env::var(GENERATOR_URL_ENV).ok());
    config.generator = resolve_generator_config(&config.generator);

    Ok(config)
}

fn parse_config_str(content: &str) -> Result<LearnquestConfig> {
    Ok(toml::from_str::<LearnquestConfig>(content)?)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("learnquest"))
}

/// Create a generator instance from its configuration.
pub fn create_generator(config: &GeneratorConfig) -> Result<Box<dyn QuestionGenerator>> {
    match config {
        GeneratorConfig::Http {
            base_url,
            api_key,
            timeout_secs,
        } => Ok(Box::new(HttpQuestionGenerator::new(
            base_url,
            api_key.clone(),
            *timeout_secs,
        )?)),
        GeneratorConfig::Offline => Ok(Box::new(OfflineGenerator)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_LEARNQUEST_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_LEARNQUEST_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_LEARNQUEST_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        std::env::remove_var("_LEARNQUEST_TEST_VAR");
    }

    #[test]
    fn default_config() {
        let config = LearnquestConfig::default();
        assert_eq!(
            config.generator,
            GeneratorConfig::Http {
                base_url: "http://localhost:8000".into(),
                api_key: None,
                timeout_secs: 30,
            }
        );
    }

    #[test]
    fn parse_generator_config_alongside_engine_tables() {
        let toml_str = r#"
[thresholds]
remediation = 70.0

[generator]
type = "http"
base_url = "https://quiz.example.com"
api_key = "sk-test"
"#;
        let config = parse_config_str(toml_str).unwrap();
        match config.generator {
            GeneratorConfig::Http {
                base_url,
                api_key,
                timeout_secs,
            } => {
                assert_eq!(base_url, "https://quiz.example.com");
                assert_eq!(api_key.as_deref(), Some("sk-test"));
                assert_eq!(timeout_secs, 30);
            }
            other => panic!("expected http config, got {other:?}"),
        }
    }

    #[test]
    fn parse_offline_config() {
        let config = parse_config_str("[generator]\ntype = \"offline\"\n").unwrap();
        assert_eq!(config.generator, GeneratorConfig::Offline);
    }

    #[test]
    fn unknown_generator_type_is_rejected() {
        assert!(parse_config_str("[generator]\ntype = \"carrier-pigeon\"\n").is_err());
    }

    #[test]
    fn debug_masks_api_key() {
        let config = GeneratorConfig::Http {
            base_url: "http://localhost:8000".into(),
            api_key: Some("sk-secret".into()),
            timeout_secs: 30,
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("***"));
    }

    #[test]
    fn url_override_switches_offline_to_http() {
        let mut config = LearnquestConfig {
            generator: GeneratorConfig::Offline,
        };
        apply_url_override(&mut config, Some("http://10.0.0.5:8000".into()));
        assert!(matches!(
            config.generator,
            GeneratorConfig::Http { ref base_url, .. } if base_url == "http://10.0.0.5:8000"
        ));

        let before = config.clone();
        apply_url_override(&mut config, Some(String::new()));
        assert_eq!(config, before);
    }

    #[test]
    fn load_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("learnquest.toml");
        std::fs::write(&path, "[generator]\ntype = \"offline\"\n").unwrap();

        let found = find_config_path(Some(&path)).unwrap();
        assert_eq!(found.as_deref(), Some(path.as_path()));
        assert!(find_config_path(Some(&dir.path().join("missing.toml"))).is_err());
    }

    #[test]
    fn create_offline_generator() {
        let generator = create_generator(&GeneratorConfig::Offline).unwrap();
        assert_eq!(generator.name(), "offline");
        let http = create_generator(&GeneratorConfig::default()).unwrap();
        assert_eq!(http.name(), "http");
    }
}
