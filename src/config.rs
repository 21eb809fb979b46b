use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use config::{Environment, File, FileFormat};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Environment variable holding the completion service credential.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Overrides the configuration file location.
pub const CONFIG_PATH_ENV: &str = "CONFIG_PATH";

const DEFAULT_CONFIG_FILE: &str = "conf.yaml";
const ENV_PREFIX: &str = "TRANSLATOR";

pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful assistant that translates {input_language} to {output_language}.";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub translation: TranslationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Mirror the caller's origin and allow credentials instead of a bare wildcard.
    #[serde(default = "default_true")]
    pub allow_credentials: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    Gemini,
    OpenaiCompatible,
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::Gemini => f.write_str("gemini"),
            Provider::OpenaiCompatible => f.write_str("openai_compatible"),
        }
    }
}

/// Completion service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_provider")]
    pub provider: Provider,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default)]
    pub api_key: Option<String>,

    /// Provider endpoint root. Gemini falls back to the public API when unset.
    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default)]
    pub temperature: Option<f32>,

    /// Whole-request timeout. Unset leaves the HTTP client's default in place.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Extra attempts after a failed completion call.
    #[serde(default)]
    pub max_retries: u32,
}

fn default_provider() -> Provider {
    Provider::Gemini
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationConfig {
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_credentials: default_true(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            api_key: None,
            base_url: None,
            temperature: None,
            request_timeout_secs: None,
            max_retries: 0,
        }
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            system_prompt: default_system_prompt(),
        }
    }
}

impl Config {
    /// Load configuration from the process environment and an optional file.
    ///
    /// The file is `path` if given, then `CONFIG_PATH`, then `conf.yaml` when present.
    /// Fails when the provider credential cannot be resolved.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let env: HashMap<String, String> = std::env::vars().collect();

        let path = path
            .map(str::to_string)
            .or_else(|| env.get(CONFIG_PATH_ENV).cloned())
            .or_else(|| {
                Path::new(DEFAULT_CONFIG_FILE)
                    .exists()
                    .then(|| DEFAULT_CONFIG_FILE.to_string())
            });

        let config = match &path {
            Some(path) => {
                let (content, format) = read_config_file(path)?;
                let config = Self::from_sources(Some((&content, format)), &env)?;
                info!("Loaded configuration from: {}", path);
                config
            }
            None => {
                let config = Self::from_sources(None, &env)?;
                info!("No configuration file found, using defaults and environment");
                config
            }
        };

        Ok(config)
    }

    /// Build a configuration from file content and an explicit environment map.
    ///
    /// Precedence, lowest first: built-in defaults, the file, `TRANSLATOR__*` variables.
    pub fn from_sources(
        file: Option<(&str, FileFormat)>,
        env: &HashMap<String, String>,
    ) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some((content, format)) = file {
            let content = substitute_env_vars(content, env)?;
            builder = builder.add_source(File::from_str(&content, format));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .source(Some(
                    env.iter()
                        .map(|(k, v)| (k.clone(), v.clone()))
                        .collect(),
                )),
        );

        let mut config: Config = builder
            .build()
            .context("Failed to assemble configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;

        config.llm.resolve_api_key(env);
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.llm.api_key.is_none() {
            bail!("{} not found in environment variables", API_KEY_ENV);
        }

        if self.llm.provider == Provider::OpenaiCompatible && self.llm.base_url.is_none() {
            bail!("openai_compatible provider requires llm.base_url");
        }

        for slot in ["{input_language}", "{output_language}"] {
            if !self.translation.system_prompt.contains(slot) {
                bail!("translation.system_prompt must contain {}", slot);
            }
        }

        Ok(())
    }
}

impl LlmConfig {
    /// Replace a blank or unresolved key with the credential from the environment.
    fn resolve_api_key(&mut self, env: &HashMap<String, String>) {
        let usable = self
            .api_key
            .as_deref()
            .map(|key| !key.trim().is_empty() && !key.contains("${"))
            .unwrap_or(false);

        if !usable {
            debug!("llm.api_key not set in configuration, falling back to {}", API_KEY_ENV);
            self.api_key = env
                .get(API_KEY_ENV)
                .filter(|key| !key.trim().is_empty())
                .cloned();
        }
    }
}

fn read_config_file(path: &str) -> Result<(String, FileFormat)> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Configuration file not found: {}", path))?;
    let content = content
        .strip_prefix('\u{feff}')
        .map(str::to_string)
        .unwrap_or(content);

    let path_lower = path.to_lowercase();
    let format = if path_lower.ends_with(".json") || path_lower.ends_with(".jsonld") {
        FileFormat::Json
    } else {
        FileFormat::Yaml
    };

    Ok((content, format))
}

/// Replace `${VAR_NAME}` with values from `env`. Unknown variables are left untouched.
fn substitute_env_vars(content: &str, env: &HashMap<String, String>) -> Result<String> {
    let pattern = Regex::new(r"\$\{(\w+)\}")?;
    let replaced = pattern.replace_all(content, |caps: &regex::Captures| {
        env.get(&caps[1])
            .cloned()
            .unwrap_or_else(|| caps[0].to_string())
    });
    Ok(replaced.into_owned())
}
