pub mod validation;

use serde::{Deserialize, Serialize};

use self::validation::validate_config;

/// Placeholder written in place of hidden telemetry values.
pub const REDACTED_VALUE: &str = "__REDACTED__";

pub const ENV_HIDE_LLM_INVOCATION_PARAMETERS: &str = "OPENINFERENCE_HIDE_LLM_INVOCATION_PARAMETERS";
pub const ENV_HIDE_INPUTS: &str = "OPENINFERENCE_HIDE_INPUTS";
pub const ENV_HIDE_OUTPUTS: &str = "OPENINFERENCE_HIDE_OUTPUTS";
pub const ENV_HIDE_INPUT_MESSAGES: &str = "OPENINFERENCE_HIDE_INPUT_MESSAGES";
pub const ENV_HIDE_OUTPUT_MESSAGES: &str = "OPENINFERENCE_HIDE_OUTPUT_MESSAGES";
pub const ENV_HIDE_INPUT_IMAGES: &str = "OPENINFERENCE_HIDE_INPUT_IMAGES";
pub const ENV_HIDE_INPUT_TEXT: &str = "OPENINFERENCE_HIDE_INPUT_TEXT";
pub const ENV_HIDE_OUTPUT_TEXT: &str = "OPENINFERENCE_HIDE_OUTPUT_TEXT";
pub const ENV_HIDE_EMBEDDINGS_TEXT: &str = "OPENINFERENCE_HIDE_EMBEDDINGS_TEXT";
pub const ENV_HIDE_EMBEDDINGS_VECTORS: &str = "OPENINFERENCE_HIDE_EMBEDDINGS_VECTORS";
pub const ENV_HIDE_PROMPTS: &str = "OPENINFERENCE_HIDE_PROMPTS";
pub const ENV_HIDE_CHOICES: &str = "OPENINFERENCE_HIDE_CHOICES";
pub const ENV_BASE64_IMAGE_MAX_LENGTH: &str = "OPENINFERENCE_BASE64_IMAGE_MAX_LENGTH";

/// Error type for configuration loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Redaction switches read by the telemetry formatter that consumes decoded
/// requests and responses. Built once at startup and shared read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    pub hide_llm_invocation_parameters: bool,
    pub hide_inputs: bool,
    pub hide_outputs: bool,
    pub hide_input_messages: bool,
    pub hide_output_messages: bool,
    pub hide_input_images: bool,
    pub hide_input_text: bool,
    pub hide_output_text: bool,
    pub hide_embeddings_text: bool,
    pub hide_embeddings_vectors: bool,
    pub hide_prompts: bool,
    pub hide_choices: bool,
    pub base64_image_max_length: usize,
}

fn default_base64_image_max_length() -> usize {
    32_000
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            hide_llm_invocation_parameters: false,
            hide_inputs: false,
            hide_outputs: false,
            hide_input_messages: false,
            hide_output_messages: false,
            hide_input_images: false,
            hide_input_text: false,
            hide_output_text: false,
            hide_embeddings_text: false,
            hide_embeddings_vectors: false,
            hide_prompts: false,
            hide_choices: false,
            base64_image_max_length: default_base64_image_max_length(),
        }
    }
}

/// Parse a boolean the way environment toggles are usually written.
fn parse_env_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

impl TraceConfig {
    /// Build from the process environment; unset or unparseable variables
    /// keep their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    /// Override fields from `lookup` (an environment-like key/value source).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let flags: [(&str, &mut bool); 12] = [
            (
                ENV_HIDE_LLM_INVOCATION_PARAMETERS,
                &mut self.hide_llm_invocation_parameters,
            ),
            (ENV_HIDE_INPUTS, &mut self.hide_inputs),
            (ENV_HIDE_OUTPUTS, &mut self.hide_outputs),
            (ENV_HIDE_INPUT_MESSAGES, &mut self.hide_input_messages),
            (ENV_HIDE_OUTPUT_MESSAGES, &mut self.hide_output_messages),
            (ENV_HIDE_INPUT_IMAGES, &mut self.hide_input_images),
            (ENV_HIDE_INPUT_TEXT, &mut self.hide_input_text),
            (ENV_HIDE_OUTPUT_TEXT, &mut self.hide_output_text),
            (ENV_HIDE_EMBEDDINGS_TEXT, &mut self.hide_embeddings_text),
            (ENV_HIDE_EMBEDDINGS_VECTORS, &mut self.hide_embeddings_vectors),
            (ENV_HIDE_PROMPTS, &mut self.hide_prompts),
            (ENV_HIDE_CHOICES, &mut self.hide_choices),
        ];
        for (key, slot) in flags {
            match lookup(key).as_deref().map(|v| (v, parse_env_bool(v))) {
                Some((_, Some(value))) => *slot = value,
                Some((raw, None)) if !raw.is_empty() => {
                    tracing::warn!(key, value = raw, "ignoring unparseable boolean override");
                }
                _ => {}
            }
        }
        if let Some(raw) = lookup(ENV_BASE64_IMAGE_MAX_LENGTH) {
            match raw.parse::<usize>() {
                Ok(value) => self.base64_image_max_length = value,
                Err(_) if raw.is_empty() => {}
                Err(_) => {
                    tracing::warn!(
                        key = ENV_BASE64_IMAGE_MAX_LENGTH,
                        value = %raw,
                        "ignoring unparseable integer override"
                    );
                }
            }
        }
    }

    // Effective hide rules for span formatters that record decoded requests
    // and responses. The broad `hide_inputs`/`hide_outputs` switches imply
    // every narrower one below them. Nothing in this crate emits spans with
    // message bodies; these exist for downstream telemetry consumers.

    /// Whether input messages are left out of recorded spans.
    #[must_use]
    pub fn hides_input_messages(&self) -> bool {
        self.hide_inputs || self.hide_input_messages
    }

    #[must_use]
    pub fn hides_output_messages(&self) -> bool {
        self.hide_outputs || self.hide_output_messages
    }

    #[must_use]
    pub fn hides_input_text(&self) -> bool {
        self.hides_input_messages() || self.hide_input_text
    }

    #[must_use]
    pub fn hides_output_text(&self) -> bool {
        self.hides_output_messages() || self.hide_output_text
    }

    #[must_use]
    pub fn hides_input_images(&self) -> bool {
        self.hides_input_messages() || self.hide_input_images
    }

    /// `value`, or [`REDACTED_VALUE`] when `hide` is set.
    #[must_use]
    pub fn redact<'a>(hide: bool, value: &'a str) -> &'a str {
        if hide {
            REDACTED_VALUE
        } else {
            value
        }
    }

    /// Whether a base64 image URL is small enough to record verbatim.
    #[must_use]
    pub fn keeps_image_url(&self, url: &str) -> bool {
        !url.starts_with("data:") || url.len() <= self.base64_image_max_length
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeaturesConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_json: bool,
}

fn default_log_level() -> String {
    "INFO".to_string()
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub features: FeaturesConfig,
    #[serde(default)]
    pub tracing: TraceConfig,
}

impl AppConfig {
    /// Apply `OPENINFERENCE_*` environment overrides on top of file values.
    pub fn apply_env_overrides(&mut self) {
        self.tracing
            .apply_overrides(|key| std::env::var(key).ok());
    }
}

/// Load configuration from a YAML file, apply environment overrides and
/// validate it.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] when reading the file fails, [`ConfigError::Yaml`]
/// when parsing fails, or [`ConfigError::Validation`] when semantic validation fails.
pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    let mut config = parse_config(&contents)?;
    config.apply_env_overrides();
    validate_config(&config)?;
    Ok(config)
}

/// Parse and validate configuration from YAML text, without environment
/// overrides.
///
/// # Errors
///
/// Returns [`ConfigError::Yaml`] or [`ConfigError::Validation`].
pub fn parse_config(contents: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = serde_yaml::from_str(contents)?;
    validate_config(&config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_load_example_config() {
        let config = load_config("config.example.yaml");
        assert!(
            config.is_ok(),
            "Failed to load example config: {:?}",
            config.err()
        );
        let config = config.unwrap();
        assert_eq!(config.features.log_level, "INFO");
        assert_eq!(config.tracing.base64_image_max_length, 32_000);
    }

    #[test]
    fn test_defaults() {
        let config = parse_config("{}").unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(!config.tracing.hides_input_messages());
        assert_eq!(config.tracing.base64_image_max_length, 32_000);
    }

    #[test]
    fn test_yaml_partial_tracing_section() {
        let config = parse_config(
            "features:\n  log_level: debug\ntracing:\n  hide_inputs: true\n  base64_image_max_length: 100\n",
        )
        .unwrap();
        assert_eq!(config.features.log_level, "debug");
        assert!(config.tracing.hide_inputs);
        assert!(config.tracing.hides_input_text());
        assert!(!config.tracing.hides_output_text());
        assert_eq!(config.tracing.base64_image_max_length, 100);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_HIDE_OUTPUTS, "true"),
            (ENV_HIDE_PROMPTS, "1"),
            (ENV_HIDE_CHOICES, "not-a-bool"),
            (ENV_BASE64_IMAGE_MAX_LENGTH, "64"),
        ]
        .into_iter()
        .collect();

        let mut config = TraceConfig {
            hide_choices: true,
            ..TraceConfig::default()
        };
        config.apply_overrides(|key| env.get(key).map(|v| (*v).to_string()));
        assert!(config.hide_outputs);
        assert!(config.hides_output_text());
        assert!(config.hide_prompts);
        assert!(config.hide_choices, "invalid value keeps prior setting");
        assert_eq!(config.base64_image_max_length, 64);
    }

    #[test]
    fn test_invalid_integer_override_keeps_default() {
        let mut config = TraceConfig::default();
        config.apply_overrides(|key| {
            (key == ENV_BASE64_IMAGE_MAX_LENGTH).then(|| "lots".to_string())
        });
        assert_eq!(config.base64_image_max_length, 32_000);
    }

    #[test]
    fn test_redaction_helpers() {
        assert_eq!(TraceConfig::redact(true, "secret"), REDACTED_VALUE);
        assert_eq!(TraceConfig::redact(false, "plain"), "plain");

        let config = TraceConfig {
            base64_image_max_length: 10,
            ..TraceConfig::default()
        };
        assert!(config.keeps_image_url("https://example.com/a-very-long-image-url.png"));
        assert!(!config.keeps_image_url("data:image/png;base64,AAAAAAAAAA"));
    }
}
