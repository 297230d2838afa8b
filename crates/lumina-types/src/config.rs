//! Global configuration types for Lumina.
//!
//! `LuminaConfig` represents the top-level `config.toml` in the data
//! directory. Every field has a default, so an empty or missing file yields
//! a working configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level configuration.
///
/// Loaded from `~/.lumina/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LuminaConfig {
    #[serde(default)]
    pub generator: GeneratorConfig,

    #[serde(default)]
    pub context: ContextConfig,
}

/// Settings for the text-generation backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Human-readable provider name, used in logs and spans.
    #[serde(default = "default_provider_name")]
    pub provider_name: String,

    /// Base URL of an OpenAI-compatible chat completions API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model identifier sent with every request.
    #[serde(default = "default_model")]
    pub model: String,

    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Deadline for a single generation call. No deadline when unset.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_provider_name() -> String {
    "openai".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4.1".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            provider_name: default_provider_name(),
            base_url: default_base_url(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            timeout_secs: None,
        }
    }
}

impl GeneratorConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Settings for the codebase context generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Whether each turn is augmented with fresh codebase context.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Program to run (looked up on `PATH`).
    #[serde(default = "default_command")]
    pub command: String,

    /// Arguments passed to `command`.
    #[serde(default = "default_args")]
    pub args: Vec<String>,

    /// File the command writes, relative to the working directory.
    #[serde(default = "default_output_file")]
    pub output_file: String,

    /// Directory to run in. Defaults to the process working directory.
    #[serde(default)]
    pub working_dir: Option<PathBuf>,

    /// Deadline for a single context generation. No deadline when unset.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_enabled() -> bool {
    true
}

fn default_command() -> String {
    "npx".to_string()
}

fn default_args() -> Vec<String> {
    vec!["repomix".to_string(), "-i".to_string(), ".env".to_string()]
}

fn default_output_file() -> String {
    "repomix-output.xml".to_string()
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            command: default_command(),
            args: default_args(),
            output_file: default_output_file(),
            working_dir: None,
            timeout_secs: None,
        }
    }
}

impl ContextConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}
