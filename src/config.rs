use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use crate::recognizer::FunctionRoles;

/// Name of the configuration file picked up from the working directory
pub const DEFAULT_CONFIG_FILE: &str = "gettext-turbo.json";

/// Configuration for gettext-turbo
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Glob patterns for input files (e.g., ["src/**/*.js", "templates/**/*.html"])
    #[serde(default = "default_input")]
    pub input: Vec<String>,

    /// Glob patterns for paths to skip (e.g., ["**/node_modules/**"])
    #[serde(default = "default_ignore")]
    pub ignore: Vec<String>,

    /// Path of the generated template
    #[serde(default = "default_output")]
    pub output: String,

    /// Extensions scanned as markup rather than script (e.g., ["html", "vue"])
    #[serde(default = "default_markup_extensions")]
    pub markup_extensions: Vec<String>,

    /// Translation function names, one list per call shape
    #[serde(default)]
    pub functions: FunctionNames,
}

/// Translation function names grouped by call shape
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FunctionNames {
    /// `gettext("msgid")`
    #[serde(default = "default_plain_functions")]
    pub plain: Vec<String>,

    /// `ngettext("msgid", "msgid_plural", n)`
    #[serde(default = "default_plural_functions")]
    pub plural: Vec<String>,

    /// `pgettext("msgctxt", "msgid")`
    #[serde(default = "default_context_functions")]
    pub context: Vec<String>,

    /// `npgettext("msgctxt", "msgid", "msgid_plural", n)`
    #[serde(default = "default_plural_context_functions")]
    pub plural_context: Vec<String>,
}

/// Invalid configuration values
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("function `{name}` is listed in both `functions.{first}` and `functions.{second}`")]
    AmbiguousFunctionName {
        name: String,
        first: &'static str,
        second: &'static str,
    },
    #[error("`functions.{list}` contains an empty function name")]
    EmptyFunctionName { list: &'static str },
    #[error("no input patterns configured")]
    NoInput,
}

fn default_input() -> Vec<String> {
    vec!["src/**/*.{js,jsx,ts,tsx,mjs,cjs,vue,html}".to_string()]
}

fn default_ignore() -> Vec<String> {
    vec!["**/node_modules/**".to_string()]
}

fn default_output() -> String {
    "messages.pot".to_string()
}

fn default_markup_extensions() -> Vec<String> {
    vec!["html".to_string(), "htm".to_string(), "vue".to_string()]
}

fn default_plain_functions() -> Vec<String> {
    vec!["gettext".to_string(), "$gettext".to_string(), "_".to_string()]
}

fn default_plural_functions() -> Vec<String> {
    vec!["ngettext".to_string(), "$ngettext".to_string()]
}

fn default_context_functions() -> Vec<String> {
    vec!["pgettext".to_string(), "$pgettext".to_string()]
}

fn default_plural_context_functions() -> Vec<String> {
    vec!["npgettext".to_string(), "$npgettext".to_string()]
}

impl Default for FunctionNames {
    fn default() -> Self {
        Self {
            plain: default_plain_functions(),
            plural: default_plural_functions(),
            context: default_context_functions(),
            plural_context: default_plural_context_functions(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: default_input(),
            ignore: default_ignore(),
            output: default_output(),
            markup_extensions: default_markup_extensions(),
            functions: FunctionNames::default(),
        }
    }
}

impl Config {
    /// Load and validate configuration from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config = Self::from_json_string(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load and validate configuration from a JSON string
    pub fn from_json_string(json_str: &str) -> Result<Self> {
        let config: Config =
            serde_json::from_str(json_str).with_context(|| "Failed to parse config JSON")?;
        config.validate()?;
        Ok(config)
    }

    /// Try to load from the default config file, or return the default config
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::load(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Reject configurations whose behavior would be undefined
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.input.is_empty() {
            return Err(ConfigError::NoInput);
        }
        self.function_roles().map(|_| ())
    }

    /// Build the name → role table used by the recognizer
    pub fn function_roles(&self) -> Result<FunctionRoles, ConfigError> {
        FunctionRoles::from_names(&self.functions)
    }
}
