//! Service configuration.
//!
//! Loaded once at startup from defaults, an optional `pdfworks.toml` (or any
//! format the `config` crate understands) and `PDFWORKS__*` environment
//! variables, e.g. `PDFWORKS__SERVER__PORT=9000` or
//! `PDFWORKS__SELECTION__ORGANIZE=strict`.

use ::config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::page_range::Strictness;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub limits: LimitsConfig,

    #[serde(default)]
    pub selection: SelectionConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Largest accepted request body, all uploaded files included
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

/// Default strictness per operation; a request may override it with `mode`.
#[derive(Debug, Clone, Deserialize)]
pub struct SelectionConfig {
    #[serde(default = "lenient")]
    pub organize: Strictness,

    #[serde(default = "strict")]
    pub split: Strictness,

    #[serde(default = "lenient")]
    pub crop: Strictness,
}

impl AppConfig {
    /// Load configuration, with `file` (extension optional) as the file source.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let file_source = match file {
            Some(path) => File::from(path).required(true),
            None => File::with_name("pdfworks").required(false),
        };

        ConfigBuilder::builder()
            .add_source(file_source)
            .add_source(
                Environment::with_prefix("PDFWORKS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        LimitsConfig {
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl Default for SelectionConfig {
    fn default() -> Self {
        SelectionConfig {
            organize: Strictness::Lenient,
            split: Strictness::Strict,
            crop: Strictness::Lenient,
        }
    }
}

// ==================== Default Value Functions ====================

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_max_upload_bytes() -> usize {
    100 * 1024 * 1024
}

fn lenient() -> Strictness {
    Strictness::Lenient
}

fn strict() -> Strictness {
    Strictness::Strict
}
