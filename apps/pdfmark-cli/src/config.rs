//! Configuration loading
//!
//! Settings come from an optional TOML file. Every field has a default, so an
//! empty file (or no file at all) gives the stock behaviour:
//!
//! ```toml
//! payload = "GJW"
//! target_offset = 99504
//!
//! [converter]
//! program = "unoconv"
//! listener_args = ["--listener"]
//! convert_args = ["-f", "pdf", "-o", "{output}", "{input}"]
//! startup_delay_ms = 3000
//! cleanup_program = "pkill"
//! cleanup_args = ["soffice.bin"]
//! ```

use anyhow::Context;
use pdfmark_core::DEFAULT_TARGET_OFFSET;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Three-byte identifier written into the pattern
    #[serde(default = "default_payload")]
    pub payload: String,
    /// Preferred offset of the pattern inside the carrier stream
    #[serde(default = "default_target_offset")]
    pub target_offset: usize,
    /// External document converter used by `roundtrip`
    #[serde(default)]
    pub converter: ConverterConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            payload: default_payload(),
            target_offset: default_target_offset(),
            converter: ConverterConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string
    pub fn from_str(s: &str) -> anyhow::Result<Self> {
        toml::from_str(s).context("Failed to parse TOML configuration")
    }

    /// Use the file when one is given, defaults otherwise
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }
}

fn default_payload() -> String {
    "GJW".to_string()
}

fn default_target_offset() -> usize {
    DEFAULT_TARGET_OFFSET
}

/// How to drive the external converter.
///
/// `{input}` and `{output}` in `convert_args` are replaced with the absolute
/// paths of the files being converted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConverterConfig {
    #[serde(default = "default_program")]
    pub program: String,
    #[serde(default = "default_listener_args")]
    pub listener_args: Vec<String>,
    #[serde(default = "default_convert_args")]
    pub convert_args: Vec<String>,
    /// How long to wait for the listener before converting
    #[serde(default = "default_startup_delay_ms")]
    pub startup_delay_ms: u64,
    /// Command run after the listener is stopped (the office process outlives it)
    #[serde(default = "default_cleanup_program")]
    pub cleanup_program: Option<String>,
    #[serde(default = "default_cleanup_args")]
    pub cleanup_args: Vec<String>,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            listener_args: default_listener_args(),
            convert_args: default_convert_args(),
            startup_delay_ms: default_startup_delay_ms(),
            cleanup_program: default_cleanup_program(),
            cleanup_args: default_cleanup_args(),
        }
    }
}

impl ConverterConfig {
    pub fn startup_delay(&self) -> Duration {
        Duration::from_millis(self.startup_delay_ms)
    }
}

fn default_program() -> String {
    "unoconv".to_string()
}

fn default_listener_args() -> Vec<String> {
    vec!["--listener".to_string()]
}

fn default_convert_args() -> Vec<String> {
    ["-f", "pdf", "-o", "{output}", "{input}"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_startup_delay_ms() -> u64 {
    3000
}

fn default_cleanup_program() -> Option<String> {
    Some("pkill".to_string())
}

fn default_cleanup_args() -> Vec<String> {
    vec!["soffice.bin".to_string()]
}
