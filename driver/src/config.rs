//! Driver settings
//!
//! Settings are layered with the priority CLI > environment > YAML config
//! file > defaults.

use anyhow::{Context, Result, bail};
use clap::ValueEnum;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::str::FromStr;

const FORMAT_VARIABLE: &str = "AVLBST_FORMAT";
const VERIFY_VARIABLE: &str = "AVLBST_VERIFY";
const LOG_VARIABLE: &str = "AVLBST_LOG";

const DEFAULT_LOG: &str = "warn";

/// How command replies are written to standard output
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per command
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(text: &str) -> Result<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => bail!("unknown output format `{other}` (expected text or json)"),
        }
    }
}

/// Config file contents from YAML
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    format: Option<OutputFormat>,
    verify: Option<bool>,
    log: Option<String>,
}

impl ConfigFile {
    /// Reads and parses the config file, or returns an empty config when no
    /// path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }
}

/// Values given on the command line
#[derive(Debug, Default)]
pub struct Overrides {
    pub format: Option<OutputFormat>,
    pub verify: Option<bool>,
    pub log: Option<String>,
}

/// Resolved driver settings
#[derive(Debug, PartialEq, Eq)]
pub struct Settings {
    pub format: OutputFormat,
    pub verify: bool,
    pub log: String,
}

impl Settings {
    /// Merges the layers. `environment` looks up a variable by name.
    pub fn resolve<E>(overrides: Overrides, environment: E, file: ConfigFile) -> Result<Self>
    where
        E: Fn(&str) -> Option<String>,
    {
        let format = match overrides.format {
            Some(format) => Some(format),
            None => environment(FORMAT_VARIABLE)
                .map(|value| value.parse())
                .transpose()
                .with_context(|| format!("Invalid {FORMAT_VARIABLE}"))?,
        }
        .or(file.format)
        .unwrap_or_default();

        let verify = match overrides.verify {
            Some(verify) => Some(verify),
            None => environment(VERIFY_VARIABLE)
                .map(|value| parse_flag(&value))
                .transpose()
                .with_context(|| format!("Invalid {VERIFY_VARIABLE}"))?,
        }
        .or(file.verify)
        .unwrap_or(false);

        let log = overrides
            .log
            .or_else(|| environment(LOG_VARIABLE))
            .or(file.log)
            .unwrap_or_else(|| DEFAULT_LOG.to_string());

        Ok(Self {
            format,
            verify,
            log,
        })
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => bail!("expected a boolean, got `{other}`"),
    }
}
