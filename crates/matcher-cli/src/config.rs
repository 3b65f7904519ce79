//! Matcher configuration loading and validation.

use crate::OutputFormat;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

/// Levels accepted by `IBSM_SetMatchingLevel`.
pub const MATCHING_LEVELS: RangeInclusive<i32> = 1..=7;

/// Contents of a configuration file. Every key is optional.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MatcherConfig {
    /// Engine shared library.
    pub library: Option<PathBuf>,

    /// Matching level applied right after the session opens.
    pub matching_level: Option<i32>,

    pub format: Option<OutputFormat>,
}

/// Effective settings after command-line overrides.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub library: PathBuf,
    pub matching_level: Option<i32>,
    pub format: OutputFormat,
}

/// Platform file name of the engine library, found through the loader's
/// search path.
pub fn default_library() -> PathBuf {
    let name = if cfg!(target_os = "windows") {
        "IBScanMatcher.dll"
    } else if cfg!(target_os = "macos") {
        "libIBScanMatcher.dylib"
    } else {
        "libIBScanMatcher.so"
    };
    PathBuf::from(name)
}

/// Load configuration from a TOML or JSON file.
pub fn load_config(path: &Path) -> Result<MatcherConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let is_json = path.extension().map_or(false, |e| e == "json");
    parse_config(&content, is_json)
}

fn parse_config(content: &str, is_json: bool) -> Result<MatcherConfig> {
    let config: MatcherConfig = if is_json {
        serde_json::from_str(content).with_context(|| "Failed to parse config as JSON")?
    } else {
        toml::from_str(content).with_context(|| "Failed to parse config as TOML")?
    };
    Ok(config)
}

/// Merge the optional config file with command-line overrides.
///
/// Flags win over the file; the file wins over built-in defaults.
pub fn resolve(
    config: Option<&Path>,
    library: Option<PathBuf>,
    format: Option<OutputFormat>,
) -> Result<Settings> {
    let file = match config {
        Some(path) => load_config(path)?,
        None => MatcherConfig::default(),
    };
    let settings = merge(file, library, format);
    validate_settings(&settings)?;
    Ok(settings)
}

fn merge(file: MatcherConfig, library: Option<PathBuf>, format: Option<OutputFormat>) -> Settings {
    Settings {
        library: library.or(file.library).unwrap_or_else(default_library),
        matching_level: file.matching_level,
        format: format.or(file.format).unwrap_or_default(),
    }
}

pub fn validate_level(level: i32) -> Result<()> {
    if !MATCHING_LEVELS.contains(&level) {
        anyhow::bail!(
            "Matching level {} is outside {}..={}",
            level,
            MATCHING_LEVELS.start(),
            MATCHING_LEVELS.end()
        );
    }
    Ok(())
}

fn validate_settings(settings: &Settings) -> Result<()> {
    if let Some(level) = settings.matching_level {
        validate_level(level)?;
    }

    // Bare file names go through the dynamic loader's search path
    if settings.library.components().count() > 1 && !settings.library.exists() {
        anyhow::bail!("Matcher library not found: {:?}", settings.library);
    }

    Ok(())
}
