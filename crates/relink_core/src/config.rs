use std::env;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_EXTENSION: &str = "md";
pub const DEFAULT_REPLACEMENT: char = '_';
pub const DEFAULT_HEADING_LINES_TO_STRIP: usize = 2;

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct ConvertConfig {
    #[serde(default)]
    pub convert: ConvertSection,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct ConvertSection {
    pub extension: Option<String>,
    pub replacement: Option<String>,
    pub heading_lines_to_strip: Option<usize>,
}

impl ConvertConfig {
    /// Resolve the document extension: env RELINK_EXTENSION > config > "md".
    /// A leading dot is tolerated and stripped.
    pub fn extension(&self) -> String {
        if let Ok(value) = env::var("RELINK_EXTENSION") {
            let trimmed = value.trim().trim_start_matches('.').to_string();
            if !trimmed.is_empty() {
                return trimmed;
            }
        }
        self.convert
            .extension
            .as_deref()
            .map(|value| value.trim().trim_start_matches('.').to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
    }

    /// Resolve the sanitizer replacement character: env RELINK_REPLACEMENT >
    /// config > '_'. Only the first character of the configured value is used.
    pub fn replacement(&self) -> char {
        if let Ok(value) = env::var("RELINK_REPLACEMENT")
            && let Some(ch) = value.trim().chars().next()
        {
            return ch;
        }
        self.convert
            .replacement
            .as_deref()
            .and_then(|value| value.chars().next())
            .unwrap_or(DEFAULT_REPLACEMENT)
    }

    /// Resolve how many leading lines are dropped from each document:
    /// env RELINK_STRIP_LINES > config > 2. The default of 2 reproduces the
    /// exported corpus convention (heading line plus the line after it).
    pub fn heading_lines_to_strip(&self) -> usize {
        if let Ok(value) = env::var("RELINK_STRIP_LINES")
            && let Ok(parsed) = value.trim().parse::<usize>()
        {
            return parsed;
        }
        self.convert
            .heading_lines_to_strip
            .unwrap_or(DEFAULT_HEADING_LINES_TO_STRIP)
    }
}

/// Load and parse a ConvertConfig from a TOML file. Returns default if the
/// file doesn't exist.
pub fn load_config(config_path: &Path) -> Result<ConvertConfig> {
    if !config_path.exists() {
        return Ok(ConvertConfig::default());
    }
    let content = fs::read_to_string(config_path)
        .with_context(|| format!("failed to read {}", config_path.display()))?;
    let parsed: ConvertConfig = toml::from_str(&content)
        .with_context(|| format!("failed to parse {}", config_path.display()))?;
    Ok(parsed)
}
