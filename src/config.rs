//! Configuration module.
//!
//! Handles loading, validating, and merging `feedmark.toml`. Stock defaults
//! are the base layer; a user file overrides just the keys it names.
//!
//! ## Config File Location
//!
//! `feedmark.toml` is read from the current directory when present. A
//! different file can be named with `--config FILE`, in which case it must
//! exist.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [processing]
//! max_processes = 4         # Max parallel parsers (omit for auto = CPU cores)
//!
//! [feed]
//! limit = 20                # Max Atom entries (omit for no limit)
//!
//! [html]
//! standalone = false        # Wrap `html` output in a full page
//! snippet_limit = 10        # Max snippet entries (omit for no limit)
//!
//! [refdex]
//! filename_prefix = "../"   # Prepended to filenames read from refdexes
//! ```
//!
//! Command-line flags override config values. Unknown keys are rejected to
//! catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Looked up in the current directory when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = "feedmark.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `feedmark.toml`.
///
/// All fields have defaults. User files need only specify the values they
/// want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeedmarkConfig {
    /// Parallel parsing settings.
    pub processing: ProcessingConfig,
    /// Atom feed settings.
    pub feed: FeedConfig,
    /// HTML output settings.
    pub html: HtmlConfig,
    /// Refdex input settings.
    pub refdex: RefdexConfig,
}

impl FeedmarkConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        if self.feed.limit == Some(0) {
            return Err(ConfigError::Validation(
                "feed.limit must be at least 1".into(),
            ));
        }
        if self.html.snippet_limit == Some(0) {
            return Err(ConfigError::Validation(
                "html.snippet_limit must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of documents parsed at once.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeedConfig {
    /// Maximum number of entries in an Atom feed.
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HtmlConfig {
    /// Emit full HTML pages rather than fragments.
    pub standalone: bool,
    /// Maximum number of entries in an HTML snippet.
    pub snippet_limit: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RefdexConfig {
    /// Prepended to every `filename` read from an input refdex.
    pub filename_prefix: Option<String>,
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(FeedmarkConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<FeedmarkConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: FeedmarkConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config, merging user values on top of stock defaults.
///
/// With `explicit`, that file must exist. Otherwise [`CONFIG_FILE_NAME`] in
/// the current directory is used if present.
pub fn load_config(explicit: Option<&Path>) -> Result<FeedmarkConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = match explicit {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            Some(toml::from_str(&content)?)
        }
        None => load_raw_config(Path::new(CONFIG_FILE_NAME))?,
    };
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `feedmark.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Feedmark Configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# feedmark reads ./feedmark.toml when it exists, or the file given
# with --config. Command-line flags take precedence over these values.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum number of documents parsed in parallel.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4

# ---------------------------------------------------------------------------
# Atom feed
# ---------------------------------------------------------------------------
[feed]
# Maximum number of entries, newest first. Omit for no limit.
# limit = 20

# ---------------------------------------------------------------------------
# HTML output
# ---------------------------------------------------------------------------
[html]
# Wrap each rendered document in a complete HTML page.
standalone = false

# Maximum number of entries in an HTML snippet. Omit for no limit.
# snippet_limit = 10

# ---------------------------------------------------------------------------
# Refdex input
# ---------------------------------------------------------------------------
[refdex]
# Prepended to every filename read from an --input-refdex file.
# filename_prefix = "../"
"##
}
