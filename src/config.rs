//! Strip configuration.
//!
//! YAML file with kebab-case keys; every key is optional and falls back to
//! its default, so a partial file and a missing file behave the same.

use crate::error::{ChartError, Result};
use crate::layout::LayoutStyle;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// All settings consumed by the refresh/parse/layout cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ChartConfig {
    /// Shell command whose stdout carries the markup.
    #[serde(default = "default_command")]
    pub command: String,

    /// Seconds between refreshes.
    #[serde(default = "default_update_interval")]
    pub update_interval: u64,

    /// Seconds before a running command is abandoned.
    #[serde(default = "default_cmd_timeout")]
    pub cmd_timeout: u64,

    /// Width of the strip canvas in pixels.
    #[serde(default = "default_chart_width")]
    pub chart_width: f32,

    /// Width of a vertical bar track in pixels.
    #[serde(default = "default_bar_width")]
    pub bar_width: f32,

    /// Opacity of the strip background fill.
    #[serde(default = "default_chart_area_transparency")]
    pub chart_area_transparency: f32,

    /// Opacity of the sparkline stroke.
    #[serde(default = "default_graph_transparency")]
    pub graph_transparency: f32,

    /// Label font family.
    #[serde(default = "default_font_family")]
    pub font_family: String,

    /// Label font size in pixels.
    #[serde(default = "default_font_size")]
    pub font_size: f32,

    /// Default label color as a markup color spec (mnemonic or hex).
    #[serde(default = "default_font_color")]
    pub font_color: String,

    /// Shadow color behind label text.
    #[serde(default = "default_font_shadow_color")]
    pub font_shadow_color: String,

    /// Whether label text casts a shadow.
    #[serde(default = "default_enable_font_shadow")]
    pub enable_font_shadow: bool,

    /// In-memory graph history capacity.
    #[serde(default = "default_history_len")]
    pub history_len: usize,

    /// Verbose diagnostics on stderr.
    #[serde(default)]
    pub verbose: bool,
}

fn default_command() -> String {
    "echo CR:g".to_string()
}
fn default_update_interval() -> u64 {
    60
}
fn default_cmd_timeout() -> u64 {
    10
}
fn default_chart_width() -> f32 {
    200.0
}
fn default_bar_width() -> f32 {
    8.0
}
fn default_chart_area_transparency() -> f32 {
    0.3
}
fn default_graph_transparency() -> f32 {
    0.8
}
fn default_font_family() -> String {
    "Sans".to_string()
}
fn default_font_size() -> f32 {
    10.0
}
fn default_font_color() -> String {
    "#FFFFFF".to_string()
}
fn default_font_shadow_color() -> String {
    "#000000".to_string()
}
fn default_enable_font_shadow() -> bool {
    true
}
fn default_history_len() -> usize {
    128
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            command: default_command(),
            update_interval: default_update_interval(),
            cmd_timeout: default_cmd_timeout(),
            chart_width: default_chart_width(),
            bar_width: default_bar_width(),
            chart_area_transparency: default_chart_area_transparency(),
            graph_transparency: default_graph_transparency(),
            font_family: default_font_family(),
            font_size: default_font_size(),
            font_color: default_font_color(),
            font_shadow_color: default_font_shadow_color(),
            enable_font_shadow: default_enable_font_shadow(),
            history_len: default_history_len(),
            verbose: false,
        }
    }
}

impl ChartConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .map_err(|_| ChartError::ConfigNotFound(path.display().to_string()))?;

        Self::parse(&content)
    }

    /// Parses configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error with line number if parsing fails.
    pub fn parse(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| {
            let line = e.location().map(|l| l.line()).unwrap_or(0);
            ChartError::ConfigParse {
                line,
                message: e.to_string(),
            }
        })
    }

    /// Loads configuration with fallback to defaults.
    #[must_use]
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Writes the configuration back as YAML, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let yaml = serde_yaml::to_string(self).map_err(|e| ChartError::ConfigParse {
            line: 0,
            message: e.to_string(),
        })?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Default configuration location under the user config directory.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("cmdstrip").join("config.yaml"))
    }

    /// Returns the refresh interval as a Duration.
    #[must_use]
    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval)
    }

    /// Returns the command timeout as a Duration.
    #[must_use]
    pub fn cmd_timeout(&self) -> Duration {
        Duration::from_secs(self.cmd_timeout)
    }
}

impl From<&ChartConfig> for LayoutStyle {
    fn from(config: &ChartConfig) -> Self {
        Self {
            bar_width: config.bar_width,
            font_family: config.font_family.clone(),
            font_size: config.font_size,
            font_color: crate::color::resolve(&config.font_color),
            font_shadow_color: crate::color::resolve(&config.font_shadow_color),
            enable_font_shadow: config.enable_font_shadow,
            chart_area_transparency: config.chart_area_transparency,
            graph_transparency: config.graph_transparency,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba;

    #[test]
    fn test_config_default() {
        let config = ChartConfig::new();

        assert_eq!(config.command, "echo CR:g");
        assert_eq!(config.update_interval, 60);
        assert_eq!(config.cmd_timeout, 10);
        assert_eq!(config.history_len, 128);
        assert!(config.enable_font_shadow);
        assert!(!config.verbose);
    }

    #[test]
    fn test_config_parse_minimal() {
        let config = ChartConfig::parse("command: uptime").unwrap();

        assert_eq!(config.command, "uptime");
        assert_eq!(config.update_interval, 60, "unset keys keep defaults");
    }

    #[test]
    fn test_config_parse_full() {
        let yaml = r"
command: my-status.sh
update-interval: 5
cmd-timeout: 2
bar-width: 12
font-color: y
enable-font-shadow: false
history-len: 32
verbose: true
";

        let config = ChartConfig::parse(yaml).unwrap();

        assert_eq!(config.command, "my-status.sh");
        assert_eq!(config.update_interval, 5);
        assert_eq!(config.cmd_timeout, 2);
        assert!((config.bar_width - 12.0).abs() < f32::EPSILON);
        assert!(!config.enable_font_shadow);
        assert_eq!(config.history_len, 32);
        assert!(config.verbose);
    }

    #[test]
    fn test_config_parse_error_includes_line() {
        let yaml = r"
command: ok
update-interval: not_a_number
";

        let result = ChartConfig::parse(yaml);
        assert!(result.is_err());

        let display = result.unwrap_err().to_string();
        assert!(display.contains("3"), "Error should include line number");
    }

    #[test]
    fn test_config_durations() {
        let mut config = ChartConfig::new();
        config.update_interval = 5;
        config.cmd_timeout = 2;

        assert_eq!(config.update_interval(), Duration::from_secs(5));
        assert_eq!(config.cmd_timeout(), Duration::from_secs(2));
    }

    #[test]
    fn test_config_load_or_default() {
        let config = ChartConfig::load_or_default("/nonexistent/path");
        assert_eq!(config.command, "echo CR:g");
    }

    #[test]
    fn test_config_save_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.yaml");

        let mut config = ChartConfig::new();
        config.command = "df -h /".to_string();
        config.verbose = true;
        config.save(&path).expect("save");

        let reloaded = ChartConfig::load(&path).expect("load");
        assert_eq!(reloaded, config);
    }

    #[test]
    fn test_layout_style_from_config() {
        let mut config = ChartConfig::new();
        config.font_color = "r".to_string();
        config.bar_width = 10.0;

        let style = LayoutStyle::from(&config);
        assert_eq!(style.font_color, Rgba::rgb(1.0, 0.0, 0.0));
        assert!((style.bar_width - 10.0).abs() < f32::EPSILON);
        assert_eq!(style.font_shadow_color, Rgba::BLACK);
    }
}
