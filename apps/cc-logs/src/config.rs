use anyhow::{Context, Result};
use cc_logs_format::{Pattern, Precision, TimestampDisplay, TimestampFormat, Timezone};
use cc_logs_stream::StreamConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampsMode {
    None,
    #[default]
    Datetime,
    Time,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub timestamps: TimestampsMode,
    pub precision: Precision,
    pub timezone: Timezone,
    pub zone_offset: bool,
    pub color: bool,
    pub show_instance: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            timestamps: TimestampsMode::default(),
            precision: Precision::default(),
            timezone: Timezone::default(),
            zone_offset: false,
            color: true,
            show_instance: true,
        }
    }
}

impl DisplayConfig {
    pub fn timestamp_display(&self) -> TimestampDisplay {
        let pattern = match self.timestamps {
            TimestampsMode::None => return TimestampDisplay::None,
            TimestampsMode::Datetime => Pattern::Datetime,
            TimestampsMode::Time => Pattern::Time,
        };
        TimestampDisplay::Format(TimestampFormat {
            pattern,
            precision: self.precision,
            utc: false,
            show_zone_offset: self.zone_offset,
        })
    }
}

/// Contents of `config.toml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub url: Option<String>,
    pub stream: StreamConfig,
    pub display: DisplayConfig,
}

/// Reads `explicit` if given (it must exist), otherwise the default location
/// when present.
pub fn load(explicit: Option<&Path>) -> Result<FileConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match default_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(FileConfig::default()),
        },
    };
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse(&content).with_context(|| format!("Failed to parse config file: {}", path.display()))
}

pub fn parse(content: &str) -> Result<FileConfig> {
    let config: FileConfig = toml::from_str(content)?;
    config.stream.validate()?;
    Ok(config)
}

fn default_path() -> Option<PathBuf> {
    if let Some(base) = dirs::config_dir() {
        return Some(base.join("cc-logs").join("config.toml"));
    }
    dirs::home_dir().map(|home| home.join(".cc-logs").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::{parse, FileConfig, TimestampsMode};
    use cc_logs_format::{Precision, TimestampDisplay, Timezone};

    #[test]
    fn empty_file_uses_defaults() {
        assert_eq!(parse("").expect("parse"), FileConfig::default());
    }

    #[test]
    fn tables_override_defaults() {
        let config = parse(
            r#"
            url = "https://logs.example.com/stream"

            [stream]
            overflow_limit = 200

            [display]
            timestamps = "time"
            precision = "seconds"
            timezone = "utc"
            color = false
            "#,
        )
        .expect("parse");
        assert_eq!(config.url.as_deref(), Some("https://logs.example.com/stream"));
        assert_eq!(config.stream.overflow_limit, 200);
        assert_eq!(config.display.timestamps, TimestampsMode::Time);
        assert_eq!(config.display.precision, Precision::Seconds);
        assert_eq!(config.display.timezone, Timezone::Utc);
        assert!(!config.display.color);
        assert!(config.display.show_instance);
    }

    #[test]
    fn invalid_stream_limits_are_rejected() {
        let err = parse("[stream]\nbuffer_capacity = 0").expect_err("zero capacity");
        assert!(err.to_string().contains("buffer capacity"));
    }

    #[test]
    fn none_mode_disables_timestamps() {
        let config = parse("[display]\ntimestamps = \"none\"").expect("parse");
        assert_eq!(config.display.timestamp_display(), TimestampDisplay::None);
    }
}
