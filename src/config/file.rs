//! Configuration file management for voxpad.
//!
//! This module handles loading application configuration from a TOML file in
//! the user's config directory. The file is created by setup and edited with
//! `voxpad config`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Audio capture configuration.
#[derive(Debug, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Audio device to use. Options:
    /// - "default" for system default device
    /// - numeric index (0, 1, 2, etc.) from `voxpad list-devices`
    /// - device name from `voxpad list-devices`
    pub device: String,
    /// Capture sample rate in Hz (actual rate follows the device)
    pub sample_rate: u32,
    /// Peak volume threshold for the clip indicator (0-100, percentage of reference level)
    #[serde(default = "default_peak_volume_threshold")]
    pub peak_volume_threshold: u8,
    /// Reference level in dBFS for 100% meter display (typical: -20 to -6 dBFS)
    #[serde(default = "default_reference_level_db")]
    pub reference_level_db: i8,
    /// Seconds between automatic draft refreshes while recording (0 = only on stop)
    #[serde(default)]
    pub flush_interval_secs: u64,
}

fn default_peak_volume_threshold() -> u8 {
    90
}

fn default_reference_level_db() -> i8 {
    -20
}

/// Export destination configuration.
#[derive(Debug, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Destination directory. Empty string means the system download
    /// directory, falling back to the current directory.
    #[serde(default)]
    pub directory: String,
    /// Base file name for exports; the take's extension is appended
    #[serde(default = "default_filename_stem")]
    pub filename_stem: String,
}

fn default_filename_stem() -> String {
    "recorded_audio".to_string()
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: String::new(),
            filename_stem: default_filename_stem(),
        }
    }
}

impl ExportConfig {
    /// Resolves the configured directory to a concrete path.
    pub fn resolve_directory(&self) -> PathBuf {
        if self.directory.is_empty() {
            dirs::download_dir().unwrap_or_else(|| PathBuf::from("."))
        } else {
            PathBuf::from(&self.directory)
        }
    }
}

/// Complete application configuration.
#[derive(Debug, Serialize, Deserialize)]
pub struct VoxpadConfig {
    pub audio: AudioConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

impl VoxpadConfig {
    /// Loads configuration from the user's config directory.
    ///
    /// # Errors
    /// - If the config directory cannot be determined
    /// - If the config file cannot be read
    /// - If the TOML is malformed
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = get_config_path()?;
        let config_content = fs::read_to_string(&config_path)?;
        let config: VoxpadConfig = toml::from_str(&config_content)?;
        Ok(config)
    }
}

/// Rewrites the `device = "..."` line of the config file in place.
///
/// Goes through the file text rather than re-serializing so comments and the
/// version prefix survive.
///
/// # Errors
/// - If the config file cannot be read or written
/// - If the file has no device entry to replace
pub fn set_device(device: &str) -> anyhow::Result<()> {
    let config_path = get_config_path()?;
    let content = fs::read_to_string(&config_path)?;

    let new_content = replace_device_line(&content, device).ok_or_else(|| {
        anyhow::anyhow!(
            "No device entry found in {}. Edit it with 'voxpad config'.",
            config_path.display()
        )
    })?;

    fs::write(&config_path, new_content)?;
    tracing::info!("Input device set to '{device}'");
    Ok(())
}

fn replace_device_line(content: &str, device: &str) -> Option<String> {
    let re = regex::Regex::new(r#"(?m)^\s*device\s*=\s*"[^"]*""#).ok()?;
    if !re.is_match(content) {
        return None;
    }
    let replacement = format!(r#"device = "{device}""#);
    Some(re.replace(content, regex::NoExpand(&replacement)).into_owned())
}

/// Retrieves the path to the config file.
///
/// Assumes the config file exists (created by setup if needed).
///
/// # Errors
/// - If the config directory cannot be determined
/// - If the config directory cannot be created
pub(crate) fn get_config_path() -> Result<PathBuf, std::io::Error> {
    let home_dir = dirs::home_dir().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not find home directory",
        )
    })?;
    let config_path = home_dir.join(".config").join("voxpad").join("voxpad.toml");

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    Ok(config_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
            config_version = "0.1.3"

            [audio]
            device = "default"
            sample_rate = 16000
            peak_volume_threshold = 85
            reference_level_db = -18
            flush_interval_secs = 5

            [export]
            directory = "/tmp/memos"
            filename_stem = "memo"
        "#;

        let config: VoxpadConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.audio.device, "default");
        assert_eq!(config.audio.sample_rate, 16000);
        assert_eq!(config.audio.peak_volume_threshold, 85);
        assert_eq!(config.audio.reference_level_db, -18);
        assert_eq!(config.audio.flush_interval_secs, 5);
        assert_eq!(config.export.directory, "/tmp/memos");
        assert_eq!(config.export.filename_stem, "memo");
    }

    #[test]
    fn test_parse_minimal_config_uses_defaults() {
        let toml_str = r#"
            [audio]
            device = "1"
            sample_rate = 44100
        "#;

        let config: VoxpadConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.audio.peak_volume_threshold, 90);
        assert_eq!(config.audio.reference_level_db, -20);
        assert_eq!(config.audio.flush_interval_secs, 0);
        assert_eq!(config.export.filename_stem, "recorded_audio");
        assert!(config.export.directory.is_empty());
    }

    #[test]
    fn test_configured_export_directory_wins() {
        let export = ExportConfig {
            directory: "/data/exports".to_string(),
            filename_stem: default_filename_stem(),
        };
        assert_eq!(export.resolve_directory(), PathBuf::from("/data/exports"));
    }

    #[test]
    fn test_default_template_parses() {
        let template = include_str!("../../environments/voxpad.toml");
        let config: VoxpadConfig = toml::from_str(template).unwrap();
        assert_eq!(config.audio.device, "default");
        assert_eq!(config.export.filename_stem, "recorded_audio");
    }

    #[test]
    fn test_replace_device_line_keeps_rest_of_file() {
        let content = "config_version = \"0.1.3\"\n\n[audio]\n# picked by setup\ndevice = \"default\"\nsample_rate = 16000\n";

        let replaced = replace_device_line(content, "USB Microphone").unwrap();
        assert!(replaced.contains("device = \"USB Microphone\""));
        assert!(replaced.contains("config_version = \"0.1.3\""));
        assert!(replaced.contains("# picked by setup"));
        assert!(replaced.contains("sample_rate = 16000"));
    }

    #[test]
    fn test_replace_device_line_without_entry() {
        assert!(replace_device_line("[audio]\nsample_rate = 16000\n", "x").is_none());
    }
}
