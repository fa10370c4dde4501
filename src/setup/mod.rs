//! Setup module for initial application configuration.
//!
//! Handles first-run setup and version migrations by writing the embedded
//! default config. Device selection afterwards goes through `voxpad device`.

pub mod version;

use anyhow::anyhow;

/// Embedded default configuration template.
const DEFAULT_CONFIG: &str = include_str!("../../environments/voxpad.toml");

/// Current application version from Cargo.toml
const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Runs the setup process.
///
/// Creates the config directory and writes the default config file with a
/// version prefix. An existing config is replaced, which is how version
/// migrations pick up new keys.
///
/// # Errors
/// Returns an error if any file operations fail.
pub fn run_setup() -> anyhow::Result<()> {
    let config_dir = dirs::home_dir()
        .ok_or_else(|| anyhow!("Could not determine home directory"))?
        .join(".config")
        .join("voxpad");
    std::fs::create_dir_all(&config_dir)?;

    // Write main config file with version prefix
    let config_path = config_dir.join("voxpad.toml");
    let config_with_version = format!(r#"config_version = "{}""#, CURRENT_VERSION);
    let full_config = format!("{}\n{}", config_with_version, DEFAULT_CONFIG);
    std::fs::write(&config_path, full_config)?;

    tracing::info!("Default configuration written: {}", config_path.display());
    Ok(())
}
