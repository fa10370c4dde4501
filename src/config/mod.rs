//! Configuration management for voxpad.
//!
//! Configuration lives in a TOML file in the user's config directory,
//! created by setup on first run and versioned through its first line.

pub mod file;

pub use file::{set_device, AudioConfig, ExportConfig, VoxpadConfig};
