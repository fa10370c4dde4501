//! Application command handlers for voxpad.
//!
//! This module organizes command handling into separate submodules, each responsible for a specific
//! application command.
//!
//! # Commands
//! - `pad`: The voice-memo pad itself (record, review, save, export)
//! - `device`: Interactive capture device selection
//! - `config`: Open configuration file in user's preferred editor
//! - `list_devices`: List available audio input devices
//! - `logs`: Display recent log entries

pub mod config;
pub mod device;
pub mod list_devices;
pub mod logs;
pub mod pad;

pub use config::handle_config;
pub use device::handle_device;
pub use list_devices::handle_list_devices;
pub use logs::handle_logs;
pub use pad::handle_pad;
