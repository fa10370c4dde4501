//! Interactive capture device selection.
//!
//! Lists the available input devices and writes the chosen one into the
//! config file, preserving everything else in it.

use crate::config;
use crate::recording::audio;
use cliclack::outro;
use cliclack::{intro, select};
use console::style;

/// Lets the user pick the capture device for future sessions.
///
/// "default" is always the first option and leaves device selection to the
/// audio host at session start.
///
/// # Errors
/// - If no input devices can be enumerated
/// - If the selection is cancelled
/// - If the config file cannot be updated
pub async fn handle_device() -> Result<(), anyhow::Error> {
    tracing::info!("=== voxpad Device Selection ===");

    ctrlc::set_handler(move || {}).expect("setting Ctrl-C handler");

    intro(style(" device ").on_white().black())?;

    let current = config::VoxpadConfig::load()
        .map(|c| c.audio.device)
        .unwrap_or_else(|_| "default".to_string());

    let mut options: Vec<String> = vec!["default".to_string()];
    options.extend(audio::input_device_names()?);

    let mut select_prompt = select("Select capture device:");
    for (i, name) in options.iter().enumerate() {
        let hint = if *name == current { "current" } else { "" };
        select_prompt = select_prompt.item(i, name, hint);
    }
    let selected_idx: usize = select_prompt
        .interact()
        .map_err(|e| anyhow::anyhow!("Selection cancelled: {e}"))?;

    let chosen = &options[selected_idx];
    config::set_device(chosen)?;
    tracing::info!("Capture device set to '{}'", chosen);

    outro(format!("Capture device set to '{chosen}'."))?;

    Ok(())
}
