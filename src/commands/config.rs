//! Configuration file editor command.
//!
//! Opens the voxpad configuration file in the user's preferred editor.

use std::process::Command;

/// Opens the voxpad configuration file in the user's preferred editor.
///
/// Tries editors in this order:
/// 1. $EDITOR environment variable
/// 2. nano (most user-friendly fallback)
/// 3. vi (ultimate fallback, always available)
///
/// # Errors
/// - If no editor can be found or executed
pub fn handle_config() -> anyhow::Result<()> {
    let config_path = crate::config::file::get_config_path()
        .map_err(|e| anyhow::anyhow!("Could not determine config path: {e}"))?;

    tracing::info!("Opening config file: {}", config_path.display());

    let editor = find_editor()?;
    tracing::debug!("Using editor: {}", editor);

    let status = Command::new(&editor)
        .arg(&config_path)
        .status()
        .map_err(|e| {
            anyhow::anyhow!(
                "Failed to open editor '{editor}': {e}. Make sure the editor is installed and accessible."
            )
        })?;

    if !status.success() {
        return Err(anyhow::anyhow!(
            "Editor exited with error code: {}",
            status.code().unwrap_or(-1)
        ));
    }

    tracing::info!("Config file edited successfully");
    Ok(())
}

/// Finds the best available editor to use.
///
/// Tries in order: $EDITOR, nano, vi
fn find_editor() -> anyhow::Result<String> {
    if let Ok(editor) = std::env::var("EDITOR") {
        if !editor.is_empty() {
            return Ok(editor);
        }
    }

    for editor in &["nano", "vi"] {
        if is_editor_available(editor) {
            return Ok(editor.to_string());
        }
    }

    Err(anyhow::anyhow!(
        "No editor found. Please set the $EDITOR environment variable."
    ))
}

/// Checks if an editor is available in the system PATH.
fn is_editor_available(editor: &str) -> bool {
    Command::new("which")
        .arg(editor)
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}
