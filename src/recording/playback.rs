//! Playback of takes through the system audio player.
//!
//! On macOS the `open` command hands the file to the default application.
//! On Linux `xdg-open` is tried first, then common players directly. The
//! player runs as a detached child so the pad keeps responding; a background
//! thread reaps it when playback ends.

use anyhow::{anyhow, Result};
use std::path::Path;
use std::process::{Child, Command};

/// Starts playing an audio file and returns once the player is launched.
///
/// # Errors
/// - If the file does not exist
/// - If no audio player can be started
pub fn play_file(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(anyhow!("Audio file not found: {}", path.display()));
    }

    let child = spawn_player(path)?;
    tracing::info!("Playing {}", path.display());
    reap_in_background(child);
    Ok(())
}

/// Waits for the player on a background thread so zombies do not pile up.
fn reap_in_background(mut child: Child) {
    std::thread::spawn(move || match child.wait() {
        Ok(status) if !status.success() => {
            tracing::warn!("Audio player exited with {status}");
        }
        Ok(_) => tracing::debug!("Audio player finished"),
        Err(e) => tracing::warn!("Audio player wait failed: {e}"),
    });
}

#[cfg(target_os = "macos")]
fn spawn_player(path: &Path) -> Result<Child> {
    Command::new("open")
        .arg(path)
        .spawn()
        .map_err(|e| anyhow!("Failed to open audio player: {e}"))
}

#[cfg(target_os = "linux")]
fn spawn_player(path: &Path) -> Result<Child> {
    match Command::new("xdg-open").arg(path).spawn() {
        Ok(child) => Ok(child),
        Err(_) => {
            // Fallback to common audio players if xdg-open is missing
            let players = ["mpv", "vlc", "ffplay", "paplay"];
            for player in players {
                if let Ok(child) = Command::new(player).arg(path).spawn() {
                    tracing::debug!("Playing via {player}");
                    return Ok(child);
                }
            }
            Err(anyhow!(
                "No audio player found. Install mpv, vlc, ffplay, or paplay"
            ))
        }
    }
}

#[cfg(not(any(target_os = "macos", target_os = "linux")))]
fn spawn_player(_path: &Path) -> Result<Child> {
    Err(anyhow!("Audio playback is not supported on this platform"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_an_error() {
        let result = play_file(Path::new("/nonexistent/voxpad/take.wav"));
        assert!(result.is_err());
    }
}
