//! The pad: record, review and collect voice memos in one screen.
//!
//! Hosts the session board, the capture controller and the TUI in a single
//! polling loop. Timing runs off the loop itself: input is polled every 50ms,
//! the elapsed counter advances once per second while a session runs, and an
//! optional flush interval refreshes the draft from the live capture buffer.
//! SIGUSR1 stops a running session from outside, e.g. a window manager
//! keybinding, and behaves exactly like pressing 'r'.

use crate::config::VoxpadConfig;
use crate::media::{export_take, mime, HandleStore, Take};
use crate::recording::{play_file, CaptureController};
use crate::session::{PadCommand, PadUi, SessionBoard};
use crate::ui::ErrorScreen;
use anyhow::anyhow;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Runs the voice-memo pad until the user quits.
///
/// An optional `preload` file is imported as the initial draft before the
/// terminal UI comes up; if the file is rejected, the rejection notice is the
/// first thing shown instead.
///
/// # Errors
/// - If the configuration cannot be loaded
/// - If the scratch directory or the terminal cannot be set up
/// - If the capture device fails while a session runs
pub async fn handle_pad(preload: Option<PathBuf>) -> Result<(), anyhow::Error> {
    tracing::info!("=== voxpad Pad Opened ===");

    let config_data = match VoxpadConfig::load() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("Failed to load config: {}", err);
            let error_message = format!(
                "Configuration Error:\n\n{err}\n\nPlease check your ~/.config/voxpad/voxpad.toml file and try again."
            );
            let mut error_screen = ErrorScreen::new()?;
            error_screen.show_error(&error_message)?;
            error_screen.cleanup()?;
            return Err(anyhow!("Configuration error: {err}"));
        }
    };

    tracing::info!(
        "Configuration loaded: device={}, sample_rate={}Hz, flush_interval={}s",
        config_data.audio.device,
        config_data.audio.sample_rate,
        config_data.audio.flush_interval_secs
    );

    let store = HandleStore::new().map_err(|e| anyhow!("Failed to create scratch dir: {e}"))?;
    let mut board = SessionBoard::new();

    // Import the preload before the TUI exists; a rejection becomes the
    // first notice on screen rather than a startup failure.
    let mut pending_notice: Option<String> = None;
    if let Some(path) = preload {
        let path = expand_home(&path);
        match import_into_draft(&mut board, &store, &path) {
            Ok(()) => tracing::info!("Preloaded draft from {}", path.display()),
            Err(e) => {
                tracing::warn!("Preload rejected: {e}");
                pending_notice = Some(e.to_string());
            }
        }
    }

    // External stop trigger, consumed once per delivery.
    let stop_flag = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGUSR1, Arc::clone(&stop_flag))
        .map_err(|e| anyhow!("Failed to register signal handler: {e}"))?;

    let mut ui = PadUi::new(
        config_data.audio.peak_volume_threshold,
        config_data.audio.reference_level_db,
    )?;

    if let Some(notice) = pending_notice {
        ui.show_notice(notice);
    }

    let result = run_pad_loop(&config_data, &store, &mut board, &mut ui, &stop_flag);

    ui.cleanup()?;

    if let Err(e) = result {
        tracing::error!("Pad loop failed: {e}");
        let mut error_screen = ErrorScreen::new()?;
        error_screen.show_error(&format!(
            "Recording Error:\n\n{e}\n\nPlease check your audio configuration and try again."
        ))?;
        error_screen.cleanup()?;
        return Err(e);
    }

    tracing::info!(
        "=== voxpad Pad Closed ({} takes saved this run) ===",
        board.saved().len()
    );
    Ok(())
}

/// The cooperative event loop. Returns when the user quits; the caller owns
/// terminal teardown so errors here can still be shown on an error screen.
fn run_pad_loop(
    config_data: &VoxpadConfig,
    store: &HandleStore,
    board: &mut SessionBoard,
    ui: &mut PadUi,
    stop_flag: &AtomicBool,
) -> Result<(), anyhow::Error> {
    let mut recorder: Option<CaptureController> = None;
    let mut last_tick = Instant::now();
    let mut last_flush = Instant::now();
    let mut frame_count = 0u64;

    loop {
        if stop_flag.swap(false, Ordering::Relaxed) && board.is_recording() {
            tracing::info!("SIGUSR1 received, stopping session");
            finish_session(board, store, &mut recorder)?;
        }

        // The elapsed counter only runs during a session. Advancing by the
        // interval instead of resetting keeps the cadence drift-free.
        if board.is_recording() && last_tick.elapsed() >= Duration::from_secs(1) {
            board.tick();
            last_tick += Duration::from_secs(1);
        }

        let flush_secs = config_data.audio.flush_interval_secs;
        if flush_secs > 0
            && board.is_recording()
            && last_flush.elapsed() >= Duration::from_secs(flush_secs)
        {
            if let Some(rec) = recorder.as_ref() {
                match rec.snapshot(store) {
                    Ok(Some(take)) => {
                        tracing::debug!("Draft refreshed at {:.1}s", take.duration_secs().unwrap_or(0.0));
                        board.draft_from_capture(take);
                    }
                    Ok(None) => {}
                    Err(e) => tracing::warn!("Draft refresh failed: {e}"),
                }
            }
            last_flush = Instant::now();
        }

        frame_count += 1;
        if frame_count.is_multiple_of(60) {
            if let Some(rec) = recorder.as_ref() {
                let secs = rec.sample_count() as f32 / rec.sample_rate() as f32;
                tracing::debug!("Recording: {:.1}s captured", secs);
            }
        }

        match ui.handle_input(board)? {
            PadCommand::Continue => {}
            PadCommand::ToggleRecord => {
                if board.is_recording() {
                    finish_session(board, store, &mut recorder)?;
                } else {
                    let mut rec = CaptureController::new(
                        config_data.audio.sample_rate,
                        config_data.audio.device.clone(),
                    );
                    rec.start()?;
                    board.start_recording();
                    ui.reset_meter();
                    recorder = Some(rec);
                    last_tick = Instant::now();
                    last_flush = Instant::now();
                }
            }
            PadCommand::PlayDraft => {
                if let Some(take) = board.visible_draft() {
                    match play_file(take.path()) {
                        Ok(()) => ui.set_status("Playing draft"),
                        Err(e) => {
                            tracing::warn!("Playback failed: {e}");
                            ui.set_status(format!("Playback failed: {e}"));
                        }
                    }
                }
            }
            PadCommand::SaveDraft => {
                if let Some(id) = board.save_draft() {
                    tracing::info!("Saved take {id}");
                    ui.set_status(format!("Saved take {id}"));
                }
            }
            PadCommand::ExportDraft => {
                if let Some(take) = board.visible_draft() {
                    export_with_status(take, config_data, ui);
                }
            }
            PadCommand::Import(path) => {
                let path = expand_home(&path);
                match import_into_draft(board, store, &path) {
                    Ok(()) => {
                        // A successful import ends any running session; the
                        // board has already left the recording phase, so just
                        // release the device and discard its samples.
                        if recorder.take().is_some() {
                            tracing::info!("Import ended running session");
                        }
                        ui.set_status(format!("Imported {}", path.display()));
                    }
                    Err(e) => ui.show_notice(e.to_string()),
                }
            }
            PadCommand::PlaySelected(id) => {
                if let Some(entry) = board.find_saved(id) {
                    match play_file(entry.take.path()) {
                        Ok(()) => ui.set_status(format!("Playing take {id}")),
                        Err(e) => {
                            tracing::warn!("Playback failed: {e}");
                            ui.set_status(format!("Playback failed: {e}"));
                        }
                    }
                }
            }
            PadCommand::ExportSelected(id) => {
                if let Some(entry) = board.find_saved(id) {
                    export_with_status(&entry.take, config_data, ui);
                }
            }
            PadCommand::DeleteSelected(id) => {
                if board.delete_saved(id) {
                    tracing::info!("Deleted take {id}");
                    ui.set_status(format!("Deleted take {id}"));
                }
            }
            PadCommand::Quit => {
                if board.is_recording() {
                    tracing::info!("Quit during session, releasing capture device");
                }
                // Dropping the controller stops the stream; takes and the
                // scratch directory are released by the caller's drops.
                break;
            }
        }

        ui.render(board, recorder.as_ref())?;
    }

    Ok(())
}

/// Stops the running capture and publishes the result as the draft.
///
/// The board leaves the recording phase even when finishing fails, so a
/// device error cannot wedge the session state.
fn finish_session(
    board: &mut SessionBoard,
    store: &HandleStore,
    recorder: &mut Option<CaptureController>,
) -> Result<(), anyhow::Error> {
    if let Some(rec) = recorder.take() {
        let finished = rec.finish(store);
        board.stop_recording();
        match finished? {
            Some(take) => board.draft_from_capture(take),
            None => tracing::warn!("Session ended with no samples captured"),
        }
    } else {
        board.stop_recording();
    }
    Ok(())
}

/// Copies `path` into the scratch store and offers it to the board as the
/// draft. Non-audio files are rejected by the board and never replace
/// anything.
fn import_into_draft(
    board: &mut SessionBoard,
    store: &HandleStore,
    path: &Path,
) -> Result<(), anyhow::Error> {
    if !path.is_file() {
        return Err(anyhow!("File not found: {}", path.display()));
    }
    let media_type = mime::media_type_of(path);
    let handle = store.adopt_copy(path)?;
    board.draft_from_upload(Take::from_upload(handle, media_type))?;
    Ok(())
}

fn export_with_status(take: &Take, config_data: &VoxpadConfig, ui: &mut PadUi) {
    let dir = config_data.export.resolve_directory();
    match export_take(take, &dir, &config_data.export.filename_stem) {
        Ok(dest) => ui.set_status(format!("Exported to {}", dest.display())),
        Err(e) => {
            tracing::warn!("Export failed: {e}");
            ui.set_status(format!("Export failed: {e}"));
        }
    }
}

/// Expands a leading `~` so shell-less paths typed into the import field work.
fn expand_home(path: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn import_rejects_missing_file() {
        let tmp = TempDir::new().unwrap();
        let store = HandleStore::at(tmp.path().join("scratch")).unwrap();
        let mut board = SessionBoard::new();

        let err = import_into_draft(&mut board, &store, &tmp.path().join("nope.wav"))
            .expect_err("missing file must not import");
        assert!(err.to_string().contains("File not found"));
        assert!(board.visible_draft().is_none());
    }

    #[test]
    fn import_rejects_non_audio_with_alert_text() {
        let tmp = TempDir::new().unwrap();
        let store = HandleStore::at(tmp.path().join("scratch")).unwrap();
        let mut board = SessionBoard::new();

        let notes = tmp.path().join("notes.txt");
        fs::write(&notes, "not audio").unwrap();

        let err = import_into_draft(&mut board, &store, &notes)
            .expect_err("text file must be rejected");
        assert_eq!(err.to_string(), "Please upload a valid audio file.");
        assert!(board.visible_draft().is_none());
    }

    #[test]
    fn import_accepts_audio_file() {
        let tmp = TempDir::new().unwrap();
        let store = HandleStore::at(tmp.path().join("scratch")).unwrap();
        let mut board = SessionBoard::new();

        let clip = tmp.path().join("clip.mp3");
        fs::write(&clip, [0u8; 64]).unwrap();

        import_into_draft(&mut board, &store, &clip).unwrap();
        let draft = board.visible_draft().expect("draft present");
        assert_eq!(draft.media_type(), "audio/mpeg");
    }

    #[test]
    fn expand_home_leaves_absolute_paths_alone() {
        let p = PathBuf::from("/tmp/some/file.wav");
        assert_eq!(expand_home(&p), p);
    }
}
