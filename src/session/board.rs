//! Session board: the single-screen state behind the voice-memo pad.
//!
//! The board tracks three things and nothing else: whether a recording
//! session is running (and for how many whole seconds), the one draft take
//! waiting for review, and the ordered list of saved takes. All audio and
//! device concerns live elsewhere; the board is plain state that a hosting
//! loop drives.

use crate::media::{mime, Take};
use chrono::Local;
use std::fmt;

/// Lifecycle phase of the pad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing recording, no draft waiting.
    Idle,
    /// A recording session is running; `elapsed_secs` counts whole seconds
    /// since it started.
    Recording { elapsed_secs: u32 },
    /// A draft take is waiting to be saved, replayed or discarded.
    DraftReady,
}

/// Identifier for a saved take.
///
/// Ids are derived from the wall clock at save time (milliseconds since the
/// Unix epoch) and bumped past the previous id when two saves land in the
/// same millisecond, so they are unique and strictly increasing within a
/// pad run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TakeId(pub i64);

impl fmt::Display for TakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A take that has been committed to the saved list.
#[derive(Debug)]
pub struct SavedTake {
    pub id: TakeId,
    pub take: Take,
}

/// Error returned when an imported file is not audio.
///
/// The display text is the exact message shown to the user.
#[derive(Debug)]
pub struct UploadRejected {
    media_type: String,
}

impl UploadRejected {
    /// The declared media type that failed the audio gate.
    pub fn media_type(&self) -> &str {
        &self.media_type
    }
}

impl fmt::Display for UploadRejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Please upload a valid audio file.")
    }
}

impl std::error::Error for UploadRejected {}

/// State of one pad run.
pub struct SessionBoard {
    phase: Phase,
    draft: Option<Take>,
    saved: Vec<SavedTake>,
    last_id: i64,
}

impl SessionBoard {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            draft: None,
            saved: Vec::new(),
            last_id: 0,
        }
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// True while a recording session is running.
    pub fn is_recording(&self) -> bool {
        matches!(self.phase, Phase::Recording { .. })
    }

    /// Whole seconds since the current recording session started, zero when
    /// not recording.
    pub fn elapsed_secs(&self) -> u32 {
        match self.phase {
            Phase::Recording { elapsed_secs } => elapsed_secs,
            _ => 0,
        }
    }

    /// Begins a recording session with the timer at zero.
    ///
    /// Ignored if a session is already running; the running session and its
    /// elapsed time are untouched.
    pub fn start_recording(&mut self) {
        if self.is_recording() {
            tracing::debug!("Start ignored: session already recording");
            return;
        }
        self.phase = Phase::Recording { elapsed_secs: 0 };
        tracing::debug!("Recording session started");
    }

    /// Advances the session timer by one second. No effect outside recording.
    pub fn tick(&mut self) {
        if let Phase::Recording { elapsed_secs } = &mut self.phase {
            *elapsed_secs = elapsed_secs.saturating_add(1);
        }
    }

    /// Ends the recording session.
    ///
    /// The next phase depends on whether a draft has already been delivered:
    /// capture delivery and session stop may land in either order, and the
    /// board converges on the same state for both.
    pub fn stop_recording(&mut self) {
        if !self.is_recording() {
            return;
        }
        self.phase = if self.draft.is_some() {
            Phase::DraftReady
        } else {
            Phase::Idle
        };
        tracing::debug!("Recording session stopped");
    }

    /// Installs a capture-produced take as the draft, replacing any previous
    /// draft (whose audio is released).
    ///
    /// While the session is still recording the draft stays hidden; the
    /// phase moves to [`Phase::DraftReady`] only once recording has stopped.
    pub fn draft_from_capture(&mut self, take: Take) {
        tracing::debug!("Draft from capture: {}", take.describe());
        self.draft = Some(take);
        if !self.is_recording() {
            self.phase = Phase::DraftReady;
        }
    }

    /// Installs an imported take as the draft after checking the audio gate.
    ///
    /// A successful import always ends any running recording session: the
    /// imported audio becomes the reviewable draft immediately. A rejected
    /// import changes nothing and the offered take (and its audio) is
    /// dropped.
    ///
    /// # Errors
    /// Returns [`UploadRejected`] when the declared media type is not audio.
    pub fn draft_from_upload(&mut self, take: Take) -> Result<(), UploadRejected> {
        if !mime::is_audio(take.media_type()) {
            tracing::info!("Import rejected: declared type {}", take.media_type());
            return Err(UploadRejected {
                media_type: take.media_type().to_string(),
            });
        }
        tracing::debug!("Draft from import: {}", take.describe());
        self.draft = Some(take);
        self.phase = Phase::DraftReady;
        Ok(())
    }

    /// The draft take, hidden while a recording session is running.
    pub fn visible_draft(&self) -> Option<&Take> {
        if self.is_recording() {
            None
        } else {
            self.draft.as_ref()
        }
    }

    /// Moves the visible draft to the end of the saved list.
    ///
    /// Returns the new take's id, or `None` when there is nothing to save
    /// (no draft, or the draft is hidden behind a running session).
    pub fn save_draft(&mut self) -> Option<TakeId> {
        if self.is_recording() {
            return None;
        }
        let take = self.draft.take()?;
        let id = self.next_id();
        tracing::info!("Saved take {}: {}", id, take.describe());
        self.saved.push(SavedTake { id, take });
        self.phase = Phase::Idle;
        Some(id)
    }

    /// Saved takes in insertion order.
    pub fn saved(&self) -> &[SavedTake] {
        &self.saved
    }

    /// Looks up a saved take by id.
    pub fn find_saved(&self, id: TakeId) -> Option<&SavedTake> {
        self.saved.iter().find(|s| s.id == id)
    }

    /// Removes a saved take by id, releasing its audio.
    ///
    /// Returns true if a take was removed. The relative order of the
    /// remaining takes is preserved.
    pub fn delete_saved(&mut self, id: TakeId) -> bool {
        let before = self.saved.len();
        self.saved.retain(|s| s.id != id);
        let removed = self.saved.len() != before;
        if removed {
            tracing::info!("Deleted take {}", id);
        }
        removed
    }

    /// Next id: the current wall clock in milliseconds, bumped past the
    /// previous id when saves land in the same millisecond.
    fn next_id(&mut self) -> TakeId {
        let now = Local::now().timestamp_millis();
        let id = if now > self.last_id {
            now
        } else {
            self.last_id + 1
        };
        self.last_id = id;
        TakeId(id)
    }
}

impl Default for SessionBoard {
    fn default() -> Self {
        Self::new()
    }
}
