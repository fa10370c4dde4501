//! A take: one piece of recorded or imported audio with its metadata.

use crate::media::handle::AudioHandle;
use crate::media::mime;
use chrono::{DateTime, Local};
use std::path::Path;

/// One audio take, either captured from the microphone or imported from disk.
///
/// The take owns its audio through the [`AudioHandle`]; when the take is
/// dropped the backing file goes with it.
#[derive(Debug)]
pub struct Take {
    handle: AudioHandle,
    media_type: String,
    duration_secs: Option<f32>,
    created_at: DateTime<Local>,
}

impl Take {
    /// Wraps a capture-produced WAV handle with a known duration.
    pub fn from_capture(handle: AudioHandle, duration_secs: f32) -> Self {
        Self {
            handle,
            media_type: "audio/wav".to_string(),
            duration_secs: Some(duration_secs),
            created_at: Local::now(),
        }
    }

    /// Wraps an imported file handle.
    ///
    /// The media type is whatever the source declared; it is not verified
    /// against the file contents. Duration is probed for WAV files and left
    /// unknown for other containers.
    pub fn from_upload(handle: AudioHandle, media_type: impl Into<String>) -> Self {
        let duration_secs = probe_wav_duration(handle.path());
        Self {
            handle,
            media_type: media_type.into(),
            duration_secs,
            created_at: Local::now(),
        }
    }

    /// The owning audio handle.
    pub fn handle(&self) -> &AudioHandle {
        &self.handle
    }

    /// Path to the playable audio file.
    pub fn path(&self) -> &Path {
        self.handle.path()
    }

    /// Declared media type, e.g. `audio/wav`.
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// True if the declared media type is audio.
    pub fn is_audio(&self) -> bool {
        mime::is_audio(&self.media_type)
    }

    /// Duration in seconds, when known.
    pub fn duration_secs(&self) -> Option<f32> {
        self.duration_secs
    }

    /// Local time the take entered the pad.
    pub fn created_at(&self) -> DateTime<Local> {
        self.created_at
    }

    /// Short human-readable description for list rows and logs.
    pub fn describe(&self) -> String {
        match self.duration_secs {
            Some(secs) => format!("{} ({:.1}s)", self.media_type, secs),
            None => self.media_type.clone(),
        }
    }
}

/// Reads the duration of a WAV file from its header.
///
/// Returns `None` for anything hound cannot parse, which covers every
/// non-WAV container.
fn probe_wav_duration(path: &Path) -> Option<f32> {
    let reader = hound::WavReader::open(path).ok()?;
    let spec = reader.spec();
    if spec.sample_rate == 0 {
        return None;
    }
    Some(reader.duration() as f32 / spec.sample_rate as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::handle::HandleStore;
    use tempfile::TempDir;

    #[test]
    fn test_capture_take_is_wav_audio() {
        let dir = TempDir::new().unwrap();
        let store = HandleStore::at(dir.path().join("scratch")).unwrap();

        let handle = store.create_wav(&[0i16; 1600], 16000).unwrap();
        let take = Take::from_capture(handle, 0.1);

        assert_eq!(take.media_type(), "audio/wav");
        assert!(take.is_audio());
        assert_eq!(take.duration_secs(), Some(0.1));
    }

    #[test]
    fn test_upload_take_probes_wav_duration() {
        let dir = TempDir::new().unwrap();
        let store = HandleStore::at(dir.path().join("scratch")).unwrap();

        // One second of silence at 16kHz.
        let wav_handle = store.create_wav(&vec![0i16; 16000], 16000).unwrap();
        let take = Take::from_upload(wav_handle, "audio/wav");

        let secs = take.duration_secs().unwrap();
        assert!((secs - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_upload_take_unknown_duration_for_non_wav() {
        let dir = TempDir::new().unwrap();
        let store = HandleStore::at(dir.path().join("scratch")).unwrap();

        let source = dir.path().join("memo.mp3");
        std::fs::write(&source, b"mp3 bytes").unwrap();
        let handle = store.adopt_copy(&source).unwrap();
        let take = Take::from_upload(handle, "audio/mpeg");

        assert_eq!(take.duration_secs(), None);
        assert!(take.is_audio());
        assert_eq!(take.describe(), "audio/mpeg");
    }

    #[test]
    fn test_non_audio_upload_reports_not_audio() {
        let dir = TempDir::new().unwrap();
        let store = HandleStore::at(dir.path().join("scratch")).unwrap();

        let source = dir.path().join("notes.txt");
        std::fs::write(&source, b"hello").unwrap();
        let handle = store.adopt_copy(&source).unwrap();
        let take = Take::from_upload(handle, "text/plain");

        assert!(!take.is_audio());
    }
}
