//! Media type detection for imported files.
//!
//! Files arrive as bare paths, so the declared media type is derived from the
//! file extension, the same way desktop file pickers label their selections.
//! The pad only cares whether a file declares itself as audio; everything else
//! is rejected before it reaches the draft slot.

use std::ffi::OsStr;
use std::path::Path;

/// Returns the declared media type for a file path based on its extension.
///
/// Unknown or missing extensions map to `application/octet-stream`.
pub fn media_type_of(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(OsStr::to_str)
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("wav" | "wave") => "audio/wav",
        Some("mp3") => "audio/mpeg",
        Some("ogg" | "oga") => "audio/ogg",
        Some("opus") => "audio/opus",
        Some("flac") => "audio/flac",
        Some("m4a") => "audio/mp4",
        Some("aac") => "audio/aac",
        Some("aif" | "aiff") => "audio/aiff",
        Some("wma") => "audio/x-ms-wma",
        Some("weba") => "audio/webm",
        Some("mka") => "audio/x-matroska",
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",
        Some("mkv") => "video/x-matroska",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("txt") => "text/plain",
        Some("md") => "text/markdown",
        Some("json") => "application/json",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}

/// Returns true if the declared media type is any audio type.
pub fn is_audio(media_type: &str) -> bool {
    media_type.starts_with("audio/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_audio_extensions() {
        assert_eq!(media_type_of(Path::new("memo.wav")), "audio/wav");
        assert_eq!(media_type_of(Path::new("song.MP3")), "audio/mpeg");
        assert_eq!(media_type_of(Path::new("/tmp/clip.flac")), "audio/flac");
        assert_eq!(media_type_of(Path::new("voice.m4a")), "audio/mp4");
    }

    #[test]
    fn test_non_audio_extensions() {
        assert_eq!(media_type_of(Path::new("notes.txt")), "text/plain");
        assert_eq!(media_type_of(Path::new("cover.png")), "image/png");
        assert_eq!(media_type_of(Path::new("talk.mp4")), "video/mp4");
    }

    #[test]
    fn test_unknown_and_missing_extensions() {
        assert_eq!(
            media_type_of(Path::new("mystery.xyz")),
            "application/octet-stream"
        );
        assert_eq!(
            media_type_of(Path::new("no_extension")),
            "application/octet-stream"
        );
        assert_eq!(
            media_type_of(&PathBuf::from("trailing.")),
            "application/octet-stream"
        );
    }

    #[test]
    fn test_is_audio_prefix_match() {
        assert!(is_audio("audio/wav"));
        assert!(is_audio("audio/x-matroska"));
        assert!(!is_audio("video/webm"));
        assert!(!is_audio("text/plain"));
        assert!(!is_audio("application/octet-stream"));
    }
}
