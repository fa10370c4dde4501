//! Microphone capture and playback for the pad.

pub mod audio;
pub mod playback;

pub use audio::CaptureController;
pub use playback::play_file;
