//! voxpad: a terminal voice-memo pad.
//!
//! Record memos from the microphone, review the current draft, then keep it
//! in a saved-take list or export it as a file. Existing audio files can be
//! imported as drafts alongside fresh recordings.

pub mod app;
pub mod commands;
pub mod config;
pub mod logging;
pub mod media;
pub mod recording;
pub mod session;
pub mod setup;
pub mod ui;
