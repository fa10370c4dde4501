//! The pad session: board state plus its terminal UI.

pub mod board;
pub mod ui;

pub use board::{Phase, SavedTake, SessionBoard, TakeId, UploadRejected};
pub use ui::{PadCommand, PadUi};
