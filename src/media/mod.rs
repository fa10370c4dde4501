//! Audio media handling: scratch storage, takes, type detection and export.

pub mod export;
pub mod handle;
pub mod mime;
pub mod take;

pub use export::export_take;
pub use handle::{AudioHandle, HandleStore};
pub use take::Take;
