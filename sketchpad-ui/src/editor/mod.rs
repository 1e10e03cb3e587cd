// Editor module for the sketchpad UI.

pub mod canvas;
pub mod cursor;
pub mod input;

pub use canvas::CanvasView;
pub use cursor::paint_cursor;
pub use input::{shortcuts, TouchTranslator};
