//! Board domain module.

mod aggregate;

pub use aggregate::{validate_name, Board, SystemBoard, MAX_NAME_LENGTH, SYSTEM_BOARDS};
