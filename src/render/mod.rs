//! Output rendering: sorted-key JSON and the atomic file write.

pub mod json;

pub use json::{parse_json, render_json, write_atomic};
