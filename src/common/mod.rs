//! Common utilities: errors, configuration, logging, paths

pub mod config;
pub mod error;
pub mod logging;
pub mod paths;

pub use error::{Error, Result};

/// Truncate `text` to at most `max_chars` characters, marking the cut with `...`
///
/// Works on characters rather than bytes so a multi-byte sequence is never split.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
