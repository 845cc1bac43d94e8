//! Markdown rendering for folio.
//!
//! Project and post bodies are stored as markdown. This crate turns them into
//! HTML for detail views and into plain text for excerpts and reading-time
//! estimates.
//!
//! # Example
//!
//! ```
//! use folio_markdown::{reading_time_minutes, to_html};
//!
//! let body = "# Hello\n\nThis is **folio**.";
//! assert!(to_html(body).contains("<strong>folio</strong>"));
//! assert_eq!(reading_time_minutes(body), 1);
//! ```

mod render;
mod stats;

pub use render::{RenderOptions, to_html, to_html_with, to_plain_text};
pub use stats::{WORDS_PER_MINUTE, excerpt, reading_time_minutes, word_count};
