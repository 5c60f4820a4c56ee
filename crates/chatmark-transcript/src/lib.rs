//! Chat transcripts: role-labelled messages whose content is rendered as Markdown.
//!
//! ```
//! use chatmark_transcript::transcript::*;
//!
//! let messages = [ChatMessage::user("hello"), ChatMessage::assistant("**hi**")];
//! let styles = TranscriptStyles::default();
//! let rendered = render_transcript(&messages, &styles, &TranscriptOptions::default());
//! assert_eq!(rendered.len(), 2);
//! assert_eq!(chat_title("hello"), "hello...");
//! ```

pub mod transcript;
