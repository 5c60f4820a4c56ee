//! Markdown rendering for chat message content.
//!
//! Rendering is a pipeline of pure functions:
//!
//! 1. [`token::tokenize`]: markdown source to an immutable [`token::TokenTree`].
//! 2. [`block::render_blocks`]: block tokens to [`block::BlockNode`]s, using
//!    [`inline::render_inline`] for inline content.
//! 3. [`document::RenderedMarkdown`]: the root container, which can be materialized into a
//!    ratatui `Text` and exposes pressable links.
//!
//! Most callers only need [`render_markdown`], which never fails.
pub mod block;
pub mod document;
pub mod error;
pub mod inline;
pub mod options;
pub mod token;

pub use document::MarkdownDocument;
pub use document::RenderedMarkdown;
pub use document::render_markdown;
pub use error::ParseError;
