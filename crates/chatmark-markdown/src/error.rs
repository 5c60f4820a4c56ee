use thiserror::Error;

/// Reasons markdown source could not be turned into a token tree.
///
/// [`crate::document::render_markdown`] never surfaces these; it logs them and renders an error
/// block instead. Use [`crate::document::MarkdownDocument::parse`] to observe them directly.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("markdown source is {len} bytes, over the limit of {limit} bytes")]
    InputTooLarge { len: usize, limit: usize },

    #[error("markdown parser panicked: {0}")]
    Panicked(String),
}

pub type Result<T> = std::result::Result<T, ParseError>;
