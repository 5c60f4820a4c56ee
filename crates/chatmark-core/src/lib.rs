//! `chatmark-core` provides the small shared pieces used by the chatmark renderers.
//!
//! ## Design goals
//!
//! - No global state: palettes are plain values passed into each render call.
//! - No async runtime: rendering runs synchronously on the caller's thread.
//! - Link activation is app-controlled: rendered links expose a [`link::LinkAction`] and the
//!   caller plugs in a [`link::UrlOpener`].
pub mod link;
pub mod theme;
