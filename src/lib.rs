//! Fluke Engine: fill-in-the-blank story templates.
//!
//! A story template is a title and body containing numbered placeholders
//! (`{1}`, `{2}`, ...) plus one prompt per placeholder. An author builds
//! templates in an [`EditorSession`](core::session::EditorSession); a player
//! answers the prompts in a [`PlayerSession`](core::player::PlayerSession)
//! and the answers are substituted into the text.

pub mod config;
pub mod core;
pub mod schema;
pub mod store;
