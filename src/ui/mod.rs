//! Terminal presentation for chat sessions.
//!
//! - [`render`]: the artifact dispatch trait every renderer implements.
//! - [`text`]: plain-text rendering with display-width aware tables and charts.
//! - [`chat_loop`]: the interactive loop that feeds input to
//!   [`crate::commands`] and the session, then prints what was logged.
//!
//! Ownership boundary: this layer presents and captures interaction state, while
//! [`crate::core`] owns the session, its status and its log.

pub mod chat_loop;
pub mod render;
pub mod text;
