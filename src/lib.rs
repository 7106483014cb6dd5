//! dqchat is a terminal front end for a remote data-quality agent.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`api`] defines the backend wire types and the [`api::gateway::ApiGateway`]
//!   contract with its HTTP implementation.
//! - [`core`] owns the session: status machine, append-only conversation log,
//!   response interpretation, quick actions, and configuration.
//! - [`ui`] renders messages and their artifacts as terminal text and runs the
//!   interactive loop.
//! - [`commands`] implements slash-command parsing used by the chat loop.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`], which resolves configuration and dispatches
//! into one-shot commands or [`ui::chat_loop`] for interactive sessions.

pub mod api;
pub mod cli;
pub mod commands;
pub mod core;
pub mod ui;
pub mod utils;
