pub mod clock;
pub mod config;
pub mod conversation;
pub mod interpreter;
pub mod message;
pub mod quick_actions;
pub mod session;
pub mod status;
