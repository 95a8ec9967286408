//! # Command System
//!
//! Slash command (/) handling, separate from the chat message pipeline.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

pub mod handler;
pub mod handlers;
pub mod registry;
pub mod slash;

pub use handler::SlashCommandHandler;
pub use handlers::utility::{fixed_reply, PING_REPLY};
pub use registry::CommandRegistry;
pub use slash::{create_slash_commands, register_global_commands, register_guild_commands};
