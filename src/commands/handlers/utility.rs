//! Fixed-reply utility commands
//!
//! Handles: ping
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::info;
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::model::application::interaction::InteractionResponseType;
use serenity::prelude::Context;

use crate::commands::handler::SlashCommandHandler;

pub const PING_REPLY: &str = "Pong!";

/// Literal reply for a fixed-reply command, if `name` is one
pub fn fixed_reply(name: &str) -> Option<&'static str> {
    match name {
        "ping" => Some(PING_REPLY),
        _ => None,
    }
}

pub struct UtilityHandler;

#[async_trait]
impl SlashCommandHandler for UtilityHandler {
    fn command_names(&self) -> &'static [&'static str] {
        &["ping"]
    }

    async fn handle(
        &self,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let name = command.data.name.as_str();
        let reply = fixed_reply(name).ok_or_else(|| anyhow!("No fixed reply for /{name}"))?;

        command
            .create_interaction_response(&serenity_ctx.http, |response| {
                response
                    .kind(InteractionResponseType::ChannelMessageWithSource)
                    .interaction_response_data(|message| message.content(reply))
            })
            .await?;

        info!("/{name} completed for user {}", command.user.id);
        Ok(())
    }
}
