use anyhow::Result;
use dotenvy::dotenv;
use log::{debug, error, info};
use serenity::async_trait;
use serenity::model::application::interaction::{Interaction, InteractionResponseType};
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::model::id::GuildId;
use serenity::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

use mechamaru::commands::{register_global_commands, register_guild_commands, CommandRegistry};
use mechamaru::core::{chunk_for_message, Config};
use mechamaru::features::Dispatcher;

struct Handler {
    dispatcher: Arc<Dispatcher>,
    registry: CommandRegistry,
    guild_id: Option<GuildId>,
}

impl Handler {
    async fn send_reply(ctx: &Context, msg: &Message, reply: &str, request_id: Uuid) {
        for (index, chunk) in chunk_for_message(reply).iter().enumerate() {
            let sent = if index == 0 {
                msg.reply(&ctx.http, chunk).await
            } else {
                msg.channel_id.say(&ctx.http, chunk).await
            };
            if let Err(why) = sent {
                error!("[{request_id}] ❌ Failed to send reply chunk {}: {why}", index + 1);
                return;
            }
        }
        info!("[{request_id}] ✅ Reply sent ({} chars)", reply.len());
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }

        let request_id = Uuid::new_v4();
        let bot_user_id = ctx.cache.current_user_id();
        let bot_id = bot_user_id.to_string();
        let author_id = msg.author.id.to_string();
        let scope_id = msg.channel_id.to_string();

        debug!(
            "[{request_id}] 📥 Message | User: {} | Channel: {scope_id} | Content: '{}'",
            msg.author.name,
            msg.content.chars().take(100).collect::<String>()
        );

        // Reply pings and @everyone only show up in the mention metadata
        let mentioned = msg.mention_everyone || msg.mentions_user_id(bot_user_id);
        let intent = self
            .dispatcher
            .classify(&msg.content, &author_id, &bot_id, mentioned);

        // Provider calls can take seconds (longer with retries)
        let _typing = if self.dispatcher.calls_provider(&intent) {
            msg.channel_id.start_typing(&ctx.http).ok()
        } else {
            None
        };

        let reply = self
            .dispatcher
            .respond(&scope_id, intent, &msg.author.name)
            .await;

        match reply {
            Some(reply) => Self::send_reply(&ctx, &msg, &reply, request_id).await,
            None => debug!("[{request_id}] ℹ️ Message ignored (not addressed to the bot)"),
        }
    }

    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("🎉 Logged in as {} - Mechamaru persona ready.", ready.user.tag());
        info!("📡 Connected to {} guilds", ready.guilds.len());

        if let Some(guild_id) = self.guild_id {
            info!("🔧 Development mode: Registering commands for guild {guild_id}");
            if let Err(e) = register_guild_commands(&ctx, guild_id).await {
                error!("❌ Failed to register guild slash commands: {e}");
            }
        } else {
            info!("🌍 Production mode: Registering commands globally");
            if let Err(e) = register_global_commands(&ctx).await {
                error!("❌ Failed to register global slash commands: {e}");
            }
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let Interaction::ApplicationCommand(command) = interaction else {
            return;
        };

        if let Err(e) = self.registry.dispatch(&ctx, &command).await {
            error!("Error handling slash command '{}': {e}", command.data.name);
            let _ = command
                .create_interaction_response(&ctx.http, |response| {
                    response
                        .kind(InteractionResponseType::ChannelMessageWithSource)
                        .interaction_response_data(|message| {
                            message.content("...My strings are tangled. Try again.")
                        })
                })
                .await;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting Mechamaru Discord Bot...");

    let dispatcher = Arc::new(Dispatcher::from_config(&config)?);

    let guild_id = config
        .discord_guild_id
        .as_ref()
        .and_then(|id| id.parse::<u64>().ok())
        .map(GuildId);

    let handler = Handler {
        dispatcher,
        registry: CommandRegistry::with_defaults(),
        guild_id,
    };

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(handler)
        .await
        .map_err(|e| anyhow::anyhow!("Client creation failed: {}", e))?;

    info!("Establishing WebSocket connection to Discord gateway...");

    if let Err(why) = client.start().await {
        error!("Gateway connection failed: {why:?}");
        return Err(anyhow::anyhow!(
            "Failed to establish gateway connection: {}",
            why
        ));
    }

    Ok(())
}
