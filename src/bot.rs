use std::sync::Arc;

use anyhow::{Context as _, Result};
use serenity::all::{Client, Context, EventHandler, GatewayIntents, Message, Ready, UserId};
use serenity::async_trait;
use tracing::{error, info};

use crate::commands::{self, ParsedCommand};
use crate::config::Config;
use crate::keywords;
use crate::llm::CompletionClient;
use crate::responder;
use crate::rng::Roller;

const TRIGGER_WORD: &str = "ping";
const PONG_REPLY: &str = "Pong! 🏓";
const MENTION_ERROR_REPLY: &str =
    "⚠️ エラーが発生しました。しばらくしてからもう一度お試しください。";

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub completion: CompletionClient,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let completion = CompletionClient::new(config.api.clone());
        Self { config, completion }
    }
}

/// Terminal routing decision for one inbound message; checked in priority
/// order, first match wins, at most one reply per message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Authored by a bot: drop without any visible side effect.
    Ignore,
    /// The bare trigger word.
    Pong,
    /// Starts with the command prefix (matching a known name or not).
    Command,
    /// The bot is mentioned somewhere in the text.
    Mention,
    /// Non-empty direct message without prefix or mention.
    SmallTalk,
    /// Everything else: no reply.
    Silent,
}

pub fn classify(
    text: &str,
    author_is_bot: bool,
    mentions_bot: bool,
    is_dm: bool,
    prefix: char,
) -> Route {
    if author_is_bot {
        return Route::Ignore;
    }
    if text.to_lowercase() == TRIGGER_WORD {
        return Route::Pong;
    }
    if text.starts_with(prefix) {
        return Route::Command;
    }
    if mentions_bot {
        return Route::Mention;
    }
    if is_dm && !text.trim().is_empty() {
        return Route::SmallTalk;
    }
    Route::Silent
}

/// Remove every mention token addressing the bot and trim the remainder.
pub fn strip_mentions(text: &str, bot_id: UserId) -> String {
    text.replace(&format!("<@{}>", bot_id), "")
        .replace(&format!("<@!{}>", bot_id), "")
        .trim()
        .to_string()
}

struct Handler {
    state: Arc<AppState>,
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!("Connected to the gateway as {}", ready.user.name);
    }

    async fn message(&self, ctx: Context, msg: Message) {
        let bot_id = ctx.cache.current_user().id;
        let mentions_bot = msg.mentions.iter().any(|user| user.id == bot_id);
        let route = classify(
            &msg.content,
            msg.author.bot,
            mentions_bot,
            msg.guild_id.is_none(),
            self.state.config.command_prefix,
        );

        match route {
            Route::Ignore | Route::Silent => {}
            Route::Pong => {
                info!("Ping from {}", msg.author.tag());
                if let Err(e) = msg.channel_id.say(&ctx.http, PONG_REPLY).await {
                    error!("Failed to send pong reply: {}", e);
                }
            }
            Route::Command => self.handle_command(&ctx, &msg).await,
            Route::Mention => {
                // Boundary for the whole mention path: any fault becomes one
                // fixed user-visible error reply, never silence.
                if let Err(e) = self.handle_mention(&ctx, &msg, bot_id).await {
                    error!("Mention handler failed: {:#}", e);
                    msg.reply(&ctx.http, MENTION_ERROR_REPLY).await.ok();
                }
            }
            Route::SmallTalk => {
                let reply = keywords::respond(&msg.content, &mut Roller::new());
                if let Err(e) = msg.channel_id.say(&ctx.http, reply).await {
                    error!("Failed to send small-talk reply: {}", e);
                }
            }
        }
    }
}

impl Handler {
    async fn handle_command(&self, ctx: &Context, msg: &Message) {
        let Some(cmd) = ParsedCommand::parse(&msg.content, self.state.config.command_prefix)
        else {
            return;
        };
        info!("Command '{}' from {}", cmd.name, msg.author.tag());

        let mut roller = Roller::new();
        match commands::dispatch(ctx, msg, &cmd, &mut roller).await {
            Ok(Some(reply)) => {
                if let Err(e) = msg.channel_id.say(&ctx.http, reply).await {
                    error!("Failed to send command reply: {}", e);
                }
            }
            Ok(None) => {}
            Err(e) => error!("Command '{}' failed: {:#}", cmd.name, e),
        }
    }

    async fn handle_mention(&self, ctx: &Context, msg: &Message, bot_id: UserId) -> Result<()> {
        let text = strip_mentions(&msg.content, bot_id);
        info!("Mention from {}: {}", msg.author.tag(), text);

        // The indicator goes out before the completion call begins.
        msg.channel_id.broadcast_typing(&ctx.http).await.ok();

        let reply = responder::resolve(&self.state.completion, &text).await;
        msg.reply(&ctx.http, reply).await?;
        Ok(())
    }
}

/// Connect to the gateway and block until all shards stop.
pub async fn run(state: Arc<AppState>) -> Result<()> {
    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let mut client = Client::builder(&state.config.discord_token, intents)
        .event_handler(Handler {
            state: Arc::clone(&state),
        })
        .await
        .context("Failed to create Discord client")?;

    // Graceful shutdown: close all shards on Ctrl+C so the session is
    // released and the process exits zero.
    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Shutdown signal received, stopping gateway connection...");
        shard_manager.shutdown_all().await;
    });

    client
        .start()
        .await
        .context("Discord client error")?;

    info!("Gateway connection closed");
    Ok(())
}
