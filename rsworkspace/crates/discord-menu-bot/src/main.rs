//! Discord reaction-menu bot
//!
//! Hosts one emoji-reaction menu on a Discord message: keeps the bot's own
//! reactions in line with the configured options, routes users' votes to the
//! option callbacks and removes votes the menu does not accept.

mod client;
mod config;
mod errors;
mod handlers;
mod health;
mod hub;
mod options;

use anyhow::{Context as _, Result};
use clap::Parser;
use reaction_menu::{Menu, MessageRef, UserId};
use serenity::builder::CreateMessage;
use serenity::model::gateway::GatewayIntents;
use serenity::model::id::ChannelId;
use serenity::prelude::*;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::client::SerenityReactionClient;
use crate::config::{Config, SystemEnv};
use crate::handlers::Handler;
use crate::health::AppState;
use crate::hub::ReactionHub;

/// Discord reaction-menu bot CLI
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/discord-menu-bot.toml")]
    config: String,

    /// Discord bot token (overrides config file)
    #[arg(long, env = "DISCORD_BOT_TOKEN")]
    bot_token: Option<String>,

    /// Channel holding the menu message (overrides config file)
    #[arg(long, env = "MENU_CHANNEL_ID")]
    channel_id: Option<u64>,

    /// Existing menu message (overrides config file)
    #[arg(long, env = "MENU_MESSAGE_ID")]
    message_id: Option<u64>,

    /// Health check server port
    #[arg(long, env = "HEALTH_CHECK_PORT", default_value = "3001")]
    health_port: u16,
}

impl Args {
    fn apply(self, config: &mut Config) {
        if let Some(bot_token) = self.bot_token {
            config.discord.bot_token = bot_token;
        }
        if let Some(channel_id) = self.channel_id {
            config.menu.channel_id = channel_id;
        }
        if let Some(message_id) = self.message_id {
            config.menu.message_id = Some(message_id);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "discord_menu_bot=debug,reaction_menu=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Discord reaction-menu bot");

    let args = Args::parse();
    let health_port = args.health_port;

    let mut config = if std::path::Path::new(&args.config).exists() {
        info!("Loading config from file: {}", args.config);
        Config::from_file(&args.config)?
    } else {
        info!("Config file not found, loading from environment");
        Config::from_env(&SystemEnv)?
    };
    args.apply(&mut config);
    config.validate()?;
    if config.discord.bot_token.is_empty() {
        anyhow::bail!("No Discord bot token configured");
    }

    for w in config.menu.warnings() {
        warn!("Menu config: {}", w);
    }

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGE_REACTIONS
        | GatewayIntents::DIRECT_MESSAGE_REACTIONS;

    let mut client = Client::builder(&config.discord.bot_token, intents)
        .event_handler(Handler)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create Discord client: {}", e))?;

    let hub = ReactionHub::new();
    let health_state = AppState::new();
    {
        let mut data = client.data.write().await;
        data.insert::<ReactionHub>(hub.clone());
        data.insert::<AppState>(health_state.clone());
    }

    let health_state_clone = health_state.clone();
    tokio::spawn(async move {
        if let Err(e) = health::start_health_server(health_state_clone, health_port).await {
            error!("Health server error: {}", e);
        }
    });

    let http = client.http.clone();
    let me = http
        .get_current_user()
        .await
        .context("Failed to fetch the bot user")?;
    let me = UserId(me.id.get());

    let channel = ChannelId::new(config.menu.channel_id);
    let message_id = match config.menu.message_id {
        Some(id) => id,
        None => {
            let posted = channel
                .send_message(&*http, CreateMessage::new().content(config.menu.render()))
                .await
                .context("Failed to post the menu message")?;
            info!("Posted menu message {} in channel {}", posted.id, channel);
            posted.id.get()
        }
    };
    let message = MessageRef::new(config.menu.channel_id, message_id);

    let (menu_options, default) = options::build(&config.menu);
    let (menu, running) = Menu::new(
        SerenityReactionClient::new(http, hub, me),
        me,
        message,
        menu_options,
        default,
    );
    health_state.set_menu(message).await;

    if let Some(initial_pass) = menu.take_initial_pass() {
        tokio::spawn(async move {
            match initial_pass.await {
                Ok(Ok(outcome)) => info!(
                    "Menu {} ready ({} reactions added)",
                    message,
                    outcome.added.len()
                ),
                Ok(Err(e)) => warn!("Menu {} started without converging: {}", message, e),
                Err(_) => warn!("Menu {} stopped before its first pass", message),
            }
        });
    }

    let menu_state = health_state.clone();
    tokio::spawn(async move {
        match running.await {
            Ok(Ok(())) => info!("Menu {} stopped", message),
            Ok(Err(e)) => error!("Menu {} failed: {}", message, e),
            Err(e) => error!("Menu {} task failed: {}", message, e),
        }
        menu_state.set_menu_stopped().await;
    });

    // Graceful shutdown: close all shards on SIGTERM or Ctrl+C.
    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    tokio::select! {
                        _ = tokio::signal::ctrl_c() => {}
                        _ = sigterm.recv() => {}
                    }
                }
                Err(e) => {
                    warn!("SIGTERM handler unavailable: {}", e);
                    tokio::signal::ctrl_c().await.ok();
                }
            }
        }
        #[cfg(not(unix))]
        {
            tokio::signal::ctrl_c().await.ok();
        }
        info!("Shutdown signal received, stopping Discord client...");
        shard_manager.shutdown_all().await;
    });

    info!("Starting Discord gateway connection...");

    client
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("Discord client error: {}", e))?;

    info!("Discord bot stopped");
    Ok(())
}
