use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use dotenvy::dotenv;
#[cfg(not(target_env = "msvc"))]
use jemallocator::Jemalloc;
use serenity::all::CreateInteractionResponse;
use serenity::all::CreateInteractionResponseMessage;
use serenity::all::GuildId;
use serenity::async_trait;
use serenity::model::{id::ChannelId, prelude::Interaction};
use serenity::prelude::*;
use tracing::{error, info};
use tracing_subscriber::{filter, prelude::*, Layer};

use crate::cache::ReferenceCache;
use crate::matches::MatchStore;
use crate::monitor::MonitorRegistry;
use crate::notify::Notifier;
use crate::rank::RankStore;
use crate::riot_api::RiotClient;
use crate::twitter::SocialClient;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod cache;
mod commands;
mod db;
mod matches;
mod models;
mod monitor;
mod notify;
mod rank;
mod riot_api;
mod streak;
mod twitter;

#[derive(Debug, Clone)]
pub struct Config {
    pub riot_api_token: String,
    pub discord_bot_token: String,
    pub lol_channel_id: ChannelId,
    pub discord_guild_id: GuildId,
    pub twitter_bearer_token: Option<String>,
    pub log_path: PathBuf,
    pub db_path: PathBuf,
}

fn load_config() -> Result<Config> {
    dotenv().ok();

    let riot_api_token = env::var("RIOT_API_TOKEN").context("Missing RIOT_API_TOKEN")?;
    let discord_bot_token = env::var("DISCORD_BOT_TOKEN").context("Missing DISCORD_BOT_TOKEN")?;

    let lol_channel_id_u64 = env::var("LOL_CHANNEL_ID")
        .context("Missing LOL_CHANNEL_ID")?
        .parse::<u64>()
        .context("Invalid LOL_CHANNEL_ID (must be u64)")?;
    let lol_channel_id = ChannelId::from(lol_channel_id_u64);

    let discord_guild_id_u64 = env::var("DISCORD_GUILD_ID")
        .context("Missing DISCORD_GUILD_ID")?
        .parse::<u64>()
        .context("Invalid DISCORD_GUILD_ID (must be u64)")?;
    let discord_guild_id = GuildId::from(discord_guild_id_u64);

    // Tweet mirroring is optional; notifications still go to Discord.
    let twitter_bearer_token = env::var("TWITTER_BEARER_TOKEN").ok();

    let log_path_str = env::var("LOG_PATH").unwrap_or_else(|_| {
        if cfg!(target_os = "linux") {
            "/var/logs/discord"
        } else {
            "."
        }
        .to_string()
    });
    let log_path = PathBuf::from(log_path_str);

    let db_path_str = env::var("DB_PATH").unwrap_or_else(|_| "sqlite.db".to_string());
    let db_path = PathBuf::from(db_path_str);

    Ok(Config {
        riot_api_token,
        discord_bot_token,
        lol_channel_id,
        discord_guild_id,
        twitter_bearer_token,
        log_path,
        db_path,
    })
}

/// Everything the monitors and commands share: configuration, the Riot
/// client, the in-memory stores, and the notification sinks. Built once at
/// startup and passed around behind an Arc.
pub struct Bot {
    pub config: Config,
    pub riot: RiotClient,
    pub cache: ReferenceCache,
    pub match_store: MatchStore,
    pub rank_store: RankStore,
    pub monitors: MonitorRegistry,
    pub notifier: Notifier,
}

struct Handler {
    bot: Arc<Bot>,
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: serenity::prelude::Context, _data: serenity::model::prelude::Ready) {
        info!("Ready event received");

        match GuildId::set_commands(
            self.bot.config.discord_guild_id,
            &ctx.http,
            vec![commands::lol_rank::register(), commands::dice::register()],
        )
        .await
        {
            Ok(_) => {}
            Err(e) => error!("Ran into error while trying to set up commands: {}", e),
        };

        // Every registered player gets a monitor as soon as the gateway is up.
        monitor::start_all(&self.bot).await;
    }

    async fn interaction_create(&self, ctx: serenity::prelude::Context, interaction: Interaction) {
        if let Interaction::Command(command) = interaction {
            info!(
                "Received command interaction: {}",
                command.data.name.as_str()
            );

            let (content, ephemeral) = match command.data.name.as_str() {
                "lol_rank" => (
                    commands::lol_rank::run(&ctx, &command.data.options, self.bot.clone()).await,
                    false,
                ),
                "dice" => commands::dice::run(&command.data.options),
                _ => ("not implemented :(".to_string(), false),
            };

            if let Err(why) = command
                .create_response(
                    &ctx.http,
                    CreateInteractionResponse::Message(
                        CreateInteractionResponseMessage::new()
                            .content(content)
                            .ephemeral(ephemeral),
                    ),
                )
                .await
            {
                info!("Cannot respond to slash command: {}", why);
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config().context("Failed to load configuration")?;

    std::panic::set_hook(Box::new(|i| {
        error!("Panic'd: {}", i);
    }));

    let file_appender = tracing_appender::rolling::daily(&config.log_path, "server.log");
    let (non_blocking_appender, _guard) = tracing_appender::non_blocking(file_appender);
    let console_layer = console_subscriber::ConsoleLayer::builder()
        .server_addr(([0, 0, 0, 0], 5555))
        .spawn();

    tracing_subscriber::registry()
        .with(console_layer)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking_appender)
                .with_filter(filter::filter_fn(|metadata| {
                    metadata.target().starts_with("lol_rank_bot")
                })),
        )
        .init();

    db::init_db(&config.db_path).context("Failed to initialize the player registry")?;

    let http_client = reqwest::Client::builder()
        .use_rustls_tls()
        .connection_verbose(true)
        // A hung remote must never hold a request open forever; monitors
        // treat the timeout like any other failed call.
        .timeout(std::time::Duration::from_secs(30))
        .build()?;
    let discord_client = Arc::new(
        serenity::http::HttpBuilder::new(&config.discord_bot_token)
            .ratelimiter_disabled(true)
            .client(http_client.clone())
            .build(),
    );

    let riot = RiotClient::new(http_client.clone(), config.riot_api_token.clone());
    let social = SocialClient::new(http_client, config.twitter_bearer_token.clone());
    let notifier = Notifier::new(discord_client, config.lol_channel_id, social);

    let bot = Arc::new(Bot {
        riot,
        cache: ReferenceCache::new(),
        match_store: MatchStore::new(),
        rank_store: RankStore::new(),
        monitors: MonitorRegistry::new(),
        notifier,
        config,
    });

    let intents = GatewayIntents::non_privileged()
        | GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES;

    let handler = Handler { bot: bot.clone() };
    let mut client = Client::builder(&bot.config.discord_bot_token, intents)
        .event_handler(handler)
        .await
        .context("Error creating Discord client")?;

    client
        .start()
        .await
        .map_err(|e| anyhow!("Discord client error: {}", e))
}
