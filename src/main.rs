use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use poise::serenity_prelude as serenity;
use serenity::{Client, GatewayIntents};
use std::collections::HashSet;

mod commands;
mod config;
mod db;
mod error;
mod eval;
mod help;
mod prefixes;
mod translator;
mod utils;

use config::Config;
use db::Database;
use error::BotError;
use help::Registry;
use prefixes::PrefixStore;
use translator::Translator;

type Error = Box<dyn std::error::Error + Send + Sync>;
type Context<'a> = poise::Context<'a, Data, Error>;

// User data, which is stored and accessible in all command invocations
pub struct Data {
    pub config: Config,
    pub db: Database,
    pub prefixes: PrefixStore,
    pub translator: Translator,
    /// Every registered cog, loaded or not
    pub registry: Registry,
    /// Module keys of cogs disabled with `dev unload`
    pub unloaded: RwLock<HashSet<String>>,
    pub started_at: DateTime<Utc>,
}

impl Data {
    /// Registry view without unloaded cogs
    pub fn live_registry(&self) -> Registry {
        self.registry.without_modules(&self.unloaded.read())
    }

    pub fn is_loaded(&self, module: &str) -> bool {
        !self.unloaded.read().contains(module)
    }
}

async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    // This is our global error handler
    match error {
        poise::FrameworkError::Setup { error, .. } => panic!("Failed to start bot: {:?}", error),
        poise::FrameworkError::Command { error, ctx, .. } => {
            log::error!(
                "Error in command `{}`: {:?}",
                ctx.command().qualified_name,
                error
            );
            if let Err(e) = ctx.say(format!("❌ {}", error)).await {
                log::error!("Failed to report command error: {}", e);
            }
        }
        poise::FrameworkError::CommandCheckFailed {
            error: Some(error),
            ctx,
            ..
        } => {
            log::info!(
                "Check rejected `{}` for {}: {}",
                ctx.command().qualified_name,
                ctx.author().name,
                error
            );
            if let Err(e) = ctx.say(error.to_string()).await {
                log::error!("Failed to report check failure: {}", e);
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                log::error!("Error while handling error: {}", e)
            }
        }
    }
}

/// Runs before every command: blacklisted users and unloaded cogs are rejected
async fn command_check(ctx: Context<'_>) -> Result<bool, Error> {
    let data = ctx.data();
    let author = ctx.author().id;

    if !ctx.framework().options().owners.contains(&author) {
        if let Some(reason) = data.db.blacklist_reason(author.get()) {
            return Err(BotError::Blacklisted { reason }.into());
        }
    }

    let category = ctx
        .command()
        .category
        .as_deref()
        .and_then(|name| data.registry.category(name));
    if let Some(category) = category {
        if !data.is_loaded(&category.module) {
            log::debug!(
                "Ignoring `{}`: cog `{}` is unloaded",
                ctx.command().qualified_name,
                category.module
            );
            return Ok(false);
        }
    }

    Ok(true)
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logger
    env_logger::init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let (db, prefixes) = match Database::open(&config.data_dir).and_then(|db| {
        let prefixes = PrefixStore::open(
            config.data_dir.join("prefixes.json"),
            &config.default_prefix,
        )?;
        Ok((db, prefixes))
    }) {
        Ok(stores) => stores,
        Err(e) => {
            log::error!("Failed to open data directory: {}", e);
            std::process::exit(1);
        }
    };

    log::info!("Default prefix is `{}`", prefixes.default_prefix());

    let cogs = commands::cogs();
    let registry = Registry::new(cogs.iter().map(commands::Cog::category).collect());
    let commands: Vec<_> = cogs.into_iter().flat_map(|cog| cog.commands).collect();
    log::info!(
        "Registered {} commands in {} cogs",
        registry.command_count(),
        registry.walk_categories().count()
    );

    // Set gateway intents
    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let token = config.token.clone();
    let owners = config.owners.clone();
    let data = Data {
        config,
        db,
        prefixes,
        translator: Translator::new(reqwest::Client::new()),
        registry,
        unloaded: RwLock::new(HashSet::new()),
        started_at: Utc::now(),
    };

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands,
            owners,
            initialize_owners: true,
            prefix_options: poise::PrefixFrameworkOptions {
                dynamic_prefix: Some(|ctx| {
                    Box::pin(async move { Ok(Some(ctx.data.prefixes.get(ctx.guild_id))) })
                }),
                ..Default::default()
            },
            on_error: |error| Box::pin(on_error(error)),
            command_check: Some(|ctx| Box::pin(command_check(ctx))),
            pre_command: |ctx| {
                Box::pin(async move {
                    log::info!("Executing command {}...", ctx.command().qualified_name);
                })
            },
            post_command: |ctx| {
                Box::pin(async move {
                    log::info!("Executed command {}!", ctx.command().qualified_name);
                })
            },
            ..Default::default()
        })
        .setup(move |_ctx, ready, _framework| {
            Box::pin(async move {
                log::info!("Logged in as {}", ready.user.name);
                log::info!("Slash commands are registered with the `dev sync` command");
                Ok(data)
            })
        })
        .build();

    let mut client = match Client::builder(&token, intents).framework(framework).await {
        Ok(client) => client,
        Err(e) => {
            log::error!("Error creating client: {:?}", e);
            std::process::exit(1);
        }
    };

    // Start the bot
    log::info!("Starting bot...");
    if let Err(why) = client.start().await {
        log::error!("Client error: {:?}", why);
    }
}
