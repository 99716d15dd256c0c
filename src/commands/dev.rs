use crate::error::BotError;
use crate::eval::{evaluate, Value};
use crate::help::Registry;
use crate::utils::{code_block, send_dm, subcommand_lines, EMBED_COLOR, ERROR_COLOR};
use crate::{Context, Error};
use poise::serenity_prelude as serenity;
use serenity::Mentionable;
use std::collections::{HashMap, HashSet};

fn notice(description: impl Into<String>, color: u32) -> poise::CreateReply {
    poise::CreateReply::default().embed(
        serenity::CreateEmbed::new()
            .description(description)
            .color(color),
    )
}

/// Commands for devs
#[poise::command(
    prefix_command,
    slash_command,
    subcommands(
        "sync",
        "unsync",
        "load",
        "unload",
        "reload",
        "shutdown",
        "eval",
        "blacklist",
        "unblacklist"
    )
)]
pub async fn dev(ctx: Context<'_>) -> Result<(), Error> {
    log::info!("Dev command called by {}", ctx.author().name);

    let prefix = ctx.data().prefixes.get(ctx.guild_id());
    let embed = serenity::CreateEmbed::new()
        .title("Help: Dev")
        .description("List of available commands:")
        .color(EMBED_COLOR)
        .field(
            "Commands",
            code_block(&subcommand_lines(ctx.command(), &prefix)),
            false,
        );

    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Global,
    Guild,
}

fn parse_scope(scope: &str) -> Result<Scope, BotError> {
    match scope.trim().to_lowercase().as_str() {
        "global" => Ok(Scope::Global),
        "guild" => Ok(Scope::Guild),
        _ => Err(BotError::InvalidScope),
    }
}

/// Sync the slash commands.
#[poise::command(prefix_command, slash_command, owners_only)]
pub async fn sync(
    ctx: Context<'_>,
    #[description = "The scope of the sync. Can be `global` or `guild`"] scope: String,
) -> Result<(), Error> {
    log::info!("Sync {} requested by {}", scope, ctx.author().name);
    ctx.defer().await?;

    let scope = match parse_scope(&scope) {
        Ok(scope) => scope,
        Err(e) => {
            ctx.send(notice(e.to_string(), ERROR_COLOR)).await?;
            return Ok(());
        }
    };

    let commands = &ctx.framework().options().commands;
    let description = match scope {
        Scope::Global => {
            poise::builtins::register_globally(ctx.serenity_context(), commands).await?;
            "Slash commands have been globally synchronized."
        }
        Scope::Guild => {
            let guild_id = ctx.guild_id().ok_or(BotError::GuildOnly)?;
            poise::builtins::register_in_guild(ctx.serenity_context(), commands, guild_id)
                .await?;
            "Slash commands have been synchronized in this guild."
        }
    };

    ctx.send(notice(description, EMBED_COLOR)).await?;

    Ok(())
}

/// Unsync the slash commands
#[poise::command(prefix_command, slash_command, owners_only)]
pub async fn unsync(
    ctx: Context<'_>,
    #[description = "The scope of the unsync. Can be `global` or `guild`"] scope: String,
) -> Result<(), Error> {
    log::info!("Unsync {} requested by {}", scope, ctx.author().name);
    ctx.defer().await?;

    let scope = match parse_scope(&scope) {
        Ok(scope) => scope,
        Err(e) => {
            ctx.send(notice(e.to_string(), ERROR_COLOR)).await?;
            return Ok(());
        }
    };

    let description = match scope {
        Scope::Global => {
            serenity::Command::set_global_commands(ctx.serenity_context(), Vec::new()).await?;
            "Slash commands have been globally unsynchronized."
        }
        Scope::Guild => {
            let guild_id = ctx.guild_id().ok_or(BotError::GuildOnly)?;
            guild_id
                .set_commands(ctx.serenity_context(), Vec::new())
                .await?;
            "Slash commands have been unsynchronized in this guild."
        }
    };

    ctx.send(notice(description, EMBED_COLOR)).await?;

    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CogAction {
    Load,
    Unload,
    Reload,
}

impl CogAction {
    fn verb(self) -> &'static str {
        match self {
            CogAction::Load => "load",
            CogAction::Unload => "unload",
            CogAction::Reload => "reload",
        }
    }

    /// Updates the unloaded set, returning whether the action applied.
    /// The owner cog hosts these commands and can't be unloaded.
    fn apply(self, registry: &Registry, unloaded: &mut HashSet<String>, cog: &str) -> bool {
        let Some(category) = registry.category_by_module(cog) else {
            return false;
        };
        let module = &category.module;

        match self {
            CogAction::Load => unloaded.remove(module),
            CogAction::Unload => category.name != super::OWNER && unloaded.insert(module.clone()),
            CogAction::Reload => !unloaded.contains(module),
        }
    }
}

async fn run_cog_action(ctx: Context<'_>, action: CogAction, cog: String) -> Result<(), Error> {
    let data = ctx.data();
    let applied = action.apply(&data.registry, &mut data.unloaded.write(), &cog);

    let reply = if applied {
        log::info!("Cog {} {}ed by {}", cog, action.verb(), ctx.author().name);
        notice(
            format!("Successfully {}ed the `{}` cog.", action.verb(), cog),
            EMBED_COLOR,
        )
    } else {
        log::warn!("Could not {} cog {}", action.verb(), cog);
        notice(
            format!("Could not {} the `{}` cog.", action.verb(), cog),
            ERROR_COLOR,
        )
    };

    ctx.send(reply).await?;

    Ok(())
}

/// Load a cog
#[poise::command(prefix_command, slash_command, owners_only)]
pub async fn load(
    ctx: Context<'_>,
    #[description = "The name of the cog to load"] cog: String,
) -> Result<(), Error> {
    run_cog_action(ctx, CogAction::Load, cog).await
}

/// Unloads a cog.
#[poise::command(prefix_command, slash_command, owners_only)]
pub async fn unload(
    ctx: Context<'_>,
    #[description = "The name of the cog to unload"] cog: String,
) -> Result<(), Error> {
    run_cog_action(ctx, CogAction::Unload, cog).await
}

/// Reloads a cog
#[poise::command(prefix_command, slash_command, owners_only)]
pub async fn reload(
    ctx: Context<'_>,
    #[description = "The name of the cog to reload"] cog: String,
) -> Result<(), Error> {
    run_cog_action(ctx, CogAction::Reload, cog).await
}

/// bye
#[poise::command(prefix_command, slash_command, owners_only)]
pub async fn shutdown(ctx: Context<'_>) -> Result<(), Error> {
    log::warn!("Shutdown requested by {}", ctx.author().name);

    ctx.send(notice("Shutting down. Bye! :wave:", EMBED_COLOR))
        .await?;
    ctx.framework().shard_manager().shutdown_all().await;

    Ok(())
}

/// :D
#[poise::command(prefix_command, slash_command, owners_only)]
pub async fn eval(
    ctx: Context<'_>,
    #[description = "Code to evaluate"]
    #[rest]
    cmd: String,
) -> Result<(), Error> {
    log::info!("Eval command called by {}", ctx.author().name);

    let data = ctx.data();
    let uptime = chrono::Utc::now() - data.started_at;
    let bindings = HashMap::from([
        (
            "guilds".to_string(),
            Value::Int(ctx.cache().guilds().len() as i64),
        ),
        (
            "commands".to_string(),
            Value::Int(data.live_registry().command_count() as i64),
        ),
        ("uptime".to_string(), Value::Int(uptime.num_seconds())),
        (
            "latency".to_string(),
            Value::Float(ctx.ping().await.as_secs_f64() * 1000.0),
        ),
    ]);

    let output = match evaluate(&cmd, bindings)? {
        Some(value) => value.to_string(),
        None => "None".to_string(),
    };
    ctx.say(output).await?;

    Ok(())
}

/// Blacklist a user
#[poise::command(prefix_command, slash_command, owners_only)]
pub async fn blacklist(
    ctx: Context<'_>,
    #[description = "The user to blacklist"] user: serenity::User,
    #[description = "Why the user is blacklisted"]
    #[rest]
    reason: Option<String>,
) -> Result<(), Error> {
    let reason = reason.unwrap_or_else(|| "No reason provided".to_string());
    log::info!(
        "{} blacklisted {} ({}): {}",
        ctx.author().name,
        user.name,
        user.id,
        reason
    );

    ctx.data().db.set_blacklist(user.id.get(), Some(&reason))?;

    ctx.say(format!("{} has been blacklisted.", user.name)).await?;

    let embed = serenity::CreateEmbed::new()
        .title("You have been blacklisted from using the bot")
        .description(format!("Reason: {}", reason))
        .color(ERROR_COLOR);
    notify_user(ctx, &user, embed).await
}

/// Unblacklist a user
#[poise::command(prefix_command, slash_command, owners_only)]
pub async fn unblacklist(
    ctx: Context<'_>,
    #[description = "The user to unblacklist"] user: serenity::User,
) -> Result<(), Error> {
    log::info!(
        "{} unblacklisted {} ({})",
        ctx.author().name,
        user.name,
        user.id
    );

    ctx.data().db.set_blacklist(user.id.get(), None)?;

    ctx.say(format!("{} has been unblacklisted.", user.name))
        .await?;

    let embed = serenity::CreateEmbed::new()
        .title("You have been unblacklisted from using the bot")
        .color(EMBED_COLOR);
    notify_user(ctx, &user, embed).await
}

async fn notify_user(
    ctx: Context<'_>,
    user: &serenity::User,
    embed: serenity::CreateEmbed,
) -> Result<(), Error> {
    let message = serenity::CreateMessage::new().embed(embed);
    if let Err(e) = send_dm(ctx.http(), user.id, message).await {
        ctx.say(format!(
            "Could not send message to {} due to: {}",
            user.mention(),
            e
        ))
        .await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::help::registry::tests::sample_registry;

    #[test]
    fn test_parse_scope() {
        assert_eq!(parse_scope("global").unwrap(), Scope::Global);
        assert_eq!(parse_scope(" Guild ").unwrap(), Scope::Guild);
        let err = parse_scope("everywhere").unwrap_err();
        assert_eq!(err.to_string(), "The scope must be `global` or `guild`.");
    }

    #[test]
    fn test_unload_then_load() {
        let registry = sample_registry();
        let mut unloaded = HashSet::new();

        assert!(CogAction::Unload.apply(&registry, &mut unloaded, "general"));
        assert!(unloaded.contains("general"));
        // already unloaded
        assert!(!CogAction::Unload.apply(&registry, &mut unloaded, "general"));
        assert!(!CogAction::Reload.apply(&registry, &mut unloaded, "general"));

        assert!(CogAction::Load.apply(&registry, &mut unloaded, "General"));
        assert!(unloaded.is_empty());
        assert!(!CogAction::Load.apply(&registry, &mut unloaded, "general"));
        assert!(CogAction::Reload.apply(&registry, &mut unloaded, "general"));
    }

    #[test]
    fn test_unknown_cog() {
        let registry = sample_registry();
        let mut unloaded = HashSet::new();
        for action in [CogAction::Load, CogAction::Unload, CogAction::Reload] {
            assert!(!action.apply(&registry, &mut unloaded, "music"));
        }
        assert!(unloaded.is_empty());
    }

    #[test]
    fn test_owner_cog_stays_loaded() {
        let registry = sample_registry();
        let mut unloaded = HashSet::new();
        assert!(!CogAction::Unload.apply(&registry, &mut unloaded, "owner"));
        assert!(CogAction::Reload.apply(&registry, &mut unloaded, "owner"));
    }
}
