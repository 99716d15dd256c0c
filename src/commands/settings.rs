use crate::db::GuildDocument;
use crate::error::BotError;
use crate::utils::{code_block, subcommand_lines, EMBED_COLOR};
use crate::{Context, Error};
use poise::serenity_prelude as serenity;
use serenity::Mentionable;

/// Command to change server settings
#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    aliases("setting"),
    required_permissions = "MANAGE_CHANNELS",
    subcommands("show", "daily_cash", "log_channel")
)]
pub async fn settings(ctx: Context<'_>) -> Result<(), Error> {
    log::info!("Settings command called by {}", ctx.author().name);

    let prefix = ctx.data().prefixes.get(ctx.guild_id());
    let embed = serenity::CreateEmbed::new()
        .title("Help: Settings")
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

fn log_channel_value(doc: &GuildDocument) -> String {
    match doc.log_channel {
        0 => "None".to_string(),
        id => serenity::ChannelId::new(id).mention().to_string(),
    }
}

/// Show server settings
#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    required_permissions = "MANAGE_CHANNELS"
)]
pub async fn show(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(BotError::GuildOnly)?;
    let doc = ctx
        .data()
        .db
        .guilds
        .find_or_insert(guild_id.get(), GuildDocument::template)?;

    let embed = serenity::CreateEmbed::new()
        .title("Server Settings")
        .color(serenity::Colour::BLUE)
        .field("Daily Cash", doc.daily_cash.to_string(), true)
        .field("Log Channel", log_channel_value(&doc), true);

    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}

/// Set daily cash amount
#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    rename = "daily-cash",
    required_permissions = "ADMINISTRATOR"
)]
pub async fn daily_cash(
    ctx: Context<'_>,
    #[description = "Amount of cash handed out daily"] amount: i64,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(BotError::GuildOnly)?;
    ctx.data().db.guilds.upsert_with(
        guild_id.get(),
        GuildDocument::template,
        |doc| doc.daily_cash = amount,
    )?;

    log::info!("Daily cash for guild {} set to {}", guild_id, amount);
    ctx.say(format!("Set daily cash to {}", amount)).await?;

    Ok(())
}

/// Set log channel
#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    rename = "log-channel",
    required_permissions = "MANAGE_CHANNELS"
)]
pub async fn log_channel(
    ctx: Context<'_>,
    #[description = "Channel to send logs to"] channel: serenity::GuildChannel,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(BotError::GuildOnly)?;
    ctx.data().db.guilds.upsert_with(
        guild_id.get(),
        GuildDocument::template,
        |doc| doc.log_channel = channel.id.get(),
    )?;

    log::info!("Log channel for guild {} set to {}", guild_id, channel.id);
    ctx.say(format!("Set log channel to {}", channel.mention()))
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_channel_value() {
        let mut doc = GuildDocument::template(1);
        assert_eq!(log_channel_value(&doc), "None");
        doc.log_channel = 42;
        assert_eq!(log_channel_value(&doc), "<#42>");
    }
}
