use crate::utils::EMBED_COLOR;
use crate::{Context, Error};
use poise::serenity_prelude as serenity;

/// Get some useful (or not) information about the bot.
#[poise::command(prefix_command, slash_command)]
pub async fn botinfo(ctx: Context<'_>) -> Result<(), Error> {
    log::info!("Botinfo command called by {}", ctx.author().name);

    let cache = ctx.cache();
    let bot_name = cache.current_user().name.clone();
    let guild_ids = cache.guilds();
    let total_users: u64 = guild_ids
        .iter()
        .filter_map(|id| cache.guild(*id).map(|guild| guild.member_count))
        .sum();
    let latency = ctx.ping().await.as_millis();
    let total_commands = ctx.data().live_registry().command_count();

    let embed = serenity::CreateEmbed::new()
        .title(format!("{} - Stats", bot_name))
        .color(EMBED_COLOR)
        .field("Bot Version:", env!("CARGO_PKG_VERSION"), true)
        .field("Ping:", format!("{}ms", latency), true)
        .field("Total Guilds:", guild_ids.len().to_string(), true)
        .field("Total Users:", total_users.to_string(), true)
        .field("Total Commands:", total_commands.to_string(), true)
        .footer(serenity::CreateEmbedFooter::new(format!(
            "Requested by {}",
            ctx.author().name
        )));

    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}
