use crate::utils::EMBED_COLOR;
use crate::{Context, Error};
use poise::serenity_prelude as serenity;

/// Check if the bot is alive.
#[poise::command(prefix_command, slash_command)]
pub async fn ping(ctx: Context<'_>) -> Result<(), Error> {
    log::info!("Ping command called by {}", ctx.author().name);

    // Shard heartbeat latency; zero until the first heartbeat is acknowledged
    let latency = ctx.ping().await.as_millis();

    let embed = serenity::CreateEmbed::new()
        .title("🏓 Pong!")
        .description(format!("The bot latency is {}ms.", latency))
        .color(EMBED_COLOR);

    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}
