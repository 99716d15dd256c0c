use crate::utils::{send_dm, EMBED_COLOR};
use crate::{Context, Error};
use poise::serenity_prelude as serenity;
use serenity::Mentionable;

/// talk
#[poise::command(prefix_command, owners_only)]
pub async fn say(
    ctx: Context<'_>,
    #[description = "What to say"]
    #[rest]
    message: String,
) -> Result<(), Error> {
    log::info!("Say command called by {}", ctx.author().name);

    ctx.channel_id().say(ctx.http(), message).await?;

    Ok(())
}

/// say smth in embed
#[poise::command(prefix_command, owners_only)]
pub async fn embed(
    ctx: Context<'_>,
    #[description = "Embed description"] description: Option<String>,
    #[description = "Embed title"] title: Option<String>,
    #[description = "Embed footer"] footer: Option<String>,
) -> Result<(), Error> {
    log::info!("Embed command called by {}", ctx.author().name);

    let embed = serenity::CreateEmbed::new()
        .title(title.unwrap_or_default())
        .description(description.unwrap_or_default())
        .color(EMBED_COLOR)
        .footer(serenity::CreateEmbedFooter::new(footer.unwrap_or_default()));

    ctx.channel_id()
        .send_message(ctx.http(), serenity::CreateMessage::new().embed(embed))
        .await?;

    Ok(())
}

/// Reply to a message
#[poise::command(prefix_command, owners_only)]
pub async fn reply(
    ctx: Context<'_>,
    #[description = "Message to reply to (link or channel_id-message_id)"]
    message: serenity::Message,
    #[description = "Reply text"]
    #[rest]
    reply: String,
) -> Result<(), Error> {
    log::info!(
        "Reply command called by {} for message {}",
        ctx.author().name,
        message.id
    );

    message.reply(ctx.http(), reply).await?;

    Ok(())
}

/// DM a user
#[poise::command(prefix_command, owners_only)]
pub async fn dm(
    ctx: Context<'_>,
    #[description = "User to message"] user: serenity::User,
    #[description = "Message to send"]
    #[rest]
    message: String,
) -> Result<(), Error> {
    log::info!("DM command called by {} for {}", ctx.author().name, user.name);

    let reply = match send_dm(
        ctx.http(),
        user.id,
        serenity::CreateMessage::new().content(message),
    )
    .await
    {
        Ok(()) => format!("Sent message to {}", user.mention()),
        Err(e) => format!("Could not send message to {} due to: {}", user.mention(), e),
    };
    ctx.say(reply).await?;

    Ok(())
}
