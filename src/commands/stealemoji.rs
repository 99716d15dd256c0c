use crate::error::BotError;
use crate::{Context, Error};
use base64::Engine;
use poise::serenity_prelude as serenity;

/// CDN location of a custom emoji's image
fn emoji_url(emoji: &serenity::EmojiIdentifier) -> String {
    let extension = if emoji.animated { "gif" } else { "png" };
    format!(
        "https://cdn.discordapp.com/emojis/{}.{}",
        emoji.id, extension
    )
}

fn data_uri(bytes: &[u8], animated: bool) -> String {
    let mime = if animated { "image/gif" } else { "image/png" };
    format!(
        "data:{};base64,{}",
        mime,
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

async fn steal(
    ctx: Context<'_>,
    emoji: &serenity::EmojiIdentifier,
    name: &str,
) -> Result<String, Error> {
    let guild_id = ctx.guild_id().ok_or(BotError::GuildOnly)?;
    let url = emoji_url(emoji);

    let response = reqwest::get(&url).await?;
    if !response.status().is_success() {
        return Err(format!("Failed to download emoji: HTTP {}", response.status()).into());
    }
    let bytes = response.bytes().await?;

    let created = guild_id
        .create_emoji(ctx.http(), name, &data_uri(&bytes, emoji.animated))
        .await?;
    log::info!(
        "Emoji {} ({}) yoinked by {} into guild {}",
        created.name,
        created.id,
        ctx.author().name,
        guild_id
    );

    Ok(url)
}

/// Steal an emoji from another server.
#[poise::command(
    prefix_command,
    slash_command,
    guild_only,
    required_permissions = "MANAGE_EMOJIS_AND_STICKERS",
    required_bot_permissions = "MANAGE_EMOJIS_AND_STICKERS"
)]
pub async fn stealemoji(
    ctx: Context<'_>,
    #[description = "The custom emoji to steal"] emoji: String,
    #[description = "Name for the new emoji"] name: String,
) -> Result<(), Error> {
    log::info!("Stealemoji command called by {}", ctx.author().name);

    let Some(emoji) = serenity::parse_emoji(&emoji) else {
        ctx.say(format!("`{}` is not a custom emoji", emoji)).await?;
        return Ok(());
    };
    match steal(ctx, &emoji, &name).await {
        Ok(url) => {
            let embed = serenity::CreateEmbed::new()
                .description("Emoji Stolen")
                .color(rand::random::<u32>() & 0xFFFFFF)
                .image(url);
            ctx.send(poise::CreateReply::default().embed(embed)).await?;
        }
        Err(e) => {
            log::warn!("Failed to steal emoji {}: {}", emoji.id, e);
            ctx.say(e.to_string()).await?;
        }
    }

    Ok(())
}
