use crate::error::BotError;
use crate::prefixes::validate_prefix;
use crate::{Context, Error};

/// Change the bot prefix
#[poise::command(prefix_command, guild_only, required_permissions = "MANAGE_CHANNELS")]
pub async fn prefix(
    ctx: Context<'_>,
    #[description = "The new prefix"] prefix: Option<String>,
) -> Result<(), Error> {
    log::info!("Prefix command called by {}", ctx.author().name);

    let guild_id = ctx.guild_id().ok_or(BotError::GuildOnly)?;
    let store = &ctx.data().prefixes;

    let Some(prefix) = prefix else {
        ctx.say(format!("Current prefix is: `{}`", store.get(Some(guild_id))))
            .await?;
        return Ok(());
    };

    if let Err(reason) = validate_prefix(&prefix) {
        ctx.say(reason).await?;
        return Ok(());
    }

    store.set(guild_id, &prefix)?;
    log::info!("Prefix for guild {} set to {}", guild_id, prefix);
    ctx.say(format!("Prefix set to {}", prefix)).await?;

    Ok(())
}
