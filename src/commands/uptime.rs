use crate::utils::format_uptime;
use crate::{Context, Error};

/// Get the bot's uptime
#[poise::command(prefix_command)]
pub async fn uptime(ctx: Context<'_>) -> Result<(), Error> {
    log::info!("Uptime command called by {}", ctx.author().name);

    let uptime = chrono::Utc::now() - ctx.data().started_at;
    ctx.say(format!("Uptime: {}", format_uptime(uptime))).await?;

    Ok(())
}
