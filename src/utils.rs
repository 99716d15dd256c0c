use poise::serenity_prelude as serenity;

/// Accent colour for regular embeds
pub const EMBED_COLOR: u32 = 0xBEBEFE;
/// Colour for failures and punitive notices
pub const ERROR_COLOR: u32 = 0xE02B2B;

/// Wraps text in a Discord code block
pub fn code_block(text: &str) -> String {
    format!("```{text}```")
}

pub fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or("")
}

/// `HH:MM:SS`, hours not wrapped at a day
pub fn format_uptime(uptime: chrono::Duration) -> String {
    let secs = uptime.num_seconds().max(0);
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

/// `<prefix><group> <name> - <first description line>` for every subcommand
pub fn subcommand_lines<U, E>(group: &poise::Command<U, E>, prefix: &str) -> String {
    group
        .subcommands
        .iter()
        .map(|sub| {
            format!(
                "{}{} {} - {}",
                prefix,
                group.name,
                sub.name,
                first_line(sub.description.as_deref().unwrap_or(""))
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Send a direct message to a user
pub async fn send_dm(
    http: &serenity::Http,
    user_id: serenity::UserId,
    message: serenity::CreateMessage,
) -> Result<(), serenity::Error> {
    log::info!("Attempting to send DM to user {}", user_id);

    let channel = user_id.create_dm_channel(http).await.map_err(|e| {
        log::warn!("Failed to create DM channel with {}: {}", user_id, e);
        e
    })?;

    channel.id.send_message(http, message).await.map_err(|e| {
        log::warn!("Failed to send DM to {}: {}", user_id, e);
        e
    })?;

    log::info!("Successfully sent DM to user {}", user_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_block() {
        assert_eq!(code_block("None"), "```None```");
    }

    #[test]
    fn test_first_line() {
        assert_eq!(first_line("Set log channel\nMore details"), "Set log channel");
        assert_eq!(first_line(""), "");
    }

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(chrono::Duration::seconds(0)), "00:00:00");
        assert_eq!(format_uptime(chrono::Duration::seconds(3725)), "01:02:05");
        assert_eq!(format_uptime(chrono::Duration::hours(49)), "49:00:00");
        assert_eq!(format_uptime(chrono::Duration::seconds(-5)), "00:00:00");
    }
}
