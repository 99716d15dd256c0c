use crate::error::HelpError;
use crate::help::{render_command, CategoryListing, CategoryPicker, CommandView, Selection};
use crate::utils::{code_block, EMBED_COLOR};
use crate::{Context, Error};
use poise::serenity_prelude as serenity;

/// Get help with commands
///
/// Without an argument, shows a menu of command categories. With a command
/// name (subcommands as `group sub`), shows that command's details.
#[poise::command(prefix_command, slash_command, aliases("h", "commands", "cmds"))]
pub async fn help(
    ctx: Context<'_>,
    #[description = "Command to show details for"]
    #[rest]
    command: Option<String>,
) -> Result<(), Error> {
    log::info!("Help command called by {}", ctx.author().name);

    match command.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        Some(command_name) => show_command_help(ctx, command_name).await,
        None => show_category_picker(ctx).await,
    }
}

async fn show_command_help(ctx: Context<'_>, command_name: &str) -> Result<(), Error> {
    let registry = ctx.data().live_registry();
    let owners = &ctx.framework().options().owners;

    match render_command(&registry, command_name, ctx.author().id, owners) {
        Ok(view) => {
            ctx.send(poise::CreateReply::default().embed(command_embed(&view)))
                .await?;
        }
        Err(e) => {
            ctx.say(e.to_string()).await?;
        }
    }

    Ok(())
}

fn command_embed(view: &CommandView) -> serenity::CreateEmbed {
    view.fields.iter().fold(
        serenity::CreateEmbed::new()
            .title(&view.title)
            .description(&view.description)
            .color(EMBED_COLOR),
        |embed, field| embed.field(&field.name, &field.value, field.inline),
    )
}

fn listing_embed(listing: &CategoryListing, prefix: &str) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title(format!("Help: {}", listing.category))
        .description("List of available commands:")
        .color(EMBED_COLOR)
        .field(&listing.category, code_block(&listing.body()), false)
        .footer(serenity::CreateEmbedFooter::new(format!(
            "To get more info on a command, use {prefix}help <command>"
        )))
}

/// The chosen option of a string select, if the interaction carries one
fn selected_value(kind: &serenity::ComponentInteractionDataKind) -> Option<String> {
    match kind {
        serenity::ComponentInteractionDataKind::StringSelect { values } => values.first().cloned(),
        _ => None,
    }
}

fn ephemeral(content: impl Into<String>) -> serenity::CreateInteractionResponse {
    serenity::CreateInteractionResponse::Message(
        serenity::CreateInteractionResponseMessage::new()
            .content(content)
            .ephemeral(true),
    )
}

async fn show_category_picker(ctx: Context<'_>) -> Result<(), Error> {
    let data = ctx.data();
    let mut picker = CategoryPicker::new(
        ctx.id(),
        &data.live_registry(),
        ctx.author().id,
        &ctx.framework().options().owners,
        data.config.picker_timeout,
    );

    if picker.categories().is_empty() {
        ctx.say("No command categories are available right now.").await?;
        return Ok(());
    }

    let options = picker
        .options()
        .into_iter()
        .map(|(label, description)| {
            serenity::CreateSelectMenuOption::new(label.clone(), label).description(description)
        })
        .collect();
    let menu = serenity::CreateSelectMenu::new(
        picker.custom_id(),
        serenity::CreateSelectMenuKind::String { options },
    )
    .placeholder("Choose a cog...")
    .min_values(1)
    .max_values(1);

    let reply = ctx
        .send(
            poise::CreateReply::default()
                .content("Pick a cog:")
                .components(vec![serenity::CreateActionRow::SelectMenu(menu)]),
        )
        .await?;
    let mut message = reply.into_message().await?;
    picker.bind(message.id);

    loop {
        let custom_id = picker.custom_id().to_string();
        let mut collector = serenity::ComponentInteractionCollector::new(ctx.serenity_context())
            .message_id(message.id)
            .filter(move |press| press.data.custom_id == custom_id);
        if let Some(timeout) = picker.timeout() {
            collector = collector.timeout(timeout);
        }

        let Some(press) = collector.await else {
            picker.expire();
            log::debug!(
                "Help picker {} on message {:?} expired",
                picker.custom_id(),
                picker.message()
            );
            message
                .edit(
                    ctx.serenity_context(),
                    serenity::EditMessage::new().components(Vec::new()),
                )
                .await?;
            break;
        };

        let Some(chosen) = selected_value(&press.data.kind) else {
            press
                .create_response(
                    ctx.serenity_context(),
                    serenity::CreateInteractionResponse::Acknowledge,
                )
                .await?;
            continue;
        };

        let prefix = data.prefixes.get(press.guild_id);
        match picker.on_select(press.user.id, &chosen, &data.live_registry(), &prefix) {
            Selection::Denied => {
                log::info!(
                    "{} tried to use a help picker owned by {}",
                    press.user.name,
                    picker.owner()
                );
                press
                    .create_response(
                        ctx.serenity_context(),
                        ephemeral(HelpError::Unauthorized.to_string()),
                    )
                    .await?;
            }
            Selection::Missing(category) => {
                press
                    .create_response(
                        ctx.serenity_context(),
                        ephemeral(format!("Category `{category}` not found")),
                    )
                    .await?;
            }
            Selection::Resolved(listing) => {
                press
                    .create_response(
                        ctx.serenity_context(),
                        serenity::CreateInteractionResponse::Acknowledge,
                    )
                    .await?;
                message
                    .edit(
                        ctx.serenity_context(),
                        serenity::EditMessage::new()
                            .content("")
                            .embed(listing_embed(&listing, &prefix))
                            .components(Vec::new()),
                    )
                    .await?;
                break;
            }
            Selection::Inactive => break,
        }
    }
    log::debug!("Help picker {} finished: {:?}", picker.custom_id(), picker.state());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::help::registry::tests::sample_registry;
    use std::collections::HashSet;

    #[test]
    fn test_command_embed_builds_from_view() {
        let owners: HashSet<serenity::UserId> = HashSet::new();
        let view =
            render_command(&sample_registry(), "translate", serenity::UserId::new(5), &owners)
                .unwrap();
        assert_eq!(view.title, "Command: translate");
        assert_eq!(view.fields.len(), 5);
        // building the embed must not panic on multi-line values
        let _ = command_embed(&view);
    }

    #[test]
    fn test_listing_embed() {
        let listing = CategoryListing {
            category: "General".to_string(),
            lines: vec![";ping - Check if the bot is alive.".to_string()],
        };
        let _ = listing_embed(&listing, ";");
        assert_eq!(listing.body(), ";ping - Check if the bot is alive.");
    }

    #[test]
    fn test_selected_value() {
        let select = serenity::ComponentInteractionDataKind::StringSelect {
            values: vec!["⬜ General".to_string()],
        };
        assert_eq!(selected_value(&select).as_deref(), Some("⬜ General"));

        let empty = serenity::ComponentInteractionDataKind::StringSelect { values: Vec::new() };
        assert_eq!(selected_value(&empty), None);
        assert_eq!(selected_value(&serenity::ComponentInteractionDataKind::Button), None);
    }
}
