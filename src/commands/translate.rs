use crate::utils::EMBED_COLOR;
use crate::{Context, Error};
use poise::serenity_prelude as serenity;

/// Translate text into another language
///
/// The source language is detected automatically. The target defaults to English.
#[poise::command(prefix_command, slash_command)]
pub async fn translate(
    ctx: Context<'_>,
    #[description = "The text you want to translate."] text: String,
    #[description = "The language code to translate into, e.g. es or zh-CN."]
    language: Option<String>,
) -> Result<(), Error> {
    log::info!("Translate command called by {}", ctx.author().name);

    let language = language.unwrap_or_else(|| "en".to_string());
    ctx.defer().await?;

    let translated = ctx.data().translator.translate(&text, &language).await?;

    let embed = serenity::CreateEmbed::new()
        .title("Translation")
        .description(format!(
            "**Original text:**\n{}\n\n**Translated text:**\n{}",
            text, translated
        ))
        .color(EMBED_COLOR)
        .footer(serenity::CreateEmbedFooter::new(format!(
            "Translated to {}",
            language
        )));

    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}
