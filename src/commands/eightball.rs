use crate::utils::EMBED_COLOR;
use crate::{Context, Error};
use poise::serenity_prelude as serenity;
use rand::seq::SliceRandom;

const ANSWERS: &[&str] = &[
    "It is certain.",
    "It is decidedly so.",
    "You may rely on it.",
    "Without a doubt.",
    "Yes - definitely.",
    "As I see, yes.",
    "Most likely.",
    "Outlook good.",
    "Yes.",
    "Signs point to yes.",
    "Reply hazy, try again.",
    "Ask again later.",
    "Better not tell you now.",
    "Cannot predict now.",
    "Concentrate and ask again later.",
    "Don't count on it.",
    "My reply is no.",
    "My sources say no.",
    "Outlook not so good.",
    "Very doubtful.",
];

fn pick_answer() -> &'static str {
    ANSWERS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or("Ask again later.")
}

/// Ask any question to the bot.
#[poise::command(prefix_command, slash_command, rename = "8ball")]
pub async fn eight_ball(
    ctx: Context<'_>,
    #[description = "The question you want to ask."]
    #[rest]
    question: String,
) -> Result<(), Error> {
    log::info!("8ball command called by {}", ctx.author().name);

    let embed = serenity::CreateEmbed::new()
        .title("**My Answer:**")
        .description(pick_answer())
        .color(EMBED_COLOR)
        .footer(serenity::CreateEmbedFooter::new(format!(
            "The question was: {}",
            question
        )));

    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answers_come_from_list() {
        for _ in 0..100 {
            assert!(ANSWERS.contains(&pick_answer()));
        }
    }

    #[test]
    fn test_answer_list_is_complete() {
        assert_eq!(ANSWERS.len(), 20);
        assert!(ANSWERS.iter().all(|a| a.ends_with('.')));
    }
}
