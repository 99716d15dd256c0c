use crate::error::BotError;
use url::Url;

const ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

/// Client for the public Google Translate endpoint, source language detected
/// automatically.
pub struct Translator {
    client: reqwest::Client,
}

impl Translator {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub async fn translate(&self, text: &str, target: &str) -> Result<String, BotError> {
        let target = normalize_language(target)?;
        let url = request_url(text, &target)?;

        log::debug!("Translating {} chars to {}", text.len(), target);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| BotError::Translation(e.to_string()))?;

        if !response.status().is_success() {
            return Err(BotError::Translation(format!(
                "translation service returned {}",
                response.status()
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| BotError::Translation(e.to_string()))?;

        parse_response(&body)
            .ok_or_else(|| BotError::Translation("unexpected response format".to_string()))
    }
}

/// Lowercases a language code like `en` or `zh-CN`, rejecting anything else
pub fn normalize_language(code: &str) -> Result<String, BotError> {
    let code = code.trim();
    let valid = !code.is_empty()
        && code.len() <= 10
        && code.chars().all(|c| c.is_ascii_alphabetic() || c == '-');

    if !valid {
        return Err(BotError::Translation(format!(
            "`{code}` is not a valid language code"
        )));
    }

    Ok(match code.split_once('-') {
        Some((lang, region)) => format!("{}-{}", lang.to_lowercase(), region.to_uppercase()),
        None => code.to_lowercase(),
    })
}

fn request_url(text: &str, target: &str) -> Result<Url, BotError> {
    Url::parse_with_params(
        ENDPOINT,
        &[
            ("client", "gtx"),
            ("sl", "auto"),
            ("tl", target),
            ("dt", "t"),
            ("q", text),
        ],
    )
    .map_err(|e| BotError::Translation(e.to_string()))
}

/// The response is `[[["<translated>", "<original>", ...], ...], ...]`, one
/// entry per sentence.
pub fn parse_response(body: &serde_json::Value) -> Option<String> {
    let sentences = body.get(0)?.as_array()?;
    let translated: String = sentences
        .iter()
        .filter_map(|sentence| sentence.get(0)?.as_str())
        .collect();

    (!translated.is_empty()).then_some(translated)
}
