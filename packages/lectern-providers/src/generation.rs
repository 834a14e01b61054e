use std::time::Duration;

use reqwest::{Client, header::HeaderName};
use serde_json::Value;

use crate::{Error, Result};

/// Generation backend variant, selected once at construction time. Dispatch
/// happens in a single match; call sites never branch on the provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenerationProvider {
	OpenAi,
	Gemini,
	Local,
}

impl GenerationProvider {
	pub fn from_id(id: &str) -> Option<Self> {
		match id {
			"openai" => Some(Self::OpenAi),
			"gemini" => Some(Self::Gemini),
			"local" => Some(Self::Local),
			_ => None,
		}
	}

	pub fn id(self) -> &'static str {
		match self {
			Self::OpenAi => "openai",
			Self::Gemini => "gemini",
			Self::Local => "local",
		}
	}

	fn label(self) -> &'static str {
		match self {
			Self::OpenAi => "OPENAI",
			Self::Gemini => "GEMINI",
			Self::Local => "LOCAL",
		}
	}
}

/// Synthesizes an answer for `prompt`. Never fails: any transport or parse
/// error is converted into a provider-tagged sentinel string, so a failed
/// synthesis does not discard an otherwise successful retrieval.
pub async fn generate(cfg: &lectern_config::GenerationProviderConfig, prompt: &str) -> String {
	let Some(provider) = GenerationProvider::from_id(&cfg.provider_id) else {
		return format!("[GENERATION ERROR] Unknown provider id {}.", cfg.provider_id);
	};

	match try_generate(provider, cfg, prompt).await {
		Ok(text) => text,
		Err(err) => {
			tracing::warn!(
				provider = provider.id(),
				error = %err,
				"Generation failed; returning sentinel answer."
			);

			sentinel(provider, &err)
		},
	}
}

pub fn sentinel(provider: GenerationProvider, err: &Error) -> String {
	format!("[{} ERROR] {err}", provider.label())
}

async fn try_generate(
	provider: GenerationProvider,
	cfg: &lectern_config::GenerationProviderConfig,
	prompt: &str,
) -> Result<String> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;

	match provider {
		GenerationProvider::OpenAi | GenerationProvider::Local =>
			chat_completion(&client, cfg, prompt).await,
		GenerationProvider::Gemini => gemini_generate(&client, cfg, prompt).await,
	}
}

async fn chat_completion(
	client: &Client,
	cfg: &lectern_config::GenerationProviderConfig,
	prompt: &str,
) -> Result<String> {
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"temperature": cfg.temperature,
		"max_tokens": cfg.max_tokens,
		"messages": [{ "role": "user", "content": prompt }],
	});
	// Local inference servers speak the same protocol but take no credentials.
	let headers = if cfg.api_key.trim().is_empty() {
		crate::default_headers(&cfg.default_headers)?
	} else {
		crate::auth_headers(&cfg.api_key, &cfg.default_headers)?
	};
	let res = client.post(url).headers(headers).json(&body).send().await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_chat_response(json)
}

async fn gemini_generate(
	client: &Client,
	cfg: &lectern_config::GenerationProviderConfig,
	prompt: &str,
) -> Result<String> {
	let url =
		format!("{}/models/{}:generateContent", cfg.api_base.trim_end_matches('/'), cfg.model);
	let body = serde_json::json!({
		"contents": [{ "parts": [{ "text": prompt }] }],
		"generationConfig": {
			"temperature": cfg.temperature,
			"maxOutputTokens": cfg.max_tokens,
		},
	});
	let mut headers = crate::default_headers(&cfg.default_headers)?;

	headers.insert(HeaderName::from_static("x-goog-api-key"), cfg.api_key.parse()?);

	let res = client.post(url).headers(headers).json(&body).send().await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_gemini_response(json)
}

fn parse_chat_response(json: Value) -> Result<String> {
	json.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|msg| msg.get("content"))
		.and_then(|c| c.as_str())
		.map(|text| text.trim().to_string())
		.ok_or_else(|| Error::InvalidResponse {
			message: "Generation response is missing message content.".to_string(),
		})
}

fn parse_gemini_response(json: Value) -> Result<String> {
	json.get("candidates")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|candidate| candidate.get("content"))
		.and_then(|content| content.get("parts"))
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|part| part.get("text"))
		.and_then(|t| t.as_str())
		.filter(|text| !text.trim().is_empty())
		.map(|text| text.trim().to_string())
		.ok_or_else(|| Error::InvalidResponse {
			message: "Generation response is missing candidate text.".to_string(),
		})
}
