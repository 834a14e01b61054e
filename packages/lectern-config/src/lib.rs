mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Chunking, Config, EmbeddingProviderConfig, GenerationProviderConfig, Providers, Qdrant,
	RerankProviderConfig, Retrieval, Service, Storage,
};

use std::{fs, path::Path};

pub const GENERATION_PROVIDERS: [&str; 3] = ["openai", "gemini", "local"];

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.log_level must be non-empty.".to_string(),
		});
	}
	if cfg.storage.qdrant.url.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.qdrant.url must be non-empty.".to_string(),
		});
	}
	if cfg.storage.qdrant.collection.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.qdrant.collection must be non-empty.".to_string(),
		});
	}
	if cfg.storage.qdrant.vector_dim == 0 {
		return Err(Error::Validation {
			message: "storage.qdrant.vector_dim must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions != cfg.storage.qdrant.vector_dim {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must match storage.qdrant.vector_dim."
				.to_string(),
		});
	}
	if cfg.providers.embedding.api_key.trim().is_empty() {
		return Err(Error::Validation {
			message: "providers.embedding.api_key must be non-empty.".to_string(),
		});
	}

	if let Some(rerank) = cfg.providers.rerank.as_ref()
		&& rerank.api_key.trim().is_empty()
	{
		return Err(Error::Validation {
			message: "providers.rerank.api_key must be non-empty.".to_string(),
		});
	}

	let generation = &cfg.providers.generation;

	if !GENERATION_PROVIDERS.contains(&generation.provider_id.as_str()) {
		return Err(Error::Validation {
			message: "providers.generation.provider_id must be one of openai, gemini, or local."
				.to_string(),
		});
	}
	if generation.provider_id != "local" && generation.api_key.trim().is_empty() {
		return Err(Error::Validation {
			message: "providers.generation.api_key must be non-empty for hosted providers."
				.to_string(),
		});
	}
	if !generation.temperature.is_finite() || generation.temperature < 0.0 {
		return Err(Error::Validation {
			message: "providers.generation.temperature must be a finite number, zero or greater."
				.to_string(),
		});
	}
	if generation.max_tokens == 0 {
		return Err(Error::Validation {
			message: "providers.generation.max_tokens must be greater than zero.".to_string(),
		});
	}

	if cfg.chunking.chunk_tokens == 0 {
		return Err(Error::Validation {
			message: "chunking.chunk_tokens must be greater than zero.".to_string(),
		});
	}
	if cfg.chunking.overlap_tokens >= cfg.chunking.chunk_tokens {
		return Err(Error::Validation {
			message: "chunking.overlap_tokens must be less than chunking.chunk_tokens.".to_string(),
		});
	}
	if cfg.chunking.tokenizer_repo.trim().is_empty() {
		return Err(Error::Validation {
			message: "chunking.tokenizer_repo must be a non-empty string.".to_string(),
		});
	}

	if cfg.retrieval.top_k == 0 {
		return Err(Error::Validation {
			message: "retrieval.top_k must be greater than zero.".to_string(),
		});
	}
	if cfg.retrieval.token_budget == 0 {
		return Err(Error::Validation {
			message: "retrieval.token_budget must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	// A [providers.rerank] section with a blank api_base disables reranking.
	if cfg.providers.rerank.as_ref().map(|rerank| rerank.api_base.trim().is_empty()).unwrap_or(false)
	{
		cfg.providers.rerank = None;
	}
}
