use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use lectern_config::Config;

const SAMPLE_CONFIG_TEMPLATE_TOML: &str = include_str!("fixtures/sample_config.template.toml");

fn write_temp_config(payload: String) -> PathBuf {
	static COUNTER: AtomicU64 = AtomicU64::new(0);

	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("System time must be valid.")
		.as_nanos();
	let ordinal = COUNTER.fetch_add(1, Ordering::SeqCst);
	let pid = std::process::id();
	let mut path = env::temp_dir();

	path.push(format!("lectern_config_test_{nanos}_{pid}_{ordinal}.toml"));

	fs::write(&path, payload).expect("Failed to write test config.");

	path
}

fn base_config() -> Config {
	toml::from_str(SAMPLE_CONFIG_TEMPLATE_TOML).expect("Failed to parse test config.")
}

fn load_payload(payload: String) -> lectern_config::Result<Config> {
	let path = write_temp_config(payload);
	let result = lectern_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	result
}

#[test]
fn sample_template_is_valid() {
	assert!(lectern_config::validate(&base_config()).is_ok());
}

#[test]
fn chunking_overlap_must_be_less_than_chunk_tokens() {
	let mut cfg = base_config();

	cfg.chunking.overlap_tokens = cfg.chunking.chunk_tokens;

	let err = lectern_config::validate(&cfg).expect_err("Expected chunking validation error.");

	assert!(
		err.to_string().contains("chunking.overlap_tokens must be less than chunking.chunk_tokens."),
		"Unexpected error: {err}"
	);
}

#[test]
fn chunking_chunk_tokens_must_be_positive() {
	let mut cfg = base_config();

	cfg.chunking.chunk_tokens = 0;

	assert!(lectern_config::validate(&cfg).is_err());
}

#[test]
fn token_budget_must_be_positive() {
	let mut cfg = base_config();

	cfg.retrieval.token_budget = 0;

	let err = lectern_config::validate(&cfg).expect_err("Expected token budget validation error.");

	assert!(
		err.to_string().contains("retrieval.token_budget must be greater than zero."),
		"Unexpected error: {err}"
	);
}

#[test]
fn top_k_must_be_positive() {
	let mut cfg = base_config();

	cfg.retrieval.top_k = 0;

	let err = lectern_config::validate(&cfg).expect_err("Expected top_k validation error.");

	assert!(
		err.to_string().contains("retrieval.top_k must be greater than zero."),
		"Unexpected error: {err}"
	);
}

#[test]
fn embedding_dimensions_must_match_vector_dim() {
	let mut cfg = base_config();

	cfg.providers.embedding.dimensions = cfg.storage.qdrant.vector_dim + 1;

	let err = lectern_config::validate(&cfg).expect_err("Expected dimensions validation error.");

	assert!(
		err.to_string()
			.contains("providers.embedding.dimensions must match storage.qdrant.vector_dim."),
		"Unexpected error: {err}"
	);
}

// The index and pipeline hand the embedding section to `VectorIndex` by value.
#[test]
fn embedding_config_is_cloneable() {
	let cfg = base_config();
	let embedding = cfg.providers.embedding.clone();

	assert_eq!(embedding.model, cfg.providers.embedding.model);
	assert_eq!(embedding.dimensions, cfg.providers.embedding.dimensions);
}

#[test]
fn generation_provider_must_be_known() {
	let mut cfg = base_config();

	cfg.providers.generation.provider_id = "anthropic".to_string();

	let err = lectern_config::validate(&cfg).expect_err("Expected provider_id validation error.");

	assert!(
		err.to_string().contains(
			"providers.generation.provider_id must be one of openai, gemini, or local."
		),
		"Unexpected error: {err}"
	);
}

#[test]
fn local_generation_provider_allows_empty_api_key() {
	let mut cfg = base_config();

	cfg.providers.generation.provider_id = "local".to_string();
	cfg.providers.generation.api_key = String::new();

	assert!(lectern_config::validate(&cfg).is_ok());
}

#[test]
fn hosted_generation_provider_requires_api_key() {
	let mut cfg = base_config();

	cfg.providers.generation.api_key = "   ".to_string();

	let err = lectern_config::validate(&cfg).expect_err("Expected api_key validation error.");

	assert!(
		err.to_string()
			.contains("providers.generation.api_key must be non-empty for hosted providers."),
		"Unexpected error: {err}"
	);
}

#[test]
fn blank_rerank_api_base_disables_reranking() {
	let payload = SAMPLE_CONFIG_TEMPLATE_TOML
		.replace("api_base        = \"https://api.jina.ai\"", "api_base        = \"\"");
	let cfg = load_payload(payload).expect("Expected config to load.");

	assert!(cfg.providers.rerank.is_none());
}

#[test]
fn retrieval_section_defaults_when_absent() {
	let start = SAMPLE_CONFIG_TEMPLATE_TOML
		.find("[retrieval]")
		.expect("Template config must include [retrieval].");
	let payload = SAMPLE_CONFIG_TEMPLATE_TOML[..start].to_string();
	let cfg = load_payload(payload).expect("Expected config to load.");

	assert_eq!(cfg.retrieval.top_k, 8);
	assert_eq!(cfg.retrieval.rerank_top_n, 4);
	assert_eq!(cfg.retrieval.token_budget, 3_000);
}

#[test]
fn lectern_example_toml_is_valid() {
	let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));

	path.push("../../lectern.example.toml");

	lectern_config::load(&path).expect("Expected lectern.example.toml to be a valid config.");
}
