mod error;
pub mod packer;
pub mod prompt;
mod retriever;

pub use error::{Error, Result};
pub use prompt::{NO_CONTEXT_MARKER, SYSTEM_PROMPT};

use std::{future::Future, pin::Pin, sync::Arc};

use lectern_chunking::TokenCodec;
use lectern_config::{Config, GenerationProviderConfig, RerankProviderConfig};
use lectern_index::{Candidate, VectorIndex};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait CandidateSource
where
	Self: Send + Sync,
{
	fn search<'a>(
		&'a self,
		query: &'a str,
		top_k: u32,
	) -> BoxFuture<'a, Result<Vec<Candidate>, lectern_index::Error>>;
}

pub trait RerankScorer
where
	Self: Send + Sync,
{
	fn score<'a>(
		&'a self,
		cfg: &'a RerankProviderConfig,
		query: &'a str,
		docs: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<f32>>>;
}

pub trait GenerationBackend
where
	Self: Send + Sync,
{
	fn generate<'a>(
		&'a self,
		cfg: &'a GenerationProviderConfig,
		prompt: &'a str,
	) -> BoxFuture<'a, String>;
}

#[derive(Clone)]
pub struct Backends {
	pub source: Arc<dyn CandidateSource>,
	pub reranker: Arc<dyn RerankScorer>,
	pub generator: Arc<dyn GenerationBackend>,
}
impl Backends {
	pub fn new(
		source: Arc<dyn CandidateSource>,
		reranker: Arc<dyn RerankScorer>,
		generator: Arc<dyn GenerationBackend>,
	) -> Self {
		Self { source, reranker, generator }
	}
}

struct DefaultBackends;

impl CandidateSource for VectorIndex {
	fn search<'a>(
		&'a self,
		query: &'a str,
		top_k: u32,
	) -> BoxFuture<'a, Result<Vec<Candidate>, lectern_index::Error>> {
		Box::pin(VectorIndex::search(self, query, top_k))
	}
}

impl RerankScorer for DefaultBackends {
	fn score<'a>(
		&'a self,
		cfg: &'a RerankProviderConfig,
		query: &'a str,
		docs: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<f32>>> {
		Box::pin(async move { Ok(lectern_providers::rerank::rerank(cfg, query, docs).await?) })
	}
}

impl GenerationBackend for DefaultBackends {
	fn generate<'a>(
		&'a self,
		cfg: &'a GenerationProviderConfig,
		prompt: &'a str,
	) -> BoxFuture<'a, String> {
		Box::pin(lectern_providers::generation::generate(cfg, prompt))
	}
}

#[derive(Debug, Clone)]
pub struct AnswerRequest {
	pub query: String,
	pub top_k: Option<u32>,
	pub rerank_top_n: Option<u32>,
	pub token_budget: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct AnswerResponse {
	pub answer: String,
	pub contexts: Vec<Candidate>,
	pub prompt: String,
}

pub struct Pipeline {
	pub cfg: Config,
	backends: Backends,
	codec: Arc<dyn TokenCodec + Send + Sync>,
}
impl Pipeline {
	/// Wires the real backends: the Qdrant-backed index as candidate source
	/// and the HTTP providers for reranking and generation.
	pub fn new(cfg: Config) -> Result<Self> {
		let index = VectorIndex::new(&cfg.storage.qdrant, cfg.providers.embedding.clone())
			.map_err(|err| Error::IndexUnavailable { message: err.to_string() })?;
		let codec =
			lectern_chunking::load_tokenizer(&cfg.chunking.tokenizer_repo).map_err(|err| {
				Error::InvalidRequest { message: format!("Failed to load tokenizer: {err}") }
			})?;
		let shared = Arc::new(DefaultBackends);
		let backends = Backends::new(Arc::new(index), shared.clone(), shared);

		Ok(Self { cfg, backends, codec: Arc::new(codec) })
	}

	pub fn with_backends(
		cfg: Config,
		backends: Backends,
		codec: Arc<dyn TokenCodec + Send + Sync>,
	) -> Self {
		Self { cfg, backends, codec }
	}

	/// End-to-end answering: retrieve, rerank the head, pack under the token
	/// budget, assemble the prompt, and synthesize. Generation failures come
	/// back as a sentinel answer rather than an error, so the selected
	/// contexts always reach the caller.
	pub async fn answer(&self, req: AnswerRequest) -> Result<AnswerResponse> {
		let query = req.query.trim();

		if query.is_empty() {
			return Err(Error::InvalidRequest { message: "query must not be empty.".to_string() });
		}

		let top_k = req.top_k.unwrap_or(self.cfg.retrieval.top_k);
		let rerank_top_n = req.rerank_top_n.unwrap_or(self.cfg.retrieval.rerank_top_n);
		let token_budget = req.token_budget.unwrap_or(self.cfg.retrieval.token_budget);

		if top_k == 0 {
			return Err(Error::InvalidRequest { message: "top_k must be positive.".to_string() });
		}
		if token_budget == 0 {
			return Err(Error::InvalidRequest {
				message: "token_budget must be positive.".to_string(),
			});
		}

		let candidates = self.backends.source.search(query, top_k).await?;

		tracing::info!(query, top_k, candidate_count = candidates.len(), "Retrieved candidates.");

		let candidates = self.rerank(query, candidates, rerank_top_n).await?;
		let contexts = packer::select_by_budget(candidates, token_budget, |text| {
			self.token_len(text)
		});

		tracing::info!(token_budget, context_count = contexts.len(), "Packed contexts.");

		let prompt = prompt::assemble(SYSTEM_PROMPT, &contexts, query);
		let answer = self.backends.generator.generate(&self.cfg.providers.generation, &prompt).await;

		Ok(AnswerResponse { answer, contexts, prompt })
	}

	async fn rerank(
		&self,
		query: &str,
		candidates: Vec<Candidate>,
		rerank_top_n: u32,
	) -> Result<Vec<Candidate>> {
		let Some(rerank_cfg) = self.cfg.providers.rerank.as_ref() else {
			return Ok(candidates);
		};
		let top_n = retriever::clamp_top_n(rerank_top_n, candidates.len());

		if top_n == 0 {
			return Ok(candidates);
		}

		let docs: Vec<String> =
			candidates.iter().take(top_n).map(|candidate| candidate.text.clone()).collect();
		let scores = self.backends.reranker.score(rerank_cfg, query, &docs).await?;

		retriever::apply_scores(candidates, &scores, top_n)
	}

	/// Token count for budget packing. An unencodable context counts as zero
	/// rather than failing the whole answer.
	fn token_len(&self, text: &str) -> usize {
		match self.codec.encode(text) {
			Ok(ids) => ids.len(),
			Err(err) => {
				tracing::warn!(error = %err, "Token count failed; treating context as zero tokens.");

				0
			},
		}
	}
}
