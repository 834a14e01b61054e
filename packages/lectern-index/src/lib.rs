pub const DENSE_VECTOR_NAME: &str = "dense";

mod error;

pub use error::{Error, Result};

use std::collections::HashMap;

use qdrant_client::{
	client::Payload,
	qdrant::{
		CreateCollectionBuilder, Distance, PointStruct, Query, QueryPointsBuilder,
		UpsertPointsBuilder, Vector, VectorParamsBuilder, VectorsConfigBuilder, value::Kind,
	},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One chunk as persisted by the ingestion step, one JSON object per line.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoredChunk {
	pub document_id: String,
	pub title: String,
	pub chunk_id: i32,
	pub start_token: usize,
	pub end_token: usize,
	pub text: String,
}
impl StoredChunk {
	/// Stable human-readable candidate id, e.g. `attention_chunk3`.
	pub fn candidate_id(&self) -> String {
		format!("{}_chunk{}", self.document_id, self.chunk_id)
	}

	/// Deterministic point id so re-indexing the same corpus overwrites in
	/// place instead of accumulating duplicates.
	pub fn point_id(&self) -> Uuid {
		let name = format!("{}:{}", self.document_id, self.chunk_id);

		Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes())
	}
}

/// A retrieved chunk as the pipeline sees it. `score` is `None` until a
/// reranker has scored the candidate.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Candidate {
	pub id: String,
	pub document_id: String,
	pub title: String,
	pub text: String,
	pub score: Option<f32>,
}

pub struct VectorIndex {
	pub client: qdrant_client::Qdrant,
	pub collection: String,
	pub vector_dim: u32,
	embedding: lectern_config::EmbeddingProviderConfig,
}
impl VectorIndex {
	pub fn new(
		cfg: &lectern_config::Qdrant,
		embedding: lectern_config::EmbeddingProviderConfig,
	) -> Result<Self> {
		let client = qdrant_client::Qdrant::from_url(&cfg.url).build()?;

		Ok(Self {
			client,
			collection: cfg.collection.clone(),
			vector_dim: cfg.vector_dim,
			embedding,
		})
	}

	/// Drops and recreates the collection with a single named dense vector.
	/// Indexing always starts from an empty collection.
	pub async fn recreate_collection(&self) -> Result<()> {
		if self.client.collection_exists(&self.collection).await? {
			self.client.delete_collection(&self.collection).await?;
		}

		let mut vectors_config = VectorsConfigBuilder::default();

		vectors_config.add_named_vector_params(
			DENSE_VECTOR_NAME,
			VectorParamsBuilder::new(self.vector_dim.into(), Distance::Cosine),
		);

		self.client
			.create_collection(
				CreateCollectionBuilder::new(self.collection.clone())
					.vectors_config(vectors_config),
			)
			.await?;

		tracing::info!(
			collection = self.collection.as_str(),
			vector_dim = self.vector_dim,
			"Recreated collection."
		);

		Ok(())
	}

	/// Embeds `chunks` in one provider call and upserts them as points. The
	/// payload carries everything retrieval needs so answering never goes
	/// back to the source files.
	pub async fn upsert_chunks(&self, chunks: &[StoredChunk]) -> Result<()> {
		if chunks.is_empty() {
			return Ok(());
		}

		let texts: Vec<String> = chunks.iter().map(|chunk| chunk.text.clone()).collect();
		let embeddings = lectern_providers::embedding::embed(&self.embedding, &texts).await?;

		if embeddings.len() != chunks.len() {
			return Err(Error::Provider {
				message: "Embedding provider returned mismatched vector count.".to_string(),
			});
		}

		let mut points = Vec::with_capacity(chunks.len());

		for (chunk, embedding) in chunks.iter().zip(embeddings) {
			if embedding.len() != self.vector_dim as usize {
				return Err(Error::Provider {
					message: "Embedding vector dimension mismatch.".to_string(),
				});
			}

			let mut payload = Payload::new();

			payload.insert("id", chunk.candidate_id());
			payload.insert("document_id", chunk.document_id.clone());
			payload.insert("title", chunk.title.clone());
			payload.insert("chunk_id", serde_json::Value::from(chunk.chunk_id));
			payload.insert("start_token", serde_json::Value::from(chunk.start_token as i64));
			payload.insert("end_token", serde_json::Value::from(chunk.end_token as i64));
			payload.insert("text", chunk.text.clone());

			let mut vectors = HashMap::new();

			vectors.insert(DENSE_VECTOR_NAME.to_string(), Vector::from(embedding));
			points.push(PointStruct::new(chunk.point_id().to_string(), vectors, payload));
		}

		self.client
			.upsert_points(UpsertPointsBuilder::new(self.collection.clone(), points).wait(true))
			.await?;

		Ok(())
	}

	/// Nearest-neighbor search over the dense vector, most similar first.
	pub async fn search(&self, query_text: &str, top_k: u32) -> Result<Vec<Candidate>> {
		let embeddings = lectern_providers::embedding::embed(
			&self.embedding,
			std::slice::from_ref(&query_text.to_string()),
		)
		.await?;
		let query_vec = embeddings.into_iter().next().ok_or_else(|| Error::Provider {
			message: "Embedding provider returned no vectors.".to_string(),
		})?;

		if query_vec.len() != self.vector_dim as usize {
			return Err(Error::Provider {
				message: "Embedding vector dimension mismatch.".to_string(),
			});
		}

		let search = QueryPointsBuilder::new(self.collection.clone())
			.query(Query::new_nearest(query_vec))
			.using(DENSE_VECTOR_NAME)
			.with_payload(true)
			.limit(top_k as u64);
		let response = self.client.query(search).await?;
		let mut out = Vec::with_capacity(response.result.len());

		for point in response.result {
			let Some(id) = payload_str(&point.payload, "id") else {
				tracing::warn!("Search hit missing id payload field.");

				continue;
			};
			let Some(text) = payload_str(&point.payload, "text") else {
				tracing::warn!(id = id.as_str(), "Search hit missing text payload field.");

				continue;
			};
			let document_id = payload_str(&point.payload, "document_id").unwrap_or_default();
			let title = payload_str(&point.payload, "title").unwrap_or_default();

			out.push(Candidate { id, document_id, title, text, score: None });
		}

		Ok(out)
	}
}

fn payload_str(
	payload: &HashMap<String, qdrant_client::qdrant::Value>,
	key: &str,
) -> Option<String> {
	let value = payload.get(key)?;

	match &value.kind {
		Some(Kind::StringValue(text)) => Some(text.clone()),
		_ => None,
	}
}
