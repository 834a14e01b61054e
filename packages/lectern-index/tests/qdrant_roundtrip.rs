use std::env;

use serde_json::Map;

use lectern_index::{StoredChunk, VectorIndex};

fn test_qdrant_url() -> Option<String> {
	env::var("LECTERN_QDRANT_URL").ok().filter(|value| !value.trim().is_empty())
}

fn test_embedding_config() -> Option<lectern_config::EmbeddingProviderConfig> {
	let api_key = env::var("LECTERN_EMBEDDING_API_KEY").ok()?;

	Some(lectern_config::EmbeddingProviderConfig {
		provider_id: "openai".to_string(),
		api_base: "https://api.openai.com".to_string(),
		api_key,
		path: "/v1/embeddings".to_string(),
		model: "text-embedding-3-small".to_string(),
		dimensions: 1024,
		timeout_ms: 30_000,
		default_headers: Map::new(),
	})
}

#[tokio::test]
#[ignore = "Requires external Qdrant and an embedding provider. Set LECTERN_QDRANT_URL and LECTERN_EMBEDDING_API_KEY to run."]
async fn upsert_then_search_round_trip() {
	let Some(url) = test_qdrant_url() else {
		eprintln!("Skipping upsert_then_search_round_trip; set LECTERN_QDRANT_URL to run this test.");
		return;
	};
	let Some(embedding) = test_embedding_config() else {
		eprintln!(
			"Skipping upsert_then_search_round_trip; set LECTERN_EMBEDDING_API_KEY to run this test."
		);
		return;
	};

	let qdrant = lectern_config::Qdrant {
		url,
		collection: format!("lectern-test-{}", std::process::id()),
		vector_dim: embedding.dimensions,
	};
	let index = VectorIndex::new(&qdrant, embedding).expect("Failed to build index.");

	index.recreate_collection().await.expect("Failed to recreate collection.");

	let chunks = vec![
		StoredChunk {
			document_id: "attention".to_string(),
			title: "Attention Is All You Need".to_string(),
			chunk_id: 0,
			start_token: 0,
			end_token: 12,
			text: "Scaled dot-product attention computes softmax(QK^T / sqrt(d)) V.".to_string(),
		},
		StoredChunk {
			document_id: "resnet".to_string(),
			title: "Deep Residual Learning".to_string(),
			chunk_id: 0,
			start_token: 0,
			end_token: 11,
			text: "Residual connections let gradients flow through identity shortcuts."
				.to_string(),
		},
	];

	index.upsert_chunks(&chunks).await.expect("Failed to upsert chunks.");

	let hits = index
		.search("How does scaled dot-product attention work?", 2)
		.await
		.expect("Search failed.");

	assert!(!hits.is_empty());
	assert_eq!(hits[0].id, "attention_chunk0");
	assert_eq!(hits[0].title, "Attention Is All You Need");

	index.client.delete_collection(&index.collection).await.expect("Failed to delete collection.");
}
