pub use tokenizers::Tokenizer;

pub type TokenizerError = tokenizers::Error;
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("{message}")]
	InvalidConfig { message: String },
	#[error(transparent)]
	Tokenizer(#[from] TokenizerError),
}

/// A deterministic, reversible text/token-sequence codec.
///
/// Chunk spans are expressed in this codec's token units, so re-chunking with
/// the same codec and parameters reproduces identical spans.
pub trait TokenCodec {
	fn encode(&self, text: &str) -> Result<Vec<u32>>;
	fn decode(&self, ids: &[u32]) -> Result<String>;
}

impl TokenCodec for Tokenizer {
	fn encode(&self, text: &str) -> Result<Vec<u32>> {
		// The inherent encode/decode live on the deref target; going through
		// `Tokenizer::` would resolve back to this trait impl.
		let encoding = (**self).encode(text, false)?;

		Ok(encoding.get_ids().to_vec())
	}

	fn decode(&self, ids: &[u32]) -> Result<String> {
		Ok((**self).decode(ids, true)?)
	}
}

#[derive(Clone, Debug)]
pub struct ChunkingConfig {
	pub chunk_tokens: u32,
	pub overlap_tokens: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chunk {
	pub chunk_index: i32,
	pub start_token: usize,
	pub end_token: usize,
	pub text: String,
}

pub fn load_tokenizer(repo: &str) -> Result<Tokenizer, TokenizerError> {
	Tokenizer::from_pretrained(repo, None)
}

/// Fixed-size token windows over `text`, stepping by
/// `chunk_tokens - overlap_tokens`. The final window may be shorter than
/// `chunk_tokens`; its end always equals the total token count.
#[derive(Clone)]
pub struct TokenWindows<'a, C: TokenCodec> {
	codec: &'a C,
	tokens: Vec<u32>,
	chunk_tokens: usize,
	step: usize,
	cursor: usize,
	chunk_index: i32,
}

impl<'a, C: TokenCodec> TokenWindows<'a, C> {
	pub fn new(text: &str, cfg: &ChunkingConfig, codec: &'a C) -> Result<Self> {
		if cfg.chunk_tokens == 0 {
			return Err(Error::InvalidConfig {
				message: "chunk_tokens must be greater than zero.".to_string(),
			});
		}
		if cfg.overlap_tokens >= cfg.chunk_tokens {
			return Err(Error::InvalidConfig {
				message: format!(
					"overlap_tokens ({}) must be less than chunk_tokens ({}); the window would never advance.",
					cfg.overlap_tokens, cfg.chunk_tokens
				),
			});
		}

		Ok(Self {
			codec,
			tokens: codec.encode(text)?,
			chunk_tokens: cfg.chunk_tokens as usize,
			step: (cfg.chunk_tokens - cfg.overlap_tokens) as usize,
			cursor: 0,
			chunk_index: 0,
		})
	}
}

impl<C: TokenCodec> Iterator for TokenWindows<'_, C> {
	type Item = Result<Chunk>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.cursor >= self.tokens.len() {
			return None;
		}

		let start = self.cursor;
		let end = usize::min(start + self.chunk_tokens, self.tokens.len());
		let text = match self.codec.decode(&self.tokens[start..end]) {
			Ok(text) => text,
			Err(err) => {
				// A window that cannot decode poisons the rest of the sequence.
				self.cursor = self.tokens.len();

				return Some(Err(err));
			},
		};
		let chunk = Chunk { chunk_index: self.chunk_index, start_token: start, end_token: end, text };

		self.cursor += self.step;
		self.chunk_index += 1;

		Some(Ok(chunk))
	}
}

pub fn split_text<C: TokenCodec>(
	text: &str,
	cfg: &ChunkingConfig,
	codec: &C,
) -> Result<Vec<Chunk>> {
	TokenWindows::new(text, cfg, codec)?.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	// Reversible for texts whose words are their own token ids ("0 1 2 ...").
	struct NumericCodec;

	impl TokenCodec for NumericCodec {
		fn encode(&self, text: &str) -> Result<Vec<u32>> {
			text.split_whitespace()
				.map(|word| {
					word.parse::<u32>().map_err(|err| Error::InvalidConfig {
						message: format!("Non-numeric test token {word}: {err}"),
					})
				})
				.collect()
		}

		fn decode(&self, ids: &[u32]) -> Result<String> {
			Ok(ids.iter().map(u32::to_string).collect::<Vec<_>>().join(" "))
		}
	}

	fn numeric_text(len: usize) -> String {
		(0..len).map(|idx| idx.to_string()).collect::<Vec<_>>().join(" ")
	}

	#[test]
	fn window_starts_step_and_cover_the_whole_text() {
		let cfg = ChunkingConfig { chunk_tokens: 4, overlap_tokens: 1 };
		let chunks =
			split_text(&numeric_text(10), &cfg, &NumericCodec).expect("Chunking must succeed.");

		let starts: Vec<usize> = chunks.iter().map(|chunk| chunk.start_token).collect();

		assert_eq!(starts, vec![0, 3, 6, 9]);
		assert_eq!(chunks.last().expect("Expected chunks.").end_token, 10);

		for pair in chunks.windows(2) {
			assert!(pair[1].start_token <= pair[0].end_token, "Coverage gap between windows.");
		}
	}

	#[test]
	fn final_window_may_be_short() {
		let cfg = ChunkingConfig { chunk_tokens: 4, overlap_tokens: 0 };
		let chunks =
			split_text(&numeric_text(6), &cfg, &NumericCodec).expect("Chunking must succeed.");

		assert_eq!(chunks.len(), 2);
		assert_eq!(chunks[1].start_token, 4);
		assert_eq!(chunks[1].end_token, 6);
		assert_eq!(chunks[1].text, "4 5");
	}

	#[test]
	fn overlap_equal_to_chunk_size_is_rejected() {
		let cfg = ChunkingConfig { chunk_tokens: 4, overlap_tokens: 4 };
		let err = split_text(&numeric_text(10), &cfg, &NumericCodec)
			.expect_err("Expected invalid config error.");

		assert!(matches!(err, Error::InvalidConfig { .. }));
	}

	#[test]
	fn zero_chunk_tokens_is_rejected() {
		let cfg = ChunkingConfig { chunk_tokens: 0, overlap_tokens: 0 };

		assert!(matches!(
			split_text("0 1", &cfg, &NumericCodec),
			Err(Error::InvalidConfig { .. })
		));
	}

	#[test]
	fn empty_text_yields_no_chunks() {
		let cfg = ChunkingConfig { chunk_tokens: 4, overlap_tokens: 1 };

		assert!(split_text("", &cfg, &NumericCodec).expect("Chunking must succeed.").is_empty());
	}

	#[test]
	fn chunking_is_deterministic() {
		let cfg = ChunkingConfig { chunk_tokens: 5, overlap_tokens: 2 };
		let text = numeric_text(23);
		let first = split_text(&text, &cfg, &NumericCodec).expect("Chunking must succeed.");
		let second = split_text(&text, &cfg, &NumericCodec).expect("Chunking must succeed.");

		assert_eq!(first, second);
	}

	#[test]
	fn chunk_indices_are_sequential() {
		let cfg = ChunkingConfig { chunk_tokens: 3, overlap_tokens: 1 };
		let chunks =
			split_text(&numeric_text(9), &cfg, &NumericCodec).expect("Chunking must succeed.");

		for (expected, chunk) in chunks.iter().enumerate() {
			assert_eq!(chunk.chunk_index, expected as i32);
		}
	}
}
