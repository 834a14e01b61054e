use std::{
	fs,
	io::Write,
	path::{Path, PathBuf},
};

use clap::Parser;
use color_eyre::eyre::{self, WrapErr};

use lectern_chunking::ChunkingConfig;
use lectern_index::StoredChunk;

#[derive(Debug, Parser)]
pub struct ChunkArgs {
	/// Directory of plain-text documents (*.txt).
	#[arg(long, value_name = "DIR")]
	pub input: PathBuf,
	/// Directory for chunk records, one JSONL file per document.
	#[arg(long, value_name = "DIR")]
	pub output: PathBuf,
}

pub fn run(config: &lectern_config::Config, args: ChunkArgs) -> color_eyre::Result<()> {
	let tokenizer = lectern_chunking::load_tokenizer(&config.chunking.tokenizer_repo)
		.map_err(|err| eyre::eyre!("Failed to load tokenizer: {err}"))?;
	let chunking = ChunkingConfig {
		chunk_tokens: config.chunking.chunk_tokens,
		overlap_tokens: config.chunking.overlap_tokens,
	};

	fs::create_dir_all(&args.output)
		.wrap_err_with(|| format!("Failed to create {}.", args.output.display()))?;

	let mut documents = list_files_with_extension(&args.input, "txt")?;

	if documents.is_empty() {
		eyre::bail!("No .txt documents found in {}.", args.input.display());
	}

	documents.sort();

	let mut total_chunks = 0_usize;

	for path in &documents {
		let text = fs::read_to_string(path)
			.wrap_err_with(|| format!("Failed to read {}.", path.display()))?;
		let document_id = document_id(path)?;
		let title = document_title(&text, &document_id);
		let chunks = lectern_chunking::split_text(&text, &chunking, &tokenizer)
			.map_err(|err| eyre::eyre!("Failed to chunk {}: {err}", path.display()))?;
		let records: Vec<StoredChunk> = chunks
			.into_iter()
			.map(|chunk| StoredChunk {
				document_id: document_id.clone(),
				title: title.clone(),
				chunk_id: chunk.chunk_index,
				start_token: chunk.start_token,
				end_token: chunk.end_token,
				text: chunk.text,
			})
			.collect();
		let out_path = args.output.join(format!("{document_id}.jsonl"));

		write_jsonl(&out_path, &records)?;

		tracing::info!(
			document_id = document_id.as_str(),
			chunk_count = records.len(),
			"Chunked document."
		);

		total_chunks += records.len();
	}

	tracing::info!(document_count = documents.len(), total_chunks, "Chunking complete.");

	Ok(())
}

fn list_files_with_extension(dir: &Path, extension: &str) -> color_eyre::Result<Vec<PathBuf>> {
	let entries =
		fs::read_dir(dir).wrap_err_with(|| format!("Failed to read {}.", dir.display()))?;
	let mut out = Vec::new();

	for entry in entries {
		let path = entry?.path();

		if path.is_file() && path.extension().map(|ext| ext == extension).unwrap_or(false) {
			out.push(path);
		}
	}

	Ok(out)
}

fn document_id(path: &Path) -> color_eyre::Result<String> {
	path.file_stem()
		.and_then(|stem| stem.to_str())
		.map(|stem| stem.to_string())
		.ok_or_else(|| eyre::eyre!("Invalid document file name: {}.", path.display()))
}

/// First non-empty line, falling back to the file stem for documents that
/// open with blank lines only.
fn document_title(text: &str, document_id: &str) -> String {
	text.lines()
		.map(str::trim)
		.find(|line| !line.is_empty())
		.unwrap_or(document_id)
		.to_string()
}

fn write_jsonl(path: &Path, records: &[StoredChunk]) -> color_eyre::Result<()> {
	let mut file =
		fs::File::create(path).wrap_err_with(|| format!("Failed to create {}.", path.display()))?;

	for record in records {
		let line = serde_json::to_string(record)?;

		writeln!(file, "{line}")?;
	}

	Ok(())
}
