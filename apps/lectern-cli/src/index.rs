use std::{
	fs,
	io::{BufRead, BufReader},
	path::{Path, PathBuf},
};

use clap::Parser;
use color_eyre::eyre::{self, WrapErr};

use lectern_index::{StoredChunk, VectorIndex};

#[derive(Debug, Parser)]
pub struct IndexArgs {
	/// Directory of chunk JSONL files produced by `lectern chunk`.
	#[arg(long, value_name = "DIR")]
	pub input: PathBuf,
	/// Chunks per embedding request.
	#[arg(long, default_value_t = 64)]
	pub batch_size: usize,
}

pub async fn run(config: &lectern_config::Config, args: IndexArgs) -> color_eyre::Result<()> {
	if args.batch_size == 0 {
		eyre::bail!("batch-size must be positive.");
	}

	let mut files = list_jsonl_files(&args.input)?;

	if files.is_empty() {
		eyre::bail!("No .jsonl chunk files found in {}.", args.input.display());
	}

	files.sort();

	let index =
		VectorIndex::new(&config.storage.qdrant, config.providers.embedding.clone())?;

	index.recreate_collection().await?;

	let mut total_chunks = 0_usize;

	for path in &files {
		let chunks = read_jsonl(path)?;

		for batch in chunks.chunks(args.batch_size) {
			index.upsert_chunks(batch).await?;

			total_chunks += batch.len();

			tracing::info!(
				file = %path.display(),
				batch_len = batch.len(),
				total_chunks,
				"Upserted batch."
			);
		}
	}

	tracing::info!(
		collection = config.storage.qdrant.collection.as_str(),
		file_count = files.len(),
		total_chunks,
		"Indexing complete."
	);

	Ok(())
}

fn list_jsonl_files(dir: &Path) -> color_eyre::Result<Vec<PathBuf>> {
	let entries =
		fs::read_dir(dir).wrap_err_with(|| format!("Failed to read {}.", dir.display()))?;
	let mut out = Vec::new();

	for entry in entries {
		let path = entry?.path();

		if path.is_file() && path.extension().map(|ext| ext == "jsonl").unwrap_or(false) {
			out.push(path);
		}
	}

	Ok(out)
}

fn read_jsonl(path: &Path) -> color_eyre::Result<Vec<StoredChunk>> {
	let file =
		fs::File::open(path).wrap_err_with(|| format!("Failed to open {}.", path.display()))?;
	let mut out = Vec::new();

	for (line_no, line) in BufReader::new(file).lines().enumerate() {
		let line = line?;

		if line.trim().is_empty() {
			continue;
		}

		let chunk: StoredChunk = serde_json::from_str(&line).wrap_err_with(|| {
			format!("Invalid chunk record at {}:{}.", path.display(), line_no + 1)
		})?;

		out.push(chunk);
	}

	Ok(out)
}
