pub mod ask;
pub mod chunk;
pub mod index;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(version, rename_all = "kebab")]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	#[command(subcommand)]
	pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
	/// Split plain-text documents into token chunks, one JSONL file per document.
	Chunk(chunk::ChunkArgs),
	/// Rebuild the vector collection from chunk JSONL files.
	Index(index::IndexArgs),
	/// Answer a question over the indexed corpus.
	Ask(ask::AskArgs),
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = lectern_config::load(&args.config)?;

	init_tracing(&config);

	match args.command {
		Command::Chunk(cmd) => chunk::run(&config, cmd),
		Command::Index(cmd) => index::run(&config, cmd).await,
		Command::Ask(cmd) => ask::run(config, cmd).await,
	}
}

fn init_tracing(config: &lectern_config::Config) {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
	tracing_subscriber::fmt().with_env_filter(filter).init();
}
