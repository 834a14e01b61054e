use clap::{Parser, ValueEnum};

use lectern_pipeline::{AnswerRequest, Pipeline};

const SNIPPET_CHARS: usize = 400;

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ProviderArg {
	Openai,
	Gemini,
	Local,
}
impl ProviderArg {
	fn id(self) -> &'static str {
		match self {
			Self::Openai => "openai",
			Self::Gemini => "gemini",
			Self::Local => "local",
		}
	}
}

#[derive(Debug, Parser)]
pub struct AskArgs {
	/// The question to answer.
	pub query: String,
	/// Candidates to retrieve before reranking.
	#[arg(long, value_name = "N")]
	pub top_k: Option<u32>,
	/// Leading candidates to rerank; 0 keeps similarity order.
	#[arg(long, value_name = "N")]
	pub rerank_top_n: Option<u32>,
	/// Token budget for the packed context block.
	#[arg(long, value_name = "TOKENS")]
	pub token_budget: Option<u32>,
	/// Generation backend, overriding the configured one.
	#[arg(long, value_enum)]
	pub provider: Option<ProviderArg>,
	/// Generation model, overriding the configured one.
	#[arg(long, value_name = "MODEL")]
	pub model_name: Option<String>,
}

pub async fn run(mut config: lectern_config::Config, args: AskArgs) -> color_eyre::Result<()> {
	if let Some(provider) = args.provider {
		config.providers.generation.provider_id = provider.id().to_string();
	}
	if let Some(model_name) = args.model_name {
		config.providers.generation.model = model_name;
	}

	// Overrides can turn a valid config invalid, e.g. switching to a hosted
	// provider with no key on file.
	lectern_config::validate(&config)?;

	let pipeline = Pipeline::new(config)?;
	let response = pipeline
		.answer(AnswerRequest {
			query: args.query,
			top_k: args.top_k,
			rerank_top_n: args.rerank_top_n,
			token_budget: args.token_budget,
		})
		.await?;

	println!("\n=== Answer ===\n");
	println!("{}", response.answer);
	println!("\n=== Source passages used ===\n");

	for (position, context) in response.contexts.iter().enumerate() {
		println!("[{}] id: {}  title: {}", position + 1, context.id, context.title);
		println!("{} ...", snippet(&context.text));
		println!("{}", "-".repeat(60));
	}

	Ok(())
}

fn snippet(text: &str) -> String {
	text.chars().take(SNIPPET_CHARS).collect::<String>().replace('\n', " ")
}
