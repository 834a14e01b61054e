use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = lectern_cli::Args::parse();
	lectern_cli::run(args).await
}
