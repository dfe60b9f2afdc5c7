use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = relink_api::Args::parse();

	relink_api::run(args).await
}
