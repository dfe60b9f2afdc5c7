use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = relink_worker::Args::parse();

	relink_worker::run(args).await
}
