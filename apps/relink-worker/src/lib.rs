pub mod worker;

mod error;

pub use error::{Error, Result};

use std::{path::PathBuf, time::Duration};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use relink_service::LinkService;
use relink_storage::db::Db;

#[derive(Debug, Parser)]
#[command(
	version = relink_cli::VERSION,
	rename_all = "kebab",
	styles = relink_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = relink_config::load(&args.config)?;
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).init();

	let practices = worker::parse_practices(&config.reconcile.practices)?;
	let interval = Duration::from_secs(config.reconcile.interval_seconds);
	let auto_create = config.reconcile.auto_create_appointments;
	let db = Db::connect(&config.storage.postgres).await?;

	db.ensure_schema().await?;

	let state = worker::WorkerState {
		service: LinkService::new(config, db),
		practices,
		interval,
		auto_create,
	};

	worker::run_worker(state).await?;

	Ok(())
}
