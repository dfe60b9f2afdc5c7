use std::sync::Arc;

use relink_service::LinkService;
use relink_storage::db::Db;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<LinkService>,
}
impl AppState {
	pub async fn new(config: relink_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema().await?;

		let service = LinkService::new(config, db);

		Ok(Self { service: Arc::new(service) })
	}

	pub fn with_service(service: Arc<LinkService>) -> Self {
		Self { service }
	}
}
