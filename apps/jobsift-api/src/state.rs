use std::sync::Arc;

use jobsift_service::JobSiftService;
use jobsift_storage::db::Db;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<JobSiftService>,
}
impl AppState {
	pub async fn new(config: jobsift_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema().await?;

		let service = JobSiftService::new(config, Arc::new(db))?;

		Ok(Self::from_service(service))
	}

	pub fn from_service(service: JobSiftService) -> Self {
		Self { service: Arc::new(service) }
	}
}
