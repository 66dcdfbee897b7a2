use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{JobSiftService, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
	pub total_jobs: i64,
	pub remote_jobs: i64,
	pub with_salary: i64,
	pub by_source: BTreeMap<String, i64>,
}

impl JobSiftService {
	pub async fn statistics(&self) -> Result<Statistics> {
		let summary = self.store.summary().await?;

		Ok(Statistics {
			total_jobs: summary.total_jobs,
			remote_jobs: summary.remote_jobs,
			with_salary: summary.with_salary,
			by_source: summary.by_source,
		})
	}

	pub fn sources(&self) -> Vec<String> {
		self.registry.names()
	}
}
