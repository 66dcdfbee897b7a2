use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use jobsift_storage::models::{JobFilter, StoredJob};

use crate::{Error, JobSiftService, Result};

pub const DEFAULT_PER_PAGE: u32 = 20;
pub const MAX_PER_PAGE: u32 = 100;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListRequest {
	pub page: Option<u32>,
	pub per_page: Option<u32>,
	pub source: Option<String>,
	pub remote: Option<bool>,
	pub keyword: Option<String>,
	pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobItem {
	pub job_id: Uuid,
	pub title: String,
	pub company: String,
	pub location: String,
	pub description: String,
	pub url: String,
	pub source: String,
	#[serde(with = "time::serde::rfc3339")]
	pub posted_date: OffsetDateTime,
	pub job_type: Option<String>,
	pub salary: Option<String>,
	pub tags: Vec<String>,
	pub remote: bool,
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
	pub view_count: i64,
	#[serde(with = "time::serde::rfc3339::option")]
	pub last_accessed_at: Option<OffsetDateTime>,
	#[serde(with = "time::serde::rfc3339::option")]
	pub cached_at: Option<OffsetDateTime>,
}
impl From<StoredJob> for JobItem {
	fn from(job: StoredJob) -> Self {
		Self {
			job_id: job.job_id,
			title: job.title,
			company: job.company,
			location: job.location,
			description: job.description,
			url: job.url,
			source: job.source,
			posted_date: job.posted_date,
			job_type: job.job_type,
			salary: job.salary,
			tags: job.tags.0,
			remote: job.remote,
			created_at: job.created_at,
			view_count: job.view_count,
			last_accessed_at: job.last_accessed_at,
			cached_at: job.cached_at,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResponse {
	pub jobs: Vec<JobItem>,
	pub total: i64,
	pub page: u32,
	pub per_page: u32,
	pub total_pages: u32,
}

impl JobSiftService {
	pub async fn list_jobs(&self, req: ListRequest) -> Result<ListResponse> {
		let page = req.page.unwrap_or(1);
		let per_page = req.per_page.unwrap_or(DEFAULT_PER_PAGE);

		if page == 0 {
			return Err(Error::InvalidRequest { message: "page must be at least 1.".to_string() });
		}
		if per_page == 0 || per_page > MAX_PER_PAGE {
			return Err(Error::InvalidRequest {
				message: format!("per_page must be between 1 and {MAX_PER_PAGE}."),
			});
		}

		let filter = JobFilter {
			source: non_blank(req.source).map(|source| source.to_lowercase()),
			remote: req.remote,
			keyword: non_blank(req.keyword),
			location: non_blank(req.location),
		};
		let offset = (i64::from(page) - 1) * i64::from(per_page);
		let total = self.store.count(&filter).await?;
		let jobs = self.store.query(&filter, i64::from(per_page), offset).await?;

		Ok(ListResponse {
			jobs: jobs.into_iter().map(JobItem::from).collect(),
			total,
			page,
			per_page,
			total_pages: total_pages(total, per_page),
		})
	}
}

fn non_blank(value: Option<String>) -> Option<String> {
	value.map(|raw| raw.trim().to_string()).filter(|text| !text.is_empty())
}

fn total_pages(total: i64, per_page: u32) -> u32 {
	let total = u64::try_from(total).unwrap_or(0);

	u32::try_from(total.div_ceil(u64::from(per_page))).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
	use super::total_pages;

	#[test]
	fn pages_round_up() {
		assert_eq!(total_pages(0, 20), 0);
		assert_eq!(total_pages(20, 20), 1);
		assert_eq!(total_pages(21, 20), 2);
	}
}
