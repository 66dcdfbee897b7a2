use std::collections::BTreeMap;

use sqlx::types::Json;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct StoredJob {
	pub job_id: Uuid,
	pub fingerprint: String,
	pub title: String,
	pub company: String,
	pub location: String,
	pub description: String,
	pub url: String,
	pub source: String,
	pub posted_date: OffsetDateTime,
	pub job_type: Option<String>,
	pub salary: Option<String>,
	pub tags: Json<Vec<String>>,
	pub remote: bool,
	pub created_at: OffsetDateTime,
	pub view_count: i64,
	pub last_accessed_at: Option<OffsetDateTime>,
	pub cached_description: Option<String>,
	pub cached_at: Option<OffsetDateTime>,
}

/// Ingestion-side fields of a job. Read-path annotations start empty.
#[derive(Debug, Clone)]
pub struct NewJob {
	pub job_id: Uuid,
	pub fingerprint: String,
	pub title: String,
	pub company: String,
	pub location: String,
	pub description: String,
	pub url: String,
	pub source: String,
	pub posted_date: OffsetDateTime,
	pub job_type: Option<String>,
	pub salary: Option<String>,
	pub tags: Vec<String>,
	pub remote: bool,
	pub created_at: OffsetDateTime,
}
impl NewJob {
	pub fn into_stored(self) -> StoredJob {
		StoredJob {
			job_id: self.job_id,
			fingerprint: self.fingerprint,
			title: self.title,
			company: self.company,
			location: self.location,
			description: self.description,
			url: self.url,
			source: self.source,
			posted_date: self.posted_date,
			job_type: self.job_type,
			salary: self.salary,
			tags: Json(self.tags),
			remote: self.remote,
			created_at: self.created_at,
			view_count: 0,
			last_accessed_at: None,
			cached_description: None,
			cached_at: None,
		}
	}
}

#[derive(Debug, Clone)]
pub struct UpsertOutcome {
	pub is_new: bool,
	pub job: StoredJob,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobFilter {
	pub source: Option<String>,
	pub remote: Option<bool>,
	/// Case-insensitive substring over title, company, description and tags.
	pub keyword: Option<String>,
	/// Case-insensitive substring over location.
	pub location: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreSummary {
	pub total_jobs: i64,
	pub remote_jobs: i64,
	pub with_salary: i64,
	pub by_source: BTreeMap<String, i64>,
}
