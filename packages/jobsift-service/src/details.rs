//! Cache-aside detail enrichment.
//!
//! Every lookup of a known job counts as a view. Full descriptions come from the cache when the
//! caller allows it, otherwise from the posting page, and a failed fetch degrades to the stored
//! preview instead of an error.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use jobsift_config::Http;
use jobsift_storage::models::StoredJob;

use crate::{BoxFuture, DetailFetcher, Error, JobItem, JobSiftService, Result};

pub const DETAILS_UNAVAILABLE_MARKER: &str = "... (Full details unavailable)";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailView {
	pub job: JobItem,
	pub description: String,
	pub from_cache: bool,
	pub view_count: i64,
}

pub struct HttpDetailFetcher {
	client: Client,
}
impl HttpDetailFetcher {
	pub fn new(cfg: &Http, timeout: Duration) -> jobsift_sources::Result<Self> {
		Ok(Self { client: jobsift_sources::http_client(cfg, timeout)? })
	}
}
impl DetailFetcher for HttpDetailFetcher {
	fn fetch<'a>(
		&'a self,
		url: &'a str,
		source: &'a str,
	) -> BoxFuture<'a, jobsift_sources::Result<String>> {
		Box::pin(jobsift_sources::detail::fetch_description(&self.client, url, source))
	}
}

impl JobSiftService {
	pub async fn get_details(&self, job_id: Uuid, use_cache: bool) -> Result<DetailView> {
		let now = OffsetDateTime::now_utc();
		let job = self
			.store
			.record_view(job_id, now)
			.await?
			.ok_or_else(|| Error::NotFound { message: format!("Job {job_id} does not exist.") })?;

		if use_cache
			&& let Some(cached) = job.cached_description.as_deref().filter(|text| !text.is_empty())
		{
			let description = cached.to_string();

			return Ok(view(job, description, true));
		}

		let description = match self.fetch_full(&job).await {
			Some(full) => {
				if let Err(err) = self.store.cache_description(job.job_id, &full, now).await {
					tracing::warn!(error = %err, %job_id, "Failed to cache fetched description.");
				}

				full
			},
			None => preview_with_marker(&job.description, self.cfg.details.preview_chars),
		};

		Ok(view(job, description, false))
	}

	async fn fetch_full(&self, job: &StoredJob) -> Option<String> {
		if job.url.trim().is_empty() {
			tracing::warn!(job_id = %job.job_id, "Job has no source URL. Using preview.");

			return None;
		}

		match self.fetcher.fetch(&job.url, &job.source).await {
			Ok(full) if !full.trim().is_empty() => Some(full),
			Ok(_) => {
				tracing::warn!(
					job_id = %job.job_id,
					"Fetched description is empty. Using preview."
				);

				None
			},
			Err(err) => {
				tracing::warn!(
					error = %err,
					job_id = %job.job_id,
					url = job.url.as_str(),
					"Detail fetch failed. Using preview."
				);

				None
			},
		}
	}
}

pub fn preview_with_marker(description: &str, preview_chars: u32) -> String {
	let limit = usize::try_from(preview_chars).unwrap_or(usize::MAX);
	let mut preview = description.chars().take(limit).collect::<String>();

	preview.push_str(DETAILS_UNAVAILABLE_MARKER);

	preview
}

fn view(job: StoredJob, description: String, from_cache: bool) -> DetailView {
	let view_count = job.view_count;

	DetailView { job: JobItem::from(job), description, from_cache, view_count }
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn preview_counts_characters_not_bytes() {
		assert_eq!(
			preview_with_marker("héllo wörld", 5),
			format!("héllo{DETAILS_UNAVAILABLE_MARKER}")
		);
		assert_eq!(preview_with_marker("", 5), DETAILS_UNAVAILABLE_MARKER);
	}
}
