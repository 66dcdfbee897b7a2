//! Aggregation runs: adapters, then classification, normalization and dedup, one source at a time.

use std::{collections::BTreeMap, time::Duration};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio::time::{self as tokio_time, Instant};

use jobsift_domain::{
	CandidateRecord, NormalizedRecord, fingerprint, is_domestic, job_id, normalize_at,
};
use jobsift_sources::ScrapeQuery;
use jobsift_storage::models::NewJob;

use crate::{JobSiftService, SourceAdapter};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AggregateRequest {
	/// Source names to run. Empty means the configured defaults.
	#[serde(default)]
	pub sources: Vec<String>,
	pub keywords: Option<String>,
	pub location: Option<String>,
	pub max_pages: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceStatus {
	Completed,
	/// The adapter errored or timed out. Nothing was ingested and every count is zero.
	Failed,
	/// The adapter succeeded but storage broke mid-ingest. Counts cover what was handled before
	/// the error, so rows already written stay accounted for.
	Interrupted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceStats {
	pub status: SourceStatus,
	/// Candidates the adapter returned, before any filtering.
	pub seen: u64,
	pub new: u64,
	pub duplicates: u64,
	/// Dropped by the domestic-only filter.
	pub filtered: u64,
	/// Dropped for lacking a title or company.
	pub skipped: u64,
	pub error: Option<String>,
	pub elapsed_ms: u64,
}
impl SourceStats {
	fn running() -> Self {
		Self {
			status: SourceStatus::Completed,
			seen: 0,
			new: 0,
			duplicates: 0,
			filtered: 0,
			skipped: 0,
			error: None,
			elapsed_ms: 0,
		}
	}

	fn fail(&mut self, error: String) {
		self.status = SourceStatus::Failed;
		self.error = Some(error);
	}

	fn interrupt(&mut self, error: String) {
		self.status = SourceStatus::Interrupted;
		self.error = Some(error);
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationStats {
	pub total_seen: u64,
	pub total_new: u64,
	pub total_duplicates: u64,
	pub total_filtered: u64,
	pub total_skipped: u64,
	/// Keyed by source name, so the shape does not depend on execution order.
	pub by_source: BTreeMap<String, SourceStats>,
	#[serde(with = "time::serde::rfc3339")]
	pub started_at: OffsetDateTime,
	pub duration_ms: u64,
}
impl AggregationStats {
	fn from_sources(
		by_source: BTreeMap<String, SourceStats>,
		started_at: OffsetDateTime,
		duration_ms: u64,
	) -> Self {
		let sum = |pick: fn(&SourceStats) -> u64| by_source.values().map(pick).sum::<u64>();
		let total_seen = sum(|stats| stats.seen);
		let total_new = sum(|stats| stats.new);
		let total_duplicates = sum(|stats| stats.duplicates);
		let total_filtered = sum(|stats| stats.filtered);
		let total_skipped = sum(|stats| stats.skipped);

		Self {
			total_seen,
			total_new,
			total_duplicates,
			total_filtered,
			total_skipped,
			by_source,
			started_at,
			duration_ms,
		}
	}

	pub fn failed_sources(&self) -> impl Iterator<Item = &str> {
		self.sources_with(SourceStatus::Failed)
	}

	pub fn interrupted_sources(&self) -> impl Iterator<Item = &str> {
		self.sources_with(SourceStatus::Interrupted)
	}

	fn sources_with(&self, status: SourceStatus) -> impl Iterator<Item = &str> {
		self.by_source
			.iter()
			.filter(move |(_, stats)| stats.status == status)
			.map(|(name, _)| name.as_str())
	}
}

impl JobSiftService {
	/// Runs the selected sources one after another and reports what happened to each.
	///
	/// Never fails as a whole. Adapter errors, timeouts, and storage errors are recorded against
	/// the source they happened in and the run moves on.
	pub async fn aggregate(&self, req: AggregateRequest) -> AggregationStats {
		let started_at = OffsetDateTime::now_utc();
		let clock = Instant::now();
		let query = ScrapeQuery {
			keywords: req.keywords.clone(),
			location: req.location.clone(),
			max_pages: req
				.max_pages
				.filter(|pages| *pages > 0)
				.unwrap_or(self.cfg.aggregation.max_pages),
		};
		let adapters = self.registry.select(&req.sources, &self.cfg.aggregation.default_sources);
		let pacing = Duration::from_millis(self.cfg.aggregation.inter_source_delay_ms);
		let mut by_source = BTreeMap::new();

		tracing::info!(
			sources = ?adapters.iter().map(|adapter| adapter.name()).collect::<Vec<_>>(),
			keywords = ?query.keywords,
			location = ?query.location,
			max_pages = query.max_pages,
			"Aggregation run started."
		);

		for (idx, adapter) in adapters.iter().enumerate() {
			if idx > 0 && !pacing.is_zero() {
				tokio_time::sleep(pacing).await;
			}

			let stats = self.run_source(adapter.as_ref(), &query).await;

			by_source.insert(adapter.name().to_string(), stats);
		}

		let stats = AggregationStats::from_sources(by_source, started_at, elapsed_ms(clock));

		tracing::info!(
			seen = stats.total_seen,
			new = stats.total_new,
			duplicates = stats.total_duplicates,
			filtered = stats.total_filtered,
			skipped = stats.total_skipped,
			duration_ms = stats.duration_ms,
			"Aggregation run finished."
		);

		stats
	}

	async fn run_source(&self, adapter: &dyn SourceAdapter, query: &ScrapeQuery) -> SourceStats {
		let clock = Instant::now();
		let mut stats = SourceStats::running();
		let timeout_ms = self.cfg.aggregation.source_timeout_ms;
		let bounded = tokio_time::timeout(Duration::from_millis(timeout_ms), adapter.scrape(query));
		let scraped = match bounded.await {
			Ok(result) => result,
			Err(_) => Err(jobsift_sources::Error::Timeout {
				source_name: adapter.name().to_string(),
				timeout_ms,
			}),
		};

		match scraped {
			Ok(candidates) => self.ingest(adapter.name(), candidates, &mut stats).await,
			Err(err) => {
				tracing::warn!(error = %err, source = adapter.name(), "Source adapter failed.");

				stats.fail(err.to_string());
			},
		}

		stats.elapsed_ms = elapsed_ms(clock);

		tracing::info!(
			source = adapter.name(),
			status = ?stats.status,
			seen = stats.seen,
			new = stats.new,
			duplicates = stats.duplicates,
			filtered = stats.filtered,
			skipped = stats.skipped,
			elapsed_ms = stats.elapsed_ms,
			"Source finished."
		);

		stats
	}

	async fn ingest(
		&self,
		source: &str,
		candidates: Vec<CandidateRecord>,
		stats: &mut SourceStats,
	) {
		let us_only = self.cfg.aggregation.us_only;
		let now = OffsetDateTime::now_utc();

		for candidate in candidates {
			stats.seen += 1;

			if us_only && !is_domestic(&candidate.location) {
				stats.filtered += 1;

				continue;
			}

			let normalized = normalize_at(candidate, now);

			if !normalized.is_storable() {
				stats.skipped += 1;

				continue;
			}

			let job = new_job(normalized, now);

			match self.store.upsert(&job).await {
				Ok(outcome) if outcome.is_new => stats.new += 1,
				Ok(_) => stats.duplicates += 1,
				Err(err) => {
					tracing::error!(
						error = %err,
						source,
						"Failed to store job. Stopping this source."
					);

					stats.interrupt(format!("Storage error: {err}"));

					return;
				},
			}
		}
	}
}

pub fn new_job(record: NormalizedRecord, now: OffsetDateTime) -> NewJob {
	let key = fingerprint(&record.title, &record.company, &record.location);

	NewJob {
		job_id: job_id(&key),
		fingerprint: key,
		title: record.title,
		company: record.company,
		location: record.location,
		description: record.description,
		url: record.url,
		source: record.source,
		posted_date: record.posted_date,
		job_type: record.job_type,
		salary: record.salary,
		tags: record.tags,
		remote: record.remote,
		created_at: now,
	}
}

fn elapsed_ms(clock: Instant) -> u64 {
	u64::try_from(clock.elapsed().as_millis()).unwrap_or(u64::MAX)
}
