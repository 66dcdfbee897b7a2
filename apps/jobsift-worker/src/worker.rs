use std::{collections::BTreeSet, time::Duration};

use serde::Serialize;
use tokio::time::{self as tokio_time, MissedTickBehavior};

use jobsift_service::{AggregateRequest, AggregationStats, JobSiftService, SourceStatus};

use crate::{Error, Result};

/// Stats of one keyword's aggregation.
#[derive(Debug, Serialize)]
pub struct KeywordRun {
	pub keywords: Option<String>,
	pub stats: AggregationStats,
}

/// Every keyword of one worker run, with the counts summed across them.
#[derive(Debug, Default, Serialize)]
pub struct RunSummary {
	pub total_seen: u64,
	pub total_new: u64,
	pub total_duplicates: u64,
	pub runs: Vec<KeywordRun>,
}
impl RunSummary {
	fn push(&mut self, keywords: Option<String>, stats: AggregationStats) {
		self.total_seen += stats.total_seen;
		self.total_new += stats.total_new;
		self.total_duplicates += stats.total_duplicates;

		self.runs.push(KeywordRun { keywords, stats });
	}

	/// Every source that ran, or `None` when at least one of them completed.
	fn unfinished_sources(&self) -> Option<Vec<&str>> {
		let mut attempted = BTreeSet::new();
		let mut completed = BTreeSet::new();

		for run in &self.runs {
			for (name, stats) in &run.stats.by_source {
				attempted.insert(name.as_str());

				if stats.status == SourceStatus::Completed {
					completed.insert(name.as_str());
				}
			}
		}

		if attempted.is_empty() || !completed.is_empty() {
			return None;
		}

		Some(attempted.into_iter().collect())
	}
}

/// One pass over the plan, or one pass per tick when `interval` is set. Scheduled runs never stop
/// on a bad pass.
pub async fn run_worker(
	service: &JobSiftService,
	plan: &[AggregateRequest],
	interval: Option<Duration>,
) -> Result<()> {
	let Some(period) = interval else {
		run_once(service, plan).await?;

		return Ok(());
	};
	let mut ticker = tokio_time::interval(period);

	ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

	tracing::info!(interval_secs = period.as_secs(), "Scheduled aggregation started.");

	loop {
		ticker.tick().await;

		if let Err(err) = run_once(service, plan).await {
			tracing::error!(error = %err, "Scheduled aggregation run failed.");
		}
	}
}

/// Runs one aggregation per planned request and logs the combined stats as a JSON document.
///
/// Fails only when sources were selected and none of them completed in any aggregation.
pub async fn run_once(service: &JobSiftService, plan: &[AggregateRequest]) -> Result<RunSummary> {
	let mut summary = RunSummary::default();

	for req in plan {
		let keywords = req.keywords.clone();
		let stats = service.aggregate(req.clone()).await;

		tracing::info!(
			keywords = keywords.as_deref().unwrap_or(""),
			new = stats.total_new,
			seen = stats.total_seen,
			"Keyword aggregation finished."
		);

		summary.push(keywords, stats);
	}

	let rendered = serde_json::to_string(&summary)?;

	tracing::info!(stats = %rendered, "Aggregation stats.");

	if let Some(unfinished) = summary.unfinished_sources() {
		return Err(Error::AllSourcesFailed(unfinished.join(", ")));
	}

	Ok(summary)
}
