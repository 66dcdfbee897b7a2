pub mod aggregate;
pub mod details;
pub mod list;
pub mod registry;
pub mod stats;

mod error;

pub use aggregate::{AggregateRequest, AggregationStats, SourceStats, SourceStatus};
pub use details::{DETAILS_UNAVAILABLE_MARKER, DetailView, HttpDetailFetcher};
pub use error::{Error, Result};
pub use jobsift_storage::BoxFuture;
pub use list::{JobItem, ListRequest, ListResponse};
pub use registry::SourceRegistry;
pub use stats::Statistics;

use std::{sync::Arc, time::Duration};

use jobsift_config::Config;
use jobsift_domain::CandidateRecord;
use jobsift_sources::ScrapeQuery;
use jobsift_storage::JobStore;

/// One source's fetch-and-extract routine. `Ok(empty)` means no results, only `Err` is a failure.
pub trait SourceAdapter
where
	Self: Send + Sync,
{
	fn name(&self) -> &str;

	fn scrape<'a>(
		&'a self,
		query: &'a ScrapeQuery,
	) -> BoxFuture<'a, jobsift_sources::Result<Vec<CandidateRecord>>>;
}

/// Loads the full description behind a posting URL.
pub trait DetailFetcher
where
	Self: Send + Sync,
{
	fn fetch<'a>(
		&'a self,
		url: &'a str,
		source: &'a str,
	) -> BoxFuture<'a, jobsift_sources::Result<String>>;
}

pub struct JobSiftService {
	pub cfg: Config,
	pub store: Arc<dyn JobStore>,
	pub registry: SourceRegistry,
	pub fetcher: Arc<dyn DetailFetcher>,
}
impl JobSiftService {
	pub fn new(cfg: Config, store: Arc<dyn JobStore>) -> Result<Self> {
		let registry = SourceRegistry::from_config(&cfg)?;
		let fetcher =
			HttpDetailFetcher::new(&cfg.http, Duration::from_millis(cfg.details.timeout_ms))?;

		Ok(Self { cfg, store, registry, fetcher: Arc::new(fetcher) })
	}

	pub fn with_parts(
		cfg: Config,
		store: Arc<dyn JobStore>,
		registry: SourceRegistry,
		fetcher: Arc<dyn DetailFetcher>,
	) -> Self {
		Self { cfg, store, registry, fetcher }
	}
}
