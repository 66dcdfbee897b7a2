pub mod worker;

mod error;

pub use error::{Error, Result};

use std::{path::PathBuf, sync::Arc, time::Duration};

use clap::Parser;

use jobsift_config::Config;
use jobsift_service::{AggregateRequest, JobSiftService};
use jobsift_storage::db::Db;

#[derive(Debug, Parser)]
#[command(
	version = jobsift_cli::VERSION,
	rename_all = "kebab",
	styles = jobsift_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	/// Source to run. Repeat for several; omit for the configured defaults.
	#[arg(long = "source", value_name = "NAME")]
	pub sources: Vec<String>,
	/// Keywords for one aggregation. Repeat to run one aggregation per value.
	#[arg(long, value_name = "TEXT", conflicts_with = "profile")]
	pub keywords: Vec<String>,
	/// Named keyword profile from the config file.
	#[arg(long, value_name = "NAME")]
	pub profile: Option<String>,
	#[arg(long, value_name = "TEXT")]
	pub location: Option<String>,
	#[arg(long, value_name = "N")]
	pub max_pages: Option<u32>,
	/// Repeat the run every S seconds instead of exiting after one.
	#[arg(long, value_name = "S")]
	pub interval_secs: Option<u64>,
}
impl Args {
	/// One request per keyword. Flags override the profile's location and sources.
	pub fn plan(&self, cfg: &Config) -> Result<Vec<AggregateRequest>> {
		let (keywords, location, sources) = match &self.profile {
			Some(name) => {
				let profile = cfg
					.profiles
					.iter()
					.find(|profile| profile.name == name.trim())
					.ok_or_else(|| Error::Validation(format!("Unknown profile: {name}.")))?;
				let sources =
					if self.sources.is_empty() { &profile.sources } else { &self.sources };

				(
					&profile.keywords,
					self.location.clone().or_else(|| profile.location.clone()),
					sources,
				)
			},
			None => (&self.keywords, self.location.clone(), &self.sources),
		};
		let request = |keywords: Option<String>| AggregateRequest {
			sources: sources.clone(),
			keywords,
			location: location.clone(),
			max_pages: self.max_pages,
		};

		if keywords.is_empty() {
			return Ok(vec![request(None)]);
		}

		Ok(keywords.iter().map(|keywords| request(Some(keywords.clone()))).collect())
	}

	pub fn interval(&self) -> Result<Option<Duration>> {
		match self.interval_secs {
			Some(0) =>
				Err(Error::Validation("--interval-secs must be greater than zero.".to_string())),
			Some(secs) => Ok(Some(Duration::from_secs(secs))),
			None => Ok(None),
		}
	}
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = jobsift_config::load(&args.config)?;

	jobsift_cli::init_tracing(&config.service.log_level)?;

	let interval = args.interval()?;
	let plan = args.plan(&config)?;
	let db = Db::connect(&config.storage.postgres).await?;

	db.ensure_schema().await?;

	let service = JobSiftService::new(config, Arc::new(db))?;

	worker::run_worker(&service, &plan, interval).await?;

	Ok(())
}
