//! The set of adapters one service instance may run, fixed at construction.

use std::{sync::Arc, time::Duration};

use reqwest::Client;

use jobsift_config::{AdzunaSource, Config, RemoteOkSource, RemotiveSource, WeWorkRemotelySource};
use jobsift_domain::CandidateRecord;
use jobsift_sources::{ScrapeQuery, adzuna, remoteok, remotive, weworkremotely};

use crate::{BoxFuture, SourceAdapter};

#[derive(Clone, Default)]
pub struct SourceRegistry {
	adapters: Vec<Arc<dyn SourceAdapter>>,
}
impl SourceRegistry {
	pub fn new(adapters: Vec<Arc<dyn SourceAdapter>>) -> Self {
		Self { adapters }
	}

	/// Built-in adapters in a fixed order. Disabled sources are left out, and Adzuna is left out
	/// unless both credentials are configured.
	pub fn from_config(cfg: &Config) -> jobsift_sources::Result<Self> {
		let client = jobsift_sources::http_client(
			&cfg.http,
			Duration::from_millis(cfg.http.request_timeout_ms),
		)?;
		let page_delay = Duration::from_millis(cfg.http.page_delay_ms);
		let sources = &cfg.sources;
		let mut adapters: Vec<Arc<dyn SourceAdapter>> = Vec::new();

		if sources.remoteok.enabled {
			adapters.push(Arc::new(RemoteOkAdapter {
				client: client.clone(),
				cfg: sources.remoteok.clone(),
			}));
		}
		if sources.remotive.enabled {
			adapters.push(Arc::new(RemotiveAdapter {
				client: client.clone(),
				cfg: sources.remotive.clone(),
			}));
		}
		if sources.weworkremotely.enabled {
			adapters.push(Arc::new(WeWorkRemotelyAdapter {
				client: client.clone(),
				cfg: sources.weworkremotely.clone(),
				page_delay,
			}));
		}
		if sources.adzuna.enabled && sources.adzuna.credentials().is_some() {
			adapters.push(Arc::new(AdzunaAdapter {
				client,
				cfg: sources.adzuna.clone(),
				page_delay,
			}));
		} else if sources.adzuna.enabled {
			tracing::info!("Adzuna credentials are not configured. Source is not registered.");
		}

		Ok(Self { adapters })
	}

	pub fn names(&self) -> Vec<String> {
		self.adapters.iter().map(|adapter| adapter.name().to_string()).collect()
	}

	pub fn get(&self, name: &str) -> Option<Arc<dyn SourceAdapter>> {
		self.adapters.iter().find(|adapter| adapter.name().eq_ignore_ascii_case(name)).cloned()
	}

	/// Resolves a run's source list. Unknown names are skipped with a warning, duplicates run once,
	/// and an empty request falls back to `defaults`, then to every registered source.
	pub fn select(&self, requested: &[String], defaults: &[String]) -> Vec<Arc<dyn SourceAdapter>> {
		let names = if !requested.is_empty() {
			requested
		} else if !defaults.is_empty() {
			defaults
		} else {
			return self.adapters.clone();
		};
		let mut selected: Vec<Arc<dyn SourceAdapter>> = Vec::new();

		for name in names {
			let name = name.trim();

			match self.get(name) {
				Some(adapter) if selected.iter().all(|seen| seen.name() != adapter.name()) =>
					selected.push(adapter),
				Some(_) => {},
				None => tracing::warn!(source = name, "Unknown or unregistered source ignored."),
			}
		}

		selected
	}
}

struct RemoteOkAdapter {
	client: Client,
	cfg: RemoteOkSource,
}
impl SourceAdapter for RemoteOkAdapter {
	fn name(&self) -> &str {
		remoteok::SOURCE
	}

	fn scrape<'a>(
		&'a self,
		query: &'a ScrapeQuery,
	) -> BoxFuture<'a, jobsift_sources::Result<Vec<CandidateRecord>>> {
		Box::pin(remoteok::scrape(&self.client, &self.cfg, query))
	}
}

struct RemotiveAdapter {
	client: Client,
	cfg: RemotiveSource,
}
impl SourceAdapter for RemotiveAdapter {
	fn name(&self) -> &str {
		remotive::SOURCE
	}

	fn scrape<'a>(
		&'a self,
		query: &'a ScrapeQuery,
	) -> BoxFuture<'a, jobsift_sources::Result<Vec<CandidateRecord>>> {
		Box::pin(remotive::scrape(&self.client, &self.cfg, query))
	}
}

struct WeWorkRemotelyAdapter {
	client: Client,
	cfg: WeWorkRemotelySource,
	page_delay: Duration,
}
impl SourceAdapter for WeWorkRemotelyAdapter {
	fn name(&self) -> &str {
		weworkremotely::SOURCE
	}

	fn scrape<'a>(
		&'a self,
		query: &'a ScrapeQuery,
	) -> BoxFuture<'a, jobsift_sources::Result<Vec<CandidateRecord>>> {
		Box::pin(weworkremotely::scrape(&self.client, &self.cfg, query, self.page_delay))
	}
}

struct AdzunaAdapter {
	client: Client,
	cfg: AdzunaSource,
	page_delay: Duration,
}
impl SourceAdapter for AdzunaAdapter {
	fn name(&self) -> &str {
		adzuna::SOURCE
	}

	fn scrape<'a>(
		&'a self,
		query: &'a ScrapeQuery,
	) -> BoxFuture<'a, jobsift_sources::Result<Vec<CandidateRecord>>> {
		Box::pin(adzuna::scrape(&self.client, &self.cfg, query, self.page_delay))
	}
}
