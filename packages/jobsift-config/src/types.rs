use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub aggregation: Aggregation,
	#[serde(default)]
	pub http: Http,
	#[serde(default)]
	pub details: Details,
	#[serde(default)]
	pub sources: Sources,
	/// Named keyword sets the worker can run in one go.
	#[serde(default)]
	pub profiles: Vec<Profile>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Aggregation {
	/// Drop candidates whose location does not classify as domestic before they are stored.
	pub us_only: bool,
	/// Flat courtesy pause between two sources of one run.
	pub inter_source_delay_ms: u64,
	/// Upper bound for a single adapter call, all pages included.
	pub source_timeout_ms: u64,
	pub max_pages: u32,
	/// Sources used when a run does not name any. Empty means every registered source.
	#[serde(default)]
	pub default_sources: Vec<String>,
}

/// One aggregation per keyword. Location and sources apply to every keyword of the profile.
#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
	pub name: String,
	pub keywords: Vec<String>,
	#[serde(default)]
	pub location: Option<String>,
	/// Empty means the run falls back to `aggregation.default_sources`.
	#[serde(default)]
	pub sources: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Http {
	pub user_agent: String,
	pub request_timeout_ms: u64,
	pub page_delay_ms: u64,
}
impl Default for Http {
	fn default() -> Self {
		Self {
			user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string(),
			request_timeout_ms: 30_000,
			page_delay_ms: 1_000,
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Details {
	pub timeout_ms: u64,
	pub preview_chars: u32,
}
impl Default for Details {
	fn default() -> Self {
		Self { timeout_ms: 10_000, preview_chars: 500 }
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Sources {
	pub remoteok: RemoteOkSource,
	pub remotive: RemotiveSource,
	pub weworkremotely: WeWorkRemotelySource,
	pub adzuna: AdzunaSource,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RemoteOkSource {
	pub enabled: bool,
	pub api_base: String,
}
impl Default for RemoteOkSource {
	fn default() -> Self {
		Self { enabled: true, api_base: "https://remoteok.com".to_string() }
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RemotiveSource {
	pub enabled: bool,
	pub api_base: String,
}
impl Default for RemotiveSource {
	fn default() -> Self {
		Self { enabled: true, api_base: "https://remotive.com".to_string() }
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WeWorkRemotelySource {
	pub enabled: bool,
	pub api_base: String,
	/// Feed paths under `api_base`, one per job category.
	pub feeds: Vec<String>,
}
impl Default for WeWorkRemotelySource {
	fn default() -> Self {
		Self {
			enabled: true,
			api_base: "https://weworkremotely.com".to_string(),
			feeds: vec![
				"/categories/remote-programming-jobs.rss".to_string(),
				"/categories/remote-devops-sysadmin-jobs.rss".to_string(),
			],
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AdzunaSource {
	pub enabled: bool,
	pub api_base: String,
	pub app_id: Option<String>,
	pub app_key: Option<String>,
	pub country: String,
	pub results_per_page: u32,
}
impl AdzunaSource {
	pub fn credentials(&self) -> Option<(&str, &str)> {
		Some((self.app_id.as_deref()?, self.app_key.as_deref()?))
	}
}
impl Default for AdzunaSource {
	fn default() -> Self {
		Self {
			enabled: true,
			api_base: "https://api.adzuna.com".to_string(),
			app_id: None,
			app_key: None,
			country: "us".to_string(),
			results_per_page: 50,
		}
	}
}
