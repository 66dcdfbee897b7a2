mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	AdzunaSource, Aggregation, Config, Details, Http, Postgres, Profile, RemoteOkSource,
	RemotiveSource, Service, Sources, Storage, WeWorkRemotelySource,
};

use std::{collections::HashSet, fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	for (label, value) in [
		("service.http_bind", &cfg.service.http_bind),
		("service.log_level", &cfg.service.log_level),
		("storage.postgres.dsn", &cfg.storage.postgres.dsn),
	] {
		if value.trim().is_empty() {
			return Err(Error::Validation { message: format!("{label} must be non-empty.") });
		}
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if cfg.aggregation.max_pages == 0 {
		return Err(Error::Validation {
			message: "aggregation.max_pages must be greater than zero.".to_string(),
		});
	}
	if cfg.aggregation.source_timeout_ms == 0 {
		return Err(Error::Validation {
			message: "aggregation.source_timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.aggregation.default_sources.iter().any(|name| name.trim().is_empty()) {
		return Err(Error::Validation {
			message: "aggregation.default_sources must not contain empty names.".to_string(),
		});
	}
	if cfg.http.request_timeout_ms == 0 {
		return Err(Error::Validation {
			message: "http.request_timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.details.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "details.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.details.preview_chars == 0 {
		return Err(Error::Validation {
			message: "details.preview_chars must be greater than zero.".to_string(),
		});
	}

	let sources = &cfg.sources;

	for (label, enabled, api_base) in [
		("sources.remoteok.api_base", sources.remoteok.enabled, &sources.remoteok.api_base),
		("sources.remotive.api_base", sources.remotive.enabled, &sources.remotive.api_base),
		(
			"sources.weworkremotely.api_base",
			sources.weworkremotely.enabled,
			&sources.weworkremotely.api_base,
		),
		("sources.adzuna.api_base", sources.adzuna.enabled, &sources.adzuna.api_base),
	] {
		if enabled && api_base.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("{label} must be non-empty when the source is enabled."),
			});
		}
	}

	if sources.weworkremotely.enabled && sources.weworkremotely.feeds.is_empty() {
		return Err(Error::Validation {
			message: "sources.weworkremotely.feeds must be non-empty when the source is enabled."
				.to_string(),
		});
	}
	if sources.adzuna.app_id.is_some() != sources.adzuna.app_key.is_some() {
		return Err(Error::Validation {
			message: "sources.adzuna.app_id and sources.adzuna.app_key must be set together."
				.to_string(),
		});
	}
	if sources.adzuna.results_per_page == 0 {
		return Err(Error::Validation {
			message: "sources.adzuna.results_per_page must be greater than zero.".to_string(),
		});
	}

	validate_profiles(&cfg.profiles)
}

fn validate_profiles(profiles: &[Profile]) -> Result<()> {
	let mut names = HashSet::new();

	for profile in profiles {
		let name = profile.name.trim();

		if name.is_empty() {
			return Err(Error::Validation {
				message: "profiles.name must be non-empty.".to_string(),
			});
		}
		if !names.insert(name) {
			return Err(Error::Validation { message: format!("Duplicate profile name: {name}.") });
		}
		if profile.keywords.is_empty()
			|| profile.keywords.iter().any(|keywords| keywords.trim().is_empty())
		{
			return Err(Error::Validation {
				message: format!("profiles.{name}.keywords must list non-empty entries."),
			});
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	let adzuna = &mut cfg.sources.adzuna;

	if adzuna.app_id.as_deref().map(|id| id.trim().is_empty()).unwrap_or(false) {
		adzuna.app_id = None;
	}
	if adzuna.app_key.as_deref().map(|key| key.trim().is_empty()).unwrap_or(false) {
		adzuna.app_key = None;
	}

	adzuna.country = adzuna.country.trim().to_lowercase();

	for name in &mut cfg.aggregation.default_sources {
		*name = name.trim().to_lowercase();
	}

	for profile in &mut cfg.profiles {
		profile.name = profile.name.trim().to_string();

		for name in &mut profile.sources {
			*name = name.trim().to_lowercase();
		}
	}
}
