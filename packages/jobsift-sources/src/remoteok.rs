//! RemoteOK public JSON feed. One request returns the whole board; the first element is a legal
//! notice, not a job.

use reqwest::Client;
use serde_json::Value;

use jobsift_config::RemoteOkSource;
use jobsift_domain::{AliasTable, CandidateRecord};

use crate::{Error, Result, ScrapeQuery, join_url};

pub const SOURCE: &str = "remoteok";

pub async fn scrape(
	client: &Client,
	cfg: &RemoteOkSource,
	query: &ScrapeQuery,
) -> Result<Vec<CandidateRecord>> {
	let res = client.get(join_url(&cfg.api_base, "/api")).send().await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_listing(&cfg.api_base, &json, query)
}

fn parse_listing(
	api_base: &str,
	json: &Value,
	query: &ScrapeQuery,
) -> Result<Vec<CandidateRecord>> {
	let items = json.as_array().ok_or_else(|| Error::InvalidResponse {
		message: "RemoteOK response is not a JSON array.".to_string(),
	})?;
	let aliases = AliasTable::default();
	let mut records = Vec::new();

	for item in items.iter().filter(|item| is_posting(item)) {
		if !query.matches_keywords(&item.to_string()) {
			continue;
		}

		let mut record = CandidateRecord::from_json(SOURCE, item, &aliases);

		if record.url.is_empty()
			&& let Some(id) = item.get("id").and_then(id_text)
		{
			record.url = join_url(api_base, &format!("/remote-jobs/{id}"));
		}
		if record.location.is_empty() {
			record.location = "Remote".to_string();
		}

		record.remote = true;

		records.push(record);
	}

	Ok(records)
}

fn is_posting(item: &Value) -> bool {
	item.get("legal").is_none() && item.get("id").is_some()
}

fn id_text(value: &Value) -> Option<String> {
	match value {
		Value::String(raw) if !raw.trim().is_empty() => Some(raw.trim().to_string()),
		Value::Number(number) => Some(number.to_string()),
		_ => None,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn skips_notice_and_fills_defaults() {
		let json = serde_json::json!([
			{ "legal": "Terms apply." },
			{
				"id": "1234",
				"position": "Rust Engineer",
				"company": "Acme",
				"location": "",
				"date": "2024-05-01T00:00:00+00:00",
				"tags": ["rust", "backend"]
			},
			{ "id": 99, "position": "Designer", "company": "Studio" }
		]);
		let query = ScrapeQuery { keywords: Some("rust".to_string()), ..Default::default() };
		let records = parse_listing("https://remoteok.com", &json, &query)
			.expect("Failed to parse fixture.");

		assert_eq!(records.len(), 1);
		assert_eq!(records[0].title, "Rust Engineer");
		assert_eq!(records[0].location, "Remote");
		assert_eq!(records[0].url, "https://remoteok.com/remote-jobs/1234");
		assert!(records[0].remote);
	}

	#[test]
	fn non_array_body_is_rejected() {
		let json = serde_json::json!({ "error": "rate limited" });

		assert!(parse_listing("https://remoteok.com", &json, &ScrapeQuery::default()).is_err());
	}
}
