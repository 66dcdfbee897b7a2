//! Remotive public API. Keyword search is done upstream.

use reqwest::Client;
use serde_json::Value;

use jobsift_config::RemotiveSource;
use jobsift_domain::{AliasTable, CandidateRecord};

use crate::{Error, Result, ScrapeQuery, join_url};

pub const SOURCE: &str = "remotive";

pub async fn scrape(
	client: &Client,
	cfg: &RemotiveSource,
	query: &ScrapeQuery,
) -> Result<Vec<CandidateRecord>> {
	let mut request = client.get(join_url(&cfg.api_base, "/api/remote-jobs"));

	if let Some(keywords) = query.keywords() {
		request = request.query(&[("search", keywords)]);
	}

	let json: Value = request.send().await?.error_for_status()?.json().await?;

	parse_listing(&json)
}

fn parse_listing(json: &Value) -> Result<Vec<CandidateRecord>> {
	let jobs = json.get("jobs").and_then(Value::as_array).ok_or_else(|| Error::InvalidResponse {
		message: "Remotive response is missing jobs array.".to_string(),
	})?;
	let aliases = AliasTable::default();

	Ok(jobs
		.iter()
		.map(|job| {
			let mut record = CandidateRecord::from_json(SOURCE, job, &aliases);

			if record.tags.is_empty()
				&& let Some(category) = job.get("category").and_then(Value::as_str)
				&& !category.trim().is_empty()
			{
				record.tags.push(category.trim().to_string());
			}
			if record.location.is_empty() {
				record.location = "Remote".to_string();
			}

			record.remote = true;

			record
		})
		.collect())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn uses_required_location_and_category_tag() {
		let json = serde_json::json!({
			"job-count": 1,
			"jobs": [{
				"id": 7,
				"url": "https://remotive.com/remote-jobs/software-dev/7",
				"title": "Platform Engineer",
				"company_name": "Initech",
				"category": "Software Development",
				"job_type": "full_time",
				"publication_date": "2024-05-01T10:00:00",
				"candidate_required_location": "USA Only",
				"salary": "",
				"description": "<p>Build things.</p>"
			}]
		});
		let records = parse_listing(&json).expect("Failed to parse fixture.");

		assert_eq!(records.len(), 1);
		assert_eq!(records[0].company, "Initech");
		assert_eq!(records[0].location, "USA Only");
		assert_eq!(records[0].tags, vec!["Software Development".to_string()]);
		assert_eq!(records[0].salary, None);
		assert_eq!(records[0].job_type.as_deref(), Some("full_time"));
	}

	#[test]
	fn empty_listing_is_not_an_error() {
		let json = serde_json::json!({ "jobs": [] });

		assert!(parse_listing(&json).expect("Failed to parse fixture.").is_empty());
	}
}
