//! Adzuna search API. Needs an application id and key; pages until a short page comes back.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use jobsift_config::AdzunaSource;
use jobsift_domain::{AliasTable, CandidateRecord};

use crate::{Error, PageBatch, Result, ScrapeQuery, collect_pages, join_url};

pub const SOURCE: &str = "adzuna";

pub async fn scrape(
	client: &Client,
	cfg: &AdzunaSource,
	query: &ScrapeQuery,
	page_delay: Duration,
) -> Result<Vec<CandidateRecord>> {
	let Some((app_id, app_key)) = cfg.credentials() else {
		return Err(Error::InvalidConfig {
			message: "Adzuna requires both app_id and app_key.".to_string(),
		});
	};

	collect_pages(SOURCE, query.max_pages, page_delay, |page| async move {
		let url = join_url(&cfg.api_base, &format!("/v1/api/jobs/{}/search/{page}", cfg.country));
		let per_page = cfg.results_per_page.to_string();
		let mut params = vec![
			("app_id", app_id),
			("app_key", app_key),
			("results_per_page", per_page.as_str()),
			("content-type", "application/json"),
		];

		if let Some(keywords) = query.keywords() {
			params.push(("what", keywords));
		}
		if let Some(location) = query.location() {
			params.push(("where", location));
		}

		let json: Value =
			client.get(url).query(&params).send().await?.error_for_status()?.json().await?;

		parse_page(&json, cfg.results_per_page)
	})
	.await
}

fn parse_page(json: &Value, results_per_page: u32) -> Result<PageBatch> {
	let results =
		json.get("results").and_then(Value::as_array).ok_or_else(|| Error::InvalidResponse {
			message: "Adzuna response is missing results array.".to_string(),
		})?;
	let aliases = AliasTable::default();
	let records = results
		.iter()
		.map(|job| {
			let mut record = CandidateRecord::from_json(SOURCE, job, &aliases);

			record.salary = salary_range(job);

			record
		})
		.collect::<Vec<_>>();
	let has_more = !results.is_empty()
		&& usize::try_from(results_per_page).is_ok_and(|per_page| results.len() >= per_page);

	Ok(PageBatch { records, has_more })
}

fn salary_range(job: &Value) -> Option<String> {
	let min = job.get("salary_min").and_then(Value::as_f64).filter(|min| *min > 0.0)?;
	let max = job.get("salary_max").and_then(Value::as_f64).unwrap_or(min);

	Some(format!("${}-${}", min.round() as i64, max.round() as i64))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn reads_nested_fields_and_salary() {
		let json = serde_json::json!({
			"count": 1,
			"results": [{
				"title": "Data Engineer",
				"company": { "display_name": "Acme" },
				"location": { "display_name": "Austin, Travis County" },
				"description": "Pipelines.",
				"redirect_url": "https://adzuna.example/1",
				"created": "2024-05-01T08:00:00Z",
				"contract_time": "full_time",
				"salary_min": 120000.0,
				"salary_max": 150000.4,
				"category": { "tag": "it-jobs", "label": "IT Jobs" }
			}]
		});
		let batch = parse_page(&json, 50).expect("Failed to parse fixture.");

		assert!(!batch.has_more);
		assert_eq!(batch.records[0].company, "Acme");
		assert_eq!(batch.records[0].location, "Austin, Travis County");
		assert_eq!(batch.records[0].salary.as_deref(), Some("$120000-$150000"));
		assert_eq!(batch.records[0].tags, vec!["it-jobs".to_string()]);
	}

	#[test]
	fn full_page_signals_more() {
		let json = serde_json::json!({ "results": [{ "title": "A" }, { "title": "B" }] });

		assert!(parse_page(&json, 2).expect("Failed to parse fixture.").has_more);

		let empty = parse_page(&serde_json::json!({ "results": [] }), 2)
			.expect("Failed to parse fixture.");

		assert!(!empty.has_more);
	}
}
