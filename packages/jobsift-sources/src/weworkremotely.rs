//! We Work Remotely category RSS feeds. Each feed counts as one page.

use std::time::Duration;

use feed_rs::model::Entry;
use reqwest::Client;

use jobsift_config::WeWorkRemotelySource;
use jobsift_domain::CandidateRecord;

use crate::{PageBatch, Result, ScrapeQuery, collect_pages, join_url};

pub const SOURCE: &str = "weworkremotely";

pub async fn scrape(
	client: &Client,
	cfg: &WeWorkRemotelySource,
	query: &ScrapeQuery,
	page_delay: Duration,
) -> Result<Vec<CandidateRecord>> {
	let pages = u32::try_from(cfg.feeds.len()).unwrap_or(u32::MAX);

	collect_pages(SOURCE, pages, page_delay, |page| async move {
		let idx = usize::try_from(page.saturating_sub(1)).unwrap_or(usize::MAX);
		let Some(feed_path) = cfg.feeds.get(idx) else {
			return Ok(PageBatch { records: Vec::new(), has_more: false });
		};
		let records = fetch_feed(client, &join_url(&cfg.api_base, feed_path), query).await?;

		Ok(PageBatch { records, has_more: true })
	})
	.await
}

async fn fetch_feed(
	client: &Client,
	url: &str,
	query: &ScrapeQuery,
) -> Result<Vec<CandidateRecord>> {
	let bytes = client.get(url).send().await?.error_for_status()?.bytes().await?;

	parse_feed(&bytes, query)
}

fn parse_feed(bytes: &[u8], query: &ScrapeQuery) -> Result<Vec<CandidateRecord>> {
	let feed = feed_rs::parser::parse(bytes)?;

	Ok(feed
		.entries
		.into_iter()
		.map(entry_to_candidate)
		.filter(|record| {
			query.matches_keywords(&record.title)
				|| query.matches_keywords(&record.company)
				|| query.matches_keywords(&record.description)
		})
		.collect())
}

fn entry_to_candidate(entry: Entry) -> CandidateRecord {
	let heading = entry.title.map(|title| title.content).unwrap_or_default();
	let (company, title) = split_heading(&heading);
	let description = entry
		.summary
		.map(|summary| summary.content)
		.or_else(|| entry.content.and_then(|content| content.body))
		.unwrap_or_default();
	let url = entry
		.links
		.first()
		.map(|link| link.href.clone())
		.or_else(|| entry.id.starts_with("http").then(|| entry.id.clone()))
		.unwrap_or_default();

	CandidateRecord {
		title,
		company,
		location: "Remote".to_string(),
		description,
		url,
		source: SOURCE.to_string(),
		posted_date: entry.published.or(entry.updated).map(|date| date.to_rfc3339()),
		job_type: None,
		salary: None,
		tags: entry.categories.into_iter().map(|category| category.term).collect(),
		remote: true,
	}
}

/// Feed titles read `Company: Position`. Without a colon the whole heading is the position.
fn split_heading(heading: &str) -> (String, String) {
	match heading.split_once(':') {
		Some((company, title)) if !company.trim().is_empty() && !title.trim().is_empty() =>
			(company.trim().to_string(), title.trim().to_string()),
		_ => (String::new(), heading.trim().to_string()),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>We Work Remotely: Programming</title>
    <link>https://weworkremotely.com</link>
    <description>Programming jobs</description>
    <item>
      <title>Acme: Senior Rust Engineer</title>
      <link>https://weworkremotely.com/remote-jobs/acme-senior-rust-engineer</link>
      <guid>https://weworkremotely.com/remote-jobs/acme-senior-rust-engineer</guid>
      <pubDate>Wed, 01 May 2024 10:00:00 +0000</pubDate>
      <category>Programming</category>
      <description>Work on the engine.</description>
    </item>
    <item>
      <title>Globex: Frontend Developer</title>
      <link>https://weworkremotely.com/remote-jobs/globex-frontend-developer</link>
      <pubDate>Wed, 01 May 2024 09:00:00 +0000</pubDate>
      <description>Ship UI.</description>
    </item>
  </channel>
</rss>"#;

	#[test]
	fn splits_company_from_title() {
		let records =
			parse_feed(FEED.as_bytes(), &ScrapeQuery::default()).expect("Failed to parse fixture.");

		assert_eq!(records.len(), 2);
		assert_eq!(records[0].company, "Acme");
		assert_eq!(records[0].title, "Senior Rust Engineer");
		assert_eq!(
			records[0].url,
			"https://weworkremotely.com/remote-jobs/acme-senior-rust-engineer"
		);
		assert_eq!(records[0].tags, vec!["Programming".to_string()]);
		assert!(
			records[0].posted_date.as_deref().is_some_and(|date| date.starts_with("2024-05-01"))
		);
	}

	#[test]
	fn keyword_filter_applies_to_entries() {
		let query = ScrapeQuery { keywords: Some("frontend".to_string()), ..Default::default() };
		let records = parse_feed(FEED.as_bytes(), &query).expect("Failed to parse fixture.");

		assert_eq!(records.len(), 1);
		assert_eq!(records[0].company, "Globex");
	}

	#[test]
	fn heading_without_company_keeps_title() {
		assert_eq!(
			split_heading("Backend Engineer"),
			(String::new(), "Backend Engineer".to_string())
		);
	}
}
