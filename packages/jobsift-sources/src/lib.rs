pub mod adzuna;
pub mod detail;
pub mod remoteok;
pub mod remotive;
pub mod weworkremotely;

mod error;

pub use error::{Error, Result};

use std::{future::Future, time::Duration};

use reqwest::{
	Client,
	header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT},
};

use jobsift_domain::CandidateRecord;

/// Filters handed to every adapter. Adapters apply what their upstream supports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapeQuery {
	pub keywords: Option<String>,
	pub location: Option<String>,
	pub max_pages: u32,
}
impl ScrapeQuery {
	pub fn keywords(&self) -> Option<&str> {
		self.keywords.as_deref().map(str::trim).filter(|keywords| !keywords.is_empty())
	}

	pub fn location(&self) -> Option<&str> {
		self.location.as_deref().map(str::trim).filter(|location| !location.is_empty())
	}

	/// Case-insensitive containment of the keyword phrase. No keywords matches everything.
	pub fn matches_keywords(&self, haystack: &str) -> bool {
		match self.keywords() {
			Some(keywords) => haystack.to_lowercase().contains(&keywords.to_lowercase()),
			None => true,
		}
	}
}

pub(crate) struct PageBatch {
	pub(crate) records: Vec<CandidateRecord>,
	pub(crate) has_more: bool,
}

pub fn http_client(cfg: &jobsift_config::Http, timeout: Duration) -> Result<Client> {
	let mut headers = HeaderMap::new();

	headers.insert(USER_AGENT, HeaderValue::from_str(&cfg.user_agent)?);
	headers.insert(ACCEPT, HeaderValue::from_static("*/*"));

	let client = Client::builder().timeout(timeout).default_headers(headers).build()?;

	Ok(client)
}

pub(crate) fn join_url(api_base: &str, path: &str) -> String {
	format!("{}/{}", api_base.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Walks pages `1..=pages`, pausing `delay` between requests.
///
/// A failing first page fails the whole call. A later failure keeps what earlier pages returned.
pub(crate) async fn collect_pages<F, Fut>(
	source: &str,
	pages: u32,
	delay: Duration,
	mut fetch: F,
) -> Result<Vec<CandidateRecord>>
where
	F: FnMut(u32) -> Fut,
	Fut: Future<Output = Result<PageBatch>>,
{
	let mut records = Vec::new();

	for page in 1..=pages {
		if page > 1 && !delay.is_zero() {
			tokio::time::sleep(delay).await;
		}

		match fetch(page).await {
			Ok(batch) => {
				records.extend(batch.records);

				if !batch.has_more {
					break;
				}
			},
			Err(err) if page == 1 => return Err(err),
			Err(err) => {
				tracing::warn!(
					error = %err,
					source,
					page,
					kept = records.len(),
					"Later page failed. Keeping earlier pages."
				);

				break;
			},
		}
	}

	Ok(records)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn keyword_match_is_case_insensitive() {
		let query = ScrapeQuery { keywords: Some(" Rust ".to_string()), ..Default::default() };

		assert!(query.matches_keywords("Senior RUST engineer"));
		assert!(!query.matches_keywords("Go developer"));
		assert!(ScrapeQuery::default().matches_keywords("anything"));
	}

	#[test]
	fn urls_join_without_double_slashes() {
		assert_eq!(join_url("https://a.test/", "/api"), "https://a.test/api");
		assert_eq!(join_url("https://a.test", "api"), "https://a.test/api");
	}

	#[tokio::test]
	async fn later_page_failure_keeps_earlier_pages() {
		let records = collect_pages("test", 3, Duration::ZERO, |page| async move {
			match page {
				1 => Ok(PageBatch {
					records: vec![CandidateRecord { title: "a".to_string(), ..Default::default() }],
					has_more: true,
				}),
				_ => Err(Error::InvalidResponse { message: "boom".to_string() }),
			}
		})
		.await
		.expect("First page succeeded.");

		assert_eq!(records.len(), 1);
	}

	#[tokio::test]
	async fn first_page_failure_is_an_error() {
		let result = collect_pages("test", 3, Duration::ZERO, |_| async {
			Err::<PageBatch, _>(Error::InvalidResponse { message: "boom".to_string() })
		})
		.await;

		assert!(result.is_err());
	}
}
