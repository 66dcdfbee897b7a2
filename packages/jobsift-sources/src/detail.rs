//! Full-description fetch for a single posting page.

use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::{Error, Result, adzuna, remoteok, remotive, weworkremotely};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStrategy {
	RemoteOk,
	Remotive,
	WeWorkRemotely,
	Generic,
}
impl ExtractionStrategy {
	/// Source name wins. The URL host decides for sources without a dedicated layout.
	pub fn for_job(source: &str, url: &str) -> Self {
		match source.trim().to_ascii_lowercase().as_str() {
			remoteok::SOURCE => return Self::RemoteOk,
			remotive::SOURCE => return Self::Remotive,
			weworkremotely::SOURCE => return Self::WeWorkRemotely,
			adzuna::SOURCE => return Self::Generic,
			_ => {},
		}

		let host = Url::parse(url)
			.ok()
			.and_then(|parsed| parsed.host_str().map(str::to_ascii_lowercase))
			.unwrap_or_default();

		if host_matches(&host, "remoteok.com") {
			Self::RemoteOk
		} else if host_matches(&host, "remotive.com") {
			Self::Remotive
		} else if host_matches(&host, "weworkremotely.com") {
			Self::WeWorkRemotely
		} else {
			Self::Generic
		}
	}

	pub fn selectors(self) -> &'static [&'static str] {
		match self {
			Self::RemoteOk => &["div.description", r#"div[itemprop="description"]"#],
			Self::Remotive => &["div.job-description"],
			Self::WeWorkRemotely => &["div.listing-container"],
			Self::Generic =>
				&["div.job-description", "div.description", "div.content", "article", "main"],
		}
	}

	/// Text of the first selector that matches. `None` when nothing matches or the match is blank.
	pub fn extract(self, html: &str) -> Option<String> {
		let document = Html::parse_document(html);

		self.selectors().iter().find_map(|raw| {
			let selector = Selector::parse(raw).ok()?;
			let element = document.select(&selector).next()?;
			let text = element_text(element);

			(!text.is_empty()).then_some(text)
		})
	}
}

pub async fn fetch_description(client: &Client, url: &str, source: &str) -> Result<String> {
	let parsed = Url::parse(url).map_err(|err| Error::InvalidResponse {
		message: format!("Invalid job URL {url:?}: {err}."),
	})?;
	let strategy = ExtractionStrategy::for_job(source, url);
	let html = client.get(parsed).send().await?.error_for_status()?.text().await?;

	strategy.extract(&html).ok_or_else(|| Error::InvalidResponse {
		message: format!("No description found at {url} using {strategy:?} extraction."),
	})
}

fn host_matches(host: &str, domain: &str) -> bool {
	host == domain || host.ends_with(&format!(".{domain}"))
}

fn element_text(element: ElementRef<'_>) -> String {
	element.text().map(str::trim).filter(|piece| !piece.is_empty()).collect::<Vec<_>>().join(" ")
}
