use std::{collections::HashSet, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use time::{
	Date, Duration, OffsetDateTime, PrimitiveDateTime,
	format_description::{
		BorrowedFormatItem,
		well_known::{Rfc2822, Rfc3339},
	},
	macros::format_description,
};

use crate::candidate::CandidateRecord;

static RELATIVE_DATE: LazyLock<Option<Regex>> = LazyLock::new(|| {
	Regex::new(
		r"(?i)^\s*(\d+)\s*\+?\s*(seconds?|secs?|s|minutes?|mins?|m|hours?|hrs?|h|days?|d|weeks?|wks?|w|months?|mos?|years?|yrs?|y)\s+ago\s*$",
	)
	.ok()
});

const DATE_TIME_FORMATS: &[&[BorrowedFormatItem<'static>]] = &[
	format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
	format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
	format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
	format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"),
];
const DATE_FORMATS: &[&[BorrowedFormatItem<'static>]] = &[
	format_description!("[year]-[month]-[day]"),
	format_description!("[month repr:long case_sensitive:false] [day padding:none], [year]"),
	format_description!("[month repr:short case_sensitive:false] [day padding:none], [year]"),
	format_description!("[day padding:none] [month repr:long case_sensitive:false] [year]"),
	format_description!("[day padding:none] [month repr:short case_sensitive:false] [year]"),
];

/// A candidate after trimming, date coercion and tag canonicalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
	pub title: String,
	pub company: String,
	pub location: String,
	pub description: String,
	pub url: String,
	pub source: String,
	pub posted_date: OffsetDateTime,
	pub job_type: Option<String>,
	pub salary: Option<String>,
	pub tags: Vec<String>,
	pub remote: bool,
}
impl NormalizedRecord {
	/// Records without a title or company carry no usable identity and are not stored.
	pub fn is_storable(&self) -> bool {
		!self.title.is_empty() && !self.company.is_empty()
	}

	pub fn tags_encoded(&self) -> String {
		encode_tags(&self.tags)
	}
}

pub fn normalize(candidate: CandidateRecord) -> NormalizedRecord {
	normalize_at(candidate, OffsetDateTime::now_utc())
}

/// Never fails: unparseable or missing dates fall back to `now`, which ranks such records as the
/// most recent ones.
pub fn normalize_at(candidate: CandidateRecord, now: OffsetDateTime) -> NormalizedRecord {
	let posted_date =
		candidate.posted_date.as_deref().and_then(|raw| parse_posted_date(raw, now)).unwrap_or(now);

	NormalizedRecord {
		title: candidate.title.trim().to_string(),
		company: candidate.company.trim().to_string(),
		location: candidate.location.trim().to_string(),
		description: candidate.description.trim().to_string(),
		url: candidate.url.trim().to_string(),
		source: candidate.source.trim().to_lowercase(),
		posted_date,
		job_type: optional_text(candidate.job_type),
		salary: optional_text(candidate.salary),
		tags: canonical_tags(candidate.tags),
		remote: candidate.remote,
	}
}

pub fn parse_posted_date(raw: &str, now: OffsetDateTime) -> Option<OffsetDateTime> {
	let trimmed = raw.trim();

	if trimmed.is_empty() {
		return None;
	}

	parse_relative(trimmed, now).or_else(|| parse_absolute(trimmed))
}

/// Trimmed, empties dropped, case-insensitive duplicates removed with first spelling kept.
pub fn canonical_tags(tags: Vec<String>) -> Vec<String> {
	let mut seen = HashSet::new();

	tags.into_iter()
		.map(|tag| tag.trim().to_string())
		.filter(|tag| !tag.is_empty())
		.filter(|tag| seen.insert(tag.to_lowercase()))
		.collect()
}

pub fn encode_tags(tags: &[String]) -> String {
	serde_json::to_string(tags).unwrap_or_else(|_| "[]".to_string())
}

fn parse_relative(raw: &str, now: OffsetDateTime) -> Option<OffsetDateTime> {
	match raw.to_ascii_lowercase().as_str() {
		"today" | "just now" | "just posted" | "now" => return Some(now),
		"yesterday" => return Some(now - Duration::days(1)),
		_ => {},
	}

	let captures = RELATIVE_DATE.as_ref()?.captures(raw)?;
	let amount: i64 = captures.get(1)?.as_str().parse().ok()?;
	let unit = captures.get(2)?.as_str().to_ascii_lowercase();
	let unit_seconds: i64 = match unit.as_str() {
		"s" | "sec" | "secs" | "second" | "seconds" => 1,
		"m" | "min" | "mins" | "minute" | "minutes" => 60,
		"h" | "hr" | "hrs" | "hour" | "hours" => 3_600,
		"d" | "day" | "days" => 86_400,
		"w" | "wk" | "wks" | "week" | "weeks" => 7 * 86_400,
		"mo" | "mos" | "month" | "months" => 30 * 86_400,
		_ => 365 * 86_400,
	};
	// Offsets too large to represent are unparseable and fall back to the ingestion time.
	let offset = Duration::seconds(amount.checked_mul(unit_seconds)?);

	now.checked_sub(offset)
}

fn parse_absolute(raw: &str) -> Option<OffsetDateTime> {
	if let Ok(parsed) = OffsetDateTime::parse(raw, &Rfc3339) {
		return Some(parsed);
	}
	if let Ok(parsed) = OffsetDateTime::parse(raw, &Rfc2822) {
		return Some(parsed);
	}
	if let Some(parsed) = parse_epoch(raw) {
		return Some(parsed);
	}
	if let Some(parsed) = DATE_TIME_FORMATS
		.iter()
		.find_map(|format| PrimitiveDateTime::parse(raw, format).ok())
	{
		return Some(parsed.assume_utc());
	}

	DATE_FORMATS
		.iter()
		.find_map(|format| Date::parse(raw, format).ok())
		.map(|date| date.midnight().assume_utc())
}

fn parse_epoch(raw: &str) -> Option<OffsetDateTime> {
	if !raw.bytes().all(|byte| byte.is_ascii_digit()) {
		return None;
	}

	let value: i64 = raw.parse().ok()?;

	match raw.len() {
		9..=11 => OffsetDateTime::from_unix_timestamp(value).ok(),
		12..=14 =>
			OffsetDateTime::from_unix_timestamp_nanos(i128::from(value) * 1_000_000).ok(),
		_ => None,
	}
}

fn optional_text(value: Option<String>) -> Option<String> {
	value.map(|raw| raw.trim().to_string()).filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
	use time::macros::datetime;

	use super::*;

	const NOW: OffsetDateTime = datetime!(2025-03-10 12:00:00 UTC);

	#[test]
	fn relative_units_are_subtracted() {
		assert_eq!(parse_posted_date("3 days ago", NOW), Some(NOW - Duration::days(3)));
		assert_eq!(parse_posted_date("5 Hours Ago", NOW), Some(NOW - Duration::hours(5)));
		assert_eq!(parse_posted_date("2d ago", NOW), Some(NOW - Duration::days(2)));
		assert_eq!(parse_posted_date("30+ days ago", NOW), Some(NOW - Duration::days(30)));
		assert_eq!(parse_posted_date("1 week ago", NOW), Some(NOW - Duration::weeks(1)));
		assert_eq!(parse_posted_date("yesterday", NOW), Some(NOW - Duration::days(1)));
	}

	#[test]
	fn absolute_formats_parse() {
		assert_eq!(
			parse_posted_date("2024-05-01T08:30:00Z", NOW),
			Some(datetime!(2024-05-01 08:30:00 UTC))
		);
		assert_eq!(
			parse_posted_date("2024-05-01T08:30:00", NOW),
			Some(datetime!(2024-05-01 08:30:00 UTC))
		);
		assert_eq!(parse_posted_date("2024-05-01", NOW), Some(datetime!(2024-05-01 00:00:00 UTC)));
		assert_eq!(
			parse_posted_date("Tue, 30 Apr 2024 10:00:00 +0000", NOW),
			Some(datetime!(2024-04-30 10:00:00 UTC))
		);
		assert_eq!(
			parse_posted_date("March 4, 2024", NOW),
			Some(datetime!(2024-03-04 00:00:00 UTC))
		);
		assert_eq!(parse_posted_date("1714521600", NOW), Some(datetime!(2024-05-01 00:00:00 UTC)));
		assert_eq!(
			parse_posted_date("1714521600000", NOW),
			Some(datetime!(2024-05-01 00:00:00 UTC))
		);
	}

	#[test]
	fn huge_relative_offsets_do_not_overflow() {
		assert_eq!(parse_posted_date("999999999999999 days ago", NOW), None);
		assert_eq!(parse_posted_date("99999999999999999 seconds ago", NOW), None);
		assert_eq!(parse_posted_date("999999999999 years ago", NOW), None);

		let record = normalize_at(
			CandidateRecord {
				posted_date: Some("999999999999999 days ago".to_string()),
				..Default::default()
			},
			NOW,
		);

		assert_eq!(record.posted_date, NOW);
	}

	#[test]
	fn garbage_is_rejected() {
		assert_eq!(parse_posted_date("", NOW), None);
		assert_eq!(parse_posted_date("soon-ish", NOW), None);
		assert_eq!(parse_posted_date("ago", NOW), None);
	}

	#[test]
	fn tags_are_canonical() {
		let tags = canonical_tags(vec![
			" Rust ".to_string(),
			"".to_string(),
			"rust".to_string(),
			"Postgres".to_string(),
		]);

		assert_eq!(tags, vec!["Rust".to_string(), "Postgres".to_string()]);
		assert_eq!(encode_tags(&tags), r#"["Rust","Postgres"]"#);
		assert_eq!(encode_tags(&[]), "[]");
	}
}
