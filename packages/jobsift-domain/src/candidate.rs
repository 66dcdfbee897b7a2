//! Loosely shaped source payloads resolved into a fixed candidate record.
//!
//! Every field is looked up through an ordered list of key paths. The first path that yields a
//! non-empty value wins, so adapters only declare where a source keeps its data instead of
//! re-implementing fallback chains.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One posting as an adapter saw it, before any normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
	pub title: String,
	pub company: String,
	pub location: String,
	pub description: String,
	pub url: String,
	pub source: String,
	pub posted_date: Option<String>,
	pub job_type: Option<String>,
	pub salary: Option<String>,
	pub tags: Vec<String>,
	pub remote: bool,
}

/// Ordered key paths per field. Paths use `.` to descend into nested objects.
#[derive(Debug, Clone)]
pub struct AliasTable {
	pub title: &'static [&'static str],
	pub company: &'static [&'static str],
	pub location: &'static [&'static str],
	pub description: &'static [&'static str],
	pub url: &'static [&'static str],
	pub posted_date: &'static [&'static str],
	pub job_type: &'static [&'static str],
	pub salary: &'static [&'static str],
	pub tags: &'static [&'static str],
	pub remote: &'static [&'static str],
}
impl Default for AliasTable {
	fn default() -> Self {
		Self {
			title: &["title", "position", "job_title", "name"],
			company: &["company_name", "company.display_name", "company", "employer"],
			location: &[
				"location.display_name",
				"candidate_required_location",
				"location",
				"city",
			],
			description: &["description", "summary", "snippet", "content"],
			url: &["url", "redirect_url", "apply_url", "job_url", "link"],
			posted_date: &[
				"publication_date",
				"posted_date",
				"date",
				"created",
				"created_at",
				"epoch",
			],
			job_type: &["job_type", "contract_time", "employment_type", "type"],
			salary: &["salary", "salary_range", "compensation"],
			tags: &["tags", "category.tag", "skills"],
			remote: &["remote", "is_remote"],
		}
	}
}

impl CandidateRecord {
	pub fn from_json(source: &str, value: &Value, aliases: &AliasTable) -> Self {
		let location = first_text(value, aliases.location).unwrap_or_default();
		let title = first_text(value, aliases.title).unwrap_or_default();
		let remote = first_bool(value, aliases.remote)
			.unwrap_or_else(|| mentions_remote(&location) || mentions_remote(&title));

		Self {
			company: first_text(value, aliases.company).unwrap_or_default(),
			description: first_text(value, aliases.description).unwrap_or_default(),
			url: first_text(value, aliases.url).unwrap_or_default(),
			source: source.to_string(),
			posted_date: first_text(value, aliases.posted_date),
			job_type: first_text(value, aliases.job_type),
			salary: first_text(value, aliases.salary),
			tags: first_tags(value, aliases.tags),
			title,
			location,
			remote,
		}
	}
}

pub fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
	path.split('.').try_fold(value, |current, key| current.get(key))
}

fn first_text(value: &Value, paths: &[&str]) -> Option<String> {
	paths.iter().filter_map(|path| lookup(value, path)).find_map(as_text)
}

fn first_bool(value: &Value, paths: &[&str]) -> Option<bool> {
	paths.iter().filter_map(|path| lookup(value, path)).find_map(|found| match found {
		Value::Bool(flag) => Some(*flag),
		Value::String(raw) => match raw.trim().to_ascii_lowercase().as_str() {
			"true" | "yes" | "1" => Some(true),
			"false" | "no" | "0" => Some(false),
			_ => None,
		},
		_ => None,
	})
}

fn first_tags(value: &Value, paths: &[&str]) -> Vec<String> {
	for found in paths.iter().filter_map(|path| lookup(value, path)) {
		let tags = match found {
			Value::Array(items) => items.iter().filter_map(as_text).collect::<Vec<_>>(),
			Value::String(raw) => raw
				.split(',')
				.map(str::trim)
				.filter(|tag| !tag.is_empty())
				.map(str::to_string)
				.collect(),
			_ => Vec::new(),
		};

		if !tags.is_empty() {
			return tags;
		}
	}

	Vec::new()
}

fn as_text(value: &Value) -> Option<String> {
	let text = match value {
		Value::String(raw) => raw.trim().to_string(),
		Value::Number(number) => number.to_string(),
		_ => return None,
	};

	(!text.is_empty()).then_some(text)
}

fn mentions_remote(text: &str) -> bool {
	text.to_lowercase().contains("remote")
}
