use time::{Duration, OffsetDateTime};

use jobsift_domain::{CandidateRecord, fingerprint, is_domestic, job_id, normalize};

fn candidate(title: &str, company: &str, location: &str) -> CandidateRecord {
	CandidateRecord {
		title: title.to_string(),
		company: company.to_string(),
		location: location.to_string(),
		source: "remoteok".to_string(),
		..Default::default()
	}
}

#[test]
fn classifier_table_holds() {
	let table = [
		("New York, NY", true),
		("London, UK", false),
		("Remote, Worldwide", false),
		("TX", true),
		("", true),
		("Remote", true),
		("Bangalore, India", false),
		("Remote - United States", true),
		("San Francisco, CA", true),
		("Remote (US)", true),
		("Toronto, Canada", false),
		("Austin", true),
		("Sydney", false),
		("Europe", false),
	];

	for (location, expected) in table {
		assert_eq!(is_domestic(location), expected, "location: {location:?}");
	}
}

#[test]
fn fingerprint_ignores_case_and_surrounding_whitespace() {
	let base = fingerprint("Senior Rust Engineer", "Acme Corp", "Austin, TX");

	assert_eq!(base, fingerprint("  senior rust ENGINEER ", "ACME CORP", "austin, tx  "));
	assert_ne!(base, fingerprint("Senior Rust Engineer", "Acme Corp", "Denver, CO"));

	let shouted = fingerprint("SENIOR RUST ENGINEER", "acme corp", "Austin, TX");

	assert_eq!(job_id(&base), job_id(&shouted));
}

#[test]
fn missing_date_falls_back_to_ingestion_time() {
	let before = OffsetDateTime::now_utc();
	let mut record = candidate("Engineer", "Acme", "Remote");

	record.posted_date = Some(String::new());

	let normalized = normalize(record);
	let after = OffsetDateTime::now_utc();

	assert!(normalized.posted_date >= before && normalized.posted_date <= after);

	let undated = normalize(candidate("Engineer", "Acme", "Remote"));

	assert!(undated.posted_date >= before);
}

#[test]
fn unparseable_date_ranks_as_most_recent() {
	let before = OffsetDateTime::now_utc();
	let mut record = candidate("Engineer", "Acme", "Remote");

	record.posted_date = Some("sometime last spring".to_string());

	assert!(normalize(record).posted_date >= before);
}

#[test]
fn relative_date_subtracts_from_now() {
	let mut record = candidate("Engineer", "Acme", "Remote");

	record.posted_date = Some("3 days ago".to_string());

	let expected = OffsetDateTime::now_utc() - Duration::days(3);
	let drift = (normalize(record).posted_date - expected).abs();

	assert!(drift < Duration::seconds(5), "drift was {drift}");
}

#[test]
fn strings_are_trimmed_and_optionals_collapse() {
	let mut record = candidate("  Engineer\n", " Acme ", " Remote ");

	record.salary = Some("   ".to_string());
	record.job_type = Some(" full_time ".to_string());
	record.tags = vec!["rust".to_string(), " Rust".to_string()];

	let normalized = normalize(record);

	assert_eq!(normalized.title, "Engineer");
	assert_eq!(normalized.company, "Acme");
	assert_eq!(normalized.location, "Remote");
	assert_eq!(normalized.salary, None);
	assert_eq!(normalized.job_type.as_deref(), Some("full_time"));
	assert_eq!(normalized.tags_encoded(), r#"["rust"]"#);
	assert!(normalized.is_storable());
	assert!(!normalize(candidate(" ", "Acme", "")).is_storable());
}
