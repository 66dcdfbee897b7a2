use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use jobsift_storage::{
	JobStore,
	db::Db,
	models::{JobFilter, NewJob},
};
use jobsift_testkit::ScratchStore;

fn new_job(fingerprint: &str, title: &str, source: &str, posted_date: OffsetDateTime) -> NewJob {
	NewJob {
		job_id: Uuid::new_v5(&Uuid::NAMESPACE_OID, fingerprint.as_bytes()),
		fingerprint: fingerprint.to_string(),
		title: title.to_string(),
		company: "Acme".to_string(),
		location: "Austin, TX".to_string(),
		description: "Build 100% reliable pipelines.".to_string(),
		url: "https://example.com/jobs/1".to_string(),
		source: source.to_string(),
		posted_date,
		job_type: None,
		salary: Some("$150k".to_string()),
		tags: vec!["rust".to_string()],
		remote: source == "remoteok",
		created_at: OffsetDateTime::now_utc(),
	}
}

async fn scratch(test: &str) -> Option<ScratchStore> {
	let store = ScratchStore::from_env().await.expect("Failed to create scratch database.");

	if store.is_none() {
		eprintln!("Skipping {test}; set JOBSIFT_PG_DSN to run.");
	}

	store
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set JOBSIFT_PG_DSN to run."]
async fn db_connects_and_bootstraps_twice() {
	let Some(store) = scratch("db_connects_and_bootstraps_twice").await else {
		return;
	};
	let db = store.db();

	db.ensure_schema().await.expect("Schema bootstrap must be repeatable.");

	let count: i64 = sqlx::query_scalar(
		"SELECT count(*) FROM information_schema.tables WHERE table_name = 'jobs'",
	)
	.fetch_one(&db.pool)
	.await
	.expect("Failed to query schema tables.");

	assert_eq!(count, 1);

	store.teardown().await.expect("Failed to drop scratch database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set JOBSIFT_PG_DSN to run."]
async fn upsert_is_idempotent_per_fingerprint() {
	let Some(store) = scratch("upsert_is_idempotent_per_fingerprint").await else {
		return;
	};
	let db = store.db();
	let job = new_job("fp-1", "Rust Engineer", "remoteok", OffsetDateTime::now_utc());
	let first = db.upsert(&job).await.expect("First upsert failed.");
	let second = db.upsert(&job).await.expect("Second upsert failed.");

	assert!(first.is_new);
	assert!(!second.is_new);
	assert_eq!(first.job.job_id, second.job.job_id);
	assert_eq!(db.count(&JobFilter::default()).await.expect("Count failed."), 1);

	store.teardown().await.expect("Failed to drop scratch database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set JOBSIFT_PG_DSN to run."]
async fn concurrent_upserts_yield_one_new_row() {
	let Some(store) = scratch("concurrent_upserts_yield_one_new_row").await else {
		return;
	};
	let db = store.db();
	let job = new_job("fp-race", "Rust Engineer", "remotive", OffsetDateTime::now_utc());
	let outcomes = futures_join(&db, &job).await;

	assert_eq!(outcomes.iter().filter(|is_new| **is_new).count(), 1);
	assert_eq!(db.count(&JobFilter::default()).await.expect("Count failed."), 1);

	store.teardown().await.expect("Failed to drop scratch database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set JOBSIFT_PG_DSN to run."]
async fn query_filters_and_orders_newest_first() {
	let Some(store) = scratch("query_filters_and_orders_newest_first").await else {
		return;
	};
	let db = store.db();
	let now = OffsetDateTime::now_utc();

	for (fingerprint, title, source, age_days) in [
		("fp-a", "Rust Engineer", "remoteok", 3),
		("fp-b", "Go Engineer", "remotive", 1),
		("fp-c", "Data Analyst", "remoteok", 2),
	] {
		db.upsert(&new_job(fingerprint, title, source, now - Duration::days(age_days)))
			.await
			.expect("Upsert failed.");
	}

	let all = db.query(&JobFilter::default(), 10, 0).await.expect("Query failed.");
	let titles = all.iter().map(|job| job.title.as_str()).collect::<Vec<_>>();

	assert_eq!(titles, vec!["Go Engineer", "Data Analyst", "Rust Engineer"]);

	let filter = JobFilter { keyword: Some("ENGINEER".to_string()), ..Default::default() };

	assert_eq!(db.count(&filter).await.expect("Count failed."), 2);

	let filter = JobFilter { keyword: Some("100%".to_string()), ..Default::default() };

	assert_eq!(db.count(&filter).await.expect("Count failed."), 3);

	let filter = JobFilter { source: Some("remoteok".to_string()), ..Default::default() };
	let page = db.query(&filter, 1, 1).await.expect("Query failed.");

	assert_eq!(page.len(), 1);
	assert_eq!(page[0].title, "Rust Engineer");

	let summary = db.summary().await.expect("Summary failed.");

	assert_eq!(summary.total_jobs, 3);
	assert_eq!(summary.remote_jobs, 2);
	assert_eq!(summary.with_salary, 3);
	assert_eq!(summary.by_source.get("remoteok"), Some(&2));

	store.teardown().await.expect("Failed to drop scratch database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set JOBSIFT_PG_DSN to run."]
async fn views_and_cache_annotate_without_touching_identity() {
	let Some(store) = scratch("views_and_cache_annotate_without_touching_identity").await else {
		return;
	};
	let db = store.db();
	let job = new_job("fp-view", "Rust Engineer", "remoteok", OffsetDateTime::now_utc());
	let stored = db.upsert(&job).await.expect("Upsert failed.").job;
	let now = OffsetDateTime::now_utc();
	let viewed = db
		.record_view(stored.job_id, now)
		.await
		.expect("record_view failed.")
		.expect("Job must exist.");

	assert_eq!(viewed.view_count, 1);
	assert!(viewed.last_accessed_at.is_some());

	db.cache_description(stored.job_id, "Full text.", now).await.expect("Cache write failed.");

	let found = db.find(stored.job_id).await.expect("Find failed.").expect("Job must exist.");

	assert_eq!(found.cached_description.as_deref(), Some("Full text."));
	assert_eq!(found.fingerprint, stored.fingerprint);
	assert!(db.record_view(Uuid::new_v4(), now).await.expect("record_view failed.").is_none());

	store.teardown().await.expect("Failed to drop scratch database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set JOBSIFT_PG_DSN to run."]
async fn teardown_drops_the_scratch_database() {
	let Some(store) = scratch("teardown_drops_the_scratch_database").await else {
		return;
	};
	let name = store.name().to_string();
	let exists = "SELECT count(*) FROM pg_database WHERE datname = $1";
	let live: i64 = sqlx::query_scalar(exists)
		.bind(&name)
		.fetch_one(&store.db().pool)
		.await
		.expect("Failed to look up scratch database.");

	assert_eq!(live, 1);

	store.teardown().await.expect("Failed to drop scratch database.");

	let dsn = std::env::var("JOBSIFT_PG_DSN").expect("JOBSIFT_PG_DSN must stay set.");
	let pool = sqlx::PgPool::connect(&dsn).await.expect("Failed to reconnect to Postgres.");
	let left: i64 = sqlx::query_scalar(exists)
		.bind(&name)
		.fetch_one(&pool)
		.await
		.expect("Failed to look up scratch database.");

	assert_eq!(left, 0);
}

async fn futures_join(db: &Db, job: &NewJob) -> Vec<bool> {
	let (a, b, c) = tokio::join!(db.upsert(job), db.upsert(job), db.upsert(job));

	[a, b, c].into_iter().map(|outcome| outcome.expect("Upsert failed.").is_new).collect()
}
