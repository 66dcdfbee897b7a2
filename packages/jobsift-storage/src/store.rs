//! The store contract the pipeline depends on, and its Postgres implementation.

use std::{future::Future, pin::Pin};

use sqlx::{PgPool, Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
	Error, Result,
	db::Db,
	models::{JobFilter, NewJob, StoreSummary, StoredJob, UpsertOutcome},
};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

const JOB_COLUMNS: &str = "\
job_id, fingerprint, title, company, location, description, url, source, posted_date, job_type, \
salary, tags, remote, created_at, view_count, last_accessed_at, cached_description, cached_at";

/// Durable keyed job storage.
///
/// `upsert` must stay correct under concurrent callers: the uniqueness of the fingerprint decides
/// which caller sees `is_new`, and every other caller gets the winner's row back.
pub trait JobStore
where
	Self: Send + Sync,
{
	fn upsert<'a>(&'a self, job: &'a NewJob) -> BoxFuture<'a, Result<UpsertOutcome>>;

	/// Newest first by `posted_date`, then `created_at`, then `job_id`.
	fn query<'a>(
		&'a self,
		filter: &'a JobFilter,
		limit: i64,
		offset: i64,
	) -> BoxFuture<'a, Result<Vec<StoredJob>>>;

	fn count<'a>(&'a self, filter: &'a JobFilter) -> BoxFuture<'a, Result<i64>>;

	fn find(&self, job_id: Uuid) -> BoxFuture<'_, Result<Option<StoredJob>>>;

	/// Bumps `view_count`, stamps `last_accessed_at`, and returns the updated row.
	fn record_view(
		&self,
		job_id: Uuid,
		at: OffsetDateTime,
	) -> BoxFuture<'_, Result<Option<StoredJob>>>;

	fn cache_description<'a>(
		&'a self,
		job_id: Uuid,
		description: &'a str,
		at: OffsetDateTime,
	) -> BoxFuture<'a, Result<()>>;

	fn summary(&self) -> BoxFuture<'_, Result<StoreSummary>>;
}

impl JobStore for Db {
	fn upsert<'a>(&'a self, job: &'a NewJob) -> BoxFuture<'a, Result<UpsertOutcome>> {
		Box::pin(upsert_job(&self.pool, job))
	}

	fn query<'a>(
		&'a self,
		filter: &'a JobFilter,
		limit: i64,
		offset: i64,
	) -> BoxFuture<'a, Result<Vec<StoredJob>>> {
		Box::pin(query_jobs(&self.pool, filter, limit, offset))
	}

	fn count<'a>(&'a self, filter: &'a JobFilter) -> BoxFuture<'a, Result<i64>> {
		Box::pin(count_jobs(&self.pool, filter))
	}

	fn find(&self, job_id: Uuid) -> BoxFuture<'_, Result<Option<StoredJob>>> {
		Box::pin(find_job(&self.pool, job_id))
	}

	fn record_view(
		&self,
		job_id: Uuid,
		at: OffsetDateTime,
	) -> BoxFuture<'_, Result<Option<StoredJob>>> {
		Box::pin(record_view(&self.pool, job_id, at))
	}

	fn cache_description<'a>(
		&'a self,
		job_id: Uuid,
		description: &'a str,
		at: OffsetDateTime,
	) -> BoxFuture<'a, Result<()>> {
		Box::pin(cache_description(&self.pool, job_id, description, at))
	}

	fn summary(&self) -> BoxFuture<'_, Result<StoreSummary>> {
		Box::pin(summary(&self.pool))
	}
}

pub fn escape_like(raw: &str) -> String {
	let mut out = String::with_capacity(raw.len() + 2);

	out.push('%');

	for ch in raw.chars() {
		if matches!(ch, '%' | '_' | '\\') {
			out.push('\\');
		}

		out.push(ch);
	}

	out.push('%');

	out
}

async fn upsert_job(pool: &PgPool, job: &NewJob) -> Result<UpsertOutcome> {
	// Fast path only. The unique constraint on fingerprint is what decides.
	if let Some(existing) = find_by_fingerprint(pool, &job.fingerprint).await? {
		return Ok(UpsertOutcome { is_new: false, job: existing });
	}

	let sql = format!(
		"\
INSERT INTO jobs (
	job_id,
	fingerprint,
	title,
	company,
	location,
	description,
	url,
	source,
	posted_date,
	job_type,
	salary,
	tags,
	remote,
	created_at
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
ON CONFLICT (fingerprint) DO NOTHING
RETURNING {JOB_COLUMNS}"
	);
	let inserted = sqlx::query_as::<_, StoredJob>(&sql)
		.bind(job.job_id)
		.bind(job.fingerprint.as_str())
		.bind(job.title.as_str())
		.bind(job.company.as_str())
		.bind(job.location.as_str())
		.bind(job.description.as_str())
		.bind(job.url.as_str())
		.bind(job.source.as_str())
		.bind(job.posted_date)
		.bind(job.job_type.as_deref())
		.bind(job.salary.as_deref())
		.bind(sqlx::types::Json(&job.tags))
		.bind(job.remote)
		.bind(job.created_at)
		.fetch_optional(pool)
		.await;

	match inserted {
		Ok(Some(stored)) => Ok(UpsertOutcome { is_new: true, job: stored }),
		Ok(None) => existing_after_conflict(pool, &job.fingerprint).await,
		Err(sqlx::Error::Database(err)) if err.is_unique_violation() =>
			existing_after_conflict(pool, &job.fingerprint).await,
		Err(err) => Err(err.into()),
	}
}

async fn existing_after_conflict(pool: &PgPool, fingerprint: &str) -> Result<UpsertOutcome> {
	let existing = find_by_fingerprint(pool, fingerprint).await?.ok_or_else(|| {
		Error::Conflict(format!("Fingerprint {fingerprint} conflicted but no row is visible."))
	})?;

	Ok(UpsertOutcome { is_new: false, job: existing })
}

async fn find_by_fingerprint(pool: &PgPool, fingerprint: &str) -> Result<Option<StoredJob>> {
	let sql = format!("SELECT {JOB_COLUMNS} FROM jobs WHERE fingerprint = $1");
	let found =
		sqlx::query_as::<_, StoredJob>(&sql).bind(fingerprint).fetch_optional(pool).await?;

	Ok(found)
}

async fn find_job(pool: &PgPool, job_id: Uuid) -> Result<Option<StoredJob>> {
	let sql = format!("SELECT {JOB_COLUMNS} FROM jobs WHERE job_id = $1");
	let found = sqlx::query_as::<_, StoredJob>(&sql).bind(job_id).fetch_optional(pool).await?;

	Ok(found)
}

async fn query_jobs(
	pool: &PgPool,
	filter: &JobFilter,
	limit: i64,
	offset: i64,
) -> Result<Vec<StoredJob>> {
	if limit < 0 || offset < 0 {
		return Err(Error::InvalidArgument("limit and offset must not be negative.".to_string()));
	}

	let mut builder = QueryBuilder::<Postgres>::new(format!("SELECT {JOB_COLUMNS} FROM jobs"));

	push_filter(&mut builder, filter);
	builder.push(" ORDER BY posted_date DESC, created_at DESC, job_id LIMIT ");
	builder.push_bind(limit);
	builder.push(" OFFSET ");
	builder.push_bind(offset);

	let jobs = builder.build_query_as::<StoredJob>().fetch_all(pool).await?;

	Ok(jobs)
}

async fn count_jobs(pool: &PgPool, filter: &JobFilter) -> Result<i64> {
	let mut builder = QueryBuilder::<Postgres>::new("SELECT count(*) FROM jobs");

	push_filter(&mut builder, filter);

	let count: i64 = builder.build_query_scalar().fetch_one(pool).await?;

	Ok(count)
}

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &JobFilter) {
	builder.push(" WHERE TRUE");

	if let Some(source) = filter.source.as_deref() {
		builder.push(" AND source = ");
		builder.push_bind(source.to_string());
	}
	if let Some(remote) = filter.remote {
		builder.push(" AND remote = ");
		builder.push_bind(remote);
	}
	if let Some(keyword) = filter.keyword.as_deref() {
		let pattern = escape_like(keyword);

		builder.push(" AND (title ILIKE ");
		builder.push_bind(pattern.clone());
		builder.push(" OR company ILIKE ");
		builder.push_bind(pattern.clone());
		builder.push(" OR description ILIKE ");
		builder.push_bind(pattern.clone());
		builder.push(" OR tags::text ILIKE ");
		builder.push_bind(pattern);
		builder.push(")");
	}
	if let Some(location) = filter.location.as_deref() {
		builder.push(" AND location ILIKE ");
		builder.push_bind(escape_like(location));
	}
}

async fn record_view(
	pool: &PgPool,
	job_id: Uuid,
	at: OffsetDateTime,
) -> Result<Option<StoredJob>> {
	let sql = format!(
		"\
UPDATE jobs
SET view_count = view_count + 1, last_accessed_at = $2
WHERE job_id = $1
RETURNING {JOB_COLUMNS}"
	);
	let updated =
		sqlx::query_as::<_, StoredJob>(&sql).bind(job_id).bind(at).fetch_optional(pool).await?;

	Ok(updated)
}

async fn cache_description(
	pool: &PgPool,
	job_id: Uuid,
	description: &str,
	at: OffsetDateTime,
) -> Result<()> {
	let result = sqlx::query(
		"\
UPDATE jobs
SET cached_description = $2, cached_at = $3
WHERE job_id = $1",
	)
	.bind(job_id)
	.bind(description)
	.bind(at)
	.execute(pool)
	.await?;

	if result.rows_affected() == 0 {
		return Err(Error::NotFound(format!("Job {job_id} does not exist.")));
	}

	Ok(())
}

async fn summary(pool: &PgPool) -> Result<StoreSummary> {
	let (total_jobs, remote_jobs, with_salary): (i64, i64, i64) = sqlx::query_as(
		"\
SELECT
	count(*),
	count(*) FILTER (WHERE remote),
	count(*) FILTER (WHERE salary IS NOT NULL AND salary <> '')
FROM jobs",
	)
	.fetch_one(pool)
	.await?;
	let rows: Vec<(String, i64)> =
		sqlx::query_as("SELECT source, count(*) FROM jobs GROUP BY source ORDER BY source")
			.fetch_all(pool)
			.await?;

	Ok(StoreSummary { total_jobs, remote_jobs, with_salary, by_source: rows.into_iter().collect() })
}

#[cfg(test)]
mod tests {
	use super::escape_like;

	#[test]
	fn like_patterns_escape_wildcards() {
		assert_eq!(escape_like("rust"), "%rust%");
		assert_eq!(escape_like("100%_off\\"), "%100\\%\\_off\\\\%");
	}
}
