use std::{
	collections::BTreeMap,
	sync::{Mutex, MutexGuard},
};

use time::OffsetDateTime;
use uuid::Uuid;

use jobsift_storage::{
	BoxFuture, Error as StorageError, JobStore, Result as StorageResult,
	models::{JobFilter, NewJob, StoreSummary, StoredJob, UpsertOutcome},
};

/// In-process `JobStore` with the same uniqueness, filter and ordering rules as the Postgres one.
#[derive(Default)]
pub struct MemoryJobStore {
	jobs: Mutex<BTreeMap<String, StoredJob>>,
}
impl MemoryJobStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn len(&self) -> usize {
		self.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.lock().is_empty()
	}

	pub fn snapshot(&self) -> Vec<StoredJob> {
		self.lock().values().cloned().collect()
	}

	fn lock(&self) -> MutexGuard<'_, BTreeMap<String, StoredJob>> {
		self.jobs.lock().unwrap_or_else(|err| err.into_inner())
	}

	fn upsert_now(&self, job: &NewJob) -> UpsertOutcome {
		let mut jobs = self.lock();

		if let Some(existing) = jobs.get(&job.fingerprint) {
			return UpsertOutcome { is_new: false, job: existing.clone() };
		}

		let stored = job.clone().into_stored();

		jobs.insert(job.fingerprint.clone(), stored.clone());

		UpsertOutcome { is_new: true, job: stored }
	}

	fn filtered(&self, filter: &JobFilter) -> Vec<StoredJob> {
		let mut matched = self
			.lock()
			.values()
			.filter(|job| matches_filter(job, filter))
			.cloned()
			.collect::<Vec<_>>();

		matched.sort_by(|a, b| {
			b.posted_date
				.cmp(&a.posted_date)
				.then_with(|| b.created_at.cmp(&a.created_at))
				.then_with(|| a.job_id.cmp(&b.job_id))
		});

		matched
	}

	fn update<F>(&self, job_id: Uuid, apply: F) -> Option<StoredJob>
	where
		F: FnOnce(&mut StoredJob),
	{
		let mut jobs = self.lock();
		let job = jobs.values_mut().find(|job| job.job_id == job_id)?;

		apply(job);

		Some(job.clone())
	}

	fn summary_now(&self) -> StoreSummary {
		let jobs = self.lock();
		let mut summary = StoreSummary::default();

		for job in jobs.values() {
			summary.total_jobs += 1;

			if job.remote {
				summary.remote_jobs += 1;
			}
			if job.salary.as_deref().is_some_and(|salary| !salary.is_empty()) {
				summary.with_salary += 1;
			}

			*summary.by_source.entry(job.source.clone()).or_default() += 1;
		}

		summary
	}
}

impl JobStore for MemoryJobStore {
	fn upsert<'a>(&'a self, job: &'a NewJob) -> BoxFuture<'a, StorageResult<UpsertOutcome>> {
		Box::pin(async move { Ok(self.upsert_now(job)) })
	}

	fn query<'a>(
		&'a self,
		filter: &'a JobFilter,
		limit: i64,
		offset: i64,
	) -> BoxFuture<'a, StorageResult<Vec<StoredJob>>> {
		Box::pin(async move {
			let (Ok(limit), Ok(offset)) = (usize::try_from(limit), usize::try_from(offset)) else {
				return Err(StorageError::InvalidArgument(
					"limit and offset must not be negative.".to_string(),
				));
			};

			Ok(self.filtered(filter).into_iter().skip(offset).take(limit).collect())
		})
	}

	fn count<'a>(&'a self, filter: &'a JobFilter) -> BoxFuture<'a, StorageResult<i64>> {
		Box::pin(async move { Ok(self.filtered(filter).len() as i64) })
	}

	fn find(&self, job_id: Uuid) -> BoxFuture<'_, StorageResult<Option<StoredJob>>> {
		Box::pin(async move {
			Ok(self.lock().values().find(|job| job.job_id == job_id).cloned())
		})
	}

	fn record_view(
		&self,
		job_id: Uuid,
		at: OffsetDateTime,
	) -> BoxFuture<'_, StorageResult<Option<StoredJob>>> {
		Box::pin(async move {
			Ok(self.update(job_id, |job| {
				job.view_count += 1;
				job.last_accessed_at = Some(at);
			}))
		})
	}

	fn cache_description<'a>(
		&'a self,
		job_id: Uuid,
		description: &'a str,
		at: OffsetDateTime,
	) -> BoxFuture<'a, StorageResult<()>> {
		Box::pin(async move {
			self.update(job_id, |job| {
				job.cached_description = Some(description.to_string());
				job.cached_at = Some(at);
			})
			.map(|_| ())
			.ok_or_else(|| StorageError::NotFound(format!("Job {job_id} does not exist.")))
		})
	}

	fn summary(&self) -> BoxFuture<'_, StorageResult<StoreSummary>> {
		Box::pin(async move { Ok(self.summary_now()) })
	}
}

fn matches_filter(job: &StoredJob, filter: &JobFilter) -> bool {
	if filter.source.as_deref().is_some_and(|source| job.source != source) {
		return false;
	}
	if filter.remote.is_some_and(|remote| job.remote != remote) {
		return false;
	}
	if let Some(keyword) = filter.keyword.as_deref() {
		let needle = keyword.to_lowercase();
		let hit = [&job.title, &job.company, &job.description]
			.into_iter()
			.chain(job.tags.0.iter())
			.any(|text| text.to_lowercase().contains(&needle));

		if !hit {
			return false;
		}
	}
	if let Some(location) = filter.location.as_deref()
		&& !job.location.to_lowercase().contains(&location.to_lowercase())
	{
		return false;
	}

	true
}
