mod error;
mod memory;

pub use error::{Error, Result};
pub use memory::MemoryJobStore;

use std::{env, str::FromStr, thread};

use sqlx::{
	ConnectOptions, Connection,
	postgres::{PgConnectOptions, PgConnection},
};
use tokio::runtime::Builder;
use uuid::Uuid;

use jobsift_config::Postgres;
use jobsift_storage::db::Db;

const DSN_ENV: &str = "JOBSIFT_PG_DSN";
const MAINTENANCE_DATABASES: [&str; 2] = ["postgres", "template1"];
const POOL_MAX_CONNS: u32 = 4;

/// A throwaway Postgres database with the jobs schema already applied.
///
/// The database is dropped by [`ScratchStore::teardown`], or on drop when a test panics first.
pub struct ScratchStore {
	db: Db,
	name: String,
	maintenance: PgConnectOptions,
	dropped: bool,
}
impl ScratchStore {
	pub async fn create(base_dsn: &str) -> Result<Self> {
		let base = PgConnectOptions::from_str(base_dsn)
			.map_err(|err| Error::Message(format!("Invalid {DSN_ENV}: {err}.")))?;
		let (maintenance, mut conn) = connect_maintenance(&base).await?;
		let name = format!("jobsift_scratch_{}", Uuid::new_v4().simple());

		sqlx::query(&format!(r#"CREATE DATABASE "{name}""#)).execute(&mut conn).await?;

		let dsn = base.database(&name).to_url_lossy().to_string();
		let db = Db::connect(&Postgres { dsn, pool_max_conns: POOL_MAX_CONNS }).await?;
		let store = Self { db, name, maintenance, dropped: false };

		store.db.ensure_schema().await?;

		Ok(store)
	}

	/// Creates a store from `JOBSIFT_PG_DSN`, or returns `None` when the variable is unset.
	pub async fn from_env() -> Result<Option<Self>> {
		match env::var(DSN_ENV) {
			Ok(dsn) => Ok(Some(Self::create(&dsn).await?)),
			Err(_) => Ok(None),
		}
	}

	pub fn db(&self) -> &Db {
		&self.db
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub async fn teardown(mut self) -> Result<()> {
		self.db.pool.close().await;

		drop_database(&self.name, &self.maintenance).await?;

		self.dropped = true;

		Ok(())
	}
}
impl Drop for ScratchStore {
	fn drop(&mut self) {
		if self.dropped {
			return;
		}

		let name = self.name.clone();
		let maintenance = self.maintenance.clone();
		// The caller's runtime may be shutting down, so the drop runs on its own runtime.
		let worker = thread::spawn(move || {
			let runtime = match Builder::new_current_thread().enable_all().build() {
				Ok(runtime) => runtime,
				Err(err) => {
					eprintln!("Failed to drop scratch database {name}: {err}.");

					return;
				},
			};

			if let Err(err) = runtime.block_on(drop_database(&name, &maintenance)) {
				eprintln!("Failed to drop scratch database {name}: {err}.");
			}
		});
		let _ = worker.join();
	}
}

async fn connect_maintenance(base: &PgConnectOptions) -> Result<(PgConnectOptions, PgConnection)> {
	let mut errors = Vec::new();

	for database in MAINTENANCE_DATABASES {
		let options = base.clone().database(database);

		match PgConnection::connect_with(&options).await {
			Ok(conn) => return Ok((options, conn)),
			Err(err) => errors.push(format!("{database}: {err}")),
		}
	}

	Err(Error::Message(format!("No maintenance database reachable ({}).", errors.join("; "))))
}

async fn drop_database(name: &str, maintenance: &PgConnectOptions) -> Result<()> {
	let mut conn = PgConnection::connect_with(maintenance).await?;

	sqlx::query(&format!(r#"DROP DATABASE IF EXISTS "{name}" WITH (FORCE)"#))
		.execute(&mut conn)
		.await?;

	Ok(())
}
