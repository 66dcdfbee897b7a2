pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
	#[error("Source error: {message}")]
	Source { message: String },
}
impl From<jobsift_storage::Error> for Error {
	fn from(err: jobsift_storage::Error) -> Self {
		match err {
			jobsift_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			jobsift_storage::Error::InvalidArgument(message) => Self::InvalidRequest { message },
			jobsift_storage::Error::NotFound(message) => Self::NotFound { message },
			jobsift_storage::Error::Conflict(message) => Self::Storage { message },
		}
	}
}

impl From<jobsift_sources::Error> for Error {
	fn from(err: jobsift_sources::Error) -> Self {
		Self::Source { message: err.to_string() }
	}
}
