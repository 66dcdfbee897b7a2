pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("{0}")]
	Validation(String),
	#[error("No selected source completed: {0}.")]
	AllSourcesFailed(String),
	#[error(transparent)]
	SerdeJson(#[from] serde_json::Error),
}
