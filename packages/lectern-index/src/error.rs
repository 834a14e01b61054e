#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Vector index unavailable: {message}")]
	Unavailable { message: String },
	#[error("Embedding provider error: {message}")]
	Provider { message: String },
	#[error("Invalid chunk record: {message}")]
	InvalidRecord { message: String },
}
impl From<qdrant_client::QdrantError> for Error {
	fn from(err: qdrant_client::QdrantError) -> Self {
		Self::Unavailable { message: err.to_string() }
	}
}
impl From<lectern_providers::Error> for Error {
	fn from(err: lectern_providers::Error) -> Self {
		Self::Provider { message: err.to_string() }
	}
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
