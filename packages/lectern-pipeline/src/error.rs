#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Vector index unavailable: {message}")]
	IndexUnavailable { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
}
impl From<lectern_index::Error> for Error {
	fn from(err: lectern_index::Error) -> Self {
		match err {
			lectern_index::Error::Unavailable { message } => Self::IndexUnavailable { message },
			lectern_index::Error::Provider { message } => Self::Provider { message },
			lectern_index::Error::InvalidRecord { message } => Self::InvalidRequest { message },
		}
	}
}
impl From<color_eyre::Report> for Error {
	fn from(err: color_eyre::Report) -> Self {
		Self::Provider { message: err.to_string() }
	}
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
