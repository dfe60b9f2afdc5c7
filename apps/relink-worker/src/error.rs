pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("{0}")]
	Message(String),
	#[error("{0}")]
	Validation(String),
	#[error(transparent)]
	Service(#[from] relink_service::Error),
	#[error(transparent)]
	Storage(#[from] relink_storage::Error),
}
