use thiserror::Error;
use users_core::ApiError;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("{}", .0.message())]
    Api(#[from] ApiError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The operation ran but the server reported a failure.
    #[error("{0}")]
    Failed(String),
}

pub type Result<T> = std::result::Result<T, CliError>;
