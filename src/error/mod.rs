use crate::state::StateError;
use thiserror::Error;

pub type AppResult<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error("console i/o failed: {0}")]
    Io(#[from] std::io::Error),
}
