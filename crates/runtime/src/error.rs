use sim_core::{StatusError, TurnError};

/// Host-facing runtime errors.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Turn(#[from] TurnError),
    #[error(transparent)]
    Status(#[from] StatusError),
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
