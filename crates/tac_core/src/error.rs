use thiserror::Error;

use crate::engine::round::Phase;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("data integrity error: {0}")]
    DataIntegrity(String),

    #[error("command `{command}` is not valid in phase {phase:?}")]
    InvalidPhase { command: &'static str, phase: Phase },

    #[error("bot {0} is not a valid duel participant (dead or zero hp)")]
    InvalidDuelist(usize),

    #[error("unknown zone: {0}")]
    UnknownZone(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SimError {
    /// Precondition violations are rejected commands, not corrupted state.
    /// The caller may retry in the right phase.
    pub fn is_rejection(&self) -> bool {
        matches!(self, SimError::InvalidPhase { .. } | SimError::InvalidDuelist(_))
    }
}

pub type Result<T> = std::result::Result<T, SimError>;
