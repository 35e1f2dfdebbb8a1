//! Build errors for the state machine builder.

use crate::engine::RegistrationError;
use thiserror::Error;

/// Errors that can occur when building a state machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("No transitions defined. Add at least one transition")]
    NoTransitions,

    #[error("Transition rejected: {0}")]
    Rejected(#[from] RegistrationError),
}
