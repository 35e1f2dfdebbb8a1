//! Builder API for ergonomic state machine construction.
//!
//! This module provides a fluent builder and the `state_enum!` macro for
//! declaring states and wiring transitions with little boilerplate.

pub mod error;
pub mod machine;
pub mod macros;

pub use error::BuildError;
pub use machine::StateMachineBuilder;

use crate::core::State;
use crate::engine::StateMachine;

/// Build a machine from a list of `(from, to)` edges that each fire as soon
/// as their source is current.
///
/// Useful for linear pipelines where the caller only wants terminal
/// detection and stepping.
///
/// # Example
///
/// ```
/// use pollfsm::builder::chain;
///
/// let mut machine = chain([(1, 2), (2, 3)]).unwrap();
/// machine.set_state(1);
/// assert_eq!(machine.trigger().unwrap(), (1, 2));
/// assert_eq!(machine.trigger().unwrap(), (2, 3));
/// assert_eq!(machine.trigger().unwrap(), (3, 3));
/// ```
pub fn chain<S, I>(edges: I) -> Result<StateMachine<S>, BuildError>
where
    S: State,
    I: IntoIterator<Item = (S, S)>,
{
    edges
        .into_iter()
        .try_fold(StateMachineBuilder::new(), |builder, (from, to)| {
            builder.always(from, to)
        })?
        .build()
}
