//! Pollfsm: an embeddable finite state machine driven by polled predicates
//!
//! The caller registers edges between opaque states, each guarded by a
//! zero-argument predicate, sets a starting state and then polls. A poll
//! moves the machine only when exactly one predicate of the current state
//! holds; two or more holding at once is reported as an error rather than
//! resolved by order.
//!
//! # Core Concepts
//!
//! - **State**: any `Clone + Eq + Hash + Debug` value
//! - **Terminal state**: a known state with no outgoing edges, derived from
//!   the registered topology
//! - **Triggers**: one non-blocking evaluation primitive, with blocking and
//!   deadline-bounded loops layered on top
//!
//! # Example
//!
//! ```rust
//! use pollfsm::engine::StateMachine;
//! use std::sync::atomic::{AtomicBool, Ordering};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let connected = Arc::new(AtomicBool::new(false));
//! let is_connected = Arc::clone(&connected);
//!
//! let mut machine = StateMachine::new();
//! machine
//!     .register_transition("connecting", "ready", move || {
//!         is_connected.load(Ordering::SeqCst)
//!     })
//!     .unwrap();
//! machine.set_state("connecting");
//!
//! assert!(!machine.timed_trigger_for(Duration::from_millis(5)).unwrap());
//!
//! connected.store(true, Ordering::SeqCst);
//! assert_eq!(machine.trigger().unwrap(), ("connecting", "ready"));
//! assert!(machine.is_terminal(&"ready"));
//! ```

pub mod builder;
pub mod checkpoint;
pub mod core;
pub mod engine;

// Re-export commonly used types
pub use crate::builder::{BuildError, StateMachineBuilder};
pub use crate::core::{Degree, Predicate, State, StateHistory, StateTransition};
pub use crate::engine::{
    PollStrategy, RegistrationError, StateMachine, StepResult, TimedOutcome, TriggerError,
};
