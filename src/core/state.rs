//! Core State trait for state machine states.
//!
//! The engine treats states as opaque identifiers: it only compares, hashes,
//! clones and prints them. Anything satisfying those capabilities is a state.

use std::fmt::Debug;
use std::hash::Hash;

/// Trait for state machine states.
///
/// The engine never interprets a state's meaning. It keys its transition
/// table and topology summary by state, so states must be hashable and
/// comparable for equality.
///
/// # Required Traits
///
/// - `Clone`: states are handed back to the caller and stored in history
/// - `Eq` + `Hash`: states key the transition table
/// - `Debug`: states appear in errors and log output
///
/// Every type with these capabilities is a `State` through a blanket
/// implementation, so enums, integers and strings all work directly.
///
/// # Example
///
/// ```rust
/// use pollfsm::core::State;
///
/// #[derive(Clone, PartialEq, Eq, Hash, Debug)]
/// enum Phase {
///     Connecting,
///     Ready,
/// }
///
/// fn accepts_state<S: State>(_s: S) {}
///
/// accepts_state(Phase::Connecting);
/// accepts_state(7u8);
/// accepts_state("ready");
/// ```
pub trait State: Clone + Eq + Hash + Debug {}

impl<T> State for T where T: Clone + Eq + Hash + Debug {}
