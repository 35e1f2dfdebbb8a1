//! Transition predicates.
//!
//! A predicate is the condition attached to a single edge. It takes no
//! arguments: whatever it needs to decide, it captures from its environment.

use std::fmt;

/// Zero-argument condition that decides whether an edge may fire.
///
/// Predicates are evaluated on every trigger attempt, so they should be cheap.
/// They may read external state (flags, counters, clocks) but must not touch
/// the state machine that owns them.
///
/// Predicates are `Send` so that a machine can be handed to the thread that
/// owns it. They are not required to be `Sync`; the machine is never shared.
///
/// # Example
///
/// ```rust
/// use pollfsm::core::Predicate;
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use std::sync::Arc;
///
/// let ready = Arc::new(AtomicBool::new(false));
/// let flag = Arc::clone(&ready);
/// let is_ready = Predicate::new(move || flag.load(Ordering::SeqCst));
///
/// assert!(!is_ready.check());
/// ready.store(true, Ordering::SeqCst);
/// assert!(is_ready.check());
/// ```
pub struct Predicate {
    condition: Box<dyn Fn() -> bool + Send>,
}

impl Predicate {
    /// Wrap a closure as a predicate.
    pub fn new<F>(condition: F) -> Self
    where
        F: Fn() -> bool + Send + 'static,
    {
        Predicate {
            condition: Box::new(condition),
        }
    }

    /// A predicate that is always satisfied.
    pub fn always() -> Self {
        Self::new(|| true)
    }

    /// A predicate that is never satisfied.
    pub fn never() -> Self {
        Self::new(|| false)
    }

    /// Evaluate the predicate.
    pub fn check(&self) -> bool {
        (self.condition)()
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(..)")
    }
}

impl<F> From<F> for Predicate
where
    F: Fn() -> bool + Send + 'static,
{
    fn from(condition: F) -> Self {
        Predicate::new(condition)
    }
}
