//! State machine that advances by polling transition predicates.

use crate::checkpoint::{Checkpoint, CheckpointError};
use crate::core::{Degree, Predicate, State, StateHistory, StateTransition, Topology};
use crate::engine::clock::{Clock, MonotonicClock, WallClock};
use crate::engine::error::{RegistrationError, TriggerError, TriggerResult};
use crate::engine::poll::PollStrategy;
use crate::engine::transition::{Edge, StepResult, TimedOutcome};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

/// Records kept by default before the oldest are dropped.
pub const DEFAULT_HISTORY_LIMIT: usize = 1024;

/// Finite state machine driven by zero-argument transition predicates.
///
/// Edges are registered up front, then the machine is initialized with
/// [`set_state`](Self::set_state) and advanced by the caller's own polling
/// through one of the trigger methods.
///
/// # Concurrency
///
/// There is no internal locking. Every mutating method takes `&mut self`, so
/// sharing a machine across threads requires an external `Mutex` or a single
/// owning thread. The machine is `Send` whenever `S` is.
///
/// # Example
///
/// ```rust
/// use pollfsm::engine::{StateMachine, StepResult};
///
/// let mut machine = StateMachine::new();
/// machine.register_transition('a', 'b', || false).unwrap();
/// machine.register_transition('a', 'c', || true).unwrap();
/// machine.set_state('a');
///
/// assert_eq!(
///     machine.try_trigger().unwrap(),
///     StepResult::Transitioned { from: 'a', to: 'c' }
/// );
/// assert_eq!(machine.state(), Some(&'c'));
/// assert!(machine.is_terminal(&'c'));
/// ```
pub struct StateMachine<S: State> {
    table: HashMap<S, Vec<Edge<S>>>,
    topology: Topology<S>,
    current: Option<S>,
    history: StateHistory<S>,
    history_limit: usize,
    poll: PollStrategy,
    attempts: usize,
}

impl<S: State> Default for StateMachine<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> StateMachine<S> {
    /// Create an empty, uninitialized machine.
    pub fn new() -> Self {
        Self {
            table: HashMap::new(),
            topology: Topology::new(),
            current: None,
            history: StateHistory::new(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            poll: PollStrategy::default(),
            attempts: 0,
        }
    }

    pub fn with_poll_strategy(mut self, poll: PollStrategy) -> Self {
        self.poll = poll;
        self
    }

    pub fn set_poll_strategy(&mut self, poll: PollStrategy) {
        self.poll = poll;
    }

    pub fn poll_strategy(&self) -> PollStrategy {
        self.poll
    }

    /// Keep at most `limit` history records, dropping the oldest first.
    /// A limit of zero disables recording.
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.set_history_limit(limit);
        self
    }

    pub fn set_history_limit(&mut self, limit: usize) {
        self.history_limit = limit;
        self.history.retain_last(limit);
    }

    pub fn history_limit(&self) -> usize {
        self.history_limit
    }

    /// Register the edge `source -> target`, guarded by `predicate`.
    ///
    /// Rejected without touching the table when `source == target` or when
    /// the pair is already registered. Edges from one source are evaluated in
    /// the order they were registered.
    pub fn register_transition<P>(
        &mut self,
        source: S,
        target: S,
        predicate: P,
    ) -> Result<(), RegistrationError>
    where
        P: Into<Predicate>,
    {
        if source == target {
            warn!(state = ?source, "Rejected self-loop transition");
            return Err(RegistrationError::SelfLoop);
        }

        let edges = self.table.entry(source.clone()).or_default();
        if edges.iter().any(|edge| edge.to == target) {
            warn!(from = ?source, to = ?target, "Rejected duplicate transition");
            return Err(RegistrationError::Duplicate);
        }

        self.topology.add_edge(&source, &target);
        debug!(from = ?source, to = ?target, "Registered transition");
        edges.push(Edge::new(target, predicate.into()));
        Ok(())
    }

    /// Overwrite the current state without validating it.
    ///
    /// An unknown state is only reported by the next trigger attempt.
    pub fn set_state(&mut self, state: S) {
        debug!(state = ?state, "State set");
        self.current = Some(state);
        self.attempts = 0;
    }

    /// Current state, or `None` before the machine is initialized.
    pub fn state(&self) -> Option<&S> {
        self.current.as_ref()
    }

    /// Known to the topology and without outgoing edges.
    pub fn is_terminal(&self, state: &S) -> bool {
        self.topology.is_terminal(state)
    }

    /// Evaluate the current state's predicates once, without blocking.
    ///
    /// - terminal state: `Transitioned` with `from == to`, every time
    /// - exactly one predicate holds: move to its target
    /// - none hold: `Unchanged`
    /// - two or more hold: `AmbiguousTransition`, state untouched
    /// - state has no edges and is not terminal: `InvalidState`
    pub fn try_trigger(&mut self) -> TriggerResult<StepResult<S>, S> {
        let current = self.current.as_ref().ok_or(TriggerError::Uninitialized)?;

        if self.topology.is_terminal(current) {
            trace!(state = ?current, "Terminal state reached");
            return Ok(StepResult::Transitioned {
                from: current.clone(),
                to: current.clone(),
            });
        }

        let Some(edges) = self.table.get(current) else {
            warn!(state = ?current, "Current state has no registered transitions");
            return Err(TriggerError::InvalidState {
                state: current.clone(),
            });
        };

        self.attempts += 1;
        let mut matched: Option<&S> = None;
        for edge in edges {
            if !edge.is_enabled() {
                continue;
            }
            if let Some(first) = matched {
                warn!(state = ?current, first = ?first, second = ?edge.to, "Ambiguous transition");
                return Err(TriggerError::AmbiguousTransition {
                    state: current.clone(),
                    targets: vec![first.clone(), edge.to.clone()],
                });
            }
            matched = Some(&edge.to);
        }

        let Some(target) = matched else {
            trace!(state = ?current, attempt = self.attempts, "No transition enabled");
            return Ok(StepResult::Unchanged);
        };

        let from = current.clone();
        let to = target.clone();
        debug!(from = ?from, to = ?to, attempt = self.attempts, "Transitioned");
        if self.history_limit > 0 {
            self.history.record(StateTransition {
                from: from.clone(),
                to: to.clone(),
                timestamp: WallClock.now(),
                attempt: self.attempts,
            });
            self.history.retain_last(self.history_limit);
        }
        self.current = Some(to.clone());
        self.attempts = 0;

        Ok(StepResult::Transitioned { from, to })
    }

    /// Poll until the state changes, waiting per the poll strategy between
    /// attempts.
    ///
    /// Returns at once for a terminal state. Configuration errors are returned
    /// on the attempt that finds them. Blocks forever if no predicate ever
    /// holds.
    pub fn trigger(&mut self) -> TriggerResult<(S, S), S> {
        let mut poller = self.poll.poller();
        loop {
            if let Some(change) = self.try_trigger()?.into_change() {
                return Ok(change);
            }
            poller.wait();
        }
    }

    /// Poll until the state changes or the monotonic clock reaches `deadline`.
    ///
    /// Returns `true` on a change and `false` on timeout. Configuration errors
    /// are returned immediately.
    pub fn timed_trigger(&mut self, deadline: Instant) -> TriggerResult<bool, S> {
        self.timed_trigger_with(&MonotonicClock, deadline)
            .map(|outcome| outcome.is_changed())
    }

    /// [`timed_trigger`](Self::timed_trigger) with a deadline relative to now.
    ///
    /// A timeout too large to express as an `Instant` waits without a
    /// deadline, like [`trigger`](Self::trigger).
    pub fn timed_trigger_for(&mut self, timeout: Duration) -> TriggerResult<bool, S> {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.timed_trigger(deadline),
            None => self.trigger().map(|_| true),
        }
    }

    /// Poll until the state changes or `clock` reaches `deadline`.
    ///
    /// One attempt is always made before the clock is consulted. No wait
    /// sleeps past the deadline. A clock read failure ends the wait with
    /// [`TimedOutcome::ClockUnavailable`].
    pub fn timed_trigger_with<C: Clock>(
        &mut self,
        clock: &C,
        deadline: C::Instant,
    ) -> TriggerResult<TimedOutcome<S>, S> {
        let mut poller = self.poll.poller();
        loop {
            if let Some((from, to)) = self.try_trigger()?.into_change() {
                return Ok(TimedOutcome::Transitioned { from, to });
            }

            let Some(now) = clock.now() else {
                warn!(state = ?self.current, "Clock unavailable, abandoning timed trigger");
                return Ok(TimedOutcome::ClockUnavailable);
            };
            if now >= deadline {
                debug!(state = ?self.current, polls = poller.waits(), "Timed trigger expired");
                return Ok(TimedOutcome::TimedOut);
            }

            poller.wait_at_most(clock.remaining(&now, &deadline));
        }
    }

    /// Transitions made by triggers so far.
    pub fn history(&self) -> &StateHistory<S> {
        &self.history
    }

    pub fn degree(&self, state: &S) -> Option<Degree> {
        self.topology.degree(state)
    }

    /// Every state that appears on at least one edge, in no particular order.
    pub fn states(&self) -> impl Iterator<Item = &S> {
        self.topology.states()
    }

    pub fn terminal_states(&self) -> impl Iterator<Item = &S> {
        self.topology.terminal_states()
    }

    /// Targets reachable from `state` in one step, in registration order.
    pub fn targets(&self, state: &S) -> impl Iterator<Item = &S> {
        self.table
            .get(state)
            .into_iter()
            .flat_map(|edges| edges.iter().map(|edge| &edge.to))
    }

    pub fn transition_count(&self) -> usize {
        self.table.values().map(Vec::len).sum()
    }

    /// Snapshot of the current state and history.
    ///
    /// The transition table is not included; predicates are closures.
    pub fn checkpoint(&self) -> Checkpoint<S> {
        Checkpoint::new(self.current.clone(), self.history.clone())
    }

    /// Restore the current state and history from a checkpoint.
    ///
    /// The transition table is left as registered. A restored state that the
    /// table does not know surfaces on the next trigger as `InvalidState`.
    pub fn resume(&mut self, checkpoint: Checkpoint<S>) -> Result<(), CheckpointError> {
        checkpoint.validate()?;
        debug!(id = %checkpoint.id, state = ?checkpoint.current_state, "Resuming from checkpoint");
        self.current = checkpoint.current_state;
        self.history = checkpoint.history;
        self.history.retain_last(self.history_limit);
        self.attempts = 0;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
    enum WorkflowState {
        Initial,
        Processing,
        Complete,
        Failed,
    }

    fn flag(value: bool) -> (Arc<AtomicBool>, impl Fn() -> bool + Send + 'static) {
        let flag = Arc::new(AtomicBool::new(value));
        let reader = Arc::clone(&flag);
        (flag, move || reader.load(Ordering::SeqCst))
    }

    #[test]
    fn registration_rejects_self_loops() {
        let mut machine = StateMachine::new();
        let result = machine.register_transition(1, 1, || true);

        assert_eq!(result, Err(RegistrationError::SelfLoop));
        assert_eq!(machine.degree(&1), None);
        assert_eq!(machine.transition_count(), 0);
    }

    #[test]
    fn registration_rejects_duplicates_without_mutation() {
        let mut machine = StateMachine::new();
        assert!(machine.register_transition('a', 'b', || false).is_ok());
        let result = machine.register_transition('a', 'b', || true);

        assert_eq!(result, Err(RegistrationError::Duplicate));
        assert_eq!(machine.transition_count(), 1);
        assert_eq!(
            machine.degree(&'a'),
            Some(Degree {
                incoming: 0,
                outgoing: 1
            })
        );
        assert_eq!(
            machine.degree(&'b'),
            Some(Degree {
                incoming: 1,
                outgoing: 0
            })
        );
    }

    #[test]
    fn reverse_edge_is_not_a_duplicate() {
        let mut machine = StateMachine::new();
        assert!(machine.register_transition('a', 'b', || false).is_ok());
        assert!(machine.register_transition('b', 'a', || false).is_ok());
        assert!(!machine.is_terminal(&'a'));
        assert!(!machine.is_terminal(&'b'));
    }

    #[test]
    fn state_is_unset_until_initialized() {
        let mut machine: StateMachine<u8> = StateMachine::new();
        assert_eq!(machine.state(), None);
        assert_eq!(machine.try_trigger(), Err(TriggerError::Uninitialized));
    }

    #[test]
    fn single_enabled_predicate_moves_the_machine() {
        let mut machine = StateMachine::new();
        machine
            .register_transition('A', 'B', || false)
            .unwrap();
        machine.register_transition('A', 'C', || true).unwrap();
        machine.set_state('A');

        let step = machine.try_trigger().unwrap();

        assert_eq!(step, StepResult::Transitioned { from: 'A', to: 'C' });
        assert_eq!(machine.state(), Some(&'C'));
        assert_eq!(machine.history().len(), 1);
    }

    #[test]
    fn no_enabled_predicate_leaves_state_alone() {
        let mut machine = StateMachine::new();
        machine
            .register_transition(WorkflowState::Initial, WorkflowState::Processing, || false)
            .unwrap();
        machine.set_state(WorkflowState::Initial);

        assert_eq!(machine.try_trigger().unwrap(), StepResult::Unchanged);
        assert_eq!(machine.state(), Some(&WorkflowState::Initial));
        assert!(machine.history().is_empty());
    }

    #[test]
    fn two_enabled_predicates_are_ambiguous() {
        let mut machine = StateMachine::new();
        machine.register_transition('X', 'Y', || true).unwrap();
        machine.register_transition('X', 'Z', || true).unwrap();
        machine.set_state('X');

        let err = machine.try_trigger().unwrap_err();

        assert_eq!(
            err,
            TriggerError::AmbiguousTransition {
                state: 'X',
                targets: vec!['Y', 'Z'],
            }
        );
        assert_eq!(machine.state(), Some(&'X'));
    }

    #[test]
    fn ambiguity_stops_evaluation_at_the_second_match() {
        let evaluated = Arc::new(AtomicUsize::new(0));
        let mut machine = StateMachine::new();
        for target in 1..=3 {
            let counter = Arc::clone(&evaluated);
            machine
                .register_transition(0, target, move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                    true
                })
                .unwrap();
        }
        machine.set_state(0);

        assert!(machine.try_trigger().is_err());
        assert_eq!(evaluated.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn every_predicate_is_evaluated_when_at_most_one_holds() {
        let evaluated = Arc::new(AtomicUsize::new(0));
        let mut machine = StateMachine::new();
        for target in 1..=4 {
            let counter = Arc::clone(&evaluated);
            machine
                .register_transition(0, target, move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                    target == 1
                })
                .unwrap();
        }
        machine.set_state(0);

        assert_eq!(
            machine.try_trigger().unwrap(),
            StepResult::Transitioned { from: 0, to: 1 }
        );
        assert_eq!(evaluated.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn terminal_state_is_a_fixed_point() {
        let mut machine = StateMachine::new();
        machine.register_transition('S', 'T', || true).unwrap();
        assert!(machine.is_terminal(&'T'));

        machine.set_state('T');
        for _ in 0..3 {
            assert_eq!(
                machine.try_trigger().unwrap(),
                StepResult::Transitioned { from: 'T', to: 'T' }
            );
        }
        assert!(machine.history().is_empty());
    }

    #[test]
    fn unknown_state_is_invalid_not_terminal() {
        let mut machine = StateMachine::new();
        machine
            .register_transition(WorkflowState::Initial, WorkflowState::Complete, || true)
            .unwrap();
        machine.set_state(WorkflowState::Failed);

        assert!(!machine.is_terminal(&WorkflowState::Failed));
        assert_eq!(
            machine.try_trigger(),
            Err(TriggerError::InvalidState {
                state: WorkflowState::Failed
            })
        );
        assert_eq!(machine.state(), Some(&WorkflowState::Failed));
    }

    #[test]
    fn trigger_returns_immediately_for_terminal_state() {
        let mut machine = StateMachine::new();
        machine.register_transition(1, 2, || false).unwrap();
        machine.set_state(2);

        assert_eq!(machine.trigger(), Ok((2, 2)));
    }

    #[test]
    fn trigger_polls_until_a_predicate_holds() {
        let polls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&polls);
        let mut machine = StateMachine::new().with_poll_strategy(PollStrategy::Spin);
        machine
            .register_transition(WorkflowState::Initial, WorkflowState::Processing, move || {
                counter.fetch_add(1, Ordering::SeqCst) >= 4
            })
            .unwrap();
        machine.set_state(WorkflowState::Initial);

        let change = machine.trigger().unwrap();

        assert_eq!(change, (WorkflowState::Initial, WorkflowState::Processing));
        assert_eq!(polls.load(Ordering::SeqCst), 5);
        assert_eq!(machine.history().last().map(|t| t.attempt), Some(5));
    }

    #[test]
    fn trigger_propagates_configuration_errors() {
        let mut machine = StateMachine::new();
        machine.register_transition('a', 'b', || true).unwrap();
        machine.register_transition('a', 'c', || true).unwrap();
        machine.set_state('a');
        assert!(matches!(
            machine.trigger(),
            Err(TriggerError::AmbiguousTransition { .. })
        ));

        machine.set_state('z');
        assert_eq!(
            machine.trigger(),
            Err(TriggerError::InvalidState { state: 'z' })
        );
    }

    #[test]
    fn timed_trigger_times_out_without_change() {
        let (_flag, ready) = flag(false);
        let mut machine = StateMachine::new();
        machine
            .register_transition(WorkflowState::Initial, WorkflowState::Complete, ready)
            .unwrap();
        machine.set_state(WorkflowState::Initial);

        let changed = machine.timed_trigger_for(Duration::from_millis(20)).unwrap();

        assert!(!changed);
        assert_eq!(machine.state(), Some(&WorkflowState::Initial));
    }

    #[test]
    fn timed_trigger_reports_change() {
        let (_flag, ready) = flag(true);
        let mut machine = StateMachine::new();
        machine
            .register_transition(WorkflowState::Initial, WorkflowState::Complete, ready)
            .unwrap();
        machine.set_state(WorkflowState::Initial);

        assert_eq!(
            machine.timed_trigger(Instant::now() + Duration::from_secs(5)),
            Ok(true)
        );
        assert_eq!(machine.state(), Some(&WorkflowState::Complete));
    }

    #[test]
    fn timed_trigger_with_past_deadline_still_tries() {
        let mut machine = StateMachine::new();
        machine.register_transition(1, 2, || true).unwrap();
        machine.set_state(1);

        assert_eq!(machine.timed_trigger(Instant::now()), Ok(true));
    }

    struct BrokenClock;

    impl Clock for BrokenClock {
        type Instant = u64;

        fn now(&self) -> Option<u64> {
            None
        }

        fn remaining(&self, now: &u64, deadline: &u64) -> Duration {
            Duration::from_millis(deadline.saturating_sub(*now))
        }
    }

    #[test]
    fn unreadable_clock_ends_the_wait() {
        let mut machine = StateMachine::new();
        machine.register_transition(1, 2, || false).unwrap();
        machine.set_state(1);

        let outcome = machine.timed_trigger_with(&BrokenClock, u64::MAX).unwrap();

        assert_eq!(outcome, TimedOutcome::ClockUnavailable);
        assert_eq!(machine.state(), Some(&1));
    }

    #[test]
    fn timed_trigger_does_not_oversleep_the_deadline() {
        let mut machine =
            StateMachine::new().with_poll_strategy(PollStrategy::sleep(Duration::from_secs(2)));
        machine.register_transition(1, 2, || false).unwrap();
        machine.set_state(1);

        let started = Instant::now();
        let changed = machine.timed_trigger_for(Duration::from_millis(20)).unwrap();
        let elapsed = started.elapsed();

        assert!(!changed);
        assert!(elapsed >= Duration::from_millis(20));
        assert!(elapsed < Duration::from_secs(1), "waited {elapsed:?}");
    }

    #[test]
    fn unrepresentable_timeout_waits_without_deadline() {
        let polls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&polls);
        let mut machine = StateMachine::new();
        machine
            .register_transition(1, 2, move || counter.fetch_add(1, Ordering::SeqCst) >= 2)
            .unwrap();
        machine.set_state(1);

        assert_eq!(machine.timed_trigger_for(Duration::MAX), Ok(true));
        assert_eq!(machine.state(), Some(&2));
    }

    #[test]
    fn history_is_bounded_on_cyclic_graphs() {
        let mut machine = StateMachine::new().with_history_limit(8);
        machine.register_transition(0, 1, || true).unwrap();
        machine.register_transition(1, 0, || true).unwrap();
        machine.set_state(0);

        for _ in 0..10_000 {
            machine.try_trigger().unwrap();
        }

        assert_eq!(machine.history().len(), 8);
        assert_eq!(machine.history().last().map(|t| (t.from, t.to)), Some((1, 0)));
    }

    #[test]
    fn default_history_limit_applies() {
        let mut machine = StateMachine::new();
        machine.register_transition('a', 'b', || true).unwrap();
        machine.register_transition('b', 'a', || true).unwrap();
        machine.set_state('a');

        for _ in 0..(DEFAULT_HISTORY_LIMIT + 10) {
            machine.try_trigger().unwrap();
        }

        assert_eq!(machine.history_limit(), DEFAULT_HISTORY_LIMIT);
        assert_eq!(machine.history().len(), DEFAULT_HISTORY_LIMIT);
    }

    #[test]
    fn zero_history_limit_disables_recording() {
        let mut machine = StateMachine::new().with_history_limit(0);
        machine.register_transition(1, 2, || true).unwrap();
        machine.set_state(1);

        assert!(machine.try_trigger().unwrap().is_changed());
        assert!(machine.history().is_empty());
    }

    #[test]
    fn resume_trims_history_to_the_limit() {
        let mut source = StateMachine::new();
        source.register_transition(0, 1, || true).unwrap();
        source.register_transition(1, 0, || true).unwrap();
        source.set_state(0);
        for _ in 0..20 {
            source.try_trigger().unwrap();
        }

        let mut target = StateMachine::new().with_history_limit(5);
        target.register_transition(0, 1, || true).unwrap();
        target.register_transition(1, 0, || true).unwrap();
        target.resume(source.checkpoint()).unwrap();

        assert_eq!(source.history().len(), 20);
        assert_eq!(target.history().len(), 5);
    }

    #[test]
    fn recorded_transitions_carry_a_timestamp() {
        let mut machine = StateMachine::new();
        machine.register_transition(1, 2, || true).unwrap();
        machine.set_state(1);
        machine.try_trigger().unwrap();

        assert!(machine.history().last().and_then(|t| t.timestamp).is_some());
    }

    #[test]
    fn introspection_reports_reachability() {
        let mut machine = StateMachine::new();
        machine.register_transition("idle", "busy", || false).unwrap();
        machine.register_transition("idle", "done", || false).unwrap();
        machine.register_transition("busy", "done", || false).unwrap();

        let targets: Vec<_> = machine.targets(&"idle").collect();
        assert_eq!(targets, vec![&"busy", &"done"]);
        assert_eq!(machine.targets(&"done").count(), 0);
        assert_eq!(machine.states().count(), 3);
        assert_eq!(machine.terminal_states().collect::<Vec<_>>(), vec![&"done"]);
        assert_eq!(machine.transition_count(), 3);
    }

    #[test]
    fn checkpoint_restores_state_and_history() {
        let mut machine = StateMachine::new();
        machine.register_transition(1, 2, || true).unwrap();
        machine.register_transition(2, 3, || true).unwrap();
        machine.set_state(1);
        machine.try_trigger().unwrap();

        let checkpoint = machine.checkpoint();
        machine.try_trigger().unwrap();
        assert_eq!(machine.state(), Some(&3));

        machine.resume(checkpoint).unwrap();
        assert_eq!(machine.state(), Some(&2));
        assert_eq!(machine.history().len(), 1);
    }
}
