//! Connection Handshake
//!
//! A handshake whose phases advance on simulated network events, with each
//! phase bounded by a deadline. Shows `timed_trigger`, ambiguity reporting
//! and checkpointing the runtime state.
//!
//! Run with: RUST_LOG=pollfsm=debug cargo run --example handshake

use pollfsm::engine::{StateMachine, TriggerError};
use pollfsm::state_enum;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

state_enum! {
    enum Handshake {
        SynSent,
        Established,
        Closed,
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Connection Handshake ===\n");

    // Each poll of the "network" counts as one received packet.
    let packets = Arc::new(AtomicUsize::new(0));
    let acked = {
        let packets = Arc::clone(&packets);
        move || packets.fetch_add(1, Ordering::SeqCst) >= 3
    };

    let mut machine = StateMachine::new();
    machine.register_transition(Handshake::SynSent, Handshake::Established, acked)?;
    machine.register_transition(Handshake::Established, Handshake::Closed, || true)?;
    machine.set_state(Handshake::SynSent);

    for state in machine.states() {
        let degree = machine.degree(state).unwrap_or_default();
        println!(
            "  {:<12} in={} out={} terminal={}",
            state.name(),
            degree.incoming,
            degree.outgoing,
            machine.is_terminal(state)
        );
    }

    let changed = machine.timed_trigger_for(Duration::from_millis(100))?;
    println!("\nSYN acknowledged within deadline: {changed}");

    let checkpoint = machine.checkpoint();
    println!("Checkpoint:\n{}", checkpoint.to_json()?);

    machine.trigger()?;
    println!("\nState after close: {:?}", machine.state());

    // Overlapping conditions are a wiring bug, not something to tie-break.
    let mut broken = StateMachine::new();
    broken.register_transition(Handshake::SynSent, Handshake::Established, || true)?;
    broken.register_transition(Handshake::SynSent, Handshake::Closed, || true)?;
    broken.set_state(Handshake::SynSent);
    match broken.try_trigger() {
        Err(err @ TriggerError::AmbiguousTransition { .. }) => println!("\nRejected: {err}"),
        other => println!("\nUnexpected: {other:?}"),
    }

    println!("\n=== Example Complete ===");
    Ok(())
}
