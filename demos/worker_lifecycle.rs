//! Worker Lifecycle
//!
//! A background worker is driven through its lifecycle by commands written
//! from the main thread. The worker thread owns the machine and blocks in
//! `trigger()` until the next command arrives.
//!
//! Run with: RUST_LOG=debug cargo run --example worker_lifecycle

use pollfsm::builder::StateMachineBuilder;
use pollfsm::engine::PollStrategy;
use pollfsm::state_enum;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

state_enum! {
    enum Worker {
        Idle,
        Running,
        Draining,
        Stopped,
    }
}

const START: u8 = 1;
const STOP: u8 = 2;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Worker Lifecycle ===\n");

    let command = Arc::new(AtomicU8::new(0));
    let is = |expected: u8| {
        let command = Arc::clone(&command);
        move || command.load(Ordering::SeqCst) == expected
    };

    let mut machine = StateMachineBuilder::new()
        .initial(Worker::Idle)
        .poll(PollStrategy::backoff(
            Duration::from_micros(50),
            Duration::from_millis(5),
        ))
        .transition(Worker::Idle, Worker::Running, is(START))
        .and_then(|b| b.transition(Worker::Running, Worker::Draining, is(STOP)))
        .and_then(|b| b.always(Worker::Draining, Worker::Stopped))
        .and_then(|b| b.build())
        .expect("worker transitions are well formed");

    let worker = thread::spawn(move || {
        loop {
            match machine.trigger() {
                Ok((from, to)) if from == to => {
                    println!("  worker: settled in {}", to.name());
                    break;
                }
                Ok((from, to)) => println!("  worker: {} -> {}", from.name(), to.name()),
                Err(err) => {
                    eprintln!("  worker: {err}");
                    break;
                }
            }
        }
        machine
    });

    thread::sleep(Duration::from_millis(20));
    println!("main: sending START");
    command.store(START, Ordering::SeqCst);

    thread::sleep(Duration::from_millis(20));
    println!("main: sending STOP");
    command.store(STOP, Ordering::SeqCst);

    let machine = worker.join().expect("worker thread panicked");

    println!("\nPath taken:");
    for state in machine.history().get_path() {
        println!("  {}", state.name());
    }
    for transition in machine.history().transitions() {
        println!(
            "  {} -> {} after {} evaluation(s)",
            transition.from.name(),
            transition.to.name(),
            transition.attempt
        );
    }

    println!("\n=== Example Complete ===");
}
