//! Restock alert delivery and the scheduled sweep over all SKUs.

pub mod notifier;
pub mod sweep_runner;

pub use notifier::{BroadcastNotifier, InMemoryNotifier, RunningLowAlert};
pub use sweep_runner::{RestockSweepRunner, RestockSweepRunnerHandle};
