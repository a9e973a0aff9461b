pub mod aggregate;
pub mod commands;
pub mod controller;

pub use aggregate::{summarize_run, RunSummary};
pub use controller::{TimerController, TrackingPolicy};
