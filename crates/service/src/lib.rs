//! Monitoring core for notewatch
//!
//! One `SubjectMonitor` per watched account polls the platform, records new
//! items in the seen store and hands each one to the `InteractionPipeline`.
//! `MonitorSupervisor` runs the monitors in a bounded pool.

#![allow(missing_docs, reason = "Internal crate with self-explanatory API")]
#![allow(clippy::missing_errors_doc, reason = "Errors are self-explanatory from Result types")]
#![allow(missing_debug_implementations, reason = "Internal types")]
#![allow(clippy::missing_docs_in_private_items, reason = "Internal crate")]
#![allow(clippy::implicit_return, reason = "Implicit return is idiomatic Rust")]
#![allow(clippy::question_mark_used, reason = "? operator is idiomatic Rust")]
#![allow(clippy::cognitive_complexity, reason = "Complex async flows are inherent")]

mod budget;
mod error;
mod monitor;
pub mod notice;
mod pipeline;
mod shutdown;
mod supervisor;

#[cfg(test)]
mod fakes;
#[cfg(test)]
mod monitor_tests;

pub use budget::ErrorBudget;
pub use error::ServiceError;
pub use monitor::{CycleReport, MonitorContext, MonitorExit, SubjectMonitor};
pub use pipeline::InteractionPipeline;
pub use shutdown::{ShutdownSignal, ShutdownTrigger, shutdown_channel};
pub use supervisor::{MonitorSupervisor, SubjectExit, SupervisorReport};
