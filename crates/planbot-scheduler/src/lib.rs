//! # Planbot Scheduler
//!
//! The daily trigger and execution pipeline:
//!
//! ```text
//! engine (1s tokio interval, watch-channel shutdown)
//!   └── Schedule::due? ── Calendar workday check
//!         ├── holiday → log, mark fired, skip
//!         └── workday → TaskExecutor::run (single-flight)
//!               ├── PlanStore::plans_for(today)
//!               ├── SubmissionAgent::submit (60s timeout)
//!               ├── EvidenceStore::upload (best-effort)
//!               └── NotificationSink::send (fire-and-forget)
//! ```
//!
//! Manual triggers from the control surface converge on the same executor;
//! overlapping runs are rejected with a "busy" report, never queued.

pub mod agent;
pub mod engine;
pub mod evidence;
pub mod executor;
pub mod notify;
pub mod planner;
pub mod schedule;

mod daemon;

#[cfg(test)]
mod testutil;

pub use daemon::Daemon;
pub use executor::{RunReport, TaskExecutor, Trigger};
pub use schedule::Schedule;
