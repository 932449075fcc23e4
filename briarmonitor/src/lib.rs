//! # briarmonitor
//!
//! Background health monitors with no shared state with the player:
//!
//! - **UptimePinger** : heartbeat GET against a push URL every minute
//! - **StorageHealthReporter** : hourly ZFS pool report fetched from a
//!   TrueNAS-style REST API and posted through a [`briarsource::Notifier`]
//!
//! Both are plain poll-and-forward loops: every failure is logged and
//! retried on the next tick, and both stop on the shared shutdown token.

mod error;
mod storage;
mod uptime;

// Re-exports
pub use error::{Error, Result};
pub use storage::{
    format_report, Pool, StorageHealthReporter, Topology, VdevNode, DEFAULT_REPORT_INTERVAL,
};
pub use uptime::{UptimePinger, DEFAULT_PUSH_INTERVAL};
