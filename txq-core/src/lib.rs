//! # txq-core
//!
//! Pure logic for the offline transaction queue (no I/O, instant tests).
//!
//! This crate implements the record state machine, create-time validation
//! and sync-pass accounting without any network or disk I/O.
//!
//! ## Design Philosophy
//!
//! All modules in this crate are **pure** - they take input and produce output
//! without side effects. The actual I/O (SQLite, HTTP, TCP probes) is
//! performed by `txq-client`, which drives these functions during a sync pass.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod report;
pub mod state;
pub mod validate;

pub use report::{DriftEntry, PassDisposition, PassTally, RecordFailure, SyncReport};
pub use state::{check_status_change, next_status, settled_status, SubmitEvent, TransitionError};
pub use validate::validate_new;
