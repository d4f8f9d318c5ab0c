//! CLI command implementations.

pub mod create;
pub mod delete;
pub mod list;
pub mod serve;
pub mod status;
pub mod sync;
pub mod watch;
