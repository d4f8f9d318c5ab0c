//! # txq-types
//!
//! Data model and wire format types for the offline transaction queue.
//!
//! This crate provides the foundational types used across all txq crates:
//! - [`TransactionId`], [`TransactionStatus`] - Identity and lifecycle
//! - [`TransactionRecord`], [`NewTransaction`], [`TransactionSummary`] - Stored records
//! - [`SubmitRequest`], [`SubmitResponse`], [`SubmitOutcome`] - Remote wire format
//! - [`ValidationError`] - Caller input errors

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod ids;
mod record;
mod wire;

pub use error::ValidationError;
pub use ids::TransactionId;
pub use record::{
    NewTransaction, ParseStatusError, TransactionRecord, TransactionStatus, TransactionSummary,
};
pub use wire::{SubmitOutcome, SubmitRequest, SubmitResponse, TRANSACTIONS_PATH};

/// Re-exported so callers do not need a direct `rust_decimal` dependency.
pub use rust_decimal::Decimal;
