//! Append-only, hash-linked block ledger for hashlink.
//!
//! This crate is the heart of hashlink. It provides:
//! - [`Block`] with a deterministic content hash over a fixed field order
//! - [`Ledger`], which routes every read and write through an
//!   [`hl_queue::OperationQueue`] so operations apply atomically and in
//!   submission order against an asynchronous [`hl_store::KvStore`]
//! - [`ValidationReport`] describing every integrity violation in a chain
//! - [`LedgerConfig`] with the genesis payload and reset semantics

pub mod block;
pub mod config;
pub mod error;
pub mod keys;
pub mod ledger;
mod ops;
pub mod validation;

pub use block::Block;
pub use config::{LedgerConfig, ResetMode, DEFAULT_GENESIS_BODY};
pub use error::{LedgerError, LedgerResult};
pub use ledger::{Ledger, LedgerHandle};
pub use validation::{ChainValidator, ValidationReport, Violation, ViolationKind};
