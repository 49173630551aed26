//! # Strand DB Core
//!
//! Cursor vocabulary and contracts for Strand's resumable-scan layer.
//!
//! This crate provides:
//! - The continuation model: opaque resume tokens with start/end sentinels
//! - The cursor result model: values and precedence-ordered stop reasons
//! - Scan parameters, per-attempt budgets, and the execution context
//! - The async [`Cursor`] trait and visitor contract
//!
//! ## Design Principles
//!
//! 1. **Continuations are the retry mechanism**: no retries inside the core;
//!    a caller recovers by rebuilding the tree from the last captured token
//! 2. **One advance in flight**: a cursor is driven by a single awaiting
//!    caller; no internal concurrency
//! 3. **Terminal means terminal**: only source exhaustion ends a scan, and
//!    only then is the continuation the end sentinel

pub mod budget;
pub mod context;
pub mod continuation;
pub mod cursor;
pub mod error;
pub mod properties;
pub mod result;

pub use budget::ScanBudget;
pub use context::ScanContext;
pub use continuation::{Continuation, CursorContinuation, SharedContinuation};
pub use cursor::{BoxedCursor, Cursor, CursorFactory, CursorVisitor};
pub use error::{Error, Result};
pub use properties::{ExecuteProperties, ScanProperties};
pub use result::{CursorResult, NoNextReason};
