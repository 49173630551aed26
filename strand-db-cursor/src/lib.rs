//! # Strand DB Cursor
//!
//! The resumable-scan execution layer: cursor combinators over the vocabulary
//! of `strand-db-core`.
//!
//! A query plan assembles a tree of cursors — leaves at the bottom,
//! combinators above — and drives one `next()` at a time from the root. Any
//! result's continuation can be persisted and later fed back into an
//! identically shaped tree, in a new transaction or process, to produce
//! exactly the remaining results.
//!
//! Combinators provided:
//! - [`ConcatCursor`] — everything from a first cursor, then everything from
//!   a second, with row-limit carry-over across the boundary
//! - [`UnionCursor`] — ordered merge of two cursors, duplicates collapsed
//! - [`IntersectionCursor`] — elements common to two cursors
//! - [`RowLimitCursor`] — caps surfaced rows
//! - [`MapCursor`] — transforms values, passes positions through
//!
//! Leaves: [`ListCursor`] over in-memory sequences, [`EmptyCursor`] over
//! nothing. Real range-scan leaves live with the storage tier and only need
//! to implement the `Cursor` trait.

mod codec;

pub mod concat;
pub mod empty;
pub mod explain;
pub mod index;
pub mod intersect;
pub mod limit;
pub mod list;
pub mod map;
mod pair;
pub mod runner;
pub mod union;

pub use concat::ConcatCursor;
pub use empty::EmptyCursor;
pub use explain::{explain, PlanExplainer};
pub use index::IndexMaintainer;
pub use intersect::IntersectionCursor;
pub use limit::RowLimitCursor;
pub use list::ListCursor;
pub use map::MapCursor;
pub use runner::collect_remaining;
pub use union::{Comparator, UnionCursor};
