//! `tender-query` compiles structured filter trees into predicates and
//! computes price statistics.
//!
//! Both halves are pure: compilation resolves fields and coercions through
//! the per-catalog registries in [`tender_model::fields`], and statistics
//! operate on raw column text fetched by the caller. The record store is the
//! only consumer of [`Predicate`]; it evaluates the same value for listing
//! and statistics so the two cannot disagree.

mod compile;
mod predicate;
mod stats;

pub use compile::{compile, compile_query, compile_search};
pub use predicate::{Comparison, DateOp, Leaf, NumberOp, Predicate};
pub use stats::{price_stats, PriceStats};
