//! Reconciliation jobs that bring the document index back in line with the
//! relational store.
//!
//! All three jobs end in the same [`rebuild`] routine and differ only in the
//! setup that precedes it:
//!
//! - [`full_reindex`] drops and recreates the index, then bulk-loads it.
//! - [`sync`] clears the index contents and re-indexes post by post.
//! - [`consolidate`] merges stray indices into the canonical one, deletes
//!   them, then runs the same rebuild as [`sync`].

mod consolidate;
mod rebuild;
mod reindex;
mod scroll;
mod sync;

pub use consolidate::{consolidate, ConsolidateReport, MergedIndex};
pub use rebuild::{rebuild, RebuildOptions, RebuildReport};
pub use reindex::{full_reindex, ReindexSummary};
pub use scroll::scroll_batches;
pub use sync::{sync, SyncReport};
