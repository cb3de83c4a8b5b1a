//! The body of each script. Binaries only bootstrap and call into these.

pub mod check;
pub mod consolidate;
pub mod reindex;
pub mod sync;
