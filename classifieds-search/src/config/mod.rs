//! Configuration and dependency wiring for the reconciliation scripts.

mod dependencies;
mod settings;

pub use dependencies::Dependencies;
pub use settings::{LogFormat, Settings};
