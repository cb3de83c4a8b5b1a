//! # Classifieds Search Repository
//!
//! This crate provides the search side of the classifieds marketplace: the
//! `SearchIndexProvider` seam and its OpenSearch implementation, index
//! mappings, query building, the `SearchService` API and the reconciliation
//! jobs that rebuild the document index from the relational store.

pub mod config;
pub mod errors;
pub mod interfaces;
pub mod opensearch;
pub mod query;
pub mod recommend;
pub mod reconcile;
pub mod service;
pub mod types;

pub use config::SearchServiceConfig;
pub use errors::SearchIndexError;
pub use interfaces::SearchIndexProvider;
pub use opensearch::{IndexConfig, OpenSearchProvider};
pub use reconcile::{
    ConsolidateReport, MergedIndex, RebuildOptions, RebuildReport, ReindexSummary, SyncReport,
};
pub use service::SearchService;
pub use types::{
    BatchOperationResult, BatchOperationSummary, IndexDocumentRequest, IndexInfo, RawHit,
    ScrollPage,
};
