//! Configuration types for the SearchService.

/// Default number of documents per bulk request.
pub const DEFAULT_BULK_CHUNK_SIZE: usize = 1000;

/// Default number of documents per scroll page.
pub const DEFAULT_SCROLL_BATCH_SIZE: usize = 500;

/// Default lifetime of an engine-side scroll context between pages.
pub const DEFAULT_SCROLL_KEEP_ALIVE: &str = "1m";

/// Configuration for the SearchService and the reconcile jobs.
///
/// This struct allows customization of batch behavior. Use this to control
/// resource usage and avoid sending overly large requests to the engine.
#[derive(Debug, Clone)]
pub struct SearchServiceConfig {
    /// Maximum number of documents sent in a single bulk request.
    ///
    /// Larger writes are split into consecutive requests; the index is still
    /// refreshed once at the end of the run.
    pub bulk_chunk_size: usize,

    /// Number of documents fetched per scroll page while merging stray indices.
    pub scroll_batch_size: usize,

    /// Keep-alive passed to the engine for each scroll page.
    pub scroll_keep_alive: String,
}

impl Default for SearchServiceConfig {
    fn default() -> Self {
        Self {
            bulk_chunk_size: DEFAULT_BULK_CHUNK_SIZE,
            scroll_batch_size: DEFAULT_SCROLL_BATCH_SIZE,
            scroll_keep_alive: DEFAULT_SCROLL_KEEP_ALIVE.to_string(),
        }
    }
}

impl SearchServiceConfig {
    /// Create a config with a custom bulk chunk size.
    ///
    /// # Arguments
    ///
    /// * `bulk_chunk_size` - Maximum number of documents per bulk request (at least 1)
    pub fn with_bulk_chunk_size(mut self, bulk_chunk_size: usize) -> Self {
        self.bulk_chunk_size = bulk_chunk_size.max(1);
        self
    }

    /// Create a config with a custom scroll batch size.
    pub fn with_scroll_batch_size(mut self, scroll_batch_size: usize) -> Self {
        self.scroll_batch_size = scroll_batch_size.max(1);
        self
    }
}
