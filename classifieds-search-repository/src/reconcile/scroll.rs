use futures::stream::{self, Stream};
use serde_json::json;
use tracing::{debug, warn};

use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;
use crate::query::match_all_query;
use crate::types::RawHit;

enum ScrollState {
    Start,
    Next(String),
    Done,
}

/// Every document of `index` as a lazy sequence of batches of at most
/// `batch_size` hits.
///
/// Nothing is requested until the stream is polled. The sequence ends at the
/// first empty batch, after which the engine-side scroll context is released.
/// The context is also released when fetching a later batch fails.
/// Calling this again starts a fresh scroll from the beginning.
pub fn scroll_batches<'a>(
    provider: &'a dyn SearchIndexProvider,
    index: &'a str,
    batch_size: usize,
    keep_alive: &'a str,
) -> impl Stream<Item = Result<Vec<RawHit>, SearchIndexError>> + 'a {
    stream::try_unfold(ScrollState::Start, move |state| {
        next_batch(provider, index, batch_size, keep_alive, state)
    })
}

async fn next_batch(
    provider: &dyn SearchIndexProvider,
    index: &str,
    batch_size: usize,
    keep_alive: &str,
    state: ScrollState,
) -> Result<Option<(Vec<RawHit>, ScrollState)>, SearchIndexError> {
    let page = match state {
        ScrollState::Start => {
            let body = json!({
                "query": match_all_query(),
                "size": batch_size,
                "sort": ["_doc"]
            });
            provider.open_scroll(index, &body, keep_alive).await?
        }
        ScrollState::Next(scroll_id) => match provider.continue_scroll(&scroll_id, keep_alive).await {
            Ok(page) => page,
            Err(e) => {
                release(provider, index, &scroll_id).await;
                return Err(e);
            }
        },
        ScrollState::Done => return Ok(None),
    };

    if page.hits.is_empty() {
        if let Some(scroll_id) = page.scroll_id {
            release(provider, index, &scroll_id).await;
        }
        debug!(index = %index, "Scroll exhausted");
        return Ok(None);
    }

    let next = match page.scroll_id {
        Some(scroll_id) => ScrollState::Next(scroll_id),
        None => ScrollState::Done,
    };
    Ok(Some((page.hits, next)))
}

async fn release(provider: &dyn SearchIndexProvider, index: &str, scroll_id: &str) {
    if let Err(e) = provider.clear_scroll(scroll_id).await {
        warn!(index = %index, error = %e, "Failed to clear scroll");
    }
}
