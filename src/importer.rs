// Import loop: replays every outline entry against a `ReaderApi`, one
// feed at a time, stopping at the first error.

use crate::api::ReaderApi;
use crate::opml::{FeedEntry, OpmlError};
use anyhow::Result;
use tracing::info;

/// How subscriptions are replayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Plain calls, folder label only.
    WithoutAuth,
    /// Calls carry the login header and the feed title is sent too.
    WithAuth,
}

/// Counts for a finished import: feeds replayed and requests sent.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub feeds: usize,
    pub requests: usize,
}

/// Issue `quick_add` then `edit_subscription` for each entry. `on_feed` is
/// called before a feed's requests go out.
pub fn import_entries<A, I, F>(api: &A, entries: I, mode: Mode, mut on_feed: F) -> Result<ImportSummary>
where
    A: ReaderApi + ?Sized,
    I: IntoIterator<Item = Result<FeedEntry, OpmlError>>,
    F: FnMut(&FeedEntry),
{
    let mut summary = ImportSummary::default();
    for entry in entries {
        let entry = entry?;
        let title = match mode {
            Mode::WithoutAuth => None,
            Mode::WithAuth => Some(entry.title.as_deref().ok_or(OpmlError::MissingAttribute {
                element: "feed",
                attribute: "title",
            })?),
        };
        on_feed(&entry);

        api.quick_add(&entry.url)?;
        summary.requests += 1;
        api.edit_subscription(&entry.url, &entry.folder, title)?;
        summary.requests += 1;

        summary.feeds += 1;
        info!(feed = %entry.url, folder = %entry.folder, "imported");
    }
    Ok(summary)
}
