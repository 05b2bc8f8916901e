//! Read-through list caches for the widget's side lists.

/// A read-through cache for one of the widget's side lists (the
/// focus-session picker and the conversation-history sidebar).
///
/// Populated by full replacement on fetch; safe to be stale between
/// refreshes. A failed fetch degrades to an empty list rather than
/// surfacing an error.
#[derive(Debug, Clone)]
pub struct ListCache<T> {
    items: Vec<T>,
    loading: bool,
}

impl<T> ListCache<T> {
    /// Creates an empty, non-loading cache.
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            loading: false,
        }
    }

    /// Marks a refresh as in flight. The stale items stay visible.
    pub fn begin(&mut self) {
        self.loading = true;
    }

    /// Replaces the cached items with a fresh fetch result.
    pub fn finish(&mut self, items: Vec<T>) {
        self.items = items;
        self.loading = false;
    }

    /// Degrades to the empty state after a failed fetch.
    pub fn degrade(&mut self) {
        self.items.clear();
        self.loading = false;
    }

    /// The cached items.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// True while a refresh is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading
    }
}

impl<T> Default for ListCache<T> {
    fn default() -> Self {
        Self::new()
    }
}
