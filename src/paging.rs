//! Paged list state machine.
//!
//! [`PagedList`] accumulates pages from a [`DataSource`](crate::source::DataSource)
//! into one ordered list.  It does no I/O: callers ask it whether a trigger
//! should start a fetch ([`PagedList::begin`]) and hand the response back
//! ([`PagedList::complete`]).
//!
//! ```text
//!            begin(trigger)              complete(request, result)
//!   Idle ─────────────────────► Loading ───────────────────────────► Idle
//!     ▲  (ignored while Loading,                                      │
//!     │   or LoadMore without more)                                   │
//!     └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! At most one request is ever in flight.  Refresh replaces the list only when
//! its response arrives; load-more adds the next page and skips ids already
//! present.  [`Order`] decides which end of the list later pages grow from.

use std::collections::HashSet;

use crate::error::FetchError;
use crate::source::{ListItem, Page};

/// Discrete events that may start a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    ViewLoaded,
    Refresh,
    LoadMore,
}

/// A page request handed to the data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchRequest {
    pub page: u32,
    /// Replace the list on success instead of appending.
    pub is_refresh: bool,
}

/// Which end of the list holds the newest items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    /// Feeds: later (older) pages go below, local items on top.
    NewestFirst,
    /// Conversations: earlier pages go above, local items at the bottom.
    OldestFirst,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading(FetchRequest),
}

/// What [`PagedList::complete`] did with a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// A refresh landed; the list now holds `count` items.
    Replaced { count: usize },
    /// A load-more landed; `added` new items, `skipped` duplicate ids.
    Appended { added: usize, skipped: usize },
    /// The fetch failed; nothing but the loading flag changed.
    Failed(FetchError),
    /// The response did not belong to the in-flight request and was dropped.
    Stale,
}

pub struct PagedList<T> {
    items: Vec<T>,
    /// Ids of `items`, to keep appends free of duplicates.
    seen: HashSet<String>,
    current_page: u32,
    page_size: u32,
    phase: Phase,
    has_more: bool,
    /// Set once the first page has landed; load-more needs a base page.
    loaded: bool,
    order: Order,
    /// Items created locally.  They survive a refresh until the source
    /// lists them itself.
    local: Vec<T>,
}

impl<T: ListItem> PagedList<T> {
    pub fn new(page_size: u32) -> Self {
        Self::with_order(page_size, Order::NewestFirst)
    }

    pub fn with_order(page_size: u32, order: Order) -> Self {
        Self {
            items: Vec::new(),
            seen: HashSet::new(),
            current_page: 1,
            page_size: page_size.max(1),
            phase: Phase::Idle,
            has_more: true,
            loaded: false,
            order,
            local: Vec::new(),
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.phase, Phase::Loading(_))
    }

    #[cfg(test)]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Decide whether `trigger` starts a fetch.
    ///
    /// Returns the request to issue and enters `Loading`, or `None` when the
    /// trigger is ignored.
    pub fn begin(&mut self, trigger: Trigger) -> Option<FetchRequest> {
        if let Phase::Loading(in_flight) = self.phase {
            tracing::debug!(?trigger, page = in_flight.page, "fetch in flight, trigger ignored");
            return None;
        }

        let request = match trigger {
            Trigger::ViewLoaded | Trigger::Refresh => FetchRequest {
                page: 1,
                is_refresh: true,
            },
            Trigger::LoadMore => {
                if !self.loaded || !self.has_more {
                    tracing::debug!(
                        loaded = self.loaded,
                        has_more = self.has_more,
                        "load-more ignored"
                    );
                    return None;
                }
                FetchRequest {
                    page: self.current_page + 1,
                    is_refresh: false,
                }
            }
        };

        self.phase = Phase::Loading(request);
        Some(request)
    }

    /// Apply the outcome of `request`.
    pub fn complete(
        &mut self,
        request: FetchRequest,
        result: Result<Page<T>, FetchError>,
    ) -> Completion {
        match self.phase {
            Phase::Loading(in_flight) if in_flight == request => {}
            _ => return Completion::Stale,
        }
        self.phase = Phase::Idle;

        let page = match result {
            Ok(page) => page,
            Err(e) => return Completion::Failed(e),
        };

        self.has_more = page.has_more;
        if request.is_refresh {
            self.items.clear();
            self.seen.clear();
            self.extend(page.items);
            for item in self.local.clone() {
                self.place_newest(item);
            }
            self.current_page = 1;
            self.loaded = true;
            Completion::Replaced {
                count: self.items.len(),
            }
        } else {
            let (added, skipped) = self.extend(page.items);
            self.current_page = request.page;
            Completion::Appended { added, skipped }
        }
    }

    /// Insert a locally created item at the newest end.  Returns `false` if
    /// its id is already listed.
    pub fn push(&mut self, item: T) -> bool {
        if !self.place_newest(item.clone()) {
            return false;
        }
        self.local.push(item);
        true
    }

    fn place_newest(&mut self, item: T) -> bool {
        if !self.seen.insert(item.id().to_string()) {
            return false;
        }
        match self.order {
            Order::NewestFirst => self.items.insert(0, item),
            Order::OldestFirst => self.items.push(item),
        }
        true
    }

    /// Add a fetched page at the older end, skipping listed ids.
    fn extend(&mut self, items: Vec<T>) -> (usize, usize) {
        let total = items.len();
        let fresh: Vec<T> = items
            .into_iter()
            .filter(|item| self.seen.insert(item.id().to_string()))
            .collect();
        let added = fresh.len();
        match self.order {
            Order::NewestFirst => self.items.extend(fresh),
            Order::OldestFirst => {
                self.items.splice(0..0, fresh);
            }
        }
        (added, total - added)
    }
}

/// Whether the last visible row is within `lookahead` rows of the final row.
///
/// This is the scroll-near-bottom heuristic that fires load-more; it is not
/// exact end-of-list detection.
pub fn is_near_end(last_visible: usize, len: usize, lookahead: usize) -> bool {
    len > 0 && last_visible.saturating_add(lookahead) >= len - 1
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
