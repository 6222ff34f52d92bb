//! Data source abstraction layer.
//!
//! This module defines the [`DataSource`] and [`Publisher`] traits, the
//! [`Page`] response type, and the item models every screen lists.  The only
//! implementations today are the mock sources in [`mock`], which fabricate
//! items after an artificial delay.
//!
//! ## For contributors: adding a real backend
//!
//! 1. Create a new file in this directory (e.g. `http.rs`).
//! 2. Define a struct holding the client configuration and implement
//!    [`DataSource`] for each item kind it serves.
//! 3. Re-export it below and construct it in `App::new` instead of the mock.
//!
//! Paging, de-duplication and rendering are all source-agnostic.

mod items;
mod mock;

pub use items::{
    ChatMessage, Draft, FeedItem, MessageItem, MessageKind, NoteItem, ProductItem, ProfileOption,
    ProfileOptionKind, UserProfile,
};
pub use mock::{
    mock_profile, mock_profile_options, ChatGenerator, FeedGenerator, MessageGenerator,
    MockOptions, MockPublisher, MockSource, NoteGenerator, ProductGenerator,
};

use crate::error::FetchError;

/// Anything that can live in a paged list.
///
/// The id is the identity key used to de-duplicate appended pages.
pub trait ListItem: Clone + Send + Sync + 'static {
    fn id(&self) -> &str;
}

/// One page of a paginated response.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Whether a page after this one exists.
    pub has_more: bool,
}

/// Trait that every paginated data source must implement.
///
/// View-models call [`fetch_page()`](DataSource::fetch_page) on the blocking
/// thread pool, so implementations may block and must be [`Send`] + [`Sync`].
///
/// ## Implementing a new source
///
/// ```ignore
/// pub struct MySource { /* client config */ }
///
/// impl DataSource for MySource {
///     type Item = FeedItem;
///
///     fn name(&self) -> &str { "my-source" }
///
///     fn fetch_page(&self, page: u32, limit: u32) -> Result<Page<FeedItem>, FetchError> {
///         // Perform HTTP / IO, then convert into FeedItem values.
///         todo!()
///     }
/// }
/// ```
pub trait DataSource: Send + Sync + 'static {
    type Item: ListItem;

    /// Human-readable label used in logs and status messages.
    fn name(&self) -> &str;

    /// Fetch page `page` (1-based) holding at most `limit` items.
    fn fetch_page(&self, page: u32, limit: u32) -> Result<Page<Self::Item>, FetchError>;
}

/// Sink for new notes created from the publish form.
pub trait Publisher: Send + Sync + 'static {
    fn publish(&self, draft: &Draft) -> Result<NoteItem, FetchError>;
}
