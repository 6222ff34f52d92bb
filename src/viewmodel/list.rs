//! Paged list view-model.
//!
//! [`ListViewModel`] binds the list triggers (view loaded, refresh, load
//! more) and locally created items to a [`PagedList`] owned by a single driver
//! task.  Fetches run on the blocking pool and report back over a channel, so
//! the list is only ever touched from the driver.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};

use super::{set_state, Bindings, ViewModel};
use crate::error::FetchError;
use crate::paging::{Completion, FetchRequest, Order, PagedList, Trigger};
use crate::source::{DataSource, Page};

// ---------------------------------------------------------------------------
// Inputs / outputs
// ---------------------------------------------------------------------------

pub struct ListInput<T> {
    pub view_loaded: mpsc::UnboundedReceiver<()>,
    pub refresh: mpsc::UnboundedReceiver<()>,
    pub load_more: mpsc::UnboundedReceiver<()>,
    /// Items created on this device, e.g. a freshly published note.
    pub insert: mpsc::UnboundedReceiver<T>,
}

/// Screen-side ends of a [`ListInput`].
#[derive(Clone)]
pub struct ListTriggers<T> {
    view_loaded: mpsc::UnboundedSender<()>,
    refresh: mpsc::UnboundedSender<()>,
    load_more: mpsc::UnboundedSender<()>,
    insert: mpsc::UnboundedSender<T>,
}

impl<T> ListInput<T> {
    pub fn pair() -> (ListTriggers<T>, ListInput<T>) {
        let (view_loaded_tx, view_loaded) = mpsc::unbounded_channel();
        let (refresh_tx, refresh) = mpsc::unbounded_channel();
        let (load_more_tx, load_more) = mpsc::unbounded_channel();
        let (insert_tx, insert) = mpsc::unbounded_channel();
        (
            ListTriggers {
                view_loaded: view_loaded_tx,
                refresh: refresh_tx,
                load_more: load_more_tx,
                insert: insert_tx,
            },
            ListInput {
                view_loaded,
                refresh,
                load_more,
                insert,
            },
        )
    }
}

impl<T> ListTriggers<T> {
    // Sends only fail once the driver is gone, i.e. after teardown.

    pub fn view_loaded(&self) {
        let _ = self.view_loaded.send(());
    }

    pub fn refresh(&self) {
        let _ = self.refresh.send(());
    }

    pub fn load_more(&self) {
        let _ = self.load_more.send(());
    }

    pub fn insert(&self, item: T) {
        let _ = self.insert.send(item);
    }

    /// Whether the driver has stopped listening.
    #[cfg(test)]
    pub fn is_closed(&self) -> bool {
        self.view_loaded.is_closed()
    }
}

pub struct ListOutput<T> {
    pub items: watch::Receiver<Vec<T>>,
    pub is_loading: watch::Receiver<bool>,
    pub has_more: watch::Receiver<bool>,
    pub errors: mpsc::UnboundedReceiver<FetchError>,
    pub bindings: Bindings,
}

// ---------------------------------------------------------------------------
// Loader, shared with the chat view-model
// ---------------------------------------------------------------------------

pub(crate) type Done<T> = (FetchRequest, Result<Page<T>, FetchError>);

/// Owns a [`PagedList`] and publishes it to watch/mpsc streams.
pub(crate) struct PageLoader<S: DataSource> {
    source: Arc<S>,
    list: PagedList<S::Item>,
    done_tx: mpsc::UnboundedSender<Done<S::Item>>,
    items: watch::Sender<Vec<S::Item>>,
    is_loading: watch::Sender<bool>,
    has_more: watch::Sender<bool>,
    errors: mpsc::UnboundedSender<FetchError>,
}

pub(crate) struct LoaderStreams<T> {
    pub items: watch::Receiver<Vec<T>>,
    pub is_loading: watch::Receiver<bool>,
    pub has_more: watch::Receiver<bool>,
    pub errors: mpsc::UnboundedReceiver<FetchError>,
    pub done: mpsc::UnboundedReceiver<Done<T>>,
}

impl<S: DataSource> PageLoader<S> {
    pub(crate) fn new(
        source: Arc<S>,
        page_size: u32,
        order: Order,
    ) -> (Self, LoaderStreams<S::Item>) {
        let list = PagedList::with_order(page_size, order);
        let (done_tx, done) = mpsc::unbounded_channel();
        let (items_tx, items) = watch::channel(Vec::new());
        let (is_loading_tx, is_loading) = watch::channel(false);
        let (has_more_tx, has_more) = watch::channel(list.has_more());
        let (errors_tx, errors) = mpsc::unbounded_channel();

        let loader = Self {
            source,
            list,
            done_tx,
            items: items_tx,
            is_loading: is_loading_tx,
            has_more: has_more_tx,
            errors: errors_tx,
        };
        let streams = LoaderStreams {
            items,
            is_loading,
            has_more,
            errors,
            done,
        };
        (loader, streams)
    }

    /// Start a fetch for `trigger` unless the list state machine refuses.
    pub(crate) fn trigger(&mut self, trigger: Trigger) {
        let Some(request) = self.list.begin(trigger) else {
            return;
        };
        set_state(&self.is_loading, true);

        let source = Arc::clone(&self.source);
        let done = self.done_tx.clone();
        let limit = self.list.page_size();
        tracing::debug!(
            source = source.name(),
            page = request.page,
            ?trigger,
            "fetch started"
        );

        tokio::spawn(async move {
            let result = tokio::task::spawn_blocking({
                let source = Arc::clone(&source);
                move || source.fetch_page(request.page, limit)
            })
            .await
            .unwrap_or_else(|e| Err(FetchError::failed(format!("fetch worker: {e}"))));
            // A closed channel means the screen was torn down; drop the result.
            let _ = done.send((request, result));
        });
    }

    /// Apply a finished fetch and publish the new state.
    pub(crate) fn complete(&mut self, (request, result): Done<S::Item>) {
        let name = self.source.name();
        let landed = match self.list.complete(request, result) {
            Completion::Stale => {
                tracing::debug!(source = name, page = request.page, "stale response dropped");
                return;
            }
            Completion::Failed(e) => {
                tracing::warn!(source = name, page = request.page, error = %e, "fetch failed");
                let _ = self.errors.send(e);
                false
            }
            Completion::Replaced { count } => {
                tracing::info!(source = name, count, "list refreshed");
                true
            }
            Completion::Appended { added, skipped } => {
                tracing::info!(
                    source = name,
                    page = self.list.current_page(),
                    added,
                    skipped,
                    "page added"
                );
                true
            }
        };

        set_state(&self.has_more, self.list.has_more());
        set_state(&self.is_loading, self.list.is_loading());
        // Every emission carries the whole list; readers replace, never diff.
        if landed {
            self.publish_items();
        }
    }

    /// Insert a locally created item and publish the list.
    pub(crate) fn push(&mut self, item: S::Item) -> bool {
        let added = self.list.push(item);
        if added {
            self.publish_items();
        }
        added
    }

    fn publish_items(&self) {
        self.items.send_replace(self.list.items().to_vec());
    }
}

// ---------------------------------------------------------------------------
// View-model
// ---------------------------------------------------------------------------

pub struct ListViewModel<S> {
    source: Arc<S>,
    page_size: u32,
    runtime: Handle,
}

impl<S: DataSource> ListViewModel<S> {
    pub fn new(source: Arc<S>, page_size: u32, runtime: Handle) -> Self {
        Self {
            source,
            page_size,
            runtime,
        }
    }
}

impl<S: DataSource> ViewModel for ListViewModel<S> {
    type Input = ListInput<S::Item>;
    type Output = ListOutput<S::Item>;

    fn transform(self, input: ListInput<S::Item>) -> ListOutput<S::Item> {
        let (loader, streams) = PageLoader::new(self.source, self.page_size, Order::NewestFirst);
        let LoaderStreams {
            items,
            is_loading,
            has_more,
            errors,
            done,
        } = streams;

        let mut bindings = Bindings::default();
        bindings.push(self.runtime.spawn(drive(loader, input, done)));

        ListOutput {
            items,
            is_loading,
            has_more,
            errors,
            bindings,
        }
    }
}

async fn drive<S: DataSource>(
    mut loader: PageLoader<S>,
    mut input: ListInput<S::Item>,
    mut done: mpsc::UnboundedReceiver<Done<S::Item>>,
) {
    loop {
        // Triggers win over completions so that a trigger queued before a
        // response lands is judged against the in-flight state.
        tokio::select! {
            biased;
            Some(()) = input.view_loaded.recv() => loader.trigger(Trigger::ViewLoaded),
            Some(()) = input.refresh.recv() => loader.trigger(Trigger::Refresh),
            Some(()) = input.load_more.recv() => loader.trigger(Trigger::LoadMore),
            Some(item) = input.insert.recv() => {
                if !loader.push(item) {
                    tracing::debug!("local item already listed");
                }
            }
            Some(finished) = done.recv() => loader.complete(finished),
            else => break,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use crate::source::{FeedGenerator, FeedItem, MockOptions, MockSource};

    fn options(max_pages: u32, failure_rate: f64) -> MockOptions {
        MockOptions {
            latency: Duration::ZERO,
            max_pages,
            failure_rate,
            seed: Some(1),
        }
    }

    fn bind<S: DataSource>(
        source: S,
        page_size: u32,
    ) -> (ListTriggers<S::Item>, ListOutput<S::Item>) {
        let (triggers, input) = ListInput::pair();
        let output =
            ListViewModel::new(Arc::new(source), page_size, Handle::current()).transform(input);
        (triggers, output)
    }

    /// Feed source whose fetches block until the test releases them.
    struct GatedSource {
        inner: MockSource<FeedGenerator>,
        gate: Mutex<std::sync::mpsc::Receiver<()>>,
        calls: Arc<AtomicUsize>,
    }

    impl DataSource for GatedSource {
        type Item = FeedItem;

        fn name(&self) -> &str {
            "gated"
        }

        fn fetch_page(&self, page: u32, limit: u32) -> Result<Page<FeedItem>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let _ = self.gate.lock().unwrap().recv();
            self.inner.fetch_page(page, limit)
        }
    }

    #[tokio::test]
    async fn initial_load_publishes_first_page() {
        let source = MockSource::new("feed", FeedGenerator, options(5, 0.0));
        let (triggers, mut output) = bind(source, 10);

        triggers.view_loaded();
        output.items.changed().await.unwrap();

        assert_eq!(output.items.borrow().len(), 10);
        assert!(!*output.is_loading.borrow());
        assert!(*output.has_more.borrow());
    }

    #[tokio::test]
    async fn load_more_until_source_runs_dry() {
        let source = MockSource::new("feed", FeedGenerator, options(5, 0.0));
        let (triggers, mut output) = bind(source, 10);

        triggers.view_loaded();
        output.items.changed().await.unwrap();

        for _ in 0..4 {
            triggers.load_more();
            output.items.changed().await.unwrap();
        }

        let items = output.items.borrow_and_update().clone();
        assert_eq!(items.len(), 50);
        assert_eq!(items[49].id, "feed_49");
        assert!(!*output.has_more.borrow());
    }

    #[tokio::test]
    async fn failure_is_reported_and_items_kept() {
        let source = MockSource::new("feed", FeedGenerator, options(5, 1.0));
        let (triggers, mut output) = bind(source, 10);

        triggers.view_loaded();
        let err = output.errors.recv().await.unwrap();

        assert!(matches!(err, FetchError::Failed { .. }));
        assert!(output.items.borrow().is_empty());
        assert!(!*output.is_loading.borrow());
    }

    #[tokio::test]
    async fn refresh_while_loading_more_is_ignored() {
        let (release, gate) = std::sync::mpsc::channel();
        let calls = Arc::new(AtomicUsize::new(0));
        let source = GatedSource {
            inner: MockSource::new("feed", FeedGenerator, options(5, 0.0)),
            gate: Mutex::new(gate),
            calls: Arc::clone(&calls),
        };
        let (triggers, mut output) = bind(source, 10);

        triggers.view_loaded();
        release.send(()).unwrap();
        output.items.changed().await.unwrap();

        triggers.load_more();
        output.is_loading.wait_for(|loading| *loading).await.unwrap();
        triggers.refresh();
        release.send(()).unwrap();
        output.items.changed().await.unwrap();

        assert_eq!(output.items.borrow().len(), 20, "appended, not replaced");
        assert_eq!(calls.load(Ordering::SeqCst), 2, "refresh never fetched");
    }

    #[tokio::test]
    async fn refresh_replaces_accumulated_pages() {
        let source = MockSource::new("feed", FeedGenerator, options(5, 0.0));
        let (triggers, mut output) = bind(source, 10);

        triggers.view_loaded();
        output.items.changed().await.unwrap();
        triggers.load_more();
        output.items.changed().await.unwrap();
        assert_eq!(output.items.borrow_and_update().len(), 20);

        triggers.refresh();
        output.items.changed().await.unwrap();
        let items = output.items.borrow_and_update().clone();
        assert_eq!(items.len(), 10);
        assert_eq!(items[0].id, "feed_0");
    }

    #[tokio::test]
    async fn inserted_item_lands_on_top_and_survives_refresh() {
        let source = MockSource::new("feed", FeedGenerator, options(5, 0.0));
        let (triggers, mut output) = bind(source, 10);

        triggers.view_loaded();
        output.items.changed().await.unwrap();

        let mut mine = output.items.borrow_and_update()[3].clone();
        mine.id = "feed_local".into();
        triggers.insert(mine);
        output.items.changed().await.unwrap();
        assert_eq!(output.items.borrow_and_update()[0].id, "feed_local");

        triggers.refresh();
        output.items.changed().await.unwrap();
        let items = output.items.borrow_and_update().clone();
        assert_eq!(items.len(), 11);
        assert_eq!(items[0].id, "feed_local");
        assert_eq!(items[1].id, "feed_0");
    }

    #[tokio::test]
    async fn dropping_output_stops_the_driver() {
        let source = MockSource::new("feed", FeedGenerator, options(5, 0.0));
        let (triggers, output) = bind(source, 10);
        assert!(!triggers.is_closed());

        drop(output);
        tokio::time::timeout(Duration::from_secs(1), async {
            while !triggers.is_closed() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("driver should release its inputs after teardown");
    }
}
