//! Generic paged list screen (home feed, market, messages, notes).

use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{layout::Rect, Frame};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};

use super::{Screen, ScreenEvent};
use crate::binding::ListBinding;
use crate::error::FetchError;
use crate::source::DataSource;
use crate::ui::{self, ListRow};
use crate::viewmodel::{Bindings, ListInput, ListOutput, ListTriggers, ListViewModel, ViewModel};

pub struct ListScreen<S: DataSource> {
    title: &'static str,
    source: Arc<S>,
    page_size: u32,
    lookahead: usize,
    /// Maps an activated row to what the app should do about it.
    on_select: fn(&S::Item) -> ScreenEvent,
    bound: Option<BoundList<S::Item>>,
}

struct BoundList<T> {
    triggers: ListTriggers<T>,
    binding: ListBinding<T>,
    selected: mpsc::UnboundedReceiver<T>,
    is_loading: watch::Receiver<bool>,
    has_more: watch::Receiver<bool>,
    errors: mpsc::UnboundedReceiver<FetchError>,
    _bindings: Bindings,
}

impl<T: Clone> BoundList<T> {
    fn load_more_if_near_end(&self, lookahead: usize) {
        if self.binding.is_near_end(lookahead)
            && *self.has_more.borrow()
            && !*self.is_loading.borrow()
        {
            self.triggers.load_more();
        }
    }
}

impl<S: DataSource> ListScreen<S>
where
    S::Item: ListRow,
{
    pub fn new(
        title: &'static str,
        source: Arc<S>,
        page_size: u32,
        lookahead: usize,
        on_select: fn(&S::Item) -> ScreenEvent,
    ) -> Self {
        Self {
            title,
            source,
            page_size,
            lookahead,
            on_select,
            bound: None,
        }
    }

    #[cfg(test)]
    pub fn is_bound(&self) -> bool {
        self.bound.is_some()
    }

    #[cfg(test)]
    pub fn rows(&self) -> &[S::Item] {
        match &self.bound {
            Some(bound) => bound.binding.rows(),
            None => &[],
        }
    }

    /// Put an item created on this device at the top of the list.  It stays
    /// there across refreshes.  Ignored until the screen is bound.
    pub fn insert(&self, item: S::Item) {
        match &self.bound {
            Some(bound) => bound.triggers.insert(item),
            None => tracing::warn!(screen = self.title, "insert before bind dropped"),
        }
    }
}

impl<S: DataSource> Screen for ListScreen<S>
where
    S::Item: ListRow,
{
    fn title(&self) -> &str {
        self.title
    }

    fn setup_ui(&mut self, runtime: &Handle) {
        if self.bound.is_some() {
            return;
        }
        let (triggers, input) = ListInput::pair();
        let ListOutput {
            items,
            is_loading,
            has_more,
            errors,
            bindings,
        } = ListViewModel::new(Arc::clone(&self.source), self.page_size, runtime.clone())
            .transform(input);
        let (binding, selected) = ListBinding::new(items);

        triggers.view_loaded();
        tracing::debug!(screen = self.title, "screen bound");
        self.bound = Some(BoundList {
            triggers,
            binding,
            selected,
            is_loading,
            has_more,
            errors,
            _bindings: bindings,
        });
    }

    fn bind_state(&mut self) -> Vec<ScreenEvent> {
        let Some(bound) = self.bound.as_mut() else {
            return Vec::new();
        };
        let mut events = Vec::new();

        if bound.binding.sync() {
            let count = bound.binding.rows().len();
            events.push(ScreenEvent::Status(format!("{}: {count} items", self.title)));
            // A short page may not fill the viewport; keep paging until it does.
            bound.load_more_if_near_end(self.lookahead);
        }
        while let Ok(e) = bound.errors.try_recv() {
            events.push(ScreenEvent::Status(format!("{}: {e}", self.title)));
        }
        while let Ok(item) = bound.selected.try_recv() {
            events.push((self.on_select)(&item));
        }
        events
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) {
        match self.bound.as_mut() {
            Some(bound) => {
                let footer = ui::list_footer(*bound.is_loading.borrow(), *bound.has_more.borrow());
                ui::draw_list(frame, area, self.title, &mut bound.binding, footer);
            }
            None => ui::draw_placeholder(frame, area, self.title),
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Option<ScreenEvent> {
        let bound = self.bound.as_mut()?;
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => bound.binding.select_next(),
            KeyCode::Up | KeyCode::Char('k') => bound.binding.select_previous(),
            KeyCode::Home | KeyCode::Char('g') => bound.binding.select_first(),
            KeyCode::End | KeyCode::Char('G') => bound.binding.select_last(),
            KeyCode::Enter => {
                bound.binding.activate();
                return None;
            }
            KeyCode::Char('r') => {
                bound.triggers.refresh();
                return Some(ScreenEvent::Status(format!("{}: refreshing…", self.title)));
            }
            _ => return None,
        }
        bound.load_more_if_near_end(self.lookahead);
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    use crate::source::{FeedGenerator, MockOptions, MockSource};

    fn screen(max_pages: u32) -> ListScreen<MockSource<FeedGenerator>> {
        let source = MockSource::new(
            "feed",
            FeedGenerator,
            MockOptions {
                latency: Duration::ZERO,
                max_pages,
                failure_rate: 0.0,
                seed: Some(5),
            },
        );
        ListScreen::new("Home", Arc::new(source), 10, 1, |item| {
            ScreenEvent::Status(format!("opened {}", item.id))
        })
    }

    /// Call `bind_state` until `done` holds, collecting every event.
    fn pump<S: DataSource>(
        screen: &mut ListScreen<S>,
        done: impl Fn(&ListScreen<S>) -> bool,
    ) -> Vec<ScreenEvent>
    where
        S::Item: ListRow,
    {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut events = Vec::new();
        while !done(screen) {
            assert!(Instant::now() < deadline, "timed out waiting for screen state");
            events.extend(screen.bind_state());
            std::thread::sleep(Duration::from_millis(5));
        }
        events.extend(screen.bind_state());
        events
    }

    #[test]
    fn unbound_screen_is_inert() {
        let mut screen = screen(5);
        assert!(!screen.is_bound());
        assert!(screen.bind_state().is_empty());
        assert!(screen.handle_key(KeyEvent::from(KeyCode::Enter)).is_none());
    }

    #[test]
    fn setup_ui_loads_first_page() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let mut screen = screen(1);
        screen.setup_ui(runtime.handle());
        screen.setup_ui(runtime.handle());

        let events = pump(&mut screen, |s| !s.rows().is_empty());
        assert_eq!(screen.rows().len(), 10);
        assert!(events.contains(&ScreenEvent::Status("Home: 10 items".into())));
    }

    #[test]
    fn enter_reports_selected_row() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let mut screen = screen(1);
        screen.setup_ui(runtime.handle());
        pump(&mut screen, |s| !s.rows().is_empty());

        screen.handle_key(KeyEvent::from(KeyCode::Down));
        screen.handle_key(KeyEvent::from(KeyCode::Down));
        screen.handle_key(KeyEvent::from(KeyCode::Enter));

        let events = screen.bind_state();
        assert_eq!(events, vec![ScreenEvent::Status("opened feed_1".into())]);
    }

    #[test]
    fn scrolling_to_the_end_loads_the_next_page() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let mut screen = screen(3);
        screen.setup_ui(runtime.handle());
        pump(&mut screen, |s| !s.rows().is_empty());

        screen.handle_key(KeyEvent::from(KeyCode::End));
        pump(&mut screen, |s| s.rows().len() >= 20);
        assert_eq!(screen.rows()[10].id, "feed_10");
    }

    #[test]
    fn inserted_item_is_listed_first() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let mut screen = screen(1);
        screen.setup_ui(runtime.handle());
        pump(&mut screen, |s| !s.rows().is_empty());

        let mut item = screen.rows()[3].clone();
        item.id = "feed_mine".into();
        screen.insert(item);
        let events = pump(&mut screen, |s| s.rows().len() == 11);

        assert_eq!(screen.rows()[0].id, "feed_mine");
        assert!(events.contains(&ScreenEvent::Status("Home: 11 items".into())));
    }
}
