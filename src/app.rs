//! Application shell: the four tabs, the modal on top of them and the status
//! line.
//!
//! Tab screens are built up front but stay unbound until first shown.  At
//! most one modal (publish form or chat) is open; while it is, it receives
//! every key.

use std::sync::Arc;

use crossterm::event::KeyEvent;
use tokio::runtime::Handle;

use crate::config::Config;
use crate::screen::{ChatScreen, ListScreen, ProfileScreen, PublishScreen, Screen, ScreenEvent};
use crate::source::{
    mock_profile, mock_profile_options, ChatGenerator, FeedGenerator, MessageGenerator,
    MockOptions, MockPublisher, MockSource, NoteGenerator, ProductGenerator,
};
use crate::tabs::{Tab, TabBar, TabEvent};

pub enum Modal {
    Publish(PublishScreen<MockPublisher>),
    Chat(ChatScreen<MockSource<ChatGenerator>>),
}

impl Modal {
    fn screen_mut(&mut self) -> &mut dyn Screen {
        match self {
            Modal::Publish(screen) => screen,
            Modal::Chat(screen) => screen,
        }
    }
}

pub struct App {
    runtime: Handle,
    tabs: TabBar,
    home: ListScreen<MockSource<FeedGenerator>>,
    market: ListScreen<MockSource<ProductGenerator>>,
    messages: ListScreen<MockSource<MessageGenerator>>,
    profile: ProfileScreen<MockSource<NoteGenerator>>,
    publisher: Arc<MockPublisher>,
    /// Options for chat sources, which are created per conversation.
    chat_options: MockOptions,
    page_size: u32,
    modal: Option<Modal>,
    /// Whether the user has requested to quit.
    pub quit: bool,
    /// Last status message.
    status: String,
}

impl App {
    pub fn new(config: &Config, runtime: Handle) -> Self {
        let options = config.mock_options();
        let page_size = config.page_size;
        let lookahead = config.lookahead;

        let home = ListScreen::new(
            "Home",
            Arc::new(MockSource::new("feed", FeedGenerator, options.clone())),
            page_size,
            lookahead,
            |item| ScreenEvent::Status(format!("{} by @{}", item.title, item.username)),
        );
        let market = ListScreen::new(
            "Market",
            Arc::new(MockSource::new("market", ProductGenerator, options.clone())),
            page_size,
            lookahead,
            |item| ScreenEvent::Status(format!("{} at {:.2}", item.name, item.price)),
        );
        let messages = ListScreen::new(
            "Messages",
            Arc::new(MockSource::new("messages", MessageGenerator, options.clone())),
            page_size,
            lookahead,
            |item| ScreenEvent::OpenChat {
                peer: item.sender_name.clone(),
            },
        );
        let notes = ListScreen::new(
            "Notes",
            Arc::new(MockSource::new("notes", NoteGenerator, options.clone())),
            page_size,
            lookahead,
            |item| ScreenEvent::Status(format!("{} ({} likes)", item.title, item.likes)),
        );

        let mut app = Self {
            runtime,
            tabs: TabBar::default(),
            home,
            market,
            messages,
            profile: ProfileScreen::new(mock_profile(), mock_profile_options(), notes),
            publisher: Arc::new(MockPublisher::new(config.publish_options())),
            chat_options: options,
            page_size,
            modal: None,
            quit: false,
            status: "Starting…".into(),
        };
        app.show_current();
        app
    }

    pub fn tabs(&self) -> &TabBar {
        &self.tabs
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// The selected tab's screen.
    pub fn screen_mut(&mut self) -> &mut dyn Screen {
        match self.tabs.selected() {
            Tab::Home => &mut self.home,
            Tab::Market => &mut self.market,
            Tab::Messages => &mut self.messages,
            Tab::Profile => &mut self.profile,
        }
    }

    pub fn modal_mut(&mut self) -> Option<&mut dyn Screen> {
        self.modal.as_mut().map(Modal::screen_mut)
    }

    /// Whatever receives keys: the modal if one is open, else the tab.
    fn focused_mut(&mut self) -> &mut dyn Screen {
        match self.modal {
            Some(ref mut modal) => modal.screen_mut(),
            None => self.screen_mut(),
        }
    }

    pub fn captures_text(&mut self) -> bool {
        self.focused_mut().captures_text()
    }

    // -- tabs ----------------------------------------------------------------

    /// Bind the selected tab if this is its first showing.
    fn show_current(&mut self) {
        let runtime = self.runtime.clone();
        let screen = self.screen_mut();
        screen.setup_ui(&runtime);
        tracing::debug!(tab = screen.title(), "tab shown");
    }

    pub fn next_tab(&mut self) {
        self.tabs.next();
        self.show_current();
    }

    pub fn previous_tab(&mut self) {
        self.tabs.previous();
        self.show_current();
    }

    pub fn tap_slot(&mut self, slot: usize) {
        match self.tabs.tap(slot) {
            Some(TabEvent::Selected(_)) => self.show_current(),
            Some(TabEvent::PublishRequested) => self.open_publish(),
            None => {}
        }
    }

    // -- modals --------------------------------------------------------------

    pub fn open_publish(&mut self) {
        let mut screen = PublishScreen::new(Arc::clone(&self.publisher));
        screen.setup_ui(&self.runtime);
        self.modal = Some(Modal::Publish(screen));
    }

    pub fn open_chat(&mut self, peer: &str) {
        let source = MockSource::new(
            "chat",
            ChatGenerator {
                peer: peer.to_string(),
            },
            self.chat_options.clone(),
        );
        let mut screen = ChatScreen::new(peer, Arc::new(source), self.page_size);
        screen.setup_ui(&self.runtime);
        tracing::info!(peer, "chat opened");
        self.modal = Some(Modal::Chat(screen));
    }

    // -- per tick ------------------------------------------------------------

    /// Drain the visible screens' outputs and act on what they report.
    pub fn bind_state(&mut self) {
        let mut events = self.screen_mut().bind_state();
        if let Some(modal) = self.modal_mut() {
            events.extend(modal.bind_state());
        }
        for event in events {
            self.apply(event);
        }
    }

    fn apply(&mut self, event: ScreenEvent) {
        match event {
            ScreenEvent::Status(status) => self.status = status,
            ScreenEvent::OpenChat { peer } => self.open_chat(&peer),
            ScreenEvent::Published(note) => {
                tracing::info!(id = %note.id, "note published");
                self.status = format!("Published \"{}\"", note.title);
                let runtime = self.runtime.clone();
                self.profile.add_note(&runtime, note);
            }
            // Dropping the screen drops its bindings and stops its view-model.
            ScreenEvent::Close => self.modal = None,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if let Some(event) = self.focused_mut().handle_key(key) {
            self.apply(event);
        }
    }
}
