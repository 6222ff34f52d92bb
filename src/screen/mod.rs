//! Screens.
//!
//! A screen owns one view-model output and draws it.  Every screen implements
//! [`Screen`]:
//!
//! * [`setup_ui`](Screen::setup_ui) builds the view-model, calls `transform`
//!   once and fires the view-loaded trigger.  It runs the first time the
//!   screen is shown; later calls do nothing.
//! * [`bind_state`](Screen::bind_state) drains the output streams once per
//!   tick and reports anything the app shell has to act on.
//!
//! Dropping a screen drops its [`Bindings`](crate::viewmodel::Bindings),
//! which stops the view-model.

mod chat;
mod list;
mod profile;
mod publish;

pub use chat::ChatScreen;
pub use list::ListScreen;
pub use profile::ProfileScreen;
pub use publish::PublishScreen;

use crossterm::event::KeyEvent;
use ratatui::{layout::Rect, Frame};
use tokio::runtime::Handle;

use crate::source::NoteItem;

/// Something a screen asks the app shell to do.
#[derive(Debug, Clone, PartialEq)]
pub enum ScreenEvent {
    /// Show a line in the status bar.
    Status(String),
    /// Open the chat with `peer` on top of the current tab.
    OpenChat { peer: String },
    /// A note went out.
    Published(NoteItem),
    /// Close this (modal) screen.
    Close,
}

pub trait Screen {
    fn title(&self) -> &str;

    fn setup_ui(&mut self, runtime: &Handle);

    fn bind_state(&mut self) -> Vec<ScreenEvent>;

    fn draw(&mut self, frame: &mut Frame, area: Rect);

    fn handle_key(&mut self, key: KeyEvent) -> Option<ScreenEvent>;

    /// Whether printable keys are text input rather than shortcuts.
    fn captures_text(&self) -> bool {
        false
    }
}
