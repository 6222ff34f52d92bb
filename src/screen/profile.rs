//! Profile: a fixed header above the options menu.
//!
//! "My posts" swaps the menu for the user's paged notes; Backspace or Left
//! goes back.  The notes bind the first time they are opened, or when a note
//! is published, whichever comes first.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    Frame,
};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};

use super::{ListScreen, Screen, ScreenEvent};
use crate::binding::ListBinding;
use crate::source::{DataSource, NoteItem, ProfileOption, ProfileOptionKind, UserProfile};
use crate::ui;

pub struct ProfileScreen<S: DataSource<Item = NoteItem>> {
    profile: UserProfile,
    options: ListBinding<ProfileOption>,
    // The menu is fixed; the sender only keeps the stream open.
    _menu: watch::Sender<Vec<ProfileOption>>,
    // Choices are handled where Enter is pressed; the stream is ignored.
    _chosen: mpsc::UnboundedReceiver<ProfileOption>,
    notes: ListScreen<S>,
    runtime: Option<Handle>,
    showing_posts: bool,
}

impl<S: DataSource<Item = NoteItem>> ProfileScreen<S> {
    pub fn new(profile: UserProfile, options: Vec<ProfileOption>, notes: ListScreen<S>) -> Self {
        let (menu, rx) = watch::channel(options);
        let (mut options, chosen) = ListBinding::new(rx);
        options.select_first();
        Self {
            profile,
            options,
            _menu: menu,
            _chosen: chosen,
            notes,
            runtime: None,
            showing_posts: false,
        }
    }

    #[cfg(test)]
    pub fn notes(&self) -> &ListScreen<S> {
        &self.notes
    }

    /// List a note published from this device at the top of "My posts".
    pub fn add_note(&mut self, runtime: &Handle, note: NoteItem) {
        self.notes.setup_ui(runtime);
        self.notes.insert(note);
    }

    fn choose(&mut self, option: ProfileOption) -> ScreenEvent {
        tracing::debug!(option = %option.title, "profile option chosen");
        match option.kind {
            ProfileOptionKind::MyPosts => {
                if let Some(runtime) = &self.runtime {
                    self.notes.setup_ui(runtime);
                }
                self.showing_posts = true;
                ScreenEvent::Status(option.title)
            }
            _ if option.subtitle.is_empty() => {
                ScreenEvent::Status(format!("{}: coming soon", option.title))
            }
            _ => ScreenEvent::Status(format!("{}: {}", option.title, option.subtitle)),
        }
    }
}

impl<S: DataSource<Item = NoteItem>> Screen for ProfileScreen<S> {
    fn title(&self) -> &str {
        "Me"
    }

    fn setup_ui(&mut self, runtime: &Handle) {
        self.runtime = Some(runtime.clone());
    }

    fn bind_state(&mut self) -> Vec<ScreenEvent> {
        // Hidden notes still sync so they are current when opened.
        let events = self.notes.bind_state();
        if self.showing_posts {
            events
        } else {
            Vec::new()
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) {
        let [header, body] =
            Layout::vertical([Constraint::Length(4), Constraint::Min(1)]).areas(area);
        ui::draw_profile_header(frame, header, &self.profile);
        if self.showing_posts {
            self.notes.draw(frame, body);
        } else {
            ui::draw_list(frame, body, "Options", &mut self.options, " Enter: open ");
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Option<ScreenEvent> {
        if self.showing_posts {
            if matches!(key.code, KeyCode::Backspace | KeyCode::Left | KeyCode::Char('h')) {
                self.showing_posts = false;
                return None;
            }
            return self.notes.handle_key(key);
        }
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => self.options.select_next(),
            KeyCode::Up | KeyCode::Char('k') => self.options.select_previous(),
            KeyCode::Home | KeyCode::Char('g') => self.options.select_first(),
            KeyCode::End | KeyCode::Char('G') => self.options.select_last(),
            KeyCode::Enter => {
                let option = self.options.activate()?;
                return Some(self.choose(option));
            }
            _ => {}
        }
        None
    }
}
