//! Chat with one peer, shown as a modal over the messages tab.

use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    Frame,
};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};

use super::{Screen, ScreenEvent};
use crate::binding::ListBinding;
use crate::error::FetchError;
use crate::source::{ChatMessage, DataSource};
use crate::ui;
use crate::viewmodel::{Bindings, ChatInput, ChatOutput, ChatTriggers, ChatViewModel, ViewModel};

pub struct ChatScreen<S> {
    title: String,
    source: Arc<S>,
    page_size: u32,
    /// Text typed but not yet sent.
    draft: String,
    /// Messages sent but not yet echoed back by the view-model.
    pending: usize,
    bound: Option<BoundChat>,
}

struct BoundChat {
    triggers: ChatTriggers,
    binding: ListBinding<ChatMessage>,
    // Chat rows are not selectable targets; the stream is kept open and ignored.
    _selected: mpsc::UnboundedReceiver<ChatMessage>,
    is_loading: watch::Receiver<bool>,
    sent: mpsc::UnboundedReceiver<ChatMessage>,
    errors: mpsc::UnboundedReceiver<FetchError>,
    _bindings: Bindings,
}

impl<S: DataSource<Item = ChatMessage>> ChatScreen<S> {
    pub fn new(peer: &str, source: Arc<S>, page_size: u32) -> Self {
        Self {
            title: format!("Chat with {peer}"),
            source,
            page_size,
            draft: String::new(),
            pending: 0,
            bound: None,
        }
    }

    #[cfg(test)]
    pub fn draft(&self) -> &str {
        &self.draft
    }

    #[cfg(test)]
    pub fn messages(&self) -> &[ChatMessage] {
        match &self.bound {
            Some(bound) => bound.binding.rows(),
            None => &[],
        }
    }
}

impl<S: DataSource<Item = ChatMessage>> Screen for ChatScreen<S> {
    fn title(&self) -> &str {
        &self.title
    }

    fn setup_ui(&mut self, runtime: &Handle) {
        if self.bound.is_some() {
            return;
        }
        let (triggers, input) = ChatInput::pair();
        let ChatOutput {
            messages,
            is_loading,
            sent,
            errors,
            bindings,
        } = ChatViewModel::new(Arc::clone(&self.source), self.page_size, runtime.clone())
            .transform(input);
        let (binding, selected) = ListBinding::new(messages);

        triggers.view_loaded();
        self.bound = Some(BoundChat {
            triggers,
            binding,
            _selected: selected,
            is_loading,
            sent,
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
            // Newest message at the bottom stays in view.
            bound.binding.select_last();
        }
        while bound.sent.try_recv().is_ok() {
            self.pending = self.pending.saturating_sub(1);
        }
        while let Ok(e) = bound.errors.try_recv() {
            events.push(ScreenEvent::Status(format!("{}: {e}", self.title)));
        }
        events
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) {
        let [history, input] =
            Layout::vertical([Constraint::Min(1), Constraint::Length(3)]).areas(area);
        match self.bound.as_mut() {
            Some(bound) => {
                let footer = if *bound.is_loading.borrow() {
                    " loading… "
                } else if self.pending > 0 {
                    " sending… "
                } else {
                    " PgUp: earlier  Enter: send  Esc: close "
                };
                ui::draw_list(frame, history, &self.title, &mut bound.binding, footer);
            }
            None => ui::draw_placeholder(frame, history, &self.title),
        }
        ui::draw_text_input(frame, input, "Message", &self.draft, true);
    }

    fn handle_key(&mut self, key: KeyEvent) -> Option<ScreenEvent> {
        if key.code == KeyCode::Esc {
            return Some(ScreenEvent::Close);
        }
        let bound = self.bound.as_mut()?;
        match key.code {
            KeyCode::Enter => {
                let text = std::mem::take(&mut self.draft);
                // Blank text is dropped by the view-model and never echoed.
                if !text.trim().is_empty() {
                    self.pending += 1;
                }
                bound.triggers.send_message(text);
            }
            KeyCode::Backspace => {
                self.draft.pop();
            }
            KeyCode::Char(c) => self.draft.push(c),
            KeyCode::Up => bound.binding.select_previous(),
            KeyCode::Down => bound.binding.select_next(),
            KeyCode::PageUp => bound.triggers.load_earlier(),
            _ => {}
        }
        None
    }

    fn captures_text(&self) -> bool {
        true
    }
}
