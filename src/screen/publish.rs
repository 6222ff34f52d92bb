//! Publish form, shown as a modal from the tab bar's center slot.

use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    Frame,
};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};

use super::{Screen, ScreenEvent};
use crate::error::FetchError;
use crate::source::{NoteItem, Publisher};
use crate::ui;
use crate::viewmodel::{
    Bindings, PublishInput, PublishOutput, PublishTriggers, PublishViewModel, ViewModel,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Content,
}

pub struct PublishScreen<P> {
    publisher: Arc<P>,
    title: String,
    content: String,
    focus: Field,
    bound: Option<BoundPublish>,
}

struct BoundPublish {
    triggers: PublishTriggers,
    is_publish_enabled: watch::Receiver<bool>,
    is_publishing: watch::Receiver<bool>,
    publish_result: mpsc::UnboundedReceiver<Result<NoteItem, FetchError>>,
    _bindings: Bindings,
}

impl<P: Publisher> PublishScreen<P> {
    pub fn new(publisher: Arc<P>) -> Self {
        Self {
            publisher,
            title: String::new(),
            content: String::new(),
            focus: Field::Title,
            bound: None,
        }
    }

    #[cfg(test)]
    pub fn focus(&self) -> Field {
        self.focus
    }

    pub fn is_publish_enabled(&self) -> bool {
        self.bound
            .as_ref()
            .is_some_and(|b| *b.is_publish_enabled.borrow())
    }

    fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            Field::Title => &mut self.title,
            Field::Content => &mut self.content,
        }
    }

    /// Push the focused field's full text to the view-model.
    fn send_focused(&self) {
        let Some(bound) = &self.bound else {
            return;
        };
        match self.focus {
            Field::Title => bound.triggers.title(self.title.clone()),
            Field::Content => bound.triggers.content(self.content.clone()),
        }
    }
}

impl<P: Publisher> Screen for PublishScreen<P> {
    fn title(&self) -> &str {
        "New note"
    }

    fn setup_ui(&mut self, runtime: &Handle) {
        if self.bound.is_some() {
            return;
        }
        let (triggers, input) = PublishInput::pair();
        let PublishOutput {
            is_publish_enabled,
            is_publishing,
            publish_result,
            bindings,
        } = PublishViewModel::new(Arc::clone(&self.publisher), runtime.clone()).transform(input);

        self.bound = Some(BoundPublish {
            triggers,
            is_publish_enabled,
            is_publishing,
            publish_result,
            _bindings: bindings,
        });
    }

    fn bind_state(&mut self) -> Vec<ScreenEvent> {
        let Some(bound) = self.bound.as_mut() else {
            return Vec::new();
        };
        let mut events = Vec::new();
        while let Ok(result) = bound.publish_result.try_recv() {
            match result {
                Ok(note) => {
                    events.push(ScreenEvent::Published(note));
                    events.push(ScreenEvent::Close);
                }
                Err(e) => events.push(ScreenEvent::Status(format!("publish: {e}"))),
            }
        }
        events
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) {
        let [title, content, button] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .areas(area);
        ui::draw_text_input(frame, title, "Title", &self.title, self.focus == Field::Title);
        ui::draw_text_input(
            frame,
            content,
            "Content",
            &self.content,
            self.focus == Field::Content,
        );
        let publishing = self
            .bound
            .as_ref()
            .is_some_and(|b| *b.is_publishing.borrow());
        ui::draw_publish_button(frame, button, self.is_publish_enabled(), publishing);
    }

    fn handle_key(&mut self, key: KeyEvent) -> Option<ScreenEvent> {
        match key.code {
            KeyCode::Esc => return Some(ScreenEvent::Close),
            KeyCode::Tab | KeyCode::BackTab => {
                self.focus = match self.focus {
                    Field::Title => Field::Content,
                    Field::Content => Field::Title,
                };
            }
            KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                if let Some(bound) = &self.bound {
                    bound.triggers.publish_tap();
                }
            }
            KeyCode::Enter if self.focus == Field::Content => {
                self.content.push('\n');
                self.send_focused();
            }
            KeyCode::Backspace => {
                self.focused_mut().pop();
                self.send_focused();
            }
            KeyCode::Char(c) => {
                self.focused_mut().push(c);
                self.send_focused();
            }
            _ => {}
        }
        None
    }

    fn captures_text(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    use crate::source::{MockOptions, MockPublisher};

    fn screen() -> PublishScreen<MockPublisher> {
        PublishScreen::new(Arc::new(MockPublisher::new(MockOptions {
            latency: Duration::ZERO,
            max_pages: 1,
            failure_rate: 0.0,
            seed: Some(3),
        })))
    }

    fn type_text(screen: &mut PublishScreen<MockPublisher>, text: &str) {
        for c in text.chars() {
            screen.handle_key(KeyEvent::from(KeyCode::Char(c)));
        }
    }

    /// Drain events until `done` holds; returns everything drained.
    fn wait_for(
        screen: &mut PublishScreen<MockPublisher>,
        done: impl Fn(&[ScreenEvent], &PublishScreen<MockPublisher>) -> bool,
    ) -> Vec<ScreenEvent> {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut events = Vec::new();
        loop {
            events.extend(screen.bind_state());
            if done(&events, screen) {
                return events;
            }
            assert!(Instant::now() < deadline, "timed out waiting for publish state");
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn tab_switches_focus() {
        let mut screen = screen();
        assert_eq!(screen.focus(), Field::Title);
        screen.handle_key(KeyEvent::from(KeyCode::Tab));
        assert_eq!(screen.focus(), Field::Content);
        screen.handle_key(KeyEvent::from(KeyCode::BackTab));
        assert_eq!(screen.focus(), Field::Title);
    }

    #[test]
    fn filled_form_publishes_and_closes() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let mut screen = screen();
        screen.setup_ui(runtime.handle());
        assert!(!screen.is_publish_enabled());

        type_text(&mut screen, "Trip");
        screen.handle_key(KeyEvent::from(KeyCode::Tab));
        type_text(&mut screen, "Two days by the lake");
        wait_for(&mut screen, |_, s| s.is_publish_enabled());

        screen.handle_key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL));
        let events = wait_for(&mut screen, |events, _| events.contains(&ScreenEvent::Close));

        match &events[0] {
            ScreenEvent::Published(note) => assert_eq!(note.title, "Trip"),
            other => panic!("expected a published note, got {other:?}"),
        }
        assert_eq!(events[1], ScreenEvent::Close);
    }

    #[test]
    fn clearing_a_field_disables_publish() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let mut screen = screen();
        screen.setup_ui(runtime.handle());

        type_text(&mut screen, "T");
        screen.handle_key(KeyEvent::from(KeyCode::Tab));
        type_text(&mut screen, "c");
        wait_for(&mut screen, |_, s| s.is_publish_enabled());

        screen.handle_key(KeyEvent::from(KeyCode::Backspace));
        wait_for(&mut screen, |_, s| !s.is_publish_enabled());
    }
}
