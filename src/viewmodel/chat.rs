//! Chat view-model: a paged conversation history plus outgoing messages.
//!
//! History reads oldest first.  Loading earlier messages puts the older page
//! above what is listed; sent messages go at the bottom.

use std::sync::Arc;

use chrono::Utc;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};

use super::list::{Done, LoaderStreams, PageLoader};
use super::{Bindings, ViewModel};
use crate::error::FetchError;
use crate::paging::{Order, Trigger};
use crate::source::{ChatMessage, DataSource};

/// Sender id used for messages typed by the local user.
pub const CURRENT_USER: &str = "current";

pub struct ChatInput {
    pub view_loaded: mpsc::UnboundedReceiver<()>,
    pub load_earlier: mpsc::UnboundedReceiver<()>,
    /// Text submitted from the input field.
    pub send_message: mpsc::UnboundedReceiver<String>,
}

#[derive(Clone)]
pub struct ChatTriggers {
    view_loaded: mpsc::UnboundedSender<()>,
    load_earlier: mpsc::UnboundedSender<()>,
    send_message: mpsc::UnboundedSender<String>,
}

impl ChatInput {
    pub fn pair() -> (ChatTriggers, ChatInput) {
        let (view_loaded_tx, view_loaded) = mpsc::unbounded_channel();
        let (load_earlier_tx, load_earlier) = mpsc::unbounded_channel();
        let (send_message_tx, send_message) = mpsc::unbounded_channel();
        (
            ChatTriggers {
                view_loaded: view_loaded_tx,
                load_earlier: load_earlier_tx,
                send_message: send_message_tx,
            },
            ChatInput {
                view_loaded,
                load_earlier,
                send_message,
            },
        )
    }
}

impl ChatTriggers {
    pub fn view_loaded(&self) {
        let _ = self.view_loaded.send(());
    }

    pub fn load_earlier(&self) {
        let _ = self.load_earlier.send(());
    }

    pub fn send_message(&self, text: impl Into<String>) {
        let _ = self.send_message.send(text.into());
    }
}

pub struct ChatOutput {
    pub messages: watch::Receiver<Vec<ChatMessage>>,
    pub is_loading: watch::Receiver<bool>,
    /// Messages accepted from `send_message`, in order.
    pub sent: mpsc::UnboundedReceiver<ChatMessage>,
    pub errors: mpsc::UnboundedReceiver<FetchError>,
    pub bindings: Bindings,
}

pub struct ChatViewModel<S> {
    source: Arc<S>,
    page_size: u32,
    runtime: Handle,
}

impl<S> ChatViewModel<S>
where
    S: DataSource<Item = ChatMessage>,
{
    pub fn new(source: Arc<S>, page_size: u32, runtime: Handle) -> Self {
        Self {
            source,
            page_size,
            runtime,
        }
    }
}

impl<S> ViewModel for ChatViewModel<S>
where
    S: DataSource<Item = ChatMessage>,
{
    type Input = ChatInput;
    type Output = ChatOutput;

    fn transform(self, input: ChatInput) -> ChatOutput {
        let (loader, streams) = PageLoader::new(self.source, self.page_size, Order::OldestFirst);
        let LoaderStreams {
            items,
            is_loading,
            errors,
            done,
            ..
        } = streams;
        let (sent_tx, sent) = mpsc::unbounded_channel();

        let mut bindings = Bindings::default();
        bindings.push(self.runtime.spawn(drive(loader, input, done, sent_tx)));

        ChatOutput {
            messages: items,
            is_loading,
            sent,
            errors,
            bindings,
        }
    }
}

async fn drive<S>(
    mut loader: PageLoader<S>,
    mut input: ChatInput,
    mut done: mpsc::UnboundedReceiver<Done<ChatMessage>>,
    sent: mpsc::UnboundedSender<ChatMessage>,
) where
    S: DataSource<Item = ChatMessage>,
{
    let mut local_id = 0u64;
    loop {
        tokio::select! {
            biased;
            Some(()) = input.view_loaded.recv() => loader.trigger(Trigger::ViewLoaded),
            Some(()) = input.load_earlier.recv() => loader.trigger(Trigger::LoadMore),
            Some(text) = input.send_message.recv() => {
                let content = text.trim();
                if !content.is_empty() {
                    let message = ChatMessage {
                        id: format!("local_{local_id}"),
                        sender_id: CURRENT_USER.to_string(),
                        content: content.to_string(),
                        timestamp: Utc::now(),
                        is_from_current_user: true,
                    };
                    local_id += 1;
                    if loader.push(message.clone()) {
                        tracing::debug!(id = %message.id, "chat message sent");
                        let _ = sent.send(message);
                    }
                }
            }
            Some(finished) = done.recv() => loader.complete(finished),
            else => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::source::{ChatGenerator, MockOptions, MockSource};

    fn bind() -> (ChatTriggers, ChatOutput) {
        let source = MockSource::new(
            "chat",
            ChatGenerator {
                peer: "friend1".into(),
            },
            MockOptions {
                latency: Duration::ZERO,
                max_pages: 3,
                failure_rate: 0.0,
                seed: Some(3),
            },
        );
        let (triggers, input) = ChatInput::pair();
        let output = ChatViewModel::new(Arc::new(source), 4, Handle::current()).transform(input);
        (triggers, output)
    }

    #[tokio::test]
    async fn history_loads_on_view_loaded() {
        let (triggers, mut output) = bind();
        triggers.view_loaded();
        output.messages.changed().await.unwrap();
        assert_eq!(output.messages.borrow().len(), 4);
    }

    #[tokio::test]
    async fn sent_message_is_appended_and_echoed() {
        let (triggers, mut output) = bind();
        triggers.view_loaded();
        output.messages.changed().await.unwrap();

        triggers.send_message("  see you at noon ");
        let sent = output.sent.recv().await.unwrap();
        assert_eq!(sent.content, "see you at noon");
        assert!(sent.is_from_current_user);
        assert_eq!(sent.sender_id, CURRENT_USER);

        let messages = output.messages.borrow_and_update().clone();
        assert_eq!(messages.len(), 5);
        assert_eq!(messages.last().unwrap().id, sent.id);
    }

    #[tokio::test]
    async fn load_earlier_after_send_keeps_time_order() {
        let (triggers, mut output) = bind();
        triggers.view_loaded();
        output.messages.changed().await.unwrap();

        triggers.send_message("on my way");
        let sent = output.sent.recv().await.unwrap();
        output.messages.borrow_and_update();

        triggers.load_earlier();
        output.messages.changed().await.unwrap();
        let messages = output.messages.borrow_and_update().clone();

        let ids: Vec<_> = messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(
            ids,
            [
                "chat_7", "chat_6", "chat_5", "chat_4", "chat_3", "chat_2", "chat_1", "chat_0",
                "local_0",
            ]
        );
        assert!(
            messages.windows(2).all(|w| w[0].timestamp <= w[1].timestamp),
            "history out of time order: {ids:?}"
        );
        assert_eq!(messages.last().unwrap().id, sent.id);
    }

    #[tokio::test]
    async fn blank_messages_are_dropped() {
        let (triggers, mut output) = bind();
        triggers.send_message("   ");
        triggers.send_message("hello");

        // Only the second message comes back.
        let sent = output.sent.recv().await.unwrap();
        assert_eq!(sent.content, "hello");
        assert_eq!(sent.id, "local_0");
    }
}
