//! Publish form view-model.
//!
//! Title and content streams carry the full text of each field on every edit.
//! The publish button is enabled once both are non-blank; a tap while disabled
//! or while a publish is running does nothing.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};

use super::{set_state, Bindings, ViewModel};
use crate::error::FetchError;
use crate::source::{Draft, NoteItem, Publisher};

pub struct PublishInput {
    pub title: mpsc::UnboundedReceiver<String>,
    pub content: mpsc::UnboundedReceiver<String>,
    pub publish_tap: mpsc::UnboundedReceiver<()>,
}

#[derive(Clone)]
pub struct PublishTriggers {
    title: mpsc::UnboundedSender<String>,
    content: mpsc::UnboundedSender<String>,
    publish_tap: mpsc::UnboundedSender<()>,
}

impl PublishInput {
    pub fn pair() -> (PublishTriggers, PublishInput) {
        let (title_tx, title) = mpsc::unbounded_channel();
        let (content_tx, content) = mpsc::unbounded_channel();
        let (publish_tap_tx, publish_tap) = mpsc::unbounded_channel();
        (
            PublishTriggers {
                title: title_tx,
                content: content_tx,
                publish_tap: publish_tap_tx,
            },
            PublishInput {
                title,
                content,
                publish_tap,
            },
        )
    }
}

impl PublishTriggers {
    pub fn title(&self, text: impl Into<String>) {
        let _ = self.title.send(text.into());
    }

    pub fn content(&self, text: impl Into<String>) {
        let _ = self.content.send(text.into());
    }

    pub fn publish_tap(&self) {
        let _ = self.publish_tap.send(());
    }
}

pub struct PublishOutput {
    /// Starts `false`.
    pub is_publish_enabled: watch::Receiver<bool>,
    pub is_publishing: watch::Receiver<bool>,
    pub publish_result: mpsc::UnboundedReceiver<Result<NoteItem, FetchError>>,
    pub bindings: Bindings,
}

pub struct PublishViewModel<P> {
    publisher: Arc<P>,
    runtime: Handle,
}

impl<P: Publisher> PublishViewModel<P> {
    pub fn new(publisher: Arc<P>, runtime: Handle) -> Self {
        Self { publisher, runtime }
    }
}

impl<P: Publisher> ViewModel for PublishViewModel<P> {
    type Input = PublishInput;
    type Output = PublishOutput;

    fn transform(self, input: PublishInput) -> PublishOutput {
        let (enabled_tx, is_publish_enabled) = watch::channel(false);
        let (publishing_tx, is_publishing) = watch::channel(false);
        let (result_tx, publish_result) = mpsc::unbounded_channel();

        let state = PublishState {
            publisher: self.publisher,
            draft: Draft::default(),
            enabled: enabled_tx,
            publishing: publishing_tx,
            results: result_tx,
        };

        let mut bindings = Bindings::default();
        bindings.push(self.runtime.spawn(drive(state, input)));

        PublishOutput {
            is_publish_enabled,
            is_publishing,
            publish_result,
            bindings,
        }
    }
}

struct PublishState<P> {
    publisher: Arc<P>,
    draft: Draft,
    enabled: watch::Sender<bool>,
    publishing: watch::Sender<bool>,
    results: mpsc::UnboundedSender<Result<NoteItem, FetchError>>,
}

async fn drive<P: Publisher>(mut state: PublishState<P>, mut input: PublishInput) {
    let (done_tx, mut done) = mpsc::unbounded_channel();
    loop {
        tokio::select! {
            biased;
            Some(title) = input.title.recv() => {
                state.draft.title = title;
                set_state(&state.enabled, state.draft.is_publishable());
            }
            Some(content) = input.content.recv() => {
                state.draft.content = content;
                set_state(&state.enabled, state.draft.is_publishable());
            }
            Some(()) = input.publish_tap.recv() => {
                if !*state.enabled.borrow() || *state.publishing.borrow() {
                    tracing::debug!("publish tap ignored");
                } else {
                    set_state(&state.publishing, true);
                    let publisher = Arc::clone(&state.publisher);
                    let draft = state.draft.clone();
                    let done = done_tx.clone();
                    tokio::spawn(async move {
                        let result = tokio::task::spawn_blocking(move || publisher.publish(&draft))
                            .await
                            .unwrap_or_else(|e| {
                                Err(FetchError::failed(format!("publish worker: {e}")))
                            });
                        let _ = done.send(result);
                    });
                }
            }
            Some(result) = done.recv() => {
                set_state(&state.publishing, false);
                match &result {
                    Ok(note) => tracing::info!(id = %note.id, "note published"),
                    Err(e) => tracing::warn!(error = %e, "publish failed"),
                }
                let _ = state.results.send(result);
            }
            else => break,
        }
    }
}
