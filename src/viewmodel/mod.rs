//! Input/Output view-models.
//!
//! Every screen talks to its state through a [`ViewModel`]: the screen hands
//! over a bundle of input event streams and gets back a bundle of output state
//! streams.  All mutable state lives inside the driver task that
//! [`ViewModel::transform`] spawns.
//!
//! ```text
//!   screen ── ListTriggers ──► Input ──► transform() ──► Output ──► screen
//!             (mpsc senders)              │ spawns driver   (watch + mpsc
//!                                         ▼                  receivers)
//!                                    Bindings (abort on drop)
//! ```
//!
//! * Discrete events (taps, refresh, sent messages, errors) are unbounded
//!   [`mpsc`](tokio::sync::mpsc) channels.
//! * State (items, loading flags, enablement) is a [`watch`](tokio::sync::watch)
//!   channel, so a reader always sees the latest value.
//!
//! `transform` takes the view-model by value: binding one twice is a compile
//! error rather than a double subscription.

mod chat;
mod list;
mod publish;

pub use chat::{ChatInput, ChatOutput, ChatTriggers, ChatViewModel};
pub use list::{ListInput, ListOutput, ListTriggers, ListViewModel};
pub use publish::{PublishInput, PublishOutput, PublishTriggers, PublishViewModel};

use tokio::sync::watch;
use tokio::task::JoinHandle;

/// The input/output contract shared by every screen.
pub trait ViewModel {
    type Input;
    type Output;

    /// Wire `input` to a fresh output bundle.  Must not block.
    fn transform(self, input: Self::Input) -> Self::Output;
}

/// Tasks spawned by a `transform` call.
///
/// Dropping this aborts them, which releases every subscription the
/// view-model holds.  Screens keep it next to the output they read.
#[derive(Debug, Default)]
pub struct Bindings {
    tasks: Vec<JoinHandle<()>>,
}

impl Bindings {
    pub fn push(&mut self, task: JoinHandle<()>) {
        self.tasks.push(task);
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }
}

impl Drop for Bindings {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

/// Update a state stream, notifying readers only when the value changes.
pub(crate) fn set_state<T: PartialEq>(tx: &watch::Sender<T>, value: T) {
    tx.send_if_modified(|current| {
        if *current == value {
            false
        } else {
            *current = value;
            true
        }
    });
}
