//! # Events
//!
//! Hosts that render more than the status line subscribe to the
//! [`EventBus`]: sign-in progress from `core-auth` and the outcome of every
//! remote file operation from `core-service` arrive as [`CoreEvent`]s.
//!
//! The bus is a `tokio::sync::broadcast` channel. Publishers never wait on
//! subscribers; a subscriber that falls more than the buffer size behind gets
//! `RecvError::Lagged` and continues from the oldest retained event.
//!
//! ```rust
//! use core_runtime::events::{CoreEvent, EventBus, StatusEvent};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let bus = EventBus::default();
//! let mut events = bus.subscribe();
//!
//! bus.emit(CoreEvent::Status(StatusEvent::new("Searching..."))).ok();
//!
//! let event = events.recv().await.unwrap();
//! assert_eq!(event, CoreEvent::Status(StatusEvent::new("Searching...")));
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    Auth(AuthEvent),
    Files(FileEvent),
    /// The status line now reads `message`.
    Status(StatusEvent),
}

impl CoreEvent {
    /// Failed sign-ins and failed file operations.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            CoreEvent::Auth(AuthEvent::AuthError { .. })
                | CoreEvent::Files(FileEvent::OperationFailed { .. })
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum AuthEvent {
    /// About to leave for the authorization page.
    SigningIn,
    SignedIn {
        account_id: Option<String>,
    },
    SignedOut,
    /// The code exchange was rejected or could not be sent.
    AuthError { message: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum FileEvent {
    SearchCompleted { query: String, count: usize },
    FolderListed { path: String, count: usize },
    Opened { path: String, name: String },
    CopiedToClipboard { name: String },
    Saved { path: String, name: String },
    Created { path: String, name: String },
    /// `to` and `name` are what the server assigned, which may differ from
    /// the requested name after autorename.
    Renamed { from: String, to: String, name: String },
    Deleted { path: String },
    OperationFailed {
        /// Command name, e.g. `"search"` or `"save"`.
        operation: String,
        message: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusEvent {
    pub message: String,
}

impl StatusEvent {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Broadcast channel shared by the auth manager, the browser and the host.
///
/// Clones publish into the same channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Errors only when nobody is subscribed; publishers call `.ok()` on it.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Events published before this call are not delivered.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
