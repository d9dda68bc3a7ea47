//! Conversational assistant bridge.
//!
//! The bridge never touches the mirror itself. When the service reports that
//! it executed side-effecting actions, the bridge publishes an
//! [`ExternalMutation`] and whoever subscribed (normally
//! [`spawn_reload_on_external_mutation`]) refreshes the store.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use zbalo_records::{ChatReply, ChatTurn, ExecutedAction};

use crate::error::ServiceResult;
use crate::loader::BulkLoader;
use crate::service::RecordService;
use crate::status::StatusNotifier;

const EVENT_CAPACITY: usize = 16;

/// Published when the assistant changed records behind the mirror's back.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalMutation {
    pub actions: Vec<ExecutedAction>,
    /// Action messages joined with ` · `.
    pub summary: String,
}

pub struct AssistantBridge {
    service: Arc<dyn RecordService>,
    transcript: Mutex<Vec<ChatTurn>>,
    events: broadcast::Sender<ExternalMutation>,
}

impl AssistantBridge {
    pub fn new(service: Arc<dyn RecordService>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            service,
            transcript: Mutex::new(Vec::new()),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ExternalMutation> {
        self.events.subscribe()
    }

    pub fn transcript(&self) -> Vec<ChatTurn> {
        self.turns().clone()
    }

    fn turns(&self) -> std::sync::MutexGuard<'_, Vec<ChatTurn>> {
        self.transcript.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Send one operator message with the whole transcript.
    ///
    /// The raw reply is recorded even when empty; the returned reply is
    /// untouched so callers can use [`ChatReply::display_text`]. On a
    /// transport failure the transcript ends with the operator's turn.
    pub async fn send(&self, message: &str) -> ServiceResult<ChatReply> {
        let outgoing = {
            let mut turns = self.turns();
            turns.push(ChatTurn::user(message));
            turns.clone()
        };

        tracing::debug!(turns = outgoing.len(), "chat");
        let reply = self
            .service
            .chat(&outgoing)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "chat failed"))?;

        self.turns().push(ChatTurn::assistant(reply.reply.clone()));

        if reply.has_side_effects() {
            tracing::info!(actions = reply.actions.len(), "assistant executed actions");
            let event = ExternalMutation {
                actions: reply.actions.clone(),
                summary: reply.action_summary(),
            };
            if self.events.send(event).is_err() {
                tracing::warn!("external mutation with no subscriber; mirror may be stale");
            }
        }
        Ok(reply)
    }
}

/// Reload the whole mirror for every external mutation, then post the
/// action summary. Ends when the bridge is dropped.
pub fn spawn_reload_on_external_mutation(
    loader: BulkLoader,
    mut events: broadcast::Receiver<ExternalMutation>,
    status: StatusNotifier,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => match loader.reload().await {
                    Ok(()) => status.show(format!("✅ {}", event.summary)),
                    Err(e) => tracing::warn!(error = %e, "reload after assistant actions failed"),
                },
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "external mutation events dropped; reloading");
                    if let Err(e) = loader.reload().await {
                        tracing::warn!(error = %e, "reload after dropped events failed");
                    }
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}
