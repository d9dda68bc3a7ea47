//! Transient status banner.
//!
//! A new message replaces the current one and cancels its pending
//! dismissal, so at most one dismissal task is ever scheduled.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

pub const LOADING: &str = "🔄 Chargement...";
pub const LOADED: &str = "✅ Données chargées";
pub const LOAD_FAILED: &str = "⚠️ Erreur de chargement";
pub const LOAD_FAILED_DURATION: Duration = Duration::from_secs(5);

#[derive(Debug)]
struct Shared {
    tx: watch::Sender<Option<String>>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

/// Cloneable handle to the one status banner.
#[derive(Debug, Clone)]
pub struct StatusNotifier {
    shared: Arc<Shared>,
    default_duration: Duration,
}

impl StatusNotifier {
    pub fn new(default_duration: Duration) -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            shared: Arc::new(Shared {
                tx,
                pending: Mutex::new(None),
            }),
            default_duration,
        }
    }

    /// Show `message` for the default duration.
    pub fn show(&self, message: impl Into<String>) {
        self.show_for(message, self.default_duration);
    }

    /// Show `message`, dismissing it after `duration`.
    pub fn show_for(&self, message: impl Into<String>, duration: Duration) {
        let message = message.into();
        tracing::info!(status = %message, "status");

        let mut pending = self.shared.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = pending.take() {
            previous.abort();
        }
        self.shared.tx.send_replace(Some(message));

        // Without a runtime the banner simply stays until replaced.
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::debug!("no runtime; status will not auto-dismiss");
            return;
        };
        let shared = Arc::downgrade(&self.shared);
        *pending = Some(runtime.spawn(async move {
            tokio::time::sleep(duration).await;
            if let Some(shared) = shared.upgrade() {
                shared.tx.send_replace(None);
            }
        }));
    }

    /// Clear the banner now.
    pub fn dismiss(&self) {
        let mut pending = self.shared.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = pending.take() {
            previous.abort();
        }
        self.shared.tx.send_replace(None);
    }

    pub fn current(&self) -> Option<String> {
        self.shared.tx.borrow().clone()
    }

    /// Follow banner changes.
    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.shared.tx.subscribe()
    }

    /// Whether a dismissal is still scheduled.
    pub fn has_pending_dismissal(&self) -> bool {
        self.shared
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn message_is_dismissed_after_its_duration() {
        let status = StatusNotifier::new(Duration::from_secs(3));
        status.show("✅ Vente supprimée");
        assert_eq!(status.current().as_deref(), Some("✅ Vente supprimée"));

        tokio::time::sleep(Duration::from_millis(3100)).await;
        assert_eq!(status.current(), None);
        assert!(!status.has_pending_dismissal());
    }

    #[tokio::test(start_paused = true)]
    async fn new_message_cancels_previous_dismissal() {
        let status = StatusNotifier::new(Duration::from_secs(3));
        status.show("first");
        tokio::time::sleep(Duration::from_secs(2)).await;
        status.show_for("second", LOAD_FAILED_DURATION);

        // The first message's timer would have fired here.
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(status.current().as_deref(), Some("second"));
        assert!(status.has_pending_dismissal());

        tokio::time::sleep(Duration::from_secs(4)).await;
        assert_eq!(status.current(), None);
    }

    #[test]
    fn works_without_a_runtime() {
        let status = StatusNotifier::new(Duration::from_secs(3));
        status.show(LOADED);
        assert_eq!(status.current().as_deref(), Some(LOADED));
        assert!(!status.has_pending_dismissal());
        status.dismiss();
        assert_eq!(status.current(), None);
    }
}
