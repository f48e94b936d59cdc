//! Periodic draft autosave
//!
//! The editor pushes the current text through a watch channel; a background
//! task persists it on every tick while it is non-blank.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::store::PersistenceStore;
use crate::traits::KvStore;

/// Default autosave period
pub const DEFAULT_AUTOSAVE_INTERVAL: Duration = Duration::from_secs(30);

/// Handle to a running autosave task
pub struct DraftAutosave {
    text: watch::Sender<String>,
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl DraftAutosave {
    /// Spawn the autosave task; the first save happens one `period` after start
    pub fn start<S, C>(
        store: Arc<PersistenceStore<S, C>>,
        period: Duration,
        initial: impl Into<String>,
    ) -> Self
    where
        S: KvStore,
        C: Clock,
    {
        let (text, rx) = watch::channel(initial.into());
        let token = CancellationToken::new();
        let task_token = token.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let current = rx.borrow().clone();
                        if current.trim().is_empty() {
                            continue;
                        }
                        match store.save_draft(&current).await {
                            Ok(()) => debug!("Draft autosaved"),
                            Err(e) => warn!("Draft autosave failed: {}", e),
                        }
                    }
                    () = task_token.cancelled() => {
                        debug!("Autosave task received cancellation signal");
                        break;
                    }
                }
            }

            info!("Draft autosave stopped");
        });

        info!(period_secs = period.as_secs(), "Draft autosave started");
        Self {
            text,
            token,
            handle,
        }
    }

    /// Replace the text picked up by the next tick
    pub fn update(&self, text: impl Into<String>) {
        self.text.send_replace(text.into());
    }

    /// Text the next tick would save
    pub fn current(&self) -> String {
        self.text.borrow().clone()
    }

    /// Token that stops the task when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Stop the task and wait for it to finish
    pub async fn shutdown(self) {
        self.token.cancel();
        if let Err(e) = self.handle.await {
            warn!("Autosave task ended abnormally: {}", e);
        }
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use crate::memory_impl::MemoryStore;

    fn store() -> Arc<PersistenceStore<MemoryStore>> {
        Arc::new(PersistenceStore::new(MemoryStore::new()))
    }

    #[tokio::test(start_paused = true)]
    async fn test_saves_on_tick_only() {
        let store = store();
        let autosave = DraftAutosave::start(store.clone(), Duration::from_secs(30), "");
        autosave.update("щит 3, группа 7");

        tokio::time::sleep(Duration::from_secs(29)).await;
        assert_eq!(store.draft().await.unwrap(), "");

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(store.draft().await.unwrap(), "щит 3, группа 7");

        autosave.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_text_is_not_saved() {
        let store = store();
        store.save_draft("старый текст").await.unwrap();

        let autosave = DraftAutosave::start(store.clone(), Duration::from_secs(30), "   \n");
        tokio::time::sleep(Duration::from_secs(95)).await;
        assert_eq!(store.draft().await.unwrap(), "старый текст");
        assert_eq!(autosave.current(), "   \n");

        autosave.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_saves_after_cancel() {
        let store = store();
        let autosave = DraftAutosave::start(store.clone(), Duration::from_secs(10), "первый");
        tokio::time::sleep(Duration::from_secs(11)).await;
        assert_eq!(store.draft().await.unwrap(), "первый");

        autosave.update("второй");
        let token = autosave.cancellation_token();
        autosave.shutdown().await;
        assert!(token.is_cancelled());

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(store.draft().await.unwrap(), "первый");
    }
}
