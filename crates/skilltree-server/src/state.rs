use std::sync::Arc;
use std::time::Duration;

use skilltree_core::engine::Engine;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
    /// Carries the id of each container whose skills changed.
    pub event_tx: broadcast::Sender<Uuid>,
}

impl AppState {
    /// Wrap `engine` and, when a tokio runtime is running, start the
    /// background reconciliation loop.
    pub fn new(engine: Engine) -> Self {
        let (tx, _) = broadcast::channel(64);
        let state = Self {
            engine: Arc::new(engine),
            event_tx: tx,
        };

        if tokio::runtime::Handle::try_current().is_ok() {
            let interval = state.engine.config().server.reconcile_interval_ms;
            if interval > 0 {
                tokio::spawn(reconcile_loop(
                    state.engine.clone(),
                    state.event_tx.clone(),
                    Duration::from_millis(interval),
                ));
            }
        }

        state
    }

    pub fn notify(&self, container: Uuid) {
        let _ = self.event_tx.send(container);
    }
}

/// Promote ready skills across every container, emitting one update per
/// container that changed.
async fn reconcile_loop(engine: Arc<Engine>, tx: broadcast::Sender<Uuid>, every: Duration) {
    loop {
        tokio::time::sleep(every).await;
        let engine = engine.clone();
        match tokio::task::spawn_blocking(move || engine.reconcile_all()).await {
            Ok(Ok(changed)) => {
                for id in changed {
                    let _ = tx.send(id);
                }
            }
            Ok(Err(e)) => tracing::warn!(error = %e, "background reconcile failed"),
            Err(e) => tracing::warn!(error = %e, "background reconcile panicked"),
        }
    }
}
