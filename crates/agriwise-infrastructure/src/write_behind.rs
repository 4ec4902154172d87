//! Write-behind decorator for a session persistence port.
//!
//! `save` only enqueues; a Tokio task drains the queue, keeps the newest
//! record and hands it to the wrapped port on the blocking pool.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

use agriwise_core::error::{AgriwiseError, Result};
use agriwise_core::session::{PersistedSession, SessionPersistence};

enum Command {
    Save(PersistedSession),
    Flush(oneshot::Sender<()>),
}

/// [`SessionPersistence`] that never blocks the caller on disk I/O.
///
/// Records queued before a [`flush`](Self::flush) are written by the time it
/// returns. Intermediate records may be skipped when a newer one is already
/// queued; the durable state always converges to the last record saved.
pub struct WriteBehindPersistence {
    inner: Arc<dyn SessionPersistence>,
    tx: mpsc::UnboundedSender<Command>,
}

impl WriteBehindPersistence {
    /// Starts the writer task on the current Tokio runtime.
    ///
    /// Fails when called outside a runtime.
    pub fn spawn(inner: Arc<dyn SessionPersistence>) -> Result<Self> {
        let handle = tokio::runtime::Handle::try_current().map_err(|e| {
            AgriwiseError::internal(format!("Write-behind persistence needs a Tokio runtime: {}", e))
        })?;

        let (tx, rx) = mpsc::unbounded_channel();
        handle.spawn(run_writer(inner.clone(), rx));
        tracing::debug!("[WriteBehind] Writer task started");

        Ok(Self { inner, tx })
    }

    /// Waits until every record queued before this call is written.
    pub async fn flush(&self) -> Result<()> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.tx
            .send(Command::Flush(ack_tx))
            .map_err(|_| AgriwiseError::internal("Write-behind writer task has stopped"))?;
        ack_rx
            .await
            .map_err(|_| AgriwiseError::internal("Write-behind writer task dropped a flush"))
    }
}

impl SessionPersistence for WriteBehindPersistence {
    fn load(&self) -> Result<Option<PersistedSession>> {
        self.inner.load()
    }

    fn save(&self, record: &PersistedSession) -> Result<()> {
        self.tx
            .send(Command::Save(record.clone()))
            .map_err(|_| AgriwiseError::internal("Write-behind writer task has stopped"))
    }
}

async fn run_writer(
    inner: Arc<dyn SessionPersistence>,
    mut rx: mpsc::UnboundedReceiver<Command>,
) {
    while let Some(first) = rx.recv().await {
        let mut pending = None;
        let mut acks = Vec::new();

        let mut next = Some(first);
        while let Some(command) = next {
            match command {
                Command::Save(record) => pending = Some(record),
                Command::Flush(ack) => acks.push(ack),
            }
            next = rx.try_recv().ok();
        }

        if let Some(record) = pending {
            write(inner.clone(), record).await;
        }

        for ack in acks {
            let _ = ack.send(());
        }
    }

    tracing::debug!("[WriteBehind] Queue closed, writer task exiting");
}

async fn write(inner: Arc<dyn SessionPersistence>, record: PersistedSession) {
    match tokio::task::spawn_blocking(move || inner.save(&record)).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "[WriteBehind] Failed to persist session");
        }
        Err(e) => {
            tracing::warn!(error = %e, "[WriteBehind] Persist task panicked or was cancelled");
        }
    }
}
