//! External routing (fire-and-forget delivery to another worker).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use leafwire_core::protocol::CommandId;

use crate::config::RouterSection;
use crate::envelope::Envelope;

/// Receives routed messages. Must not block the caller of `route`.
pub trait ExternalRouter<C>: Send + Sync {
    fn deliver(&self, command: CommandId, envelope: &Envelope, ctx: &C);
}

/// One item in a [`ChanRouter`] inbox.
#[derive(Debug, Clone)]
pub struct Routed<C> {
    pub command: CommandId,
    pub envelope: Envelope,
    pub ctx: C,
}

/// Router over a bounded tokio channel. Lossy: a full inbox drops the
/// message instead of blocking the router's caller.
pub struct ChanRouter<C> {
    name: String,
    tx: mpsc::Sender<Routed<C>>,
    dropped: AtomicU64,
}

impl<C: Clone + Send + 'static> ChanRouter<C> {
    pub fn channel(
        name: impl Into<String>,
        capacity: usize,
    ) -> (Arc<Self>, mpsc::Receiver<Routed<C>>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let router = Arc::new(Self {
            name: name.into(),
            tx,
            dropped: AtomicU64::new(0),
        });
        (router, rx)
    }

    pub fn from_config(
        name: impl Into<String>,
        cfg: &RouterSection,
    ) -> (Arc<Self>, mpsc::Receiver<Routed<C>>) {
        Self::channel(name, cfg.inbox_capacity)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Messages dropped because the inbox was full or closed.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl<C: Clone + Send + Sync + 'static> ExternalRouter<C> for ChanRouter<C> {
    fn deliver(&self, command: CommandId, envelope: &Envelope, ctx: &C) {
        let item = Routed {
            command,
            envelope: envelope.clone(),
            ctx: ctx.clone(),
        };
        let reason = match self.tx.try_send(item) {
            Ok(()) => return,
            Err(TrySendError::Full(_)) => "inbox full",
            Err(TrySendError::Closed(_)) => "inbox closed",
        };
        let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::warn!(
            router = %self.name,
            main = command.main(),
            sub = command.sub(),
            dropped,
            reason,
            "routed message dropped"
        );
    }
}
