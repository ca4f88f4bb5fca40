//! Shutdown coordination for the controller.

use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// One-shot "termination requested" event.
///
/// Closes at most once. Triggering again is a no-op that neither blocks nor
/// panics, and listeners that subscribe after the close still see it.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    tx: Arc<watch::Sender<bool>>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Close the signal. Returns `true` only for the call that closed it.
    pub fn trigger(&self) -> bool {
        self.tx.send_if_modified(|closed| {
            if *closed {
                false
            } else {
                *closed = true;
                true
            }
        })
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Subscribe to the close event.
    pub fn subscribe(&self) -> ShutdownListener {
        ShutdownListener {
            rx: self.tx.subscribe(),
        }
    }

    /// Wait until the signal is closed.
    pub async fn wait(&self) {
        self.subscribe().wait().await
    }

    /// Get the number of active listeners.
    pub fn listener_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving half of a [`ShutdownSignal`].
#[derive(Debug)]
pub struct ShutdownListener {
    rx: watch::Receiver<bool>,
}

impl ShutdownListener {
    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait until the signal is closed. Returns immediately if it already is.
    pub async fn wait(&mut self) {
        // Err means every sender is gone; nothing can close it any more, so
        // treat that as closed as well.
        let _ = self.rx.wait_for(|closed| *closed).await;
    }
}

/// The shutdown signal paired with the context handed to the server.
///
/// [`Shutdown::trigger`] is the callback installed on the signal
/// coordinator: it closes the signal and cancels the context together.
#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    signal: ShutdownSignal,
    context: CancellationToken,
}

impl Shutdown {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Close the signal and cancel the context.
    ///
    /// Returns `true` for the call that performed the transition.
    pub fn trigger(&self) -> bool {
        let first = self.signal.trigger();
        self.context.cancel();
        first
    }

    pub fn signal(&self) -> &ShutdownSignal {
        &self.signal
    }

    /// A handle on the shared cancellation context.
    pub fn context(&self) -> CancellationToken {
        self.context.clone()
    }

    pub fn is_triggered(&self) -> bool {
        self.signal.is_triggered()
    }

    /// Wait until shutdown has been triggered.
    pub async fn wait(&self) {
        self.signal.wait().await
    }
}
