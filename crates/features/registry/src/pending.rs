//! The result channel connecting registry workers to callers.
//!
//! Each dispatched request gets exactly one [`Pending`] handle backed by a
//! oneshot channel, which gives the one-completion-per-request guarantee
//! structurally: a worker can deliver at most once, and a caller observes at
//! most one resolution.

use crate::error::RegistryError;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::oneshot;
use tracing::warn;

/// An in-flight registry request.
///
/// Await it to obtain the typed result. The caller's thread is never blocked:
/// the work runs on the registry's pool and this handle merely waits for the
/// completion message. Dropping a `Pending` abandons the result; the worker
/// still runs to completion.
#[must_use = "a Pending does nothing until awaited (or absorbed)"]
#[derive(Debug)]
pub struct Pending<T> {
    rx: oneshot::Receiver<Result<T, RegistryError>>,
}

impl<T> Pending<T> {
    pub(crate) fn new(rx: oneshot::Receiver<Result<T, RegistryError>>) -> Self {
        Self { rx }
    }

    /// A pre-resolved request, used for operations that never reach the store.
    pub(crate) fn ready(result: Result<T, RegistryError>) -> Self {
        let (tx, rx) = oneshot::channel();
        // The receiver is held right here; the send cannot fail.
        let _ = tx.send(result);
        Self { rx }
    }
}

impl<T> Future for Pending<T> {
    type Output = Result<T, RegistryError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx).map(|received| match received {
            Ok(result) => result,
            Err(_closed) => Err(RegistryError::Disconnected),
        })
    }
}

impl<T: Default> Pending<T> {
    /// Awaits the request, collapsing every failure into `T::default()`.
    ///
    /// This reproduces the historical contract where infrastructure failures
    /// were logged and the caller saw only the "nothing found" shape of the
    /// operation: `None`, `false`, or an empty set. The failure is still
    /// logged here; callers that need to distinguish await the `Pending`
    /// directly instead.
    pub async fn absorb(self) -> T {
        match self.await {
            Ok(value) => value,
            Err(error) => {
                warn!(%error, "Registry request failed, absorbing into default result");
                T::default()
            },
        }
    }
}
