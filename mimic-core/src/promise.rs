//! Completion primitives for asynchronous members.

use std::{fmt, sync::Arc};

use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::{Error, Result, Value};

/// A completion callback handed to `Begin*`-style source methods.
///
/// The source invokes it once, with its pending-operation handle, when the
/// operation completes.
#[derive(Clone)]
pub struct Callback(Arc<dyn Fn(Value) + Send + Sync>);

impl Callback {
    pub fn new(f: impl Fn(Value) + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn invoke(&self, handle: Value) {
        (self.0)(handle)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callback")
    }
}

/// The producing side of a [`Promise`].
pub struct Completer {
    tx: oneshot::Sender<Result<Value>>,
}

impl Completer {
    /// Resolve or reject the promise. A promise nobody awaits is dropped silently.
    pub fn complete(self, result: Result<Value>) {
        let _ = self.tx.send(result);
    }
}

/// A value that becomes available later.
///
/// Clones share the same underlying result, which can be awaited once.
#[derive(Clone)]
pub struct Promise {
    rx: Arc<Mutex<Option<oneshot::Receiver<Result<Value>>>>>,
}

impl Promise {
    /// Create a pending promise and its completer.
    pub fn pending() -> (Completer, Promise) {
        let (tx, rx) = oneshot::channel();
        (
            Completer { tx },
            Promise {
                rx: Arc::new(Mutex::new(Some(rx))),
            },
        )
    }

    /// Create an already-settled promise.
    pub fn settled(result: Result<Value>) -> Promise {
        let (completer, promise) = Promise::pending();
        completer.complete(result);
        promise
    }

    /// Wait for the result.
    ///
    /// # Errors
    ///
    /// Returns the rejection, or `InvalidOperation` if the promise was already
    /// awaited or its completer was dropped without completing.
    pub async fn wait(&self) -> Result<Value> {
        let rx = self
            .rx
            .lock()
            .take()
            .ok_or_else(|| Error::invalid_operation("promise was already awaited"))?;

        rx.await.unwrap_or_else(|_| {
            Err(Error::invalid_operation(
                "asynchronous operation was dropped before completing",
            ))
        })
    }
}

impl fmt::Debug for Promise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Promise")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_promise_resolves() {
        let (completer, promise) = Promise::pending();
        std::thread::spawn(move || completer.complete(Ok(Value::Bool(true))));
        assert_eq!(promise.wait().await.unwrap(), Value::Bool(true));
    }

    #[tokio::test]
    async fn test_promise_awaited_twice() {
        let promise = Promise::settled(Ok(Value::Int(1)));
        assert!(promise.wait().await.is_ok());
        let err = promise.wait().await.unwrap_err();
        assert!(matches!(err, Error::InvalidOperation { .. }));
    }

    #[tokio::test]
    async fn test_dropped_completer_rejects() {
        let (completer, promise) = Promise::pending();
        drop(completer);
        assert!(promise.wait().await.is_err());
    }
}
