//! Awaitable request results and the factories that produce them.

use crate::{Error, Response, Result, TransportError};
use futures::FutureExt;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tracing::debug;

/// Boxed, sendable future.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// Pending outcome of a request.
///
/// Resolves with the value or rejects with the [`TransportError`] the
/// transport produced. `then` and `catch` chain continuations onto it.
#[must_use = "awaitables do nothing unless awaited"]
pub struct Awaitable<T> {
    inner: BoxFuture<Result<T>>,
}

impl<T: Send + 'static> Awaitable<T> {
    /// Wrap a future.
    pub fn new<F>(future: F) -> Self
    where
        F: Future<Output = Result<T>> + Send + 'static,
    {
        Self {
            inner: Box::pin(future),
        }
    }

    /// An awaitable that resolves immediately.
    pub fn resolved(value: T) -> Self {
        Self::new(futures::future::ready(Ok(value)))
    }

    /// An awaitable that rejects immediately.
    pub fn rejected(error: TransportError) -> Self {
        Self::new(futures::future::ready(Err(error)))
    }

    /// Map the resolved value.
    pub fn then<U, F>(self, f: F) -> Awaitable<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        Awaitable::new(self.inner.map(|result| result.map(f)))
    }

    /// Chain a fallible step onto the resolved value.
    pub fn and_then<U, F>(self, f: F) -> Awaitable<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> Result<U> + Send + 'static,
    {
        Awaitable::new(self.inner.map(|result| result.and_then(f)))
    }

    /// Recover from a rejection.
    pub fn catch<F>(self, f: F) -> Awaitable<T>
    where
        F: FnOnce(TransportError) -> Result<T> + Send + 'static,
    {
        Awaitable::new(self.inner.map(|result| result.or_else(f)))
    }
}

impl<T> Future for Awaitable<T> {
    type Output = Result<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.as_mut().poll(cx)
    }
}

impl<T> fmt::Debug for Awaitable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Awaitable").finish_non_exhaustive()
    }
}

/// What an [`AwaitableFactory`] is able to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Can settle with a value.
    pub resolve: bool,
    /// Can settle with an error.
    pub reject: bool,
    /// Supports success and failure continuations.
    pub chain: bool,
}

impl Capabilities {
    /// Every capability.
    pub const FULL: Capabilities = Capabilities {
        resolve: true,
        reject: true,
        chain: true,
    };

    pub fn is_complete(&self) -> bool {
        self.resolve && self.reject && self.chain
    }

    fn missing(&self) -> Vec<&'static str> {
        [
            (self.resolve, "resolve"),
            (self.reject, "reject"),
            (self.chain, "chain"),
        ]
        .into_iter()
        .filter(|(present, _)| !present)
        .map(|(_, name)| name)
        .collect()
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::FULL
    }
}

/// Turns an in-flight request into an [`Awaitable`].
///
/// The client holds one factory and threads it into every request builder
/// it creates; [`Deferred`] is the default.
pub trait AwaitableFactory: Send + Sync + fmt::Debug {
    /// Short name used in logs and errors.
    fn name(&self) -> &str;

    /// Capabilities this factory provides.
    fn capabilities(&self) -> Capabilities {
        Capabilities::FULL
    }

    /// Wrap the request future.
    fn make(&self, request: BoxFuture<Result<Response>>) -> Awaitable<Response>;
}

/// Reject factories that cannot resolve, reject and chain.
pub(crate) fn ensure_capable(factory: &dyn AwaitableFactory) -> std::result::Result<(), Error> {
    let capabilities = factory.capabilities();
    if capabilities.is_complete() {
        Ok(())
    } else {
        Err(Error::InvalidPromiseConstructor(format!(
            "{} lacks {}",
            factory.name(),
            capabilities.missing().join(", ")
        )))
    }
}

/// Runs the request when the awaitable is first polled.
#[derive(Debug, Clone, Copy, Default)]
pub struct Deferred;

impl AwaitableFactory for Deferred {
    fn name(&self) -> &str {
        "deferred"
    }

    fn make(&self, request: BoxFuture<Result<Response>>) -> Awaitable<Response> {
        Awaitable { inner: request }
    }
}

/// Starts the request immediately on a tokio runtime.
///
/// Outside of a runtime the request falls back to running when polled.
#[derive(Debug, Clone, Default)]
pub struct Spawned {
    handle: Option<tokio::runtime::Handle>,
}

impl Spawned {
    /// Spawn onto the runtime current at request time.
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn onto a specific runtime.
    pub fn on(handle: tokio::runtime::Handle) -> Self {
        Self {
            handle: Some(handle),
        }
    }
}

impl AwaitableFactory for Spawned {
    fn name(&self) -> &str {
        "spawned"
    }

    fn make(&self, request: BoxFuture<Result<Response>>) -> Awaitable<Response> {
        let handle = match &self.handle {
            Some(handle) => handle.clone(),
            None => match tokio::runtime::Handle::try_current() {
                Ok(handle) => handle,
                Err(_) => {
                    debug!("No tokio runtime, deferring request");
                    return Awaitable { inner: request };
                }
            },
        };

        let task = handle.spawn(request);
        Awaitable::new(async move {
            task.await
                .map_err(|e| TransportError::Aborted(e.to_string()))?
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::{HeaderMap, StatusCode};

    #[derive(Debug)]
    struct NoChain;

    impl AwaitableFactory for NoChain {
        fn name(&self) -> &str {
            "no-chain"
        }

        fn capabilities(&self) -> Capabilities {
            Capabilities {
                chain: false,
                ..Capabilities::FULL
            }
        }

        fn make(&self, request: BoxFuture<Result<Response>>) -> Awaitable<Response> {
            Awaitable { inner: request }
        }
    }

    fn ok_response() -> Response {
        Response::from_parts(
            StatusCode::OK,
            HeaderMap::new(),
            Bytes::from_static(b"ok"),
            url::Url::parse("http://localhost/").unwrap(),
        )
    }

    #[tokio::test]
    async fn test_then_maps_value() {
        let value = Awaitable::resolved(2).then(|n| n * 21).await.unwrap();
        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn test_then_skipped_on_rejection() {
        let result = Awaitable::<u32>::rejected(TransportError::Connection("down".into()))
            .then(|_: u32| -> u32 { panic!("should not be here") })
            .await;
        assert!(matches!(result, Err(TransportError::Connection(_))));
    }

    #[tokio::test]
    async fn test_catch_recovers() {
        let value = Awaitable::rejected(TransportError::Json("bad".into()))
            .catch(|_| Ok(7))
            .await
            .unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_catch_skipped_on_success() {
        let value = Awaitable::resolved(1)
            .catch(|_| panic!("should not be here"))
            .await
            .unwrap();
        assert_eq!(value, 1);
    }

    #[tokio::test]
    async fn test_deferred_and_spawned_resolve() {
        let deferred = Deferred.make(Box::pin(async { Ok::<_, TransportError>(ok_response()) }));
        assert_eq!(deferred.await.unwrap().text().unwrap(), "ok");

        let spawned = Spawned::new().make(Box::pin(async { Ok::<_, TransportError>(ok_response()) }));
        assert_eq!(spawned.await.unwrap().status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_spawned_propagates_rejection() {
        let spawned = Spawned::new().make(Box::pin(async {
            Err::<Response, _>(TransportError::InvalidUrl("nope".into()))
        }));
        assert!(matches!(spawned.await, Err(TransportError::InvalidUrl(_))));
    }

    #[test]
    fn test_spawned_without_runtime_defers() {
        let awaitable =
            Spawned::new().make(Box::pin(async { Ok::<_, TransportError>(ok_response()) }));
        let response = tokio_test::block_on(awaitable).unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_ensure_capable() {
        assert!(ensure_capable(&Deferred).is_ok());
        assert!(ensure_capable(&Spawned::new()).is_ok());

        let err = ensure_capable(&NoChain).unwrap_err();
        assert!(matches!(err, Error::InvalidPromiseConstructor(_)));
        assert_eq!(
            err.to_string(),
            "expected a promise constructor: no-chain lacks chain"
        );
    }
}
