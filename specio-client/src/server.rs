//! Local HTTP server for exercising generated clients.

use crate::BoxFuture;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming as IncomingBody;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, warn};

/// Handles requests received by a [`TestServer`].
pub trait RequestHandler: Send + Sync + 'static {
    fn handle(&self, request: http::Request<Bytes>) -> BoxFuture<http::Response<Bytes>>;
}

impl<F, Fut> RequestHandler for F
where
    F: Fn(http::Request<Bytes>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = http::Response<Bytes>> + Send + 'static,
{
    fn handle(&self, request: http::Request<Bytes>) -> BoxFuture<http::Response<Bytes>> {
        Box::pin(self(request))
    }
}

/// HTTP/1 server bound to the loopback interface.
///
/// The accept loop and every open connection stop when the server is
/// dropped.
#[derive(Debug)]
pub struct TestServer {
    addr: SocketAddr,
    task: JoinHandle<()>,
}

impl TestServer {
    /// Start listening on `port`; `0` picks a free port.
    ///
    /// Resolves once the listener is bound.
    pub async fn bind(handler: impl RequestHandler, port: u16) -> io::Result<Self> {
        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], port))).await?;
        let addr = listener.local_addr()?;
        debug!(%addr, "Test server listening");

        let handler: Arc<dyn RequestHandler> = Arc::new(handler);
        let task = tokio::spawn(accept_loop(listener, handler));

        Ok(Self { addr, task })
    }

    /// Address the server is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Port the server is bound to.
    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Base URL of the server, e.g. `http://127.0.0.1:41234`.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn accept_loop(listener: TcpListener, handler: Arc<dyn RequestHandler>) {
    // Dropping the set aborts every open connection with the loop.
    let mut connections = JoinSet::new();

    loop {
        let (stream, peer) = tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok(accepted) => accepted,
                Err(e) => {
                    warn!(error = %e, "Failed to accept connection");
                    continue;
                }
            },
            Some(_) = connections.join_next(), if !connections.is_empty() => continue,
        };
        let io = TokioIo::new(stream);
        let handler = handler.clone();

        connections.spawn(async move {
            let service = service_fn(move |req: http::Request<IncomingBody>| {
                let handler = handler.clone();
                async move { serve(req, handler).await }
            });

            if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                debug!(%peer, error = %err, "Error serving connection");
            }
        });
    }
}

async fn serve(
    req: http::Request<IncomingBody>,
    handler: Arc<dyn RequestHandler>,
) -> Result<http::Response<Full<Bytes>>, hyper::Error> {
    let (parts, body) = req.into_parts();
    let body = body.collect().await?.to_bytes();
    let response = handler.handle(http::Request::from_parts(parts, body)).await;
    Ok(response.map(Full::new))
}
