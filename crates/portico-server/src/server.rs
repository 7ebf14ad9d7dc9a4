//! Server lifecycle.
//!
//! The lifecycle is encoded in types rather than a state flag: a [`Server`]
//! is created, [`Server::bind`] consumes it into a [`BoundServer`], and
//! [`BoundServer::serve`] runs until shutdown, draining in-flight
//! connections before it returns. A stopped server is simply dropped; there
//! is no restart.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use http::{Request, Response, StatusCode};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use hyper_util::server::graceful::GracefulShutdown;
use portico_core::Contract;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::dispatch::Dispatcher;
use crate::registry::HandlerRegistry;
use crate::responder::{Responder, ResponseBody};
use crate::shutdown::{ConnectionTracker, ShutdownSignal};

/// An error raised while starting or binding the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The configured bind address could not be parsed.
    #[error("invalid bind address '{addr}'")]
    InvalidAddr {
        /// The configured address string.
        addr: String,
        /// The parse failure.
        #[source]
        source: std::net::AddrParseError,
    },

    /// The listener could not be acquired.
    #[error("failed to bind {addr}")]
    Bind {
        /// The address that could not be bound.
        addr: SocketAddr,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The contract declares operations that have no registered handler.
    #[error("contract operations without handlers: {}", .0.join(", "))]
    HandlerMissing(Vec<String>),
}

/// A configured server that has not yet bound its listener.
#[derive(Debug)]
pub struct Server {
    config: ServerConfig,
    dispatcher: Dispatcher,
}

impl Server {
    /// Creates a server from a validated contract and a handler registry.
    #[must_use]
    pub fn new(config: ServerConfig, contract: Contract, registry: HandlerRegistry) -> Self {
        Self {
            config,
            dispatcher: Dispatcher::new(contract, registry),
        }
    }

    /// Verifies handler coverage and acquires the listener.
    ///
    /// Coverage is checked before the socket is touched, so a misconfigured
    /// server never occupies a port.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::HandlerMissing`] if any contract operation has
    /// no handler, [`ServerError::InvalidAddr`] for an unparseable address,
    /// and [`ServerError::Bind`] if the listener cannot be acquired.
    pub async fn bind(self) -> Result<BoundServer, ServerError> {
        let missing = self.dispatcher.unhandled_operations();
        if !missing.is_empty() {
            return Err(ServerError::HandlerMissing(
                missing.into_iter().map(String::from).collect(),
            ));
        }

        let addr = self
            .config
            .socket_addr()
            .map_err(|source| ServerError::InvalidAddr {
                addr: self.config.bind_addr().to_string(),
                source,
            })?;

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| ServerError::Bind { addr, source })?;

        info!(
            addr = %local_addr,
            contract = self.dispatcher.contract().name(),
            version = self.dispatcher.contract().version(),
            operations = self.dispatcher.contract().operations().len(),
            "bound"
        );

        Ok(BoundServer {
            config: self.config,
            dispatcher: Arc::new(self.dispatcher),
            listener,
            local_addr,
        })
    }

    /// Binds and serves until SIGTERM or SIGINT.
    ///
    /// # Errors
    ///
    /// Returns any error from [`Server::bind`].
    pub async fn run(self) -> Result<(), ServerError> {
        let bound = self.bind().await?;
        bound.serve(ShutdownSignal::with_os_signals()).await
    }
}

/// A server that holds its listener and is ready to serve.
#[derive(Debug)]
pub struct BoundServer {
    config: ServerConfig,
    dispatcher: Arc<Dispatcher>,
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl BoundServer {
    /// The address actually bound, with any ephemeral port resolved.
    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Accepts connections until `shutdown` fires, then drains.
    ///
    /// Draining stops accepting, closes the listener, and waits up to the
    /// configured drain timeout for in-flight connections to finish.
    /// Requests already being processed are completed; connections still
    /// open at the deadline are forcibly closed.
    ///
    /// # Errors
    ///
    /// Currently infallible after a successful bind; the `Result` keeps the
    /// signature stable for future fatal accept-loop conditions.
    pub async fn serve(self, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let graceful = GracefulShutdown::new();
        let tracker = ConnectionTracker::new();
        let mut connections = JoinSet::new();

        info!(addr = %self.local_addr, "serving");

        loop {
            tokio::select! {
                () = shutdown.wait() => break,
                Some(_) = connections.join_next() => {}
                accepted = self.listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(pair) => pair,
                        Err(err) => {
                            warn!(%err, "accept failed");
                            continue;
                        }
                    };
                    debug!(%peer, "connection accepted");

                    let io = TokioIo::new(stream);
                    let dispatcher = Arc::clone(&self.dispatcher);
                    let request_timeout = self.config.request_timeout();
                    let service = service_fn(move |req: Request<Incoming>| {
                        let dispatcher = Arc::clone(&dispatcher);
                        async move { handle(&dispatcher, &req, request_timeout).await }
                    });

                    let conn = http1::Builder::new().serve_connection(io, service);
                    let conn = graceful.watch(conn);
                    let token = tracker.acquire();
                    connections.spawn(async move {
                        let _token = token;
                        if let Err(err) = conn.await {
                            debug!(%err, "connection closed with error");
                        }
                    });
                }
            }
        }

        // Draining: the listener closes here, new connections are refused.
        info!(in_flight = tracker.active(), "draining");
        drop(self.listener);

        let drained = tokio::select! {
            () = graceful.shutdown() => true,
            drained = tracker.wait_for_drain(self.config.drain_timeout()) => drained,
        };
        if drained {
            info!("drained");
        } else {
            warn!(
                in_flight = tracker.active(),
                "drain timeout elapsed, closing remaining connections"
            );
            connections.abort_all();
        }
        while connections.join_next().await.is_some() {}

        info!("stopped");
        Ok(())
    }
}

/// Maps one HTTP exchange through the dispatcher.
///
/// A handler that outlives the request timeout yields a 504; the handler
/// future is dropped at that point.
async fn handle(
    dispatcher: &Dispatcher,
    req: &Request<Incoming>,
    timeout: std::time::Duration,
) -> Result<Response<ResponseBody>, Infallible> {
    let method = req.method();
    let path = req.uri().path();

    let responder = match tokio::time::timeout(timeout, dispatcher.dispatch(method, path)).await {
        Ok(responder) => responder,
        Err(_) => {
            warn!(%method, path, "request deadline exceeded");
            Responder::error(
                StatusCode::GATEWAY_TIMEOUT,
                "TIMEOUT",
                "request deadline exceeded",
            )
        }
    };

    Ok(responder.into_response())
}
