//! Contract-driven HTTP server for Portico.
//!
//! The server is assembled from three values: a validated
//! [`Contract`](portico_core::Contract), a [`HandlerRegistry`] mapping each
//! operation id to an async handler, and a [`ServerConfig`]. Binding checks
//! that every operation has a handler before the listener is acquired;
//! serving runs until a [`ShutdownSignal`] fires and then drains in-flight
//! connections.
//!
//! # Example
//!
//! ```no_run
//! use portico_core::Contract;
//! use portico_server::{HandlerRegistry, Responder, Server, ServerConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let contract = Contract::from_slice(br#"{
//!     "name": "hello-api",
//!     "operations": [
//!         { "operationId": "checkHealth", "method": "GET", "path": "/health" },
//!         { "operationId": "getHelloUser", "method": "GET", "path": "/hello/{user}",
//!           "parameters": [{ "name": "user", "type": "string" }] }
//!     ]
//! }"#)?;
//!
//! let mut registry = HandlerRegistry::new();
//! registry.register("checkHealth", |_ctx, _args| async { Ok(Responder::text("OK")) })?;
//! registry.register("getHelloUser", |_ctx, args| async move {
//!     let user = args.str("user").unwrap_or_default().to_string();
//!     Ok(Responder::text(format!("Hello {user}!")))
//! })?;
//!
//! Server::new(ServerConfig::default(), contract, registry).run().await?;
//! # Ok(())
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/portico-server/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod dispatch;
mod registry;
mod responder;
mod server;
mod shutdown;

pub use config::{
    ServerConfig, ServerConfigBuilder, DEFAULT_BIND_ADDR, DEFAULT_DRAIN_TIMEOUT_SECS,
    DEFAULT_REQUEST_TIMEOUT_SECS,
};
pub use dispatch::Dispatcher;
pub use registry::{Handler, HandlerError, HandlerFuture, HandlerRegistry, RegistryError};
pub use responder::{Responder, ResponseBody};
pub use server::{BoundServer, Server, ServerError};
pub use shutdown::{ConnectionToken, ConnectionTracker, ShutdownSignal};
