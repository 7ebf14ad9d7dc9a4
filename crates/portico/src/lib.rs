//! # Portico
//!
//! **Contract-first HTTP server framework**
//!
//! Portico serves an API described by a declarative contract: routing,
//! parameter typing, and handler coverage all derive from the contract
//! rather than from code annotations.
//!
//! - **Contract loading** – the API description is parsed and validated
//!   before any network activity; a malformed contract never serves
//! - **Typed dispatch** – path parameters are coerced against their
//!   declared types, and mismatches are client errors, not panics
//! - **Handler coverage** – an operation without a handler is a startup
//!   failure, not a runtime 500
//! - **Graceful lifecycle** – bind, serve, drain; in-flight requests are
//!   completed on shutdown, not aborted
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use portico::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     init_logging(&LogConfig::default())?;
//!
//!     let contract = Contract::from_slice(include_bytes!("../contract/hello-api.json"))?;
//!
//!     let mut registry = HandlerRegistry::new();
//!     registry.register("checkHealth", |_ctx, _args| async {
//!         Ok(Responder::text("OK"))
//!     })?;
//!
//!     Server::new(ServerConfig::default(), contract, registry)
//!         .run()
//!         .await?;
//!     Ok(())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/portico/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use portico_core as core;

// Re-export router types
pub use portico_router as router;

// Re-export server types
pub use portico_server as server;

// Re-export telemetry types
pub use portico_telemetry as telemetry;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust,ignore
/// use portico::prelude::*;
/// ```
pub mod prelude {
    pub use portico_core::{
        Contract, ContractError, ParamType, ParamValue, PathArgs, RequestContext, RequestId,
    };

    pub use portico_server::{
        HandlerError, HandlerRegistry, Responder, Server, ServerConfig, ServerError,
        ShutdownSignal,
    };

    pub use portico_telemetry::{init_logging, LogConfig};
}
