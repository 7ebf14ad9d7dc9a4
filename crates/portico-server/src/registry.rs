//! Handler registration.
//!
//! Handlers are plain async functions registered under the operation id they
//! implement. The registry erases their concrete types so the dispatcher can
//! invoke any handler through one call shape.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use portico_core::{PathArgs, RequestContext};
use thiserror::Error;

use crate::responder::Responder;

/// A boxed future returned by a type-erased handler.
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<Responder, HandlerError>> + Send>>;

/// A type-erased handler.
pub type Handler = Arc<dyn Fn(RequestContext, PathArgs) -> HandlerFuture + Send + Sync>;

/// An error produced inside a handler.
///
/// Handler failures are internal by definition; the dispatcher maps every
/// variant onto a 500 response and logs the detail server-side.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// A free-form failure message.
    #[error("{0}")]
    Message(String),

    /// An underlying error the handler chose to propagate.
    #[error(transparent)]
    Source(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl HandlerError {
    /// Creates a handler error from a message.
    #[must_use]
    pub fn message(msg: impl Into<String>) -> Self {
        Self::Message(msg.into())
    }
}

/// An error raised while registering handlers.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Two handlers were registered for the same operation id.
    #[error("handler already registered for operation '{0}'")]
    Duplicate(String),
}

/// Maps operation ids to handlers.
///
/// The registry is populated once at startup and handed to the server, which
/// verifies that every contract operation has a handler before binding.
///
/// # Example
///
/// ```
/// use portico_server::{HandlerRegistry, Responder};
///
/// let mut registry = HandlerRegistry::new();
/// registry
///     .register("checkHealth", |_ctx, _args| async { Ok(Responder::text("OK")) })
///     .unwrap();
/// assert!(registry.contains("checkHealth"));
/// ```
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Handler>,
}

impl HandlerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for an operation id.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Duplicate`] if the operation id already has a
    /// handler. Replacing a handler is never silent.
    pub fn register<F, Fut>(
        &mut self,
        operation_id: impl Into<String>,
        handler: F,
    ) -> Result<(), RegistryError>
    where
        F: Fn(RequestContext, PathArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Responder, HandlerError>> + Send + 'static,
    {
        let operation_id = operation_id.into();
        if self.handlers.contains_key(&operation_id) {
            return Err(RegistryError::Duplicate(operation_id));
        }
        let erased: Handler = Arc::new(move |ctx, args| Box::pin(handler(ctx, args)));
        self.handlers.insert(operation_id, erased);
        Ok(())
    }

    /// Looks up the handler for an operation id.
    #[must_use]
    pub fn lookup(&self, operation_id: &str) -> Option<&Handler> {
        self.handlers.get(operation_id)
    }

    /// Returns true if a handler is registered for the operation id.
    #[must_use]
    pub fn contains(&self, operation_id: &str) -> bool {
        self.handlers.contains_key(operation_id)
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns true if no handlers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Iterates over registered operation ids.
    pub fn operation_ids(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut ids: Vec<&str> = self.operation_ids().collect();
        ids.sort_unstable();
        f.debug_struct("HandlerRegistry")
            .field("operations", &ids)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> RequestContext {
        RequestContext::new()
    }

    #[test]
    fn register_and_lookup() {
        let mut registry = HandlerRegistry::new();
        registry
            .register("checkHealth", |_ctx, _args| async {
                Ok(Responder::text("OK"))
            })
            .unwrap();

        assert!(registry.contains("checkHealth"));
        assert!(!registry.contains("getHelloUser"));
        assert_eq!(registry.len(), 1);

        let handler = registry.lookup("checkHealth").unwrap().clone();
        let responder = tokio_test::block_on(handler(ctx(), PathArgs::new())).unwrap();
        assert_eq!(responder.body().as_ref(), b"OK");
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = HandlerRegistry::new();
        registry
            .register("checkHealth", |_ctx, _args| async {
                Ok(Responder::text("OK"))
            })
            .unwrap();

        let err = registry
            .register("checkHealth", |_ctx, _args| async {
                Ok(Responder::text("still OK"))
            })
            .unwrap_err();

        assert!(matches!(err, RegistryError::Duplicate(id) if id == "checkHealth"));

        // The original handler survives.
        let handler = registry.lookup("checkHealth").unwrap().clone();
        let responder = tokio_test::block_on(handler(ctx(), PathArgs::new())).unwrap();
        assert_eq!(responder.body().as_ref(), b"OK");
    }

    #[test]
    fn handler_receives_path_args() {
        let mut registry = HandlerRegistry::new();
        registry
            .register("getHelloUser", |_ctx, args: PathArgs| async move {
                let user = args
                    .str("user")
                    .ok_or_else(|| HandlerError::message("missing user"))?;
                Ok(Responder::text(format!("Hello {user}!")))
            })
            .unwrap();

        let mut args = PathArgs::new();
        args.insert("user", portico_core::ParamValue::String("world".to_string()));

        let handler = registry.lookup("getHelloUser").unwrap().clone();
        let responder = tokio_test::block_on(handler(ctx(), args)).unwrap();
        assert_eq!(responder.body().as_ref(), b"Hello world!");
    }
}
