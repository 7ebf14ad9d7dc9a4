//! Handlers for the hello-api operations.

use portico::prelude::{HandlerError, HandlerRegistry, PathArgs, RequestContext, Responder};
use portico::server::RegistryError;

/// Builds the registry covering every contract operation.
///
/// # Errors
///
/// Returns [`RegistryError`] on a duplicate registration, which would be a
/// programming error here.
pub fn registry() -> Result<HandlerRegistry, RegistryError> {
    let mut registry = HandlerRegistry::new();
    registry.register("checkHealth", check_health)?;
    registry.register("getHelloUser", get_hello_user)?;
    Ok(registry)
}

async fn check_health(
    _ctx: RequestContext,
    _args: PathArgs,
) -> Result<Responder, HandlerError> {
    Ok(Responder::text("OK"))
}

async fn get_hello_user(
    _ctx: RequestContext,
    args: PathArgs,
) -> Result<Responder, HandlerError> {
    // Dispatch has already coerced the parameter; its absence here would
    // mean the contract and registry disagree.
    let user = args
        .str("user")
        .ok_or_else(|| HandlerError::message("user parameter missing"))?;
    Ok(Responder::text(format!("Hello {user}!")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use portico::prelude::ParamValue;

    #[tokio::test]
    async fn health_says_ok() {
        let responder = check_health(RequestContext::new(), PathArgs::new())
            .await
            .unwrap();
        assert_eq!(responder.body().as_ref(), b"OK");
    }

    #[tokio::test]
    async fn hello_greets_by_name() {
        let mut args = PathArgs::new();
        args.insert("user", ParamValue::String("world".to_string()));

        let responder = get_hello_user(RequestContext::new(), args).await.unwrap();
        assert_eq!(responder.body().as_ref(), b"Hello world!");
    }

    #[tokio::test]
    async fn hello_without_argument_fails() {
        let err = get_hello_user(RequestContext::new(), PathArgs::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("user"));
    }
}
