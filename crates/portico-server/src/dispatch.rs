//! Request dispatch.
//!
//! The dispatcher owns the contract, the router built from it, and the
//! handler registry. Every request resolves to exactly one outcome: a
//! handler's responder, or a structured error response (404, 405, 400, 500).

use http::{Method, StatusCode};
use portico_core::contract::TemplateSegment;
use portico_core::{Contract, PathArgs, RequestContext};
use portico_router::Router;
use tracing::{debug, error, warn};

use crate::registry::HandlerRegistry;
use crate::responder::Responder;

/// Routes requests and invokes handlers.
#[derive(Debug)]
pub struct Dispatcher {
    contract: Contract,
    registry: HandlerRegistry,
    router: Router,
}

impl Dispatcher {
    /// Builds a dispatcher from a validated contract and a registry.
    ///
    /// Route registration cannot fail here: the contract has already
    /// rejected malformed templates and duplicate routes.
    #[must_use]
    pub fn new(contract: Contract, registry: HandlerRegistry) -> Self {
        let mut router = Router::new();
        for op in contract.operations() {
            router.route(op.method().clone(), op.path(), op.operation_id());
        }
        Self {
            contract,
            registry,
            router,
        }
    }

    /// Contract operations that have no registered handler.
    ///
    /// The server refuses to bind while this is non-empty.
    #[must_use]
    pub fn unhandled_operations(&self) -> Vec<&str> {
        self.contract
            .operations()
            .iter()
            .map(portico_core::Operation::operation_id)
            .filter(|id| !self.registry.contains(id))
            .collect()
    }

    /// Returns the contract this dispatcher serves.
    #[must_use]
    pub fn contract(&self) -> &Contract {
        &self.contract
    }

    /// Resolves one request to a response.
    pub async fn dispatch(&self, method: &Method, path: &str) -> Responder {
        let Some(hit) = self.router.match_route(method, path) else {
            // A path match without a method binding is a 405, not a 404.
            if let Some((table, _)) = self.router.match_path(path) {
                return Responder::error(
                    StatusCode::METHOD_NOT_ALLOWED,
                    "METHOD_NOT_ALLOWED",
                    &format!("method {method} not allowed for this path"),
                )
                .with_allow(&table.allowed());
            }
            return Responder::error(
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                "no operation matches this path",
            );
        };

        let operation_id = hit.operation_id;
        let ctx = RequestContext::new().with_operation_id(operation_id);
        debug!(
            request_id = %ctx.request_id(),
            operation_id,
            %method,
            path,
            "dispatching"
        );

        // The contract indexes every operation the router knows about, so
        // this lookup cannot fail for a well-formed dispatcher.
        let Some(operation) = self.contract.operation(operation_id) else {
            error!(operation_id, "operation missing from contract");
            return internal_error();
        };

        // Values arrive in path order. Names come from the matched
        // operation's own template: overlapping templates may declare a
        // different name at the same position, and the router binds under
        // whichever template registered that position first.
        let mut args = PathArgs::new();
        let mut raw_values = hit.params.iter().map(|(_, raw)| raw);
        for segment in operation.segments() {
            let TemplateSegment::Parameter(name) = segment else {
                continue;
            };
            let Some(raw) = raw_values.next() else {
                error!(operation_id, name = name.as_str(), "parameter missing from route match");
                return internal_error();
            };
            let Some(ty) = operation.param_type(name) else {
                error!(operation_id, name = name.as_str(), "parameter missing from contract");
                return internal_error();
            };
            match ty.coerce(name, raw) {
                Ok(value) => args.insert(name.as_str(), value),
                Err(err) => {
                    warn!(
                        request_id = %ctx.request_id(),
                        operation_id,
                        %err,
                        "parameter rejected"
                    );
                    return Responder::error(
                        StatusCode::BAD_REQUEST,
                        "PARAM_TYPE_MISMATCH",
                        &err.to_string(),
                    );
                }
            }
        }

        let Some(handler) = self.registry.lookup(operation_id) else {
            // Bind-time coverage checks make this unreachable in a served
            // dispatcher; report it rather than panic.
            error!(operation_id, "no handler registered");
            return Responder::error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "HANDLER_MISSING",
                "operation has no registered handler",
            );
        };

        let request_id = ctx.request_id();
        match handler(ctx, args).await {
            Ok(responder) => responder,
            Err(err) => {
                error!(%request_id, operation_id, %err, "handler failed");
                internal_error()
            }
        }
    }
}

fn internal_error() -> Responder {
    Responder::error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL",
        "internal server error",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::ALLOW;
    use portico_core::contract::OperationDecl;
    use portico_core::ParamType;
    use tokio_test::block_on;

    use crate::registry::HandlerError;

    fn hello_contract() -> Contract {
        Contract::builder("hello-api")
            .version("1.0.0")
            .operation(OperationDecl::new("checkHealth", Method::GET, "/health"))
            .operation(
                OperationDecl::new("getHelloUser", Method::GET, "/hello/{user}")
                    .param("user", ParamType::String),
            )
            .build()
            .unwrap()
    }

    fn hello_registry() -> HandlerRegistry {
        let mut registry = HandlerRegistry::new();
        registry
            .register("checkHealth", |_ctx, _args| async {
                Ok(Responder::text("OK"))
            })
            .unwrap();
        registry
            .register("getHelloUser", |_ctx, args: PathArgs| async move {
                let user = args
                    .str("user")
                    .ok_or_else(|| HandlerError::message("missing user"))?;
                Ok(Responder::text(format!("Hello {user}!")))
            })
            .unwrap();
        registry
    }

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(hello_contract(), hello_registry())
    }

    #[test]
    fn health_returns_ok() {
        let responder = block_on(dispatcher().dispatch(&Method::GET, "/health"));
        assert_eq!(responder.status(), StatusCode::OK);
        assert_eq!(responder.body().as_ref(), b"OK");
    }

    #[test]
    fn hello_greets_the_user() {
        let responder = block_on(dispatcher().dispatch(&Method::GET, "/hello/world"));
        assert_eq!(responder.status(), StatusCode::OK);
        assert_eq!(responder.body().as_ref(), b"Hello world!");
    }

    #[test]
    fn unknown_path_is_404() {
        let responder = block_on(dispatcher().dispatch(&Method::GET, "/nope"));
        assert_eq!(responder.status(), StatusCode::NOT_FOUND);

        let body: serde_json::Value = serde_json::from_slice(responder.body()).unwrap();
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[test]
    fn wrong_method_is_405_with_allow() {
        let response = block_on(dispatcher().dispatch(&Method::POST, "/health")).into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers().get(ALLOW).unwrap(), "GET");
    }

    #[test]
    fn empty_parameter_segment_is_400() {
        let responder = block_on(dispatcher().dispatch(&Method::GET, "/hello/"));
        assert_eq!(responder.status(), StatusCode::BAD_REQUEST);

        let body: serde_json::Value = serde_json::from_slice(responder.body()).unwrap();
        assert_eq!(body["error"]["code"], "PARAM_TYPE_MISMATCH");
    }

    #[test]
    fn non_integer_segment_is_400() {
        let contract = Contract::builder("t")
            .operation(
                OperationDecl::new("getUser", Method::GET, "/users/{id}")
                    .param("id", ParamType::Integer),
            )
            .build()
            .unwrap();
        let mut registry = HandlerRegistry::new();
        registry
            .register("getUser", |_ctx, args: PathArgs| async move {
                let id = args
                    .get("id")
                    .and_then(portico_core::ParamValue::as_i64)
                    .ok_or_else(|| HandlerError::message("missing id"))?;
                Ok(Responder::text(id.to_string()))
            })
            .unwrap();
        let dispatcher = Dispatcher::new(contract, registry);

        let responder = block_on(dispatcher.dispatch(&Method::GET, "/users/42"));
        assert_eq!(responder.status(), StatusCode::OK);
        assert_eq!(responder.body().as_ref(), b"42");

        let responder = block_on(dispatcher.dispatch(&Method::GET, "/users/abc"));
        assert_eq!(responder.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn sibling_templates_may_name_the_shared_parameter_differently() {
        // /users/{id}/posts and /users/{name}/avatar occupy the same
        // parameter position under different names; each handler must see
        // its own operation's name.
        let contract = Contract::builder("t")
            .operation(
                OperationDecl::new("listPosts", Method::GET, "/users/{id}/posts")
                    .param("id", ParamType::String),
            )
            .operation(
                OperationDecl::new("getAvatar", Method::GET, "/users/{name}/avatar")
                    .param("name", ParamType::String),
            )
            .build()
            .unwrap();

        let mut registry = HandlerRegistry::new();
        registry
            .register("listPosts", |_ctx, args: PathArgs| async move {
                let id = args
                    .str("id")
                    .ok_or_else(|| HandlerError::message("missing id"))?;
                Ok(Responder::text(format!("posts of {id}")))
            })
            .unwrap();
        registry
            .register("getAvatar", |_ctx, args: PathArgs| async move {
                let name = args
                    .str("name")
                    .ok_or_else(|| HandlerError::message("missing name"))?;
                Ok(Responder::text(format!("avatar of {name}")))
            })
            .unwrap();
        let dispatcher = Dispatcher::new(contract, registry);

        let responder = block_on(dispatcher.dispatch(&Method::GET, "/users/alice/avatar"));
        assert_eq!(responder.status(), StatusCode::OK);
        assert_eq!(responder.body().as_ref(), b"avatar of alice");

        let responder = block_on(dispatcher.dispatch(&Method::GET, "/users/alice/posts"));
        assert_eq!(responder.status(), StatusCode::OK);
        assert_eq!(responder.body().as_ref(), b"posts of alice");
    }

    #[test]
    fn handler_failure_is_500() {
        let contract = Contract::builder("t")
            .operation(OperationDecl::new("boom", Method::GET, "/boom"))
            .build()
            .unwrap();
        let mut registry = HandlerRegistry::new();
        registry
            .register("boom", |_ctx, _args| async {
                Err(HandlerError::message("it broke"))
            })
            .unwrap();
        let dispatcher = Dispatcher::new(contract, registry);

        let responder = block_on(dispatcher.dispatch(&Method::GET, "/boom"));
        assert_eq!(responder.status(), StatusCode::INTERNAL_SERVER_ERROR);

        // The failure detail stays server-side.
        let body: serde_json::Value = serde_json::from_slice(responder.body()).unwrap();
        assert_eq!(body["error"]["code"], "INTERNAL");
        assert_eq!(body["error"]["message"], "internal server error");
    }

    #[test]
    fn missing_handler_is_500_not_panic() {
        let dispatcher = Dispatcher::new(hello_contract(), HandlerRegistry::new());
        assert_eq!(
            dispatcher.unhandled_operations(),
            vec!["checkHealth", "getHelloUser"]
        );

        let responder = block_on(dispatcher.dispatch(&Method::GET, "/health"));
        assert_eq!(responder.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body: serde_json::Value = serde_json::from_slice(responder.body()).unwrap();
        assert_eq!(body["error"]["code"], "HANDLER_MISSING");
    }

    #[test]
    fn full_coverage_has_no_unhandled_operations() {
        assert!(dispatcher().unhandled_operations().is_empty());
    }
}
