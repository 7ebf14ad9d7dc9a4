//! Path template matching for Portico.
//!
//! The router maps (method, path) pairs onto operation ids declared by a
//! contract, extracting named path parameters as raw strings along the way.
//! It knows nothing about handlers or parameter types; the server crate
//! builds a router from the contract and coerces the extracted values.
//!
//! # Precedence
//!
//! Matching is deterministic: at every depth a literal segment beats a
//! parameter segment, with backtracking into the parameter branch when the
//! literal subtree cannot complete the match. Request paths are split
//! without normalization, so `/hello/` is a two-segment path whose second
//! segment is empty - an empty segment can be bound by a parameter but never
//! matches a literal.
//!
//! # Example
//!
//! ```
//! use http::Method;
//! use portico_router::Router;
//!
//! let mut router = Router::new();
//! router.route(Method::GET, "/health", "checkHealth");
//! router.route(Method::GET, "/hello/{user}", "getHelloUser");
//!
//! let hit = router.match_route(&Method::GET, "/hello/world").unwrap();
//! assert_eq!(hit.operation_id, "getHelloUser");
//! assert_eq!(hit.params.get("user"), Some("world"));
//! ```

#![doc(html_root_url = "https://docs.rs/portico-router/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod params;
mod table;
mod tree;

use http::Method;

pub use params::Params;
pub use table::MethodTable;

use tree::Node;

/// A successful route match.
#[derive(Debug, Clone)]
pub struct RouteMatch<'a> {
    /// The operation id bound to the matched template and method.
    pub operation_id: &'a str,
    /// Raw path parameters bound during the match, in path order.
    ///
    /// When overlapping templates share a parameter position under different
    /// names, values are bound under the first-registered name; consumers
    /// that need a specific template's names should take the values in order
    /// and rename against that template.
    pub params: Params,
}

/// Matches request paths against registered templates.
#[derive(Debug, Clone, Default)]
pub struct Router {
    root: Node,
    routes: usize,
}

impl Router {
    /// Creates an empty router.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a template for one method.
    ///
    /// The template is assumed well-formed; contract loading has already
    /// validated it. Registering the same (method, template) twice replaces
    /// the earlier binding without growing [`Router::len`].
    pub fn route(&mut self, method: Method, template: &str, operation_id: &str) {
        let segments = tree::parse_template(template);
        if self.root.insert(&segments, method, operation_id) {
            self.routes += 1;
        }
    }

    /// Matches a method and path, returning the operation id and parameters.
    ///
    /// Returns `None` both when no template matches the path and when a
    /// template matches but has no binding for the method; use
    /// [`Router::match_path`] to tell the two apart.
    #[must_use]
    pub fn match_route(&self, method: &Method, path: &str) -> Option<RouteMatch<'_>> {
        let (table, params) = self.match_path(path)?;
        let operation_id = table.operation(method)?;
        Some(RouteMatch {
            operation_id,
            params,
        })
    }

    /// Matches a path irrespective of method.
    ///
    /// Used by the dispatcher to produce 405 responses with an `Allow`
    /// header when the path is known but the method is not.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<(&MethodTable, Params)> {
        let segments = tree::split_path(path);
        let mut params = Params::new();
        let table = self.root.find(&segments, &mut params)?;
        Some((table, params))
    }

    /// Number of registered routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes
    }

    /// Returns true if no routes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes == 0
    }
}
