//! The in-memory model of an API description.
//!
//! A [`Contract`] is loaded once at startup from a serialized description
//! (JSON) and is immutable afterwards. Loading validates the description:
//! anything malformed or internally inconsistent fails with
//! [`ContractError`] before any network activity can begin.
//!
//! # Description format
//!
//! ```json
//! {
//!   "name": "hello-api",
//!   "version": "1.0.0",
//!   "operations": [
//!     {
//!       "operationId": "getHelloUser",
//!       "method": "GET",
//!       "path": "/hello/{user}",
//!       "parameters": [{ "name": "user", "type": "string" }]
//!     }
//!   ]
//! }
//! ```
//!
//! # Example
//!
//! ```
//! use http::Method;
//! use portico_core::contract::{Contract, OperationDecl};
//! use portico_core::ParamType;
//!
//! let contract = Contract::builder("hello-api")
//!     .version("1.0.0")
//!     .operation(OperationDecl::new("checkHealth", Method::GET, "/health"))
//!     .operation(
//!         OperationDecl::new("getHelloUser", Method::GET, "/hello/{user}")
//!             .param("user", ParamType::String),
//!     )
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(contract.operations().len(), 2);
//! ```

use std::collections::{HashMap, HashSet};

use http::Method;
use serde::Deserialize;

use crate::error::ContractError;
use crate::params::ParamType;

/// A validated, immutable set of operations.
#[derive(Debug, Clone)]
pub struct Contract {
    name: String,
    version: String,
    operations: Vec<Operation>,
    index: HashMap<String, usize>,
}

impl Contract {
    /// Loads a contract from serialized API-description bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError`] if the bytes are not valid JSON or the
    /// description is internally inconsistent.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ContractError> {
        let raw: RawContract = serde_json::from_slice(bytes)?;

        let mut builder = Self::builder(raw.name).version(raw.version);
        for op in raw.operations {
            let method = op
                .method
                .parse::<Method>()
                .map_err(|_| ContractError::InvalidMethod {
                    operation_id: op.operation_id.clone(),
                    method: op.method.clone(),
                })?;

            let mut decl = OperationDecl::new(op.operation_id, method, op.path);
            if let Some(summary) = op.summary {
                decl = decl.summary(summary);
            }
            for param in op.parameters {
                decl = decl.param(param.name, param.ty);
            }
            builder = builder.operation(decl);
        }
        builder.build()
    }

    /// Creates a contract builder for programmatic construction.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> ContractBuilder {
        ContractBuilder::new(name)
    }

    /// Returns the service name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the contract version.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Returns all operations.
    #[must_use]
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Looks up an operation by id.
    #[must_use]
    pub fn operation(&self, operation_id: &str) -> Option<&Operation> {
        self.index.get(operation_id).map(|&i| &self.operations[i])
    }
}

/// Builder for [`Contract`].
///
/// Validation happens in [`ContractBuilder::build`], which is shared with
/// [`Contract::from_slice`].
#[derive(Debug)]
pub struct ContractBuilder {
    name: String,
    version: String,
    operations: Vec<OperationDecl>,
}

impl ContractBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: "0.0.0".to_string(),
            operations: Vec::new(),
        }
    }

    /// Sets the contract version.
    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Adds an operation declaration.
    #[must_use]
    pub fn operation(mut self, decl: OperationDecl) -> Self {
        self.operations.push(decl);
        self
    }

    /// Validates the declarations and builds the contract.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError`] on duplicate operation ids, duplicate
    /// routes, malformed path templates, or parameter declarations that do
    /// not line up with the template.
    pub fn build(self) -> Result<Contract, ContractError> {
        let mut operations = Vec::with_capacity(self.operations.len());
        let mut index = HashMap::new();
        let mut routes = HashSet::new();

        for decl in self.operations {
            let op = decl.validate()?;

            if index.contains_key(op.operation_id()) {
                return Err(ContractError::DuplicateOperation(
                    op.operation_id().to_string(),
                ));
            }

            // Two templates collide when they have the same shape, even if
            // their parameters are named differently.
            let shape: String = op
                .segments()
                .iter()
                .map(|seg| match seg {
                    TemplateSegment::Literal(lit) => format!("/{lit}"),
                    TemplateSegment::Parameter(_) => "/{}".to_string(),
                })
                .collect();
            if !routes.insert((op.method().clone(), shape)) {
                return Err(ContractError::DuplicateRoute {
                    method: op.method().clone(),
                    path: op.path().to_string(),
                });
            }

            index.insert(op.operation_id().to_string(), operations.len());
            operations.push(op);
        }

        Ok(Contract {
            name: self.name,
            version: self.version,
            operations,
            index,
        })
    }
}

/// One declared endpoint: method, path template, and typed parameters.
///
/// Immutable once the contract is built. The router borrows operations to
/// build its dispatch table; it never owns them.
#[derive(Debug, Clone)]
pub struct Operation {
    operation_id: String,
    method: Method,
    path: String,
    segments: Vec<TemplateSegment>,
    params: Vec<ParamSpec>,
    summary: Option<String>,
}

impl Operation {
    /// Returns the operation id.
    #[must_use]
    pub fn operation_id(&self) -> &str {
        &self.operation_id
    }

    /// Returns the HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the raw path template.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the parsed template segments.
    #[must_use]
    pub fn segments(&self) -> &[TemplateSegment] {
        &self.segments
    }

    /// Returns the declared parameters.
    #[must_use]
    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    /// Returns the declared type of a parameter, if any.
    #[must_use]
    pub fn param_type(&self, name: &str) -> Option<ParamType> {
        self.params
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.ty)
    }

    /// Returns the human-readable summary, if declared.
    #[must_use]
    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }
}

/// A segment of a path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSegment {
    /// A literal segment that must match exactly.
    Literal(String),
    /// A `{name}` segment that binds the actual segment to `name`.
    Parameter(String),
}

/// A declared path parameter: its name and type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    /// The parameter name, as it appears in the template.
    pub name: String,
    /// The declared type.
    pub ty: ParamType,
}

/// An unvalidated operation declaration, consumed by [`ContractBuilder`].
#[derive(Debug)]
pub struct OperationDecl {
    operation_id: String,
    method: Method,
    path: String,
    params: Vec<ParamSpec>,
    summary: Option<String>,
}

impl OperationDecl {
    /// Declares an operation.
    #[must_use]
    pub fn new(operation_id: impl Into<String>, method: Method, path: impl Into<String>) -> Self {
        Self {
            operation_id: operation_id.into(),
            method,
            path: path.into(),
            params: Vec::new(),
            summary: None,
        }
    }

    /// Declares a typed path parameter.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, ty: ParamType) -> Self {
        self.params.push(ParamSpec {
            name: name.into(),
            ty,
        });
        self
    }

    /// Sets the human-readable summary.
    #[must_use]
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    fn validate(self) -> Result<Operation, ContractError> {
        let segments = parse_template(&self.operation_id, &self.path)?;

        let mut declared = HashSet::new();
        for spec in &self.params {
            if !declared.insert(spec.name.as_str()) {
                return Err(ContractError::DuplicateParameter {
                    operation_id: self.operation_id,
                    name: spec.name.clone(),
                });
            }
        }

        let template_params: HashSet<&str> = segments
            .iter()
            .filter_map(|seg| match seg {
                TemplateSegment::Parameter(name) => Some(name.as_str()),
                TemplateSegment::Literal(_) => None,
            })
            .collect();

        for name in &template_params {
            if !declared.contains(name) {
                return Err(ContractError::UndeclaredParameter {
                    operation_id: self.operation_id,
                    name: (*name).to_string(),
                });
            }
        }
        for spec in &self.params {
            if !template_params.contains(spec.name.as_str()) {
                return Err(ContractError::UnusedParameter {
                    operation_id: self.operation_id,
                    name: spec.name.clone(),
                });
            }
        }

        Ok(Operation {
            operation_id: self.operation_id,
            method: self.method,
            path: self.path,
            segments,
            params: self.params,
            summary: self.summary,
        })
    }
}

/// Parses a path template into segments.
///
/// `/` parses to zero segments. Every other template must begin with `/` and
/// contain no empty segments; `{name}` segments become parameters.
fn parse_template(operation_id: &str, path: &str) -> Result<Vec<TemplateSegment>, ContractError> {
    let invalid = |reason: &str| ContractError::InvalidPath {
        operation_id: operation_id.to_string(),
        path: path.to_string(),
        reason: reason.to_string(),
    };

    let Some(rest) = path.strip_prefix('/') else {
        return Err(invalid("must begin with '/'"));
    };
    if rest.is_empty() {
        return Ok(Vec::new());
    }

    let mut segments = Vec::new();
    for segment in rest.split('/') {
        if segment.is_empty() {
            return Err(invalid("empty segment"));
        }
        if let Some(name) = segment
            .strip_prefix('{')
            .and_then(|s| s.strip_suffix('}'))
        {
            if name.is_empty() {
                return Err(invalid("empty parameter name"));
            }
            segments.push(TemplateSegment::Parameter(name.to_string()));
        } else if segment.contains('{') || segment.contains('}') {
            return Err(invalid("unbalanced braces in segment"));
        } else {
            segments.push(TemplateSegment::Literal(segment.to_string()));
        }
    }
    Ok(segments)
}

#[derive(Debug, Deserialize)]
struct RawContract {
    name: String,
    #[serde(default = "default_version")]
    version: String,
    #[serde(default)]
    operations: Vec<RawOperation>,
}

fn default_version() -> String {
    "0.0.0".to_string()
}

#[derive(Debug, Deserialize)]
struct RawOperation {
    #[serde(rename = "operationId")]
    operation_id: String,
    method: String,
    path: String,
    #[serde(default)]
    parameters: Vec<RawParam>,
    #[serde(default)]
    summary: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawParam {
    name: String,
    #[serde(rename = "type")]
    ty: ParamType,
}
