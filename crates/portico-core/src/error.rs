//! Error types for contract loading and parameter coercion.

use thiserror::Error;

use crate::params::ParamType;

/// An invalid or internally inconsistent API description.
///
/// All variants are startup-fatal: a process that fails to load its contract
/// must not begin serving.
#[derive(Debug, Error)]
pub enum ContractError {
    /// The description bytes could not be parsed as JSON.
    #[error("failed to parse API description: {0}")]
    Parse(#[from] serde_json::Error),

    /// Two operations share the same operation id.
    #[error("duplicate operation id '{0}'")]
    DuplicateOperation(String),

    /// Two operations declare the same method and structurally identical
    /// path template, which would make dispatch ambiguous.
    #[error("duplicate route {method} {path}")]
    DuplicateRoute {
        /// HTTP method of the colliding operations.
        method: http::Method,
        /// Path template of the colliding operations.
        path: String,
    },

    /// An operation declares a token that is not a valid HTTP method.
    #[error("operation '{operation_id}': invalid HTTP method '{method}'")]
    InvalidMethod {
        /// The offending operation.
        operation_id: String,
        /// The raw method token.
        method: String,
    },

    /// A path template is malformed.
    #[error("operation '{operation_id}': invalid path '{path}': {reason}")]
    InvalidPath {
        /// The offending operation.
        operation_id: String,
        /// The raw path template.
        path: String,
        /// Why the template was rejected.
        reason: String,
    },

    /// A `{param}` segment appears in the path but no parameter of that name
    /// is declared.
    #[error("operation '{operation_id}': path parameter '{name}' has no declared type")]
    UndeclaredParameter {
        /// The offending operation.
        operation_id: String,
        /// The undeclared parameter name.
        name: String,
    },

    /// A declared parameter never appears in the path template.
    #[error("operation '{operation_id}': declared parameter '{name}' does not appear in the path")]
    UnusedParameter {
        /// The offending operation.
        operation_id: String,
        /// The unused parameter name.
        name: String,
    },

    /// The same parameter name is declared more than once.
    #[error("operation '{operation_id}': parameter '{name}' declared more than once")]
    DuplicateParameter {
        /// The offending operation.
        operation_id: String,
        /// The duplicated parameter name.
        name: String,
    },
}

/// A path segment that could not be coerced to its declared type.
///
/// Recovered per-request: the dispatcher turns this into a 400 response and
/// the process keeps serving.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("parameter '{name}': cannot interpret '{value}' as {expected}")]
pub struct CoercionError {
    /// The parameter name from the path template.
    pub name: String,
    /// The raw path segment.
    pub value: String,
    /// The type the contract declares for this parameter.
    pub expected: ParamType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coercion_error_display() {
        let err = CoercionError {
            name: "user".to_string(),
            value: "".to_string(),
            expected: ParamType::String,
        };
        assert_eq!(
            err.to_string(),
            "parameter 'user': cannot interpret '' as string"
        );
    }

    #[test]
    fn contract_error_display() {
        let err = ContractError::DuplicateOperation("getHelloUser".to_string());
        assert!(err.to_string().contains("duplicate operation id"));

        let err = ContractError::UndeclaredParameter {
            operation_id: "getHelloUser".to_string(),
            name: "user".to_string(),
        };
        assert!(err.to_string().contains("no declared type"));
    }
}
