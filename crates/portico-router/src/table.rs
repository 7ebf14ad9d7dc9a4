//! Per-path method table.

use http::Method;
use smallvec::SmallVec;

/// Maps HTTP methods to operation ids for one matched path.
///
/// Most paths carry one or two methods, so entries are stored inline as
/// (method, operation id) pairs rather than one field per method.
#[derive(Debug, Clone, Default)]
pub struct MethodTable {
    entries: SmallVec<[(Method, String); 2]>,
}

impl MethodTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `method` to `operation_id`, replacing any existing binding.
    ///
    /// Returns true if the method was not bound before.
    pub fn bind(&mut self, method: Method, operation_id: impl Into<String>) -> bool {
        let operation_id = operation_id.into();
        if let Some(entry) = self.entries.iter_mut().find(|(m, _)| *m == method) {
            entry.1 = operation_id;
            false
        } else {
            self.entries.push((method, operation_id));
            true
        }
    }

    /// Returns the operation id bound to `method`.
    #[must_use]
    pub fn operation(&self, method: &Method) -> Option<&str> {
        self.entries
            .iter()
            .find(|(m, _)| m == method)
            .map(|(_, op)| op.as_str())
    }

    /// Returns the methods this path accepts, for `Allow` headers.
    #[must_use]
    pub fn allowed(&self) -> Vec<Method> {
        self.entries.iter().map(|(m, _)| m.clone()).collect()
    }

    /// Returns true if no methods are bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
