//! The segment tree backing the router.
//!
//! Each node corresponds to one path depth. Literal children are kept sorted
//! for binary search; at most one parameter child exists per node. Matching
//! prefers the literal branch and backtracks into the parameter branch when
//! the literal subtree dead-ends, so precedence is deterministic: the most
//! literal template wins.

use http::Method;

use crate::params::Params;
use crate::table::MethodTable;

#[derive(Debug, Clone, Default)]
pub(crate) struct Node {
    /// Literal children, sorted by segment.
    literal: Vec<(String, Node)>,
    /// Parameter child: binds any segment (including an empty one) to a name.
    param: Option<(String, Box<Node>)>,
    /// Methods served at this exact depth, if any template ends here.
    table: Option<MethodTable>,
}

impl Node {
    /// Inserts a template, pre-split into segments, binding `method` to
    /// `operation_id` at the terminal node.
    ///
    /// Returns true if this created a new (method, template) binding rather
    /// than replacing one.
    pub(crate) fn insert(
        &mut self,
        segments: &[TemplateSegment<'_>],
        method: Method,
        operation_id: &str,
    ) -> bool {
        match segments.split_first() {
            None => self
                .table
                .get_or_insert_with(MethodTable::new)
                .bind(method, operation_id),
            Some((TemplateSegment::Literal(lit), rest)) => {
                let idx = match self
                    .literal
                    .binary_search_by(|(s, _)| s.as_str().cmp(lit))
                {
                    Ok(idx) => idx,
                    Err(idx) => {
                        self.literal.insert(idx, ((*lit).to_string(), Node::default()));
                        idx
                    }
                };
                self.literal[idx].1.insert(rest, method, operation_id)
            }
            Some((TemplateSegment::Parameter(name), rest)) => {
                // One parameter subtree per node: templates sharing this
                // position merge here, and the binding name is the
                // first-registered one. Callers that need the name of a
                // specific template must map values positionally.
                let (_, child) = self
                    .param
                    .get_or_insert_with(|| ((*name).to_string(), Box::default()));
                child.insert(rest, method, operation_id)
            }
        }
    }

    /// Walks the tree for `segments`, binding parameters along the way.
    ///
    /// Returns the method table of the terminal node on success. On failure
    /// `params` is left as it was on entry.
    pub(crate) fn find<'a>(
        &'a self,
        segments: &[&str],
        params: &mut Params,
    ) -> Option<&'a MethodTable> {
        let Some((head, rest)) = segments.split_first() else {
            return self.table.as_ref();
        };

        // Literal branch first; an empty segment never matches a literal.
        if !head.is_empty() {
            if let Ok(idx) = self
                .literal
                .binary_search_by(|(s, _)| s.as_str().cmp(head))
            {
                let mark = params.len();
                if let Some(table) = self.literal[idx].1.find(rest, params) {
                    return Some(table);
                }
                params.truncate(mark);
            }
        }

        if let Some((name, child)) = &self.param {
            let mark = params.len();
            params.bind(name.clone(), *head);
            if let Some(table) = child.find(rest, params) {
                return Some(table);
            }
            params.truncate(mark);
        }

        None
    }
}

/// One segment of a parsed path template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TemplateSegment<'a> {
    Literal(&'a str),
    Parameter(&'a str),
}

/// Splits a template into segments. `/` yields no segments.
pub(crate) fn parse_template(template: &str) -> Vec<TemplateSegment<'_>> {
    let rest = template.strip_prefix('/').unwrap_or(template);
    if rest.is_empty() {
        return Vec::new();
    }
    rest.split('/')
        .map(|segment| {
            segment
                .strip_prefix('{')
                .and_then(|s| s.strip_suffix('}'))
                .map_or(TemplateSegment::Literal(segment), TemplateSegment::Parameter)
        })
        .collect()
}

/// Splits a request path into segments, preserving empties.
///
/// `/hello/` is two segments, the second empty; it is not normalized to
/// `/hello`. Empty segments can only be bound by parameters.
pub(crate) fn split_path(path: &str) -> Vec<&str> {
    let rest = path.strip_prefix('/').unwrap_or(path);
    if rest.is_empty() {
        return Vec::new();
    }
    rest.split('/').collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_template_segments() {
        assert_eq!(parse_template("/"), Vec::<TemplateSegment<'_>>::new());
        assert_eq!(
            parse_template("/hello/{user}"),
            vec![
                TemplateSegment::Literal("hello"),
                TemplateSegment::Parameter("user"),
            ]
        );
    }

    #[test]
    fn split_path_preserves_trailing_empty() {
        assert_eq!(split_path("/"), Vec::<&str>::new());
        assert_eq!(split_path("/hello"), vec!["hello"]);
        assert_eq!(split_path("/hello/"), vec!["hello", ""]);
        assert_eq!(split_path("/a//b"), vec!["a", "", "b"]);
    }

    #[test]
    fn literal_wins_with_backtracking() {
        // /users/me/posts and /users/{id} overlap at depth two. A request
        // for /users/me must fall back to the parameter branch because the
        // literal subtree has no terminal at that depth.
        let mut root = Node::default();
        root.insert(
            &parse_template("/users/me/posts"),
            Method::GET,
            "listMyPosts",
        );
        root.insert(&parse_template("/users/{id}"), Method::GET, "getUser");

        let mut params = Params::new();
        let table = root.find(&split_path("/users/me"), &mut params).unwrap();
        assert_eq!(table.operation(&Method::GET), Some("getUser"));
        assert_eq!(params.get("id"), Some("me"));

        let mut params = Params::new();
        let table = root
            .find(&split_path("/users/me/posts"), &mut params)
            .unwrap();
        assert_eq!(table.operation(&Method::GET), Some("listMyPosts"));
        assert!(params.is_empty());
    }

    #[test]
    fn failed_match_leaves_no_stray_bindings() {
        let mut root = Node::default();
        root.insert(
            &parse_template("/users/{id}/posts"),
            Method::GET,
            "listPosts",
        );

        let mut params = Params::new();
        assert!(root.find(&split_path("/users/42"), &mut params).is_none());
        assert!(params.is_empty());
    }

    #[test]
    fn empty_segment_only_binds_parameters() {
        let mut root = Node::default();
        root.insert(&parse_template("/hello/{user}"), Method::GET, "greet");
        root.insert(&parse_template("/health"), Method::GET, "health");

        // Parameter binds the empty trailing segment.
        let mut params = Params::new();
        assert!(root.find(&split_path("/hello/"), &mut params).is_some());
        assert_eq!(params.get("user"), Some(""));

        // Literal does not.
        let mut params = Params::new();
        assert!(root.find(&split_path("/health/"), &mut params).is_none());
    }
}
