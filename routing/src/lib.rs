//! Host-agnostic request routing.
//!
//! Maps a (verb, path) pair onto an action. Path patterns support static
//! segments ("config") and dynamic parameters ("project/{name}"); captured
//! parameters are returned as borrowed string slices. The router is generic
//! over the action type so the owning crate decides what a matched route
//! dispatches to.

use std::collections::HashMap;
use std::fmt;

/// Logical operation verbs understood by the router.
///
/// These are storage-style verbs, not HTTP methods; mapping transport
/// methods onto them is the host's concern.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Verb {
    Read,
    Write,
    Delete,
    List,
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Verb::Read => "read",
            Verb::Write => "write",
            Verb::Delete => "delete",
            Verb::List => "list",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
enum PathSegment {
    Static(String),
    Param(String),
}

#[derive(Debug)]
struct Path {
    segments: Vec<PathSegment>,
}

impl Path {
    /// Parses a path pattern string.
    /// Supports:
    /// - Static segments: "projects"
    /// - Dynamic parameters: "project/{name}"
    fn parse(pattern: &str) -> Self {
        let normalized = pattern.trim().trim_matches('/');

        let segments: Vec<PathSegment> = if normalized.is_empty() {
            vec![]
        } else {
            normalized
                .split('/')
                .map(|s| {
                    if let Some(stripped) = s.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                        PathSegment::Param(stripped.to_string())
                    } else {
                        PathSegment::Static(s.to_string())
                    }
                })
                .collect()
        };

        Path { segments }
    }

    /// Matches a request path against this pattern.
    /// Returns Some(params) on a full match, None otherwise.
    /// Trailing slash normalization is applied to incoming paths.
    fn matches<'a>(&self, request_path: &'a str) -> Option<HashMap<String, &'a str>> {
        let normalized = request_path.trim().trim_matches('/');

        let request_segments: Vec<&'a str> = if normalized.is_empty() {
            vec![]
        } else {
            normalized.split('/').collect()
        };

        if request_segments.len() != self.segments.len() {
            return None;
        }

        let mut params = HashMap::new();

        for (seg, req_segment) in self.segments.iter().zip(request_segments) {
            match seg {
                PathSegment::Static(s) => {
                    if req_segment != s {
                        return None;
                    }
                }
                PathSegment::Param(name) => {
                    // Double slashes would otherwise capture an empty value.
                    if req_segment.is_empty() {
                        return None;
                    }
                    params.insert(name.clone(), req_segment);
                }
            }
        }

        Some(params)
    }
}

/// A matched route: the captured path parameters and the route's action.
#[derive(Debug, PartialEq)]
pub struct RouteMatch<'a, A> {
    pub params: HashMap<String, &'a str>,
    pub action: &'a A,
}

impl<'a, A> RouteMatch<'a, A> {
    /// Returns the captured value for a named parameter, if present.
    pub fn param(&self, name: &str) -> Option<&'a str> {
        self.params.get(name).copied()
    }
}

/// Outcome of resolving a (verb, path) pair against a route set.
#[derive(Debug, PartialEq)]
pub enum Resolved<'a, A> {
    /// A route matched the path and allows the verb.
    Match(RouteMatch<'a, A>),
    /// At least one route matched the path, but none allow the verb.
    VerbNotAllowed,
    /// No route matched the path.
    NoRoute,
}

#[derive(Debug)]
pub struct Route<A> {
    path: Path,
    verbs: Vec<Verb>,
    action: A,
}

impl<A> Route<A> {
    /// Creates a route from a path pattern, the verbs it accepts, and its action.
    pub fn new(pattern: &str, verbs: &[Verb], action: A) -> Self {
        Self {
            path: Path::parse(pattern),
            verbs: verbs.to_vec(),
            action,
        }
    }
}

/// An ordered collection of routes resolved first-match-wins.
#[derive(Debug)]
pub struct RouteSet<A> {
    routes: Vec<Route<A>>,
}

impl<A> RouteSet<A> {
    pub fn new(routes: Vec<Route<A>>) -> Self {
        Self { routes }
    }

    /// Resolves a verb and request path to the first route whose pattern
    /// matches and whose verb list contains `verb`.
    pub fn resolve<'a>(&'a self, verb: Verb, request_path: &'a str) -> Resolved<'a, A> {
        let mut path_matched = false;

        for route in &self.routes {
            if let Some(params) = route.path.matches(request_path) {
                if route.verbs.contains(&verb) {
                    return Resolved::Match(RouteMatch {
                        params,
                        action: &route.action,
                    });
                }
                path_matched = true;
            }
        }

        if path_matched {
            Resolved::VerbNotAllowed
        } else {
            Resolved::NoRoute
        }
    }
}
