//! Allowed HTTP method sets.

use std::fmt;

use axum::http::Method;

use crate::routing::error::RouteError;

/// Name of the wildcard entry accepted in method lists.
pub const ANY: &str = "ANY";

/// The methods a route answers to.
///
/// Either the wildcard (every verb) or an explicit non-empty list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodSet {
    Any,
    Only(Vec<Method>),
}

impl MethodSet {
    /// Wildcard set, matches every method.
    pub fn any() -> Self {
        MethodSet::Any
    }

    /// An explicit list. Fails if the list is empty.
    pub fn only<I>(methods: I) -> Result<Self, RouteError>
    where
        I: IntoIterator<Item = Method>,
    {
        let mut list: Vec<Method> = Vec::new();
        for method in methods {
            if !list.contains(&method) {
                list.push(method);
            }
        }
        if list.is_empty() {
            return Err(RouteError::EmptyMethods(String::from("<unnamed>")));
        }
        Ok(MethodSet::Only(list))
    }

    /// Parse method names as they appear in configuration files.
    ///
    /// Names are case-insensitive; `ANY` anywhere in the list turns the
    /// whole set into the wildcard.
    pub fn parse<S: AsRef<str>>(names: &[S]) -> Result<Self, RouteError> {
        let mut methods = Vec::with_capacity(names.len());
        for name in names {
            let upper = name.as_ref().trim().to_ascii_uppercase();
            if upper == ANY {
                return Ok(MethodSet::Any);
            }
            let method = Method::from_bytes(upper.as_bytes())
                .map_err(|_| RouteError::InvalidMethod(name.as_ref().to_string()))?;
            methods.push(method);
        }
        Self::only(methods)
    }

    /// Whether a request with `method` passes this gate.
    pub fn allows(&self, method: &Method) -> bool {
        match self {
            MethodSet::Any => true,
            MethodSet::Only(list) => list.contains(method),
        }
    }

    pub fn is_any(&self) -> bool {
        matches!(self, MethodSet::Any)
    }

    /// Method names, `ANY` for the wildcard.
    pub fn names(&self) -> Vec<String> {
        match self {
            MethodSet::Any => vec![ANY.to_string()],
            MethodSet::Only(list) => list.iter().map(|m| m.as_str().to_string()).collect(),
        }
    }
}

impl Default for MethodSet {
    /// GET, DELETE, POST, PUT and HEAD.
    fn default() -> Self {
        MethodSet::Only(vec![
            Method::GET,
            Method::DELETE,
            Method::POST,
            Method::PUT,
            Method::HEAD,
        ])
    }
}

impl From<Method> for MethodSet {
    fn from(method: Method) -> Self {
        MethodSet::Only(vec![method])
    }
}

impl fmt::Display for MethodSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.names().join("|"))
    }
}
