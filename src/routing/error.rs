//! Route registration errors.

use thiserror::Error;

/// Errors raised while building a route.
///
/// All of these surface at registration time. Resolving a request never
/// produces one: a miss is reported through the response status instead.
#[derive(Debug, Error)]
pub enum RouteError {
    /// URI template was the empty string.
    #[error("route template must not be empty")]
    EmptyTemplate,

    /// No HTTP method was given for the route.
    #[error("route {0} allows no HTTP method")]
    EmptyMethods(String),

    /// A method name could not be parsed.
    #[error("invalid HTTP method: {0}")]
    InvalidMethod(String),

    /// The same placeholder name appears twice in one template.
    #[error("placeholder {{{name}}} declared twice in {template}")]
    DuplicateParam { template: String, name: String },

    /// A placeholder with no name, such as `{:number}`.
    #[error("placeholder without a name in {0}")]
    EmptyParamName(String),

    /// The generated expression was rejected by the regex engine.
    #[error("template {template} does not compile: {source}")]
    InvalidPattern {
        template: String,
        #[source]
        source: regex::Error,
    },

    /// A named action that is not of the form `action@controller`.
    #[error("invalid action reference: {0:?} (expected action@controller)")]
    InvalidAction(String),

    /// Unknown special route code.
    #[error("unknown special route: {0}")]
    UnknownSpecial(String),
}
