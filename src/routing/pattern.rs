//! URI template compilation.
//!
//! Turns `/user/{id:number}/{name}` into `^/user/(([+-])?([0-9])+)/([^/]+)$`
//! plus the placeholder metadata needed to read the captures back.
//!
//! Each placeholder becomes one wrapping capture group around its type's
//! sub-pattern. Some sub-patterns contain groups of their own, so the
//! capture index of the n-th placeholder depends on every placeholder before
//! it. The per-type `capture_width` records how many inner groups to skip.

use std::collections::HashSet;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::routing::error::RouteError;
use crate::routing::params::{ParamValue, Params};

/// `{name}` or `{name:type}`.
static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([A-Za-z0-9_.:]+)\}").expect("placeholder token regex"));

/// Placeholder types and their sub-patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamType {
    /// Any run of non-slash characters.
    Default,
    /// `user@domain.tld` with an optional second tld.
    Email,
    /// Optional sign followed by digits, extracted as an integer.
    SignedInteger,
}

impl ParamType {
    /// Resolve a type tag. Unknown and empty tags fall back to `Default`.
    pub fn from_tag(tag: &str) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "email" | "mail" => ParamType::Email,
            "number" | "integer" | "signed_integer" => ParamType::SignedInteger,
            _ => ParamType::Default,
        }
    }

    /// Sub-pattern substituted for the placeholder, without its wrapping group.
    pub fn sub_pattern(self) -> &'static str {
        match self {
            ParamType::Default => r"[^/]+",
            ParamType::Email => r"([a-zA-Z0-9_.+-]+)@([a-zA-Z0-9-]+)\.([a-zA-Z]+)((\.([a-zA-Z]+))?)",
            ParamType::SignedInteger => r"([+-])?([0-9])+",
        }
    }

    /// Capture groups inside `sub_pattern`.
    pub fn capture_width(self) -> usize {
        match self {
            ParamType::Default => 0,
            ParamType::Email => 6,
            ParamType::SignedInteger => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ParamType::Default => "default",
            ParamType::Email => "email",
            ParamType::SignedInteger => "signed_integer",
        }
    }

    /// Convert a captured slice into its typed value.
    fn coerce(self, raw: &str) -> ParamValue {
        match self {
            ParamType::SignedInteger => ParamValue::Integer(parse_saturating(raw)),
            ParamType::Default | ParamType::Email => ParamValue::Text(raw.to_string()),
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parse `[+-]digits`, clamping to the i64 range on overflow.
fn parse_saturating(raw: &str) -> i64 {
    let (negative, digits) = match raw.as_bytes().first() {
        Some(b'-') => (true, &raw[1..]),
        Some(b'+') => (false, &raw[1..]),
        _ => (false, raw),
    };
    let mut value: i64 = 0;
    for b in digits.bytes().filter(u8::is_ascii_digit) {
        let digit = i64::from(b - b'0');
        value = if negative {
            value.saturating_mul(10).saturating_sub(digit)
        } else {
            value.saturating_mul(10).saturating_add(digit)
        };
    }
    value
}

/// A template compiled into an anchored regex plus placeholder metadata.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    matcher: Option<Regex>,
    source: String,
    names: Vec<String>,
    types: Vec<ParamType>,
    capture_widths: Vec<usize>,
}

impl CompiledPattern {
    /// Compile a normalized template.
    ///
    /// Literal text is regex-escaped; placeholders are substituted left to
    /// right. Duplicate or empty placeholder names are rejected.
    pub fn compile(template: &str) -> Result<Self, RouteError> {
        let mut source = String::with_capacity(template.len() + 16);
        let mut names: Vec<String> = Vec::new();
        let mut types = Vec::new();
        let mut capture_widths = Vec::new();
        let mut seen = HashSet::new();

        source.push('^');
        let mut last = 0;
        for caps in PLACEHOLDER.captures_iter(template) {
            let (Some(token), Some(inner)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            source.push_str(&regex::escape(&template[last..token.start()]));
            last = token.end();

            let (name, tag) = inner
                .as_str()
                .split_once(':')
                .unwrap_or((inner.as_str(), ""));
            if name.is_empty() {
                return Err(RouteError::EmptyParamName(template.to_string()));
            }
            if !seen.insert(name.to_string()) {
                return Err(RouteError::DuplicateParam {
                    template: template.to_string(),
                    name: name.to_string(),
                });
            }

            let kind = ParamType::from_tag(tag);
            source.push('(');
            source.push_str(kind.sub_pattern());
            source.push(')');

            names.push(name.to_string());
            types.push(kind);
            capture_widths.push(kind.capture_width());
        }
        source.push_str(&regex::escape(&template[last..]));
        source.push('$');

        let matcher = Regex::new(&source).map_err(|source| RouteError::InvalidPattern {
            template: template.to_string(),
            source,
        })?;

        Ok(Self {
            matcher: Some(matcher),
            source,
            names,
            types,
            capture_widths,
        })
    }

    /// Pattern for routes that never take part in URI matching.
    pub fn empty() -> Self {
        Self {
            matcher: None,
            source: String::new(),
            names: Vec::new(),
            types: Vec::new(),
            capture_widths: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.matcher.is_none()
    }

    /// The anchored expression text, empty for `CompiledPattern::empty()`.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn types(&self) -> &[ParamType] {
        &self.types
    }

    pub fn capture_widths(&self) -> &[usize] {
        &self.capture_widths
    }

    /// Match a decoded path and extract typed parameters.
    ///
    /// Placeholder `i` lives in group `i + skip`; `skip` starts at 1 (group
    /// 0 is the whole match) and grows by the width of every placeholder
    /// already read.
    pub fn extract(&self, path: &str) -> Option<Params> {
        let matcher = self.matcher.as_ref()?;
        let caps = matcher.captures(path)?;

        let mut params = Params::new();
        let mut skip = 1;
        for (i, name) in self.names.iter().enumerate() {
            let raw = caps.get(i + skip).map(|m| m.as_str()).unwrap_or_default();
            params.insert(name.as_str(), self.types[i].coerce(raw));
            skip += self.capture_widths[i];
        }
        Some(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_template() {
        let pattern = CompiledPattern::compile("/about").unwrap();
        assert_eq!(pattern.source(), "^/about$");
        assert!(pattern.names().is_empty());
        assert!(pattern.extract("/about").unwrap().is_empty());
        assert!(pattern.extract("/about/").is_none());
        assert!(pattern.extract("/aboutx").is_none());
    }

    #[test]
    fn test_literals_are_escaped() {
        let pattern = CompiledPattern::compile("/v1.0/file(1)").unwrap();
        assert!(pattern.extract("/v1.0/file(1)").is_some());
        assert!(pattern.extract("/v1x0/file(1)").is_none());
    }

    #[test]
    fn test_metadata_lists_are_parallel() {
        let pattern = CompiledPattern::compile("/{a}/{b:email}/{c:number}").unwrap();
        assert_eq!(pattern.names(), &["a", "b", "c"]);
        assert_eq!(
            pattern.types(),
            &[ParamType::Default, ParamType::Email, ParamType::SignedInteger]
        );
        assert_eq!(pattern.capture_widths(), &[0, 6, 2]);
    }

    #[test]
    fn test_capture_widths_agree_with_regex_engine() {
        for kind in [ParamType::Default, ParamType::Email, ParamType::SignedInteger] {
            let re = Regex::new(kind.sub_pattern()).unwrap();
            assert_eq!(re.captures_len() - 1, kind.capture_width(), "{}", kind);
        }
    }

    #[test]
    fn test_type_tags() {
        assert_eq!(ParamType::from_tag("MAIL"), ParamType::Email);
        assert_eq!(ParamType::from_tag("Integer"), ParamType::SignedInteger);
        assert_eq!(ParamType::from_tag("number"), ParamType::SignedInteger);
        assert_eq!(ParamType::from_tag("uuid"), ParamType::Default);
        assert_eq!(ParamType::from_tag(""), ParamType::Default);
    }

    #[test]
    fn test_groups_after_email_are_read_correctly() {
        let pattern = CompiledPattern::compile("/mail/{to:email}/{id:number}/{tag}").unwrap();
        let params = pattern.extract("/mail/john.doe@mail.example.co/-15/urgent").unwrap();
        assert_eq!(params.get_str("to"), Some("john.doe@mail.example.co"));
        assert_eq!(params.get_i64("id"), Some(-15));
        assert_eq!(params.get_str("tag"), Some("urgent"));
    }

    #[test]
    fn test_signed_integer_values() {
        let pattern = CompiledPattern::compile("/n/{v:signed_integer}").unwrap();
        assert_eq!(pattern.extract("/n/+0042").unwrap().get_i64("v"), Some(42));
        assert_eq!(pattern.extract("/n/-7").unwrap().get_i64("v"), Some(-7));
        assert_eq!(
            pattern.extract("/n/99999999999999999999").unwrap().get_i64("v"),
            Some(i64::MAX)
        );
        assert!(pattern.extract("/n/4a").is_none());
        assert!(pattern.extract("/n/-").is_none());
    }

    #[test]
    fn test_integers_are_ascii_digits_only() {
        let pattern = CompiledPattern::compile("/user/{id:number}").unwrap();
        assert!(pattern.extract("/user/\u{0664}\u{0662}").is_none());
        assert!(pattern.extract("/user/4\u{0662}").is_none());
        assert!(pattern.extract("/user/\u{FF14}\u{FF12}").is_none());
        assert_eq!(pattern.extract("/user/42").unwrap().get_i64("id"), Some(42));
    }

    #[test]
    fn test_extra_colons_fall_back_to_default() {
        let pattern = CompiledPattern::compile("/x/{id:number:strict}").unwrap();
        assert_eq!(pattern.types(), &[ParamType::Default]);
        assert_eq!(pattern.extract("/x/abc").unwrap().get_str("id"), Some("abc"));
    }

    #[test]
    fn test_unterminated_brace_is_literal() {
        let pattern = CompiledPattern::compile("/odd/{name").unwrap();
        assert!(pattern.names().is_empty());
        assert!(pattern.extract("/odd/{name").is_some());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let err = CompiledPattern::compile("/{id}/x/{id:number}").unwrap_err();
        assert!(matches!(err, RouteError::DuplicateParam { ref name, .. } if name == "id"));
    }

    #[test]
    fn test_empty_name_rejected() {
        assert!(matches!(
            CompiledPattern::compile("/x/{:number}"),
            Err(RouteError::EmptyParamName(_))
        ));
    }

    #[test]
    fn test_empty_pattern_never_matches() {
        let pattern = CompiledPattern::empty();
        assert!(pattern.is_empty());
        assert_eq!(pattern.source(), "");
        assert!(pattern.extract("/").is_none());
    }

    #[test]
    fn test_compilation_is_deterministic() {
        let a = CompiledPattern::compile("/user/{id:number}/{addr:mail}").unwrap();
        let b = CompiledPattern::compile("/user/{id:number}/{addr:mail}").unwrap();
        assert_eq!(a.source(), b.source());
        assert_eq!(a.extract("/user/1/a@b.io"), b.extract("/user/1/a@b.io"));
    }
}
