//! Service identifiers.

use std::fmt;

use crate::error::{DiError, DiResult};

/// Sigil marking an alias identifier (`@Foo`).
pub const ALIAS_SIGIL: char = '@';
/// Sigil separating a base type from its variant name (`Foo#secondary`).
pub const VARIANT_SIGIL: char = '#';
/// Variant a base identifier redirects to once a factory registered it.
pub const DEFAULT_VARIANT: &str = "default";

/// Parsed service identifier.
///
/// Identifiers are strings naming a service. The sigil is inspected once,
/// when the identifier is parsed, so resolution only ever matches on the
/// variant.
///
/// # Identifier Forms
///
/// - **Plain**: a type name such as `Logger` or `db.Connection`
/// - **Alias**: `@Logger`, a redirect to another identifier
/// - **Named**: `DbInterface#replica`, one of several same-typed services
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::Identifier;
///
/// let plain = Identifier::parse("Logger").unwrap();
/// assert_eq!(plain, Identifier::Plain("Logger".into()));
///
/// let alias = Identifier::parse("@Logger").unwrap();
/// assert_eq!(alias, Identifier::Alias("Logger".into()));
///
/// let named = Identifier::parse("DbInterface#replica").unwrap();
/// assert_eq!(named.base(), "DbInterface");
/// assert_eq!(named.variant(), Some("replica"));
/// assert_eq!(named.to_string(), "DbInterface#replica");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identifier {
    /// Type name, resolved by construction when no definition exists
    Plain(String),
    /// Redirect to the resolution of another identifier
    Alias(String),
    /// Independently cached variant of a base type
    Named { base: String, variant: String },
}

impl Identifier {
    /// Parses an identifier string.
    ///
    /// Fails with [`DiError::NotFound`] when the string is not a valid type
    /// name with an optional sigil; such a string can never name a service.
    pub fn parse(raw: &str) -> DiResult<Self> {
        if let Some(target) = raw.strip_prefix(ALIAS_SIGIL) {
            // An alias may point at a named variant, never at another alias.
            return match Self::parse(target)? {
                Identifier::Alias(_) => Err(DiError::NotFound(raw.to_string())),
                _ => Ok(Identifier::Alias(target.to_string())),
            };
        }

        match raw.split_once(VARIANT_SIGIL) {
            Some((base, variant)) => {
                if is_type_name(base) && is_variant_name(variant) {
                    Ok(Identifier::Named {
                        base: base.to_string(),
                        variant: variant.to_string(),
                    })
                } else {
                    Err(DiError::NotFound(raw.to_string()))
                }
            }
            None if is_type_name(raw) => Ok(Identifier::Plain(raw.to_string())),
            None => Err(DiError::NotFound(raw.to_string())),
        }
    }

    /// Builds the named variant `base#variant`.
    pub fn named(base: impl Into<String>, variant: impl Into<String>) -> Self {
        Identifier::Named {
            base: base.into(),
            variant: variant.into(),
        }
    }

    /// The type name part, without sigils or variant.
    pub fn base(&self) -> &str {
        match self {
            Identifier::Plain(name) => name,
            Identifier::Alias(target) => target
                .split_once(VARIANT_SIGIL)
                .map_or(target.as_str(), |(base, _)| base),
            Identifier::Named { base, .. } => base,
        }
    }

    /// The variant name for named identifiers.
    pub fn variant(&self) -> Option<&str> {
        match self {
            Identifier::Named { variant, .. } => Some(variant),
            _ => None,
        }
    }

    /// True for plain identifiers, which may fall back to construction.
    pub fn is_plain(&self) -> bool {
        matches!(self, Identifier::Plain(_))
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Plain(name) => f.write_str(name),
            Identifier::Alias(target) => write!(f, "{}{}", ALIAS_SIGIL, target),
            Identifier::Named { base, variant } => {
                write!(f, "{}{}{}", base, VARIANT_SIGIL, variant)
            }
        }
    }
}

/// True when `name` is a syntactically valid type name.
///
/// Type names are `[A-Za-z_][A-Za-z0-9_]*` segments joined with `.`.
pub fn is_type_name(name: &str) -> bool {
    !name.is_empty() && name.split('.').all(is_segment)
}

fn is_variant_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn is_segment(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
