//! Principal identifiers: the actors that chair sessions, vote and delegate.

use crate::error::TypesError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An opaque identifier for an actor, either human-controlled or programmatic.
///
/// Which of the two a principal is cannot be told from the identifier itself;
/// that question is answered by a principal classifier at the engine seam.
/// The empty identifier is the *null* principal and is never a valid actor.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Principal(String);

impl Principal {
    /// Parse a principal from a raw identifier.
    ///
    /// Rejects empty identifiers and identifiers containing whitespace.
    pub fn parse(raw: impl Into<String>) -> Result<Self, TypesError> {
        let s = raw.into();
        if s.is_empty() {
            return Err(TypesError::EmptyPrincipal);
        }
        if s.chars().any(char::is_whitespace) {
            return Err(TypesError::InvalidPrincipal(s));
        }
        Ok(Self(s))
    }

    /// The null principal.
    pub fn null() -> Self {
        Self(String::new())
    }

    pub fn is_null(&self) -> bool {
        self.0.is_empty()
    }

    /// Return the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "<null>")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl FromStr for Principal {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Principal {
    type Error = TypesError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl From<Principal> for String {
    fn from(p: Principal) -> Self {
        p.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_plain_identifiers() {
        let p = Principal::parse("0xa11ce").unwrap();
        assert_eq!(p.as_str(), "0xa11ce");
        assert!(!p.is_null());
    }

    #[test]
    fn parse_rejects_empty_and_whitespace() {
        assert_eq!(Principal::parse(""), Err(TypesError::EmptyPrincipal));
        assert!(matches!(
            Principal::parse("bob smith"),
            Err(TypesError::InvalidPrincipal(_))
        ));
    }

    #[test]
    fn null_principal_is_default() {
        assert!(Principal::default().is_null());
        assert_eq!(Principal::null().to_string(), "<null>");
    }

    #[test]
    fn deserialization_goes_through_parse() {
        let ok: Principal = serde_json::from_str("\"carol\"").unwrap();
        assert_eq!(ok.as_str(), "carol");
        assert!(serde_json::from_str::<Principal>("\"\"").is_err());
    }
}
