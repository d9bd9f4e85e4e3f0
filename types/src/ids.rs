//! Session and candidate identifiers.

use crate::error::TypesError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a ballot session.
///
/// Assigned sequentially by the engine starting at 1; zero never names a
/// session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(u64);

impl SessionId {
    pub const ZERO: Self = Self(0);

    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(&self) -> u64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// The id following this one, or `None` on overflow.
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim_start_matches('#')
            .parse::<u64>()
            .map(Self)
            .map_err(|_| TypesError::InvalidId {
                kind: "session",
                raw: s.to_string(),
            })
    }
}

/// Caller-supplied identifier of a candidate, unique within its session.
///
/// Zero is reserved and rejected by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateId(u64);

impl CandidateId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(&self) -> u64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CandidateId {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>()
            .map(Self)
            .map_err(|_| TypesError::InvalidId {
                kind: "candidate",
                raw: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_id_sequence() {
        assert!(SessionId::ZERO.is_zero());
        assert_eq!(SessionId::ZERO.next(), Some(SessionId::new(1)));
        assert_eq!(SessionId::new(u64::MAX).next(), None);
    }

    #[test]
    fn session_id_parses_with_or_without_hash() {
        assert_eq!("#7".parse::<SessionId>().unwrap(), SessionId::new(7));
        assert_eq!("7".parse::<SessionId>().unwrap(), SessionId::new(7));
        assert!("seven".parse::<SessionId>().is_err());
    }

    #[test]
    fn candidate_id_serializes_as_bare_integer() {
        let json = serde_json::to_string(&CandidateId::new(42)).unwrap();
        assert_eq!(json, "42");
    }
}
