//! Parse errors for the fundamental types.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypesError {
    #[error("principal must not be empty")]
    EmptyPrincipal,

    #[error("principal {0:?} contains whitespace")]
    InvalidPrincipal(String),

    #[error("invalid {kind} id: {raw:?}")]
    InvalidId { kind: &'static str, raw: String },
}
