//! The principal classifier collaborator.

use ballot_types::Principal;
use std::collections::HashSet;

/// Tells human-controlled principals apart from programmatic agents.
///
/// Chairpersons, right-grant recipients and delegation targets must all be
/// human-controlled.
pub trait PrincipalClassifier: Send + Sync {
    fn is_programmatic(&self, principal: &Principal) -> bool;
}

/// A classifier backed by a fixed registry of known programmatic principals.
///
/// Every principal not in the registry is treated as human-controlled.
#[derive(Clone, Debug, Default)]
pub struct RegistryClassifier {
    programmatic: HashSet<Principal>,
}

impl RegistryClassifier {
    pub fn new(programmatic: impl IntoIterator<Item = Principal>) -> Self {
        Self {
            programmatic: programmatic.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.programmatic.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programmatic.is_empty()
    }
}

impl PrincipalClassifier for RegistryClassifier {
    fn is_programmatic(&self, principal: &Principal) -> bool {
        self.programmatic.contains(principal)
    }
}
