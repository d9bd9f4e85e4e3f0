//! Nullable principal classifier: programmatic principals flagged by hand.

use ballot_engine::PrincipalClassifier;
use ballot_types::Principal;
use std::collections::HashSet;
use std::sync::Mutex;

/// A classifier for testing.
///
/// Every principal is human-controlled until flagged with
/// [`NullClassifier::mark_programmatic`].
#[derive(Default)]
pub struct NullClassifier {
    programmatic: Mutex<HashSet<Principal>>,
}

impl NullClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_programmatic(&self, principal: &Principal) {
        self.programmatic.lock().unwrap().insert(principal.clone());
    }

    pub fn mark_human(&self, principal: &Principal) {
        self.programmatic.lock().unwrap().remove(principal);
    }
}

impl PrincipalClassifier for NullClassifier {
    fn is_programmatic(&self, principal: &Principal) -> bool {
        self.programmatic.lock().unwrap().contains(principal)
    }
}
