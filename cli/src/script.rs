//! Scenario scripts: a starting clock and a timed list of engine calls.
//!
//! ```toml
//! clock = 1700000000
//! programmatic = ["0xc0ffee"]
//!
//! [[step]]
//! at = 0
//! op = "create_session"
//! caller = "chair"
//! candidates = [1, 2]
//! start = 10000
//! end = 30000
//! ```
//!
//! `at`, `start` and `end` are seconds after `clock`.

use std::path::Path;

use anyhow::{bail, Context};
use ballot_types::{CandidateId, Principal, SessionId};
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct Script {
    /// Absolute clock value (Unix seconds) at offset 0.
    pub clock: u64,
    #[serde(default)]
    pub programmatic: Vec<Principal>,
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Step {
    /// Offset from the script clock at which the step runs.
    pub at: u64,
    #[serde(flatten)]
    pub action: Action,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Action {
    CreateSession {
        caller: Principal,
        candidates: Vec<CandidateId>,
        start: u64,
        end: u64,
    },
    AddCandidate {
        session: SessionId,
        caller: Principal,
        candidate: CandidateId,
    },
    GiveRightToVote {
        session: SessionId,
        caller: Principal,
        voters: Vec<Principal>,
    },
    Delegate {
        session: SessionId,
        from: Principal,
        to: Principal,
    },
    Vote {
        session: SessionId,
        voter: Principal,
        candidate: CandidateId,
    },
    Status {
        session: SessionId,
    },
    Winner {
        session: SessionId,
    },
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateSession { .. } => "create_session",
            Self::AddCandidate { .. } => "add_candidate",
            Self::GiveRightToVote { .. } => "give_right_to_vote",
            Self::Delegate { .. } => "delegate",
            Self::Vote { .. } => "vote",
            Self::Status { .. } => "status",
            Self::Winner { .. } => "winner",
        }
    }
}

impl Script {
    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading script {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("parsing script {}", path.display()))
    }

    /// Parse a script and check that its steps never move the clock backward.
    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        let script: Script = toml::from_str(s)?;
        let mut last = 0;
        for (index, step) in script.steps.iter().enumerate() {
            if step.at < last {
                bail!(
                    "step {index} runs at +{}s, before the previous step at +{last}s",
                    step.at
                );
            }
            last = step.at;
        }
        Ok(script)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_operation() {
        let toml = r#"
            clock = 100

            [[step]]
            at = 0
            op = "create_session"
            caller = "chair"
            candidates = [1, 2]
            start = 10
            end = 20

            [[step]]
            at = 0
            op = "add_candidate"
            session = 1
            caller = "chair"
            candidate = 3

            [[step]]
            at = 1
            op = "give_right_to_vote"
            session = 1
            caller = "chair"
            voters = ["a", "b"]

            [[step]]
            at = 10
            op = "delegate"
            session = 1
            from = "a"
            to = "b"

            [[step]]
            at = 11
            op = "vote"
            session = 1
            voter = "b"
            candidate = 2

            [[step]]
            at = 11
            op = "status"
            session = 1

            [[step]]
            at = 21
            op = "winner"
            session = 1
        "#;
        let script = Script::from_toml_str(toml).unwrap();
        let names: Vec<&str> = script.steps.iter().map(|s| s.action.name()).collect();
        assert_eq!(
            names,
            vec![
                "create_session",
                "add_candidate",
                "give_right_to_vote",
                "delegate",
                "vote",
                "status",
                "winner"
            ]
        );
        assert!(matches!(
            &script.steps[4].action,
            Action::Vote { session, candidate, .. }
                if *session == SessionId::new(1) && *candidate == CandidateId::new(2)
        ));
    }

    #[test]
    fn rejects_steps_out_of_time_order() {
        let toml = r#"
            clock = 0

            [[step]]
            at = 5
            op = "status"
            session = 1

            [[step]]
            at = 4
            op = "status"
            session = 1
        "#;
        let err = Script::from_toml_str(toml).unwrap_err();
        assert!(err.to_string().contains("step 1"));
    }

    #[test]
    fn rejects_empty_principals() {
        let toml = r#"
            clock = 0

            [[step]]
            at = 0
            op = "vote"
            session = 1
            voter = ""
            candidate = 1
        "#;
        assert!(Script::from_toml_str(toml).is_err());
    }
}
