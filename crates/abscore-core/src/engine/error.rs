use crate::core::models::ids::DesignKey;
use thiserror::Error;

/// The same `(team, challenge, design)` was appended twice. The first record stays.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("Design '{key}' is already in the score table")]
pub struct DuplicateDesignError {
    pub key: DesignKey,
}

/// Errors that abort a whole scoring run.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Design '{key}' names challenge '{}', which has no weight profile", .key.challenge)]
    UnknownChallenge { key: DesignKey },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_challenge_names_design_and_challenge() {
        let err = EngineError::UnknownChallenge {
            key: DesignKey::new("alpha", "Challenge7", "d1"),
        };
        assert_eq!(
            err.to_string(),
            "Design 'alpha/challenge7/d1' names challenge 'challenge7', which has no weight profile"
        );
    }
}
