use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! config_key {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            pub fn new(raw: impl AsRef<str>) -> Self {
                Self(raw.as_ref().trim().to_ascii_lowercase())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(raw: String) -> Self {
                Self::new(raw)
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                Self::new(raw)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

config_key!(
    /// Identifier of a scorable metric (e.g. `ipsae`, `dockq`).
    MetricId
);
config_key!(
    /// Identifier of a metric category (e.g. `binding`, `developability`).
    CategoryId
);
config_key!(
    /// Identifier of a challenge variant (e.g. `challenge1`).
    ChallengeId
);

/// Identity of one design inside a batch.
///
/// Team and design identifiers keep their original case; the challenge is a
/// configuration key and is normalized like the other ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DesignKey {
    pub team: String,
    pub challenge: ChallengeId,
    pub design: String,
}

impl DesignKey {
    pub fn new(
        team: impl Into<String>,
        challenge: impl Into<ChallengeId>,
        design: impl Into<String>,
    ) -> Self {
        Self {
            team: team.into().trim().to_string(),
            challenge: challenge.into(),
            design: design.into().trim().to_string(),
        }
    }
}

impl fmt::Display for DesignKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.team, self.challenge, self.design)
    }
}
