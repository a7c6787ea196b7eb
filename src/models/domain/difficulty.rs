use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[serde(alias = "Basic", alias = "BASIC")]
    Basic,
    #[serde(alias = "Intermediate", alias = "INTERMEDIATE")]
    Intermediate,
    #[serde(alias = "Advanced", alias = "ADVANCED")]
    Advanced,
    #[default]
    #[serde(alias = "Mixed", alias = "MIXED")]
    Mixed,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Basic,
        Difficulty::Intermediate,
        Difficulty::Advanced,
        Difficulty::Mixed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Basic => "basic",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
            Difficulty::Mixed => "mixed",
        }
    }

    /// Whether a generated question at `level` satisfies a request made at `self`.
    /// A mixed request accepts any concrete level; a concrete request only itself.
    pub fn accepts(&self, level: Difficulty) -> bool {
        match self {
            Difficulty::Mixed => level != Difficulty::Mixed,
            requested => *requested == level,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
