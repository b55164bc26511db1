//! Identifiers of the three trained model iterations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum ModelVariant {
    /// k-NN baseline on the four base features.
    #[default]
    #[serde(rename = "iteration_0")]
    Iteration0,
    /// Random forest on the same features.
    #[serde(rename = "iteration_1")]
    Iteration1,
    /// Tuned k-NN on the extended feature set.
    #[serde(rename = "iteration_2")]
    Iteration2,
}

impl ModelVariant {
    pub const ALL: [ModelVariant; 3] = [
        ModelVariant::Iteration0,
        ModelVariant::Iteration1,
        ModelVariant::Iteration2,
    ];

    /// Identifier, also the artifact file prefix.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Iteration0 => "iteration_0",
            Self::Iteration1 => "iteration_1",
            Self::Iteration2 => "iteration_2",
        }
    }
}

impl fmt::Display for ModelVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelVariant {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s.trim())
            .ok_or_else(|| CoreError::NotFound {
                entity: "model variant",
                id: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_identifiers() {
        assert_eq!("iteration_1".parse::<ModelVariant>().unwrap(), ModelVariant::Iteration1);
        assert!("iteration_3".parse::<ModelVariant>().is_err());
    }

    #[test]
    fn serde_uses_identifier() {
        assert_eq!(
            serde_json::to_string(&ModelVariant::Iteration2).unwrap(),
            "\"iteration_2\""
        );
    }

    #[test]
    fn baseline_is_default() {
        assert_eq!(ModelVariant::default(), ModelVariant::Iteration0);
    }
}
