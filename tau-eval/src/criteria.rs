//! Scoring criteria definitions
//!
//! Weighting, pool-reuse policy and scalar normalization for partial-credit
//! scoring. All of these are plain serde structs so they can be loaded from a
//! config file and overridden from the command line.

use serde::{Deserialize, Serialize};

use crate::error::{EvalError, Result};

/// Default weight credited for calling the right tool
pub const DEFAULT_NAME_WEIGHT: f64 = 0.4;

/// Default weight credited for argument similarity
pub const DEFAULT_ARGUMENT_WEIGHT: f64 = 0.6;

const WEIGHT_TOLERANCE: f64 = 1e-9;

/// Configuration for matching expected actions against tool calls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Credit for an exact tool-name match
    pub name_weight: f64,
    /// Credit scaled by argument similarity; only granted when the name matches
    pub argument_weight: f64,
    /// Whether one tool call may satisfy several expected actions
    pub reuse: ReusePolicy,
    /// Argument comparison settings
    pub similarity: SimilarityConfig,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            name_weight: DEFAULT_NAME_WEIGHT,
            argument_weight: DEFAULT_ARGUMENT_WEIGHT,
            reuse: ReusePolicy::default(),
            similarity: SimilarityConfig::default(),
        }
    }
}

impl ScoringConfig {
    /// 50/50 split between name and arguments
    pub fn equal_split() -> Self {
        Self::default().with_name_weight(0.5)
    }

    /// Set the name weight; the argument weight becomes its complement
    pub fn with_name_weight(mut self, weight: f64) -> Self {
        self.name_weight = weight;
        self.argument_weight = 1.0 - weight;
        self
    }

    /// Set the pool reuse policy
    pub fn with_reuse(mut self, reuse: ReusePolicy) -> Self {
        self.reuse = reuse;
        self
    }

    /// Set scalar coercion
    pub fn with_coercion(mut self, coercion: ScalarCoercion) -> Self {
        self.similarity.scalar_coercion = coercion;
        self
    }

    /// Check that both weights are finite, non-negative and sum to one
    pub fn validate(&self) -> Result<()> {
        let weights = [("name_weight", self.name_weight), ("argument_weight", self.argument_weight)];
        for (label, weight) in weights {
            if !weight.is_finite() || weight < 0.0 {
                return Err(EvalError::ConfigError(format!(
                    "{} must be a non-negative number, got {}",
                    label, weight
                )));
            }
        }

        let sum = self.name_weight + self.argument_weight;
        if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(EvalError::ConfigError(format!(
                "name_weight + argument_weight must equal 1.0, got {}",
                sum
            )));
        }

        Ok(())
    }
}

/// Whether tool calls are consumed once matched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReusePolicy {
    /// A matched call leaves the pool; each call backs at most one expected action
    #[default]
    OneToOne,
    /// Every expected action may pick from the full pool
    AllowReuse,
}

/// Configuration for argument similarity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityConfig {
    /// How scalars of different JSON types are compared
    pub scalar_coercion: ScalarCoercion,
}

/// Scalar normalization modes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarCoercion {
    /// Same JSON type and equal value
    Strict,
    /// Numeric-looking strings equal the number they spell
    #[default]
    Lenient,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ScoringConfig::default();
        assert_eq!(config.name_weight, 0.4);
        assert_eq!(config.argument_weight, 0.6);
        assert_eq!(config.reuse, ReusePolicy::OneToOne);
        assert_eq!(config.similarity.scalar_coercion, ScalarCoercion::Lenient);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_equal_split() {
        let config = ScoringConfig::equal_split();
        assert_eq!(config.name_weight, 0.5);
        assert_eq!(config.argument_weight, 0.5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_weights() {
        let config = ScoringConfig { name_weight: 0.7, ..Default::default() };
        assert!(matches!(config.validate(), Err(EvalError::ConfigError(_))));

        let config = ScoringConfig::default().with_name_weight(1.5);
        assert!(config.validate().is_err());

        let config = ScoringConfig { name_weight: f64::NAN, ..Default::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_deserialize() {
        let config: ScoringConfig = serde_json::from_str(r#"{"reuse": "allow_reuse"}"#).unwrap();
        assert_eq!(config.reuse, ReusePolicy::AllowReuse);
        assert_eq!(config.name_weight, DEFAULT_NAME_WEIGHT);

        let config: ScoringConfig =
            serde_json::from_str(r#"{"similarity": {"scalar_coercion": "strict"}}"#).unwrap();
        assert_eq!(config.similarity.scalar_coercion, ScalarCoercion::Strict);
    }
}
