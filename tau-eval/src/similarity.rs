//! Structural similarity between argument values
//!
//! The comparison is driven by the expected value: keys and elements that only
//! appear on the actual side are never penalized, and the result is not
//! symmetric.

use crate::criteria::{ScalarCoercion, SimilarityConfig};
use crate::value::{ArgMap, ArgValue};

/// Recursive similarity scorer over [`ArgValue`] trees
#[derive(Debug, Clone, Default)]
pub struct SimilarityEngine {
    config: SimilarityConfig,
}

impl SimilarityEngine {
    /// Create an engine with the default (lenient) configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom config
    pub fn with_config(config: SimilarityConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SimilarityConfig {
        &self.config
    }

    /// Score how well `actual` reproduces `expected`, from 0.0 to 1.0.
    ///
    /// - equal values (after scalar normalization) score 1.0
    /// - values of different structural kind score 0.0
    /// - mappings average the per-key similarity over the expected keys
    /// - sequences average, per expected element, the best similarity found
    ///   anywhere in the actual sequence
    /// - unequal scalars score 0.0
    pub fn similarity(&self, expected: &ArgValue, actual: &ArgValue) -> f64 {
        clamp_unit(self.compare(expected, actual))
    }

    /// Similarity of two argument mappings
    pub fn similarity_of_maps(&self, expected: &ArgMap, actual: &ArgMap) -> f64 {
        if self.maps_equivalent(expected, actual) {
            return 1.0;
        }
        clamp_unit(self.compare_mappings(expected, actual))
    }

    fn compare(&self, expected: &ArgValue, actual: &ArgValue) -> f64 {
        if self.equivalent(expected, actual) {
            return 1.0;
        }

        match (expected, actual) {
            (ArgValue::Mapping(exp), ArgValue::Mapping(act)) => self.compare_mappings(exp, act),
            (ArgValue::Sequence(exp), ArgValue::Sequence(act)) => self.compare_sequences(exp, act),
            // Unequal scalars and structural mismatches earn nothing
            _ => 0.0,
        }
    }

    fn compare_mappings(&self, expected: &ArgMap, actual: &ArgMap) -> f64 {
        if expected.is_empty() {
            return 1.0;
        }

        let total: f64 = expected
            .iter()
            .map(|(key, exp)| actual.get(key).map_or(0.0, |act| self.compare(exp, act)))
            .sum();

        total / expected.len() as f64
    }

    fn compare_sequences(&self, expected: &[ArgValue], actual: &[ArgValue]) -> f64 {
        if expected.is_empty() {
            return 1.0;
        }

        let total: f64 = expected
            .iter()
            .map(|exp| actual.iter().map(|act| self.compare(exp, act)).fold(0.0, f64::max))
            .sum();

        total / expected.len() as f64
    }

    /// Deep equality under the configured scalar normalization
    fn equivalent(&self, expected: &ArgValue, actual: &ArgValue) -> bool {
        match (expected, actual) {
            (ArgValue::Mapping(exp), ArgValue::Mapping(act)) => self.maps_equivalent(exp, act),
            (ArgValue::Sequence(exp), ArgValue::Sequence(act)) => {
                exp.len() == act.len()
                    && exp.iter().zip(act).all(|(e, a)| self.equivalent(e, a))
            }
            (ArgValue::Mapping(_) | ArgValue::Sequence(_), _)
            | (_, ArgValue::Mapping(_) | ArgValue::Sequence(_)) => false,
            _ => self.scalars_equal(expected, actual),
        }
    }

    fn maps_equivalent(&self, expected: &ArgMap, actual: &ArgMap) -> bool {
        expected.len() == actual.len()
            && expected
                .iter()
                .all(|(key, exp)| actual.get(key).is_some_and(|act| self.equivalent(exp, act)))
    }

    fn scalars_equal(&self, expected: &ArgValue, actual: &ArgValue) -> bool {
        match (expected, actual) {
            (ArgValue::Null, ArgValue::Null) => true,
            (ArgValue::Bool(e), ArgValue::Bool(a)) => e == a,
            (ArgValue::Number(e), ArgValue::Number(a)) => numbers_equal(*e, *a),
            (ArgValue::Text(e), ArgValue::Text(a)) => e == a,
            (ArgValue::Number(n), ArgValue::Text(s)) | (ArgValue::Text(s), ArgValue::Number(n)) => {
                match self.config.scalar_coercion {
                    ScalarCoercion::Strict => false,
                    ScalarCoercion::Lenient => {
                        s.trim().parse::<f64>().is_ok_and(|parsed| numbers_equal(parsed, *n))
                    }
                }
            }
            _ => false,
        }
    }
}

fn numbers_equal(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

/// Clamp a score into [0, 1], mapping NaN to 0
pub(crate) fn clamp_unit(score: f64) -> f64 {
    if score.is_nan() { 0.0 } else { score.clamp(0.0, 1.0) }
}
