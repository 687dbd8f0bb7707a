//! Partial-credit matching of expected actions against tool calls
//!
//! Each expected action greedily picks the highest-scoring tool call left in
//! the pool. A call earns `name_weight` for the right tool name plus
//! `argument_weight` scaled by argument similarity; a call to a different tool
//! earns nothing, however close its arguments are.

use serde::{Deserialize, Serialize};

use crate::criteria::{ReusePolicy, ScoringConfig};
use crate::schema::{ExpectedAction, ToolInvocation};
use crate::similarity::{SimilarityEngine, clamp_unit};

/// Scorer for expected actions against extracted tool calls
#[derive(Debug, Clone)]
pub struct PartialCreditScorer {
    config: ScoringConfig,
    engine: SimilarityEngine,
}

impl PartialCreditScorer {
    /// Create a new scorer with default config (0.4 name / 0.6 arguments, one-to-one)
    pub fn new() -> Self {
        Self::with_config(ScoringConfig::default())
    }

    /// Create with custom config
    pub fn with_config(config: ScoringConfig) -> Self {
        let engine = SimilarityEngine::with_config(config.similarity.clone());
        Self { config, engine }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Score a single candidate call for an expected action
    pub fn candidate_score(&self, expected: &ExpectedAction, candidate: &ToolInvocation) -> f64 {
        if expected.name != candidate.name {
            return 0.0;
        }

        let args = self.engine.similarity_of_maps(&expected.kwargs, &candidate.arguments);
        clamp_unit(self.config.name_weight + self.config.argument_weight * args)
    }

    /// Score a task: match every expected action and average the results.
    ///
    /// With no expected actions the task scores 1.0 when no tools were called
    /// and 0.0 otherwise.
    pub fn score_task(
        &self,
        expected: &[ExpectedAction],
        invocations: &[ToolInvocation],
    ) -> TaskScore {
        if expected.is_empty() {
            let score = if invocations.is_empty() { 1.0 } else { 0.0 };
            return TaskScore { score, matches: Vec::new(), pool_size: invocations.len() };
        }

        let mut consumed = vec![false; invocations.len()];
        let mut matches = Vec::with_capacity(expected.len());

        for action in expected {
            match self.best_candidate(action, invocations, &consumed) {
                Some((index, score)) => {
                    if self.config.reuse == ReusePolicy::OneToOne {
                        consumed[index] = true;
                    }
                    matches.push(MatchResult {
                        expected: action.clone(),
                        matched: Some(MatchedInvocation {
                            index,
                            invocation: invocations[index].clone(),
                        }),
                        score,
                    });
                }
                None => matches.push(MatchResult::unmatched(action.clone())),
            }
        }

        let total: f64 = matches.iter().map(|m| m.score).sum();
        let score = clamp_unit(total / matches.len() as f64);

        TaskScore { score, matches, pool_size: invocations.len() }
    }

    /// Highest-scoring available candidate; ties keep the earliest call
    fn best_candidate(
        &self,
        expected: &ExpectedAction,
        invocations: &[ToolInvocation],
        consumed: &[bool],
    ) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;

        for (index, candidate) in invocations.iter().enumerate() {
            if consumed[index] {
                continue;
            }
            let score = self.candidate_score(expected, candidate);
            if score > best.map_or(0.0, |(_, s)| s) {
                best = Some((index, score));
            }
        }

        best
    }
}

impl Default for PartialCreditScorer {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome for one expected action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub expected: ExpectedAction,
    /// Bound tool call, if any scored above zero
    pub matched: Option<MatchedInvocation>,
    pub score: f64,
}

impl MatchResult {
    /// Result for an expected action nothing matched
    pub fn unmatched(expected: ExpectedAction) -> Self {
        Self { expected, matched: None, score: 0.0 }
    }
}

/// A tool call bound to an expected action, with its position in the pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedInvocation {
    pub index: usize,
    #[serde(flatten)]
    pub invocation: ToolInvocation,
}

/// Task-level result of matching
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskScore {
    /// Mean of the per-action scores
    pub score: f64,
    pub matches: Vec<MatchResult>,
    /// Number of tool calls that were available for matching
    pub pool_size: usize,
}

impl TaskScore {
    /// Pool indices of tool calls no expected action was bound to
    pub fn unmatched_invocations(&self) -> Vec<usize> {
        let mut bound = vec![false; self.pool_size];
        for m in &self.matches {
            if let Some(slot) = m.matched.as_ref().and_then(|matched| bound.get_mut(matched.index)) {
                *slot = true;
            }
        }
        bound.iter().enumerate().filter(|(_, b)| !**b).map(|(i, _)| i).collect()
    }

    /// Number of expected actions bound to some call
    pub fn matched_count(&self) -> usize {
        self.matches.iter().filter(|m| m.matched.is_some()).count()
    }
}
