//! # tau-eval-cli
//!
//! Command-line front end for [`tau_eval`].
//!
//! ```bash
//! # Score a results file, print statistics, write results_partial.json
//! tau-eval score results.json
//!
//! # Equal name/argument weights, include per-action match details
//! tau-eval score results.json --equal-split -v -o scored.json
//!
//! # Write the input records back with a partial_score field
//! tau-eval score results.json --emit annotated
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod telemetry;
