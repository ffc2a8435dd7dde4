// Copyright (c) Anza Technology, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Sweep of the censorship analysis over multiple max degrees.
//!
//! Max degrees are evaluated in parallel with [`rayon`].
//! Rows are reported in the configured order.

use log::{info, warn};
use rayon::prelude::*;
use serde::Serialize;

use crate::censorship::CensorshipError;
use crate::config::AnalysisConfig;

/// Result for a single max degree.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SweepRow {
    /// Max degree of the robust soliton distribution.
    pub k: usize,
    /// Fraction of all transactions decoded at the minimal rate.
    pub decoded_fraction: f64,
    /// Minimal honest codewords per transaction.
    pub rate: f64,
}

/// Finds the minimal rate for every configured max degree.
///
/// Fails if the search fails for any of the max degrees.
pub fn run_sweep(config: &AnalysisConfig) -> Result<Vec<SweepRow>, CensorshipError> {
    let params = config.params()?;
    let model = config.model();
    config
        .k_values
        .par_iter()
        .map(|&k| {
            let outcome = model.minimal_rate(k, params).inspect_err(|err| {
                warn!("k={k}: {err}");
            })?;
            info!(
                "k={k}: rate {:.2}, tx {:.6} after {} trials",
                outcome.rate, outcome.decoded_fraction, outcome.trials
            );
            Ok(SweepRow {
                k,
                decoded_fraction: outcome.decoded_fraction,
                rate: outcome.rate,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::censorship::minimal_censorship_rate;

    #[test]
    fn rows_in_input_order() {
        let config = AnalysisConfig {
            k_values: vec![20, 1, 10],
            ..AnalysisConfig::default()
        };
        let rows = run_sweep(&config).unwrap();
        let ks: Vec<_> = rows.iter().map(|r| r.k).collect();
        assert_eq!(ks, vec![20, 1, 10]);

        for row in rows {
            let outcome = minimal_censorship_rate(row.k, 1e-6, 0.02, 0.01, 10.0).unwrap();
            assert_eq!(row.rate, outcome.rate);
            assert_eq!(row.decoded_fraction, outcome.decoded_fraction);
        }
    }

    #[test]
    fn infeasible_degree_fails_sweep() {
        let config = AnalysisConfig {
            k_values: vec![10],
            beta: 1e-6,
            max_rate: 2.0,
            ..AnalysisConfig::default()
        };
        let res = run_sweep(&config);
        assert!(matches!(res, Err(CensorshipError::InfeasibleRate { k: 10, .. })));
    }
}
