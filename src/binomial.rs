// Copyright (c) Anza Technology, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Numerically stable binomial point probabilities.
//!
//! Probabilities are evaluated in log-space via the log-gamma function,
//! so large trial counts never overflow a factorial.
//!
//! # Examples
//!
//! ```
//! use ltcensor::binomial::binomial_probability;
//!
//! let p = binomial_probability(10, 0.5, 5).unwrap();
//! assert!((p - 0.24609375).abs() < 1e-12);
//! ```

use statrs::function::gamma::ln_gamma;
use thiserror::Error;

/// Errors from evaluating a binomial point probability.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum BinomialError {
    #[error("success probability {0} is not strictly between 0 and 1")]
    InvalidProbability(f64),
    #[error("{succ} successes out of only {n} trials")]
    SuccessesExceedTrials { n: u64, succ: u64 },
}

/// Returns `P(X = succ)` for `X ~ Binomial(n, p)`.
///
/// `p` must lie strictly inside `(0, 1)`, otherwise `ln(p)` or `ln(1 - p)`
/// is undefined and [`BinomialError::InvalidProbability`] is returned.
pub fn binomial_probability(n: u64, p: f64, succ: u64) -> Result<f64, BinomialError> {
    Ok(ln_binomial_probability(n, p, succ)?.exp())
}

/// Natural logarithm of [`binomial_probability`].
pub fn ln_binomial_probability(n: u64, p: f64, succ: u64) -> Result<f64, BinomialError> {
    // also rejects NaN
    if !(p > 0.0 && p < 1.0) {
        return Err(BinomialError::InvalidProbability(p));
    }
    if succ > n {
        return Err(BinomialError::SuccessesExceedTrials { n, succ });
    }
    let fails = n - succ;
    let ln_coefficient =
        ln_gamma(n as f64 + 1.0) - ln_gamma(fails as f64 + 1.0) - ln_gamma(succ as f64 + 1.0);
    Ok(ln_coefficient + succ as f64 * p.ln() + fails as f64 * (-p).ln_1p())
}

/// Limiting fraction of non-empty bins when throwing `m` balls into `frac * m`
/// bins uniformly at random, as `m` goes to infinity.
///
/// Equals `1 - exp(-1 / frac)`.
/// Returns 1 for `frac == 0` and 0 for `frac == inf`.
pub fn frac_nonempty_bins_inf(frac: f64) -> f64 {
    -(-1.0 / frac).exp_m1()
}
