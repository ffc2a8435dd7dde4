// Copyright (c) Anza Technology, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Soliton degree distributions for LT codes.
//!
//! The ideal soliton distribution has a single parameter `k` and
//! - `rho(1) = 1/k`,
//! - `rho(i) = 1/(i(i-1))` for `i = 2..=k`.
//!
//! The robust soliton distribution adds a spike `tau` below and at the threshold
//! degree `k/R`, where `R = c * ln(k/delta) * sqrt(k)` is the expected ripple size.
//! This keeps the peeling decoder from running out of degree-1 codewords.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::distribution::DegreeDistribution;

/// Default tuning constant `c` of the robust soliton distribution.
pub const DEFAULT_C: f64 = 0.03;
/// Default failure bound `delta` of the robust soliton distribution.
pub const DEFAULT_DELTA: f64 = 0.5;

/// Errors from invalid soliton parameters.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum SolitonError {
    #[error("max degree must be at least 1")]
    ZeroDegree,
    #[error("tuning constant c={0} must be positive")]
    InvalidTuning(f64),
    #[error("delta={delta} must lie in (0, {k})")]
    InvalidDelta { delta: f64, k: usize },
}

/// Tuning parameters of the robust soliton distribution.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RobustSoliton {
    /// Tuning constant scaling the ripple size.
    pub c: f64,
    /// Target decoding failure bound.
    pub delta: f64,
}

impl Default for RobustSoliton {
    fn default() -> Self {
        Self {
            c: DEFAULT_C,
            delta: DEFAULT_DELTA,
        }
    }
}

impl RobustSoliton {
    pub fn new(c: f64, delta: f64) -> Self {
        Self { c, delta }
    }

    /// Expected ripple size `R = c * ln(k/delta) * sqrt(k)`.
    pub fn ripple(&self, k: usize) -> f64 {
        let k = k as f64;
        self.c * (k / self.delta).ln() * k.sqrt()
    }

    /// Degree `round(k/R)` at which the spike is placed.
    pub fn threshold_degree(&self, k: usize) -> usize {
        (k as f64 / self.ripple(k)).round() as usize
    }

    /// Builds the normalized robust soliton distribution with max degree `k`.
    ///
    /// The result has length `k + 1`, with no mass at degree 0.
    pub fn build(&self, k: usize) -> Result<DegreeDistribution, SolitonError> {
        self.validate(k)?;
        let ripple = self.ripple(k);
        let threshold = self.threshold_degree(k);
        let kf = k as f64;

        let mut weights = vec![0.0; k + 1];
        for (i, weight) in weights.iter_mut().enumerate().skip(1) {
            let spike = if i < threshold {
                ripple / (i as f64 * kf)
            } else if i == threshold {
                // negative for ripples below delta, which would not be a distribution
                (ripple * (ripple.ln() - self.delta.ln()) / kf).max(0.0)
            } else {
                0.0
            };
            *weight = rho(k, i) + spike;
        }
        Ok(normalized(weights))
    }

    fn validate(&self, k: usize) -> Result<(), SolitonError> {
        if k == 0 {
            return Err(SolitonError::ZeroDegree);
        }
        if !(self.c > 0.0 && self.c.is_finite()) {
            return Err(SolitonError::InvalidTuning(self.c));
        }
        if !(self.delta > 0.0 && self.delta < k as f64) {
            return Err(SolitonError::InvalidDelta {
                delta: self.delta,
                k,
            });
        }
        Ok(())
    }
}

/// Builds the robust soliton distribution for max degree `k`.
///
/// Shorthand for [`RobustSoliton::build`].
pub fn build_robust_soliton(
    k: usize,
    c: f64,
    delta: f64,
) -> Result<DegreeDistribution, SolitonError> {
    RobustSoliton::new(c, delta).build(k)
}

/// Builds the ideal soliton distribution for max degree `k`.
pub fn ideal_soliton(k: usize) -> Result<DegreeDistribution, SolitonError> {
    if k == 0 {
        return Err(SolitonError::ZeroDegree);
    }
    let weights = (0..=k)
        .map(|i| if i == 0 { 0.0 } else { rho(k, i) })
        .collect();
    Ok(normalized(weights))
}

fn rho(k: usize, i: usize) -> f64 {
    if i == 1 {
        1.0 / k as f64
    } else {
        1.0 / (i as f64 * (i - 1) as f64)
    }
}

fn normalized(mut weights: Vec<f64>) -> DegreeDistribution {
    let total: f64 = weights.iter().sum();
    for w in &mut weights {
        *w /= total;
    }
    DegreeDistribution::from_valid_masses(weights)
}
