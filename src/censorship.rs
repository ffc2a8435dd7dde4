// Copyright (c) Anza Technology, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Minimal codeword rate under adversarial censorship.
//!
//! There are two senders. The adversary learns an `alpha` fraction of all
//! transactions the moment they show up and pushes them to us immediately.
//! The honest sender keeps adding codewords until at most a `beta` fraction of
//! codewords fails to decode.
//!
//! Transactions known to the adversary are peeled out of every codeword before
//! honest decoding starts. Then candidate rates `step, 2*step, ...` are tried
//! until the decoded codeword mass exceeds `1 - beta`.

use log::debug;
use thiserror::Error;

use crate::distribution::{DegreeDistribution, DistributionError};
use crate::peeling::{DecodeState, PeelError, PeelingSimulator};
use crate::soliton::{RobustSoliton, SolitonError};

/// Default increment between candidate rates.
pub const DEFAULT_RATE_STEP: f64 = 0.01;
/// Default largest candidate rate.
pub const DEFAULT_MAX_RATE: f64 = 10.0;

/// Errors that may occur while searching for the minimal rate.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum CensorshipError {
    #[error("alpha={0} must lie in [0, 1)")]
    InvalidAlpha(f64),
    #[error("beta={0} must lie in (0, 1)")]
    InvalidBeta(f64),
    #[error("rate step {0} must be positive and finite")]
    InvalidRateStep(f64),
    #[error("max rate {0} must be positive and finite")]
    InvalidMaxRate(f64),
    #[error("no rate up to {max_rate} keeps codeword loss below beta={beta} for k={k}")]
    InfeasibleRate { k: usize, beta: f64, max_rate: f64 },
    #[error(transparent)]
    Soliton(#[from] SolitonError),
    #[error(transparent)]
    Distribution(#[from] DistributionError),
    #[error(transparent)]
    Peel(#[from] PeelError),
}

impl CensorshipError {
    /// Returns `true` if the error was caused by invalid input parameters.
    ///
    /// Non-convergence of the peeling decoder and infeasible rates are not domain errors.
    pub fn is_domain_error(&self) -> bool {
        !matches!(
            self,
            Self::InfeasibleRate { .. } | Self::Peel(PeelError::NonConvergence { .. })
        )
    }
}

/// Adversary and loss parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CensorshipParams {
    /// Fraction of transactions known to the adversary before coding.
    pub alpha: f64,
    /// Maximum tolerable fraction of codewords that fail to decode.
    pub beta: f64,
}

impl CensorshipParams {
    pub fn new(alpha: f64, beta: f64) -> Result<Self, CensorshipError> {
        if !(0.0..1.0).contains(&alpha) {
            return Err(CensorshipError::InvalidAlpha(alpha));
        }
        if !(beta > 0.0 && beta < 1.0) {
            return Err(CensorshipError::InvalidBeta(beta));
        }
        Ok(Self { alpha, beta })
    }
}

/// Result of a successful rate search.
#[derive(Clone, Debug, PartialEq)]
pub struct CensorshipOutcome {
    /// Max degree of the underlying robust soliton distribution.
    pub k: usize,
    /// Minimal honest codewords per transaction.
    pub rate: f64,
    /// Degree distribution after peeling at `rate`.
    pub distribution: DegreeDistribution,
    /// Fraction of all transactions decoded at `rate`.
    pub decoded_fraction: f64,
    /// Number of candidate rates tried.
    pub trials: usize,
}

/// Searches for the minimal codeword rate under censorship.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CensorshipModel {
    pub soliton: RobustSoliton,
    pub rate_step: f64,
    pub max_rate: f64,
    pub simulator: PeelingSimulator,
}

impl Default for CensorshipModel {
    fn default() -> Self {
        Self {
            soliton: RobustSoliton::default(),
            rate_step: DEFAULT_RATE_STEP,
            max_rate: DEFAULT_MAX_RATE,
            simulator: PeelingSimulator::default(),
        }
    }
}

impl CensorshipModel {
    /// Builds the robust soliton distribution for `k` and peels out the
    /// transactions known to the adversary.
    ///
    /// Each edge is independently known with probability `alpha`.
    pub fn censored_distribution(
        &self,
        k: usize,
        alpha: f64,
    ) -> Result<DegreeDistribution, CensorshipError> {
        if !(0.0..1.0).contains(&alpha) {
            return Err(CensorshipError::InvalidAlpha(alpha));
        }
        let dist = self.soliton.build(k)?;
        Ok(dist.thin(alpha)?)
    }

    /// Peels a copy of the censored distribution at the given `rate`.
    ///
    /// Transactions known to the adversary count as already decoded.
    pub fn decode_at_rate(
        &self,
        censored: &DegreeDistribution,
        alpha: f64,
        rate: f64,
    ) -> Result<DecodeState, CensorshipError> {
        Ok(self.simulator.peel(censored.clone(), alpha, rate)?)
    }

    /// Finds the smallest multiple of the rate step for which more than
    /// `1 - beta` of the codeword mass decodes.
    ///
    /// Fails with [`CensorshipError::InfeasibleRate`] if no rate up to the max rate suffices.
    pub fn minimal_rate(
        &self,
        k: usize,
        params: CensorshipParams,
    ) -> Result<CensorshipOutcome, CensorshipError> {
        let CensorshipParams { alpha, beta } = CensorshipParams::new(params.alpha, params.beta)?;
        if !(self.rate_step > 0.0 && self.rate_step.is_finite()) {
            return Err(CensorshipError::InvalidRateStep(self.rate_step));
        }
        if !(self.max_rate > 0.0 && self.max_rate.is_finite()) {
            return Err(CensorshipError::InvalidMaxRate(self.max_rate));
        }

        let censored = self.censored_distribution(k, alpha)?;
        // tolerate rounding when max rate is a multiple of the step
        let max_trials = (self.max_rate / self.rate_step + 1e-9).floor() as usize;
        for trial in 1..=max_trials {
            let rate = self.rate_step * trial as f64;
            let state = self.decode_at_rate(&censored, alpha, rate)?;
            debug!(
                "k={k} rate={rate:.4}: cw {:.6}, tx {:.6}",
                state.decoded_codewords(),
                state.decoded_fraction()
            );
            if state.decoded_codewords() > 1.0 - beta {
                let decoded_fraction = state.decoded_fraction();
                return Ok(CensorshipOutcome {
                    k,
                    rate,
                    distribution: state.into_distribution(),
                    decoded_fraction,
                    trials: trial,
                });
            }
        }
        Err(CensorshipError::InfeasibleRate {
            k,
            beta,
            max_rate: self.max_rate,
        })
    }
}

/// Finds the minimal rate for max degree `k` with the default robust soliton parameters.
pub fn minimal_censorship_rate(
    k: usize,
    alpha: f64,
    beta: f64,
    rate_step: f64,
    max_rate: f64,
) -> Result<CensorshipOutcome, CensorshipError> {
    let model = CensorshipModel {
        rate_step,
        max_rate,
        ..CensorshipModel::default()
    };
    model.minimal_rate(k, CensorshipParams::new(alpha, beta)?)
}
