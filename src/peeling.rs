// Copyright (c) Anza Technology, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Density evolution of the LT peeling decoder.
//!
//! Instead of simulating a concrete random coding graph, this tracks how the
//! degree distribution of the remaining codewords evolves as transactions get
//! decoded, in the limit of infinitely many codewords and transactions with a
//! fixed codeword-to-transaction ratio.
//!
//! Each round:
//! 1. All degree-1 codewords are decoded, moving their mass to degree 0.
//! 2. The newly decoded codewords are thrown like balls into the bins of
//!    still-undecoded transactions. The limiting fraction of non-empty bins is
//!    the probability `p` that an undecoded transaction is decoded this round.
//! 3. If `p` drops below `epsilon` the decoder is stuck and peeling stops.
//! 4. Otherwise each edge of every codeword is resolved with probability `p`.
//!
//! # Examples
//!
//! ```
//! use ltcensor::peeling::peel;
//! use ltcensor::soliton::build_robust_soliton;
//!
//! let dist = build_robust_soliton(10, 0.03, 0.5).unwrap();
//! let state = peel(dist, 0.0, 1.5).unwrap();
//! assert!(state.decoded_codewords() > 0.99);
//! ```

use log::{debug, trace};
use thiserror::Error;

use crate::binomial::frac_nonempty_bins_inf;
use crate::distribution::{DegreeDistribution, DistributionError};

/// Decode probability below which peeling is considered stuck.
pub const DEFAULT_EPSILON: f64 = 1e-12;
/// Maximum number of peeling rounds before giving up.
pub const DEFAULT_MAX_ROUNDS: usize = 10_000;

/// Errors that may occur during peeling.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum PeelError {
    #[error("codeword to transaction ratio {0} must be positive and finite")]
    InvalidRatio(f64),
    #[error("decoded transaction fraction {0} is outside of [0, 1]")]
    InvalidDecodedFraction(f64),
    #[error("peeling did not settle within {rounds} rounds")]
    NonConvergence { rounds: usize },
    #[error(transparent)]
    Distribution(#[from] DistributionError),
}

/// Progress made by a single peeling round.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PeelRound {
    /// Number of this round, starting at 1.
    pub round: usize,
    /// Codeword mass that had degree 1 at the start of this round.
    pub newly_decoded_codewords: f64,
    /// Total codeword mass decoded so far.
    pub decoded_codewords: f64,
    /// Probability that a previously undecoded transaction got decoded in this round.
    pub decode_probability: f64,
    /// Fraction of all transactions decoded in this round.
    pub newly_decoded_fraction: f64,
    /// Fraction of all transactions decoded so far.
    pub decoded_fraction: f64,
}

/// Current state of the peeling decoder.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodeState {
    distribution: DegreeDistribution,
    decoded_fraction: f64,
    ratio: f64,
    rounds: usize,
}

impl DecodeState {
    /// Creates the initial decoder state.
    ///
    /// `decoded_fraction` is the fraction of transactions already known,
    /// `ratio` is the number of codewords per transaction.
    pub fn new(
        distribution: DegreeDistribution,
        decoded_fraction: f64,
        ratio: f64,
    ) -> Result<Self, PeelError> {
        if !(0.0..=1.0).contains(&decoded_fraction) {
            return Err(PeelError::InvalidDecodedFraction(decoded_fraction));
        }
        if !(ratio > 0.0 && ratio.is_finite()) {
            return Err(PeelError::InvalidRatio(ratio));
        }
        Ok(Self {
            distribution,
            decoded_fraction,
            ratio,
            rounds: 0,
        })
    }

    pub fn distribution(&self) -> &DegreeDistribution {
        &self.distribution
    }

    pub fn into_distribution(self) -> DegreeDistribution {
        self.distribution
    }

    /// Fraction of all transactions decoded so far.
    pub fn decoded_fraction(&self) -> f64 {
        self.decoded_fraction
    }

    /// Codeword mass decoded so far, i.e. the mass at degree 0.
    pub fn decoded_codewords(&self) -> f64 {
        self.distribution.decoded_mass()
    }

    /// Codewords per transaction.
    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    /// Number of rounds that made progress.
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    /// Runs a single peeling round.
    ///
    /// Returns `None` if the decoder is stuck, i.e. the decode probability is below `epsilon`.
    /// Even then, the remaining degree-1 codewords have been moved to degree 0.
    pub fn step(&mut self, epsilon: f64) -> Result<Option<PeelRound>, PeelError> {
        let newly_decoded_codewords = self.distribution.decode_singletons();
        let undecoded = 1.0 - self.decoded_fraction;
        let decode_probability = if newly_decoded_codewords <= 0.0 {
            0.0
        } else if undecoded <= 0.0 {
            1.0
        } else {
            // transaction bins per newly decoded codeword
            frac_nonempty_bins_inf(undecoded / (self.ratio * newly_decoded_codewords))
        };
        if decode_probability < epsilon {
            return Ok(None);
        }

        self.distribution = self.distribution.thinned(decode_probability)?;
        let newly_decoded_fraction = decode_probability * undecoded.max(0.0);
        self.decoded_fraction = (self.decoded_fraction + newly_decoded_fraction).min(1.0);
        self.rounds += 1;

        Ok(Some(PeelRound {
            round: self.rounds,
            newly_decoded_codewords,
            decoded_codewords: self.distribution.decoded_mass(),
            decode_probability,
            newly_decoded_fraction,
            decoded_fraction: self.decoded_fraction,
        }))
    }
}

/// Runs the peeling decoder until it gets stuck.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PeelingSimulator {
    /// Decode probability below which peeling stops.
    pub epsilon: f64,
    /// Maximum number of rounds that may make progress.
    pub max_rounds: usize,
}

impl Default for PeelingSimulator {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }
}

impl PeelingSimulator {
    pub fn new(epsilon: f64, max_rounds: usize) -> Self {
        Self {
            epsilon,
            max_rounds,
        }
    }

    /// Peels `distribution` until no more progress is made.
    ///
    /// Returns the final state, whose degree-0 mass is the fraction of decoded codewords.
    /// Fails with [`PeelError::NonConvergence`] if peeling does not settle in time.
    pub fn peel(
        &self,
        distribution: DegreeDistribution,
        decoded_fraction: f64,
        ratio: f64,
    ) -> Result<DecodeState, PeelError> {
        self.peel_traced(distribution, decoded_fraction, ratio, |_| {})
    }

    /// Same as [`Self::peel`], but calls `observer` after every round that made progress.
    pub fn peel_traced(
        &self,
        distribution: DegreeDistribution,
        decoded_fraction: f64,
        ratio: f64,
        mut observer: impl FnMut(&PeelRound),
    ) -> Result<DecodeState, PeelError> {
        let mut state = DecodeState::new(distribution, decoded_fraction, ratio)?;
        while let Some(round) = state.step(self.epsilon)? {
            trace!(
                "round {}: p={:.3e}, cw {:.12}, tx {:.12}",
                round.round, round.decode_probability, round.decoded_codewords, round.decoded_fraction
            );
            observer(&round);
            if round.round > self.max_rounds {
                return Err(PeelError::NonConvergence {
                    rounds: self.max_rounds,
                });
            }
        }
        debug!(
            "peeling at ratio {ratio:.4} settled after {} rounds: cw {:.6}, tx {:.6}",
            state.rounds(),
            state.decoded_codewords(),
            state.decoded_fraction()
        );
        Ok(state)
    }
}

/// Peels `distribution` with the default [`PeelingSimulator`].
pub fn peel(
    distribution: DegreeDistribution,
    decoded_fraction: f64,
    ratio: f64,
) -> Result<DecodeState, PeelError> {
    PeelingSimulator::default().peel(distribution, decoded_fraction, ratio)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::soliton::{build_robust_soliton, ideal_soliton};
    use crate::test_utils::{assert_close, random_distribution};

    #[test]
    fn only_singletons() {
        // every codeword decodes one transaction, so decoded txs are 1 - exp(-ratio)
        for ratio in [0.1, 0.5, 1.0, 2.0] {
            let dist = DegreeDistribution::from_masses(vec![0.0, 1.0]).unwrap();
            let state = peel(dist, 0.0, ratio).unwrap();
            assert_eq!(state.rounds(), 1);
            assert_close(state.decoded_codewords(), 1.0, 1e-12);
            assert_close(state.decoded_fraction(), 1.0 - (-ratio).exp(), 1e-12);
        }
    }

    #[test]
    fn robust_soliton_reference_values() {
        let cases = [
            (0.8, 0.43499041789225296, 0.3313430438792217),
            (1.0, 0.9281326633701814, 0.8505092156075451),
            (1.5, 0.9990769718970671, 0.9857753516356271),
        ];
        for (ratio, codewords, txs) in cases {
            let dist = build_robust_soliton(10, 0.03, 0.5).unwrap();
            let state = peel(dist, 0.0, ratio).unwrap();
            assert_close(state.decoded_codewords(), codewords, 1e-6);
            assert_close(state.decoded_fraction(), txs, 1e-6);
        }
    }

    #[test]
    fn single_round_conserves_mass() {
        let mut rng = rand::rng();
        for max_degree in [1, 2, 10, 50] {
            for decoded in [0.0, 0.3, 0.9] {
                for ratio in [0.5, 1.0, 3.0] {
                    let dist = random_distribution(&mut rng, max_degree);
                    let before = dist.mass();
                    let mut state = DecodeState::new(dist, decoded, ratio).unwrap();
                    state.step(DEFAULT_EPSILON).unwrap();
                    assert_close(state.distribution().mass(), before, 1e-9);
                }
            }
        }
    }

    #[test]
    fn every_round_conserves_mass() {
        let dist = build_robust_soliton(50, 0.03, 0.5).unwrap();
        let mut rounds = 0;
        let mut last_decoded = 0.0;
        let simulator = PeelingSimulator::default();
        let state = simulator
            .peel_traced(dist, 0.0, 1.2, |round| {
                rounds += 1;
                assert_eq!(round.round, rounds);
                assert!(round.decoded_fraction >= last_decoded);
                assert!(round.decode_probability >= DEFAULT_EPSILON);
                last_decoded = round.decoded_fraction;
            })
            .unwrap();
        assert_eq!(state.rounds(), rounds);
        assert_close(state.distribution().mass(), 1.0, 1e-9);
        assert_close(state.decoded_fraction(), last_decoded, 0.0);
        assert_close(state.distribution()[1], 0.0, 0.0);
    }

    #[test]
    fn monotone_in_ratio() {
        let base = build_robust_soliton(20, 0.03, 0.5).unwrap();
        let mut last = (0.0, 0.0);
        for i in 1..=40 {
            let ratio = 0.1 * i as f64;
            let state = peel(base.clone(), 0.0, ratio).unwrap();
            let current = (state.decoded_fraction(), state.decoded_codewords());
            assert!(current.0 + 1e-9 >= last.0, "ratio {ratio}: {current:?} < {last:?}");
            assert!(current.1 + 1e-9 >= last.1, "ratio {ratio}: {current:?} < {last:?}");
            last = current;
        }
    }

    #[test]
    fn no_singletons_makes_no_progress() {
        let dist = DegreeDistribution::from_masses(vec![0.0, 0.0, 0.5, 0.5]).unwrap();
        let state = peel(dist.clone(), 0.2, 1.0).unwrap();
        assert_eq!(state.rounds(), 0);
        assert_eq!(state.distribution(), &dist);
        assert_close(state.decoded_fraction(), 0.2, 0.0);
    }

    #[test]
    fn everything_already_decoded() {
        let dist = DegreeDistribution::from_masses(vec![0.0, 0.5, 0.5]).unwrap();
        let state = peel(dist, 1.0, 1.0).unwrap();
        assert_close(state.decoded_codewords(), 1.0, 1e-12);
        assert_close(state.decoded_fraction(), 1.0, 0.0);
    }

    #[test]
    fn known_transactions_help() {
        let dist = ideal_soliton(20).unwrap();
        let without = peel(dist.clone(), 0.0, 0.9).unwrap();
        let with = peel(dist, 0.5, 0.9).unwrap();
        assert!(with.decoded_fraction() > without.decoded_fraction());
    }

    #[test]
    fn round_budget_exceeded() {
        let dist = build_robust_soliton(10, 0.03, 0.5).unwrap();
        let simulator = PeelingSimulator::new(DEFAULT_EPSILON, 3);
        let res = simulator.peel(dist, 0.0, 1.0);
        assert_eq!(res, Err(PeelError::NonConvergence { rounds: 3 }));
    }

    #[test]
    fn invalid_inputs() {
        let dist = ideal_soliton(5).unwrap();
        for ratio in [0.0, -1.0, f64::INFINITY, f64::NAN] {
            let res = peel(dist.clone(), 0.0, ratio);
            assert!(matches!(res, Err(PeelError::InvalidRatio(_))));
        }
        for decoded in [-0.1, 1.1, f64::NAN] {
            let res = peel(dist.clone(), decoded, 1.0);
            assert!(matches!(res, Err(PeelError::InvalidDecodedFraction(_))));
        }
    }
}
