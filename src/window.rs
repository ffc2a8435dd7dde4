// Copyright (c) Anza Technology, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Windowed codeword model.
//!
//! Here codewords are not drawn from a soliton distribution. Instead, each
//! codeword covers the transactions that arrived during the last `window`
//! timeslots, and keeps each of them with probability `filter`.
//! Transactions arrive at `arrival_rate` per timeslot, normalized to the
//! codeword rate, so the degree of a codeword follows
//! `Binomial(window, filter * arrival_rate)`.

use thiserror::Error;

use crate::binomial::{BinomialError, binomial_probability};
use crate::distribution::DegreeDistribution;
use crate::peeling::{DecodeState, PeelError, PeelRound, PeelingSimulator};

/// Errors from invalid window parameters.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum WindowError {
    #[error("window must span at least one timeslot")]
    EmptyWindow,
    #[error("filter probability {0} must lie in (0, 1]")]
    InvalidFilter(f64),
    #[error("arrival rate {0} must be positive and finite")]
    InvalidArrivalRate(f64),
    #[error("per-slot inclusion probability {0} must lie in (0, 1)")]
    InvalidInclusion(f64),
    #[error(transparent)]
    Binomial(#[from] BinomialError),
    #[error(transparent)]
    Peel(#[from] PeelError),
}

/// Parameters of the windowed codeword model.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WindowParams {
    /// Number of timeslots a codeword looks back.
    pub window: usize,
    /// Probability that a transaction in the window is included.
    pub filter: f64,
    /// Transactions per timeslot, normalized to the codeword rate.
    pub arrival_rate: f64,
}

impl WindowParams {
    pub fn new(window: usize, filter: f64, arrival_rate: f64) -> Result<Self, WindowError> {
        if window == 0 {
            return Err(WindowError::EmptyWindow);
        }
        if !(filter > 0.0 && filter <= 1.0) {
            return Err(WindowError::InvalidFilter(filter));
        }
        if !(arrival_rate > 0.0 && arrival_rate.is_finite()) {
            return Err(WindowError::InvalidArrivalRate(arrival_rate));
        }
        let inclusion = filter * arrival_rate;
        if inclusion >= 1.0 {
            return Err(WindowError::InvalidInclusion(inclusion));
        }
        Ok(Self {
            window,
            filter,
            arrival_rate,
        })
    }

    /// Largest degree tracked, `floor(arrival_rate * window)`.
    pub fn max_degree(&self) -> usize {
        (self.arrival_rate * self.window as f64).floor() as usize
    }

    /// Codewords per transaction.
    pub fn ratio(&self) -> f64 {
        1.0 / self.arrival_rate
    }

    /// Initial degree distribution of codewords.
    ///
    /// Degrees above [`Self::max_degree`] are cut off, so the mass may be below 1.
    pub fn distribution(&self) -> Result<DegreeDistribution, WindowError> {
        let inclusion = self.filter * self.arrival_rate;
        let window = self.window as u64;
        let mut masses = vec![0.0; self.max_degree() + 1];
        for (degree, mass) in masses.iter_mut().enumerate() {
            let degree = degree as u64;
            if degree <= window {
                *mass = binomial_probability(window, inclusion, degree)?;
            }
        }
        Ok(DegreeDistribution::from_valid_masses(masses))
    }

    /// Peels the initial distribution, calling `observer` after every round.
    pub fn decode(
        &self,
        simulator: &PeelingSimulator,
        observer: impl FnMut(&PeelRound),
    ) -> Result<DecodeState, WindowError> {
        let dist = self.distribution()?;
        Ok(simulator.peel_traced(dist, 0.0, self.ratio(), observer)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::assert_close;

    #[test]
    fn truncated_distribution() {
        let params = WindowParams::new(20, 0.5, 0.9).unwrap();
        assert_eq!(params.max_degree(), 18);
        let dist = params.distribution().unwrap();
        assert_eq!(dist.max_degree(), 18);
        assert_close(dist.mass(), 0.999997049855774, 1e-12);
        assert_close(dist[0], 0.55f64.powi(20), 1e-15);
    }

    #[test]
    fn degrees_beyond_window_are_empty() {
        let params = WindowParams::new(10, 0.3, 1.5).unwrap();
        assert_eq!(params.max_degree(), 15);
        let dist = params.distribution().unwrap();
        for degree in 11..=15 {
            assert_close(dist[degree], 0.0, 0.0);
        }
        assert_close(dist.mass(), 1.0, 1e-12);
    }

    #[test]
    fn reference_decode() {
        let params = WindowParams::new(50, 0.02, 1.0).unwrap();
        let mut rounds = 0;
        let state = params
            .decode(&PeelingSimulator::default(), |_| rounds += 1)
            .unwrap();
        assert_eq!(state.rounds(), rounds);
        assert_close(state.ratio(), 1.0, 0.0);
        assert_close(state.decoded_codewords(), 0.8908396076178887, 1e-6);
        assert_close(state.decoded_fraction(), 0.4367276638004425, 1e-6);
    }

    #[test]
    fn invalid_parameters() {
        assert_eq!(
            WindowParams::new(0, 0.5, 0.5),
            Err(WindowError::EmptyWindow)
        );
        assert_eq!(
            WindowParams::new(10, 0.0, 0.5),
            Err(WindowError::InvalidFilter(0.0))
        );
        assert_eq!(
            WindowParams::new(10, 0.5, -1.0),
            Err(WindowError::InvalidArrivalRate(-1.0))
        );
        assert_eq!(
            WindowParams::new(10, 1.0, 1.0),
            Err(WindowError::InvalidInclusion(1.0))
        );
    }
}
