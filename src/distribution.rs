// Copyright (c) Anza Technology, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Codeword degree distributions.
//!
//! A [`DegreeDistribution`] holds the (possibly unnormalized) mass of
//! codewords at each degree `0..=max_degree`.
//! Degree 0 accumulates the mass of fully peeled, i.e. decoded, codewords.
//! All transformations are mass-conserving and consume the input value,
//! so a distribution is never aliased between independent computations.

use std::ops::Index;

use thiserror::Error;

use crate::binomial::{BinomialError, binomial_probability};

/// Errors that may occur when creating or transforming a distribution.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum DistributionError {
    #[error("distribution needs at least one degree")]
    Empty,
    #[error("invalid mass {mass} at degree {degree}")]
    InvalidMass { degree: usize, mass: f64 },
    #[error("thinning probability {0} is outside of [0, 1]")]
    InvalidProbability(f64),
    #[error(transparent)]
    Binomial(#[from] BinomialError),
}

/// Mass of codewords per degree.
#[derive(Clone, Debug, PartialEq)]
pub struct DegreeDistribution(Vec<f64>);

impl DegreeDistribution {
    /// Creates a distribution from raw per-degree masses.
    ///
    /// Entry `i` is the mass of codewords of degree `i`.
    /// Masses need not sum to 1, but must be finite and non-negative.
    pub fn from_masses(masses: Vec<f64>) -> Result<Self, DistributionError> {
        if masses.is_empty() {
            return Err(DistributionError::Empty);
        }
        for (degree, &mass) in masses.iter().enumerate() {
            if !mass.is_finite() || mass < 0.0 {
                return Err(DistributionError::InvalidMass { degree, mass });
            }
        }
        Ok(Self(masses))
    }

    /// Wraps masses that are finite and non-negative by construction.
    pub(crate) fn from_valid_masses(masses: Vec<f64>) -> Self {
        debug_assert!(masses.iter().all(|m| m.is_finite() && *m >= 0.0));
        Self(masses)
    }

    /// Maximum degree this distribution can represent.
    pub fn max_degree(&self) -> usize {
        self.0.len() - 1
    }

    /// Total mass over all degrees, including degree 0.
    pub fn mass(&self) -> f64 {
        self.0.iter().sum()
    }

    /// Mass of fully decoded codewords (degree 0).
    pub fn decoded_mass(&self) -> f64 {
        self.0[0]
    }

    /// Average degree, weighted by mass.
    ///
    /// Returns 0 for a distribution without any mass.
    pub fn mean_degree(&self) -> f64 {
        let mass = self.mass();
        if mass == 0.0 {
            return 0.0;
        }
        let weighted: f64 = self
            .0
            .iter()
            .enumerate()
            .map(|(degree, m)| degree as f64 * m)
            .sum();
        weighted / mass
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.0
    }

    /// Moves all degree-1 mass into degree 0.
    ///
    /// Returns the moved mass, i.e. the newly decoded codewords.
    pub(crate) fn decode_singletons(&mut self) -> f64 {
        let Some(&singletons) = self.0.get(1) else {
            return 0.0;
        };
        self.0[0] += singletons;
        self.0[1] = 0.0;
        singletons
    }

    /// Independently resolves each edge of every codeword with probability `p`.
    ///
    /// A codeword of degree `d` ends up at degree `d - k` with probability
    /// `Binomial(d, p, k)`.
    /// For `p == 0` the distribution is unchanged, for `p == 1` all mass moves to degree 0.
    pub fn thin(self, p: f64) -> Result<Self, DistributionError> {
        if p == 0.0 {
            return Ok(self);
        }
        self.thinned(p)
    }

    /// Same as [`Self::thin`], but accumulates into a fresh distribution.
    pub(crate) fn thinned(&self, p: f64) -> Result<Self, DistributionError> {
        if !(0.0..=1.0).contains(&p) {
            return Err(DistributionError::InvalidProbability(p));
        }
        let mut thinned = vec![0.0; self.0.len()];
        if p == 0.0 {
            thinned.copy_from_slice(&self.0);
            return Ok(Self(thinned));
        }
        if p == 1.0 {
            thinned[0] = self.mass();
            return Ok(Self(thinned));
        }
        for (degree, &mass) in self.0.iter().enumerate() {
            if mass == 0.0 {
                continue;
            }
            for peeled in 0..=degree {
                let prob = binomial_probability(degree as u64, p, peeled as u64)?;
                thinned[degree - peeled] += mass * prob;
            }
        }
        Ok(Self(thinned))
    }
}

impl Index<usize> for DegreeDistribution {
    type Output = f64;

    fn index(&self, degree: usize) -> &f64 {
        &self.0[degree]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{assert_close, random_distribution};

    #[test]
    fn rejects_invalid_masses() {
        assert_eq!(
            DegreeDistribution::from_masses(vec![]),
            Err(DistributionError::Empty)
        );
        let res = DegreeDistribution::from_masses(vec![0.0, -0.5, 1.5]);
        assert_eq!(
            res,
            Err(DistributionError::InvalidMass {
                degree: 1,
                mass: -0.5
            })
        );
        let res = DegreeDistribution::from_masses(vec![0.0, f64::NAN]);
        assert!(matches!(
            res,
            Err(DistributionError::InvalidMass { degree: 1, .. })
        ));
    }

    #[test]
    fn summary_statistics() {
        let dist = DegreeDistribution::from_masses(vec![0.1, 0.2, 0.3, 0.4]).unwrap();
        assert_eq!(dist.max_degree(), 3);
        assert_close(dist.mass(), 1.0, 1e-12);
        assert_close(dist.decoded_mass(), 0.1, 0.0);
        assert_close(dist.mean_degree(), 0.2 + 0.6 + 1.2, 1e-12);
        assert_close(dist[2], 0.3, 0.0);

        let empty = DegreeDistribution::from_masses(vec![0.0, 0.0]).unwrap();
        assert_close(empty.mean_degree(), 0.0, 0.0);
    }

    #[test]
    fn decode_singletons() {
        let mut dist = DegreeDistribution::from_masses(vec![0.1, 0.2, 0.7]).unwrap();
        let moved = dist.decode_singletons();
        assert_close(moved, 0.2, 0.0);
        assert_eq!(dist.as_slice(), &[0.1 + 0.2, 0.0, 0.7]);

        let mut only_decoded = DegreeDistribution::from_masses(vec![1.0]).unwrap();
        assert_close(only_decoded.decode_singletons(), 0.0, 0.0);
    }

    #[test]
    fn thin_degenerate_probabilities() {
        let dist = DegreeDistribution::from_masses(vec![0.0, 0.5, 0.25, 0.25]).unwrap();
        let same = dist.clone().thin(0.0).unwrap();
        assert_eq!(same, dist);

        let all = dist.clone().thin(1.0).unwrap();
        assert_eq!(all.as_slice(), &[1.0, 0.0, 0.0, 0.0]);

        for p in [-0.1, 1.1, f64::NAN] {
            assert!(matches!(
                dist.clone().thin(p),
                Err(DistributionError::InvalidProbability(_))
            ));
        }
    }

    #[test]
    fn thin_single_degree() {
        let dist = DegreeDistribution::from_masses(vec![0.0, 0.0, 1.0]).unwrap();
        let thinned = dist.thin(0.5).unwrap();
        assert_close(thinned[0], 0.25, 1e-12);
        assert_close(thinned[1], 0.5, 1e-12);
        assert_close(thinned[2], 0.25, 1e-12);
    }

    #[test]
    fn thin_conserves_mass() {
        let mut rng = rand::rng();
        for max_degree in [1, 5, 20, 100] {
            let dist = random_distribution(&mut rng, max_degree);
            let before = dist.mass();
            for p in [1e-6, 0.1, 0.5, 0.99] {
                let after = dist.clone().thin(p).unwrap().mass();
                assert_close(after, before, 1e-9);
            }
        }
    }
}
