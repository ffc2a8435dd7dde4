// Copyright (c) Anza Technology, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Utility functions for tests.

use rand::Rng;

use crate::distribution::DegreeDistribution;

/// Asserts that `actual` is within `tolerance` of `expected`.
#[track_caller]
pub fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {expected} (+/- {tolerance}), got {actual}"
    );
}

/// Generates a random normalized degree distribution with max degree `max_degree`.
///
/// Degree 0 carries no mass, like a freshly built distribution.
pub fn random_distribution(rng: &mut impl Rng, max_degree: usize) -> DegreeDistribution {
    let mut masses = vec![0.0; max_degree + 1];
    for mass in masses.iter_mut().skip(1) {
        *mass = rng.random::<f64>();
    }
    let total: f64 = masses.iter().sum();
    for mass in &mut masses {
        *mass /= total;
    }
    DegreeDistribution::from_masses(masses).unwrap()
}
