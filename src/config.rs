// Copyright (c) Anza Technology, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration of a censorship analysis sweep.
//!
//! Configs are read from TOML files, e.g.:
//!
//! ```toml
//! k_values = [10, 20, 50, 70, 100]
//! alpha = 1e-6
//! beta = 0.02
//! c = 0.03
//! delta = 0.5
//! rate_step = 0.01
//! ```
//!
//! All keys are optional and fall back to [`AnalysisConfig::default`].
//! The keys `K_values`, `Alpha`, `Beta` and `rateStep` are accepted as aliases.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::censorship::{
    CensorshipError, CensorshipModel, CensorshipParams, DEFAULT_MAX_RATE, DEFAULT_RATE_STEP,
};
use crate::peeling::{DEFAULT_EPSILON, DEFAULT_MAX_ROUNDS, PeelingSimulator};
use crate::soliton::{DEFAULT_C, DEFAULT_DELTA, RobustSoliton};

/// Errors that may occur when loading a config.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file")]
    Io(#[from] std::io::Error),
    #[error("could not parse config")]
    Parse(#[from] toml::de::Error),
    #[error("no max degrees (k_values) configured")]
    NoDegrees,
    #[error("max degree must be at least 1")]
    ZeroDegree,
    #[error("c={0} must be positive")]
    InvalidTuning(f64),
    #[error("delta={delta} must lie in (0, {k}) for every k")]
    InvalidDelta { delta: f64, k: usize },
    #[error("epsilon={0} must be positive")]
    InvalidEpsilon(f64),
    #[error(transparent)]
    Censorship(#[from] CensorshipError),
}

/// Parameters for a sweep over max degrees.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Max degrees to evaluate, in output order.
    #[serde(alias = "K_values")]
    pub k_values: Vec<usize>,
    /// Fraction of transactions known to the adversary.
    #[serde(alias = "Alpha")]
    pub alpha: f64,
    /// Tolerable fraction of undecodable codewords.
    #[serde(alias = "Beta")]
    pub beta: f64,
    /// Robust soliton tuning constant.
    pub c: f64,
    /// Robust soliton failure bound.
    pub delta: f64,
    /// Increment between candidate rates.
    #[serde(alias = "rateStep")]
    pub rate_step: f64,
    /// Largest candidate rate.
    #[serde(alias = "maxRate")]
    pub max_rate: f64,
    /// Peeling round budget per candidate rate.
    #[serde(alias = "maxRounds")]
    pub max_rounds: usize,
    /// Decode probability below which peeling stops.
    pub epsilon: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            k_values: vec![10, 20, 50, 70, 100],
            alpha: 1e-6,
            beta: 0.02,
            c: DEFAULT_C,
            delta: DEFAULT_DELTA,
            rate_step: DEFAULT_RATE_STEP,
            max_rate: DEFAULT_MAX_RATE,
            max_rounds: DEFAULT_MAX_ROUNDS,
            epsilon: DEFAULT_EPSILON,
        }
    }
}

impl AnalysisConfig {
    /// Parses and validates a TOML config.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let s = std::fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }

    /// Checks all values, so a sweep does not fail halfway through.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.k_values.is_empty() {
            return Err(ConfigError::NoDegrees);
        }
        if self.k_values.contains(&0) {
            return Err(ConfigError::ZeroDegree);
        }
        if !(self.c > 0.0 && self.c.is_finite()) {
            return Err(ConfigError::InvalidTuning(self.c));
        }
        for &k in &self.k_values {
            if !(self.delta > 0.0 && self.delta < k as f64) {
                return Err(ConfigError::InvalidDelta {
                    delta: self.delta,
                    k,
                });
            }
        }
        if !(self.epsilon > 0.0 && self.epsilon.is_finite()) {
            return Err(ConfigError::InvalidEpsilon(self.epsilon));
        }
        self.params()?;
        if !(self.rate_step > 0.0 && self.rate_step.is_finite()) {
            return Err(CensorshipError::InvalidRateStep(self.rate_step).into());
        }
        if !(self.max_rate > 0.0 && self.max_rate.is_finite()) {
            return Err(CensorshipError::InvalidMaxRate(self.max_rate).into());
        }
        Ok(())
    }

    /// Adversary and loss parameters.
    pub fn params(&self) -> Result<CensorshipParams, CensorshipError> {
        CensorshipParams::new(self.alpha, self.beta)
    }

    /// Censorship model with the configured tuning and search bounds.
    pub fn model(&self) -> CensorshipModel {
        CensorshipModel {
            soliton: RobustSoliton::new(self.c, self.delta),
            rate_step: self.rate_step,
            max_rate: self.max_rate,
            simulator: PeelingSimulator::new(self.epsilon, self.max_rounds),
        }
    }
}
