// Copyright (c) Anza Technology, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Censorship analysis for LT-coded transaction dissemination.
//!
//! Transactions are disseminated as codewords of a rateless erasure code.
//! An adversary learns an `alpha` fraction of transactions before they are coded.
//! This crate predicts, analytically, the minimal number of codewords per
//! transaction that still lets honest peers decode all but a `beta` fraction
//! of codewords, and which fraction of transactions decodes at that rate.
//!
//! The analysis consists of:
//! - [`soliton`]: robust soliton degree distributions,
//! - [`binomial`]: numerically stable binomial probabilities,
//! - [`peeling`]: density evolution of the peeling decoder,
//! - [`censorship`]: adversarial pre-peeling and the minimal rate search,
//! - [`sweep`]: evaluation over multiple max degrees.
//!
//! Everything is computed in the limit of infinitely many transactions and
//! codewords. No actual codewords are encoded or decoded.
//!
//! # Examples
//!
//! ```
//! use ltcensor::minimal_censorship_rate;
//!
//! let outcome = minimal_censorship_rate(10, 1e-6, 0.02, 0.01, 10.0).unwrap();
//! assert!(outcome.distribution.decoded_mass() > 0.98);
//! ```

#![deny(rustdoc::broken_intra_doc_links)]

pub mod binomial;
pub mod censorship;
pub mod config;
pub mod distribution;
pub mod logging;
pub mod peeling;
pub mod soliton;
pub mod sweep;
#[cfg(test)]
pub mod test_utils;
pub mod window;

pub use self::binomial::binomial_probability;
pub use self::censorship::{
    CensorshipError, CensorshipModel, CensorshipOutcome, CensorshipParams,
    minimal_censorship_rate,
};
pub use self::config::AnalysisConfig;
pub use self::distribution::DegreeDistribution;
pub use self::peeling::{DecodeState, PeelingSimulator, peel};
pub use self::soliton::{RobustSoliton, build_robust_soliton};
pub use self::sweep::{SweepRow, run_sweep};
pub use self::window::WindowParams;
