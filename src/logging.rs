// Copyright (c) Anza Technology, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Logging setup for the analysis binary.
//!
//! Log records go to stderr, so result rows on stdout stay machine-readable.
//! The default filter `ltcensor=info` can be overridden with `RUST_LOG`.

use logforth::color::LevelColor;
use logforth::filter::EnvFilter;
use logforth::{Layout, append};

const DEFAULT_FILTER: &str = "ltcensor=info";

#[derive(Clone, Copy, Debug)]
struct MinimalLogforthLayout;

impl Layout for MinimalLogforthLayout {
    fn format(
        &self,
        record: &log::Record,
        _: &[Box<dyn logforth::Diagnostic>],
    ) -> anyhow::Result<Vec<u8>> {
        let colors = LevelColor::default();
        let level = colors.colorize_record_level(false, record.level());
        let message = record.args();
        Ok(format!("{level:>5} {message}").into_bytes())
    }
}

/// Logs compact `LEVEL message` lines to stderr.
pub fn enable_logforth() {
    enable_logforth_append(append::Stderr::default().with_layout(MinimalLogforthLayout));
}

/// Logs with the default `logforth` layout, including timestamps, to stderr.
pub fn enable_logforth_stderr() {
    enable_logforth_append(append::Stderr::default());
}

fn enable_logforth_append<A: logforth::Append>(to_append: A) {
    let filter = EnvFilter::from_default_env_or(DEFAULT_FILTER);
    logforth::builder()
        .dispatch(|d| d.filter(filter).append(to_append))
        .apply();
}
