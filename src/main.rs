// Copyright (c) Anza Technology, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use color_eyre::eyre::Context;
use ltcensor::peeling::{DEFAULT_EPSILON, DEFAULT_MAX_ROUNDS, PeelingSimulator};
use ltcensor::{AnalysisConfig, WindowParams, logging, run_sweep};

/// Analysis of LT-coded transaction dissemination under censorship.
#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// Use the full log format (with timestamps).
    #[arg(long, global = true)]
    timestamps: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, Subcommand)]
enum Command {
    /// Finds the minimal codeword rate for each max degree.
    Sweep {
        /// TOML config file, flags below override its values.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Max degrees of the robust soliton distribution.
        #[arg(short, long, num_args = 1..)]
        k: Option<Vec<usize>>,
        /// Fraction of transactions known to the adversary.
        #[arg(long)]
        alpha: Option<f64>,
        /// Tolerable fraction of undecodable codewords.
        #[arg(long)]
        beta: Option<f64>,
        /// Increment between candidate rates.
        #[arg(long)]
        rate_step: Option<f64>,
        /// Largest candidate rate.
        #[arg(long)]
        max_rate: Option<f64>,
        /// Also write the results to this CSV file.
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Peels codewords built from a sliding window of transactions.
    Window {
        /// Number of timeslots a codeword looks back.
        #[arg(short = 't', long)]
        window: usize,
        /// Probability that a transaction in the window is included.
        #[arg(short, long)]
        filter: f64,
        /// Transactions per timeslot, normalized to the codeword rate.
        #[arg(short = 'l', long)]
        arrival_rate: f64,
        /// Peeling round budget.
        #[arg(long, default_value_t = DEFAULT_MAX_ROUNDS)]
        max_rounds: usize,
    },
}

fn main() -> Result<()> {
    // enable fancy `color_eyre` error messages
    color_eyre::install()?;

    let args = Args::parse();
    if args.timestamps {
        logging::enable_logforth_stderr();
    } else {
        logging::enable_logforth();
    }

    match args.command {
        Command::Sweep {
            config,
            k,
            alpha,
            beta,
            rate_step,
            max_rate,
            csv,
        } => {
            let mut config = match config {
                Some(path) => AnalysisConfig::from_file(&path)
                    .with_context(|| format!("could not load config {}", path.display()))?,
                None => AnalysisConfig::default(),
            };
            if let Some(k) = k {
                config.k_values = k;
            }
            config.alpha = alpha.unwrap_or(config.alpha);
            config.beta = beta.unwrap_or(config.beta);
            config.rate_step = rate_step.unwrap_or(config.rate_step);
            config.max_rate = max_rate.unwrap_or(config.max_rate);
            config.validate().context("invalid parameters")?;
            sweep(&config, csv)
        }
        Command::Window {
            window,
            filter,
            arrival_rate,
            max_rounds,
        } => {
            let params = WindowParams::new(window, filter, arrival_rate)?;
            let simulator = PeelingSimulator::new(DEFAULT_EPSILON, max_rounds);
            let state = params.decode(&simulator, |round| {
                println!(
                    "[round {}] cw {:.17} tx {:.17}",
                    round.round, round.decoded_codewords, round.decoded_fraction
                );
            })?;
            println!(
                "[final] decodable cw {:.17} tx {:.17}",
                state.decoded_codewords(),
                state.decoded_fraction()
            );
            Ok(())
        }
    }
}

fn sweep(config: &AnalysisConfig, csv: Option<PathBuf>) -> Result<()> {
    let rows = run_sweep(config)?;
    for row in &rows {
        println!("{} {} {:.4}", row.k, row.decoded_fraction, row.rate);
    }
    if let Some(path) = csv {
        let mut writer = csv::Writer::from_path(&path)
            .with_context(|| format!("could not create {}", path.display()))?;
        for row in &rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
    }
    Ok(())
}
