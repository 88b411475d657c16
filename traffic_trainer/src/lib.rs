//! Command line for the traffic volume model.
//!
//! ```bash
//! # Fit the pipeline and write the five artifacts
//! traffic_trainer train --csv traffic_volume.csv --models-dir models
//!
//! # Write a textual summary of the raw dataset
//! traffic_trainer explore --csv traffic_volume.csv --out dataset_summary.txt
//! ```

pub mod commands;
pub mod config;

use clap::{Parser, Subcommand};

pub use commands::{ExploreCommand, TrainCommand};

#[derive(Parser, Debug)]
#[command(name = "traffic_trainer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the random forest and persist the pipeline artifacts
    Train(TrainCommand),

    /// Summarize the raw dataset
    Explore(ExploreCommand),
}
