pub mod balances;
pub mod demo;
pub mod import;
pub mod init;
pub mod status;

use clap::{Parser, Subcommand, ValueEnum};

use crate::balance::Mode;

#[derive(Parser)]
#[command(name = "barre", about = "Family balance CLI for class-based studios.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up barre: choose a data directory and initialize the database.
    Init {
        /// Path for barre data (default: ~/Documents/barre)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Import a CSV file into one record table.
    Import {
        /// Path to CSV file to import
        file: String,
        /// Target table: families, students, class_groups, classes,
        /// attendance, additional_fees, payments
        #[arg(long)]
        table: String,
    },
    /// Family balance report as of a cutoff date.
    Balances {
        /// Cutoff date (YYYY-MM-DD); charges, fees, and payments on or
        /// before it count
        #[arg(long = "as-of")]
        as_of: String,
        /// Calculation mode
        #[arg(long, value_enum, default_value_t = ModeArg::MonthlyFee)]
        mode: ModeArg,
    },
    /// Load sample studio data to explore barre.
    Demo,
    /// Show current database and row counts.
    Status,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ModeArg {
    /// Charge per attended class session
    FlatAttendance,
    /// Charge per calendar month of scheduled sessions, active students only
    MonthlyFee,
}

impl From<ModeArg> for Mode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::FlatAttendance => Mode::FlatAttendance,
            ModeArg::MonthlyFee => Mode::MonthlyFee,
        }
    }
}
