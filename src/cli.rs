use clap::{Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "pitchwatch", version, about = "Sports pitch health monitor")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to config.yaml
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override SQLite data directory
    #[arg(short, long)]
    pub data_dir: Option<PathBuf>,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Re-run interactive setup
    Init,
    /// Validate config and test the weather connection
    Check,
    /// Run the periodic monitor loop (the default command)
    Run {
        /// Evaluate every pitch once and exit
        #[arg(long)]
        once: bool,
    },
    /// Register a new pitch
    Add {
        /// Display name
        name: String,
        #[arg(long)]
        city: String,
        #[arg(long)]
        country: String,
        #[arg(long)]
        latitude: f64,
        #[arg(long)]
        longitude: f64,
        /// natural, artificial or hybrid
        #[arg(long)]
        turf_type: String,
        /// Initial condition rating (1-10)
        #[arg(long, default_value_t = 10)]
        condition: u8,
    },
    /// List pitches
    List {
        /// Only pitches needing maintenance
        #[arg(long, conflicts_with = "replacement")]
        maintenance: bool,
        /// Only pitches needing turf replacement
        #[arg(long)]
        replacement: bool,
    },
    /// Show a single pitch
    Show { id: Uuid },
    /// Delete a pitch
    Remove { id: Uuid },
    /// Set a future turf replacement date (RFC 3339)
    ScheduleReplacement { id: Uuid, date: String },
    /// Carry out a scheduled maintenance that has come due
    ExecuteMaintenance { id: Uuid },
}
