use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser, Clone)]
#[clap(
    version = "0.1.0",
    name = "ringrace",
    about = "A tick-based ring-track racing simulation against an AI opponent"
)]
pub struct SimOpts {
    // FLAGS ---------------------------------------------------------------------------------------
    /// Activate debug printing and the debug overlay of the HUD
    #[clap(short, long)]
    pub debug: bool,

    /// Activate HUD - race will be simulated in real-time with a text HUD
    #[clap(short, long)]
    pub gui: bool,

    /// Write a PNG plot of both cars' trajectories after the race
    #[clap(long)]
    pub plot: bool,

    // OPTIONS -------------------------------------------------------------------------------------
    /// Set path to the simulation parameter file (OPTIONAL: if not set, uses the standard race)
    #[clap(short, long)]
    pub parfile_path: Option<PathBuf>,

    /// Set number of ticks to simulate
    #[clap(short, long, default_value = "3600")]
    pub no_ticks: u64,

    /// Set real-time factor (only relevant in HUD mode)
    #[clap(short, long, default_value = "1.0")]
    pub realtime_factor: f64,

    /// Set simulation timestep size in seconds (OPTIONAL: overrides the parameter file)
    #[clap(short, long)]
    pub timestep_size: Option<f64>,

    /// Set seed of the autopilot's steering noise
    #[clap(short, long, default_value = "0")]
    pub seed: u64,

    /// Set path of the per-tick telemetry CSV file (OPTIONAL)
    #[clap(long)]
    pub telemetry_path: Option<PathBuf>,

    /// Set path of the result text file (OPTIONAL: defaults to output/last_run.txt)
    #[clap(long)]
    pub result_path: Option<PathBuf>,
}
