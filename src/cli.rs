//! Command-line interface definitions using clap

use clap::Parser;

/// metrics-sampler - records synthetic metrics and reports them to a telemetry sink
#[derive(Parser, Debug)]
#[command(name = "metrics-sampler")]
#[command(version)]
#[command(about = "Records synthetic metrics on a fixed cadence and reports them to a telemetry sink", long_about = None)]
pub struct Cli {
    /// Path to the TOML config file (defaults to config.toml when present)
    #[arg(long, short = 'c')]
    pub config: Option<String>,

    /// Write a sample config file to PATH and exit
    #[arg(long, value_name = "PATH")]
    pub generate_config: Option<String>,
}
