//! CLI argument definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "audiomatchr", version)]
#[command(about = "Locate occurrences of a short audio clip inside a longer recording")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Search one target file, or every audio file under a directory
    Analyze(AnalyzeArgs),
    /// Write a synthetic pattern/target WAV pair for testing
    Generate(GenerateArgs),
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Short clip to look for
    #[arg(short, long)]
    pub pattern: PathBuf,

    /// Recording to search, or a directory of recordings
    #[arg(short, long)]
    pub target: PathBuf,

    /// Print JSON instead of the coloured summary
    #[arg(long)]
    pub json: bool,

    /// Also write the JSON report(s) to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Overview image path (a directory when the target is a directory)
    #[arg(long)]
    pub plot: Option<PathBuf>,

    /// JSON config file; defaults to the per-user config if present
    #[arg(short, long, env = "AUDIOMATCHR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Analysis sample rate both files are resampled to
    #[arg(long)]
    pub sample_rate: Option<u32>,

    /// Run the detection methods one after another
    #[arg(long)]
    pub sequential: bool,
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Output directory
    #[arg(long)]
    pub out: PathBuf,

    /// Pattern start times inside the target, in seconds
    #[arg(long, value_delimiter = ',', default_value = "2.0")]
    pub offsets: Vec<f32>,

    #[arg(long, default_value_t = 0.4)]
    pub pattern_secs: f32,

    #[arg(long, default_value_t = 10.0)]
    pub target_secs: f32,

    #[arg(long, default_value_t = 22050)]
    pub sample_rate: u32,

    /// File name prefix
    #[arg(long, default_value = "sweep")]
    pub name: String,
}
