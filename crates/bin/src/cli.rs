//! CLI argument definitions for the Feline binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Feline line review server
#[derive(Parser, Debug)]
#[command(name = "feline")]
#[command(about = "Feline: line-by-line study sessions in the browser")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the Feline web server
    Serve(ServeArgs),
    /// Check health of a running Feline server
    Health(HealthArgs),
}

/// Arguments for the serve command
#[derive(clap::Args, Debug)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, default_value_t = 2323, env = "FELINE_PORT")]
    pub port: u16,

    /// Bind address
    #[arg(long, default_value = "0.0.0.0", env = "FELINE_HOST")]
    pub host: String,

    /// Line Engine executable.
    /// A relative path with a directory part is resolved inside --engine-dir.
    #[arg(short, long, default_value = "./Lynx", env = "FELINE_ENGINE")]
    pub engine: PathBuf,

    /// Working directory for Line Engine invocations
    #[arg(long, default_value = "build", env = "FELINE_ENGINE_DIR")]
    pub engine_dir: PathBuf,

    /// Seconds before a Line Engine call is abandoned and the process killed
    #[arg(
        long,
        default_value_t = 30,
        env = "FELINE_ENGINE_TIMEOUT",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub engine_timeout: u64,

    /// Directory for builder scratch files (defaults to the system temp dir)
    #[arg(long, env = "FELINE_SCRATCH_DIR")]
    pub scratch_dir: Option<PathBuf>,
}

/// Arguments for the health command
#[derive(clap::Args, Debug)]
pub struct HealthArgs {
    /// Base URL of the server to check
    #[arg(long, default_value = "http://127.0.0.1:2323", env = "FELINE_URL")]
    pub url: String,

    /// Timeout in seconds
    #[arg(short, long, default_value_t = 5)]
    pub timeout: u64,
}
