//! VBatch CLI: list, inspect and run frame set nodes.
//!
//! Usage:
//!   vbatch nodes [--json]             List the node catalog
//!   vbatch config [--init]            Show (or create) the configuration file
//!   vbatch run <NODE> [OPTIONS] <IMAGES>...
//!                                     Run a node over image files

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use vbatch_common::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "vbatch",
    about = "Batch transforms for indexed video frames",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every node with its inputs and outputs
    Nodes {
        /// Print descriptors as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the active configuration
    Config {
        /// Write the default configuration if no file exists yet
        #[arg(long)]
        init: bool,
    },

    /// Run one node over a sequence of image files
    Run {
        /// Node name, with or without the configured suffix
        node: String,

        /// Node parameter as NAME=VALUE (repeatable)
        #[arg(short, long = "param", value_name = "NAME=VALUE")]
        params: Vec<String>,

        /// Frame rate of the input images
        #[arg(long)]
        fps: Option<u32>,

        /// Output directory for written frames
        #[arg(short, long, default_value = "out")]
        output: PathBuf,

        /// Images for a node's second frame input, in order
        #[arg(long, num_args = 1..)]
        second: Vec<PathBuf>,

        /// Input images, in frame order
        images: Vec<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load();

    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    vbatch_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Nodes { json } => commands::nodes::run(&config, json),
        Commands::Config { init } => commands::config::run(&config, init),
        Commands::Run {
            node,
            params,
            fps,
            output,
            second,
            images,
        } => commands::run::run(
            &config,
            commands::run::RunArgs {
                node,
                params,
                fps,
                output,
                second,
                images,
            },
        ),
    }
}
