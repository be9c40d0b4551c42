//! Root CLI structure for skelanim

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "skelanim")]
#[command(about = "Inspect and play skeletal animation scenes", long_about = None)]
#[command(version)]
#[command(author)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

impl Cli {
    /// Log level selected by `-v`/`-q`, `warn` by default
    pub fn log_level(&self) -> log::LevelFilter {
        match (self.verbose, self.quiet) {
            (0, true) => log::LevelFilter::Error,
            (0, false) => log::LevelFilter::Warn,
            (1, _) => log::LevelFilter::Info,
            (2, _) => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Display information about a scene
    Info {
        /// Path to the scene file
        scene: PathBuf,

        /// List skins and clip channels
        #[arg(short, long)]
        detailed: bool,
    },

    /// Display the node hierarchy as a tree
    Tree {
        /// Path to the scene file
        scene: PathBuf,

        /// Maximum depth to display
        #[arg(short, long)]
        depth: Option<usize>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,

        /// Show transforms inline
        #[arg(long)]
        compact: bool,
    },

    /// Play a clip and print the resulting joint palette
    Play(PlayArgs),
}

#[derive(Args, Debug)]
pub struct PlayArgs {
    /// Path to the scene file
    pub scene: PathBuf,

    /// Clip to play, the first clip by default
    #[arg(short, long)]
    pub clip: Option<String>,

    /// Skin whose palette is computed
    #[arg(short, long, default_value_t = 0)]
    pub skin: usize,

    /// Number of frames to run
    #[arg(short, long, default_value_t = 30)]
    pub frames: u32,

    /// Frames per second
    #[arg(long, default_value_t = 30.0)]
    pub fps: f32,

    /// Palette capacity
    #[arg(long, default_value_t = skelanim::DEFAULT_MAX_JOINTS)]
    pub max_joints: usize,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Final palette as a table
    Table,
    /// Every frame's palette as JSON
    Json,
}
