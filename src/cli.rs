use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// chunkwise — a semantic code chunker for embedding and retrieval pipelines
#[derive(Parser, Debug)]
#[command(
    name = "chunkwise",
    version,
    about = "Split source files into size-balanced, semantically coherent chunks",
    long_about = None
)]
pub struct Cli {
    /// Path to a chunker.toml configuration file (default: none)
    #[arg(short, long, global = true, env = "CHUNKER_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Chunk a single file and print the result
    Chunk(ChunkArgs),

    /// Walk a directory and chunk every supported file under it
    Scan(ScanArgs),
}

#[derive(Args, Debug)]
pub struct ChunkArgs {
    /// Path to the file to chunk
    pub path: PathBuf,

    /// Hard upper bound on chunk size, in estimated tokens
    #[arg(long)]
    pub max_chunk_size: Option<u32>,

    /// Threshold below which adjacent chunks are merge candidates
    #[arg(long)]
    pub min_chunk_size: Option<u32>,

    /// Disable the merge pass
    #[arg(long)]
    pub no_merge: bool,

    /// Omit doc comments from rendered chunk content
    #[arg(long)]
    pub no_comments: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Directory to walk
    pub dir: PathBuf,

    /// Restrict to these extensions (repeatable, e.g. --ext go --ext py)
    #[arg(long = "ext", value_name = "EXT")]
    pub ext: Vec<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}
