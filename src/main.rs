mod cli;

use std::fs;

use anyhow::{Context, Result};
use chunkwise::model::Chunk;
use chunkwise::{chunker, config, walker, ChunkConfig};
use clap::Parser;
use cli::{Cli, Commands, OutputFormat};
use tracing::warn;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    fmt().with_env_filter(EnvFilter::new(filter)).init();

    let base = config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Chunk(args) => {
            let config = apply_chunk_overrides(base, &args);
            let source = fs::read_to_string(&args.path)
                .with_context(|| format!("reading {}", args.path.display()))?;
            let chunks = chunker::chunk_file(&args.path, &source, &config)
                .with_context(|| format!("chunking {}", args.path.display()))?;
            print_chunks(&chunks, args.format)?;
        }
        Commands::Scan(args) => {
            let files = walker::collect_files(&args.dir, &args.ext);
            let mut all = Vec::new();
            for path in files {
                let source = match fs::read_to_string(&path) {
                    Ok(s) => s,
                    Err(e) => {
                        warn!(file = %path.display(), error = %e, "skipping unreadable file");
                        continue;
                    }
                };
                match chunker::chunk_file(&path, &source, &base) {
                    Ok(chunks) => all.extend(chunks),
                    Err(e) => warn!(file = %path.display(), error = %e, "skipping file"),
                }
            }
            print_chunks(&all, args.format)?;
        }
    }

    Ok(())
}

fn apply_chunk_overrides(mut config: ChunkConfig, args: &cli::ChunkArgs) -> ChunkConfig {
    if let Some(max) = args.max_chunk_size {
        config.max_chunk_size = max;
    }
    if let Some(min) = args.min_chunk_size {
        config.min_chunk_size = min;
    }
    if args.no_merge {
        config.merge_small_chunks = false;
    }
    if args.no_comments {
        config.include_comments = false;
    }
    config
}

fn print_chunks(chunks: &[Chunk], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(chunks)?);
        }
        OutputFormat::Text => {
            for chunk in chunks {
                println!("{}", chunk.content);
                println!("---");
            }
        }
    }
    Ok(())
}
