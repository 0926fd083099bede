//! `ChunkConfig`: the value record threaded by reference through the pipeline
//! (§9 "Configuration passing" — no implicit globals). Layered loading via
//! `figment` exists only for the CLI; `chunk_file` itself always takes a
//! `ChunkConfig` by value.

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// "Very small" threshold (§9 open question): hard-coded to 50 tokens to
/// match the source behavior rather than exposed as a config knob.
pub const VERY_SMALL_TOKENS: u32 = 50;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkConfig {
    /// Hard upper bound used for merge feasibility and to bound the split target.
    pub max_chunk_size: u32,
    /// Tiny threshold — below this a chunk is a merge candidate.
    pub min_chunk_size: u32,
    /// Reserved for body-collapse optimization (unused by the core contract).
    pub collapse_threshold: u32,
    /// Enables the merge pass.
    pub merge_small_chunks: bool,
    /// When false, suppress doc rendering and strip comment-only lines when
    /// merging `text` chunks.
    pub include_comments: bool,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: 800,
            min_chunk_size: 100,
            collapse_threshold: 500,
            merge_small_chunks: true,
            include_comments: true,
        }
    }
}

impl ChunkConfig {
    /// `max(100, max(min_chunk_size, max_chunk_size/2))` — the merge/split target.
    pub fn preferred_chunk_size(&self) -> u32 {
        100.max(self.min_chunk_size.max(self.max_chunk_size / 2))
    }
}

/// Layer `ChunkConfig::default()` → an optional `chunker.toml` in the target
/// directory → environment variables prefixed `CHUNKER_`.
pub fn load(project_config: Option<&Path>) -> Result<ChunkConfig> {
    let mut figment = Figment::from(Serialized::defaults(ChunkConfig::default()));

    if let Some(proj) = project_config {
        figment = figment.merge(Toml::file(proj));
    }

    let config = figment
        .merge(Env::prefixed("CHUNKER_"))
        .extract()
        .map_err(|e| crate::error::ChunkError::Config(e.to_string()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preferred_size_floors_at_100() {
        let cfg = ChunkConfig { max_chunk_size: 120, min_chunk_size: 10, ..ChunkConfig::default() };
        assert_eq!(cfg.preferred_chunk_size(), 100);
    }

    #[test]
    fn preferred_size_follows_half_of_max_when_larger() {
        let cfg = ChunkConfig { max_chunk_size: 800, min_chunk_size: 100, ..ChunkConfig::default() };
        assert_eq!(cfg.preferred_chunk_size(), 400);
    }

    #[test]
    fn load_with_no_project_file_returns_defaults() {
        let cfg = load(None).unwrap();
        assert_eq!(cfg.max_chunk_size, 800);
    }
}
