//! The gap filler (§4.4): guarantees full line coverage of the source file
//! after enrichment, folding comment-only gaps into neighboring chunks and
//! materializing everything else as a `text` chunk.

use crate::chunker::enrich::{self, render};
use crate::config::ChunkConfig;
use crate::model::{Chunk, SymbolKind, Visibility};
use crate::util;

pub fn fill_gaps(source: &str, file_path: &str, language: &str, mut chunks: Vec<Chunk>, config: &ChunkConfig) -> Vec<Chunk> {
    let lines = util::split_lines(source);
    let total_lines = lines.len() as u32;

    if chunks.is_empty() {
        return vec![fallback_chunk(source, file_path, language, total_lines, config)];
    }

    chunks.sort_by_key(|c| c.start_line);

    let mut out: Vec<Chunk> = Vec::new();
    let mut prev_end = 0u32;

    for mut chunk in chunks {
        if chunk.start_line > prev_end + 1 {
            let gap_start = prev_end + 1;
            let gap_end = chunk.start_line - 1;
            let gap_lines = &lines[(gap_start as usize - 1)..(gap_end as usize)];

            if util::is_comment_only_block(gap_lines) {
                prepend_gap(&mut chunk, &lines, gap_start, gap_lines, config);
            } else {
                let gap_chunk = materialize_gap(&lines, source.len() as u32, gap_start, gap_end, gap_lines, file_path, language, config);
                insert_gap_chunk(&mut out, gap_chunk, config);
            }
        }
        prev_end = chunk.end_line.max(prev_end);
        out.push(chunk);
    }

    if prev_end < total_lines {
        let gap_start = prev_end + 1;
        let gap_end = total_lines;
        let gap_lines = &lines[(gap_start as usize - 1)..(gap_end as usize)];

        if util::is_comment_only_block(gap_lines) {
            if let Some(last) = out.last_mut() {
                append_gap(last, &lines, gap_end, gap_lines, config);
            }
        } else {
            let gap_chunk = materialize_gap(&lines, source.len() as u32, gap_start, gap_end, gap_lines, file_path, language, config);
            out.push(gap_chunk);
        }
    }

    if out.is_empty() {
        out.push(fallback_chunk(source, file_path, language, total_lines, config));
    }
    out
}

fn prepend_gap(chunk: &mut Chunk, lines: &[&str], gap_start: u32, gap_lines: &[&str], config: &ChunkConfig) {
    let gap_text = util::join_lines(gap_lines);
    chunk.source_code = format!("{gap_text}\n{}", chunk.source_code);
    chunk.start_line = gap_start;
    chunk.start_byte = util::byte_offset_of_line(lines, gap_start);
    render(chunk, config);
}

fn append_gap(chunk: &mut Chunk, lines: &[&str], gap_end: u32, gap_lines: &[&str], config: &ChunkConfig) {
    let gap_text = util::join_lines(gap_lines);
    chunk.source_code = format!("{}\n{gap_text}", chunk.source_code);
    chunk.end_line = gap_end;
    // The new end byte would require re-walking past the original chunk's
    // end; leave it as the "unknown" sentinel rather than guess.
    chunk.end_byte = 0;
    render(chunk, config);
}

/// Heading text > fenced-code-block language > HTML heading tag > `L<n>`/`L<s>-<e>`.
fn gap_name(gap_lines: &[&str], gap_start: u32, gap_end: u32) -> String {
    for line in gap_lines {
        let trimmed = line.trim();
        if trimmed.starts_with('#') {
            let text = trimmed.trim_start_matches('#').trim();
            if !text.is_empty() {
                return text.to_string();
            }
        }
    }
    for line in gap_lines {
        let trimmed = line.trim();
        if let Some(rest) = trimmed.strip_prefix("```") {
            let lang = rest.trim();
            return if lang.is_empty() { "code".to_string() } else { format!("code:{lang}") };
        }
    }
    for line in gap_lines {
        let lower = line.to_ascii_lowercase();
        if ["<h1", "<h2", "<h3", "<h4", "<h5", "<h6"].iter().any(|tag| lower.contains(tag)) {
            return "html-heading".to_string();
        }
    }
    if gap_start == gap_end {
        format!("L{gap_start}")
    } else {
        format!("L{gap_start}-{gap_end}")
    }
}

fn end_byte_of_line(lines: &[&str], line: u32, source_len: u32) -> u32 {
    if (line as usize) < lines.len() {
        util::byte_offset_of_line(lines, line + 1).saturating_sub(1)
    } else {
        source_len
    }
}

#[allow(clippy::too_many_arguments)]
fn materialize_gap(
    lines: &[&str],
    source_len: u32,
    gap_start: u32,
    gap_end: u32,
    gap_lines: &[&str],
    file_path: &str,
    language: &str,
    config: &ChunkConfig,
) -> Chunk {
    let name = gap_name(gap_lines, gap_start, gap_end);
    let mut chunk = Chunk {
        content: String::new(),
        source_code: util::join_lines(gap_lines),
        file_path: file_path.to_string(),
        start_line: gap_start,
        end_line: gap_end,
        start_byte: util::byte_offset_of_line(lines, gap_start),
        end_byte: end_byte_of_line(lines, gap_end, source_len),
        language: language.to_string(),
        symbol_name: name,
        symbol_kind: SymbolKind::Text,
        parent: String::new(),
        signature: None,
        visibility: Visibility::Public,
        symbols: vec![],
        package_name: None,
        imports: vec![],
        doc_string: None,
        token_count: 0,
        is_collapsed: false,
    };
    render(&mut chunk, config);
    chunk
}

/// Fold into the preceding chunk if it's still small, split the preceding
/// chunk and insert after its first piece if it's already oversize and
/// adjacent, otherwise just place the gap chunk in sequence.
fn insert_gap_chunk(out: &mut Vec<Chunk>, gap_chunk: Chunk, config: &ChunkConfig) {
    let preferred = config.preferred_chunk_size();

    if let Some(prev) = out.last() {
        if prev.file_path == gap_chunk.file_path && prev.token_count < preferred {
            let prev = out.last_mut().unwrap();
            prev.source_code = format!("{}\n\n{}", prev.source_code, gap_chunk.source_code);
            prev.end_line = gap_chunk.end_line;
            prev.end_byte = 0;
            render(prev, config);
            return;
        }
        if prev.token_count > preferred && prev.end_line + 1 == gap_chunk.start_line {
            let prev_owned = out.pop().unwrap();
            let mut pieces = enrich::split_chunk(prev_owned, preferred, config).into_iter();
            if let Some(first) = pieces.next() {
                out.push(first);
            }
            out.push(gap_chunk);
            out.extend(pieces);
            return;
        }
    }
    out.push(gap_chunk);
}

fn fallback_chunk(source: &str, file_path: &str, language: &str, total_lines: u32, config: &ChunkConfig) -> Chunk {
    let mut chunk = Chunk {
        content: String::new(),
        source_code: source.to_string(),
        file_path: file_path.to_string(),
        start_line: 1,
        end_line: total_lines.max(1),
        start_byte: 0,
        end_byte: source.len() as u32,
        language: language.to_string(),
        symbol_name: "file-content".to_string(),
        symbol_kind: SymbolKind::File,
        parent: String::new(),
        signature: None,
        visibility: Visibility::Public,
        symbols: vec![],
        package_name: None,
        imports: vec![],
        doc_string: None,
        token_count: 0,
        is_collapsed: false,
    };
    render(&mut chunk, config);
    chunk
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_fallback_chunk() {
        let out = fill_gaps("", "f.go", "go", vec![], &ChunkConfig::default());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].symbol_kind, SymbolKind::File);
        assert_eq!(out[0].symbol_name, "file-content");
    }

    #[test]
    fn leading_comment_only_gap_is_prepended() {
        let source = "// leading comment\nfunc main() {}\n";
        let chunk = Chunk {
            content: String::new(),
            source_code: "func main() {}".to_string(),
            file_path: "f.go".into(),
            start_line: 2,
            end_line: 2,
            start_byte: 20,
            end_byte: 34,
            language: "go".into(),
            symbol_name: "main".into(),
            symbol_kind: SymbolKind::Function,
            parent: String::new(),
            signature: None,
            visibility: Visibility::Public,
            symbols: vec![],
            package_name: None,
            imports: vec![],
            doc_string: None,
            token_count: 10,
            is_collapsed: false,
        };
        let out = fill_gaps(source, "f.go", "go", vec![chunk], &ChunkConfig::default());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].start_line, 1);
        assert!(out[0].source_code.contains("leading comment"));
    }

    #[test]
    fn non_comment_gap_is_materialized_as_text_chunk() {
        let source = "func a() {}\nlet orphan = 1;\nfunc b() {}\n";
        let a = Chunk {
            content: String::new(),
            source_code: "func a() {}".to_string(),
            file_path: "f.go".into(),
            start_line: 1,
            end_line: 1,
            start_byte: 0,
            end_byte: 11,
            language: "go".into(),
            symbol_name: "a".into(),
            symbol_kind: SymbolKind::Function,
            parent: String::new(),
            signature: None,
            visibility: Visibility::Public,
            symbols: vec![],
            package_name: None,
            imports: vec![],
            doc_string: None,
            token_count: 10,
            is_collapsed: false,
        };
        let mut b = a.clone();
        b.symbol_name = "b".into();
        b.start_line = 3;
        b.end_line = 3;
        b.source_code = "func b() {}".to_string();

        let out = fill_gaps(source, "f.go", "go", vec![a, b], &ChunkConfig::default());
        assert!(out.iter().any(|c| c.source_code.contains("orphan")));
    }
}
