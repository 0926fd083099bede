//! Shared utilities used across the enricher and gap filler: token
//! estimation, line/byte math, semantic grouping, and comment detection.

use crate::model::{Chunk, SymbolKind};

/// Affine character-based token estimate: `byte_length(s) / 4`.
/// Exact tokenization is explicitly out of scope (§1 Non-goals).
pub fn estimate_tokens(s: &str) -> u32 {
    (s.len() as u32) / 4
}

/// Split on `\n`, preserving empty trailing lines (mirrors `str::split`,
/// not `str::lines`, which would drop a trailing empty element).
pub fn split_lines(content: &str) -> Vec<&str> {
    content.split('\n').collect()
}

/// Inverse of `split_lines`.
pub fn join_lines(lines: &[&str]) -> String {
    lines.join("\n")
}

/// Byte offset of the first byte of 1-indexed `line` within `lines`,
/// accumulating `len(line) + 1` (the `\n`) for each preceding line.
pub fn byte_offset_of_line(lines: &[&str], line: u32) -> u32 {
    let mut offset = 0u32;
    for l in lines.iter().take(line.saturating_sub(1) as usize) {
        offset += l.len() as u32 + 1;
    }
    offset
}

/// One of three buckets a chunk's symbol kind falls into so unrelated
/// material (markup vs. styling vs. code) never merges together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemanticGroup {
    Template,
    Style,
    Code,
}

pub fn semantic_group_of_kind(kind: SymbolKind) -> SemanticGroup {
    match kind {
        SymbolKind::Element => SemanticGroup::Template,
        SymbolKind::Style | SymbolKind::Rule | SymbolKind::Media | SymbolKind::Keyframes => {
            SemanticGroup::Style
        }
        _ => SemanticGroup::Code,
    }
}

/// A chunk's semantic group is derived from its primary symbol kind, or, for
/// a merged chunk, from any contained symbol that is `element`-kind (template
/// wins) else any `style`/`rule`/`media`/`keyframes` kind (style wins), else
/// `code`.
pub fn semantic_group_of_chunk(chunk: &Chunk) -> SemanticGroup {
    if chunk.symbols.iter().any(|s| s.kind == SymbolKind::Element) {
        return SemanticGroup::Template;
    }
    if chunk.symbols.iter().any(|s| {
        matches!(
            s.kind,
            SymbolKind::Style | SymbolKind::Rule | SymbolKind::Media | SymbolKind::Keyframes
        )
    }) {
        return SemanticGroup::Style;
    }
    if chunk.symbols.is_empty() {
        return semantic_group_of_kind(chunk.symbol_kind);
    }
    SemanticGroup::Code
}

/// Comment-line prefixes recognized across every supported language:
/// `//` and `#` line comments, `/* ... */` block comments, `<!-- ... -->`
/// HTML comments.
fn line_is_comment_start(trimmed: &str) -> bool {
    trimmed.starts_with("//")
        || trimmed.starts_with('#')
        || trimmed.starts_with("/*")
        || trimmed.starts_with("<!--")
}

/// Strip comment-only lines from `text`, used by the merge pass when
/// `include_comments` is false and the chunk kind is `text`.
pub fn strip_comment_lines(text: &str) -> String {
    let mut out = Vec::new();
    let mut in_block = false;
    let mut in_html = false;
    for line in split_lines(text) {
        let trimmed = line.trim();
        if in_block {
            if trimmed.contains("*/") {
                in_block = false;
            }
            continue;
        }
        if in_html {
            if trimmed.contains("-->") {
                in_html = false;
            }
            continue;
        }
        if trimmed.is_empty() {
            out.push(line);
            continue;
        }
        if trimmed.starts_with("/*") {
            if !trimmed.contains("*/") {
                in_block = true;
            }
            continue;
        }
        if trimmed.starts_with("<!--") {
            if !trimmed.contains("-->") {
                in_html = true;
            }
            continue;
        }
        if trimmed.starts_with("//") || trimmed.starts_with('#') {
            continue;
        }
        out.push(line);
    }
    join_lines(&out)
}

/// Track whether a contiguous line range consists exclusively of comment
/// syntax, across block-comment boundaries. Used by the gap filler to decide
/// whether an uncovered range can be silently folded into an adjacent chunk.
#[derive(Debug, Default)]
pub struct CommentOnlyScanner {
    in_block: bool,
    in_html: bool,
}

impl CommentOnlyScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one line; returns false (and the scan is no longer comment-only)
    /// the moment a line has real content outside comment syntax.
    pub fn feed(&mut self, line: &str) -> bool {
        let trimmed = line.trim();
        if self.in_block {
            if let Some(pos) = trimmed.find("*/") {
                self.in_block = false;
                let rest = trimmed[pos + 2..].trim();
                return rest.is_empty();
            }
            return true;
        }
        if self.in_html {
            if let Some(pos) = trimmed.find("-->") {
                self.in_html = false;
                let rest = trimmed[pos + 3..].trim();
                return rest.is_empty();
            }
            return true;
        }
        if trimmed.is_empty() {
            return true;
        }
        if !line_is_comment_start(trimmed) {
            return false;
        }
        if trimmed.starts_with("/*") && !trimmed[2..].contains("*/") {
            self.in_block = true;
            return true;
        }
        if trimmed.starts_with("<!--") && !trimmed[4..].contains("-->") {
            self.in_html = true;
            return true;
        }
        // A one-line block/HTML comment with trailing content after the
        // closer also breaks the property.
        if trimmed.starts_with("/*") {
            if let Some(pos) = trimmed.find("*/") {
                return trimmed[pos + 2..].trim().is_empty();
            }
        }
        if trimmed.starts_with("<!--") {
            if let Some(pos) = trimmed.find("-->") {
                return trimmed[pos + 3..].trim().is_empty();
            }
        }
        true
    }
}

/// Convenience: is every line in `lines` comment-only, in order?
pub fn is_comment_only_block(lines: &[&str]) -> bool {
    let mut scanner = CommentOnlyScanner::new();
    lines.iter().all(|l| scanner.feed(l))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimate_tokens_is_byte_len_over_4() {
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcdefgh"), 2);
        assert_eq!(estimate_tokens(""), 0);
    }

    #[test]
    fn split_lines_preserves_trailing_empty() {
        assert_eq!(split_lines("a\nb\n"), vec!["a", "b", ""]);
    }

    #[test]
    fn byte_offset_accumulates_newlines() {
        let content = "abc\nde\nf";
        let lines = split_lines(content);
        assert_eq!(byte_offset_of_line(&lines, 1), 0);
        assert_eq!(byte_offset_of_line(&lines, 2), 4);
        assert_eq!(byte_offset_of_line(&lines, 3), 7);
    }

    #[test]
    fn comment_only_block_detects_mixed_content() {
        assert!(is_comment_only_block(&["// a", "# b", ""]));
        assert!(!is_comment_only_block(&["// a", "let x = 1;"]));
    }

    #[test]
    fn comment_only_block_tracks_block_comments() {
        assert!(is_comment_only_block(&["/* start", "still a comment", "end */"]));
        assert!(!is_comment_only_block(&["/* start", "end */ code"]));
    }

    #[test]
    fn comment_only_block_tracks_html_comments() {
        assert!(is_comment_only_block(&["<!-- a", "b -->"]));
        assert!(!is_comment_only_block(&["<!-- a -->", "<div>"]));
    }

    #[test]
    fn strip_comment_lines_removes_line_and_block_comments() {
        let text = "// header\nlet x = 1;\n/* block\n still */\nlet y = 2;";
        let stripped = strip_comment_lines(text);
        assert!(stripped.contains("let x = 1;"));
        assert!(stripped.contains("let y = 2;"));
        assert!(!stripped.contains("header"));
    }
}
