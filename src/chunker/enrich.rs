//! The enricher (§4.3): filters raw symbols, builds and renders `Chunk`s,
//! then runs the merge and split passes to bring chunks within budget.

use crate::config::{ChunkConfig, VERY_SMALL_TOKENS};
use crate::model::{Chunk, ParseResult, Symbol, SymbolKind, SymbolRef};
use crate::util::{self, estimate_tokens};

/// Drop local declarations and redundant containers, then build one `Chunk`
/// per surviving symbol.
pub fn build_chunks(parse: &ParseResult, config: &ChunkConfig) -> Vec<Chunk> {
    filter_symbols(&parse.symbols)
        .into_iter()
        .map(|sym| build_chunk(sym, parse, config))
        .collect()
}

fn filter_symbols(symbols: &[Symbol]) -> Vec<&Symbol> {
    let after_locals: Vec<&Symbol> = symbols
        .iter()
        .filter(|s| !(matches!(s.kind, SymbolKind::Variable | SymbolKind::Constant) && !s.parent.is_empty()))
        .filter(|s| s.kind != SymbolKind::Link)
        .collect();

    after_locals
        .iter()
        .copied()
        .filter(|s| !has_children(s, &after_locals))
        .collect()
}

/// True if another surviving symbol is nested under `s` — either by byte
/// containment (container kinds) or by `parent` reference (headings).
fn has_children(s: &Symbol, pool: &[&Symbol]) -> bool {
    if s.kind.is_container()
        && pool
            .iter()
            .any(|other| !std::ptr::eq(*other, s) && s.strictly_encloses(other))
    {
        return true;
    }
    if s.kind == SymbolKind::Heading
        && pool
            .iter()
            .any(|other| !std::ptr::eq(*other, s) && other.parent == s.name && other.start_line >= s.start_line)
    {
        return true;
    }
    false
}

fn build_chunk(symbol: &Symbol, parse: &ParseResult, config: &ChunkConfig) -> Chunk {
    let mut chunk = Chunk {
        content: String::new(),
        source_code: symbol.source.clone(),
        file_path: parse.file_path.clone(),
        start_line: symbol.start_line,
        end_line: symbol.end_line,
        start_byte: symbol.start_byte,
        end_byte: symbol.end_byte,
        language: parse.language.clone(),
        symbol_name: symbol.name.clone(),
        symbol_kind: symbol.kind,
        parent: symbol.parent.clone(),
        signature: symbol.signature.clone(),
        visibility: symbol.visibility,
        symbols: vec![SymbolRef { name: symbol.name.clone(), kind: symbol.kind }],
        package_name: parse.metadata.get("package").cloned(),
        imports: parse.imports.clone(),
        doc_string: symbol.doc_string.clone(),
        token_count: 0,
        is_collapsed: false,
    };
    render(&mut chunk, config);
    chunk
}

fn kind_tag(kind: SymbolKind) -> &'static str {
    match kind {
        SymbolKind::Function => "function",
        SymbolKind::Method => "method",
        SymbolKind::Class => "class",
        SymbolKind::Struct => "struct",
        SymbolKind::Interface => "interface",
        SymbolKind::Variable => "variable",
        SymbolKind::Constant => "constant",
        SymbolKind::Import => "import",
        SymbolKind::Comment => "comment",
        SymbolKind::Module => "module",
        SymbolKind::Namespace => "namespace",
        SymbolKind::Enum => "enum",
        SymbolKind::TypeAlias => "type_alias",
        SymbolKind::Element => "element",
        SymbolKind::Script => "script",
        SymbolKind::Style => "style",
        SymbolKind::Rule => "rule",
        SymbolKind::Media => "media",
        SymbolKind::Keyframes => "keyframes",
        SymbolKind::Heading => "heading",
        SymbolKind::CodeBlock => "code_block",
        SymbolKind::Link => "link",
        SymbolKind::SqlStatement => "sql_statement",
        SymbolKind::Text => "text",
        SymbolKind::File => "file",
        SymbolKind::Group => "group",
    }
}

/// Render `chunk.content` (header + optional doc block + source) and
/// refresh `token_count` to match it (§4.3 rendering format).
pub fn render(chunk: &mut Chunk, config: &ChunkConfig) {
    let mut out = format!("# File: {} ({})\n", chunk.file_path, chunk.language);

    if !chunk.symbols.is_empty() {
        let label = if chunk.symbols.len() == 1 { "Symbol" } else { "Symbols" };
        let list = chunk
            .symbols
            .iter()
            .map(|s| format!("{} ({})", s.name, kind_tag(s.kind)))
            .collect::<Vec<_>>()
            .join(", ");
        out.push_str(&format!("# {label}: {list}\n"));
    }
    out.push('\n');

    if config.include_comments {
        if let Some(doc) = chunk.doc_string.as_deref().filter(|d| !d.is_empty()) {
            for line in doc.lines() {
                out.push_str("// ");
                out.push_str(line);
                out.push('\n');
            }
            out.push('\n');
        }
    }

    out.push_str(&chunk.source_code);
    chunk.token_count = estimate_tokens(&out);
    chunk.content = out;
}

fn is_very_small(chunk: &Chunk) -> bool {
    chunk.token_count < VERY_SMALL_TOKENS
}

/// Feasibility check shared by the merge pass and the gap filler's forward
/// fold: same file, same language, same semantic group, combined size within
/// budget.
pub fn can_merge(a: &Chunk, b: &Chunk, config: &ChunkConfig) -> bool {
    a.file_path == b.file_path
        && a.language == b.language
        && util::semantic_group_of_chunk(a) == util::semantic_group_of_chunk(b)
        && a.token_count + b.token_count <= config.max_chunk_size
}

/// The merge-or-flush predicate (§4.3): merge when both sides are tiny, or
/// the in-progress side is "very small" and hasn't merged yet, or the
/// incoming side is "very small".
fn should_merge(current: &Chunk, incoming: &Chunk, config: &ChunkConfig, was_merged: bool) -> bool {
    (current.token_count < config.min_chunk_size && incoming.token_count < config.min_chunk_size)
        || (is_very_small(current) && !was_merged)
        || is_very_small(incoming)
}

/// Concatenate two chunks into one: symbols, ranges, source (blank-line
/// separated, comment-stripped for `text` chunks when comments are
/// excluded), and doc strings; re-render.
pub fn merge_two(a: Chunk, b: Chunk, config: &ChunkConfig) -> Chunk {
    let mut symbols = a.symbols;
    symbols.extend(b.symbols);

    let start_line = a.start_line.min(b.start_line);
    let end_line = a.end_line.max(b.end_line);
    let start_byte = if a.start_byte == 0 || b.start_byte == 0 { 0 } else { a.start_byte.min(b.start_byte) };
    let end_byte = if a.end_byte == 0 || b.end_byte == 0 { 0 } else { a.end_byte.max(b.end_byte) };

    let strip = !config.include_comments && a.symbol_kind == SymbolKind::Text;
    let a_src = if strip { util::strip_comment_lines(&a.source_code) } else { a.source_code };
    let b_src = if strip { util::strip_comment_lines(&b.source_code) } else { b.source_code };
    let source_code = format!("{a_src}\n\n{b_src}");

    let doc_string = match (a.doc_string, b.doc_string) {
        (Some(x), Some(y)) => Some(format!("{x}\n{y}")),
        (Some(x), None) => Some(x),
        (None, Some(y)) => Some(y),
        (None, None) => None,
    };

    // A gap-filled `text`/`file` chunk (no real symbols) never gets to name a
    // merge — prefer whichever side actually came from a parsed symbol.
    let a_is_primary = !a.symbols.is_empty() || b.symbols.is_empty();
    let (symbol_name, parent, signature, visibility) = if a_is_primary {
        (a.symbol_name, a.parent, a.signature, a.visibility)
    } else {
        (b.symbol_name, b.parent, b.signature, b.visibility)
    };
    let primary_kind = if a_is_primary { a.symbol_kind } else { b.symbol_kind };
    let symbol_kind = if symbols.len() > 1 { SymbolKind::Group } else { primary_kind };

    let mut merged = Chunk {
        content: String::new(),
        source_code,
        file_path: a.file_path,
        start_line,
        end_line,
        start_byte,
        end_byte,
        language: a.language,
        symbol_name,
        symbol_kind,
        parent,
        signature,
        visibility,
        symbols,
        package_name: a.package_name.or(b.package_name),
        imports: a.imports,
        doc_string,
        token_count: 0,
        is_collapsed: a.is_collapsed || b.is_collapsed,
    };
    render(&mut merged, config);
    merged
}

/// Left-to-right sweep merging adjacent small/compatible chunks (§4.3).
pub fn merge_pass(chunks: Vec<Chunk>, config: &ChunkConfig) -> Vec<Chunk> {
    if !config.merge_small_chunks || chunks.len() < 2 {
        return chunks;
    }
    let preferred = config.preferred_chunk_size();
    let mut queue: std::collections::VecDeque<Chunk> = chunks.into_iter().collect();
    let mut result = Vec::new();

    let mut current = match queue.pop_front() {
        Some(c) => c,
        None => return result,
    };
    let mut was_merged = false;

    while let Some(incoming) = queue.pop_front() {
        if current.token_count >= preferred {
            result.push(current);
            current = incoming;
            was_merged = false;
            continue;
        }

        if can_merge(&current, &incoming, config) && should_merge(&current, &incoming, config, was_merged) {
            current = merge_two(current, incoming, config);
            was_merged = true;
            continue;
        }

        if is_very_small(&incoming) {
            if let Some(next) = queue.front() {
                if can_merge(&incoming, next, config) {
                    let next = queue.pop_front().unwrap();
                    result.push(current);
                    current = merge_two(incoming, next, config);
                    was_merged = false;
                    continue;
                }
            }
        }

        result.push(current);
        current = incoming;
        was_merged = false;
    }
    result.push(current);
    result
}

/// Split any chunk still above the preferred size at line boundaries (§4.3).
pub fn split_pass(chunks: Vec<Chunk>, config: &ChunkConfig) -> Vec<Chunk> {
    let preferred = config.preferred_chunk_size();
    chunks.into_iter().flat_map(|c| split_chunk(c, preferred, config)).collect()
}

pub fn split_chunk(chunk: Chunk, target: u32, config: &ChunkConfig) -> Vec<Chunk> {
    if chunk.token_count <= target {
        return vec![chunk];
    }
    let budget = target.saturating_sub(50).max(10);
    let lines = util::split_lines(&chunk.source_code);

    let mut pieces: Vec<Vec<&str>> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_tokens = 0u32;
    for line in lines {
        let line_tokens = estimate_tokens(line) + 1;
        if !current.is_empty() && current_tokens + line_tokens > budget {
            pieces.push(std::mem::take(&mut current));
            current_tokens = 0;
        }
        current_tokens += line_tokens;
        current.push(line);
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    if pieces.len() < 2 {
        return vec![chunk];
    }

    let max_allowed = config.max_chunk_size.max(2 * target);
    let mut out = Vec::new();
    let mut line_cursor = chunk.start_line;
    for piece in &pieces {
        let piece_start = line_cursor;
        let piece_end = line_cursor + piece.len() as u32 - 1;
        line_cursor = piece_end + 1;

        let mut piece_chunk = chunk.clone();
        piece_chunk.source_code = util::join_lines(piece);
        piece_chunk.start_line = piece_start;
        piece_chunk.end_line = piece_end;
        piece_chunk.start_byte = 0;
        piece_chunk.end_byte = 0;
        piece_chunk.symbol_name = format!("{}[{}-{}]", chunk.symbol_name, piece_start, piece_end);
        render(&mut piece_chunk, config);

        if piece_chunk.token_count > max_allowed {
            let halved = (target / 2).max(20);
            out.extend(split_chunk(piece_chunk, halved, config));
        } else {
            out.push(piece_chunk);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ParseResult, Visibility};
    use std::collections::HashMap;

    fn parse(symbols: Vec<Symbol>) -> ParseResult {
        ParseResult {
            file_path: "f.go".into(),
            language: "go".into(),
            symbols,
            imports: vec![],
            parse_errors: vec![],
            metadata: HashMap::new(),
        }
    }

    fn sym(name: &str, kind: SymbolKind, parent: &str, start: u32, end: u32) -> Symbol {
        Symbol {
            name: name.into(),
            kind,
            start_line: start,
            end_line: end,
            start_byte: (start - 1) * 10,
            end_byte: end * 10,
            source: format!("body of {name}"),
            signature: None,
            parent: parent.into(),
            visibility: Visibility::Public,
            doc_string: None,
        }
    }

    #[test]
    fn drops_local_declaration_with_parent() {
        let symbols = vec![
            sym("f", SymbolKind::Function, "", 1, 5),
            sym("x", SymbolKind::Variable, "f", 2, 2),
        ];
        let filtered = filter_symbols(&symbols);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "f");
    }

    #[test]
    fn drops_container_whose_range_encloses_a_child() {
        let symbols = vec![
            sym("div#app", SymbolKind::Element, "", 1, 10),
            sym("button", SymbolKind::Element, "div#app", 2, 2),
        ];
        let filtered = filter_symbols(&symbols);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "button");
    }

    #[test]
    fn always_drops_link_symbols() {
        let symbols = vec![sym("./x.md", SymbolKind::Link, "", 1, 1)];
        assert!(filter_symbols(&symbols).is_empty());
    }

    #[test]
    fn render_uses_singular_label_for_one_symbol() {
        let parsed = parse(vec![sym("f", SymbolKind::Function, "", 1, 1)]);
        let config = ChunkConfig::default();
        let chunks = build_chunks(&parsed, &config);
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].content.contains("# Symbol: f (function)"));
    }

    #[test]
    fn merge_two_concatenates_source_with_blank_line() {
        let parsed = parse(vec![
            sym("a", SymbolKind::Function, "", 1, 1),
            sym("b", SymbolKind::Function, "", 2, 2),
        ]);
        let config = ChunkConfig::default();
        let mut chunks = build_chunks(&parsed, &config);
        let b = chunks.pop().unwrap();
        let a = chunks.pop().unwrap();
        let merged = merge_two(a, b, &config);
        assert!(merged.source_code.contains("body of a\n\nbody of b"));
        assert_eq!(merged.symbols.len(), 2);
        assert_eq!(merged.symbol_kind, SymbolKind::Group);
    }

    #[test]
    fn merge_pass_combines_two_tiny_chunks() {
        let parsed = parse(vec![
            sym("a", SymbolKind::Function, "", 1, 1),
            sym("b", SymbolKind::Function, "", 2, 2),
        ]);
        let config = ChunkConfig::default();
        let chunks = build_chunks(&parsed, &config);
        let merged = merge_pass(chunks, &config);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].symbols.len(), 2);
    }
}
