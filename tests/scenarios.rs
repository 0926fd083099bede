//! End-to-end scenarios exercising `chunk_file` as an external caller would.

use std::path::Path;

use chunkwise::model::{SymbolKind, Visibility};
use chunkwise::{chunk_file, ChunkConfig};
use pretty_assertions::assert_eq;

#[test]
fn go_function_with_doc_comment() {
    let source = "package math\n\n// Add adds two integers.\nfunc Add(a, b int) int {\n    return a + b\n}\n";
    let chunks = chunk_file(Path::new("math.go"), source, &ChunkConfig::default()).unwrap();

    let add = chunks
        .iter()
        .find(|c| c.symbol_name.contains("Add"))
        .expect("expected a chunk for Add");
    assert_eq!(add.symbol_kind, SymbolKind::Function);
    assert_eq!(add.visibility, Visibility::Public);
    assert!(add.doc_string.as_deref().unwrap_or("").contains("Add adds two integers"));
    assert_eq!(add.language, "go");
    assert!(add.content.starts_with("# File: math.go (go)"));
}

#[test]
fn python_class_with_private_method() {
    let source = "class Calculator:\n    def _helper(self):\n        pass\n";
    let (_, parse) = chunkwise::chunk_file_with_parse_result(Path::new("x.py"), source, &ChunkConfig::default()).unwrap();

    let class = parse.symbols.iter().find(|s| s.name == "Calculator").unwrap();
    assert_eq!(class.kind, SymbolKind::Class);

    let method = parse.symbols.iter().find(|s| s.name == "_helper").unwrap();
    assert_eq!(method.kind, SymbolKind::Method);
    assert_eq!(method.parent, "Calculator");
    assert_eq!(method.visibility, Visibility::Protected);
}

#[test]
fn markdown_nested_headings_have_correct_parents() {
    let source = "# A\n\n## B\n\n### C\n\n## D\n\ntail text\n";
    let (_, parse) = chunkwise::chunk_file_with_parse_result(Path::new("doc.md"), source, &ChunkConfig::default()).unwrap();

    let find = |name: &str| parse.symbols.iter().find(|s| s.name == name).unwrap();
    assert_eq!(find("A").parent, "");
    assert_eq!(find("B").parent, "A");
    assert_eq!(find("C").parent, "B");
    assert_eq!(find("D").parent, "A");

    let a = find("A");
    let total_lines = source.split('\n').count() as u32;
    assert!(a.end_line >= find("D").end_line.min(total_lines));
}

#[test]
fn vue_sfc_sections_rebase_child_symbols() {
    let source = "<template>\n<div id=\"root\"></div>\n</template>\n\n<script>\nconst x = 1;\n</script>\n\n<style>\n.c {}\n</style>\n";
    let (_, parse) = chunkwise::chunk_file_with_parse_result(Path::new("Widget.vue"), source, &ChunkConfig::default()).unwrap();

    let template = parse.symbols.iter().find(|s| s.name == "template").unwrap();
    let script = parse.symbols.iter().find(|s| s.name == "script").unwrap();
    let style = parse.symbols.iter().find(|s| s.name == "style").unwrap();

    let div = parse.symbols.iter().find(|s| s.name.starts_with("div")).unwrap();
    assert_eq!(div.parent, "template");
    assert!(div.start_line >= template.start_line && div.start_line <= template.end_line);

    let rule = parse.symbols.iter().find(|s| s.name == ".c").unwrap();
    assert_eq!(rule.parent, "style");
    assert!(rule.start_line >= style.start_line && rule.start_line <= style.end_line);

    assert!(script.start_line < style.start_line);
}

#[test]
fn oversize_go_function_is_split_into_bounded_pieces() {
    let mut body = String::from("package big\n\nfunc Process() {\n");
    for i in 0..120 {
        body.push_str(&format!("    x{i} := {i}\n"));
    }
    body.push_str("}\n");

    let config = ChunkConfig { max_chunk_size: 200, ..ChunkConfig::default() };
    let chunks = chunk_file(Path::new("big.go"), &body, &config).unwrap();

    let pieces: Vec<_> = chunks.iter().filter(|c| c.symbol_name.starts_with("Process[")).collect();
    assert!(pieces.len() >= 2, "expected the oversize function to be split");
    for piece in &pieces {
        assert_eq!(piece.start_byte, 0);
        assert_eq!(piece.end_byte, 0);
        assert!(piece.token_count <= config.max_chunk_size + 60);
    }
}

#[test]
fn leading_comment_is_attached_to_the_following_function() {
    let source = "// first\n// second\n// third\nfunc main() {}\n";
    let chunks = chunk_file(Path::new("main.go"), source, &ChunkConfig::default()).unwrap();

    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].symbol_name, "main");
    assert_eq!(chunks[0].start_line, 1);
    assert!(chunks[0].source_code.contains("first"));
    assert!(!chunks.iter().any(|c| c.symbol_name.starts_with("L1")));
}

#[test]
fn chunks_cover_every_line_of_the_source() {
    let source = "package p\n\nvar orphan = 1\n\nfunc F() {}\n\n// trailing note\n";
    let chunks = chunk_file(Path::new("p.go"), source, &ChunkConfig::default()).unwrap();
    let total_lines = source.split('\n').count() as u32;

    let mut covered = vec![false; total_lines as usize + 1];
    for c in &chunks {
        for line in c.start_line..=c.end_line {
            if (line as usize) < covered.len() {
                covered[line as usize] = true;
            }
        }
    }
    for line in 1..=total_lines {
        assert!(covered[line as usize], "line {line} not covered by any chunk");
    }
}
