//! Parser registry: maps a lower-cased file extension to a `LanguageId`, and
//! owns one shared, process-scoped `tree_sitter::Language` handle per grammar.
//!
//! Registration table (§4.1):
//! ```text
//! .go → go            .py → python
//! .ts/.tsx → typescript (TS grammar)     .js/.jsx → javascript (JS grammar)
//! .html/.htm → html   .css/.scss/.sass → css
//! .vue → vue          .md/.markdown → markdown
//! .sql → sql          .json → json
//! ```

use std::sync::OnceLock;

use tree_sitter::Language;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LanguageId {
    Go,
    Python,
    TypeScript,
    JavaScript,
    Html,
    Css,
    Vue,
    Markdown,
    Sql,
    Json,
}

impl LanguageId {
    pub fn name(self) -> &'static str {
        match self {
            LanguageId::Go => "go",
            LanguageId::Python => "python",
            LanguageId::TypeScript => "typescript",
            LanguageId::JavaScript => "javascript",
            LanguageId::Html => "html",
            LanguageId::Css => "css",
            LanguageId::Vue => "vue",
            LanguageId::Markdown => "markdown",
            LanguageId::Sql => "sql",
            LanguageId::Json => "json",
        }
    }
}

/// Lower-case `extension` (without the leading dot) and map it to a
/// `LanguageId`, or `None` if unsupported.
pub fn lookup(extension: &str) -> Option<LanguageId> {
    let ext = extension.to_ascii_lowercase();
    Some(match ext.as_str() {
        "go" => LanguageId::Go,
        "py" => LanguageId::Python,
        "ts" | "tsx" => LanguageId::TypeScript,
        "js" | "jsx" => LanguageId::JavaScript,
        "html" | "htm" => LanguageId::Html,
        "css" | "scss" | "sass" => LanguageId::Css,
        "vue" => LanguageId::Vue,
        "md" | "markdown" => LanguageId::Markdown,
        "sql" => LanguageId::Sql,
        "json" => LanguageId::Json,
        _ => return None,
    })
}

/// All extensions the registry recognizes, grouped in registration-table
/// order. Stable, allocation-free at the call site (returns `&'static
/// [&'static str]`).
pub fn supported_extensions() -> &'static [&'static str] {
    &[
        "go", "py", "ts", "tsx", "js", "jsx", "html", "htm", "css", "scss", "sass", "vue", "md",
        "markdown", "sql", "json",
    ]
}

pub fn is_supported(extension: &str) -> bool {
    lookup(extension).is_some()
}

macro_rules! grammar_cell {
    ($name:ident) => {
        static $name: OnceLock<Language> = OnceLock::new();
    };
}

grammar_cell!(GO_LANGUAGE);
grammar_cell!(PYTHON_LANGUAGE);
grammar_cell!(TS_LANGUAGE);
grammar_cell!(TSX_LANGUAGE);
grammar_cell!(JS_LANGUAGE);
grammar_cell!(HTML_LANGUAGE);
grammar_cell!(CSS_LANGUAGE);
grammar_cell!(MARKDOWN_LANGUAGE);
grammar_cell!(SQL_LANGUAGE);
grammar_cell!(JSON_LANGUAGE);

/// Returns the shared grammar handle for `language`. For `LanguageId::TypeScript`
/// the caller additionally passes `tsx` to select the TSX grammar variant
/// (Vue `<script lang="tsx">` sections, or a bare `.tsx` file). `LanguageId::Vue`
/// has no grammar of its own — the composite parser dispatches to HTML/TS-or-JS/CSS.
pub fn grammar_for(language: LanguageId, tsx: bool) -> Option<Language> {
    Some(match language {
        LanguageId::Go => GO_LANGUAGE.get_or_init(|| tree_sitter_go::LANGUAGE.into()).clone(),
        LanguageId::Python => PYTHON_LANGUAGE
            .get_or_init(|| tree_sitter_python::LANGUAGE.into())
            .clone(),
        LanguageId::TypeScript if tsx => TSX_LANGUAGE
            .get_or_init(|| tree_sitter_typescript::LANGUAGE_TSX.into())
            .clone(),
        LanguageId::TypeScript => TS_LANGUAGE
            .get_or_init(|| tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into())
            .clone(),
        LanguageId::JavaScript => JS_LANGUAGE
            .get_or_init(|| tree_sitter_javascript::LANGUAGE.into())
            .clone(),
        LanguageId::Html => HTML_LANGUAGE
            .get_or_init(|| tree_sitter_html::LANGUAGE.into())
            .clone(),
        LanguageId::Css => CSS_LANGUAGE
            .get_or_init(|| tree_sitter_css::LANGUAGE.into())
            .clone(),
        LanguageId::Markdown => MARKDOWN_LANGUAGE
            .get_or_init(|| tree_sitter_md::LANGUAGE.into())
            .clone(),
        LanguageId::Sql => SQL_LANGUAGE
            .get_or_init(|| tree_sitter_sequel::LANGUAGE.into())
            .clone(),
        LanguageId::Json => JSON_LANGUAGE
            .get_or_init(|| tree_sitter_json::LANGUAGE.into())
            .clone(),
        LanguageId::Vue => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(lookup("GO"), Some(LanguageId::Go));
        assert_eq!(lookup("Py"), Some(LanguageId::Python));
    }

    #[test]
    fn lookup_rejects_unknown_extension() {
        assert_eq!(lookup("exe"), None);
    }

    #[test]
    fn ts_and_tsx_select_same_language_different_variant() {
        assert_eq!(lookup("ts"), Some(LanguageId::TypeScript));
        assert_eq!(lookup("tsx"), Some(LanguageId::TypeScript));
    }

    #[test]
    fn supported_extensions_round_trips_through_lookup() {
        for ext in supported_extensions() {
            assert!(is_supported(ext), "extension {ext} should be supported");
        }
    }
}
