use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Source languages the analyzer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    Java,
    C,
    Cpp,
    JavaScript,
    TypeScript,
}

impl Language {
    pub fn all() -> &'static [Language] {
        &[
            Language::Python,
            Language::Java,
            Language::C,
            Language::Cpp,
            Language::JavaScript,
            Language::TypeScript,
        ]
    }

    /// Canonical tag used in reports and the serialized schema.
    pub fn tag(self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::Java => "java",
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Language> {
        match tag {
            "python" => Some(Language::Python),
            "java" => Some(Language::Java),
            "c" => Some(Language::C),
            "cpp" => Some(Language::Cpp),
            "javascript" => Some(Language::JavaScript),
            "typescript" => Some(Language::TypeScript),
            _ => None,
        }
    }

    /// Whether the language scopes blocks by indentation rather than braces.
    pub fn is_indentation(self) -> bool {
        matches!(self, Language::Python)
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Detect the language of a source input.
///
/// Precedence: path extension, then content heuristics, then a `python`
/// default for any non-blank content. Returns `None` only when nothing
/// matches and the source is blank; the orchestrator turns that into the
/// empty undetectable-language result.
pub fn detect_language(path: Option<&Path>, source: &str) -> Option<Language> {
    if let Some(lang) = path.and_then(from_extension) {
        return Some(lang);
    }
    if let Some(lang) = from_content(source) {
        return Some(lang);
    }
    if source.trim().is_empty() {
        None
    } else {
        Some(Language::Python)
    }
}

/// Detect the language from a file extension. `.h` maps to C.
pub fn from_extension(path: &Path) -> Option<Language> {
    match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
        "py" => Some(Language::Python),
        "java" => Some(Language::Java),
        "c" | "h" => Some(Language::C),
        "cpp" | "cc" | "cxx" | "hpp" => Some(Language::Cpp),
        "js" | "mjs" | "jsx" => Some(Language::JavaScript),
        "ts" | "tsx" => Some(Language::TypeScript),
        _ => None,
    }
}

fn from_content(source: &str) -> Option<Language> {
    if has_def_header(source) && source.lines().any(|l| l.trim_end().ends_with(':')) {
        return Some(Language::Python);
    }
    if source.contains("public class ") || source.contains("public static class ") {
        return Some(Language::Java);
    }
    if source.contains("#include <") && source.contains("printf") {
        return Some(Language::C);
    }
    if source.contains("#include <") && (source.contains("cout") || source.contains("std::")) {
        return Some(Language::Cpp);
    }
    let has_type_alias = source
        .lines()
        .any(|l| l.trim_start().starts_with("type ") && l.contains('='));
    if (source.contains("interface ") || has_type_alias) && source.contains(": ") {
        return Some(Language::TypeScript);
    }
    if source.contains("function") || source.contains("=>") || source.contains("console.log") {
        return Some(Language::JavaScript);
    }
    None
}

/// True if the source contains a `def NAME(` function header.
fn has_def_header(source: &str) -> bool {
    for line in source.lines() {
        let trimmed = line.trim_start();
        let rest = if let Some(r) = trimmed.strip_prefix("async def ") {
            r
        } else if let Some(r) = trimmed.strip_prefix("def ") {
            r
        } else {
            continue;
        };
        let name_len: usize = rest
            .chars()
            .take_while(|c| c.is_alphanumeric() || *c == '_')
            .map(|c| c.len_utf8())
            .sum();
        if name_len > 0 && rest[name_len..].trim_start().starts_with('(') {
            return true;
        }
    }
    false
}

// ---------------------------------------------------------------------------
// ParserRegistry
// ---------------------------------------------------------------------------

/// Cache of grammar handles, owned by the orchestrator.
///
/// Grammars are compiled into the binary; construction is idempotent and
/// `dispose` releases every cached handle and marks the registry torn down,
/// after which every parse request reports failure and the orchestrator
/// falls back to the textual walker.
pub struct ParserRegistry {
    grammars: HashMap<Language, tree_sitter::Language>,
    initialized: bool,
}

impl ParserRegistry {
    pub fn new() -> Self {
        Self {
            grammars: HashMap::new(),
            initialized: true,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn grammar(&mut self, lang: Language) -> tree_sitter::Language {
        self.grammars
            .entry(lang)
            .or_insert_with(|| bundled_grammar(lang))
            .clone()
    }

    /// Parse `source`, returning `None` on any parser failure.
    pub fn parse(&mut self, lang: Language, source: &str) -> Option<tree_sitter::Tree> {
        if !self.initialized {
            return None;
        }
        let grammar = self.grammar(lang);
        let mut parser = tree_sitter::Parser::new();
        if let Err(e) = parser.set_language(&grammar) {
            log::warn!("cannot load {lang} grammar: {e}");
            return None;
        }
        parser.parse(source.as_bytes(), None)
    }

    pub fn dispose(&mut self) {
        self.grammars.clear();
        self.initialized = false;
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn bundled_grammar(lang: Language) -> tree_sitter::Language {
    match lang {
        Language::Python => tree_sitter_python::LANGUAGE.into(),
        Language::Java => tree_sitter_java::LANGUAGE.into(),
        Language::C => tree_sitter_c::LANGUAGE.into(),
        Language::Cpp => tree_sitter_cpp::LANGUAGE.into(),
        Language::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
        Language::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn ext(p: &str) -> Option<Language> {
        from_extension(&PathBuf::from(p))
    }

    #[test]
    fn extension_map() {
        assert_eq!(ext("a.py"), Some(Language::Python));
        assert_eq!(ext("A.java"), Some(Language::Java));
        assert_eq!(ext("a.c"), Some(Language::C));
        assert_eq!(ext("a.h"), Some(Language::C));
        assert_eq!(ext("a.cpp"), Some(Language::Cpp));
        assert_eq!(ext("a.cc"), Some(Language::Cpp));
        assert_eq!(ext("a.cxx"), Some(Language::Cpp));
        assert_eq!(ext("a.hpp"), Some(Language::Cpp));
        assert_eq!(ext("a.js"), Some(Language::JavaScript));
        assert_eq!(ext("a.mjs"), Some(Language::JavaScript));
        assert_eq!(ext("a.jsx"), Some(Language::JavaScript));
        assert_eq!(ext("a.ts"), Some(Language::TypeScript));
        assert_eq!(ext("a.tsx"), Some(Language::TypeScript));
        assert_eq!(ext("a.rb"), None);
    }

    #[test]
    fn extension_beats_content() {
        let path = PathBuf::from("Main.java");
        let source = "def f():\n    pass\n";
        assert_eq!(detect_language(Some(&path), source), Some(Language::Java));
    }

    #[test]
    fn content_python() {
        let source = "def greet(name):\n    return name\n";
        assert_eq!(detect_language(None, source), Some(Language::Python));
    }

    #[test]
    fn content_java() {
        let source = "public class Main {\n    public static void main(String[] a) {}\n}";
        assert_eq!(detect_language(None, source), Some(Language::Java));
    }

    #[test]
    fn content_c_vs_cpp() {
        let c = "#include <stdio.h>\nint main() { printf(\"x\"); }";
        assert_eq!(detect_language(None, c), Some(Language::C));
        let cpp = "#include <iostream>\nint main() { std::cout << 1; }";
        assert_eq!(detect_language(None, cpp), Some(Language::Cpp));
    }

    #[test]
    fn content_typescript_before_javascript() {
        let ts = "interface Point { x: number }\nconst p = { x: 1 };";
        assert_eq!(detect_language(None, ts), Some(Language::TypeScript));
        let js = "const f = (x) => x + 1;\nconsole.log(f(2));";
        assert_eq!(detect_language(None, js), Some(Language::JavaScript));
    }

    #[test]
    fn unrecognized_nonblank_defaults_to_python() {
        assert_eq!(detect_language(None, "x = 5"), Some(Language::Python));
    }

    #[test]
    fn blank_input_is_undetectable() {
        assert_eq!(detect_language(None, ""), None);
        assert_eq!(detect_language(None, "   \n\t\n"), None);
    }

    #[test]
    fn registry_parses_all_languages() {
        let mut registry = ParserRegistry::new();
        for &lang in Language::all() {
            assert!(
                registry.parse(lang, "").is_some(),
                "grammar missing for {lang}"
            );
        }
    }

    #[test]
    fn disposed_registry_refuses_to_parse() {
        let mut registry = ParserRegistry::new();
        assert!(registry.parse(Language::Python, "x = 1\n").is_some());
        registry.dispose();
        assert!(!registry.is_initialized());
        assert!(registry.parse(Language::Python, "x = 1\n").is_none());
    }
}
