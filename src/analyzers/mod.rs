pub mod brace;
pub mod indent;
pub mod text;

use std::path::PathBuf;

use crate::language::Language;
use crate::report::AnalysisResult;
use crate::syntax::SyntaxNode;

/// Run the syntax-tree walker matching the language's scoping family.
pub fn walk_tree<N: SyntaxNode>(
    lang: Language,
    root: N,
    file_path: Option<PathBuf>,
) -> AnalysisResult {
    if lang.is_indentation() {
        indent::IndentWalker::new(file_path).analyze(root)
    } else {
        brace::BraceWalker::new(lang, file_path).analyze(root)
    }
}
