use std::path::PathBuf;

use crate::analyzers::{text::TextWalker, walk_tree};
use crate::language::{detect_language, Language, ParserRegistry};
use crate::report::AnalysisResult;
use crate::syntax::TsNode;

/// Orchestrates a single analysis: detect the language, obtain a parse
/// tree, run the matching walker, and fall back to the textual walker when
/// no tree can be produced.
pub struct Estimator {
    registry: ParserRegistry,
}

impl Estimator {
    pub fn new() -> Self {
        Self {
            registry: ParserRegistry::new(),
        }
    }

    /// Analyze `source` using the syntax-tree walkers where possible.
    ///
    /// Never fails: an undetectable language yields an empty result with a
    /// single explanatory assumption, and any parser problem degrades to
    /// the line-based walker with the degradation recorded.
    pub fn estimate(
        &mut self,
        source: &str,
        file_path: Option<&PathBuf>,
        language: Option<Language>,
    ) -> AnalysisResult {
        let detected = language.or_else(|| detect_language(file_path.map(|p| p.as_path()), source));
        let Some(lang) = detected else {
            return AnalysisResult::undetectable(file_path.cloned());
        };

        match self.registry.parse(lang, source) {
            Some(tree) => {
                let root = TsNode::new(tree.root_node(), source);
                walk_tree(lang, root, file_path.cloned())
            }
            None => {
                log::warn!("no parser available for {lang}; using textual fallback");
                let mut result =
                    TextWalker::new(lang, file_path.cloned()).analyze(source);
                result
                    .assumptions
                    .insert(0, format!("Parser unavailable for {lang} — used line-based fallback"));
                result
            }
        }
    }

    /// Analyze `source` with the textual fallback walker only.
    pub fn estimate_sync(
        &self,
        source: &str,
        file_path: Option<&PathBuf>,
        language: Option<Language>,
    ) -> AnalysisResult {
        let detected = language.or_else(|| detect_language(file_path.map(|p| p.as_path()), source));
        let Some(lang) = detected else {
            return AnalysisResult::undetectable(file_path.cloned());
        };
        TextWalker::new(lang, file_path.cloned()).analyze(source)
    }

    /// Release every cached grammar. Subsequent `estimate` calls use the
    /// textual fallback.
    pub fn dispose(&mut self) {
        self.registry.dispose();
    }
}

impl Default for Estimator {
    fn default() -> Self {
        Self::new()
    }
}
