#![deny(dead_code)]

pub mod analyzers;
pub mod classify;
pub mod consts;
pub mod counts;
pub mod energy;
pub mod language;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod report;
pub mod syntax;

use std::path::Path;

use language::Language;
use pipeline::Estimator;
use report::AnalysisResult;

/// Estimate the footprint of a source string, auto-detecting the language.
pub fn estimate(source: &str) -> AnalysisResult {
    Estimator::new().estimate(source, None, None)
}

/// Estimate with an explicit language, bypassing detection.
pub fn estimate_with_language(source: &str, language: Language) -> AnalysisResult {
    Estimator::new().estimate(source, None, Some(language))
}

/// Estimate using only the line-based fallback walker.
pub fn estimate_sync(source: &str, language: Option<Language>) -> AnalysisResult {
    Estimator::new().estimate_sync(source, None, language)
}

/// Estimate the footprint of a file at the given path.
pub fn estimate_file(path: &Path) -> std::io::Result<AnalysisResult> {
    let source = std::fs::read_to_string(path)?;
    Ok(Estimator::new().estimate(&source, Some(&path.to_path_buf()), None))
}
