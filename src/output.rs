use colored::Colorize;

use crate::report::AnalysisResult;

/// Output format for CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Pretty,
    Text,
    Json,
}

/// Format a result as the stable JSON schema.
pub fn format_json(result: &AnalysisResult) -> String {
    serde_json::to_string_pretty(&result.to_serializable())
        .expect("result should be serializable")
}

/// Format a result as plain text (no colors).
pub fn format_text(result: &AnalysisResult) -> String {
    let mut out = String::new();

    if let Some(ref path) = result.file_path {
        out.push_str(&format!("File: {}\n", path.display()));
    }
    out.push_str(&format!("Language: {}\n", result.language_tag()));
    out.push_str(&format!("Functions analyzed: {}\n", result.functions.len()));
    out.push_str(&format!(
        "Total weighted ops: {}\n",
        result.total_weighted_ops()
    ));
    out.push_str(&format!("Energy: {:.6e} J ({:.6e} kWh)\n", result.energy_joules(), result.energy_kwh()));
    out.push_str(&format!("Carbon: {:.6e} gCO2\n", result.carbon_grams()));

    let hotspots = result.hotspots();
    if !hotspots.is_empty() {
        let total = result.total_weighted_ops();
        out.push_str("\nTop hotspot functions:\n");
        for (rank, func) in hotspots.iter().enumerate() {
            let pct = if total > 0 {
                func.weighted_ops() as f64 / total as f64 * 100.0
            } else {
                0.0
            };
            out.push_str(&format!(
                "  {}. {} — {} ops ({:.1}%)\n",
                rank + 1,
                func.name,
                func.weighted_ops(),
                pct
            ));
        }
    }

    let breakdown = result.breakdown();
    out.push_str("\nDaily footprint by tier:\n");
    for tier in [
        &breakdown.user_end,
        &breakdown.developer_end,
        &breakdown.server_side,
        &breakdown.total,
    ] {
        out.push_str(&format!(
            "  {:<14} {:.6e} J, {:.6e} gCO2\n",
            tier.label, tier.energy_joules, tier.carbon_grams
        ));
    }

    if !result.assumptions.is_empty() {
        out.push_str("\nAssumptions:\n");
        for assumption in &result.assumptions {
            out.push_str(&format!("  - {assumption}\n"));
        }
    }

    out
}

/// Format a result with terminal colors.
pub fn format_pretty(result: &AnalysisResult) -> String {
    let mut out = String::new();

    if let Some(ref path) = result.file_path {
        out.push_str(&format!("{} {}\n", "File:".bold(), path.display()));
    }
    out.push_str(&format!(
        "{} {}\n",
        "Language:".bold(),
        result.language_tag().cyan()
    ));
    out.push_str(&format!(
        "{} {} | {} {}\n",
        "Functions:".dimmed(),
        result.functions.len(),
        "Weighted ops:".dimmed(),
        result.total_weighted_ops(),
    ));
    out.push_str(&format!(
        "{} {}\n",
        "Energy:".bold(),
        format!("{:.6e} J", result.energy_joules()).yellow()
    ));
    out.push_str(&format!(
        "{} {}\n",
        "Carbon:".bold(),
        format!("{:.6e} gCO2", result.carbon_grams()).green()
    ));

    let hotspots = result.hotspots();
    if !hotspots.is_empty() {
        let total = result.total_weighted_ops();
        out.push_str(&format!("\n{}\n", "Hotspots:".bold()));
        let top = hotspots.first().map(|f| f.weighted_ops()).unwrap_or(0);
        for func in &hotspots {
            let pct = if total > 0 {
                func.weighted_ops() as f64 / total as f64 * 100.0
            } else {
                0.0
            };
            let bar_len = if top > 0 {
                (func.weighted_ops() as f64 / top as f64 * 24.0) as usize
            } else {
                0
            };
            let bar = "█".repeat(bar_len.max(1));
            let marker = if func.is_recursive { " (recursive)" } else { "" };
            out.push_str(&format!(
                "  {:<24} {} {} ops ({:.1}%){}\n",
                func.name,
                bar.red(),
                func.weighted_ops(),
                pct,
                marker.dimmed(),
            ));
        }
    }

    let breakdown = result.breakdown();
    out.push_str(&format!("\n{}\n", "Daily footprint:".bold()));
    for tier in [
        &breakdown.user_end,
        &breakdown.developer_end,
        &breakdown.server_side,
        &breakdown.total,
    ] {
        out.push_str(&format!(
            "  {:<14} {:>12.6e} J  {:>12.6e} gCO2  {}\n",
            tier.label.bold(),
            tier.energy_joules,
            tier.carbon_grams,
            tier.description.dimmed(),
        ));
    }

    if !result.assumptions.is_empty() {
        out.push_str(&format!("\n{}\n", "Assumptions:".bold()));
        for assumption in &result.assumptions {
            out.push_str(&format!("  {} {}\n", "-".dimmed(), assumption));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::Language;
    use crate::model::OpKind;
    use crate::report::FunctionAnalysis;
    use std::path::PathBuf;

    fn make_result() -> AnalysisResult {
        let mut result = AnalysisResult::new(Language::Python, Some(PathBuf::from("x.py")));
        let mut f = FunctionAnalysis::new("hot", 3);
        f.operations.add(OpKind::IoOperation, 4);
        result.functions.push(f);
        result.assumptions.push("Energy per operation: 3e-9 J".into());
        result
    }

    #[test]
    fn text_mentions_language_and_hotspots() {
        let out = format_text(&make_result());
        assert!(out.contains("File: x.py"));
        assert!(out.contains("Language: python"));
        assert!(out.contains("1. hot — 200 ops (100.0%)"));
        assert!(out.contains("User End"));
        assert!(out.contains("Assumptions:"));
    }

    #[test]
    fn json_round_trips_schema_fields() {
        let json = format_json(&make_result());
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["language"], "python");
        assert_eq!(value["total_weighted_operations"], 200);
        assert_eq!(value["hotspot_functions"][0]["name"], "hot");
    }

    #[test]
    fn pretty_is_nonempty_for_empty_result() {
        let result = AnalysisResult::new(Language::C, None);
        let out = format_pretty(&result);
        assert!(out.contains("Language:"));
        assert!(out.contains("Daily footprint:"));
    }

    #[test]
    fn output_format_eq() {
        assert_eq!(OutputFormat::Pretty, OutputFormat::Pretty);
        assert_ne!(OutputFormat::Json, OutputFormat::Text);
    }
}
