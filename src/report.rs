use std::path::PathBuf;

use serde::Serialize;

use crate::counts::{OperationCount, OperationSummary};
use crate::energy::{self, CarbonBreakdown};
use crate::language::Language;

/// Analysis of a single function or method.
#[derive(Debug, Clone)]
pub struct FunctionAnalysis {
    /// Qualified name, `Class.method` for methods.
    pub name: String,
    /// 1-based line of the definition.
    pub line: usize,
    pub operations: OperationCount,
    /// Deepest loop nesting anywhere in the body.
    pub max_nesting: u32,
    pub is_recursive: bool,
    /// Short names of every call made in the body, in walk order.
    pub calls: Vec<String>,
}

impl FunctionAnalysis {
    pub fn new(name: impl Into<String>, line: usize) -> Self {
        Self {
            name: name.into(),
            line,
            operations: OperationCount::new(),
            max_nesting: 0,
            is_recursive: false,
            calls: Vec::new(),
        }
    }

    pub fn weighted_ops(&self) -> u64 {
        self.operations.total_weighted()
    }

    pub fn energy_joules(&self) -> f64 {
        energy::energy_joules(self.weighted_ops())
    }

    pub fn energy_kwh(&self) -> f64 {
        energy::joules_to_kwh(self.energy_joules())
    }

    pub fn carbon_grams(&self) -> f64 {
        energy::joules_to_carbon_grams(self.energy_joules())
    }
}

/// Complete analysis of one source input.
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    /// `None` when the language could not be detected.
    pub language: Option<Language>,
    pub file_path: Option<PathBuf>,
    /// Functions in definition order.
    pub functions: Vec<FunctionAnalysis>,
    /// Operations of statements outside any function or class.
    pub global_operations: OperationCount,
    /// Heuristic decisions, in the order they were made.
    pub assumptions: Vec<String>,
}

impl AnalysisResult {
    pub fn new(language: Language, file_path: Option<PathBuf>) -> Self {
        Self {
            language: Some(language),
            file_path,
            functions: Vec::new(),
            global_operations: OperationCount::new(),
            assumptions: Vec::new(),
        }
    }

    /// The empty result returned when no language can be detected.
    pub fn undetectable(file_path: Option<PathBuf>) -> Self {
        Self {
            language: None,
            file_path,
            functions: Vec::new(),
            global_operations: OperationCount::new(),
            assumptions: vec![
                "Language could not be detected — no analysis performed".to_string(),
            ],
        }
    }

    pub fn language_tag(&self) -> &'static str {
        self.language.map_or("unknown", Language::tag)
    }

    /// Merge of global operations and every function's operations.
    pub fn total_operations(&self) -> OperationCount {
        let mut total = self.global_operations.clone();
        for func in &self.functions {
            total.merge(&func.operations);
        }
        total
    }

    pub fn total_weighted_ops(&self) -> u64 {
        self.total_operations().total_weighted()
    }

    pub fn energy_joules(&self) -> f64 {
        energy::energy_joules(self.total_weighted_ops())
    }

    pub fn energy_kwh(&self) -> f64 {
        energy::joules_to_kwh(self.energy_joules())
    }

    pub fn carbon_grams(&self) -> f64 {
        energy::joules_to_carbon_grams(self.energy_joules())
    }

    /// Daily three-tier breakdown derived from the total energy.
    pub fn breakdown(&self) -> CarbonBreakdown {
        energy::breakdown(self.energy_joules())
    }

    /// Top five functions by weighted operations. The sort is stable, so
    /// ties keep definition order.
    pub fn hotspots(&self) -> Vec<&FunctionAnalysis> {
        let mut ranked: Vec<&FunctionAnalysis> = self.functions.iter().collect();
        ranked.sort_by(|a, b| b.weighted_ops().cmp(&a.weighted_ops()));
        ranked.truncate(5);
        ranked
    }

    pub fn to_serializable(&self) -> SerializableResult {
        let total_weighted = self.total_weighted_ops();
        let hotspot_functions = self
            .hotspots()
            .into_iter()
            .map(|f| {
                let percentage = if total_weighted > 0 {
                    round2(f.weighted_ops() as f64 / total_weighted as f64 * 100.0)
                } else {
                    0.0
                };
                SerializableHotspot {
                    name: f.name.clone(),
                    weighted_ops: f.weighted_ops(),
                    percentage,
                }
            })
            .collect();

        SerializableResult {
            language: self.language_tag().to_string(),
            file_path: self.file_path.as_ref().map(|p| p.display().to_string()),
            total_operations: self.total_operations().summary(),
            total_weighted_operations: total_weighted,
            energy_joules: self.energy_joules(),
            energy_kwh: self.energy_kwh(),
            carbon_grams: self.carbon_grams(),
            functions: self
                .functions
                .iter()
                .map(|f| SerializableFunction {
                    name: f.name.clone(),
                    line: f.line,
                    weighted_ops: f.weighted_ops(),
                    energy_joules: f.energy_joules(),
                    carbon_grams: f.carbon_grams(),
                    is_recursive: f.is_recursive,
                    max_loop_nesting: f.max_nesting,
                    operations: f.operations.summary(),
                })
                .collect(),
            hotspot_functions,
            assumptions: self.assumptions.clone(),
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// The stable output schema.
#[derive(Debug, Clone, Serialize)]
pub struct SerializableResult {
    pub language: String,
    pub file_path: Option<String>,
    pub total_operations: OperationSummary,
    pub total_weighted_operations: u64,
    pub energy_joules: f64,
    #[serde(rename = "energy_kWh")]
    pub energy_kwh: f64,
    #[serde(rename = "carbon_grams_CO2")]
    pub carbon_grams: f64,
    pub functions: Vec<SerializableFunction>,
    pub hotspot_functions: Vec<SerializableHotspot>,
    pub assumptions: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SerializableFunction {
    pub name: String,
    pub line: usize,
    pub weighted_ops: u64,
    pub energy_joules: f64,
    #[serde(rename = "carbon_grams_CO2")]
    pub carbon_grams: f64,
    pub is_recursive: bool,
    pub max_loop_nesting: u32,
    pub operations: OperationSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct SerializableHotspot {
    pub name: String,
    pub weighted_ops: u64,
    pub percentage: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OpKind;

    fn func_with(name: &str, line: usize, kind: OpKind, n: u64) -> FunctionAnalysis {
        let mut f = FunctionAnalysis::new(name, line);
        f.operations.add(kind, n);
        f
    }

    #[test]
    fn total_is_global_plus_functions() {
        let mut result = AnalysisResult::new(Language::Python, None);
        result.global_operations.add(OpKind::Assignment, 2);
        result.functions.push(func_with("a", 1, OpKind::Addition, 3));
        result.functions.push(func_with("b", 5, OpKind::Addition, 4));

        let total = result.total_operations();
        assert_eq!(total.get(OpKind::Assignment), 2);
        assert_eq!(total.get(OpKind::Addition), 7);
        assert_eq!(result.total_weighted_ops(), 9);
    }

    #[test]
    fn hotspots_ranked_with_stable_ties() {
        let mut result = AnalysisResult::new(Language::Python, None);
        for (name, n) in [("a", 5), ("b", 9), ("c", 5), ("d", 1), ("e", 9), ("f", 2)] {
            result.functions.push(func_with(name, 1, OpKind::Addition, n));
        }
        let names: Vec<&str> = result.hotspots().iter().map(|f| f.name.as_str()).collect();
        // 9s first in definition order, then 5s in definition order.
        assert_eq!(names, ["b", "e", "a", "c", "f"]);
    }

    #[test]
    fn hotspots_capped_at_five() {
        let mut result = AnalysisResult::new(Language::Python, None);
        assert!(result.hotspots().is_empty());
        for i in 0..7 {
            result
                .functions
                .push(func_with(&format!("f{i}"), 1, OpKind::Addition, i));
        }
        assert_eq!(result.hotspots().len(), 5);
    }

    #[test]
    fn undetectable_has_single_assumption() {
        let result = AnalysisResult::undetectable(None);
        assert_eq!(result.assumptions.len(), 1);
        assert!(result.assumptions[0].contains("Language could not be detected"));
        assert_eq!(result.language_tag(), "unknown");
        assert_eq!(result.total_weighted_ops(), 0);
    }

    #[test]
    fn serializable_schema_keys() {
        let mut result = AnalysisResult::new(Language::Python, Some(PathBuf::from("x.py")));
        result.functions.push(func_with("f", 1, OpKind::IoOperation, 2));
        let json = serde_json::to_value(result.to_serializable()).unwrap();

        assert_eq!(json["language"], "python");
        assert_eq!(json["file_path"], "x.py");
        assert_eq!(json["total_operations"]["io_operation"], 2);
        assert_eq!(json["total_weighted_operations"], 100);
        assert!(json.get("energy_kWh").is_some());
        assert!(json.get("carbon_grams_CO2").is_some());
        assert_eq!(json["functions"][0]["name"], "f");
        assert_eq!(json["functions"][0]["max_loop_nesting"], 0);
        assert_eq!(json["hotspot_functions"][0]["percentage"], 100.0);
    }

    #[test]
    fn hotspot_percentage_zero_when_total_zero() {
        let mut result = AnalysisResult::new(Language::Python, None);
        result.functions.push(FunctionAnalysis::new("empty", 1));
        let ser = result.to_serializable();
        assert_eq!(ser.hotspot_functions[0].percentage, 0.0);
    }

    #[test]
    fn recursion_scaling_multiplies_counters() {
        let mut f = func_with("fib", 1, OpKind::Comparison, 3);
        f.operations.add(OpKind::FunctionCall, 2);
        let scaled = f.operations.scale(crate::model::DEFAULT_RECURSION_DEPTH);
        assert_eq!(scaled.get(OpKind::Comparison), 30);
        assert_eq!(scaled.get(OpKind::FunctionCall), 20);
    }
}
