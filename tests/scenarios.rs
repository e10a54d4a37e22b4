//! End-to-end scenarios, run against both the syntax-tree walkers and the
//! line-based fallback so the two paths cannot drift apart on simple
//! single-loop inputs.

use std::path::PathBuf;

use watttrace::language::Language;
use watttrace::model::{OpKind, DEFAULT_RECURSION_DEPTH};
use watttrace::pipeline::Estimator;
use watttrace::report::AnalysisResult;

fn estimate(source: &str, language: Language) -> AnalysisResult {
    Estimator::new().estimate(source, None, Some(language))
}

fn estimate_fallback(source: &str, language: Language) -> AnalysisResult {
    Estimator::new().estimate_sync(source, None, Some(language))
}

fn both_paths(source: &str, language: Language) -> [AnalysisResult; 2] {
    [
        estimate(source, language),
        estimate_fallback(source, language),
    ]
}

#[test]
fn s1_indentation_loop_with_io() {
    let source = "def f():\n    for i in range(10):\n        print(i)\n";
    for result in both_paths(source, Language::Python) {
        assert_eq!(result.functions.len(), 1);
        let f = &result.functions[0];
        assert_eq!(f.name, "f");
        assert_eq!(f.line, 1);
        assert_eq!(f.max_nesting, 1);
        assert!(!f.is_recursive);
        assert!(f.operations.get(OpKind::Comparison) >= 10);
        assert_eq!(f.operations.get(OpKind::IoOperation), 10);
    }
}

#[test]
fn s2_constant_propagation() {
    let source = "N = 50\ndef g():\n    for i in range(N):\n        x = i + 1\n";
    for result in both_paths(source, Language::Python) {
        let g = &result.functions[0];
        assert_eq!(g.name, "g");
        assert!(g.operations.get(OpKind::Comparison) >= 50);
        assert_eq!(g.operations.get(OpKind::Addition), 50);
        assert_eq!(g.operations.get(OpKind::Assignment), 50);
        assert!(result
            .assumptions
            .iter()
            .any(|a| a.contains("for-loop resolved to 50 iterations")));
    }
}

#[test]
fn s3_nested_loop_cascade() {
    let source = "def h():\n    for i in range(4):\n        for j in range(5):\n            print(j)\n";
    for result in both_paths(source, Language::Python) {
        let h = &result.functions[0];
        assert_eq!(h.operations.get(OpKind::IoOperation), 20);
        assert!(h.operations.get(OpKind::Comparison) >= 24);
    }
}

#[test]
fn s4_brace_for_loop() {
    let source =
        "int main() {\n    for (int i = 0; i < 3; i++) {\n        printf(\"x\");\n    }\n    return 0;\n}\n";
    for result in both_paths(source, Language::C) {
        assert_eq!(result.functions.len(), 1);
        let main = &result.functions[0];
        assert_eq!(main.name, "main");
        assert_eq!(main.max_nesting, 1);
        assert_eq!(main.operations.get(OpKind::IoOperation), 3);
        assert!(main.operations.get(OpKind::Comparison) >= 3);
    }
}

#[test]
fn s5_recursion() {
    let source = "def fib(n):\n    if n < 2:\n        return n\n    return fib(n-1) + fib(n-2)\n";
    for result in both_paths(source, Language::Python) {
        let fib = &result.functions[0];
        assert!(fib.is_recursive);
        for &kind in OpKind::all() {
            assert_eq!(
                fib.operations.get(kind) % DEFAULT_RECURSION_DEPTH,
                0,
                "{kind} is not a multiple of the recursion depth"
            );
        }
        assert!(fib.operations.total_weighted() > 0);
    }
}

#[test]
fn s6_empty_input_with_recognized_extension() {
    let mut estimator = Estimator::new();
    let path = PathBuf::from("empty.py");
    let result = estimator.estimate("", Some(&path), None);

    assert_eq!(result.language, Some(Language::Python));
    assert!(result.functions.is_empty());
    assert_eq!(result.total_weighted_ops(), 0);
    assert!(!result
        .assumptions
        .iter()
        .any(|a| a.contains("Language could not be detected")));
}

#[test]
fn s6_blank_pathless_input_is_undetectable() {
    let mut estimator = Estimator::new();
    let result = estimator.estimate("", None, None);

    assert_eq!(result.language, None);
    assert!(result.functions.is_empty());
    assert_eq!(result.total_weighted_ops(), 0);
    assert_eq!(
        result.assumptions,
        vec!["Language could not be detected — no analysis performed".to_string()]
    );
}

#[test]
fn serializable_output_matches_schema() {
    let source = "def f():\n    for i in range(10):\n        print(i)\n\ndef g():\n    x = 1\n";
    let result = estimate(source, Language::Python);
    let json = serde_json::to_value(result.to_serializable()).unwrap();

    assert_eq!(json["language"], "python");
    assert!(json["total_operations"].is_object());
    assert!(json["total_operations"].get("io_operation").is_some());
    // Zero kinds are omitted from summaries.
    assert!(json["total_operations"].get("network_operation").is_none());
    assert!(json.get("energy_kWh").is_some());
    assert!(json.get("carbon_grams_CO2").is_some());
    assert_eq!(json["functions"].as_array().unwrap().len(), 2);
    assert_eq!(json["functions"][0]["name"], "f");
    assert_eq!(json["functions"][1]["name"], "g");
    assert_eq!(json["hotspot_functions"][0]["name"], "f");
    assert!(json["assumptions"].as_array().unwrap().len() >= 2);
}

#[test]
fn java_end_to_end() {
    let source = "public class Main {\n    public static void main(String[] args) {\n        for (int i = 0; i < 5; i++) {\n            System.out.println(i);\n        }\n    }\n}\n";
    let result = estimate(source, Language::Java);
    let main = &result.functions[0];
    assert_eq!(main.name, "Main.main");
    assert_eq!(main.operations.get(OpKind::IoOperation), 5);
}

#[test]
fn javascript_end_to_end() {
    let source = "function sum(xs) {\n    let total = 0;\n    for (let i = 0; i < 4; i++) {\n        total += xs[i];\n    }\n    return total;\n}\n";
    let result = estimate(source, Language::JavaScript);
    let sum = &result.functions[0];
    assert_eq!(sum.operations.get(OpKind::ArrayAccess), 4);
    assert_eq!(sum.operations.get(OpKind::Addition), 4);
    // total declarator + 4 loop-body assignments
    assert_eq!(sum.operations.get(OpKind::Assignment), 5);
}

#[test]
fn cpp_end_to_end() {
    let source = "#include <iostream>\nint main() {\n    for (int i = 0; i < 2; i++) {\n        std::cout << i;\n    }\n    return 0;\n}\n";
    let result = estimate(source, Language::Cpp);
    assert_eq!(result.functions[0].operations.get(OpKind::IoOperation), 2);
}

#[test]
fn typescript_end_to_end() {
    let source = "function greet(name: string): void {\n    console.log(name);\n}\n";
    let result = estimate(source, Language::TypeScript);
    assert_eq!(result.functions[0].operations.get(OpKind::IoOperation), 1);
}

#[test]
fn detection_from_content_runs_the_right_walker() {
    let mut estimator = Estimator::new();
    let result = estimator.estimate(
        "#include <stdio.h>\nint main() {\n    printf(\"hi\");\n    return 0;\n}\n",
        None,
        None,
    );
    assert_eq!(result.language, Some(Language::C));
    assert_eq!(result.functions[0].operations.get(OpKind::IoOperation), 1);
}

#[test]
fn assumptions_record_in_walk_order() {
    let source = "def f():\n    for i in range(2):\n        pass\n    for j in range(3):\n        pass\n";
    let result = estimate(source, Language::Python);
    let loop_notes: Vec<&String> = result
        .assumptions
        .iter()
        .filter(|a| a.contains("for-loop"))
        .collect();
    assert_eq!(loop_notes.len(), 2);
    assert!(loop_notes[0].contains("resolved to 2"));
    assert!(loop_notes[1].contains("resolved to 3"));
}
