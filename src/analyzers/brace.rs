//! Syntax-tree walker for brace-scoped languages: C, C++, Java, JavaScript
//! and TypeScript.
//!
//! Shares the indentation walker's counting contract: a cascading loop
//! multiplier threaded through the walk, loop headers costing one comparison
//! per estimated iteration, and recursive functions scaled by the assumed
//! recursion depth after the body walk. Node-kind names differ per grammar,
//! so the match arms cover the union and field lookups try each dialect's
//! spelling.

use std::path::PathBuf;

use crate::classify::{classify, CallClass};
use crate::consts::{floor_div, parse_int_literal, resolve_expr, ConstTable, Dialect};
use crate::counts::OperationCount;
use crate::language::Language;
use crate::model::{
    CARBON_G_PER_KWH, DEFAULT_LOOP_ITERATIONS, DEFAULT_RECURSION_DEPTH, ENERGY_PER_OP_JOULES,
    OpKind,
};
use crate::report::{AnalysisResult, FunctionAnalysis};
use crate::syntax::SyntaxNode;

const LOOP_KINDS: &[&str] = &[
    "for_statement",
    "while_statement",
    "do_statement",
    "enhanced_for_statement",
    "for_in_statement",
    "for_range_loop",
];

const DEFINITION_KINDS: &[&str] = &[
    "function_definition",
    "function_declaration",
    "generator_function_declaration",
    "method_declaration",
    "constructor_declaration",
    "method_definition",
    "class_declaration",
    "class_specifier",
    "struct_specifier",
    "abstract_class_declaration",
    "interface_declaration",
    "type_alias_declaration",
    "enum_declaration",
    "namespace_definition",
    "template_declaration",
    "using_declaration",
    "field_declaration",
];

pub struct BraceWalker {
    lang: Language,
    consts: ConstTable,
    result: AnalysisResult,
}

impl BraceWalker {
    pub fn new(lang: Language, file_path: Option<PathBuf>) -> Self {
        Self {
            lang,
            consts: ConstTable::new(),
            result: AnalysisResult::new(lang, file_path),
        }
    }

    pub fn analyze<N: SyntaxNode>(mut self, root: N) -> AnalysisResult {
        self.result
            .assumptions
            .push(format!("Energy per operation: {ENERGY_PER_OP_JOULES:e} J"));
        self.result.assumptions.push(format!(
            "Carbon intensity: {CARBON_G_PER_KWH} gCO2/kWh (global average)"
        ));

        self.extract_constants(root);
        self.walk_container(root);
        self.result
    }

    /// Walk the children of a top-level container (translation unit,
    /// namespace body, exported declaration).
    fn walk_container<N: SyntaxNode>(&mut self, container: N) {
        for child in container.named_children() {
            self.walk_item(child);
        }
    }

    fn walk_item<N: SyntaxNode>(&mut self, item: N) {
        match item.kind() {
            "function_definition"
            | "function_declaration"
            | "generator_function_declaration"
            | "method_declaration"
            | "constructor_declaration" => {
                let func = self.analyze_function(item, None);
                self.result.functions.push(func);
            }

            "class_declaration" | "class_specifier" | "struct_specifier"
            | "abstract_class_declaration" => self.analyze_class(item),

            // `const f = () => { ... }` defines a function, not a statement.
            "lexical_declaration" | "variable_declaration" => {
                let mut plain = true;
                for declarator in item.named_children() {
                    if declarator.kind() == "variable_declarator" && has_function_value(declarator)
                    {
                        let func = self.analyze_arrow_binding(declarator);
                        self.result.functions.push(func);
                        plain = false;
                    }
                }
                if plain {
                    let ops = self.analyze_statement(item, 1);
                    self.result.global_operations.merge(&ops);
                }
            }

            "export_statement" => {
                if let Some(decl) = item.child_by_field("declaration") {
                    self.walk_item(decl);
                }
            }

            "namespace_definition" | "linkage_specification" => {
                if let Some(body) = item.child_by_field("body") {
                    self.walk_container(body);
                }
            }

            "template_declaration" | "preproc_ifdef" | "preproc_if" => {
                self.walk_container(item);
            }

            "comment" | "preproc_include" | "preproc_def" | "preproc_function_def"
            | "import_statement" | "import_declaration" | "package_declaration"
            | "using_declaration" | "interface_declaration" | "type_alias_declaration"
            | "enum_declaration" | "function_signature" => {}

            // Some grammars wrap a bare `class X { ... };` in a declaration.
            "declaration" => {
                for child in item.named_children() {
                    if matches!(child.kind(), "class_specifier" | "struct_specifier") {
                        self.analyze_class(child);
                    }
                }
                let ops = self.analyze_statement(item, 1);
                self.result.global_operations.merge(&ops);
            }

            _ => {
                let ops = self.analyze_statement(item, 1);
                self.result.global_operations.merge(&ops);
            }
        }
    }

    fn analyze_class<N: SyntaxNode>(&mut self, class: N) {
        let class_name = class
            .child_by_field("name")
            .map(|n| n.text())
            .unwrap_or_default();
        let Some(body) = class.child_by_field("body") else {
            return;
        };
        for member in body.named_children() {
            match member.kind() {
                "function_definition" | "method_declaration" | "constructor_declaration"
                | "method_definition" => {
                    let func = self.analyze_function(member, Some(&class_name));
                    self.result.functions.push(func);
                }
                "class_declaration" | "class_specifier" | "abstract_class_declaration" => {
                    self.analyze_class(member)
                }
                // Field initializers sit outside any function body and are
                // not part of global scope either.
                _ => {}
            }
        }
    }

    fn analyze_function<N: SyntaxNode>(
        &mut self,
        node: N,
        class_name: Option<&str>,
    ) -> FunctionAnalysis {
        let short_name = function_short_name(node).unwrap_or_else(|| "unknown".to_string());
        self.build_function(node, node.child_by_field("body"), &short_name, class_name)
    }

    /// A `const name = function/arrow` binding analyzed as a named function.
    fn analyze_arrow_binding<N: SyntaxNode>(&mut self, declarator: N) -> FunctionAnalysis {
        let short_name = declarator
            .child_by_field("name")
            .map(|n| n.text())
            .unwrap_or_else(|| "unknown".to_string());
        let body = declarator
            .child_by_field("value")
            .and_then(|v| v.child_by_field("body"));
        self.build_function(declarator, body, &short_name, None)
    }

    fn build_function<N: SyntaxNode>(
        &mut self,
        node: N,
        body: Option<N>,
        short_name: &str,
        class_name: Option<&str>,
    ) -> FunctionAnalysis {
        let qualified = match class_name {
            Some(class) => format!("{class}.{short_name}"),
            None => short_name.to_string(),
        };
        let mut func = FunctionAnalysis::new(qualified, node.line());

        let saved = self.consts.snapshot();
        self.extract_constants(node);

        collect_calls(node, short_name, &mut func);

        if let Some(body) = body {
            if is_block(body.kind()) {
                for stmt in body.named_children() {
                    let ops = self.analyze_statement(stmt, 1);
                    func.operations.merge(&ops);
                }
            } else {
                // Expression-bodied arrow function.
                let ops = self.analyze_expression(body, 1);
                func.operations.merge(&ops);
            }
        }

        if func.is_recursive {
            func.operations = func.operations.scale(DEFAULT_RECURSION_DEPTH);
            self.result.assumptions.push(format!(
                "Function '{}' is recursive — assumed {DEFAULT_RECURSION_DEPTH} recursive calls",
                func.name
            ));
        }

        func.max_nesting = max_loop_depth(node, 0);

        self.consts.restore(saved);
        func
    }

    fn extract_constants<N: SyntaxNode>(&mut self, root: N) {
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            match node.kind() {
                "init_declarator" => {
                    let declarator = node.child_by_field("declarator");
                    let value = node.child_by_field("value");
                    if let (Some(d), Some(v)) = (declarator, value) {
                        if d.kind() == "identifier" {
                            if let Some(resolved) = self.resolve(v) {
                                self.consts.insert(d.text(), resolved);
                            }
                        }
                    }
                }
                "variable_declarator" => {
                    let name = node.child_by_field("name");
                    let value = node.child_by_field("value");
                    if let (Some(n), Some(v)) = (name, value) {
                        if n.kind() == "identifier" {
                            if let Some(resolved) = self.resolve(v) {
                                self.consts.insert(n.text(), resolved);
                            }
                        }
                    }
                }
                "assignment_expression" => {
                    let is_plain = node
                        .child_by_field("operator")
                        .map_or(true, |o| o.text() == "=");
                    let left = node.child_by_field("left");
                    let right = node.child_by_field("right");
                    if let (true, Some(l), Some(r)) = (is_plain, left, right) {
                        if l.kind() == "identifier" {
                            if let Some(resolved) = self.resolve(r) {
                                self.consts.insert(l.text(), resolved);
                            }
                        }
                    }
                }
                "preproc_def" => {
                    let name = node.child_by_field("name");
                    let value = node.child_by_field("value");
                    if let (Some(n), Some(v)) = (name, value) {
                        if let Some(parsed) = parse_int_literal(v.text().trim()) {
                            self.consts.insert(n.text(), parsed);
                        }
                    }
                }
                _ => {}
            }
            stack.extend(node.named_children());
        }
    }

    fn resolve<N: SyntaxNode>(&self, node: N) -> Option<i64> {
        resolve_expr(node, &self.consts, Dialect::Brace)
    }

    // -----------------------------------------------------------------------
    // Statements
    // -----------------------------------------------------------------------

    fn analyze_statement<N: SyntaxNode>(&mut self, node: N, mult: u64) -> OperationCount {
        let mut ops = OperationCount::new();
        match node.kind() {
            kind if is_block(kind) => {
                for stmt in node.named_children() {
                    ops.merge(&self.analyze_statement(stmt, mult));
                }
            }

            "declaration" | "local_variable_declaration" | "lexical_declaration"
            | "variable_declaration" => {
                for declarator in node.named_children() {
                    if matches!(declarator.kind(), "init_declarator" | "variable_declarator") {
                        if let Some(value) = declarator.child_by_field("value") {
                            ops.add(OpKind::Assignment, mult);
                            ops.merge(&self.analyze_expression(value, mult));
                        }
                    }
                }
            }

            "expression_statement" => {
                for child in node.named_children() {
                    ops.merge(&self.analyze_expression(child, mult));
                }
            }

            "if_statement" => {
                ops.add(OpKind::ConditionalBranch, mult);
                if let Some(cond) = node.child_by_field("condition") {
                    ops.merge(&self.analyze_expression(cond, mult));
                }
                if let Some(consequence) = node.child_by_field("consequence") {
                    ops.merge(&self.analyze_statement(consequence, mult));
                }
                if let Some(alternative) = node.child_by_field("alternative") {
                    if alternative.kind() == "else_clause" {
                        for child in alternative.named_children() {
                            ops.merge(&self.analyze_statement(child, mult));
                        }
                    } else {
                        ops.merge(&self.analyze_statement(alternative, mult));
                    }
                }
            }

            "for_statement" => {
                let iterations = self.estimate_for(node);
                self.record_loop_assumption(node.line(), iterations);

                ops.add(OpKind::Comparison, mult.saturating_mul(iterations));
                let inner = mult.saturating_mul(iterations);
                if let Some(body) = node.child_by_field("body") {
                    ops.merge(&self.analyze_statement(body, inner));
                }
            }

            // foreach loops never expose a static bound.
            "enhanced_for_statement" | "for_in_statement" | "for_range_loop" => {
                let iterations = DEFAULT_LOOP_ITERATIONS;
                self.record_loop_assumption(node.line(), iterations);

                ops.add(OpKind::Comparison, mult.saturating_mul(iterations));
                let inner = mult.saturating_mul(iterations);
                if let Some(body) = node.child_by_field("body") {
                    ops.merge(&self.analyze_statement(body, inner));
                }
            }

            "while_statement" => {
                let iterations = self.estimate_while(node);
                self.result.assumptions.push(format!(
                    "Line {}: while-loop estimated {iterations} iterations",
                    node.line()
                ));

                ops.add(OpKind::Comparison, mult.saturating_mul(iterations));
                if let Some(cond) = node.child_by_field("condition") {
                    ops.merge(&self.analyze_expression(cond, mult));
                }
                let inner = mult.saturating_mul(iterations);
                if let Some(body) = node.child_by_field("body") {
                    ops.merge(&self.analyze_statement(body, inner));
                }
            }

            "do_statement" => {
                let inner = mult.saturating_mul(DEFAULT_LOOP_ITERATIONS);
                ops.add(OpKind::Comparison, inner);
                if let Some(body) = node.child_by_field("body") {
                    ops.merge(&self.analyze_statement(body, inner));
                }
                if let Some(cond) = node.child_by_field("condition") {
                    ops.merge(&self.analyze_expression(cond, mult));
                }
            }

            "switch_statement" | "switch_expression" => {
                let scrutinee = node
                    .child_by_field("condition")
                    .or_else(|| node.child_by_field("value"));
                if let Some(value) = scrutinee {
                    ops.merge(&self.analyze_expression(value, mult));
                }
                if let Some(body) = node.child_by_field("body") {
                    for case in body.named_children() {
                        if matches!(
                            case.kind(),
                            "case_statement"
                                | "switch_case"
                                | "switch_default"
                                | "switch_block_statement_group"
                                | "switch_rule"
                        ) {
                            ops.add(OpKind::ConditionalBranch, mult);
                            for child in case.named_children() {
                                ops.merge(&self.analyze_statement(child, mult));
                            }
                        }
                    }
                }
            }

            "return_statement" => {
                for child in node.named_children() {
                    ops.merge(&self.analyze_expression(child, mult));
                }
            }

            "throw_statement" => {
                // Exception dispatch overhead.
                ops.add(OpKind::FunctionCall, mult);
            }

            "try_statement" | "try_with_resources_statement" => {
                for child in node.named_children() {
                    if is_block(child.kind()) {
                        ops.merge(&self.analyze_statement(child, mult));
                    } else if matches!(child.kind(), "catch_clause" | "finally_clause") {
                        let body = child.child_by_field("body").or_else(|| {
                            child
                                .named_children()
                                .into_iter()
                                .find(|c| is_block(c.kind()))
                        });
                        if let Some(body) = body {
                            ops.merge(&self.analyze_statement(body, mult));
                        }
                    }
                }
            }

            "labeled_statement" => {
                for child in node.named_children() {
                    ops.merge(&self.analyze_statement(child, mult));
                }
            }

            kind if DEFINITION_KINDS.contains(&kind) => {}

            "break_statement" | "continue_statement" | "empty_statement" | "goto_statement"
            | "comment" | "preproc_include" | "preproc_def" | "import_statement"
            | "import_declaration" | "package_declaration" => {}

            _ => ops.merge(&self.analyze_expression(node, mult)),
        }
        ops
    }

    // -----------------------------------------------------------------------
    // Expressions
    // -----------------------------------------------------------------------

    fn analyze_expression<N: SyntaxNode>(&mut self, node: N, mult: u64) -> OperationCount {
        let mut ops = OperationCount::new();
        match node.kind() {
            "binary_expression" => {
                let op = node
                    .child_by_field("operator")
                    .map(|o| o.text())
                    .unwrap_or_default();
                if self.lang == Language::Cpp
                    && (op == "<<" || op == ">>")
                    && node
                        .child_by_field("left")
                        .is_some_and(|l| is_cpp_stream(&l.text()))
                {
                    // Stream insertion/extraction is I/O, one per operator.
                    ops.add(OpKind::IoOperation, mult);
                } else {
                    match op.as_str() {
                        "+" => ops.add(OpKind::Addition, mult),
                        "-" => ops.add(OpKind::Subtraction, mult),
                        "*" => ops.add(OpKind::Multiplication, mult),
                        "/" | "%" => ops.add(OpKind::Division, mult),
                        "**" => ops.add(OpKind::Multiplication, mult.saturating_mul(10)),
                        "&&" | "||" | "==" | "!=" | "===" | "!==" | "<" | "<=" | ">" | ">="
                        | "instanceof" | "in" => ops.add(OpKind::Comparison, mult),
                        // Bitwise and shifts cost about an addition.
                        _ => ops.add(OpKind::Addition, mult),
                    }
                }
                if let Some(left) = node.child_by_field("left") {
                    ops.merge(&self.analyze_expression(left, mult));
                }
                if let Some(right) = node.child_by_field("right") {
                    ops.merge(&self.analyze_expression(right, mult));
                }
            }

            "unary_expression" => {
                ops.add(OpKind::Addition, mult);
                let operand = node
                    .child_by_field("argument")
                    .or_else(|| node.child_by_field("operand"))
                    .or_else(|| node.first_named_child());
                if let Some(operand) = operand {
                    ops.merge(&self.analyze_expression(operand, mult));
                }
            }

            "update_expression" => {
                if node.text().contains("++") {
                    ops.add(OpKind::Addition, mult);
                } else {
                    ops.add(OpKind::Subtraction, mult);
                }
                ops.add(OpKind::Assignment, mult);
            }

            "assignment_expression" | "augmented_assignment_expression" => {
                ops.add(OpKind::Assignment, mult);
                let op = node
                    .child_by_field("operator")
                    .map(|o| o.text())
                    .unwrap_or_else(|| "=".to_string());
                match op.as_str() {
                    "=" => {}
                    "+=" => ops.add(OpKind::Addition, mult),
                    "-=" => ops.add(OpKind::Subtraction, mult),
                    "*=" => ops.add(OpKind::Multiplication, mult),
                    "/=" | "%=" => ops.add(OpKind::Division, mult),
                    _ => {}
                }
                if let Some(right) = node.child_by_field("right") {
                    ops.merge(&self.analyze_expression(right, mult));
                }
            }

            "call_expression" | "method_invocation" => {
                ops.merge(&self.analyze_call(node, mult));
            }

            "object_creation_expression" | "new_expression" => {
                ops.add(OpKind::MemoryAllocation, mult);
                if let Some(args) = node.child_by_field("arguments") {
                    for arg in args.named_children() {
                        ops.merge(&self.analyze_expression(arg, mult));
                    }
                }
            }

            "delete_expression" => {
                // Deallocation cost.
                ops.add(OpKind::MemoryAllocation, mult);
            }

            "subscript_expression" | "array_access" => {
                ops.add(OpKind::ArrayAccess, mult);
                for child in node.named_children() {
                    ops.merge(&self.analyze_expression(child, mult));
                }
            }

            "field_expression" | "member_expression" | "field_access" => {
                let object = node
                    .child_by_field("argument")
                    .or_else(|| node.child_by_field("object"));
                if let Some(object) = object {
                    ops.merge(&self.analyze_expression(object, mult));
                }
            }

            "pointer_expression" => {
                if let Some(arg) = node.child_by_field("argument") {
                    ops.merge(&self.analyze_expression(arg, mult));
                }
            }

            "conditional_expression" | "ternary_expression" => {
                ops.add(OpKind::ConditionalBranch, mult);
                for child in node.named_children() {
                    ops.merge(&self.analyze_expression(child, mult));
                }
            }

            "cast_expression" => {
                ops.add(OpKind::FunctionCall, mult);
                if let Some(value) = node.child_by_field("value") {
                    ops.merge(&self.analyze_expression(value, mult));
                }
            }

            "sizeof_expression" => {
                ops.add(OpKind::FunctionCall, mult);
                for child in node.named_children() {
                    ops.merge(&self.analyze_expression(child, mult));
                }
            }

            "arrow_function" | "function_expression" | "lambda_expression" => {
                ops.add(OpKind::FunctionCall, mult);
                if let Some(body) = node.child_by_field("body") {
                    if is_block(body.kind()) {
                        ops.merge(&self.analyze_statement(body, mult));
                    } else {
                        ops.merge(&self.analyze_expression(body, mult));
                    }
                }
            }

            "array" | "initializer_list" | "array_initializer" => {
                let elements = node.named_children();
                if !elements.is_empty() {
                    ops.add(OpKind::MemoryAllocation, mult);
                    ops.add(OpKind::Assignment, mult.saturating_mul(elements.len() as u64));
                }
                for element in elements {
                    ops.merge(&self.analyze_expression(element, mult));
                }
            }

            "object" => {
                let pairs: Vec<N> = node
                    .named_children()
                    .into_iter()
                    .filter(|c| c.kind() == "pair")
                    .collect();
                if !pairs.is_empty() {
                    ops.add(OpKind::MemoryAllocation, mult);
                    ops.add(OpKind::Assignment, mult.saturating_mul(pairs.len() as u64));
                }
                for pair in pairs {
                    if let Some(value) = pair.child_by_field("value") {
                        ops.merge(&self.analyze_expression(value, mult));
                    }
                }
            }

            "template_string" => {
                for child in node.named_children() {
                    if child.kind() == "template_substitution" {
                        // Formatting cost per interpolated value.
                        ops.add(OpKind::FunctionCall, mult);
                        if let Some(expr) = child.first_named_child() {
                            ops.merge(&self.analyze_expression(expr, mult));
                        }
                    }
                }
            }

            "identifier" | "number_literal" | "number" | "string_literal" | "string"
            | "char_literal" | "true" | "false" | "null" | "this" => {}

            _ => {
                for child in node.named_children() {
                    ops.merge(&self.analyze_expression(child, mult));
                }
            }
        }
        ops
    }

    fn analyze_call<N: SyntaxNode>(&mut self, node: N, mult: u64) -> OperationCount {
        let mut ops = OperationCount::new();
        let (short, dotted) = call_names(node);

        match short {
            Some(ref name) => match classify(self.lang, name, dotted.as_deref()) {
                CallClass::Io => ops.add(OpKind::IoOperation, mult),
                CallClass::Network => ops.add(OpKind::NetworkOperation, mult),
                CallClass::Allocation => ops.add(OpKind::MemoryAllocation, mult),
                CallClass::Plain => ops.add(OpKind::FunctionCall, mult),
            },
            None => ops.add(OpKind::FunctionCall, mult),
        }

        if let Some(args) = node.child_by_field("arguments") {
            for arg in args.named_children() {
                if arg.kind() != "comment" {
                    ops.merge(&self.analyze_expression(arg, mult));
                }
            }
        }
        ops
    }

    // -----------------------------------------------------------------------
    // Loop-bound estimation
    // -----------------------------------------------------------------------

    fn record_loop_assumption(&mut self, line: usize, iterations: u64) {
        if iterations != DEFAULT_LOOP_ITERATIONS {
            self.result
                .assumptions
                .push(format!("Line {line}: for-loop resolved to {iterations} iterations"));
        } else {
            self.result.assumptions.push(format!(
                "Line {line}: for-loop iterations unknown, assumed {DEFAULT_LOOP_ITERATIONS}"
            ));
        }
    }

    /// Estimate `for (init; cond; step)` from its three header parts.
    fn estimate_for<N: SyntaxNode>(&self, node: N) -> u64 {
        let init = node
            .child_by_field("initializer")
            .or_else(|| node.child_by_field("init"));
        let cond = node.child_by_field("condition").map(unwrap_wrappers);
        let update = node
            .child_by_field("update")
            .or_else(|| node.child_by_field("increment"));

        let Some((var, start)) = init.and_then(|i| self.initializer_value(i)) else {
            return DEFAULT_LOOP_ITERATIONS;
        };
        let Some((op, end)) = cond.and_then(|c| self.condition_bound(c, &var)) else {
            return DEFAULT_LOOP_ITERATIONS;
        };
        let Some(step) = update.and_then(|u| step_value(u, &var, &self.consts)) else {
            return DEFAULT_LOOP_ITERATIONS;
        };

        let count = match op.as_str() {
            "<" if step > 0 => ceil_div(end - start, step),
            "<=" if step > 0 => ceil_div(end - start + 1, step),
            ">" if step < 0 => ceil_div(start - end, -step),
            ">=" if step < 0 => ceil_div(start - end + 1, -step),
            _ => return DEFAULT_LOOP_ITERATIONS,
        };
        count.max(0) as u64
    }

    /// `(variable, start)` from the loop initializer.
    fn initializer_value<N: SyntaxNode>(&self, init: N) -> Option<(String, i64)> {
        match init.kind() {
            "declaration" | "local_variable_declaration" | "lexical_declaration"
            | "variable_declaration" => {
                for declarator in init.named_children() {
                    match declarator.kind() {
                        "init_declarator" => {
                            let name = declarator.child_by_field("declarator")?;
                            let value = declarator.child_by_field("value")?;
                            if name.kind() == "identifier" {
                                return Some((name.text(), self.resolve(value)?));
                            }
                        }
                        "variable_declarator" => {
                            let name = declarator.child_by_field("name")?;
                            let value = declarator.child_by_field("value")?;
                            if name.kind() == "identifier" {
                                return Some((name.text(), self.resolve(value)?));
                            }
                        }
                        _ => {}
                    }
                }
                None
            }
            "assignment_expression" => {
                let left = init.child_by_field("left")?;
                let right = init.child_by_field("right")?;
                (left.kind() == "identifier")
                    .then(|| self.resolve(right).map(|v| (left.text(), v)))
                    .flatten()
            }
            "expression_statement" => self.initializer_value(init.first_named_child()?),
            _ => None,
        }
    }

    /// `(operator, bound)` from a `var < N`-shaped condition.
    fn condition_bound<N: SyntaxNode>(&self, cond: N, var: &str) -> Option<(String, i64)> {
        if cond.kind() != "binary_expression" {
            return None;
        }
        let left = cond.child_by_field("left")?;
        let op = cond.child_by_field("operator")?.text();
        if !matches!(op.as_str(), "<" | "<=" | ">" | ">=") {
            return None;
        }
        if left.kind() != "identifier" || left.text() != var {
            return None;
        }
        let bound = self.resolve(cond.child_by_field("right")?)?;
        Some((op, bound))
    }

    fn estimate_while<N: SyntaxNode>(&self, node: N) -> u64 {
        let Some(cond) = node.child_by_field("condition").map(unwrap_wrappers) else {
            return DEFAULT_LOOP_ITERATIONS;
        };
        if cond.kind() != "binary_expression" {
            return DEFAULT_LOOP_ITERATIONS;
        }
        let op = cond
            .child_by_field("operator")
            .map(|o| o.text())
            .unwrap_or_default();
        let left = cond.child_by_field("left");
        let right = cond.child_by_field("right");

        if let (Some(left), Some(right)) = (left, right) {
            if left.kind() == "identifier" {
                let var = left.text();
                match op.as_str() {
                    "<" | "<=" => {
                        if let Some(upper) = self.resolve(right) {
                            if let Some(step) = self.body_step(node, &var) {
                                if step > 0 {
                                    return floor_div(upper, step).max(1) as u64;
                                }
                            }
                            return upper.max(0) as u64;
                        }
                    }
                    ">" | ">=" => {
                        if let Some(lower) = self.resolve(right) {
                            if let Some(start) = self.consts.get(&var) {
                                return (start - lower).abs().max(1) as u64;
                            }
                        }
                    }
                    _ => {}
                }
            }
        }
        if op == "<=" {
            // `low <= high` reads like a halving search: ~log2(1e6).
            return 20;
        }
        DEFAULT_LOOP_ITERATIONS
    }

    /// Positive stride applied to `var` inside the loop body, if any.
    fn body_step<N: SyntaxNode>(&self, loop_node: N, var: &str) -> Option<i64> {
        let body = loop_node.child_by_field("body")?;
        let stmts = if is_block(body.kind()) {
            body.named_children()
        } else {
            vec![body]
        };
        for stmt in stmts {
            let expr = if stmt.kind() == "expression_statement" {
                stmt.first_named_child()?
            } else {
                stmt
            };
            if let Some(step) = step_value(expr, var, &self.consts) {
                if step > 0 {
                    return Some(step);
                }
            }
        }
        None
    }
}

// ---------------------------------------------------------------------------
// Free helpers
// ---------------------------------------------------------------------------

fn is_block(kind: &str) -> bool {
    matches!(
        kind,
        "compound_statement" | "statement_block" | "block" | "declaration_list"
    )
}

fn is_cpp_stream(text: &str) -> bool {
    ["cout", "cerr", "cin", "clog"]
        .iter()
        .any(|stream| text.contains(stream))
}

/// Step applied to `var` by an update expression: `var++` is 1, `var -= 2`
/// is -2.
fn step_value<N: SyntaxNode>(node: N, var: &str, consts: &ConstTable) -> Option<i64> {
    let node = if node.kind() == "expression_statement" {
        node.first_named_child()?
    } else {
        node
    };
    match node.kind() {
        "update_expression" => {
            let target = node
                .child_by_field("argument")
                .or_else(|| node.first_named_child())?;
            if target.kind() != "identifier" || target.text() != var {
                return None;
            }
            Some(if node.text().contains("++") { 1 } else { -1 })
        }
        "assignment_expression" | "augmented_assignment_expression" => {
            let left = node.child_by_field("left")?;
            if left.kind() != "identifier" || left.text() != var {
                return None;
            }
            let op = node.child_by_field("operator")?.text();
            let amount = resolve_expr(node.child_by_field("right")?, consts, Dialect::Brace)?;
            match op.as_str() {
                "+=" => Some(amount),
                "-=" => Some(-amount),
                _ => None,
            }
        }
        _ => None,
    }
}

/// Strip the wrapper nodes grammars put around conditions.
fn unwrap_wrappers<N: SyntaxNode>(node: N) -> N {
    let mut current = node;
    while matches!(
        current.kind(),
        "parenthesized_expression" | "condition_clause" | "expression_statement"
    ) {
        match current.first_named_child() {
            Some(inner) => current = inner,
            None => break,
        }
    }
    current
}

fn ceil_div(a: i64, b: i64) -> i64 {
    if a <= 0 {
        0
    } else {
        (a + b - 1) / b
    }
}

/// Name of a function definition, through whatever declarator nesting the
/// grammar uses.
fn function_short_name<N: SyntaxNode>(node: N) -> Option<String> {
    if let Some(name) = node.child_by_field("name") {
        return Some(name.text());
    }
    // C/C++: descend through the declarator chain.
    let mut current = node.child_by_field("declarator")?;
    loop {
        match current.kind() {
            "function_declarator" | "pointer_declarator" | "reference_declarator"
            | "parenthesized_declarator" => {
                current = current
                    .child_by_field("declarator")
                    .or_else(|| current.first_named_child())?;
            }
            "identifier" | "field_identifier" | "qualified_identifier" | "destructor_name"
            | "operator_name" => return Some(current.text()),
            _ => return None,
        }
    }
}

/// `(short, dotted)` names of a call expression or method invocation.
fn call_names<N: SyntaxNode>(node: N) -> (Option<String>, Option<String>) {
    if node.kind() == "method_invocation" {
        let name = node.child_by_field("name").map(|n| n.text());
        let dotted = match (node.child_by_field("object"), &name) {
            (Some(object), Some(name)) => Some(format!("{}.{name}", object.text())),
            (None, Some(name)) => Some(name.clone()),
            _ => None,
        };
        return (name, dotted);
    }

    let Some(callee) = node.child_by_field("function") else {
        return (None, None);
    };
    match callee.kind() {
        "identifier" => {
            let name = callee.text();
            (Some(name.clone()), Some(name))
        }
        "member_expression" | "field_expression" => {
            let property = callee
                .child_by_field("property")
                .or_else(|| callee.child_by_field("field"))
                .map(|p| p.text());
            (property, dotted_chain(callee))
        }
        "qualified_identifier" | "scoped_identifier" => {
            let text = callee.text();
            let short = text.rsplit("::").next().map(|s| s.to_string());
            (short, Some(text))
        }
        _ => (None, None),
    }
}

/// Dotted access path, omitting any non-name base such as a chained call.
fn dotted_chain<N: SyntaxNode>(node: N) -> Option<String> {
    let mut parts: Vec<String> = Vec::new();
    let mut current = node;
    while matches!(current.kind(), "member_expression" | "field_expression") {
        let property = current
            .child_by_field("property")
            .or_else(|| current.child_by_field("field"))?;
        parts.push(property.text());
        current = current
            .child_by_field("object")
            .or_else(|| current.child_by_field("argument"))?;
    }
    if matches!(current.kind(), "identifier" | "this" | "qualified_identifier") {
        parts.push(current.text());
    }
    if parts.is_empty() {
        return None;
    }
    parts.reverse();
    Some(parts.join("."))
}

fn collect_calls<N: SyntaxNode>(node: N, short_name: &str, func: &mut FunctionAnalysis) {
    let mut stack = vec![node];
    while let Some(current) = stack.pop() {
        if matches!(current.kind(), "call_expression" | "method_invocation") {
            let (name, _) = call_names(current);
            if let Some(name) = name {
                if name == short_name {
                    func.is_recursive = true;
                }
                func.calls.push(name);
            }
        }
        stack.extend(current.named_children().into_iter().rev());
    }
}

fn max_loop_depth<N: SyntaxNode>(node: N, depth: u32) -> u32 {
    let mut max = depth;
    for child in node.named_children() {
        let child_depth = if LOOP_KINDS.contains(&child.kind()) {
            max_loop_depth(child, depth + 1)
        } else {
            max_loop_depth(child, depth)
        };
        max = max.max(child_depth);
    }
    max
}

fn has_function_value<N: SyntaxNode>(declarator: N) -> bool {
    declarator.child_by_field("value").is_some_and(|v| {
        matches!(
            v.kind(),
            "arrow_function" | "function_expression" | "generator_function"
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::ParserRegistry;
    use crate::syntax::TsNode;

    fn analyze(lang: Language, source: &str) -> AnalysisResult {
        let tree = ParserRegistry::new().parse(lang, source).unwrap();
        let root = TsNode::new(tree.root_node(), source);
        BraceWalker::new(lang, None).analyze(root)
    }

    #[test]
    fn c_for_loop_with_printf() {
        let source = "int main() {\n    for (int i = 0; i < 3; i++) { printf(\"x\"); }\n    return 0;\n}\n";
        let result = analyze(Language::C, source);
        assert_eq!(result.functions.len(), 1);
        let main = &result.functions[0];
        assert_eq!(main.name, "main");
        assert_eq!(main.max_nesting, 1);
        assert_eq!(main.operations.get(OpKind::IoOperation), 3);
        assert!(main.operations.get(OpKind::Comparison) >= 3);
        assert!(result
            .assumptions
            .iter()
            .any(|a| a.contains("for-loop resolved to 3 iterations")));
    }

    #[test]
    fn c_for_loop_with_step() {
        let source = "void f() {\n    for (int i = 0; i < 10; i += 3) { g(); }\n}\n";
        let result = analyze(Language::C, source);
        // ceil(10 / 3) = 4 calls
        assert_eq!(result.functions[0].operations.get(OpKind::FunctionCall), 4);
    }

    #[test]
    fn c_downward_loop() {
        let source = "void f() {\n    for (int i = 10; i > 0; i--) { g(); }\n}\n";
        let result = analyze(Language::C, source);
        assert_eq!(result.functions[0].operations.get(OpKind::FunctionCall), 10);
    }

    #[test]
    fn c_nested_loops_cascade() {
        let source =
            "void f() {\n    for (int i = 0; i < 4; i++) {\n        for (int j = 0; j < 5; j++) {\n            printf(\"x\");\n        }\n    }\n}\n";
        let result = analyze(Language::C, source);
        let f = &result.functions[0];
        assert_eq!(f.operations.get(OpKind::IoOperation), 20);
        assert_eq!(f.operations.get(OpKind::Comparison), 24);
        assert_eq!(f.max_nesting, 2);
    }

    #[test]
    fn c_malloc_and_free_are_allocation() {
        let source = "void f(int n) {\n    int *p = malloc(n);\n    free(p);\n}\n";
        let result = analyze(Language::C, source);
        assert_eq!(result.functions[0].operations.get(OpKind::MemoryAllocation), 2);
    }

    #[test]
    fn c_recursion_scales_by_depth() {
        let source =
            "int fact(int n) {\n    if (n < 2) return 1;\n    return n * fact(n - 1);\n}\n";
        let result = analyze(Language::C, source);
        let fact = &result.functions[0];
        assert!(fact.is_recursive);
        for &kind in OpKind::all() {
            assert_eq!(fact.operations.get(kind) % DEFAULT_RECURSION_DEPTH, 0);
        }
        assert_eq!(fact.operations.get(OpKind::FunctionCall), 10);
        assert_eq!(fact.operations.get(OpKind::Multiplication), 10);
    }

    #[test]
    fn c_while_counter_pattern() {
        let source = "void f() {\n    int i = 0;\n    while (i < 30) {\n        i += 3;\n    }\n}\n";
        let result = analyze(Language::C, source);
        assert!(result
            .assumptions
            .iter()
            .any(|a| a.contains("while-loop estimated 10 iterations")));
    }

    #[test]
    fn c_define_feeds_loop_bound() {
        let source = "#define SIZE 8\nvoid f() {\n    for (int i = 0; i < SIZE; i++) { g(); }\n}\n";
        let result = analyze(Language::C, source);
        assert_eq!(result.functions[0].operations.get(OpKind::FunctionCall), 8);
    }

    #[test]
    fn cpp_stream_output_is_io() {
        let source = "#include <iostream>\nint main() {\n    std::cout << \"a\" << 1;\n    return 0;\n}\n";
        let result = analyze(Language::Cpp, source);
        assert_eq!(result.functions[0].operations.get(OpKind::IoOperation), 2);
    }

    #[test]
    fn cpp_new_and_delete() {
        let source = "void f() {\n    int *p = new int(5);\n    delete p;\n}\n";
        let result = analyze(Language::Cpp, source);
        assert_eq!(result.functions[0].operations.get(OpKind::MemoryAllocation), 2);
    }

    #[test]
    fn cpp_class_methods_are_qualified() {
        let source =
            "class Counter {\n    int n;\npublic:\n    void bump() { n++; }\n};\n";
        let result = analyze(Language::Cpp, source);
        assert_eq!(result.functions.len(), 1);
        assert_eq!(result.functions[0].name, "Counter.bump");
    }

    #[test]
    fn java_methods_and_io() {
        let source = "public class Main {\n    public static void main(String[] args) {\n        for (int i = 0; i < 3; i++) {\n            System.out.println(i);\n        }\n    }\n}\n";
        let result = analyze(Language::Java, source);
        assert_eq!(result.functions.len(), 1);
        let main = &result.functions[0];
        assert_eq!(main.name, "Main.main");
        assert_eq!(main.operations.get(OpKind::IoOperation), 3);
        assert!(main.operations.get(OpKind::Comparison) >= 3);
    }

    #[test]
    fn java_object_creation_is_allocation() {
        let source = "public class A {\n    void f() {\n        StringBuilder sb = new StringBuilder();\n    }\n}\n";
        let result = analyze(Language::Java, source);
        assert_eq!(result.functions[0].operations.get(OpKind::MemoryAllocation), 1);
    }

    #[test]
    fn java_enhanced_for_uses_default() {
        let source = "public class A {\n    int sum(int[] xs) {\n        int t = 0;\n        for (int x : xs) { t += x; }\n        return t;\n    }\n}\n";
        let result = analyze(Language::Java, source);
        let ops = &result.functions[0].operations;
        assert_eq!(ops.get(OpKind::Addition), DEFAULT_LOOP_ITERATIONS);
        assert_eq!(ops.get(OpKind::Comparison), DEFAULT_LOOP_ITERATIONS);
    }

    #[test]
    fn javascript_functions_and_console() {
        let source = "function greet(name) {\n    console.log(`hi ${name}`);\n}\n";
        let result = analyze(Language::JavaScript, source);
        let greet = &result.functions[0];
        assert_eq!(greet.name, "greet");
        assert_eq!(greet.operations.get(OpKind::IoOperation), 1);
        // One formatting call for the template substitution.
        assert_eq!(greet.operations.get(OpKind::FunctionCall), 1);
    }

    #[test]
    fn javascript_arrow_binding_is_a_function() {
        let source = "const double = (x) => {\n    return x * 2;\n};\n";
        let result = analyze(Language::JavaScript, source);
        assert_eq!(result.functions.len(), 1);
        assert_eq!(result.functions[0].name, "double");
        assert_eq!(result.functions[0].operations.get(OpKind::Multiplication), 1);
    }

    #[test]
    fn javascript_fetch_is_network() {
        let source = "function load(url) {\n    return fetch(url);\n}\n";
        let result = analyze(Language::JavaScript, source);
        assert_eq!(result.functions[0].operations.get(OpKind::NetworkOperation), 1);
    }

    #[test]
    fn javascript_for_of_uses_default() {
        let source = "function f(xs) {\n    for (const x of xs) {\n        g(x);\n    }\n}\n";
        let result = analyze(Language::JavaScript, source);
        assert_eq!(
            result.functions[0].operations.get(OpKind::FunctionCall),
            DEFAULT_LOOP_ITERATIONS
        );
    }

    #[test]
    fn javascript_array_and_object_literals() {
        let source = "function f() {\n    const xs = [1, 2, 3];\n    const o = { a: 1, b: 2 };\n}\n";
        let result = analyze(Language::JavaScript, source);
        let ops = &result.functions[0].operations;
        assert_eq!(ops.get(OpKind::MemoryAllocation), 2);
        // 2 declarator assignments + 3 elements + 2 pairs
        assert_eq!(ops.get(OpKind::Assignment), 7);
    }

    #[test]
    fn typescript_reuses_javascript_handling() {
        let source = "function add(a: number, b: number): number {\n    console.log(a);\n    return a + b;\n}\n";
        let result = analyze(Language::TypeScript, source);
        let add = &result.functions[0];
        assert_eq!(add.operations.get(OpKind::IoOperation), 1);
        assert_eq!(add.operations.get(OpKind::Addition), 1);
    }

    #[test]
    fn update_expression_counts_arith_plus_assignment() {
        let source = "void f() {\n    int i = 0;\n    i++;\n    i--;\n}\n";
        let result = analyze(Language::C, source);
        let ops = &result.functions[0].operations;
        assert_eq!(ops.get(OpKind::Addition), 1);
        assert_eq!(ops.get(OpKind::Subtraction), 1);
        // declarator + two updates
        assert_eq!(ops.get(OpKind::Assignment), 3);
    }

    #[test]
    fn ternary_and_switch_count_branches() {
        let source = "int f(int x) {\n    int y = x > 0 ? 1 : 2;\n    switch (x) {\n        case 1: return 1;\n        case 2: return 2;\n        default: return y;\n    }\n}\n";
        let result = analyze(Language::C, source);
        let ops = &result.functions[0].operations;
        // ternary + 3 case labels
        assert_eq!(ops.get(OpKind::ConditionalBranch), 4);
    }

    #[test]
    fn global_statements_counted_outside_functions() {
        let source = "int counter = 5;\nvoid f() { }\n";
        let result = analyze(Language::C, source);
        assert_eq!(result.global_operations.get(OpKind::Assignment), 1);
    }

    #[test]
    fn do_while_uses_default_iterations() {
        let source = "void f() {\n    do {\n        g();\n    } while (more());\n}\n";
        let result = analyze(Language::C, source);
        let ops = &result.functions[0].operations;
        assert_eq!(ops.get(OpKind::FunctionCall), DEFAULT_LOOP_ITERATIONS + 1);
    }
}
