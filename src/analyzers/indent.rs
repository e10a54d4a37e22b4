//! Syntax-tree walker for indentation-scoped languages (Python).
//!
//! Every statement inside a loop body is counted as if executed once per
//! iteration of every enclosing loop: the multiplier cascades down the walk
//! as a parameter. A `range(50)` loop holding ten `print` calls therefore
//! contributes 500 I/O operations.

use std::path::PathBuf;

use crate::classify::{classify, CallClass};
use crate::consts::{floor_div, resolve_expr, ConstTable, Dialect};
use crate::counts::OperationCount;
use crate::language::Language;
use crate::model::{
    CARBON_G_PER_KWH, DEFAULT_LOOP_ITERATIONS, DEFAULT_RECURSION_DEPTH, ENERGY_PER_OP_JOULES,
    OpKind,
};
use crate::report::{AnalysisResult, FunctionAnalysis};
use crate::syntax::SyntaxNode;

pub struct IndentWalker {
    consts: ConstTable,
    result: AnalysisResult,
}

impl IndentWalker {
    pub fn new(file_path: Option<PathBuf>) -> Self {
        Self {
            consts: ConstTable::new(),
            result: AnalysisResult::new(Language::Python, file_path),
        }
    }

    pub fn analyze<N: SyntaxNode>(mut self, root: N) -> AnalysisResult {
        self.result
            .assumptions
            .push(format!("Energy per operation: {ENERGY_PER_OP_JOULES:e} J"));
        self.result.assumptions.push(format!(
            "Carbon intensity: {CARBON_G_PER_KWH} gCO2/kWh (global average)"
        ));

        // Pre-pass: record every `name = <constant>` in the file so loop
        // bounds like `range(N)` resolve later.
        self.extract_constants(root);

        for child in root.named_children() {
            match child.kind() {
                "function_definition" => {
                    let func = self.analyze_function(child, None);
                    self.result.functions.push(func);
                }
                "decorated_definition" => {
                    if let Some(def) = child.child_by_field("definition") {
                        match def.kind() {
                            "function_definition" => {
                                let func = self.analyze_function(def, None);
                                self.result.functions.push(func);
                            }
                            "class_definition" => self.analyze_class(def),
                            _ => {}
                        }
                    }
                }
                "class_definition" => self.analyze_class(child),
                "comment" => {}
                _ => {
                    let ops = self.analyze_statement(child, 1);
                    self.result.global_operations.merge(&ops);
                }
            }
        }

        self.result
    }

    fn analyze_class<N: SyntaxNode>(&mut self, class: N) {
        let class_name = class
            .child_by_field("name")
            .map(|n| n.text())
            .unwrap_or_default();
        let Some(body) = class.child_by_field("body") else {
            return;
        };
        for item in body.named_children() {
            let def = if item.kind() == "decorated_definition" {
                item.child_by_field("definition")
            } else {
                Some(item)
            };
            if let Some(def) = def {
                if def.kind() == "function_definition" {
                    let func = self.analyze_function(def, Some(&class_name));
                    self.result.functions.push(func);
                }
            }
        }
    }

    fn analyze_function<N: SyntaxNode>(
        &mut self,
        node: N,
        class_name: Option<&str>,
    ) -> FunctionAnalysis {
        let short_name = node
            .child_by_field("name")
            .map(|n| n.text())
            .unwrap_or_default();
        let qualified = match class_name {
            Some(class) => format!("{class}.{short_name}"),
            None => short_name.clone(),
        };
        let mut func = FunctionAnalysis::new(qualified, node.line());

        // Function-local constants shadow outer ones until the walk ends.
        let saved = self.consts.snapshot();
        self.extract_constants(node);

        collect_calls(node, &short_name, &mut func);

        if let Some(body) = node.child_by_field("body") {
            for stmt in body.named_children() {
                let ops = self.analyze_statement(stmt, 1);
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

    /// Record `identifier = <resolvable integer>` assignments in the subtree.
    fn extract_constants<N: SyntaxNode>(&mut self, root: N) {
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if node.kind() == "assignment" {
                if let (Some(left), Some(right)) =
                    (node.child_by_field("left"), node.child_by_field("right"))
                {
                    if left.kind() == "identifier" {
                        if let Some(value) = self.resolve(right) {
                            self.consts.insert(left.text(), value);
                        }
                    }
                }
            }
            stack.extend(node.named_children());
        }
    }

    fn resolve<N: SyntaxNode>(&self, node: N) -> Option<i64> {
        resolve_expr(node, &self.consts, Dialect::Indentation)
    }

    // -----------------------------------------------------------------------
    // Statements
    // -----------------------------------------------------------------------

    fn analyze_statement<N: SyntaxNode>(&mut self, node: N, mult: u64) -> OperationCount {
        let mut ops = OperationCount::new();
        match node.kind() {
            "expression_statement" => {
                for child in node.named_children() {
                    ops.merge(&self.analyze_statement(child, mult));
                }
            }

            "assignment" => {
                ops.add(OpKind::Assignment, mult);
                if let Some(right) = node.child_by_field("right") {
                    ops.merge(&self.analyze_expression(right, mult));
                }
            }

            "augmented_assignment" => {
                ops.add(OpKind::Assignment, mult);
                if let Some(right) = node.child_by_field("right") {
                    ops.merge(&self.analyze_expression(right, mult));
                }
                if let Some(op) = node.child_by_field("operator") {
                    match op.text().as_str() {
                        "+=" => ops.add(OpKind::Addition, mult),
                        "-=" => ops.add(OpKind::Subtraction, mult),
                        "*=" | "@=" => ops.add(OpKind::Multiplication, mult),
                        "/=" | "//=" | "%=" => ops.add(OpKind::Division, mult),
                        _ => {}
                    }
                }
            }

            "if_statement" => {
                ops.add(OpKind::ConditionalBranch, mult);
                if let Some(cond) = node.child_by_field("condition") {
                    ops.merge(&self.analyze_expression(cond, mult));
                }
                if let Some(consequence) = node.child_by_field("consequence") {
                    for stmt in consequence.named_children() {
                        ops.merge(&self.analyze_statement(stmt, mult));
                    }
                }
                for clause in node.named_children() {
                    match clause.kind() {
                        "elif_clause" => {
                            ops.add(OpKind::ConditionalBranch, mult);
                            if let Some(cond) = clause.child_by_field("condition") {
                                ops.merge(&self.analyze_expression(cond, mult));
                            }
                            if let Some(body) = clause.child_by_field("consequence") {
                                for stmt in body.named_children() {
                                    ops.merge(&self.analyze_statement(stmt, mult));
                                }
                            }
                        }
                        "else_clause" => ops.merge(&self.analyze_else_body(clause, mult)),
                        _ => {}
                    }
                }
            }

            "for_statement" => {
                let iterations = self.estimate_for(node);
                self.record_loop_assumption(node.line(), iterations);

                // The loop condition is checked once per iteration.
                ops.add(OpKind::Comparison, mult.saturating_mul(iterations));
                let inner = mult.saturating_mul(iterations);
                if let Some(body) = node.child_by_field("body") {
                    for stmt in body.named_children() {
                        ops.merge(&self.analyze_statement(stmt, inner));
                    }
                }
                if let Some(alt) = node.child_by_field("alternative") {
                    ops.merge(&self.analyze_else_body(alt, mult));
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
                    for stmt in body.named_children() {
                        ops.merge(&self.analyze_statement(stmt, inner));
                    }
                }
                if let Some(alt) = node.child_by_field("alternative") {
                    ops.merge(&self.analyze_else_body(alt, mult));
                }
            }

            "try_statement" => {
                // try body, every except handler, else and finally all walk
                // at the enclosing multiplier.
                for child in node.named_children() {
                    match child.kind() {
                        "block" => {
                            for stmt in child.named_children() {
                                ops.merge(&self.analyze_statement(stmt, mult));
                            }
                        }
                        "except_clause" | "except_group_clause" | "finally_clause" => {
                            for inner in child.named_children() {
                                if inner.kind() == "block" {
                                    for stmt in inner.named_children() {
                                        ops.merge(&self.analyze_statement(stmt, mult));
                                    }
                                }
                            }
                        }
                        "else_clause" => ops.merge(&self.analyze_else_body(child, mult)),
                        _ => {}
                    }
                }
            }

            "with_statement" => {
                for child in node.named_children() {
                    if child.kind() == "with_clause" {
                        for item in child.named_children() {
                            let value = item.child_by_field("value").or_else(|| {
                                item.first_named_child()
                            });
                            if let Some(value) = value {
                                ops.merge(&self.analyze_expression(value, mult));
                            }
                        }
                    }
                }
                if let Some(body) = node.child_by_field("body") {
                    for stmt in body.named_children() {
                        ops.merge(&self.analyze_statement(stmt, mult));
                    }
                }
            }

            "return_statement" => {
                for child in node.named_children() {
                    ops.merge(&self.analyze_expression(child, mult));
                }
            }

            "delete_statement" => {
                // Deallocation costs about as much as allocation.
                ops.add(OpKind::MemoryAllocation, mult);
            }

            "raise_statement" => {
                ops.add(OpKind::FunctionCall, mult);
            }

            // Definitions introduce callable scope; their bodies are not
            // executed here.
            "function_definition" | "class_definition" | "decorated_definition" => {}

            "pass_statement" | "break_statement" | "continue_statement" | "global_statement"
            | "nonlocal_statement" | "import_statement" | "import_from_statement"
            | "future_import_statement" | "comment" => {}

            _ => ops.merge(&self.analyze_expression(node, mult)),
        }
        ops
    }

    fn analyze_else_body<N: SyntaxNode>(&mut self, clause: N, mult: u64) -> OperationCount {
        let mut ops = OperationCount::new();
        // Grammars vary: the body may sit behind a `body` field or be a
        // direct block child.
        let body = clause
            .child_by_field("body")
            .or_else(|| clause.named_children().into_iter().find(|c| c.kind() == "block"));
        if let Some(body) = body {
            for stmt in body.named_children() {
                ops.merge(&self.analyze_statement(stmt, mult));
            }
        }
        ops
    }

    // -----------------------------------------------------------------------
    // Expressions
    // -----------------------------------------------------------------------

    fn analyze_expression<N: SyntaxNode>(&mut self, node: N, mult: u64) -> OperationCount {
        let mut ops = OperationCount::new();
        match node.kind() {
            "binary_operator" => {
                let op = node
                    .child_by_field("operator")
                    .map(|o| o.text())
                    .unwrap_or_default();
                match op.as_str() {
                    "+" => ops.add(OpKind::Addition, mult),
                    "-" => ops.add(OpKind::Subtraction, mult),
                    "*" | "@" => ops.add(OpKind::Multiplication, mult),
                    "/" | "//" | "%" => ops.add(OpKind::Division, mult),
                    // Exponentiation costs roughly several multiplications.
                    "**" => ops.add(OpKind::Multiplication, mult.saturating_mul(10)),
                    _ => ops.add(OpKind::Addition, mult),
                }
                if let Some(left) = node.child_by_field("left") {
                    ops.merge(&self.analyze_expression(left, mult));
                }
                if let Some(right) = node.child_by_field("right") {
                    ops.merge(&self.analyze_expression(right, mult));
                }
            }

            "comparison_operator" => {
                let operands = node.named_children();
                let operators = operands.len().saturating_sub(1).max(1) as u64;
                ops.add(OpKind::Comparison, mult.saturating_mul(operators));
                for operand in operands {
                    ops.merge(&self.analyze_expression(operand, mult));
                }
            }

            "boolean_operator" => {
                ops.add(OpKind::Comparison, mult);
                if let Some(left) = node.child_by_field("left") {
                    ops.merge(&self.analyze_expression(left, mult));
                }
                if let Some(right) = node.child_by_field("right") {
                    ops.merge(&self.analyze_expression(right, mult));
                }
            }

            "not_operator" => {
                ops.add(OpKind::Addition, mult);
                if let Some(arg) = node.child_by_field("argument") {
                    ops.merge(&self.analyze_expression(arg, mult));
                }
            }

            "unary_operator" => {
                ops.add(OpKind::Addition, mult);
                if let Some(arg) = node.child_by_field("argument") {
                    ops.merge(&self.analyze_expression(arg, mult));
                }
            }

            "call" => ops.merge(&self.analyze_call(node, mult)),

            "subscript" => {
                ops.add(OpKind::ArrayAccess, mult);
                for child in node.named_children() {
                    ops.merge(&self.analyze_expression(child, mult));
                }
            }

            "attribute" => {
                if let Some(object) = node.child_by_field("object") {
                    ops.merge(&self.analyze_expression(object, mult));
                }
            }

            "conditional_expression" => {
                ops.add(OpKind::ConditionalBranch, mult);
                for child in node.named_children() {
                    ops.merge(&self.analyze_expression(child, mult));
                }
            }

            "list" | "tuple" | "set" | "expression_list" => {
                let elements = node.named_children();
                if !elements.is_empty() {
                    ops.add(OpKind::MemoryAllocation, mult);
                    ops.add(OpKind::Assignment, mult.saturating_mul(elements.len() as u64));
                }
                for element in elements {
                    ops.merge(&self.analyze_expression(element, mult));
                }
            }

            "dictionary" => {
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
                    if let Some(key) = pair.child_by_field("key") {
                        ops.merge(&self.analyze_expression(key, mult));
                    }
                    if let Some(value) = pair.child_by_field("value") {
                        ops.merge(&self.analyze_expression(value, mult));
                    }
                }
            }

            "list_comprehension" | "set_comprehension" | "generator_expression"
            | "dictionary_comprehension" => {
                ops.merge(&self.analyze_comprehension(node, mult));
            }

            "string" | "concatenated_string" => {
                for child in node.named_children() {
                    if child.kind() == "interpolation" {
                        // Each interpolated value is formatted into the string.
                        ops.add(OpKind::FunctionCall, mult);
                        if let Some(expr) = child.first_named_child() {
                            ops.merge(&self.analyze_expression(expr, mult));
                        }
                    }
                }
            }

            // A lambda body only runs when called.
            "lambda" => {}

            "identifier" | "integer" | "float" | "true" | "false" | "none" | "ellipsis" => {}

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
        let short = short_call_name(node);
        let dotted = dotted_call_name(node);

        match short {
            Some(ref name) => {
                match classify(Language::Python, name, dotted.as_deref()) {
                    CallClass::Io => ops.add(OpKind::IoOperation, mult),
                    CallClass::Network => ops.add(OpKind::NetworkOperation, mult),
                    CallClass::Allocation => ops.add(OpKind::MemoryAllocation, mult),
                    CallClass::Plain => match name.as_str() {
                        // Sorting is O(n log n); n defaults to 100, log term ~7.
                        "sorted" | "sort" => {
                            let n = mult.saturating_mul(DEFAULT_LOOP_ITERATIONS * 7);
                            ops.add(OpKind::Comparison, n);
                            ops.add(OpKind::Assignment, n);
                        }
                        // Linear reductions over their argument.
                        "sum" | "min" | "max" | "any" | "all" => {
                            let n = mult.saturating_mul(DEFAULT_LOOP_ITERATIONS);
                            ops.add(OpKind::Addition, n);
                            ops.add(OpKind::Comparison, n);
                        }
                        "append" => ops.add(OpKind::MemoryAllocation, mult),
                        _ => ops.add(OpKind::FunctionCall, mult),
                    },
                }
            }
            None => ops.add(OpKind::FunctionCall, mult),
        }

        if let Some(args) = node.child_by_field("arguments") {
            for arg in args.named_children() {
                if arg.kind() == "keyword_argument" {
                    if let Some(value) = arg.child_by_field("value") {
                        ops.merge(&self.analyze_expression(value, mult));
                    }
                } else if arg.kind() != "comment" {
                    ops.merge(&self.analyze_expression(arg, mult));
                }
            }
        }
        ops
    }

    fn analyze_comprehension<N: SyntaxNode>(&mut self, node: N, mult: u64) -> OperationCount {
        let mut ops = OperationCount::new();
        let iterations = self.estimate_comprehension(node);
        let inner = mult.saturating_mul(iterations);

        // Building the collection itself.
        ops.add(OpKind::MemoryAllocation, mult);
        if let Some(body) = node.child_by_field("body") {
            ops.merge(&self.analyze_expression(body, inner));
        }
        for clause in node.named_children() {
            match clause.kind() {
                "for_in_clause" => {
                    ops.add(OpKind::Comparison, inner);
                    if let Some(iter) = clause.child_by_field("right") {
                        ops.merge(&self.analyze_expression(iter, mult));
                    }
                }
                "if_clause" => {
                    ops.add(OpKind::ConditionalBranch, inner);
                    if let Some(cond) = clause.first_named_child() {
                        ops.merge(&self.analyze_expression(cond, inner));
                    }
                }
                _ => {}
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

    fn estimate_for<N: SyntaxNode>(&self, node: N) -> u64 {
        match node.child_by_field("right") {
            Some(iter) => self.estimate_iterable(iter),
            None => DEFAULT_LOOP_ITERATIONS,
        }
    }

    fn estimate_iterable<N: SyntaxNode>(&self, iter: N) -> u64 {
        match iter.kind() {
            "call" => {
                let name = short_call_name(iter).unwrap_or_default();
                match name.as_str() {
                    "range" => self.range_iterations(iter),
                    "enumerate" => {
                        // enumerate(range(...)) estimates like the range.
                        if let Some(args) = iter.child_by_field("arguments") {
                            if let Some(first) = args.named_children().into_iter().next() {
                                if first.kind() == "call"
                                    && short_call_name(first).as_deref() == Some("range")
                                {
                                    return self.range_iterations(first);
                                }
                            }
                        }
                        DEFAULT_LOOP_ITERATIONS
                    }
                    _ => DEFAULT_LOOP_ITERATIONS,
                }
            }
            "identifier" => match self.consts.get(&iter.text()) {
                Some(value) => value.max(0) as u64,
                None => DEFAULT_LOOP_ITERATIONS,
            },
            "string" => string_char_count(iter),
            "list" | "tuple" | "set" => iter.named_children().len() as u64,
            "dictionary" => iter
                .named_children()
                .into_iter()
                .filter(|c| c.kind() == "pair")
                .count() as u64,
            _ => DEFAULT_LOOP_ITERATIONS,
        }
    }

    fn range_iterations<N: SyntaxNode>(&self, call: N) -> u64 {
        let Some(arg_list) = call.child_by_field("arguments") else {
            return DEFAULT_LOOP_ITERATIONS;
        };
        let args: Vec<N> = arg_list
            .named_children()
            .into_iter()
            .filter(|a| a.kind() != "comment")
            .collect();
        let resolved: Vec<Option<i64>> = args.iter().map(|&a| self.resolve(a)).collect();

        match resolved.as_slice() {
            [Some(stop)] => (*stop).max(0) as u64,
            [Some(start), Some(stop)] => (stop - start).max(0) as u64,
            [Some(start), Some(stop), Some(step)] if *step != 0 => {
                let adjust = if *step > 0 { 1 } else { -1 };
                floor_div(stop - start + step - adjust, *step).max(0) as u64
            }
            _ => DEFAULT_LOOP_ITERATIONS,
        }
    }

    fn estimate_while<N: SyntaxNode>(&self, node: N) -> u64 {
        let Some(cond) = node.child_by_field("condition") else {
            return DEFAULT_LOOP_ITERATIONS;
        };
        if cond.kind() != "comparison_operator" {
            return DEFAULT_LOOP_ITERATIONS;
        }
        let operands = cond.named_children();
        if operands.len() != 2 {
            return DEFAULT_LOOP_ITERATIONS;
        }
        let op = cond
            .child_by_field("operators")
            .map(|o| o.text())
            .unwrap_or_default();

        if operands[0].kind() == "identifier" {
            let var = operands[0].text();
            match op.as_str() {
                "<" | "<=" => {
                    if let Some(upper) = self.resolve(operands[1]) {
                        // A positive in-body `var += step` gives the stride.
                        if let Some(step) = self.body_increment(node, &var) {
                            if step > 0 {
                                return floor_div(upper, step).max(1) as u64;
                            }
                        }
                        return upper.max(0) as u64;
                    }
                }
                ">" | ">=" => {
                    if let Some(lower) = self.resolve(operands[1]) {
                        if let Some(start) = self.consts.get(&var) {
                            return (start - lower).abs().max(1) as u64;
                        }
                    }
                }
                _ => {}
            }
        }
        if op == "<=" {
            // `low <= high` reads like a halving search: ~log2(1e6).
            return 20;
        }
        DEFAULT_LOOP_ITERATIONS
    }

    /// Find `var += <step>` among the loop body's top-level statements.
    fn body_increment<N: SyntaxNode>(&self, loop_node: N, var: &str) -> Option<i64> {
        let body = loop_node.child_by_field("body")?;
        for stmt in body.named_children() {
            if stmt.kind() != "expression_statement" {
                continue;
            }
            for child in stmt.named_children() {
                if child.kind() != "augmented_assignment" {
                    continue;
                }
                let left = child.child_by_field("left")?;
                let is_add = child
                    .child_by_field("operator")
                    .is_some_and(|o| o.text() == "+=");
                if is_add && left.kind() == "identifier" && left.text() == var {
                    if let Some(right) = child.child_by_field("right") {
                        return self.resolve(right);
                    }
                }
            }
        }
        None
    }

    fn estimate_comprehension<N: SyntaxNode>(&self, node: N) -> u64 {
        let clause = node
            .named_children()
            .into_iter()
            .find(|c| c.kind() == "for_in_clause");
        let Some(clause) = clause else {
            return DEFAULT_LOOP_ITERATIONS;
        };
        let Some(iter) = clause.child_by_field("right") else {
            return DEFAULT_LOOP_ITERATIONS;
        };

        match iter.kind() {
            "call" if short_call_name(iter).as_deref() == Some("range") => {
                let Some(arg_list) = iter.child_by_field("arguments") else {
                    return DEFAULT_LOOP_ITERATIONS;
                };
                let resolved: Vec<Option<i64>> = arg_list
                    .named_children()
                    .into_iter()
                    .map(|a| self.resolve(a))
                    .collect();
                match resolved.as_slice() {
                    [Some(stop)] => (*stop).max(0) as u64,
                    [Some(start), Some(stop), ..] => (stop - start).max(0) as u64,
                    _ => DEFAULT_LOOP_ITERATIONS,
                }
            }
            "list" | "tuple" => iter.named_children().len() as u64,
            "identifier" => match self.consts.get(&iter.text()) {
                Some(value) => value.max(0) as u64,
                None => DEFAULT_LOOP_ITERATIONS,
            },
            _ => DEFAULT_LOOP_ITERATIONS,
        }
    }
}

// ---------------------------------------------------------------------------
// Free helpers
// ---------------------------------------------------------------------------

/// The short (rightmost) name of a call: `foo` for `foo(...)`, `bar` for
/// `obj.bar(...)`.
fn short_call_name<N: SyntaxNode>(call: N) -> Option<String> {
    let callee = call.child_by_field("function")?;
    match callee.kind() {
        "identifier" => Some(callee.text()),
        "attribute" => callee.child_by_field("attribute").map(|a| a.text()),
        _ => None,
    }
}

/// The full dotted call path (`sys.stdout.write`), omitting any non-name
/// base such as a chained call.
fn dotted_call_name<N: SyntaxNode>(call: N) -> Option<String> {
    let mut parts: Vec<String> = Vec::new();
    let mut current = call.child_by_field("function")?;
    while current.kind() == "attribute" {
        parts.push(current.child_by_field("attribute")?.text());
        current = current.child_by_field("object")?;
    }
    if current.kind() == "identifier" {
        parts.push(current.text());
    }
    if parts.is_empty() {
        return None;
    }
    parts.reverse();
    Some(parts.join("."))
}

/// Record every call's short name and flag recursion when the function
/// calls itself anywhere in its body.
fn collect_calls<N: SyntaxNode>(node: N, short_name: &str, func: &mut FunctionAnalysis) {
    let mut stack = vec![node];
    while let Some(current) = stack.pop() {
        if current.kind() == "call" {
            if let Some(name) = short_call_name(current) {
                if name == short_name {
                    func.is_recursive = true;
                }
                func.calls.push(name);
            }
        }
        // Reversed so pops come off in source order.
        stack.extend(current.named_children().into_iter().rev());
    }
}

fn max_loop_depth<N: SyntaxNode>(node: N, depth: u32) -> u32 {
    let mut max = depth;
    for child in node.named_children() {
        let child_depth = if matches!(child.kind(), "for_statement" | "while_statement") {
            max_loop_depth(child, depth + 1)
        } else {
            max_loop_depth(child, depth)
        };
        max = max.max(child_depth);
    }
    max
}

/// Character count of a string literal, quotes excluded.
fn string_char_count<N: SyntaxNode>(string: N) -> u64 {
    let content: usize = string
        .named_children()
        .into_iter()
        .filter(|c| c.kind() == "string_content")
        .map(|c| c.text().chars().count())
        .sum();
    if content > 0 {
        content as u64
    } else {
        string.text().chars().count().saturating_sub(2) as u64
    }
}
