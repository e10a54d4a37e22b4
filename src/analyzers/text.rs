//! Line-based fallback walker used when no parse tree is available.
//!
//! Far less precise than the tree walkers, but it keeps the analyzer useful:
//! comments are stripped, function bodies are found with per-language header
//! patterns, and a loop stack tracked by brace depth (or indentation)
//! approximates the cascading multiplier. On single-loop inputs it agrees
//! with the tree walkers.

use std::path::PathBuf;

use regex::Regex;

use crate::consts::{floor_div, parse_int_literal, ConstTable};
use crate::counts::OperationCount;
use crate::language::Language;
use crate::model::{
    CARBON_G_PER_KWH, DEFAULT_LOOP_ITERATIONS, DEFAULT_RECURSION_DEPTH, ENERGY_PER_OP_JOULES,
    OpKind,
};
use crate::report::{AnalysisResult, FunctionAnalysis};

pub struct TextWalker {
    lang: Language,
    consts: ConstTable,
    result: AnalysisResult,
}

impl TextWalker {
    pub fn new(lang: Language, file_path: Option<PathBuf>) -> Self {
        Self {
            lang,
            consts: ConstTable::new(),
            result: AnalysisResult::new(lang, file_path),
        }
    }

    pub fn analyze(mut self, source: &str) -> AnalysisResult {
        self.result.assumptions.push(
            "Regex-based analysis (no native AST) — less precise than AST-based".to_string(),
        );
        self.result
            .assumptions
            .push(format!("Energy per operation: {ENERGY_PER_OP_JOULES:e} J"));
        self.result.assumptions.push(format!(
            "Carbon intensity: {CARBON_G_PER_KWH} gCO2/kWh (global average)"
        ));

        if self.lang.is_indentation() {
            self.analyze_indent(source);
        } else {
            self.analyze_brace(source);
        }
        self.result
    }

    // -----------------------------------------------------------------------
    // Brace dialect
    // -----------------------------------------------------------------------

    fn analyze_brace(&mut self, source: &str) {
        let patterns = LinePatterns::brace(self.lang);

        // `name = 123;` assignments resolve later loop bounds.
        let const_re = Regex::new(r"\b(\w+)\s*=\s*(\d+)\s*;").unwrap();
        for cap in const_re.captures_iter(source) {
            if let Ok(value) = cap[2].parse() {
                self.consts.insert(cap[1].to_string(), value);
            }
        }

        let clean = strip_brace_comments(source);
        let functions = extract_brace_functions(self.lang, &clean);

        for (name, body, line) in &functions {
            let func = self.analyze_brace_function(name, body, *line, &patterns);
            self.result.functions.push(func);
        }

        // Whatever is left after carving out function bodies is global code.
        let mut global_code = clean.clone();
        for (_, body, _) in &functions {
            global_code = global_code.replacen(body.as_str(), "", 1);
        }
        self.result.global_operations = self.analyze_brace_block(&global_code, &patterns);
    }

    fn analyze_brace_function(
        &mut self,
        name: &str,
        body: &str,
        line: usize,
        patterns: &LinePatterns,
    ) -> FunctionAnalysis {
        let mut func = FunctionAnalysis::new(name, line);

        let self_call = Regex::new(&format!(r"\b{}\s*\(", regex::escape(name))).unwrap();
        func.is_recursive = self_call.is_match(body);

        func.operations = self.analyze_brace_block(body, patterns);

        if func.is_recursive {
            func.operations = func.operations.scale(DEFAULT_RECURSION_DEPTH);
            self.result.assumptions.push(format!(
                "Function '{name}' is recursive — assumed {DEFAULT_RECURSION_DEPTH} recursive calls"
            ));
        }

        func.max_nesting = brace_loop_nesting(body);
        func
    }

    /// Walk lines tracking brace depth; each line's counts are multiplied by
    /// the product of every enclosing loop's estimated iterations.
    fn analyze_brace_block(&mut self, code: &str, patterns: &LinePatterns) -> OperationCount {
        let mut ops = OperationCount::new();

        let for_re = Regex::new(r"^for\s*\((.+)\)").unwrap();
        let while_re = Regex::new(r"^while\s*\((.+)\)").unwrap();

        let mut loop_stack: Vec<u64> = Vec::new();
        let mut depth_at_loop: Vec<i64> = Vec::new();
        let mut brace_depth: i64 = 0;

        for line in code.lines() {
            let stripped = line.trim();
            if stripped.is_empty() {
                continue;
            }

            let opens = stripped.matches('{').count() as i64;
            let closes = stripped.matches('}').count() as i64;

            if let Some(cap) = for_re.captures(stripped) {
                let iterations = self.estimate_for_header(&cap[1]);
                loop_stack.push(iterations);
                depth_at_loop.push(brace_depth);
                self.result
                    .assumptions
                    .push(format!("for-loop estimated {iterations} iterations"));
            } else if let Some(cap) = while_re.captures(stripped) {
                let iterations = self.estimate_while_condition(&cap[1]);
                loop_stack.push(iterations);
                depth_at_loop.push(brace_depth);
                self.result
                    .assumptions
                    .push(format!("while-loop estimated {iterations} iterations"));
            } else if stripped == "do" || stripped.starts_with("do {") || stripped.starts_with("do{")
            {
                loop_stack.push(DEFAULT_LOOP_ITERATIONS);
                depth_at_loop.push(brace_depth);
            }

            brace_depth += opens;

            let multiplier = loop_stack
                .iter()
                .fold(1u64, |acc, &n| acc.saturating_mul(n));
            patterns.count_line(stripped, &mut ops, multiplier);

            brace_depth -= closes;

            while depth_at_loop.last().is_some_and(|&d| brace_depth <= d) {
                loop_stack.pop();
                depth_at_loop.pop();
            }
        }

        ops
    }

    /// Estimate iterations from a `for` header like `int i = 0; i < 100; i++`.
    fn estimate_for_header(&self, header: &str) -> u64 {
        // i = START; i OP END with a literal bound
        let bounded =
            Regex::new(r"(\w+)\s*=\s*(\d+)\s*;\s*(\w+)\s*([<>]=?)\s*(\d+)").unwrap();
        if let Some(cap) = bounded.captures(header) {
            if cap[1] == cap[3] {
                let start: i64 = cap[2].parse().unwrap_or(0);
                let end: i64 = cap[5].parse().unwrap_or(0);
                let count = match &cap[4] {
                    "<" => end - start,
                    "<=" => end - start + 1,
                    ">" => start - end,
                    ">=" => start - end + 1,
                    _ => 0,
                };
                return count.max(0) as u64;
            }
        }

        // i = START; i OP name with a known constant bound
        let named = Regex::new(r"(\w+)\s*=\s*(\d+)\s*;\s*(\w+)\s*[<>]=?\s*(\w+)").unwrap();
        if let Some(cap) = named.captures(header) {
            if cap[1] == cap[3] {
                let start: i64 = cap[2].parse().unwrap_or(0);
                if let Some(bound) = self.consts.get(&cap[4]) {
                    return (bound - start).abs().max(0) as u64;
                }
            }
        }

        // Enhanced for-each (`Type x : collection`): size unknown.
        if header.contains(':') {
            return DEFAULT_LOOP_ITERATIONS;
        }

        DEFAULT_LOOP_ITERATIONS
    }

    /// Estimate iterations from a `while` condition string.
    fn estimate_while_condition(&self, condition: &str) -> u64 {
        let compare = Regex::new(r"(\w+)\s*([<>]=?)\s*(\d+)").unwrap();
        if let Some(cap) = compare.captures(condition) {
            let var = &cap[1];
            let op = &cap[2];
            let bound: i64 = cap[3].parse().unwrap_or(0);

            if op == "<" || op == "<=" {
                if let Some(start) = self.consts.get(var) {
                    return (bound - start).abs().max(1) as u64;
                }
                return if bound > 0 {
                    bound as u64
                } else {
                    DEFAULT_LOOP_ITERATIONS
                };
            }
            if op == ">" || op == ">=" {
                if let Some(start) = self.consts.get(var) {
                    return (start - bound).max(1) as u64;
                }
            }
        }

        // `ptr != null` style guards tend to be short-lived but unknowable.
        if condition.contains("!=") || condition.contains("null") {
            return DEFAULT_LOOP_ITERATIONS;
        }

        // `low <= high` reads like a halving search: ~log2(1e6).
        if condition.contains("<=") {
            return 20;
        }

        DEFAULT_LOOP_ITERATIONS
    }

    // -----------------------------------------------------------------------
    // Indentation dialect
    // -----------------------------------------------------------------------

    fn analyze_indent(&mut self, source: &str) {
        let patterns = LinePatterns::python();
        let cleaned = strip_python_comments(source);
        let lines: Vec<&str> = cleaned.lines().collect();

        let const_re = Regex::new(r"^\s*(\w+)\s*=\s*(\d+)\s*$").unwrap();
        for line in &lines {
            if let Some(cap) = const_re.captures(line) {
                if let Ok(value) = cap[2].parse() {
                    self.consts.insert(cap[1].to_string(), value);
                }
            }
        }

        let (functions, global_lines) = extract_indent_functions(&lines);

        for info in &functions {
            let body: Vec<(usize, &str)> = (info.body_start..info.body_end)
                .map(|i| (i + 1, lines[i]))
                .collect();

            let mut func = FunctionAnalysis::new(info.name.clone(), info.line);
            let self_call =
                Regex::new(&format!(r"\b{}\s*\(", regex::escape(&info.short_name))).unwrap();
            func.is_recursive = body.iter().any(|(_, l)| self_call.is_match(l));

            func.operations = self.analyze_indent_block(&body, 1, &patterns);

            if func.is_recursive {
                func.operations = func.operations.scale(DEFAULT_RECURSION_DEPTH);
                self.result.assumptions.push(format!(
                    "Function '{}' is recursive — assumed {DEFAULT_RECURSION_DEPTH} recursive calls",
                    func.name
                ));
            }

            func.max_nesting = indent_loop_nesting(&body);
            self.result.functions.push(func);
        }

        let global: Vec<(usize, &str)> = global_lines
            .into_iter()
            .map(|i| (i + 1, lines[i]))
            .collect();
        self.result.global_operations = self.analyze_indent_block(&global, 1, &patterns);
    }

    /// Walk an indentation block. Loop bodies recurse with the multiplied
    /// count; nested definition blocks are skipped entirely.
    fn analyze_indent_block(
        &mut self,
        block: &[(usize, &str)],
        mult: u64,
        patterns: &LinePatterns,
    ) -> OperationCount {
        let mut ops = OperationCount::new();

        let for_re = Regex::new(r"^(?:async\s+)?for\s+.+?\s+in\s+(.+?):").unwrap();
        let while_re = Regex::new(r"^while\s+(.+?):").unwrap();
        let def_re = Regex::new(r"^(?:async\s+)?def\s+\w+|^class\s+\w+").unwrap();

        let mut i = 0;
        while i < block.len() {
            let (lineno, raw) = block[i];
            let stripped = raw.trim();
            if stripped.is_empty() {
                i += 1;
                continue;
            }
            let indent = indent_width(raw);
            let sub_block_end = |start: usize| {
                let mut j = start;
                while j < block.len() {
                    let (_, l) = block[j];
                    if l.trim().is_empty() || indent_width(l) > indent {
                        j += 1;
                    } else {
                        break;
                    }
                }
                j
            };

            if let Some(cap) = for_re.captures(stripped) {
                let iterations = self.estimate_indent_iterable(&cap[1]);
                if iterations != DEFAULT_LOOP_ITERATIONS {
                    self.result.assumptions.push(format!(
                        "Line {lineno}: for-loop resolved to {iterations} iterations"
                    ));
                } else {
                    self.result.assumptions.push(format!(
                        "Line {lineno}: for-loop iterations unknown, assumed {DEFAULT_LOOP_ITERATIONS}"
                    ));
                }
                ops.add(OpKind::Comparison, mult.saturating_mul(iterations));

                let end = sub_block_end(i + 1);
                let inner = self.analyze_indent_block(
                    &block[i + 1..end],
                    mult.saturating_mul(iterations),
                    patterns,
                );
                ops.merge(&inner);
                i = end;
            } else if let Some(cap) = while_re.captures(stripped) {
                let iterations = self.estimate_while_condition(&cap[1]);
                self.result.assumptions.push(format!(
                    "Line {lineno}: while-loop estimated {iterations} iterations"
                ));
                ops.add(OpKind::Comparison, mult.saturating_mul(iterations));
                patterns.count_line(&cap[1], &mut ops, mult);

                let end = sub_block_end(i + 1);
                let inner = self.analyze_indent_block(
                    &block[i + 1..end],
                    mult.saturating_mul(iterations),
                    patterns,
                );
                ops.merge(&inner);
                i = end;
            } else if def_re.is_match(stripped) {
                // A nested definition only runs when called.
                i = sub_block_end(i + 1);
            } else {
                patterns.count_line(stripped, &mut ops, mult);
                i += 1;
            }
        }

        ops
    }

    /// Estimate iterations of `for x in <iterable>:` from the iterable text.
    fn estimate_indent_iterable(&self, iterable: &str) -> u64 {
        let text = iterable.trim();

        if let Some(args) = strip_call(text, "range") {
            return self.range_args_iterations(&args);
        }
        if let Some(inner) = strip_call(text, "enumerate") {
            let inner = inner.trim();
            if inner.starts_with("range") {
                if let Some(args) = strip_call(inner, "range") {
                    return self.range_args_iterations(&args);
                }
            }
            return DEFAULT_LOOP_ITERATIONS;
        }
        if strip_call(text, "zip").is_some() {
            return DEFAULT_LOOP_ITERATIONS;
        }

        // Literal collections and strings use their element counts.
        if (text.starts_with('[') && text.ends_with(']'))
            || (text.starts_with('(') && text.ends_with(')'))
            || (text.starts_with('{') && text.ends_with('}'))
        {
            let inner = &text[1..text.len() - 1];
            if inner.trim().is_empty() {
                return 0;
            }
            return split_top_level(inner).len() as u64;
        }
        if (text.starts_with('"') && text.ends_with('"') && text.len() >= 2)
            || (text.starts_with('\'') && text.ends_with('\'') && text.len() >= 2)
        {
            return text.chars().count().saturating_sub(2) as u64;
        }

        if text.chars().all(|c| c.is_alphanumeric() || c == '_') {
            if let Some(value) = self.consts.get(text) {
                return value.max(0) as u64;
            }
        }
        DEFAULT_LOOP_ITERATIONS
    }

    fn range_args_iterations(&self, args: &str) -> u64 {
        let parts = split_top_level(args);
        let resolved: Vec<Option<i64>> =
            parts.iter().map(|p| self.resolve_text(p.trim())).collect();
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

    fn resolve_text(&self, text: &str) -> Option<i64> {
        if let Some(value) = parse_int_literal(text) {
            return Some(value);
        }
        if text.starts_with("len(") {
            return Some(DEFAULT_LOOP_ITERATIONS as i64);
        }
        self.consts.get(text)
    }
}

// ---------------------------------------------------------------------------
// Line counting
// ---------------------------------------------------------------------------

/// Compiled per-language token patterns for one analysis run.
struct LinePatterns {
    io: Option<Regex>,
    net: Option<Regex>,
    alloc: Option<Regex>,
    conditional: Regex,
    array: Regex,
    call: Regex,
    control: Regex,
}

impl LinePatterns {
    fn brace(lang: Language) -> Self {
        let io = match lang {
            Language::Java => Some(r"\b(System\.(out|err|in)\.\w+|Scanner\.\w+|BufferedReader|FileReader|FileWriter|PrintWriter|println|printf|print|read|write|readLine)\b"),
            Language::C => Some(r"\b(printf|scanf|fprintf|fscanf|fopen|fclose|fread|fwrite|puts|gets|getchar|putchar|fgets|fputs)\b"),
            Language::Cpp => Some(r"\b(cout|cin|cerr|clog|printf|scanf|ifstream|ofstream|fstream|getline)\b"),
            Language::JavaScript | Language::TypeScript => Some(r"\b(console\.(log|error|warn|info|debug|trace)|alert|prompt|confirm|document\.write|fs\.\w+|readFile|writeFile|process\.std(in|out|err))\b"),
            Language::Python => None,
        };
        let net = match lang {
            Language::Java => Some(r"\b(HttpURLConnection|URL|Socket|ServerSocket|HttpClient|HttpRequest|RestTemplate|WebClient)\b"),
            Language::C => Some(r"\b(socket|connect|send|recv|bind|listen|accept|curl_)\b"),
            Language::Cpp => Some(r"\b(socket|connect|send|recv|boost::asio|curl_|httplib)\b"),
            Language::JavaScript | Language::TypeScript => Some(r"\b(fetch|axios|XMLHttpRequest|http\.request|https\.request|WebSocket|net\.connect)\b"),
            Language::Python => None,
        };
        let alloc = match lang {
            Language::Java => Some(r"\bnew\s+\w+"),
            Language::C => Some(r"\b(malloc|calloc|realloc|free|alloca)\b"),
            Language::Cpp => Some(r"\b(new\s+\w+|make_shared|make_unique|malloc|calloc|std::vector|std::map|std::unordered_map)\b"),
            Language::JavaScript | Language::TypeScript => Some(r"\bnew\s+\w+|Array\(|Object\.create|Map\(|Set\("),
            Language::Python => None,
        };

        Self {
            io: io.map(|p| Regex::new(p).unwrap()),
            net: net.map(|p| Regex::new(p).unwrap()),
            alloc: alloc.map(|p| Regex::new(p).unwrap()),
            conditional: Regex::new(r"\b(if|else\s+if|switch|case)\b").unwrap(),
            array: Regex::new(r"\w+\s*\[").unwrap(),
            call: Regex::new(r"\b\w+\s*\(").unwrap(),
            control: Regex::new(r"\b(if|for|while|switch|catch|return)\s*\(").unwrap(),
        }
    }

    fn python() -> Self {
        Self {
            io: Some(Regex::new(r"\b(print|input|open|read|write|readline|readlines|writelines|close|flush|seek|tell)\s*\(").unwrap()),
            net: Some(Regex::new(r"\b(request|get|post|put|delete|patch|urlopen|connect|send|recv|socket|fetch|download|upload)\s*\(").unwrap()),
            alloc: Some(Regex::new(r"\b(list|dict|set|tuple|bytearray|array|zeros|ones|empty|malloc|calloc|DataFrame|Series|ndarray|deepcopy|copy)\s*\(").unwrap()),
            conditional: Regex::new(r"\b(if|elif)\b").unwrap(),
            array: Regex::new(r"\w+\s*\[").unwrap(),
            call: Regex::new(r"\b\w+\s*\(").unwrap(),
            control: Regex::new(r"\b(if|elif|for|while|return)\s*\(").unwrap(),
        }
    }

    /// Tally one line's operations at the given multiplier.
    fn count_line(&self, line: &str, ops: &mut OperationCount, mult: u64) {
        if line.is_empty() || line == "{" || line == "}" || line == "};" {
            return;
        }

        let io_count = self.io.as_ref().map_or(0, |re| re.find_iter(line).count()) as u64;
        let net_count = self.net.as_ref().map_or(0, |re| re.find_iter(line).count()) as u64;
        let alloc_count = self
            .alloc
            .as_ref()
            .map_or(0, |re| re.find_iter(line).count()) as u64;

        ops.add(OpKind::IoOperation, io_count.saturating_mul(mult));
        ops.add(OpKind::NetworkOperation, net_count.saturating_mul(mult));
        ops.add(OpKind::MemoryAllocation, alloc_count.saturating_mul(mult));

        let tokens = scan_operators(line);
        ops.add(OpKind::Addition, tokens.additions.saturating_mul(mult));
        ops.add(OpKind::Subtraction, tokens.subtractions.saturating_mul(mult));
        ops.add(OpKind::Multiplication, tokens.multiplications.saturating_mul(mult));
        ops.add(OpKind::Division, tokens.divisions.saturating_mul(mult));
        ops.add(OpKind::Assignment, tokens.assignments.saturating_mul(mult));
        ops.add(OpKind::Comparison, tokens.comparisons.saturating_mul(mult));

        let conditionals = self.conditional.find_iter(line).count() as u64;
        ops.add(OpKind::ConditionalBranch, conditionals.saturating_mul(mult));

        let array_accesses = self.array.find_iter(line).count() as u64;
        ops.add(OpKind::ArrayAccess, array_accesses.saturating_mul(mult));

        // Calls that are not control flow and not already counted as I/O or
        // network.
        let calls = self.call.find_iter(line).count() as u64;
        let control = self.control.find_iter(line).count() as u64;
        let remaining = calls
            .saturating_sub(control)
            .saturating_sub(io_count)
            .saturating_sub(net_count);
        ops.add(OpKind::FunctionCall, remaining.saturating_mul(mult));
    }
}

#[derive(Default)]
struct OperatorTally {
    additions: u64,
    subtractions: u64,
    multiplications: u64,
    divisions: u64,
    assignments: u64,
    comparisons: u64,
}

/// Character-level operator scan. The regex crate has no look-around, so
/// `+` vs `++` vs `+=` disambiguation is done by hand.
fn scan_operators(line: &str) -> OperatorTally {
    let bytes = line.as_bytes();
    let mut tally = OperatorTally::default();
    let at = |i: usize| bytes.get(i).copied().unwrap_or(0);

    // Two-char comparison tokens first, then bare < and > not adjacent to =.
    let mut i = 0;
    while i < bytes.len() {
        match (at(i), at(i + 1)) {
            (b'=', b'=') | (b'!', b'=') | (b'<', b'=') | (b'>', b'=') => {
                tally.comparisons += 1;
                i += 2;
            }
            (b'<', _) | (b'>', _) => {
                if at(i.wrapping_sub(1)) != b'=' || i == 0 {
                    tally.comparisons += 1;
                }
                i += 1;
            }
            _ => i += 1,
        }
    }

    let prev = |i: usize| if i == 0 { 0 } else { bytes[i - 1] };
    i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                if at(i + 1) == b'+' {
                    tally.additions += 1; // increment
                    i += 2;
                    continue;
                }
                if at(i + 1) != b'=' && prev(i) != b'+' {
                    tally.additions += 1;
                }
            }
            b'-' => {
                if at(i + 1) == b'-' {
                    tally.subtractions += 1; // decrement
                    i += 2;
                    continue;
                }
                if !matches!(at(i + 1), b'=' | b'>') && prev(i) != b'-' {
                    tally.subtractions += 1;
                }
            }
            b'*' => {
                if at(i + 1) != b'=' {
                    tally.multiplications += 1;
                }
            }
            b'/' => {
                if !matches!(at(i + 1), b'=' | b'/' | b'*') {
                    tally.divisions += 1;
                }
            }
            b'=' => {
                if at(i + 1) != b'=' && !matches!(prev(i), b'=' | b'!' | b'<' | b'>') {
                    tally.assignments += 1;
                }
            }
            _ => {}
        }
        i += 1;
    }

    tally
}

// ---------------------------------------------------------------------------
// Comment stripping and function extraction
// ---------------------------------------------------------------------------

fn strip_brace_comments(code: &str) -> String {
    let line_comments = Regex::new(r"//[^\n]*").unwrap();
    let block_comments = Regex::new(r"(?s)/\*.*?\*/").unwrap();
    let dquote = Regex::new(r#""(?:[^"\\]|\\.)*""#).unwrap();
    let squote = Regex::new(r"'(?:[^'\\]|\\.)*'").unwrap();
    let backtick = Regex::new(r"`(?:[^`\\]|\\.)*`").unwrap();

    let code = line_comments.replace_all(code, "");
    let code = block_comments.replace_all(&code, "");
    let code = dquote.replace_all(&code, "\"\"");
    let code = squote.replace_all(&code, "''");
    backtick.replace_all(&code, "``").into_owned()
}

fn strip_python_comments(code: &str) -> String {
    let triple_double = Regex::new(r#"(?s)""".*?""""#).unwrap();
    let triple_single = Regex::new(r"(?s)'''.*?'''").unwrap();
    let code = triple_double.replace_all(code, "");
    let code = triple_single.replace_all(&code, "");

    // Truncate each line at the first `#` outside a string literal.
    code.lines()
        .map(|line| {
            let mut in_single = false;
            let mut in_double = false;
            for (idx, c) in line.char_indices() {
                match c {
                    '\'' if !in_double => in_single = !in_single,
                    '"' if !in_single => in_double = !in_double,
                    '#' if !in_single && !in_double => return &line[..idx],
                    _ => {}
                }
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// `(name, body, line)` for every function header found in brace code.
fn extract_brace_functions(lang: Language, clean: &str) -> Vec<(String, String, usize)> {
    let pattern = match lang {
        Language::Java => r"(?:public|private|protected|static|\s)+[\w<>\[\]]+\s+(\w+)\s*\([^)]*\)\s*(?:throws\s+[\w,\s]+)?\s*\{",
        Language::Cpp => r"(?:static\s+)?(?:inline\s+)?(?:virtual\s+)?(?:unsigned\s+)?(?:const\s+)?[\w:<>]+[\s*&]+(\w+)\s*\([^)]*\)\s*(?:const)?\s*(?:override)?\s*\{",
        Language::JavaScript | Language::TypeScript => r"(?:function\s+(\w+)|(?:const|let|var)\s+(\w+)\s*=\s*(?:async\s+)?(?:function|\([^)]*\)\s*=>|\w+\s*=>))|(\w+)\s*\([^)]*\)\s*\{",
        _ => r"(?:static\s+)?(?:inline\s+)?(?:unsigned\s+)?(?:const\s+)?\w+[\s*]+(\w+)\s*\([^)]*\)\s*\{",
    };
    let header_re = Regex::new(pattern).unwrap();

    let mut functions = Vec::new();
    for cap in header_re.captures_iter(clean) {
        let name = (1..cap.len())
            .filter_map(|g| cap.get(g))
            .map(|m| m.as_str())
            .next()
            .unwrap_or("unknown");
        if matches!(name, "if" | "for" | "while" | "switch" | "return" | "else") {
            continue;
        }

        let whole = cap.get(0).unwrap();
        let body = extract_brace_block(clean, whole.end().saturating_sub(1));
        let line = clean[..whole.start()].matches('\n').count() + 1;
        functions.push((name.to_string(), body, line));
    }
    functions
}

/// The balanced `{...}` block starting at or after `start`.
fn extract_brace_block(code: &str, start: usize) -> String {
    let bytes = code.as_bytes();
    let open = if bytes.get(start) == Some(&b'{') {
        start
    } else {
        match code[start.min(code.len())..].find('{') {
            Some(offset) => start + offset,
            None => return String::new(),
        }
    };

    let mut depth = 0usize;
    for (idx, &b) in bytes.iter().enumerate().skip(open) {
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return code[open..=idx].to_string();
                }
            }
            _ => {}
        }
    }
    code[open..].to_string()
}

fn brace_loop_nesting(code: &str) -> u32 {
    let loop_re = Regex::new(r"^(for|while)\s*\(").unwrap();
    let mut max_depth = 0u32;
    let mut depth = 0u32;
    for line in code.lines() {
        let stripped = line.trim();
        if loop_re.is_match(stripped) || stripped.starts_with("do") {
            depth += 1;
            max_depth = max_depth.max(depth);
        }
        if stripped == "}" && depth > 0 {
            depth -= 1;
        }
    }
    max_depth
}

struct IndentFn {
    name: String,
    short_name: String,
    line: usize,
    body_start: usize,
    body_end: usize,
}

/// Functions (with class qualification) and the indices of global lines.
fn extract_indent_functions(lines: &[&str]) -> (Vec<IndentFn>, Vec<usize>) {
    let def_re = Regex::new(r"^([ \t]*)(?:async\s+)?def\s+(\w+)\s*\(").unwrap();
    let class_re = Regex::new(r"^([ \t]*)class\s+(\w+)").unwrap();

    let mut functions = Vec::new();
    let mut globals = Vec::new();
    let mut class_stack: Vec<(usize, String)> = Vec::new();

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        if line.trim().is_empty() {
            i += 1;
            continue;
        }
        let indent = indent_width(line);
        while class_stack.last().is_some_and(|(d, _)| indent <= *d) {
            class_stack.pop();
        }

        if let Some(cap) = class_re.captures(line) {
            class_stack.push((indent, cap[2].to_string()));
            i += 1;
            continue;
        }

        if let Some(cap) = def_re.captures(line) {
            let short_name = cap[2].to_string();
            let name = match class_stack.last() {
                Some((_, class)) => format!("{class}.{short_name}"),
                None => short_name.clone(),
            };
            let body_start = i + 1;
            let mut body_end = body_start;
            while body_end < lines.len() {
                let l = lines[body_end];
                if l.trim().is_empty() || indent_width(l) > indent {
                    body_end += 1;
                } else {
                    break;
                }
            }
            functions.push(IndentFn {
                name,
                short_name,
                line: i + 1,
                body_start,
                body_end,
            });
            i = body_end;
            continue;
        }

        // Class-level statements are neither global nor function code.
        if class_stack.is_empty() {
            globals.push(i);
        }
        i += 1;
    }

    (functions, globals)
}

fn indent_loop_nesting(body: &[(usize, &str)]) -> u32 {
    let loop_re = Regex::new(r"^(?:async\s+)?(for|while)\b").unwrap();
    let mut loop_indents: Vec<usize> = Vec::new();
    let mut max_depth = 0u32;
    for (_, line) in body {
        let stripped = line.trim();
        if stripped.is_empty() {
            continue;
        }
        let indent = indent_width(line);
        loop_indents.retain(|&d| d < indent);
        if loop_re.is_match(stripped) {
            loop_indents.push(indent);
            max_depth = max_depth.max(loop_indents.len() as u32);
        }
    }
    max_depth
}

fn indent_width(line: &str) -> usize {
    line.chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .count()
}

/// `args` of `name(args)` when `text` is exactly that call shape.
fn strip_call(text: &str, name: &str) -> Option<String> {
    let rest = text.strip_prefix(name)?.trim_start();
    let inner = rest.strip_prefix('(')?;
    let inner = inner.strip_suffix(')')?;
    Some(inner.to_string())
}

/// Split on commas not nested inside brackets or quotes.
fn split_top_level(text: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut current = String::new();
    for c in text.chars() {
        match c {
            '(' | '[' | '{' => {
                depth += 1;
                current.push(c);
            }
            ')' | ']' | '}' => {
                depth -= 1;
                current.push(c);
            }
            ',' if depth == 0 => {
                parts.push(current.trim().to_string());
                current = String::new();
            }
            _ => current.push(c),
        }
    }
    if !current.trim().is_empty() {
        parts.push(current.trim().to_string());
    }
    parts
}
