use std::collections::HashMap;

use crate::model::DEFAULT_LOOP_ITERATIONS;
use crate::syntax::SyntaxNode;

/// Block-scoping family of a language, where it matters for resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Indentation,
    Brace,
}

/// Identifiers statically known to hold an integer.
///
/// Built by a pre-pass over the whole tree, then extended and restored
/// around each function scope: callers take a `snapshot` on entry and
/// `restore` it on exit, so inner assignments shadow without leaking.
#[derive(Debug, Clone, Default)]
pub struct ConstTable {
    map: HashMap<String, i64>,
}

impl ConstTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<i64> {
        self.map.get(name).copied()
    }

    pub fn insert(&mut self, name: String, value: i64) {
        self.map.insert(name, value);
    }

    pub fn snapshot(&self) -> HashMap<String, i64> {
        self.map.clone()
    }

    pub fn restore(&mut self, snapshot: HashMap<String, i64>) {
        self.map = snapshot;
    }
}

/// Try to resolve an expression node to a constant integer.
///
/// Failures are silent: an unresolvable expression simply yields `None` and
/// the caller falls back to a default. Division or modulo by zero is
/// unresolved, not an error.
pub fn resolve_expr<N: SyntaxNode>(node: N, table: &ConstTable, dialect: Dialect) -> Option<i64> {
    match node.kind() {
        "integer" | "float" | "number_literal" | "number" | "decimal_integer_literal"
        | "hex_integer_literal" | "octal_integer_literal" | "binary_integer_literal"
        | "decimal_floating_point_literal" => parse_int_literal(&node.text()),

        "identifier" => table.get(&node.text()),

        "parenthesized_expression" => {
            resolve_expr(node.first_named_child()?, table, dialect)
        }

        "binary_operator" | "binary_expression" => {
            let left = resolve_expr(node.child_by_field("left")?, table, dialect)?;
            let right = resolve_expr(node.child_by_field("right")?, table, dialect)?;
            match node.child_by_field("operator")?.text().as_str() {
                "+" => left.checked_add(right),
                "-" => left.checked_sub(right),
                "*" => left.checked_mul(right),
                "/" | "//" => (right != 0).then(|| floor_div(left, right)),
                "%" => (right != 0).then(|| floor_mod(left, right)),
                _ => None,
            }
        }

        "unary_operator" | "unary_expression" => {
            let operand = node
                .child_by_field("argument")
                .or_else(|| node.child_by_field("operand"))?;
            let value = resolve_expr(operand, table, dialect)?;
            match node.child_by_field("operator").map(|op| op.text()).as_deref() {
                Some("-") => value.checked_neg(),
                Some("+") => Some(value),
                _ => None,
            }
        }

        // len(xs) is the one call that resolves, and only heuristically.
        "call" if dialect == Dialect::Indentation => {
            let callee = node.child_by_field("function")?;
            (callee.kind() == "identifier" && callee.text() == "len")
                .then_some(DEFAULT_LOOP_ITERATIONS as i64)
        }

        _ => None,
    }
}

/// Parse an integer literal: `0x`/`0o`/`0b` prefixes, `_` digit separators,
/// Java/C suffixes (`100L`, `3u`), and floats truncated toward zero.
pub fn parse_int_literal(raw: &str) -> Option<i64> {
    let text = raw.trim().replace('_', "");
    if text.is_empty() {
        return None;
    }

    let radix_digits = |prefix_len: usize| {
        text[prefix_len..]
            .trim_end_matches(|c| matches!(c, 'l' | 'L' | 'u' | 'U'))
            .to_string()
    };
    if text.starts_with("0x") || text.starts_with("0X") {
        return i64::from_str_radix(&radix_digits(2), 16).ok();
    }
    if text.starts_with("0o") || text.starts_with("0O") {
        return i64::from_str_radix(&radix_digits(2), 8).ok();
    }
    if text.starts_with("0b") || text.starts_with("0B") {
        return i64::from_str_radix(&radix_digits(2), 2).ok();
    }

    let stripped = text.trim_end_matches(|c| matches!(c, 'l' | 'L' | 'u' | 'U' | 'f' | 'F' | 'd' | 'D'));
    if stripped.is_empty() {
        return None;
    }
    if stripped.contains('.') || stripped.contains('e') || stripped.contains('E') {
        let value: f64 = stripped.parse().ok()?;
        if !value.is_finite() {
            return None;
        }
        return Some(value.trunc() as i64);
    }
    stripped.parse().ok()
}

/// Floor division, matching Python's `//` for negative operands.
pub(crate) fn floor_div(a: i64, b: i64) -> i64 {
    let q = a / b;
    if a % b != 0 && (a < 0) != (b < 0) {
        q - 1
    } else {
        q
    }
}

fn floor_mod(a: i64, b: i64) -> i64 {
    a - floor_div(a, b) * b
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::TsNode;

    #[test]
    fn literals() {
        assert_eq!(parse_int_literal("42"), Some(42));
        assert_eq!(parse_int_literal("1_000_000"), Some(1_000_000));
        assert_eq!(parse_int_literal("0xFF"), Some(255));
        assert_eq!(parse_int_literal("0o17"), Some(15));
        assert_eq!(parse_int_literal("0b1010"), Some(10));
        assert_eq!(parse_int_literal("100L"), Some(100));
        assert_eq!(parse_int_literal("7u"), Some(7));
        assert_eq!(parse_int_literal("3.9"), Some(3));
        assert_eq!(parse_int_literal("2.5f"), Some(2));
        assert_eq!(parse_int_literal("3e2"), Some(300));
        assert_eq!(parse_int_literal("abc"), None);
        assert_eq!(parse_int_literal(""), None);
    }

    #[test]
    fn floor_semantics() {
        assert_eq!(floor_div(7, 2), 3);
        assert_eq!(floor_div(-7, 2), -4);
        assert_eq!(floor_div(7, -2), -4);
        assert_eq!(floor_mod(-7, 2), 1);
    }

    #[test]
    fn snapshot_restore_is_lifo() {
        let mut table = ConstTable::new();
        table.insert("n".into(), 10);
        let outer = table.snapshot();
        table.insert("n".into(), 99);
        table.insert("m".into(), 5);
        assert_eq!(table.get("n"), Some(99));
        table.restore(outer);
        assert_eq!(table.get("n"), Some(10));
        assert_eq!(table.get("m"), None);
    }

    fn resolve_python(expr: &str, table: &ConstTable) -> Option<i64> {
        let source = expr.to_string();
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .unwrap();
        let tree = parser.parse(&source, None).unwrap();
        let root = TsNode::new(tree.root_node(), &source);
        // module -> expression_statement -> expr
        let expr_node = root.named_children()[0].named_children()[0];
        resolve_expr(expr_node, table, Dialect::Indentation)
    }

    #[test]
    fn resolves_arithmetic() {
        let table = ConstTable::new();
        assert_eq!(resolve_python("2 + 3 * 4", &table), Some(14));
        assert_eq!(resolve_python("(10 - 4) // 2", &table), Some(3));
        assert_eq!(resolve_python("10 % 3", &table), Some(1));
        assert_eq!(resolve_python("-5", &table), Some(-5));
    }

    #[test]
    fn division_by_zero_is_unresolved() {
        let table = ConstTable::new();
        assert_eq!(resolve_python("10 // 0", &table), None);
        assert_eq!(resolve_python("10 % 0", &table), None);
    }

    #[test]
    fn resolves_identifiers_from_table() {
        let mut table = ConstTable::new();
        table.insert("n".into(), 50);
        assert_eq!(resolve_python("n", &table), Some(50));
        assert_eq!(resolve_python("n * 2", &table), Some(100));
        assert_eq!(resolve_python("unknown", &table), None);
    }

    #[test]
    fn len_call_uses_default_heuristic() {
        let table = ConstTable::new();
        assert_eq!(
            resolve_python("len(items)", &table),
            Some(DEFAULT_LOOP_ITERATIONS as i64)
        );
        assert_eq!(resolve_python("size(items)", &table), None);
    }
}
