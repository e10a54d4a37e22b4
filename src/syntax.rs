/// Capability surface a walker needs from a parse-tree node.
///
/// Walkers are generic over this trait rather than over a concrete parser
/// type; `TsNode` adapts tree-sitter nodes to it.
pub trait SyntaxNode: Copy {
    /// Grammar node-kind name, e.g. `"for_statement"`.
    fn kind(&self) -> &str;

    /// Named (non-token) children in order.
    fn named_children(&self) -> Vec<Self>;

    /// All children including anonymous tokens (operators, keywords).
    fn children(&self) -> Vec<Self>;

    fn child_by_field(&self, field: &str) -> Option<Self>;

    /// Source text covered by this node.
    fn text(&self) -> String;

    /// 0-based starting row in the source.
    fn start_row(&self) -> usize;

    fn first_named_child(&self) -> Option<Self> {
        self.named_children().into_iter().next()
    }

    /// 1-based line number for reports.
    fn line(&self) -> usize {
        self.start_row() + 1
    }
}

/// Adapter pairing a tree-sitter node with its source text.
#[derive(Clone, Copy)]
pub struct TsNode<'t> {
    node: tree_sitter::Node<'t>,
    source: &'t str,
}

impl<'t> TsNode<'t> {
    pub fn new(node: tree_sitter::Node<'t>, source: &'t str) -> Self {
        Self { node, source }
    }

    fn wrap(&self, node: tree_sitter::Node<'t>) -> Self {
        Self {
            node,
            source: self.source,
        }
    }
}

impl SyntaxNode for TsNode<'_> {
    fn kind(&self) -> &str {
        self.node.kind()
    }

    fn named_children(&self) -> Vec<Self> {
        let mut cursor = self.node.walk();
        self.node
            .named_children(&mut cursor)
            .map(|c| self.wrap(c))
            .collect()
    }

    fn children(&self) -> Vec<Self> {
        let mut cursor = self.node.walk();
        self.node
            .children(&mut cursor)
            .map(|c| self.wrap(c))
            .collect()
    }

    fn child_by_field(&self, field: &str) -> Option<Self> {
        self.node.child_by_field_name(field).map(|c| self.wrap(c))
    }

    fn text(&self) -> String {
        self.node
            .utf8_text(self.source.as_bytes())
            .unwrap_or("")
            .to_string()
    }

    fn start_row(&self) -> usize {
        self.node.start_position().row
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_python(source: &str) -> tree_sitter::Tree {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .unwrap();
        parser.parse(source, None).unwrap()
    }

    #[test]
    fn adapter_exposes_kind_text_and_rows() {
        let source = "x = 1\ny = 2\n";
        let tree = parse_python(source);
        let root = TsNode::new(tree.root_node(), source);
        assert_eq!(root.kind(), "module");

        let stmts = root.named_children();
        assert_eq!(stmts.len(), 2);
        assert_eq!(stmts[0].text(), "x = 1");
        assert_eq!(stmts[0].line(), 1);
        assert_eq!(stmts[1].line(), 2);
    }

    #[test]
    fn field_lookup() {
        let source = "a = b + c\n";
        let tree = parse_python(source);
        let root = TsNode::new(tree.root_node(), source);
        let assign = root.named_children()[0].named_children()[0];
        assert_eq!(assign.kind(), "assignment");
        let rhs = assign.child_by_field("right").unwrap();
        assert_eq!(rhs.kind(), "binary_operator");
        assert_eq!(rhs.child_by_field("operator").unwrap().text(), "+");
    }
}
