//! Text and Graphviz renderings of a tree.

use super::TriggerTree;
use crate::node::NodeId;
use itertools::Itertools;
use std::collections::HashSet;
use std::fmt;

impl<A: PartialEq> TriggerTree<A> {
    fn label(&self, id: NodeId) -> String {
        match self.node(id) {
            Some(node) if node.triggers().is_empty() => format!("{id} {}", node.clause()),
            Some(node) => format!(
                "{id} {} [{}]",
                node.clause(),
                node.triggers().iter().join(", ")
            ),
            None => format!("{id} <freed>"),
        }
    }

    /// Graphviz description of the tree; shared specializations appear once.
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph TriggerTree {\n    node [shape=box];\n");
        for id in self.reachable() {
            let label = self.label(id).replace('\\', "\\\\").replace('"', "\\\"");
            out.push_str(&format!("    {id} [label=\"{label}\"];\n"));
            if let Some(node) = self.node(id) {
                for child in node.specializations() {
                    out.push_str(&format!("    {id} -> {child};\n"));
                }
            }
        }
        out.push_str("}\n");
        out
    }
}

impl<A: PartialEq> fmt::Display for TriggerTree<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn print_tree<A: PartialEq>(
            f: &mut fmt::Formatter<'_>,
            tree: &TriggerTree<A>,
            current: NodeId,
            prefix: &str,
            last: bool,
            printed: &mut HashSet<NodeId>,
        ) -> fmt::Result {
            let branch = if last { "└── " } else { "├── " };
            if !printed.insert(current) {
                return writeln!(f, "{prefix}{branch}^{current}");
            }
            writeln!(f, "{prefix}{branch}{}", tree.label(current))?;

            let new_prefix = format!("{}{}", prefix, if last { "    " } else { "│   " });
            if let Some(node) = tree.node(current) {
                let len = node.specializations().len();
                for (i, child) in node.specializations().iter().enumerate() {
                    print_tree(f, tree, *child, &new_prefix, i == len - 1, printed)?;
                }
            }
            Ok(())
        }

        print_tree(f, self, self.root, "", true, &mut HashSet::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use expression::Expression;

    fn shared_tree() -> TriggerTree<u32> {
        let mut tree = TriggerTree::new();
        tree.add_trigger(Expression::exists("a"), 1, vec![]);
        tree.add_trigger(Expression::exists("b"), 2, vec![]);
        tree.add_trigger(
            Expression::and(vec![Expression::exists("a"), Expression::exists("b")]),
            3,
            vec![],
        );
        tree
    }

    #[test]
    fn display_prints_shared_nodes_once() {
        let rendered = shared_tree().to_string();
        let expected = "\
└── n0 ()
    ├── n1 (exists(a)) [t0]
    │   └── n3 (exists(a) && exists(b)) [t2]
    └── n2 (exists(b)) [t1]
        └── ^n3
";
        assert_eq!(rendered, expected);
    }

    #[test]
    fn dot_lists_every_edge() {
        let dot = shared_tree().to_dot();
        assert!(dot.starts_with("digraph TriggerTree {"));
        assert!(dot.contains("n1 -> n3;"));
        assert!(dot.contains("n2 -> n3;"));
        assert_eq!(dot.matches("[label=").count(), 4);
    }
}
