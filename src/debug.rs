use alloc::{collections::VecDeque, string::String, string::ToString};
use core::{fmt, ptr::NonNull};

use crate::{AvlTree, Link, Links, TreeNode};

// Indentation added per tree level by `write_sideways`.
const SIDEWAYS_INDENT: usize = 5;

impl<T> AvlTree<T>
where
    T: TreeNode<Links<T>>,
    T::Key: fmt::Display,
{
    /// Writes the tree shape as a Graphviz digraph, labelling each node `key:height`.
    pub fn dotgraph<W: fmt::Write>(&self, name: &str, mut w: W) -> fmt::Result {
        let root = match self.root {
            Some(r) => r,
            None => return write!(w, "digraph \"graph-{name}\" {{}}"),
        };

        enum Item<T: TreeNode<Links<T>>> {
            Node(NonNull<T>, u32),
            Missing(u32),
        }

        let mut queue = VecDeque::new();
        queue.push_back(Item::Node(root, 0));

        write!(
            w,
            "digraph \"graph-{name}\" {{\n subgraph \"subgraph-{name}\" {{"
        )?;

        let mut missing = 0;
        let mut links = String::new();

        // Keys may repeat, so nodes are named by their breadth-first index instead.
        let mut next_id = 0_u32;

        loop {
            use fmt::Write;
            let remaining = queue.len();
            if remaining == 0 {
                break;
            }

            write!(w, "{{rank=same; ")?;

            for _rank_node in 0..remaining {
                let Some(item) = queue.pop_front() else {
                    break;
                };

                let (node, id) = match item {
                    Item::Node(node, id) => (node, id),
                    Item::Missing(id) => {
                        write!(w, "\"graph{name}-missing{id}\" [shape=point]; ")?;
                        continue;
                    }
                };

                let key = unsafe { node.as_ref().key() };
                let height = unsafe { self.node_height(node) };
                write!(w, "\"graph{name}-{id}\" [label=\"{key}:{height}\"]; ")?;

                for child in unsafe { [self.links(node).left(), self.links(node).right()] } {
                    if let Some(child) = child {
                        next_id += 1;
                        queue.push_back(Item::Node(child, next_id));
                        writeln!(links, "\"graph{name}-{id}\" -> \"graph{name}-{next_id}\";")?;
                    } else {
                        queue.push_back(Item::Missing(missing));
                        writeln!(
                            links,
                            "\"graph{name}-{id}\" -> \"graph{name}-missing{missing}\";"
                        )?;
                        missing += 1;
                    }
                }
            }

            writeln!(w, "}}")?;
        }

        w.write_str(&links)?;

        w.write_str(" }\n}")
    }

    /// Writes the tree turned on its side: the root at the left margin, right subtrees above their
    /// parent and left subtrees below, each level indented five columns further.
    ///
    /// Each key is right-aligned in a field as wide as its indentation, one key per line.
    pub fn write_sideways<W: fmt::Write>(&self, mut w: W) -> fmt::Result {
        self.sideways_at(self.root, 0, &mut w)
    }

    fn sideways_at<W: fmt::Write>(&self, node: Link<T>, width: usize, w: &mut W) -> fmt::Result {
        let Some(node) = node else {
            return Ok(());
        };

        unsafe {
            self.sideways_at(self.links(node).right(), width + SIDEWAYS_INDENT, w)?;

            // Render first so that the width applies even to keys whose `Display` ignores it.
            let key = node.as_ref().key().to_string();
            writeln!(w, "{key:>width$}")?;

            self.sideways_at(self.links(node).left(), width + SIDEWAYS_INDENT, w)
        }
    }
}
