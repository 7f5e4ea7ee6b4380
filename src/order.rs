//! Depth-first and breadth-first walks of the tree shape, written out as text.
//!
//! Every walk writes each key followed by a single space. The `_recursive` variants recurse once
//! per tree level; the others keep their pending nodes in an explicit stack or queue. Both
//! variants of a walk produce identical output.

use alloc::{collections::VecDeque, vec::Vec};
use core::{fmt, ptr::NonNull};

use crate::{AvlTree, Link, Links, TreeNode};

impl<T> AvlTree<T>
where
    T: TreeNode<Links<T>>,
    T::Key: fmt::Display,
{
    /// Writes the keys in pre-order: node, left subtree, right subtree.
    pub fn write_pre_order<W: fmt::Write>(&self, mut w: W) -> fmt::Result {
        let mut stack: Vec<NonNull<T>> = self.root.into_iter().collect();

        while let Some(node) = stack.pop() {
            unsafe {
                write!(w, "{} ", node.as_ref().key())?;

                // Right goes in first so that the left subtree is written first.
                let links = self.links(node);
                stack.extend(links.right());
                stack.extend(links.left());
            }
        }

        Ok(())
    }

    /// Recursive counterpart of [`write_pre_order`](AvlTree::write_pre_order).
    pub fn write_pre_order_recursive<W: fmt::Write>(&self, mut w: W) -> fmt::Result {
        self.pre_order_at(self.root, &mut w)
    }

    fn pre_order_at<W: fmt::Write>(&self, node: Link<T>, w: &mut W) -> fmt::Result {
        let Some(node) = node else {
            return Ok(());
        };

        unsafe {
            write!(w, "{} ", node.as_ref().key())?;
            self.pre_order_at(self.links(node).left(), w)?;
            self.pre_order_at(self.links(node).right(), w)
        }
    }

    /// Writes the keys in order, following parent links from the first element.
    pub fn write_in_order<W: fmt::Write>(&self, mut w: W) -> fmt::Result {
        for node in self.iter() {
            write!(w, "{} ", node.key())?;
        }

        Ok(())
    }

    /// Recursive counterpart of [`write_in_order`](AvlTree::write_in_order).
    pub fn write_in_order_recursive<W: fmt::Write>(&self, mut w: W) -> fmt::Result {
        self.in_order_at(self.root, &mut w)
    }

    fn in_order_at<W: fmt::Write>(&self, node: Link<T>, w: &mut W) -> fmt::Result {
        let Some(node) = node else {
            return Ok(());
        };

        unsafe {
            self.in_order_at(self.links(node).left(), w)?;
            write!(w, "{} ", node.as_ref().key())?;
            self.in_order_at(self.links(node).right(), w)
        }
    }

    /// Writes the keys in post-order: left subtree, right subtree, node.
    pub fn write_post_order<W: fmt::Write>(&self, mut w: W) -> fmt::Result {
        // The first stack produces node, right, left; the second reverses that.
        let mut pending: Vec<NonNull<T>> = self.root.into_iter().collect();
        let mut reversed = Vec::new();

        while let Some(node) = pending.pop() {
            reversed.push(node);

            let links = unsafe { self.links(node) };
            pending.extend(links.left());
            pending.extend(links.right());
        }

        while let Some(node) = reversed.pop() {
            write!(w, "{} ", unsafe { node.as_ref().key() })?;
        }

        Ok(())
    }

    /// Recursive counterpart of [`write_post_order`](AvlTree::write_post_order).
    pub fn write_post_order_recursive<W: fmt::Write>(&self, mut w: W) -> fmt::Result {
        self.post_order_at(self.root, &mut w)
    }

    fn post_order_at<W: fmt::Write>(&self, node: Link<T>, w: &mut W) -> fmt::Result {
        let Some(node) = node else {
            return Ok(());
        };

        unsafe {
            self.post_order_at(self.links(node).left(), w)?;
            self.post_order_at(self.links(node).right(), w)?;
            write!(w, "{} ", node.as_ref().key())
        }
    }

    /// Writes the keys level by level from the root, each level from left to right.
    pub fn write_level_order<W: fmt::Write>(&self, mut w: W) -> fmt::Result {
        let mut queue: VecDeque<NonNull<T>> = self.root.into_iter().collect();

        while let Some(node) = queue.pop_front() {
            unsafe {
                write!(w, "{} ", node.as_ref().key())?;

                let links = self.links(node);
                queue.extend(links.left());
                queue.extend(links.right());
            }
        }

        Ok(())
    }

    /// Recursive counterpart of [`write_level_order`](AvlTree::write_level_order).
    ///
    /// Each level is written by a separate descent from the root.
    pub fn write_level_order_recursive<W: fmt::Write>(&self, mut w: W) -> fmt::Result {
        for depth in 0..self.height() {
            self.level_at(self.root, depth, &mut w)?;
        }

        Ok(())
    }

    fn level_at<W: fmt::Write>(&self, node: Link<T>, depth: usize, w: &mut W) -> fmt::Result {
        let Some(node) = node else {
            return Ok(());
        };

        unsafe {
            if depth == 0 {
                return write!(w, "{} ", node.as_ref().key());
            }

            self.level_at(self.links(node).left(), depth - 1, w)?;
            self.level_at(self.links(node).right(), depth - 1, w)
        }
    }

    /// Writes the keys in order on one line.
    pub fn print<W: fmt::Write>(&self, mut w: W) -> fmt::Result {
        self.write_in_order(&mut w)?;
        writeln!(w)
    }
}
