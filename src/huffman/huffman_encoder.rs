use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::io::Write;

use tracing::{debug, trace};

use super::{CodeTree, CodeTreeError, Node};
use crate::encoding::bit_writer::BitWriter;
use crate::frequency::FrequencyTable;

/// A subtree waiting in the priority queue during construction.
struct QueueEntry {
    weight: u64,
    /// Order in which entries were pushed. Breaks ties between equal weights so the
    /// older entry leaves the queue first.
    sequence: usize,
    node: Node,
}

// BinaryHeap pops the greatest entry, so the lightest and oldest entry has to compare greatest
impl Ord for QueueEntry {
    fn cmp(&self, rhs: &Self) -> Ordering {
        match rhs.weight.cmp(&self.weight) {
            Ordering::Equal => rhs.sequence.cmp(&self.sequence),
            other => other,
        }
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, rhs: &Self) -> Option<Ordering> {
        Some(self.cmp(rhs))
    }
}

impl PartialEq for QueueEntry {
    fn eq(&self, rhs: &Self) -> bool {
        self.cmp(rhs) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

impl CodeTree {
    /// Build a tree by repeatedly merging the two lightest subtrees until one is left.
    ///
    /// Leaves enter the queue in ascending symbol order and every merged subtree is
    /// pushed after all entries that exist at that point. Among equal weights the entry
    /// pushed first is taken first, which makes the resulting tree (and every archive
    /// built from it) depend on nothing but the frequencies.
    ///
    /// Two cases are handled specially:
    /// - A single distinct symbol is put below a root as its left child, so it gets the
    ///   one bit code `0` instead of an empty one.
    /// - Without any symbols the root is an internal node without children.
    pub fn build(frequencies: &FrequencyTable) -> Result<CodeTree, CodeTreeError> {
        let mut queue = BinaryHeap::new();
        queue.try_reserve(frequencies.distinct_symbols())?;

        let mut sequence = 0;
        for (symbol, weight) in frequencies.iter() {
            queue.push(QueueEntry {
                weight,
                sequence,
                node: Node::leaf(symbol),
            });
            sequence += 1;
        }

        if queue.len() == 1 {
            if let Some(only) = queue.pop() {
                queue.push(QueueEntry {
                    weight: only.weight,
                    sequence,
                    node: Node::internal(Some(only.node), None),
                });
                sequence += 1;
            }
        }

        let root = loop {
            match (queue.pop(), queue.pop()) {
                (None, _) => break Node::internal(None, None),
                (Some(last), None) => break last.node,
                (Some(first), Some(second)) => {
                    trace!(
                        "merging subtrees of weight {} and {}",
                        first.weight,
                        second.weight
                    );
                    queue.push(QueueEntry {
                        weight: first.weight + second.weight,
                        sequence,
                        node: Node::internal(Some(first.node), Some(second.node)),
                    });
                    sequence += 1;
                }
            }
        };

        let tree = CodeTree::from_root(root);
        debug!(
            "built code tree with {} leaves, longest code is {} bits",
            tree.leaf_count(),
            tree.depth()
        );
        Ok(tree)
    }

    /// Write the shape of the tree in preorder.
    ///
    /// For the left and then the right child of every node: an existing child is written
    /// as a `1` bit followed by its symbol byte and then its own children, a missing
    /// child is a single `0` bit. Leaves are not flagged, a node whose children are both
    /// written as `0` is a leaf. The root's own symbol is never written.
    pub fn serialize<W: Write>(&self, writer: &mut BitWriter<W>) -> Result<(), CodeTreeError> {
        serialize_children(&self.root, writer)
    }

    /// Write the code of every byte in `data`.
    pub fn encode<W: Write>(
        &self,
        data: &[u8],
        writer: &mut BitWriter<W>,
    ) -> Result<(), CodeTreeError> {
        for &symbol in data {
            let code = self
                .code(symbol)
                .ok_or(CodeTreeError::MissingCode { symbol })?;
            writer.write_code(code)?;
        }
        Ok(())
    }
}

fn serialize_children<W: Write>(node: &Node, writer: &mut BitWriter<W>) -> Result<(), CodeTreeError> {
    for child in [node.left.as_deref(), node.right.as_deref()] {
        match child {
            Some(child) => {
                writer.add_bit(true)?;
                writer.write_char(child.symbol)?;
                serialize_children(child, writer)?;
            }
            None => writer.add_bit(false)?,
        }
    }
    Ok(())
}
