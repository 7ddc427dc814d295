use std::io::Read;

use tracing::debug;

use super::{CodeTree, CodeTreeError, Node, MAX_TREE_DEPTH};
use crate::decoding::bit_reader::{BitReader, GetBitsError};

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum HuffmanDecoderError {
    #[error(transparent)]
    GetBitsError(#[from] GetBitsError),
    #[error("Bit {bit} at depth {depth} leads to a child the code tree doesn't have. Stream is probably corrupted")]
    MissingChild { bit: u8, depth: usize },
}

impl CodeTree {
    /// Read a tree shape written by [CodeTree::serialize].
    ///
    /// The root starts out with symbol `0` since its own symbol is never stored.
    pub fn deserialize<R: Read>(reader: &mut BitReader<R>) -> Result<CodeTree, CodeTreeError> {
        let mut root = Node::default();
        deserialize_children(&mut root, reader, 0)?;
        let tree = CodeTree::from_root(root);
        debug!(
            "read code tree with {} leaves, longest code is {} bits",
            tree.leaf_count(),
            tree.depth()
        );
        Ok(tree)
    }

    /// Decode one symbol by walking from the root, `1` going right and `0` going left,
    /// until a node without children is reached.
    ///
    /// A tree whose root has no children decodes its root symbol without reading any bits,
    /// callers that might hold such a tree have to check [CodeTree::leaf_count] first.
    pub fn decode_symbol<R: Read>(
        &self,
        reader: &mut BitReader<R>,
    ) -> Result<u8, HuffmanDecoderError> {
        let mut node = &self.root;
        let mut depth = 0;
        while !node.is_leaf() {
            let bit = reader.get_bit()?;
            let next = if bit {
                node.right.as_deref()
            } else {
                node.left.as_deref()
            };
            node = next.ok_or(HuffmanDecoderError::MissingChild {
                bit: u8::from(bit),
                depth,
            })?;
            depth += 1;
        }
        Ok(node.symbol)
    }
}

fn deserialize_children<R: Read>(
    node: &mut Node,
    reader: &mut BitReader<R>,
    depth: usize,
) -> Result<(), CodeTreeError> {
    for slot in [&mut node.left, &mut node.right] {
        if reader.get_bit()? {
            if depth >= MAX_TREE_DEPTH {
                return Err(CodeTreeError::TooDeep);
            }
            let mut child = Node::leaf(reader.read_char()?);
            deserialize_children(&mut child, reader, depth + 1)?;
            *slot = Some(Box::new(child));
        }
    }
    Ok(())
}
