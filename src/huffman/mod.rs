//! Huffman coding is a method of encoding where symbols are assigned a code,
//! and more commonly used symbols get shorter codes, and less commonly
//! used symbols get longer codes. Codes are prefix free, meaning no code
//! is the beginning of another code.
//!
//! Codes here are read straight off a binary tree: the path from the root to a
//! leaf, where `0` descends left and `1` descends right. The tree shape itself is
//! stored in front of the encoded data, see [CodeTree::serialize].
mod huffman_decoder;
mod huffman_encoder;
pub use huffman_decoder::*;

use std::collections::TryReserveError;
use std::fmt;

use crate::decoding::bit_reader::GetBitsError;
use crate::encoding::bit_writer::BitWriterError;

/// Deepest a leaf can sit in a tree over a byte alphabet. The most lopsided tree over
/// 256 symbols puts its last leaves at depth 255.
pub const MAX_TREE_DEPTH: usize = 256;

/// A single node of a [CodeTree].
///
/// A node without children is a leaf and `symbol` is the byte it stands for.
/// A node with at least one child is internal, its `symbol` only travels along
/// in the serialized shape and is never decoded.
#[derive(Debug, Clone, Default)]
pub struct Node {
    pub symbol: u8,
    pub left: Option<Box<Node>>,
    pub right: Option<Box<Node>>,
}

impl Node {
    pub fn leaf(symbol: u8) -> Self {
        Node {
            symbol,
            left: None,
            right: None,
        }
    }

    pub fn internal(left: Option<Node>, right: Option<Node>) -> Self {
        Node {
            symbol: 0,
            left: left.map(Box::new),
            right: right.map(Box::new),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    fn leaf_count(&self) -> usize {
        if self.is_leaf() {
            return 1;
        }
        self.left.as_deref().map_or(0, Node::leaf_count)
            + self.right.as_deref().map_or(0, Node::leaf_count)
    }

    fn depth(&self) -> usize {
        let left = self.left.as_deref().map_or(0, |n| n.depth() + 1);
        let right = self.right.as_deref().map_or(0, |n| n.depth() + 1);
        left.max(right)
    }
}

/// Two nodes are equal if they have the same shape and carry the same symbols on
/// their leaves. The payload of internal nodes is ignored.
impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        if self.is_leaf() || other.is_leaf() {
            return self.is_leaf() && other.is_leaf() && self.symbol == other.symbol;
        }
        self.left == other.left && self.right == other.right
    }
}

impl Eq for Node {}

/// The path from the root to a leaf, `false` meaning left and `true` meaning right.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Code(Vec<bool>);

impl Code {
    pub fn from_bits(bits: Vec<bool>) -> Self {
        Code(bits)
    }

    pub fn bits(&self) -> &[bool] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn starts_with(&self, prefix: &Code) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &bit in &self.0 {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// Maps every symbol that has a leaf in the tree to its [Code].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTable {
    /// Index is the symbol
    codes: Vec<Option<Code>>,
}

impl CodeTable {
    fn empty() -> Self {
        CodeTable {
            codes: vec![None; 256],
        }
    }

    pub fn code(&self, symbol: u8) -> Option<&Code> {
        self.codes[usize::from(symbol)].as_ref()
    }

    /// All symbols that have a code, in ascending symbol order
    pub fn iter(&self) -> impl Iterator<Item = (u8, &Code)> + '_ {
        self.codes
            .iter()
            .enumerate()
            .filter_map(|(symbol, code)| code.as_ref().map(|code| (symbol as u8, code)))
    }

    pub fn len(&self) -> usize {
        self.codes.iter().filter(|code| code.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A binary prefix-code tree together with the codes read off it.
#[derive(Debug, Clone)]
pub struct CodeTree {
    root: Node,
    codes: CodeTable,
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CodeTreeError {
    #[error("Ran out of memory while building the code tree: {0}")]
    AllocationFailure(#[from] TryReserveError),
    #[error(transparent)]
    GetBitsError(#[from] GetBitsError),
    #[error(transparent)]
    BitWriterError(#[from] BitWriterError),
    #[error("Serialized tree is deeper than {MAX_TREE_DEPTH} levels. Stream is probably corrupted")]
    TooDeep,
    #[error("Symbol 0x{symbol:02X} has no leaf in this tree and can't be encoded")]
    MissingCode { symbol: u8 },
}

impl CodeTree {
    /// Wrap a finished tree and derive the code of every leaf.
    ///
    /// A root without children is the tree of an empty input: it has no leaves and
    /// therefore no codes.
    pub fn from_root(root: Node) -> Self {
        let mut codes = CodeTable::empty();
        if !root.is_leaf() {
            let mut path = Vec::new();
            collect_codes(&root, &mut path, &mut codes);
        }
        CodeTree { root, codes }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn codes(&self) -> &CodeTable {
        &self.codes
    }

    pub fn code(&self, symbol: u8) -> Option<&Code> {
        self.codes.code(symbol)
    }

    /// Number of symbols this tree can decode
    pub fn leaf_count(&self) -> usize {
        if self.root.is_leaf() {
            0
        } else {
            self.root.leaf_count()
        }
    }

    /// Length of the longest code
    pub fn depth(&self) -> usize {
        self.root.depth()
    }
}

fn collect_codes(node: &Node, path: &mut Vec<bool>, codes: &mut CodeTable) {
    if node.is_leaf() {
        codes.codes[usize::from(node.symbol)] = Some(Code(path.clone()));
        return;
    }
    if let Some(left) = node.left.as_deref() {
        path.push(false);
        collect_codes(left, path, codes);
        path.pop();
    }
    if let Some(right) = node.right.as_deref() {
        path.push(true);
        collect_codes(right, path, codes);
        path.pop();
    }
}
