//! `BTreeNode` (spec.md §3 "BTreeNode"): `{ is_leaf, num_keys, keys[],
//! row_pointers[], children[] }`. Leaves carry `row_pointers` parallel to
//! `keys`; internal nodes carry `children` (`num_keys + 1` of them) and no
//! row pointers.

use jugadb_types::{ColumnValue, RowId};

#[derive(Debug, Clone, PartialEq)]
pub struct BTreeNode {
    pub is_leaf: bool,
    pub keys: Vec<ColumnValue>,
    pub row_pointers: Vec<RowId>,
    pub children: Vec<BTreeNode>,
}

impl BTreeNode {
    pub fn new_leaf() -> Self {
        Self {
            is_leaf: true,
            keys: Vec::new(),
            row_pointers: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn new_internal() -> Self {
        Self {
            is_leaf: false,
            keys: Vec::new(),
            row_pointers: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn num_keys(&self) -> usize {
        self.keys.len()
    }

    pub fn is_full(&self, order: usize) -> bool {
        self.num_keys() >= order
    }

    /// Minimum key count a non-root node must retain, per classic B-tree
    /// fill-factor rules (spec.md §4.5 `btree_rebalance`).
    pub fn min_keys(order: usize) -> usize {
        order.div_ceil(2) - 1
    }
}
