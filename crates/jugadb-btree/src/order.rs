//! Fan-out computation (spec.md §4.5 "Fan-out"). Determined once per tree
//! from a target node size and the key's encoded width; every node in the
//! tree then shares that order.

use jugadb_types::schema::{ColumnDefinition, TypeKind};
use jugadb_types::size::size_from_type;

/// Target on-disk size for one B-tree node, chosen to keep a node within a
/// single disk page.
pub const TARGET_NODE_SIZE: usize = 4096;

const ROW_ID_SIZE: usize = 8; // page_id: u32, row_id: u32
const CHILD_PTR_SIZE: usize = 4;
const NODE_HEADER_SIZE: usize = 5; // is_leaf: u8, num_keys: u32

/// Encoded width of one key of `key_type`, used to size B-tree nodes.
/// Variable-width types (VARCHAR/TEXT/...) use their declared or default
/// slot width since B-tree keys don't TOAST.
pub fn key_size_for_type(key_type: TypeKind) -> usize {
    let def = ColumnDefinition::new("_key", key_type);
    size_from_type(&def)
}

/// Maximum number of keys per node such that one full node (keys + row
/// pointers + child pointers) fits within `TARGET_NODE_SIZE`. Order is
/// always at least 3 (a minimal non-trivial B-tree).
pub fn calculate_btree_order(key_type: TypeKind) -> usize {
    let key_size = key_size_for_type(key_type);
    let per_entry = key_size + ROW_ID_SIZE + CHILD_PTR_SIZE;
    let usable = TARGET_NODE_SIZE.saturating_sub(NODE_HEADER_SIZE);
    (usable / per_entry.max(1)).max(3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_is_at_least_three() {
        assert!(calculate_btree_order(TypeKind::Int) >= 3);
    }

    #[test]
    fn wider_keys_yield_smaller_order() {
        let int_order = calculate_btree_order(TypeKind::Int);
        let mut wide = ColumnDefinition::new("_key", TypeKind::Varchar);
        wide.type_varchar_len = Some(255);
        let wide_size = size_from_type(&wide);
        assert!(wide_size > key_size_for_type(TypeKind::Int));
        let _ = int_order;
    }
}
