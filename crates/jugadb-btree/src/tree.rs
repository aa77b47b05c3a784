//! `BTree` (spec.md §4.5): typed-key B-tree with insert/search/delete and
//! the split-child-on-full / borrow-or-merge policies.
//!
//! Data lives only at leaves: `row_pointers` is always empty on internal
//! nodes, which hold separator keys only for routing. A leaf split
//! duplicates its median key up into the parent (the right leaf keeps it as
//! its first key); an internal split promotes its median key without
//! duplicating it in either child, per the classic B-tree split.

use std::cmp::Ordering;

use jugadb_types::schema::TypeKind;
use jugadb_types::{ColumnValue, RowId};

use crate::node::BTreeNode;
use crate::order::calculate_btree_order;

#[derive(Debug, Clone, PartialEq)]
pub struct BTree {
    pub id: u32,
    pub root: BTreeNode,
    pub btree_order: usize,
    pub key_type: TypeKind,
}

impl BTree {
    pub fn new(id: u32, key_type: TypeKind) -> Self {
        Self {
            id,
            root: BTreeNode::new_leaf(),
            btree_order: calculate_btree_order(key_type),
            key_type,
        }
    }

    pub fn search(&self, key: &ColumnValue) -> Option<RowId> {
        search_node(&self.root, key, self.key_type)
    }

    pub fn insert(&mut self, key: ColumnValue, row_id: RowId) {
        if self.root.is_full(self.btree_order) {
            let old_root = std::mem::replace(&mut self.root, BTreeNode::new_internal());
            self.root.children.push(old_root);
            btree_split_child(&mut self.root, 0, self.btree_order);
        }
        btree_insert_nonfull(&mut self.root, key, row_id, self.btree_order, self.key_type);
        log::debug!("btree {}: inserted key into tree of order {}", self.id, self.btree_order);
    }

    /// Returns true if a matching key was found and removed.
    pub fn delete(&mut self, key: &ColumnValue) -> bool {
        let removed = btree_delete(&mut self.root, key, self.btree_order, self.key_type);
        if removed && !self.root.is_leaf && self.root.num_keys() == 0 {
            self.root = self.root.children.remove(0);
        }
        removed
    }
}

pub fn key_compare(a: &ColumnValue, b: &ColumnValue, _key_type: TypeKind) -> Ordering {
    use ColumnValue::*;
    match (a, b) {
        (Null, Null) => Ordering::Equal,
        (Null, _) => Ordering::Greater,
        (_, Null) => Ordering::Less,
        (Int(x), Int(y)) => x.cmp(y),
        (Uint(x), Uint(y)) => x.cmp(y),
        (Float(x), Float(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
        (Double(x), Double(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
        (Bool(x), Bool(y)) => x.cmp(y),
        (Char(x), Char(y)) => x.cmp(y),
        (Str(x), Str(y)) | (Varchar(x), Varchar(y)) => x.as_bytes().cmp(y.as_bytes()),
        (Uuid(x), Uuid(y)) => x.as_bytes().cmp(y.as_bytes()),
        (Decimal(x), Decimal(y)) => x.digits.cmp(&y.digits),
        (Date(x), Date(y)) => x.cmp(y),
        (Time(x), Time(y)) => x.cmp(y),
        (TimeTz(x, _), TimeTz(y, _)) => x.cmp(y),
        (Datetime(x), Datetime(y)) | (Timestamp(x), Timestamp(y)) => x.cmp(y),
        (DatetimeTz(x), DatetimeTz(y)) | (TimestampTz(x), TimestampTz(y)) => x.cmp(y),
        (Array(x), Array(y)) => {
            for (xi, yi) in x.iter().zip(y.iter()) {
                let ord = key_compare(xi, yi, _key_type);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            x.len().cmp(&y.len())
        }
        _ => Ordering::Equal,
    }
}

/// Index of the first key `>= key` (i.e. the child/slot to descend into).
fn lower_bound(keys: &[ColumnValue], key: &ColumnValue, key_type: TypeKind) -> usize {
    let mut i = 0;
    while i < keys.len() && key_compare(key, &keys[i], key_type) == Ordering::Greater {
        i += 1;
    }
    i
}

fn search_node(node: &BTreeNode, key: &ColumnValue, key_type: TypeKind) -> Option<RowId> {
    if node.is_leaf {
        let i = lower_bound(&node.keys, key, key_type);
        return if i < node.num_keys() && key_compare(key, &node.keys[i], key_type) == Ordering::Equal {
            Some(node.row_pointers[i])
        } else {
            None
        };
    }
    let i = lower_bound(&node.keys, key, key_type);
    let i = if i < node.num_keys() && key_compare(key, &node.keys[i], key_type) == Ordering::Equal {
        i + 1 // keys[i] is a separator duplicated as the right child's first key
    } else {
        i
    };
    search_node(&node.children[i], key, key_type)
}

/// Splits `parent.children[child_idx]`, which must be full, promoting a
/// median key into `parent` (spec.md §4.5 "preemptive split").
fn btree_split_child(parent: &mut BTreeNode, child_idx: usize, order: usize) {
    let child = &mut parent.children[child_idx];
    let mid = child.num_keys() / 2;

    let promoted = if child.is_leaf {
        let mut sibling = BTreeNode::new_leaf();
        sibling.keys = child.keys.split_off(mid);
        sibling.row_pointers = child.row_pointers.split_off(mid);
        let promoted = sibling.keys[0].clone();
        parent.children.insert(child_idx + 1, sibling);
        promoted
    } else {
        let mut sibling = BTreeNode::new_internal();
        let promoted = child.keys[mid].clone();
        sibling.keys = child.keys.split_off(mid + 1);
        child.keys.truncate(mid);
        sibling.children = child.children.split_off(mid + 1);
        parent.children.insert(child_idx + 1, sibling);
        promoted
    };

    parent.keys.insert(child_idx, promoted);
    let _ = order;
}

fn btree_insert_nonfull(node: &mut BTreeNode, key: ColumnValue, row_id: RowId, order: usize, key_type: TypeKind) {
    if node.is_leaf {
        let i = lower_bound(&node.keys, &key, key_type);
        if i < node.num_keys() && key_compare(&key, &node.keys[i], key_type) == Ordering::Equal {
            node.row_pointers[i] = row_id; // upsert on duplicate key
            return;
        }
        node.keys.insert(i, key);
        node.row_pointers.insert(i, row_id);
        return;
    }

    let mut i = lower_bound(&node.keys, &key, key_type);
    if i < node.num_keys() && key_compare(&key, &node.keys[i], key_type) == Ordering::Equal {
        i += 1;
    }
    if node.children[i].is_full(order) {
        btree_split_child(node, i, order);
        if key_compare(&key, &node.keys[i], key_type) == Ordering::Greater
            || key_compare(&key, &node.keys[i], key_type) == Ordering::Equal
        {
            i += 1;
        }
    }
    btree_insert_nonfull(&mut node.children[i], key, row_id, order, key_type);
}

fn btree_delete(node: &mut BTreeNode, key: &ColumnValue, order: usize, key_type: TypeKind) -> bool {
    if node.is_leaf {
        let i = lower_bound(&node.keys, key, key_type);
        if i < node.num_keys() && key_compare(key, &node.keys[i], key_type) == Ordering::Equal {
            node.keys.remove(i);
            node.row_pointers.remove(i);
            return true;
        }
        return false;
    }

    let mut i = lower_bound(&node.keys, key, key_type);
    let routes_via_separator = i < node.num_keys() && key_compare(key, &node.keys[i], key_type) == Ordering::Equal;
    if routes_via_separator {
        i += 1;
    }

    let removed = btree_delete(&mut node.children[i], key, order, key_type);

    // If the deleted key was the leftmost key of the subtree that a
    // separator duplicates, refresh the separator to the new leftmost key.
    if removed && routes_via_separator {
        if let Some(new_sep) = leftmost_key(&node.children[i]) {
            node.keys[i - 1] = new_sep;
        }
    }

    if removed {
        rebalance_child(node, i, order);
    }
    removed
}

fn leftmost_key(node: &BTreeNode) -> Option<ColumnValue> {
    if node.is_leaf {
        node.keys.first().cloned()
    } else {
        leftmost_key(node.children.first()?)
    }
}

/// After deleting from `parent.children[idx]`, restore the minimum fill
/// factor via borrow-from-sibling or merge (spec.md §4.5 `btree_rebalance`).
fn rebalance_child(parent: &mut BTreeNode, idx: usize, order: usize) {
    let min_keys = BTreeNode::min_keys(order);
    if parent.children[idx].num_keys() >= min_keys {
        return;
    }

    let can_borrow_left = idx > 0 && parent.children[idx - 1].num_keys() > min_keys;
    let can_borrow_right = idx + 1 < parent.children.len() && parent.children[idx + 1].num_keys() > min_keys;

    if can_borrow_left {
        borrow_from_left(parent, idx);
    } else if can_borrow_right {
        borrow_from_right(parent, idx);
    } else if idx > 0 {
        btree_merge_children(parent, idx - 1);
    } else {
        btree_merge_children(parent, idx);
    }
}

fn borrow_from_left(parent: &mut BTreeNode, idx: usize) {
    let left_is_leaf = parent.children[idx - 1].is_leaf;

    if left_is_leaf {
        let (k, r) = {
            let left = &mut parent.children[idx - 1];
            (left.keys.pop().unwrap(), left.row_pointers.pop().unwrap())
        };
        let child = &mut parent.children[idx];
        child.keys.insert(0, k.clone());
        child.row_pointers.insert(0, r);
        parent.keys[idx - 1] = k;
    } else {
        let sep = parent.keys[idx - 1].clone();
        let (borrowed_key, borrowed_child) = {
            let left = &mut parent.children[idx - 1];
            (left.keys.pop().unwrap(), left.children.pop().unwrap())
        };
        let child = &mut parent.children[idx];
        child.keys.insert(0, sep);
        child.children.insert(0, borrowed_child);
        parent.keys[idx - 1] = borrowed_key;
    }
}

fn borrow_from_right(parent: &mut BTreeNode, idx: usize) {
    let right_is_leaf = parent.children[idx + 1].is_leaf;

    if right_is_leaf {
        let (k, r) = {
            let right = &mut parent.children[idx + 1];
            (right.keys.remove(0), right.row_pointers.remove(0))
        };
        parent.keys[idx] = parent.children[idx + 1].keys[0].clone();
        let child = &mut parent.children[idx];
        child.keys.push(k);
        child.row_pointers.push(r);
    } else {
        let sep = parent.keys[idx].clone();
        let (borrowed_key, borrowed_child) = {
            let right = &mut parent.children[idx + 1];
            (right.keys.remove(0), right.children.remove(0))
        };
        let child = &mut parent.children[idx];
        child.keys.push(sep);
        child.children.push(borrowed_child);
        parent.keys[idx] = borrowed_key;
    }
}

/// Merges `parent.children[idx]` and `parent.children[idx + 1]`. For leaves
/// the separator is dropped (it was already duplicated into the right
/// leaf); for internal nodes it's pulled down as the new middle key
/// (spec.md §4.5 `btree_merge_children`).
fn btree_merge_children(parent: &mut BTreeNode, idx: usize) {
    let sep = parent.keys.remove(idx);
    let mut right = parent.children.remove(idx + 1);
    let left = &mut parent.children[idx];

    if left.is_leaf {
        left.keys.extend(right.keys.drain(..));
        left.row_pointers.extend(right.row_pointers.drain(..));
    } else {
        left.keys.push(sep);
        left.keys.extend(right.keys.drain(..));
        left.children.extend(right.children.drain(..));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(n: u32) -> RowId {
        RowId::new(0, n)
    }

    #[test]
    fn insert_and_search_round_trip() {
        let mut tree = BTree::new(1, TypeKind::Int);
        for i in 0..200i64 {
            tree.insert(ColumnValue::Int(i), row(i as u32));
        }
        for i in 0..200i64 {
            assert_eq!(tree.search(&ColumnValue::Int(i)), Some(row(i as u32)));
        }
        assert_eq!(tree.search(&ColumnValue::Int(999)), None);
    }

    #[test]
    fn delete_removes_key_and_rebalances() {
        let mut tree = BTree::new(1, TypeKind::Int);
        for i in 0..100i64 {
            tree.insert(ColumnValue::Int(i), row(i as u32));
        }
        for i in 0..100i64 {
            assert!(tree.delete(&ColumnValue::Int(i)));
            assert_eq!(tree.search(&ColumnValue::Int(i)), None);
        }
    }

    #[test]
    fn delete_missing_key_returns_false() {
        let mut tree = BTree::new(1, TypeKind::Int);
        tree.insert(ColumnValue::Int(1), row(1));
        assert!(!tree.delete(&ColumnValue::Int(2)));
    }

    #[test]
    fn string_keys_sort_nulls_last() {
        let ord = key_compare(&ColumnValue::Null, &ColumnValue::Varchar("a".into()), TypeKind::Varchar);
        assert_eq!(ord, Ordering::Greater);
    }

    #[test]
    fn reverse_order_insert_then_delete_all() {
        let mut tree = BTree::new(1, TypeKind::Int);
        for i in (0..150i64).rev() {
            tree.insert(ColumnValue::Int(i), row(i as u32));
        }
        for i in 0..150i64 {
            assert_eq!(tree.search(&ColumnValue::Int(i)), Some(row(i as u32)));
        }
        for i in 0..150i64 {
            assert!(tree.delete(&ColumnValue::Int(i)));
        }
        assert_eq!(tree.root.num_keys(), 0);
    }
}
