//! Typed-key B-tree index with on-disk persistence for jugadb.

pub mod node;
pub mod order;
pub mod persistence;
pub mod tree;

pub use node::BTreeNode;
pub use order::{calculate_btree_order, key_size_for_type};
pub use persistence::{load_btree, save_btree, BTreeIoError, BTREE_LIFETIME_THRESHOLD};
pub use tree::{key_compare, BTree};
