//! Row/page codec, TOAST store, sequence, and catalog/database file for jugadb.

pub mod catalog;
pub mod codec;
pub mod sequence;
pub mod toast;

pub use catalog::{CatalogError, Database, TableEntry, MAGIC, TABLE_COUNT_OFFSET};
pub use codec::{decode_row, encode_row, CodecError};
pub use sequence::Sequence;
pub use toast::{ToastError, ToastStore};
