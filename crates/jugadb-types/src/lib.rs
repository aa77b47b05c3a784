//! Value and cast engine, schema types, for jugadb.

pub mod cast;
pub mod interval;
pub mod like;
pub mod row;
pub mod schema;
pub mod size;
pub mod value;

pub use cast::{infer_and_cast_value, CastError};
pub use interval::Interval;
pub use like::like_matches;
pub use row::{Row, RowId};
pub use schema::{ColumnDefinition, ReferentialAction, TableSchema, TypeKind};
pub use size::{needs_toast, size_from_type, size_from_value, TOAST_CHUNK_SIZE, TOAST_DESCRIPTOR_SIZE};
pub use value::{ColumnValue, DecimalValue, LargeValue, ToastRef};
