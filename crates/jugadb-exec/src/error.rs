//! Semantic and runtime error templates (spec.md §7) plus the
//! `ExecutionResult` envelope the executor returns from `process`.

use jugadb_helpers::Diagnostic;

#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("no such table {0:?}")]
    NoSuchTable(String),
    #[error("table {0:?} already exists")]
    TableExists(String),
    #[error("no such column {0:?} on table {1:?}")]
    NoSuchColumn(String, String),
    #[error("value for column {0:?} failed to cast to its declared type")]
    TypeCastFailed(String),
    #[error("NOT NULL violation on column {0:?}")]
    NotNullViolation(String),
    #[error("UNIQUE violation on column {0:?}")]
    UniqueViolation(String),
    #[error("CHECK violation on column {0:?}: {1}")]
    CheckViolation(String, String),
    #[error("FOREIGN KEY violation: {0:?} references {1}({2}) but no such row exists")]
    ForeignKeyViolation(String, String, String),
    #[error("VARCHAR({1}) overflow for column {0:?}")]
    VarcharOverflow(String, u16),
    #[error("BLOB default values are not permitted")]
    InvalidBlobDefault,
    #[error("unknown function {0:?}")]
    UnknownFunction(String),
    #[error("array index {0} out of range (1-based, length {1})")]
    ArrayIndexOutOfRange(i64, usize),
    #[error("value at {0:?} is not an array")]
    NotAnArray(String),
    #[error("referential action RESTRICT blocked the operation on {0:?}")]
    RestrictBlocked(String),
    #[error(transparent)]
    Lex(#[from] jugadb_core::LexError),
    #[error(transparent)]
    Parse(#[from] jugadb_core::ParseError),
    #[error(transparent)]
    Cast(#[from] jugadb_types::CastError),
    #[error(transparent)]
    Codec(#[from] jugadb_storage::CodecError),
    #[error(transparent)]
    Catalog(#[from] jugadb_storage::CatalogError),
    #[error("fatal I/O error: {0}")]
    Fatal(String),
}

impl Diagnostic for ExecError {
    fn code(&self) -> &'static str {
        match self {
            ExecError::Lex(e) => e.code(),
            ExecError::Parse(e) => e.code(),
            ExecError::Cast(e) => e.code(),
            _ => "????",
        }
    }

    fn line(&self) -> u32 {
        match self {
            ExecError::Lex(e) => e.line(),
            ExecError::Parse(e) => e.line(),
            ExecError::Cast(e) => e.line(),
            _ => 0,
        }
    }

    fn col(&self) -> u32 {
        match self {
            ExecError::Lex(e) => e.col(),
            ExecError::Parse(e) => e.col(),
            ExecError::Cast(e) => e.col(),
            _ => 0,
        }
    }
}

/// Outcome of one `Executor::process` call (spec.md §4.8).
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionResult {
    pub code: i32,
    pub message: String,
    pub rows: Vec<jugadb_types::Row>,
    pub row_count: usize,
    /// Set when `rows` were materialized from projected expressions rather
    /// than borrowed straight from the table heap (spec.md §4.8 SELECT).
    pub owns_rows: bool,
}

impl ExecutionResult {
    pub fn ok(rows: Vec<jugadb_types::Row>, owns_rows: bool) -> Self {
        let row_count = rows.len();
        Self {
            code: 0,
            message: String::new(),
            rows,
            row_count,
            owns_rows,
        }
    }

    pub fn ok_empty() -> Self {
        Self {
            code: 0,
            message: String::new(),
            rows: Vec::new(),
            row_count: 0,
            owns_rows: false,
        }
    }

    pub fn err(e: impl Diagnostic) -> Self {
        Self {
            code: 1,
            message: format!("{} ({})", e, e.code()),
            rows: Vec::new(),
            row_count: 0,
            owns_rows: false,
        }
    }
}
