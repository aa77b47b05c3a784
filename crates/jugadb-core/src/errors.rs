//! Lexical and syntactic error templates (spec.md §7). Each variant carries
//! its own `{line, col}` the way the teacher's `SQLBaseError` carries a
//! `PositionMarker`, but as a `thiserror` enum rather than one struct plus a
//! `rule: Option<ErrorStructRule>` side table.

use jugadb_helpers::Diagnostic;

#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone)]
pub enum LexError {
    #[error("{line}:{col}: unrecognized numeric literal suffix near {detail:?}")]
    NumLitType { line: u32, col: u32, detail: String },
    #[error("{line}:{col}: unterminated string literal")]
    StringTerminator { line: u32, col: u32 },
    #[error("{line}:{col}: identifier {detail:?} exceeds the maximum length")]
    ShorterLenIden { line: u32, col: u32, detail: String },
    #[error("{line}:{col}: unexpected character {detail:?}")]
    UnexpectedChar { line: u32, col: u32, detail: String },
}

impl Diagnostic for LexError {
    fn code(&self) -> &'static str {
        match self {
            LexError::NumLitType { .. } => "U_NUM_LIT_TYPE",
            LexError::StringTerminator { .. } => "E_STRING_TERMINATOR",
            LexError::ShorterLenIden { .. } => "E_SHORTER_LENIDEN",
            LexError::UnexpectedChar { .. } => "U_NUM_LIT_TYPE",
        }
    }

    fn line(&self) -> u32 {
        match *self {
            LexError::NumLitType { line, .. }
            | LexError::StringTerminator { line, .. }
            | LexError::ShorterLenIden { line, .. }
            | LexError::UnexpectedChar { line, .. } => line,
        }
    }

    fn col(&self) -> u32 {
        match *self {
            LexError::NumLitType { col, .. }
            | LexError::StringTerminator { col, .. }
            | LexError::ShorterLenIden { col, .. }
            | LexError::UnexpectedChar { col, .. } => col,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone)]
pub enum ParseError {
    #[error("{line}:{col}: unsupported construct near {detail:?}")]
    Unsupported { line: u32, col: u32, detail: String },
    #[error("{line}:{col}: expected a column name, found {detail:?}")]
    ExpectedColumnName { line: u32, col: u32, detail: String },
    #[error("{line}:{col}: expected a column data type, found {detail:?}")]
    ExpectedColumnType { line: u32, col: u32, detail: String },
    #[error("{line}:{col}: expected table name after CREATE TABLE")]
    ExpectedTableAfterCreate { line: u32, col: u32 },
    #[error("{line}:{col}: table name is not a valid identifier")]
    TableNameNotAnIdentifier { line: u32, col: u32 },
    #[error("{line}:{col}: PRIMARY KEY not allowed on a dynamic array column")]
    PrimaryKeyNotAllowedForDynamicArray { line: u32, col: u32 },
    #[error("{line}:{col}: column cannot be both PRIMARY KEY and have an explicit DEFAULT")]
    ConflictingPrimaryKeyOrComputed { line: u32, col: u32 },
    #[error("{line}:{col}: conflicting PRIMARY KEY declarations")]
    ConflictingPrimaryKey { line: u32, col: u32 },
    #[error("{line}:{col}: VARCHAR length must be between 1 and 255, found {detail:?}")]
    VarcharValue { line: u32, col: u32, detail: String },
    #[error("{line}:{col}: unterminated column definition list")]
    UnterminatedColumnDef { line: u32, col: u32 },
    #[error("{line}:{col}: invalid value list near {detail:?}")]
    InvalidValues { line: u32, col: u32, detail: String },
}

impl Diagnostic for ParseError {
    fn code(&self) -> &'static str {
        match self {
            ParseError::Unsupported { .. } => "SYE_UNSUPPORTED",
            ParseError::ExpectedColumnName { .. } => "SYE_E_CNAME",
            ParseError::ExpectedColumnType { .. } => "SYE_E_CDTYPE",
            ParseError::ExpectedTableAfterCreate { .. } => "SYE_E_TAFCR",
            ParseError::TableNameNotAnIdentifier { .. } => "SYE_E_TNAFTA",
            ParseError::PrimaryKeyNotAllowedForDynamicArray { .. } => "SYE_E_PRNAFDYNA",
            ParseError::ConflictingPrimaryKeyOrComputed { .. } => "SYE_E_CPRORCOM",
            ParseError::ConflictingPrimaryKey { .. } => "SYE_E_CPR",
            ParseError::VarcharValue { .. } => "SYE_E_VARCHAR_VALUE",
            ParseError::UnterminatedColumnDef { .. } => "SYE_U_COLDEF",
            ParseError::InvalidValues { .. } => "SYE_E_INVALID_VALUES",
        }
    }

    fn line(&self) -> u32 {
        match *self {
            ParseError::Unsupported { line, .. }
            | ParseError::ExpectedColumnName { line, .. }
            | ParseError::ExpectedColumnType { line, .. }
            | ParseError::ExpectedTableAfterCreate { line, .. }
            | ParseError::TableNameNotAnIdentifier { line, .. }
            | ParseError::PrimaryKeyNotAllowedForDynamicArray { line, .. }
            | ParseError::ConflictingPrimaryKeyOrComputed { line, .. }
            | ParseError::ConflictingPrimaryKey { line, .. }
            | ParseError::VarcharValue { line, .. }
            | ParseError::UnterminatedColumnDef { line, .. }
            | ParseError::InvalidValues { line, .. } => line,
        }
    }

    fn col(&self) -> u32 {
        match *self {
            ParseError::Unsupported { col, .. }
            | ParseError::ExpectedColumnName { col, .. }
            | ParseError::ExpectedColumnType { col, .. }
            | ParseError::ExpectedTableAfterCreate { col, .. }
            | ParseError::TableNameNotAnIdentifier { col, .. }
            | ParseError::PrimaryKeyNotAllowedForDynamicArray { col, .. }
            | ParseError::ConflictingPrimaryKeyOrComputed { col, .. }
            | ParseError::ConflictingPrimaryKey { col, .. }
            | ParseError::VarcharValue { col, .. }
            | ParseError::UnterminatedColumnDef { col, .. }
            | ParseError::InvalidValues { col, .. } => col,
        }
    }
}
