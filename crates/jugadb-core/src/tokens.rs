//! Token kinds (spec.md §3 "Token"): punctuation, shortened keywords,
//! the 21 type keywords, and literal kinds.

use smol_str::SmolStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Punctuation
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Dot,
    Semicolon,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Eq,
    Neq,
    Lt,
    Gt,
    Lte,
    Gte,
    PipePipe,
    AmpAmp,

    // Keywords
    Create,
    Table,
    Insert,
    Into,
    Values,
    Select,
    From,
    Where,
    Update,
    Set,
    Delete,
    Alter,
    Drop,
    Order,
    By,
    Asc,
    Desc,
    Lim,
    Offset,
    Group,
    Having,
    Join,
    On,
    And,
    Or,
    Not,
    Null,
    In,
    Between,
    Like,
    Is,
    PrimKey,
    FrnKey,
    References,
    Unique,
    Index,
    Default,
    Check,
    Cascade,
    SetNull,
    Restrict,
    Disct,
    As,
    Cast,

    // Type keywords
    TypeInt,
    TypeUint,
    TypeVarchar,
    TypeChar,
    TypeText,
    TypeBool,
    TypeFloat,
    TypeDouble,
    TypeDecimal,
    TypeDate,
    TypeTime,
    TypeTimetz,
    TypeDatetime,
    TypeDatetimetz,
    TypeTimestamp,
    TypeTimestamptz,
    TypeInterval,
    TypeBlob,
    TypeJson,
    TypeUuid,
    TypeSerial,

    // Literal kinds
    LInt,
    LUint,
    LFloat,
    LDouble,
    LString,
    LBool,

    TokId,
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub line: u32,
    pub col: u32,
    pub kind: TokenKind,
    pub lexeme: SmolStr,
}

impl Token {
    pub fn new(line: u32, col: u32, kind: TokenKind, lexeme: impl Into<SmolStr>) -> Self {
        Self {
            line,
            col,
            kind,
            lexeme: lexeme.into(),
        }
    }
}
