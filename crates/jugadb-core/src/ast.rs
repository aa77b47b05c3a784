//! Parser output (spec.md §4.2). `Command` is the tagged variant the
//! executor dispatches on; `ExprNode` is the immutable expression tree
//! produced by Pratt-precedence parsing. No back-pointers — the teacher's
//! segment tree is mutable and arena-allocated, but a JQL command tree is
//! built once and never edited in place.

use smol_str::SmolStr;

use jugadb_types::schema::{ColumnDefinition, ReferentialAction};

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Int(i64),
    Uint(u64),
    Float(f32),
    Double(f64),
    Bool(bool),
    Str(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Concat,
    Eq,
    Neq,
    Lt,
    Gt,
    Lte,
    Gte,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprNode {
    Literal(Literal),
    Column(SmolStr),
    /// `table.column` qualified reference.
    QualifiedColumn(SmolStr, SmolStr),
    ArrayIndex(Box<ExprNode>, Box<ExprNode>),
    ArrayLiteral(Vec<ExprNode>),
    UnaryOp(UnaryOp, Box<ExprNode>),
    BinaryOp(BinaryOp, Box<ExprNode>, Box<ExprNode>),
    In(Box<ExprNode>, Vec<ExprNode>),
    Between(Box<ExprNode>, Box<ExprNode>, Box<ExprNode>),
    Like(Box<ExprNode>, Box<ExprNode>),
    IsNull(Box<ExprNode>, bool),
    FunctionCall(SmolStr, Vec<ExprNode>),
    Cast(Box<ExprNode>, SmolStr),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderByKey {
    pub expr: ExprNode,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetAssignment {
    /// The target column, and if present, a 1-based array index expression
    /// (`favorite_numbers[1] = 99`).
    pub column: SmolStr,
    pub index: Option<ExprNode>,
    pub value: ExprNode,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectCommand {
    pub table: SmolStr,
    pub projections: Vec<ExprNode>,
    pub distinct: bool,
    pub where_clause: Option<ExprNode>,
    pub order_by: Vec<OrderByKey>,
    pub group_by: Vec<ExprNode>,
    pub having: Option<ExprNode>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsertCommand {
    pub table: SmolStr,
    pub columns: Option<Vec<SmolStr>>,
    pub value_rows: Vec<Vec<ExprNode>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateCommand {
    pub table: SmolStr,
    pub assignments: Vec<SetAssignment>,
    pub where_clause: Option<ExprNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteCommand {
    pub table: SmolStr,
    pub where_clause: Option<ExprNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableCommand {
    pub table: SmolStr,
    pub columns: Vec<ColumnDefinition>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlterTableCommand {
    pub table: SmolStr,
    pub add_column: Option<ColumnDefinition>,
    pub drop_column: Option<SmolStr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DropTableCommand {
    pub table: SmolStr,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Create(CreateTableCommand),
    Insert(InsertCommand),
    Select(SelectCommand),
    Update(UpdateCommand),
    Delete(DeleteCommand),
    Alter(AlterTableCommand),
    Drop(DropTableCommand),
    /// Best-effort partial command for downstream short-circuit when the
    /// parser could not fully recover (spec.md §4.2 "Errors").
    Unknown,
}

pub fn referential_action_from_keyword(word: &str) -> Option<ReferentialAction> {
    match word.to_ascii_uppercase().as_str() {
        "CASCADE" => Some(ReferentialAction::Cascade),
        "SETNULL" | "SET_NULL" => Some(ReferentialAction::SetNull),
        "RESTRICT" => Some(ReferentialAction::Restrict),
        _ => None,
    }
}
