//! Token stream → `Command` (spec.md §4.2). Recursive descent for
//! statements, Pratt-style precedence climbing for expressions.

use smol_str::SmolStr;

use jugadb_types::schema::{ColumnDefinition, TypeKind};

use crate::ast::*;
use crate::errors::ParseError;
use crate::tokens::{Token, TokenKind};

pub fn parse(tokens: Vec<Token>) -> Result<Command, ParseError> {
    let mut parser = Parser { tokens, pos: 0 };
    let result = parser.parse_command();
    if let Err(ref err) = result {
        log::debug!("parse error: {err}");
    }
    result
}

/// Parses a standalone expression rather than a full statement. Used to
/// re-parse a CHECK constraint's captured raw text at evaluation time
/// (spec.md §4.8 INSERT "CHECK (evaluate expression)").
pub fn parse_expression(tokens: Vec<Token>) -> Result<ExprNode, ParseError> {
    let mut parser = Parser { tokens, pos: 0 };
    parser.parse_expr()
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    fn advance(&mut self) -> Token {
        let tok = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            let tok = self.peek().clone();
            Err(ParseError::Unsupported {
                line: tok.line,
                col: tok.col,
                detail: tok.lexeme.to_string(),
            })
        }
    }

    fn expect_identifier(&mut self) -> Result<SmolStr, ParseError> {
        if self.check(TokenKind::TokId) {
            Ok(self.advance().lexeme)
        } else {
            let tok = self.peek().clone();
            Err(ParseError::ExpectedColumnName {
                line: tok.line,
                col: tok.col,
                detail: tok.lexeme.to_string(),
            })
        }
    }

    fn parse_command(&mut self) -> Result<Command, ParseError> {
        let command = match self.peek_kind() {
            TokenKind::Create => self.parse_create_table()?,
            TokenKind::Insert => self.parse_insert()?,
            TokenKind::Select => self.parse_select()?,
            TokenKind::Update => self.parse_update()?,
            TokenKind::Delete => self.parse_delete()?,
            TokenKind::Alter => self.parse_alter()?,
            TokenKind::Drop => self.parse_drop()?,
            _ => {
                let tok = self.peek().clone();
                return Err(ParseError::Unsupported {
                    line: tok.line,
                    col: tok.col,
                    detail: tok.lexeme.to_string(),
                });
            }
        };
        self.eat(TokenKind::Semicolon);
        Ok(command)
    }

    // ---- CREATE TABLE ----

    fn parse_create_table(&mut self) -> Result<Command, ParseError> {
        let start = self.peek().clone();
        self.advance(); // CREATE
        if !self.eat(TokenKind::Table) {
            return Err(ParseError::ExpectedTableAfterCreate {
                line: start.line,
                col: start.col,
            });
        }
        let table = self.expect_identifier().map_err(|_| {
            let tok = self.peek().clone();
            ParseError::TableNameNotAnIdentifier {
                line: tok.line,
                col: tok.col,
            }
        })?;

        self.expect(TokenKind::LParen)?;
        let mut columns = Vec::new();
        loop {
            columns.push(self.parse_column_def()?);
            if self.eat(TokenKind::Comma) {
                continue;
            }
            break;
        }
        if !self.eat(TokenKind::RParen) {
            let tok = self.peek().clone();
            return Err(ParseError::UnterminatedColumnDef {
                line: tok.line,
                col: tok.col,
            });
        }

        Ok(Command::Create(CreateTableCommand { table, columns }))
    }

    fn parse_column_def(&mut self) -> Result<ColumnDefinition, ParseError> {
        let name = self.expect_identifier()?;
        let type_tok = self.peek().clone();
        let type_kind = self.parse_type_kind()?;

        let mut def = ColumnDefinition::new(name, type_kind);

        if self.eat(TokenKind::LBracket) {
            self.expect(TokenKind::RBracket)?;
            def.is_array = true;
        }

        if type_kind == TypeKind::Varchar && self.eat(TokenKind::LParen) {
            let len_tok = self.expect_numeric_literal()?;
            let n: u16 = len_tok.parse().map_err(|_| ParseError::VarcharValue {
                line: type_tok.line,
                col: type_tok.col,
                detail: len_tok.clone(),
            })?;
            if !(1..=255).contains(&n) {
                return Err(ParseError::VarcharValue {
                    line: type_tok.line,
                    col: type_tok.col,
                    detail: len_tok,
                });
            }
            def.type_varchar_len = Some(n);
            self.expect(TokenKind::RParen)?;
        } else if type_kind == TypeKind::Decimal && self.eat(TokenKind::LParen) {
            let p: u8 = self
                .expect_numeric_literal()?
                .parse()
                .unwrap_or(0);
            self.expect(TokenKind::Comma)?;
            let s: u8 = self
                .expect_numeric_literal()?
                .parse()
                .unwrap_or(0);
            if p == 0 || s == 0 {
                return Err(ParseError::VarcharValue {
                    line: type_tok.line,
                    col: type_tok.col,
                    detail: format!("DECIMAL({p},{s})"),
                });
            }
            def.decimal_precision = Some(p);
            def.decimal_scale = Some(s);
            self.expect(TokenKind::RParen)?;
        }

        loop {
            match self.peek_kind() {
                TokenKind::PrimKey => {
                    self.advance();
                    if def.is_array {
                        return Err(ParseError::PrimaryKeyNotAllowedForDynamicArray {
                            line: type_tok.line,
                            col: type_tok.col,
                        });
                    }
                    if def.is_primary_key {
                        return Err(ParseError::ConflictingPrimaryKey {
                            line: type_tok.line,
                            col: type_tok.col,
                        });
                    }
                    def.is_primary_key = true;
                }
                TokenKind::Unique => {
                    self.advance();
                    def.is_unique = true;
                }
                TokenKind::Not => {
                    self.advance();
                    self.expect(TokenKind::Null)?;
                    def.is_not_null = true;
                }
                TokenKind::Index => {
                    self.advance();
                    def.is_index = true;
                }
                TokenKind::Default => {
                    self.advance();
                    let expr = self.parse_primary()?;
                    def.has_default = true;
                    def.default_value = Some(render_expr(&expr));
                }
                TokenKind::Check => {
                    self.advance();
                    def.has_check = true;
                    def.check_expr = Some(self.capture_check_expr());
                }
                TokenKind::FrnKey => {
                    self.advance();
                    self.expect(TokenKind::References)?;
                    let foreign_table = self.expect_identifier()?;
                    self.expect(TokenKind::LParen)?;
                    let foreign_column = self.expect_identifier()?;
                    self.expect(TokenKind::RParen)?;
                    def.is_foreign_key = true;
                    def.foreign_table = Some(foreign_table);
                    def.foreign_column = Some(foreign_column);

                    while matches!(self.peek_kind(), TokenKind::On) {
                        self.advance();
                        let clause_tok = self.advance(); // Delete | Update
                        let action_tok = self.advance();
                        let action = referential_action_from_keyword(&action_tok.lexeme)
                            .ok_or_else(|| ParseError::Unsupported {
                                line: action_tok.line,
                                col: action_tok.col,
                                detail: action_tok.lexeme.to_string(),
                            })?;
                        if clause_tok.kind == TokenKind::Delete {
                            def.on_delete = action;
                        } else {
                            def.on_update = action;
                        }
                    }
                }
                _ => break,
            }
        }

        def.normalize();
        if !def.is_foreign_key_complete() {
            return Err(ParseError::Unsupported {
                line: type_tok.line,
                col: type_tok.col,
                detail: "incomplete FOREIGN KEY".into(),
            });
        }
        Ok(def)
    }

    fn parse_type_kind(&mut self) -> Result<TypeKind, ParseError> {
        let tok = self.peek().clone();
        let kind = match tok.kind {
            TokenKind::TypeInt => TypeKind::Int,
            TokenKind::TypeUint => TypeKind::Uint,
            TokenKind::TypeVarchar => TypeKind::Varchar,
            TokenKind::TypeChar => TypeKind::Char,
            TokenKind::TypeText => TypeKind::Text,
            TokenKind::TypeBool => TypeKind::Bool,
            TokenKind::TypeFloat => TypeKind::Float,
            TokenKind::TypeDouble => TypeKind::Double,
            TokenKind::TypeDecimal => TypeKind::Decimal,
            TokenKind::TypeDate => TypeKind::Date,
            TokenKind::TypeTime => TypeKind::Time,
            TokenKind::TypeTimetz => TypeKind::Timetz,
            TokenKind::TypeDatetime => TypeKind::Datetime,
            TokenKind::TypeDatetimetz => TypeKind::Datetimetz,
            TokenKind::TypeTimestamp => TypeKind::Timestamp,
            TokenKind::TypeTimestamptz => TypeKind::Timestamptz,
            TokenKind::TypeInterval => TypeKind::Interval,
            TokenKind::TypeBlob => TypeKind::Blob,
            TokenKind::TypeJson => TypeKind::Json,
            TokenKind::TypeUuid => TypeKind::Uuid,
            TokenKind::TypeSerial => TypeKind::Serial,
            _ => {
                return Err(ParseError::ExpectedColumnType {
                    line: tok.line,
                    col: tok.col,
                    detail: tok.lexeme.to_string(),
                })
            }
        };
        self.advance();
        Ok(kind)
    }

    fn expect_numeric_literal(&mut self) -> Result<String, ParseError> {
        match self.peek_kind() {
            TokenKind::LInt | TokenKind::LUint | TokenKind::LFloat | TokenKind::LDouble => {
                Ok(self.advance().lexeme.to_string())
            }
            _ => {
                let tok = self.peek().clone();
                Err(ParseError::VarcharValue {
                    line: tok.line,
                    col: tok.col,
                    detail: tok.lexeme.to_string(),
                })
            }
        }
    }

    /// Captures the raw token text of a CHECK expression up to the next
    /// top-level `,` or `)`, per spec.md §4.2.
    fn capture_check_expr(&mut self) -> String {
        let mut depth = 0i32;
        let mut parts = Vec::new();
        loop {
            match self.peek_kind() {
                TokenKind::LParen => {
                    depth += 1;
                    parts.push(self.advance().lexeme.to_string());
                }
                TokenKind::RParen if depth == 0 => break,
                TokenKind::RParen => {
                    depth -= 1;
                    parts.push(self.advance().lexeme.to_string());
                }
                TokenKind::Comma if depth == 0 => break,
                TokenKind::Eof => break,
                _ => parts.push(self.advance().lexeme.to_string()),
            }
        }
        parts.join("")
    }

    // ---- INSERT ----

    fn parse_insert(&mut self) -> Result<Command, ParseError> {
        self.advance(); // INSERT
        self.expect(TokenKind::Into)?;
        let table = self.expect_identifier()?;

        let columns = if self.eat(TokenKind::LParen) {
            let mut names = Vec::new();
            loop {
                names.push(self.expect_identifier()?);
                if self.eat(TokenKind::Comma) {
                    continue;
                }
                break;
            }
            self.expect(TokenKind::RParen)?;
            Some(names)
        } else {
            None
        };

        self.expect(TokenKind::Values)?;
        let mut value_rows = Vec::new();
        loop {
            self.expect(TokenKind::LParen)?;
            let mut row = Vec::new();
            loop {
                row.push(self.parse_expr()?);
                if self.eat(TokenKind::Comma) {
                    continue;
                }
                break;
            }
            self.expect(TokenKind::RParen)?;
            value_rows.push(row);
            if self.eat(TokenKind::Comma) {
                continue;
            }
            break;
        }

        Ok(Command::Insert(InsertCommand {
            table,
            columns,
            value_rows,
        }))
    }

    // ---- SELECT ----

    fn parse_select(&mut self) -> Result<Command, ParseError> {
        self.advance(); // SELECT
        let distinct = self.eat(TokenKind::Disct);

        let mut projections = Vec::new();
        if self.eat(TokenKind::Star) {
            // empty projections signals "*": the executor expands it.
        } else {
            loop {
                projections.push(self.parse_expr()?);
                if self.eat(TokenKind::Comma) {
                    continue;
                }
                break;
            }
        }

        self.expect(TokenKind::From)?;
        let table = self.expect_identifier()?;

        let where_clause = if self.eat(TokenKind::Where) {
            Some(self.parse_expr()?)
        } else {
            None
        };

        let mut group_by = Vec::new();
        if self.eat(TokenKind::Group) {
            self.expect(TokenKind::By)?;
            loop {
                group_by.push(self.parse_expr()?);
                if self.eat(TokenKind::Comma) {
                    continue;
                }
                break;
            }
        }

        let having = if self.eat(TokenKind::Having) {
            Some(self.parse_expr()?)
        } else {
            None
        };

        let mut order_by = Vec::new();
        if self.eat(TokenKind::Order) {
            self.expect(TokenKind::By)?;
            loop {
                let expr = self.parse_expr()?;
                let direction = if self.eat(TokenKind::Desc) {
                    SortDirection::Desc
                } else {
                    self.eat(TokenKind::Asc);
                    SortDirection::Asc
                };
                order_by.push(OrderByKey { expr, direction });
                if self.eat(TokenKind::Comma) {
                    continue;
                }
                break;
            }
        }

        let limit = if self.eat(TokenKind::Lim) {
            Some(self.expect_numeric_literal()?.parse().unwrap_or(0))
        } else {
            None
        };
        let offset = if self.eat(TokenKind::Offset) {
            Some(self.expect_numeric_literal()?.parse().unwrap_or(0))
        } else {
            None
        };

        Ok(Command::Select(SelectCommand {
            table,
            projections,
            distinct,
            where_clause,
            order_by,
            group_by,
            having,
            limit,
            offset,
        }))
    }

    // ---- UPDATE ----

    fn parse_update(&mut self) -> Result<Command, ParseError> {
        self.advance(); // UPDATE
        let table = self.expect_identifier()?;
        self.expect(TokenKind::Set)?;

        let mut assignments = Vec::new();
        loop {
            let column = self.expect_identifier()?;
            let index = if self.eat(TokenKind::LBracket) {
                let idx = self.parse_expr()?;
                self.expect(TokenKind::RBracket)?;
                Some(idx)
            } else {
                None
            };
            self.expect(TokenKind::Eq)?;
            let value = self.parse_expr()?;
            assignments.push(SetAssignment { column, index, value });
            if self.eat(TokenKind::Comma) {
                continue;
            }
            break;
        }

        let where_clause = if self.eat(TokenKind::Where) {
            Some(self.parse_expr()?)
        } else {
            None
        };

        Ok(Command::Update(UpdateCommand {
            table,
            assignments,
            where_clause,
        }))
    }

    // ---- DELETE ----

    fn parse_delete(&mut self) -> Result<Command, ParseError> {
        self.advance(); // DELETE
        self.expect(TokenKind::From)?;
        let table = self.expect_identifier()?;
        let where_clause = if self.eat(TokenKind::Where) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        Ok(Command::Delete(DeleteCommand { table, where_clause }))
    }

    // ---- ALTER / DROP ----

    fn parse_alter(&mut self) -> Result<Command, ParseError> {
        self.advance(); // ALTER
        self.expect(TokenKind::Table)?;
        let table = self.expect_identifier()?;

        let word = self.advance();
        match word.lexeme.to_ascii_uppercase().as_str() {
            "ADD" => {
                let column = self.parse_column_def()?;
                Ok(Command::Alter(AlterTableCommand {
                    table,
                    add_column: Some(column),
                    drop_column: None,
                }))
            }
            "DROP" => {
                let column = self.expect_identifier()?;
                Ok(Command::Alter(AlterTableCommand {
                    table,
                    add_column: None,
                    drop_column: Some(column),
                }))
            }
            _ => Err(ParseError::Unsupported {
                line: word.line,
                col: word.col,
                detail: word.lexeme.to_string(),
            }),
        }
    }

    fn parse_drop(&mut self) -> Result<Command, ParseError> {
        self.advance(); // DROP
        self.expect(TokenKind::Table)?;
        let table = self.expect_identifier()?;
        Ok(Command::Drop(DropTableCommand { table }))
    }

    // ---- Expressions (Pratt-style precedence climbing) ----
    // OR < AND < NOT < comparisons < additive < multiplicative < unary < primary

    fn parse_expr(&mut self) -> Result<ExprNode, ParseError> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<ExprNode, ParseError> {
        let mut left = self.parse_and()?;
        while self.eat(TokenKind::Or) {
            let right = self.parse_and()?;
            left = ExprNode::BinaryOp(BinaryOp::Or, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<ExprNode, ParseError> {
        let mut left = self.parse_not()?;
        while self.eat(TokenKind::And) {
            let right = self.parse_not()?;
            left = ExprNode::BinaryOp(BinaryOp::And, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<ExprNode, ParseError> {
        if self.eat(TokenKind::Not) {
            let inner = self.parse_not()?;
            return Ok(ExprNode::UnaryOp(UnaryOp::Not, Box::new(inner)));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<ExprNode, ParseError> {
        let left = self.parse_additive()?;

        match self.peek_kind() {
            TokenKind::Eq | TokenKind::Neq | TokenKind::Lt | TokenKind::Gt | TokenKind::Lte | TokenKind::Gte => {
                let op = match self.advance().kind {
                    TokenKind::Eq => BinaryOp::Eq,
                    TokenKind::Neq => BinaryOp::Neq,
                    TokenKind::Lt => BinaryOp::Lt,
                    TokenKind::Gt => BinaryOp::Gt,
                    TokenKind::Lte => BinaryOp::Lte,
                    _ => BinaryOp::Gte,
                };
                let right = self.parse_additive()?;
                Ok(ExprNode::BinaryOp(op, Box::new(left), Box::new(right)))
            }
            TokenKind::In => {
                self.advance();
                self.expect(TokenKind::LParen)?;
                let mut values = Vec::new();
                loop {
                    values.push(self.parse_expr()?);
                    if self.eat(TokenKind::Comma) {
                        continue;
                    }
                    break;
                }
                self.expect(TokenKind::RParen)?;
                Ok(ExprNode::In(Box::new(left), values))
            }
            TokenKind::Between => {
                self.advance();
                let lo = self.parse_additive()?;
                self.expect(TokenKind::And)?;
                let hi = self.parse_additive()?;
                Ok(ExprNode::Between(Box::new(left), Box::new(lo), Box::new(hi)))
            }
            TokenKind::Like => {
                self.advance();
                let pattern = self.parse_additive()?;
                Ok(ExprNode::Like(Box::new(left), Box::new(pattern)))
            }
            TokenKind::Is => {
                self.advance();
                let negate = self.eat(TokenKind::Not);
                self.expect(TokenKind::Null)?;
                Ok(ExprNode::IsNull(Box::new(left), negate))
            }
            _ => Ok(left),
        }
    }

    fn parse_additive(&mut self) -> Result<ExprNode, ParseError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                TokenKind::PipePipe => BinaryOp::Concat,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = ExprNode::BinaryOp(op, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<ExprNode, ParseError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Mod,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = ExprNode::BinaryOp(op, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<ExprNode, ParseError> {
        if self.eat(TokenKind::Minus) {
            let inner = self.parse_unary()?;
            return Ok(ExprNode::UnaryOp(UnaryOp::Neg, Box::new(inner)));
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<ExprNode, ParseError> {
        let mut expr = self.parse_primary()?;
        while self.eat(TokenKind::LBracket) {
            let index = self.parse_expr()?;
            self.expect(TokenKind::RBracket)?;
            expr = ExprNode::ArrayIndex(Box::new(expr), Box::new(index));
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<ExprNode, ParseError> {
        let tok = self.peek().clone();
        match tok.kind {
            TokenKind::LUint => {
                self.advance();
                Ok(ExprNode::Literal(Literal::Uint(tok.lexeme.parse().unwrap_or(0))))
            }
            TokenKind::LInt => {
                self.advance();
                Ok(ExprNode::Literal(Literal::Int(tok.lexeme.parse().unwrap_or(0))))
            }
            TokenKind::LFloat => {
                self.advance();
                Ok(ExprNode::Literal(Literal::Float(tok.lexeme.parse().unwrap_or(0.0))))
            }
            TokenKind::LDouble => {
                self.advance();
                Ok(ExprNode::Literal(Literal::Double(tok.lexeme.parse().unwrap_or(0.0))))
            }
            TokenKind::LString => {
                self.advance();
                Ok(ExprNode::Literal(Literal::Str(tok.lexeme.to_string())))
            }
            TokenKind::LBool => {
                self.advance();
                Ok(ExprNode::Literal(Literal::Bool(
                    tok.lexeme.eq_ignore_ascii_case("true"),
                )))
            }
            TokenKind::Null => {
                self.advance();
                Ok(ExprNode::Literal(Literal::Null))
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(inner)
            }
            TokenKind::LBrace => {
                self.advance();
                let mut items = Vec::new();
                if !self.check(TokenKind::RBrace) {
                    loop {
                        items.push(self.parse_expr()?);
                        if self.eat(TokenKind::Comma) {
                            continue;
                        }
                        break;
                    }
                }
                self.expect(TokenKind::RBrace)?;
                Ok(ExprNode::ArrayLiteral(items))
            }
            TokenKind::Cast => {
                self.advance();
                self.expect(TokenKind::LParen)?;
                let inner = self.parse_expr()?;
                self.expect(TokenKind::As)?;
                let type_kind = self.parse_type_kind()?;
                self.expect(TokenKind::RParen)?;
                Ok(ExprNode::Cast(Box::new(inner), type_kind.to_string().into()))
            }
            TokenKind::TokId => {
                self.advance();
                if self.eat(TokenKind::LParen) {
                    let mut args = Vec::new();
                    if !self.check(TokenKind::RParen) {
                        loop {
                            args.push(self.parse_expr()?);
                            if self.eat(TokenKind::Comma) {
                                continue;
                            }
                            break;
                        }
                    }
                    self.expect(TokenKind::RParen)?;
                    return Ok(ExprNode::FunctionCall(tok.lexeme, args));
                }
                if self.eat(TokenKind::Dot) {
                    let column = self.expect_identifier()?;
                    return Ok(ExprNode::QualifiedColumn(tok.lexeme, column));
                }
                Ok(ExprNode::Column(tok.lexeme))
            }
            _ => Err(ParseError::Unsupported {
                line: tok.line,
                col: tok.col,
                detail: tok.lexeme.to_string(),
            }),
        }
    }
}

/// Renders a literal/primary expression back to source text, for storing
/// `DEFAULT` expressions as text in `ColumnDefinition::default_value`.
fn render_expr(expr: &ExprNode) -> String {
    match expr {
        ExprNode::Literal(Literal::Null) => "NULL".to_string(),
        ExprNode::Literal(Literal::Int(v)) => v.to_string(),
        ExprNode::Literal(Literal::Uint(v)) => v.to_string(),
        ExprNode::Literal(Literal::Float(v)) => v.to_string(),
        ExprNode::Literal(Literal::Double(v)) => v.to_string(),
        ExprNode::Literal(Literal::Bool(v)) => v.to_string(),
        ExprNode::Literal(Literal::Str(v)) => v.clone(),
        ExprNode::UnaryOp(UnaryOp::Neg, inner) => format!("-{}", render_expr(inner)),
        ExprNode::FunctionCall(name, args) => {
            format!(
                "{name}({})",
                args.iter().map(render_expr).collect::<Vec<_>>().join(", ")
            )
        }
        other => format!("{other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse_str(input: &str) -> Command {
        let mut lexer = Lexer::new();
        lexer.set_buffer(input);
        let mut tokens = Vec::new();
        loop {
            let tok = lexer.next_token().unwrap();
            let eof = tok.kind == TokenKind::Eof;
            tokens.push(tok);
            if eof {
                break;
            }
        }
        parse(tokens).unwrap()
    }

    #[test]
    fn parses_create_table_with_constraints() {
        let cmd = parse_str(
            "CREATE TABLE users (id SERIAL PRIMKEY, age INT CHECK age>0, name VARCHAR(40) NOT NULL);",
        );
        let Command::Create(create) = cmd else { panic!("expected CREATE") };
        assert_eq!(create.table.as_str(), "users");
        assert_eq!(create.columns.len(), 3);
        assert!(create.columns[0].is_primary_key);
        assert!(create.columns[0].has_sequence);
        assert_eq!(create.columns[1].check_expr.as_deref(), Some("age>0"));
        assert_eq!(create.columns[2].type_varchar_len, Some(40));
    }

    #[test]
    fn parses_select_with_where_order_limit() {
        let cmd = parse_str(
            "SELECT * FROM employees WHERE department IN (\"Engineering\", \"Marketing\") ORDER BY salary DESC LIM 3;",
        );
        let Command::Select(select) = cmd else { panic!("expected SELECT") };
        assert_eq!(select.table.as_str(), "employees");
        assert_eq!(select.order_by.len(), 1);
        assert_eq!(select.order_by[0].direction, SortDirection::Desc);
        assert_eq!(select.limit, Some(3));
    }

    #[test]
    fn parses_insert_with_array_literal() {
        let cmd = parse_str("INSERT INTO user_profiles (id, favorite_numbers) VALUES (0, {3,7,21});");
        let Command::Insert(insert) = cmd else { panic!("expected INSERT") };
        assert_eq!(insert.value_rows.len(), 1);
        assert!(matches!(insert.value_rows[0][1], ExprNode::ArrayLiteral(_)));
    }

    #[test]
    fn parses_update_with_array_index() {
        let cmd = parse_str("UPDATE user_profiles SET favorite_numbers[1] = 99 WHERE id = 0;");
        let Command::Update(update) = cmd else { panic!("expected UPDATE") };
        assert!(update.assignments[0].index.is_some());
    }

    #[test]
    fn parses_nested_boolean_expression() {
        let cmd = parse_str("SELECT * FROM users WHERE (age > 25 AND (is_active = true OR age = 27));");
        let Command::Select(select) = cmd else { panic!("expected SELECT") };
        assert!(select.where_clause.is_some());
    }
}
