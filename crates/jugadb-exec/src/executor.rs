//! Statement executor (spec.md §4.8). `Executor::process` accepts raw JQL
//! text and a `Database`, tokenizes and parses it fresh, and dispatches on
//! the resulting `Command`. It is a plain `&mut self` method — no token
//! stream is ever cached on `Database` — so CASCADE/SET NULL handling can
//! re-enter it with a synthesized query string (spec.md §5, §9 "Reentrancy
//! for referential actions").

use std::cmp::Ordering;
use std::collections::HashMap;

use jugadb_core::ast::{
    AlterTableCommand, Command, CreateTableCommand, DeleteCommand, DropTableCommand, ExprNode,
    InsertCommand, SelectCommand, UpdateCommand,
};
use jugadb_core::{parse, parse_expression, Lexer, Token, TokenKind};
use jugadb_storage::Database;
use jugadb_types::schema::{ReferentialAction, TableSchema};
use jugadb_types::{infer_and_cast_value, ColumnValue, Row, RowId};

use crate::error::{ExecError, ExecutionResult};
use crate::evaluator::{compare_values, evaluate_expression};
use crate::functions::{display_value, evaluate_aggregate, FunctionRegistry};

const AGGREGATE_NAMES: [&str; 5] = ["count", "sum", "avg", "min", "max"];

pub struct Executor {
    functions: FunctionRegistry,
}

impl Executor {
    pub fn new() -> Self {
        Self { functions: FunctionRegistry::new() }
    }

    /// Entry point (spec.md §4.8): never panics, always produces an
    /// `ExecutionResult` even on parse/semantic failure.
    pub fn process(&mut self, db: &mut Database, query: &str) -> ExecutionResult {
        match self.run(db, query) {
            Ok(result) => result,
            Err(err) => {
                log::debug!("executor: statement failed: {err}");
                ExecutionResult::err(err)
            }
        }
    }

    fn run(&mut self, db: &mut Database, query: &str) -> Result<ExecutionResult, ExecError> {
        let command = parse_command(query)?;
        match command {
            Command::Create(cmd) => self.exec_create(db, cmd),
            Command::Insert(cmd) => self.exec_insert(db, cmd),
            Command::Select(cmd) => self.exec_select(db, cmd),
            Command::Update(cmd) => self.exec_update(db, cmd),
            Command::Delete(cmd) => self.exec_delete(db, cmd),
            Command::Alter(cmd) => self.exec_alter(db, cmd),
            Command::Drop(cmd) => self.exec_drop(db, cmd),
            Command::Unknown => Ok(ExecutionResult::ok_empty()),
        }
    }

    fn exec_create(&mut self, db: &mut Database, cmd: CreateTableCommand) -> Result<ExecutionResult, ExecError> {
        if db.find_table_schema_tc(&cmd.table).is_some() {
            return Err(ExecError::TableExists(cmd.table.to_string()));
        }
        let mut columns = cmd.columns;
        for col in &mut columns {
            col.normalize();
            if col.has_default && matches!(col.type_kind, jugadb_types::schema::TypeKind::Blob) {
                return Err(ExecError::InvalidBlobDefault);
            }
        }
        let schema = TableSchema::new(cmd.table.clone(), columns);
        db.create_table(schema)?;
        log::debug!("executor: created table {}", cmd.table);
        Ok(ExecutionResult::ok_empty())
    }

    fn exec_insert(&mut self, db: &mut Database, cmd: InsertCommand) -> Result<ExecutionResult, ExecError> {
        let schema = db
            .find_table_schema_tc(&cmd.table)
            .cloned()
            .ok_or_else(|| ExecError::NoSuchTable(cmd.table.to_string()))?;
        let placeholder = Row::new(RowId::new(0, 0), vec![ColumnValue::Null; schema.columns.len()]);

        let mut inserted = Vec::with_capacity(cmd.value_rows.len());
        for value_row in &cmd.value_rows {
            let mut values = vec![ColumnValue::Null; schema.columns.len()];
            let mut provided = vec![false; schema.columns.len()];

            match &cmd.columns {
                Some(names) => {
                    for (name, expr) in names.iter().zip(value_row) {
                        let idx = schema
                            .column_index(name)
                            .ok_or_else(|| ExecError::NoSuchColumn(name.to_string(), cmd.table.to_string()))?;
                        values[idx] = evaluate_expression(expr, &placeholder, &schema, &self.functions)?;
                        provided[idx] = true;
                    }
                }
                None => {
                    for (idx, expr) in value_row.iter().enumerate() {
                        if idx >= schema.columns.len() {
                            break;
                        }
                        values[idx] = evaluate_expression(expr, &placeholder, &schema, &self.functions)?;
                        provided[idx] = true;
                    }
                }
            }

            for (idx, col) in schema.columns.iter().enumerate() {
                if provided[idx] {
                    continue;
                }
                values[idx] = if col.has_default {
                    self.eval_standalone(col.default_value.as_deref().unwrap_or(""), &schema)?
                } else {
                    ColumnValue::Null
                };
            }

            for (idx, col) in schema.columns.iter().enumerate() {
                if values[idx].is_null() {
                    if col.is_not_null && !col.has_sequence {
                        return Err(ExecError::NotNullViolation(col.name.to_string()));
                    }
                    continue;
                }
                if col.type_kind == jugadb_types::schema::TypeKind::Varchar {
                    if let Some(max_len) = col.type_varchar_len {
                        let rendered = display_value(&values[idx]);
                        if rendered.chars().count() > max_len as usize {
                            return Err(ExecError::VarcharOverflow(col.name.to_string(), max_len));
                        }
                    }
                }
                if !infer_and_cast_value(&mut values[idx], col) {
                    return Err(ExecError::TypeCastFailed(col.name.to_string()));
                }
            }

            self.enforce_row_constraints(db, &cmd.table, &schema, &values, None)?;
            let row = db.insert_row(&cmd.table, values)?;
            log::debug!("executor: inserted row into {}", cmd.table);
            inserted.push(row);
        }
        Ok(ExecutionResult::ok(inserted, false))
    }

    fn exec_select(&mut self, db: &mut Database, cmd: SelectCommand) -> Result<ExecutionResult, ExecError> {
        let schema = db
            .find_table_schema_tc(&cmd.table)
            .cloned()
            .ok_or_else(|| ExecError::NoSuchTable(cmd.table.to_string()))?;
        let mut rows = db.scan_table(&cmd.table)?;

        if let Some(pred) = &cmd.where_clause {
            let mut filtered = Vec::with_capacity(rows.len());
            for row in rows {
                if evaluate_expression(pred, &row, &schema, &self.functions)?.as_bool().unwrap_or(false) {
                    filtered.push(row);
                }
            }
            rows = filtered;
        }

        let has_aggregates = cmd.projections.iter().any(is_aggregate_expr) || cmd.having.as_ref().is_some_and(is_aggregate_expr);

        if cmd.group_by.is_empty() && !has_aggregates {
            quicksort_rows(&mut rows, &cmd.order_by, &schema, &self.functions)?;
            rows = apply_offset_limit(rows, cmd.offset, cmd.limit);

            if cmd.projections.is_empty() {
                return Ok(ExecutionResult::ok(rows, false));
            }
            let mut projected = Vec::with_capacity(rows.len());
            for row in &rows {
                let mut values = Vec::with_capacity(cmd.projections.len());
                for expr in &cmd.projections {
                    values.push(evaluate_expression(expr, row, &schema, &self.functions)?);
                }
                projected.push(Row::new(row.id, values));
            }
            return Ok(ExecutionResult::ok(projected, true));
        }

        // GROUP BY / aggregate path (spec.md §4.7 evaluate_aggregate):
        // collapse the filtered row set into groups, apply HAVING, then
        // project each group down to a single output row.
        let mut groups: Vec<(Vec<ColumnValue>, Vec<Row>)> = Vec::new();
        if cmd.group_by.is_empty() {
            groups.push((Vec::new(), rows));
        } else {
            let mut index: HashMap<String, usize> = HashMap::new();
            for row in rows {
                let mut key = Vec::with_capacity(cmd.group_by.len());
                for expr in &cmd.group_by {
                    key.push(evaluate_expression(expr, &row, &schema, &self.functions)?);
                }
                let key_repr = format!("{key:?}");
                match index.get(&key_repr) {
                    Some(&slot) => groups[slot].1.push(row),
                    None => {
                        index.insert(key_repr, groups.len());
                        groups.push((key, vec![row]));
                    }
                }
            }
        }

        let mut output = Vec::with_capacity(groups.len());
        for (_, group_rows) in groups {
            if let Some(having) = &cmd.having {
                let keep = self.evaluate_group_projection(having, &group_rows, &schema)?.as_bool().unwrap_or(false);
                if !keep {
                    continue;
                }
            }
            let projections = if cmd.projections.is_empty() { all_columns_exprs(&schema) } else { cmd.projections.clone() };
            let mut values = Vec::with_capacity(projections.len());
            for expr in &projections {
                values.push(self.evaluate_group_projection(expr, &group_rows, &schema)?);
            }
            let id = group_rows.first().map(|r| r.id).unwrap_or(RowId::new(0, 0));
            output.push(Row::new(id, values));
        }
        Ok(ExecutionResult::ok(output, true))
    }

    /// Evaluates `expr` against one group of rows: a top-level aggregate
    /// call (`COUNT`/`SUM`/`AVG`/`MIN`/`MAX`) folds over the group; anything
    /// else is evaluated against the group's first row.
    fn evaluate_group_projection(&self, expr: &ExprNode, group_rows: &[Row], schema: &TableSchema) -> Result<ColumnValue, ExecError> {
        if let ExprNode::FunctionCall(name, args) = expr {
            if is_aggregate_name(name) {
                let values = if args.is_empty() {
                    group_rows.iter().map(|_| ColumnValue::Int(1)).collect::<Vec<_>>()
                } else {
                    group_rows
                        .iter()
                        .map(|row| evaluate_expression(&args[0], row, schema, &self.functions))
                        .collect::<Result<Vec<_>, _>>()?
                };
                return Ok(evaluate_aggregate(name, &values)?);
            }
        }
        let representative = group_rows.first().cloned().unwrap_or_else(|| Row::new(RowId::new(0, 0), vec![ColumnValue::Null; schema.columns.len()]));
        evaluate_expression(expr, &representative, schema, &self.functions)
    }

    fn exec_update(&mut self, db: &mut Database, cmd: UpdateCommand) -> Result<ExecutionResult, ExecError> {
        let schema = db
            .find_table_schema_tc(&cmd.table)
            .cloned()
            .ok_or_else(|| ExecError::NoSuchTable(cmd.table.to_string()))?;
        let rows = db.scan_table(&cmd.table)?;
        let pk_idx = schema.primary_key_index();

        let mut updated = 0usize;
        for row in rows {
            let matches = match &cmd.where_clause {
                Some(pred) => evaluate_expression(pred, &row, &schema, &self.functions)?.as_bool().unwrap_or(false),
                None => true,
            };
            if !matches {
                continue;
            }

            let old_pk = pk_idx.map(|i| row.values[i].clone());
            let mut new_values = row.values.clone();
            for assignment in &cmd.assignments {
                let col_idx = schema
                    .column_index(&assignment.column)
                    .ok_or_else(|| ExecError::NoSuchColumn(assignment.column.to_string(), cmd.table.to_string()))?;
                let new_val = evaluate_expression(&assignment.value, &row, &schema, &self.functions)?;

                match &assignment.index {
                    Some(index_expr) => {
                        let index_val = evaluate_expression(index_expr, &row, &schema, &self.functions)?;
                        let idx_i64 = match &index_val {
                            ColumnValue::Int(i) => *i,
                            ColumnValue::Uint(u) => *u as i64,
                            other => return Err(ExecError::NotAnArray(format!("{other:?}"))),
                        };
                        let len = match &new_values[col_idx] {
                            ColumnValue::Array(items) => items.len(),
                            other => return Err(ExecError::NotAnArray(format!("{other:?}"))),
                        };
                        if !new_values[col_idx].array_set(idx_i64, new_val) {
                            return Err(ExecError::ArrayIndexOutOfRange(idx_i64, len));
                        }
                    }
                    None => {
                        let col_def = &schema.columns[col_idx];
                        let mut new_val = new_val;
                        if !infer_and_cast_value(&mut new_val, col_def) {
                            return Err(ExecError::TypeCastFailed(assignment.column.to_string()));
                        }
                        new_values[col_idx] = new_val;
                    }
                }
            }

            self.enforce_row_constraints(db, &cmd.table, &schema, &new_values, Some(row.id))?;
            let updated_row = db.update_row(&cmd.table, row.id, old_pk.as_ref(), new_values)?;

            if let Some(idx) = pk_idx {
                if old_pk.as_ref() != Some(&updated_row.values[idx]) {
                    let col_name = schema.columns[idx].name.clone();
                    self.handle_on_update_constraints(db, &cmd.table, &col_name, old_pk.as_ref().unwrap(), &updated_row.values[idx])?;
                }
            }
            updated += 1;
        }
        log::debug!("executor: updated {updated} row(s) in {}", cmd.table);
        Ok(ExecutionResult {
            code: 0,
            message: format!("{updated} row(s) updated"),
            rows: Vec::new(),
            row_count: updated,
            owns_rows: false,
        })
    }

    fn exec_delete(&mut self, db: &mut Database, cmd: DeleteCommand) -> Result<ExecutionResult, ExecError> {
        let schema = db
            .find_table_schema_tc(&cmd.table)
            .cloned()
            .ok_or_else(|| ExecError::NoSuchTable(cmd.table.to_string()))?;
        let rows = db.scan_table(&cmd.table)?;
        let pk_idx = schema.primary_key_index();

        let mut deleted = 0usize;
        for row in rows {
            let matches = match &cmd.where_clause {
                Some(pred) => evaluate_expression(pred, &row, &schema, &self.functions)?.as_bool().unwrap_or(false),
                None => true,
            };
            if !matches {
                continue;
            }

            self.handle_on_delete_constraints(db, &cmd.table, &schema, &row)?;
            let pk_value = pk_idx.map(|i| row.values[i].clone());
            db.delete_row(&cmd.table, row.id, pk_value.as_ref())?;
            deleted += 1;
        }
        log::debug!("executor: deleted {deleted} row(s) from {}", cmd.table);
        Ok(ExecutionResult {
            code: 0,
            message: format!("{deleted} row(s) deleted"),
            rows: Vec::new(),
            row_count: deleted,
            owns_rows: false,
        })
    }

    fn exec_alter(&mut self, db: &mut Database, cmd: AlterTableCommand) -> Result<ExecutionResult, ExecError> {
        if let Some(mut col) = cmd.add_column {
            col.normalize();
            db.alter_table_add_column(&cmd.table, col)?;
        }
        if let Some(column) = cmd.drop_column {
            db.alter_table_drop_column(&cmd.table, &column)?;
        }
        Ok(ExecutionResult::ok_empty())
    }

    fn exec_drop(&mut self, db: &mut Database, cmd: DropTableCommand) -> Result<ExecutionResult, ExecError> {
        db.drop_table(&cmd.table)?;
        Ok(ExecutionResult::ok_empty())
    }

    /// Parses and evaluates a standalone expression (DEFAULT values, CHECK
    /// constraints) against an all-NULL placeholder row.
    fn eval_standalone(&self, text: &str, schema: &TableSchema) -> Result<ColumnValue, ExecError> {
        let expr = parse_check_expr(text)?;
        let placeholder = Row::new(RowId::new(0, 0), vec![ColumnValue::Null; schema.columns.len()]);
        evaluate_expression(&expr, &placeholder, schema, &self.functions)
    }

    /// NOT NULL / UNIQUE / CHECK / FOREIGN KEY enforcement shared by INSERT
    /// and UPDATE (spec.md §4.8 INSERT, §8 invariants). `skip_row` excludes
    /// the row being updated from its own UNIQUE scan.
    fn enforce_row_constraints(
        &self,
        db: &mut Database,
        table: &str,
        schema: &TableSchema,
        values: &[ColumnValue],
        skip_row: Option<RowId>,
    ) -> Result<(), ExecError> {
        for (idx, col) in schema.columns.iter().enumerate() {
            let value = &values[idx];
            if value.is_null() {
                if col.is_not_null && !col.has_sequence {
                    return Err(ExecError::NotNullViolation(col.name.to_string()));
                }
                continue;
            }

            if col.is_unique || col.is_primary_key {
                if value_exists_elsewhere(db, table, idx, value, skip_row)? {
                    return Err(ExecError::UniqueViolation(col.name.to_string()));
                }
            }

            if col.has_check {
                if let Some(expr_text) = &col.check_expr {
                    let expr = parse_check_expr(expr_text)?;
                    let row = Row::new(skip_row.unwrap_or(RowId::new(0, 0)), values.to_vec());
                    let ok = evaluate_expression(&expr, &row, schema, &self.functions)?.as_bool().unwrap_or(false);
                    if !ok {
                        return Err(ExecError::CheckViolation(col.name.to_string(), expr_text.clone()));
                    }
                }
            }

            if col.is_foreign_key {
                if let (Some(ftable), Some(fcol)) = (&col.foreign_table, &col.foreign_column) {
                    if !foreign_row_exists(db, ftable, fcol, value)? {
                        return Err(ExecError::ForeignKeyViolation(col.name.to_string(), ftable.to_string(), fcol.to_string()));
                    }
                }
            }
        }
        Ok(())
    }

    /// spec.md §4.8 DELETE: runs each referencing table's ON DELETE action
    /// before the row is physically removed.
    fn handle_on_delete_constraints(&mut self, db: &mut Database, table: &str, schema: &TableSchema, row: &Row) -> Result<(), ExecError> {
        for link in find_referencing_columns(db, table) {
            let ref_idx = schema
                .column_index(&link.ref_col)
                .ok_or_else(|| ExecError::NoSuchColumn(link.ref_col.clone(), table.to_string()))?;
            let value = &row.values[ref_idx];
            if value.is_null() {
                continue;
            }
            match link.on_delete {
                ReferentialAction::Cascade => {
                    let query = format!("DELETE FROM {} WHERE {} = {};", link.child_table, link.fk_col, sql_literal(value));
                    self.run(db, &query)?;
                }
                ReferentialAction::SetNull => {
                    let query = format!("UPDATE {} SET {} = NULL WHERE {} = {};", link.child_table, link.fk_col, link.fk_col, sql_literal(value));
                    self.run(db, &query)?;
                }
                ReferentialAction::Restrict => {
                    return Err(ExecError::RestrictBlocked(format!("{}.{}", link.child_table, link.fk_col)));
                }
            }
        }
        Ok(())
    }

    /// spec.md §9 "`handle_on_update_constraints` has no body in source":
    /// CASCADE re-issues an UPDATE against the referencing table, SET NULL
    /// nulls the referencing column, RESTRICT aborts.
    fn handle_on_update_constraints(
        &mut self,
        db: &mut Database,
        table: &str,
        ref_col: &str,
        old_value: &ColumnValue,
        new_value: &ColumnValue,
    ) -> Result<(), ExecError> {
        for link in find_referencing_columns(db, table) {
            if link.ref_col != ref_col {
                continue;
            }
            match link.on_update {
                ReferentialAction::Cascade => {
                    let query = format!(
                        "UPDATE {} SET {} = {} WHERE {} = {};",
                        link.child_table,
                        link.fk_col,
                        sql_literal(new_value),
                        link.fk_col,
                        sql_literal(old_value)
                    );
                    self.run(db, &query)?;
                }
                ReferentialAction::SetNull => {
                    let query = format!("UPDATE {} SET {} = NULL WHERE {} = {};", link.child_table, link.fk_col, link.fk_col, sql_literal(old_value));
                    self.run(db, &query)?;
                }
                ReferentialAction::Restrict => {
                    return Err(ExecError::RestrictBlocked(format!("{}.{}", link.child_table, link.fk_col)));
                }
            }
        }
        Ok(())
    }
}

impl Default for Executor {
    fn default() -> Self {
        Self::new()
    }
}

struct ReferencingColumn {
    child_table: String,
    fk_col: String,
    ref_col: String,
    on_delete: ReferentialAction,
    on_update: ReferentialAction,
}

fn find_referencing_columns(db: &Database, table: &str) -> Vec<ReferencingColumn> {
    let mut links = Vec::new();
    for name in db.table_names() {
        let Some(schema) = db.find_table_schema_tc(name) else { continue };
        for col in &schema.columns {
            if col.is_foreign_key && col.foreign_table.as_deref() == Some(table) {
                links.push(ReferencingColumn {
                    child_table: name.to_string(),
                    fk_col: col.name.to_string(),
                    ref_col: col.foreign_column.as_ref().map(|s| s.to_string()).unwrap_or_default(),
                    on_delete: col.on_delete,
                    on_update: col.on_update,
                });
            }
        }
    }
    links
}

fn value_exists_elsewhere(db: &mut Database, table: &str, col_idx: usize, value: &ColumnValue, skip_row: Option<RowId>) -> Result<bool, ExecError> {
    let rows = db.scan_table(table)?;
    Ok(rows
        .iter()
        .any(|r| Some(r.id) != skip_row && compare_values(&r.values[col_idx], value) == Some(Ordering::Equal)))
}

fn foreign_row_exists(db: &mut Database, table: &str, column: &str, value: &ColumnValue) -> Result<bool, ExecError> {
    let schema = db.find_table_schema_tc(table).cloned().ok_or_else(|| ExecError::NoSuchTable(table.to_string()))?;
    let idx = schema.column_index(column).ok_or_else(|| ExecError::NoSuchColumn(column.to_string(), table.to_string()))?;
    let rows = db.scan_table(table)?;
    Ok(rows.iter().any(|r| compare_values(&r.values[idx], value) == Some(Ordering::Equal)))
}

fn is_aggregate_name(name: &str) -> bool {
    AGGREGATE_NAMES.contains(&name.to_ascii_lowercase().as_str())
}

fn is_aggregate_expr(expr: &ExprNode) -> bool {
    matches!(expr, ExprNode::FunctionCall(name, _) if is_aggregate_name(name))
}

fn all_columns_exprs(schema: &TableSchema) -> Vec<ExprNode> {
    schema.columns.iter().map(|c| ExprNode::Column(c.name.clone())).collect()
}

fn apply_offset_limit(rows: Vec<Row>, offset: Option<u64>, limit: Option<u64>) -> Vec<Row> {
    let skip = offset.unwrap_or(0) as usize;
    let rows: Vec<Row> = rows.into_iter().skip(skip).collect();
    match limit {
        Some(n) => rows.into_iter().take(n as usize).collect(),
        None => rows,
    }
}

/// spec.md §4.8 SELECT: sorts via quicksort rather than a library sort, to
/// match the `compare_rows`/`key_compare` algorithm the spec names.
fn quicksort_rows(
    rows: &mut [Row],
    order_by: &[jugadb_core::ast::OrderByKey],
    schema: &TableSchema,
    functions: &FunctionRegistry,
) -> Result<(), ExecError> {
    if order_by.is_empty() {
        return Ok(());
    }
    let mut keys = Vec::with_capacity(rows.len());
    for row in rows.iter() {
        let mut row_keys = Vec::with_capacity(order_by.len());
        for key in order_by {
            row_keys.push(evaluate_expression(&key.expr, row, schema, functions)?);
        }
        keys.push(row_keys);
    }
    let mut indices: Vec<usize> = (0..rows.len()).collect();
    quicksort_indices(&mut indices, 0, indices.len(), &keys, order_by);

    let mut reordered: Vec<Option<Row>> = rows.iter_mut().map(|r| Some(std::mem::replace(r, Row::new(RowId::new(0, 0), Vec::new())))).collect();
    for (dst, &src) in rows.iter_mut().zip(indices.iter()) {
        *dst = reordered[src].take().expect("index used exactly once");
    }
    Ok(())
}

fn quicksort_indices(indices: &mut [usize], lo: usize, hi: usize, keys: &[Vec<ColumnValue>], order_by: &[jugadb_core::ast::OrderByKey]) {
    if hi - lo < 2 {
        return;
    }
    let pivot = keys[indices[lo + (hi - lo) / 2]].clone();
    let mut i = lo;
    let mut j = hi - 1;
    loop {
        while i <= j && row_key_order(&keys[indices[i]], &pivot, order_by) == Ordering::Less {
            i += 1;
        }
        while j > lo && row_key_order(&keys[indices[j]], &pivot, order_by) == Ordering::Greater {
            j -= 1;
        }
        if i >= j {
            break;
        }
        indices.swap(i, j);
        i += 1;
        if j == 0 {
            break;
        }
        j -= 1;
    }
    quicksort_indices(indices, lo, i.max(lo + 1), keys, order_by);
    quicksort_indices(indices, i.max(lo + 1), hi, keys, order_by);
}

fn row_key_order(a: &[ColumnValue], b: &[ColumnValue], order_by: &[jugadb_core::ast::OrderByKey]) -> Ordering {
    for (i, key) in order_by.iter().enumerate() {
        let ord = compare_values(&a[i], &b[i]).unwrap_or(Ordering::Equal);
        let ord = match key.direction {
            jugadb_core::ast::SortDirection::Asc => ord,
            jugadb_core::ast::SortDirection::Desc if a[i].is_null() || b[i].is_null() => ord,
            jugadb_core::ast::SortDirection::Desc => ord.reverse(),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

/// Renders a value back into JQL literal syntax for a re-entrant CASCADE /
/// SET NULL query (spec.md §6 "doubling-quote escape").
fn sql_literal(value: &ColumnValue) -> String {
    match value {
        ColumnValue::Null => "NULL".to_string(),
        ColumnValue::Int(_) | ColumnValue::Uint(_) | ColumnValue::Float(_) | ColumnValue::Double(_) | ColumnValue::Bool(_) => display_value(value),
        other => format!("'{}'", display_value(other).replace('\'', "''")),
    }
}

fn tokenize(text: &str) -> Result<Vec<Token>, jugadb_core::LexError> {
    let mut lexer = Lexer::new();
    lexer.set_buffer(text);
    let mut tokens = Vec::new();
    loop {
        let tok = lexer.next_token()?;
        let is_eof = tok.kind == TokenKind::Eof;
        tokens.push(tok);
        if is_eof {
            break;
        }
    }
    Ok(tokens)
}

fn parse_command(text: &str) -> Result<Command, ExecError> {
    Ok(parse(tokenize(text)?)?)
}

fn parse_check_expr(text: &str) -> Result<ExprNode, ExecError> {
    Ok(parse_expression(tokenize(text)?)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(dir.path()).unwrap();
        (dir, db)
    }

    #[test]
    fn create_insert_and_select_round_trip() {
        let (_dir, mut database) = db();
        let mut exec = Executor::new();
        let create = exec.process(&mut database, "CREATE TABLE users (id SERIAL PRIMKEY, name VARCHAR(40) NOT NULL, age INT);");
        assert_eq!(create.code, 0, "{}", create.message);

        let insert = exec.process(&mut database, "INSERT INTO users (name, age) VALUES ('ada', 36);");
        assert_eq!(insert.code, 0, "{}", insert.message);
        assert_eq!(insert.row_count, 1);

        let select = exec.process(&mut database, "SELECT * FROM users WHERE age > 30;");
        assert_eq!(select.code, 0, "{}", select.message);
        assert_eq!(select.row_count, 1);
    }

    #[test]
    fn not_null_violation_is_reported() {
        let (_dir, mut database) = db();
        let mut exec = Executor::new();
        exec.process(&mut database, "CREATE TABLE t (id SERIAL PRIMKEY, name VARCHAR(10) NOT NULL);");
        let result = exec.process(&mut database, "INSERT INTO t (id) VALUES (1);");
        assert_ne!(result.code, 0);
    }

    #[test]
    fn update_and_delete_affect_matching_rows_only() {
        let (_dir, mut database) = db();
        let mut exec = Executor::new();
        exec.process(&mut database, "CREATE TABLE t (id SERIAL PRIMKEY, n INT);");
        exec.process(&mut database, "INSERT INTO t (n) VALUES (1);");
        exec.process(&mut database, "INSERT INTO t (n) VALUES (2);");

        let update = exec.process(&mut database, "UPDATE t SET n = 99 WHERE n = 1;");
        assert_eq!(update.row_count, 1);

        let select = exec.process(&mut database, "SELECT * FROM t WHERE n = 99;");
        assert_eq!(select.row_count, 1);

        let delete = exec.process(&mut database, "DELETE FROM t WHERE n = 2;");
        assert_eq!(delete.row_count, 1);

        let remaining = exec.process(&mut database, "SELECT * FROM t;");
        assert_eq!(remaining.row_count, 1);
    }
}
