use smol_str::SmolStr;
use strum_macros::{Display, EnumString};

/// The 21 type keywords recognized by JQL column definitions (spec.md §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum TypeKind {
    Int,
    Uint,
    Varchar,
    Char,
    Text,
    Bool,
    Float,
    Double,
    Decimal,
    Date,
    Time,
    Timetz,
    Datetime,
    Datetimetz,
    Timestamp,
    Timestamptz,
    Interval,
    Blob,
    Json,
    Uuid,
    Serial,
}

impl TypeKind {
    /// Whether this type's on-disk representation is a fixed number of
    /// bytes independent of the stored value (spec.md §4.3 `size_from_type`).
    pub fn is_fixed_width(self) -> bool {
        !matches!(
            self,
            TypeKind::Varchar | TypeKind::Char | TypeKind::Text | TypeKind::Blob | TypeKind::Json
        )
    }
}

/// `ON DELETE` / `ON UPDATE` referential action (spec.md GLOSSARY).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReferentialAction {
    #[default]
    Restrict,
    Cascade,
    SetNull,
}

/// One column's full constraint set, persisted verbatim in the catalog
/// (DESIGN.md Open Question 2 — the teacher's source drops this on disk
/// reload; jugadb keeps all of it so FK/CHECK/UNIQUE survive a restart).
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    pub name: SmolStr,
    pub type_kind: TypeKind,
    pub type_varchar_len: Option<u16>,
    pub decimal_precision: Option<u8>,
    pub decimal_scale: Option<u8>,
    pub is_array: bool,
    pub is_primary_key: bool,
    pub is_unique: bool,
    pub is_not_null: bool,
    pub is_index: bool,
    pub has_sequence: bool,
    pub has_default: bool,
    pub default_value: Option<String>,
    pub has_check: bool,
    pub check_expr: Option<String>,
    pub is_foreign_key: bool,
    pub foreign_table: Option<SmolStr>,
    pub foreign_column: Option<SmolStr>,
    pub on_delete: ReferentialAction,
    pub on_update: ReferentialAction,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<SmolStr>, type_kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            type_kind,
            type_varchar_len: None,
            decimal_precision: None,
            decimal_scale: None,
            is_array: false,
            is_primary_key: false,
            is_unique: false,
            is_not_null: false,
            is_index: false,
            has_sequence: false,
            has_default: false,
            default_value: None,
            has_check: false,
            check_expr: None,
            is_foreign_key: false,
            foreign_table: None,
            foreign_column: None,
            on_delete: ReferentialAction::Restrict,
            on_update: ReferentialAction::Restrict,
        }
    }

    /// Enforces spec.md §3 invariants: PRIMARY KEY implies UNIQUE ∧ NOT
    /// NULL; SERIAL implies `has_sequence`; FOREIGN KEY requires both ends.
    pub fn normalize(&mut self) {
        if self.is_primary_key {
            self.is_unique = true;
            self.is_not_null = true;
        }
        if self.type_kind == TypeKind::Serial {
            self.has_sequence = true;
        }
    }

    pub fn is_foreign_key_complete(&self) -> bool {
        !self.is_foreign_key
            || (self.foreign_table.is_some() && self.foreign_column.is_some())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableSchema {
    pub table_name: SmolStr,
    pub columns: Vec<ColumnDefinition>,
}

impl TableSchema {
    pub fn new(table_name: impl Into<SmolStr>, columns: Vec<ColumnDefinition>) -> Self {
        Self {
            table_name: table_name.into(),
            columns,
        }
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn primary_key_index(&self) -> Option<usize> {
        self.columns.iter().position(|c| c.is_primary_key)
    }
}
