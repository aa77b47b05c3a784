//! Catalog / database file (spec.md §4.6, §6 on-disk layout): a directory of
//! `(name, offset)` table entries, magic `"JUGA"`, and the live table count
//! at `TABLE_COUNT_OFFSET`. Each table owns its schema, primary-key B-tree,
//! SERIAL sequence, TOAST store, and row heap file.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use jugadb_btree::{load_btree, save_btree, BTree, BTreeIoError};
use jugadb_types::schema::{ColumnDefinition, ReferentialAction, TableSchema, TypeKind};
use jugadb_types::{ColumnValue, Row, RowId};

use crate::codec::{decode_row, encode_row, CodecError};
use crate::sequence::Sequence;
use crate::toast::{ToastError, ToastStore};

pub const MAGIC: u32 = 0x4A55_4741;
pub const TABLE_COUNT_OFFSET: u64 = 4;
const HEADER_SIZE: u64 = 8;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("not a jugadb database file: bad magic")]
    BadMagic,
    #[error("table {0:?} already exists")]
    TableExists(String),
    #[error("table {0:?} does not exist")]
    NoSuchTable(String),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Toast(#[from] ToastError),
    #[error(transparent)]
    BTree(#[from] BTreeIoError),
}

/// One table's live, in-memory state plus the files backing it.
pub struct TableEntry {
    pub schema: TableSchema,
    pub offset: u64,
    pub heap: File,
    pub toast: ToastStore,
    pub primary_key: Option<BTree>,
    pub sequence: Option<Sequence>,
    next_row_id: u32,
}

impl TableEntry {
    fn pk_column_index(&self) -> Option<usize> {
        self.schema.columns.iter().position(|c| c.is_primary_key)
    }
}

/// Owns every file handle for one database: the catalog file plus one heap,
/// one TOAST store, and (for tables with a primary key) one B-tree file per
/// table. Dropped handles are flushed by `std::fs::File`'s own `Drop`.
pub struct Database {
    dir: PathBuf,
    catalog: File,
    tables: HashMap<String, TableEntry>,
    order: Vec<String>,
}

impl Database {
    /// Opens `dir/catalog.jdb`, creating it (and the directory) if absent.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        let catalog_path = dir.join("catalog.jdb");
        let is_new = !catalog_path.exists();

        let mut catalog = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(&catalog_path)?;

        if is_new {
            catalog.write_all(&MAGIC.to_le_bytes())?;
            catalog.write_all(&0u32.to_le_bytes())?;
            catalog.flush()?;
        } else {
            let mut magic_buf = [0u8; 4];
            catalog.read_exact(&mut magic_buf)?;
            if u32::from_le_bytes(magic_buf) != MAGIC {
                return Err(CatalogError::BadMagic);
            }
        }

        let mut db = Database {
            dir,
            catalog,
            tables: HashMap::new(),
            order: Vec::new(),
        };
        if !is_new {
            db.load_tables()?;
        }
        Ok(db)
    }

    fn table_count(&mut self) -> Result<u32, CatalogError> {
        self.catalog.seek(SeekFrom::Start(TABLE_COUNT_OFFSET))?;
        let mut buf = [0u8; 4];
        self.catalog.read_exact(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    fn set_table_count(&mut self, count: u32) -> Result<(), CatalogError> {
        self.catalog.seek(SeekFrom::Start(TABLE_COUNT_OFFSET))?;
        self.catalog.write_all(&count.to_le_bytes())?;
        self.catalog.flush()?;
        Ok(())
    }

    fn load_tables(&mut self) -> Result<(), CatalogError> {
        let count = self.table_count()?;
        self.catalog.seek(SeekFrom::Start(HEADER_SIZE))?;
        for _ in 0..count {
            let offset = self.catalog.stream_position()?;
            let schema = read_table_entry(&mut self.catalog)?;
            self.open_table_files(schema, offset)?;
        }
        Ok(())
    }

    fn open_table_files(&mut self, schema: TableSchema, offset: u64) -> Result<(), CatalogError> {
        let name = schema.table_name.to_string();
        let heap_path = self.dir.join(format!("{name}.heap"));
        let toast_path = self.dir.join(format!("{name}.toast"));

        let heap = OpenOptions::new().create(true).read(true).append(true).open(&heap_path)?;
        let toast = ToastStore::open(&toast_path)?;

        let pk_col = schema.columns.iter().find(|c| c.is_primary_key).cloned();
        let primary_key = match &pk_col {
            Some(col) => Some(load_or_init_btree(&self.dir, &name, col.type_kind)?),
            None => None,
        };
        let sequence = schema
            .columns
            .iter()
            .any(|c| c.has_sequence)
            .then(Sequence::default);

        let next_row_id = (heap.metadata()?.len() / row_slot_size()) as u32;

        self.order.push(name.clone());
        self.tables.insert(
            name,
            TableEntry {
                schema,
                offset,
                heap,
                toast,
                primary_key,
                sequence,
                next_row_id,
            },
        );
        Ok(())
    }

    /// spec.md §4.6 `get_table_offset`: linear scan of the table directory.
    pub fn get_table_offset(&self, name: &str) -> Option<u64> {
        self.tables.get(name).map(|t| t.offset)
    }

    /// spec.md §4.6 `find_table_schema_tc`.
    pub fn find_table_schema_tc(&self, name: &str) -> Option<&TableSchema> {
        self.tables.get(name).map(|t| &t.schema)
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn table(&self, name: &str) -> Option<&TableEntry> {
        self.tables.get(name)
    }

    pub fn table_mut(&mut self, name: &str) -> Option<&mut TableEntry> {
        self.tables.get_mut(name)
    }

    /// spec.md §4.8 CREATE TABLE: reject duplicates, append the schema,
    /// bump `TABLE_COUNT_OFFSET`, initialize the PK B-tree and sequence.
    pub fn create_table(&mut self, schema: TableSchema) -> Result<(), CatalogError> {
        let name = schema.table_name.to_string();
        if self.tables.contains_key(&name) {
            return Err(CatalogError::TableExists(name));
        }

        let offset = self.catalog.seek(SeekFrom::End(0))?;
        write_table_entry(&mut self.catalog, &schema)?;
        self.catalog.flush()?;
        let count = self.table_count()? + 1;
        self.set_table_count(count)?;

        self.open_table_files(schema, offset)?;
        log::debug!("catalog: created table {name}, {count} tables total");
        Ok(())
    }

    /// Appends an encoded row to the table heap and, for tables with a
    /// primary key, inserts `(pk, row_id)` into the PK B-tree.
    pub fn insert_row(&mut self, table: &str, mut values: Vec<ColumnValue>) -> Result<Row, CatalogError> {
        let entry = self.tables.get_mut(table).ok_or_else(|| CatalogError::NoSuchTable(table.into()))?;
        let row_id = RowId::new(0, entry.next_row_id);
        entry.next_row_id += 1;

        if let Some(idx) = entry.pk_column_index() {
            if let Some(seq) = entry.sequence.as_mut() {
                if entry.schema.columns[idx].has_sequence && matches!(values[idx], ColumnValue::Null) {
                    values[idx] = ColumnValue::Int(seq.next_val() as i64);
                }
            }
        }

        let row = Row::new(row_id, values);
        let encoded = encode_row(&row, &entry.schema, &mut entry.toast)?;
        entry.heap.seek(SeekFrom::End(0))?;
        write_slot(&mut entry.heap, &encoded)?;

        if let Some(idx) = entry.pk_column_index() {
            if let Some(btree) = entry.primary_key.as_mut() {
                btree.insert(row.values[idx].clone(), row_id);
            }
        }
        Ok(row)
    }

    /// Scans every live row of `table` in heap order, decoding through TOAST.
    pub fn scan_table(&mut self, table: &str) -> Result<Vec<Row>, CatalogError> {
        let entry = self.tables.get_mut(table).ok_or_else(|| CatalogError::NoSuchTable(table.into()))?;
        entry.heap.seek(SeekFrom::Start(0))?;
        let mut rows = Vec::new();
        let mut row_id = 0u32;
        loop {
            match read_slot(&mut entry.heap)? {
                Some(bytes) => {
                    let tombstone = bytes.first() == Some(&0u8);
                    if !tombstone {
                        let row = decode_row(&bytes[1..], RowId::new(0, row_id), &entry.schema, &mut entry.toast)?;
                        rows.push(row);
                    }
                    row_id += 1;
                }
                None => break,
            }
        }
        Ok(rows)
    }

    /// Re-encodes `values` into the same fixed-width slot `row_id` already
    /// occupies (spec.md §4.8 UPDATE). Updates the PK B-tree entry when the
    /// primary-key column's value changed.
    pub fn update_row(
        &mut self,
        table: &str,
        row_id: RowId,
        old_pk: Option<&ColumnValue>,
        values: Vec<ColumnValue>,
    ) -> Result<Row, CatalogError> {
        let entry = self.tables.get_mut(table).ok_or_else(|| CatalogError::NoSuchTable(table.into()))?;
        let row = Row::new(row_id, values);
        let encoded = encode_row(&row, &entry.schema, &mut entry.toast)?;
        let slot_offset = row_id.row_id as u64 * row_slot_size();
        entry.heap.seek(SeekFrom::Start(slot_offset))?;
        write_slot_at(&mut entry.heap, &encoded)?;

        if let Some(idx) = entry.pk_column_index() {
            if let Some(btree) = entry.primary_key.as_mut() {
                if let Some(old_pk) = old_pk {
                    btree.delete(old_pk);
                }
                btree.insert(row.values[idx].clone(), row_id);
            }
        }
        Ok(row)
    }

    /// Marks the row at `row_id` as deleted (tombstone byte) without
    /// compacting the heap; spec.md §1 excludes vacuuming/compaction.
    pub fn delete_row(&mut self, table: &str, row_id: RowId, pk_value: Option<&ColumnValue>) -> Result<(), CatalogError> {
        let entry = self.tables.get_mut(table).ok_or_else(|| CatalogError::NoSuchTable(table.into()))?;
        let slot_offset = row_id.row_id as u64 * row_slot_size();
        entry.heap.seek(SeekFrom::Start(slot_offset))?;
        entry.heap.write_all(&[1u8])?;
        entry.heap.flush()?;
        if let (Some(btree), Some(key)) = (entry.primary_key.as_mut(), pk_value) {
            btree.delete(key);
        }
        Ok(())
    }

    /// spec.md §4.8 ALTER TABLE ADD COLUMN: appends the column to the
    /// schema, rewrites the catalog directory, and backfills every live row
    /// with `NULL` in the new slot.
    pub fn alter_table_add_column(&mut self, table: &str, column: ColumnDefinition) -> Result<(), CatalogError> {
        {
            let entry = self.tables.get_mut(table).ok_or_else(|| CatalogError::NoSuchTable(table.into()))?;
            entry.schema.columns.push(column);
        }
        self.rewrite_catalog()?;
        self.rewrite_table_rows(table, |values| values.push(ColumnValue::Null))?;
        log::debug!("catalog: added column to table {table}");
        Ok(())
    }

    /// spec.md §4.8 ALTER TABLE DROP COLUMN.
    pub fn alter_table_drop_column(&mut self, table: &str, column: &str) -> Result<(), CatalogError> {
        let idx = {
            let entry = self.tables.get_mut(table).ok_or_else(|| CatalogError::NoSuchTable(table.into()))?;
            let idx = entry
                .schema
                .columns
                .iter()
                .position(|c| c.name == column)
                .ok_or_else(|| CatalogError::NoSuchTable(format!("{table}.{column}")))?;
            entry.schema.columns.remove(idx);
            idx
        };
        self.rewrite_catalog()?;
        self.rewrite_table_rows(table, move |values| {
            values.remove(idx);
        })?;
        log::debug!("catalog: dropped column {column} from table {table}");
        Ok(())
    }

    /// Truncates the catalog file's table directory and rewrites every
    /// table's entry from its current in-memory schema, fixing up each
    /// `TableEntry::offset` in place. Needed because table entries are
    /// variable-width: adding or removing a column shifts every entry after
    /// it (spec.md §6 on-disk layout).
    fn rewrite_catalog(&mut self) -> Result<(), CatalogError> {
        self.catalog.set_len(HEADER_SIZE)?;
        self.catalog.seek(SeekFrom::Start(HEADER_SIZE))?;
        let names = self.order.clone();
        for name in &names {
            let offset = self.catalog.stream_position()?;
            let schema = self.tables.get(name).expect("table listed in order exists").schema.clone();
            write_table_entry(&mut self.catalog, &schema)?;
            self.tables.get_mut(name).expect("table listed in order exists").offset = offset;
        }
        self.catalog.flush()?;
        Ok(())
    }

    /// Rewrites `table`'s heap, applying `transform` to every live row's
    /// values and reassigning fresh row ids. The PK B-tree is rebuilt from
    /// scratch to match.
    fn rewrite_table_rows(&mut self, table: &str, mut transform: impl FnMut(&mut Vec<ColumnValue>)) -> Result<(), CatalogError> {
        let mut rows = self.scan_table(table)?;
        for row in &mut rows {
            transform(&mut row.values);
        }

        let entry = self.tables.get_mut(table).ok_or_else(|| CatalogError::NoSuchTable(table.into()))?;
        entry.heap.set_len(0)?;
        entry.heap.seek(SeekFrom::Start(0))?;
        entry.next_row_id = 0;
        if let Some(tree) = entry.primary_key.as_mut() {
            *tree = BTree::new(tree.id, tree.key_type);
        }
        let pk_idx = entry.pk_column_index();

        for mut row in rows {
            let row_id = RowId::new(0, entry.next_row_id);
            entry.next_row_id += 1;
            row.id = row_id;
            let encoded = encode_row(&row, &entry.schema, &mut entry.toast)?;
            entry.heap.seek(SeekFrom::End(0))?;
            write_slot(&mut entry.heap, &encoded)?;
            if let Some(idx) = pk_idx {
                if let Some(tree) = entry.primary_key.as_mut() {
                    tree.insert(row.values[idx].clone(), row_id);
                }
            }
        }
        Ok(())
    }

    /// spec.md §4.8 DROP TABLE: removes the schema, closes and deletes the
    /// table's on-disk files, then rewrites the catalog directory.
    pub fn drop_table(&mut self, table: &str) -> Result<(), CatalogError> {
        if !self.tables.contains_key(table) {
            return Err(CatalogError::NoSuchTable(table.into()));
        }
        self.tables.remove(table);
        self.order.retain(|n| n != table);
        self.rewrite_catalog()?;
        for ext in ["heap", "toast", "btree"] {
            let _ = std::fs::remove_file(self.dir.join(format!("{table}.{ext}")));
        }
        log::debug!("catalog: dropped table {table}");
        Ok(())
    }
}

fn load_or_init_btree(dir: &Path, table: &str, key_type: TypeKind) -> Result<BTree, CatalogError> {
    let path = dir.join(format!("{table}.btree"));
    if path.exists() {
        let mut file = File::open(&path)?;
        Ok(load_btree(&mut file)?)
    } else {
        Ok(BTree::new(0, key_type))
    }
}

/// Flushes every loaded table's B-tree to `<table>.btree` (spec.md §4.5
/// `BTREE_LIFETIME_THRESHOLD` eviction and §5 "flush on close").
pub fn checkpoint(db: &mut Database) -> Result<(), CatalogError> {
    for name in db.order.clone() {
        let entry = db.tables.get(&name).expect("table listed in order exists");
        if let Some(tree) = &entry.primary_key {
            let path = db.dir.join(format!("{name}.btree"));
            let mut file = OpenOptions::new().create(true).write(true).truncate(true).open(path)?;
            save_btree(&mut file, tree)?;
        }
    }
    Ok(())
}

impl Drop for Database {
    fn drop(&mut self) {
        let _ = checkpoint(self);
    }
}

// A fixed-size slot is wasteful for oversized rows but keeps row ids a
// direct byte offset, matching the teacher's fixed-width page slot style.
const ROW_SLOT_PAYLOAD: u64 = 1024;

fn row_slot_size() -> u64 {
    1 + ROW_SLOT_PAYLOAD
}

fn write_slot(heap: &mut File, encoded: &[u8]) -> Result<(), CatalogError> {
    write_slot_at(heap, encoded)
}

/// Writes one fixed-width slot at the file's current seek position, live.
fn write_slot_at(heap: &mut File, encoded: &[u8]) -> Result<(), CatalogError> {
    if encoded.len() as u64 > ROW_SLOT_PAYLOAD - 2 {
        return Err(CatalogError::Io(io::Error::new(
            io::ErrorKind::InvalidData,
            "encoded row exceeds the fixed slot payload",
        )));
    }
    let mut slot = vec![0u8; row_slot_size() as usize];
    slot[0] = 0; // live
    slot[1..3].copy_from_slice(&(encoded.len() as u16).to_le_bytes());
    slot[3..3 + encoded.len()].copy_from_slice(encoded);
    heap.write_all(&slot)?;
    heap.flush()?;
    Ok(())
}

fn read_slot(heap: &mut File) -> Result<Option<Vec<u8>>, CatalogError> {
    let mut tombstone = [0u8; 1];
    match heap.read_exact(&mut tombstone) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    }
    let mut len_buf = [0u8; 2];
    heap.read_exact(&mut len_buf)?;
    let len = u16::from_le_bytes(len_buf) as usize;
    let mut payload = vec![0u8; ROW_SLOT_PAYLOAD as usize - 2];
    heap.read_exact(&mut payload)?;
    let mut out = Vec::with_capacity(1 + len);
    out.push(tombstone[0]);
    out.extend_from_slice(&payload[..len]);
    Ok(Some(out))
}

fn write_table_entry(w: &mut impl Write, schema: &TableSchema) -> Result<(), CatalogError> {
    let name = schema.table_name.as_str();
    w.write_all(&[name.len() as u8])?;
    w.write_all(name.as_bytes())?;
    w.write_all(&[schema.columns.len() as u8])?;
    for col in &schema.columns {
        write_column_def(w, col)?;
    }
    Ok(())
}

fn write_column_def(w: &mut impl Write, col: &ColumnDefinition) -> Result<(), CatalogError> {
    w.write_all(&[col.name.len() as u8])?;
    w.write_all(col.name.as_bytes())?;
    w.write_all(&(col.type_kind as u8).to_le_bytes())?;

    let flags = (col.is_array as u8)
        | (col.is_primary_key as u8) << 1
        | (col.is_unique as u8) << 2
        | (col.is_not_null as u8) << 3
        | (col.is_index as u8) << 4
        | (col.has_sequence as u8) << 5
        | (col.has_default as u8) << 6
        | (col.is_foreign_key as u8) << 7;
    w.write_all(&[flags])?;

    w.write_all(&[col.type_varchar_len.unwrap_or(0) as u8])?;
    w.write_all(&[col.decimal_precision.unwrap_or(0), col.decimal_scale.unwrap_or(0)])?;

    write_opt_string(w, col.default_value.as_deref())?;
    write_opt_string(w, col.check_expr.as_deref())?;

    if col.is_foreign_key {
        write_opt_string(w, col.foreign_table.as_deref())?;
        write_opt_string(w, col.foreign_column.as_deref())?;
        w.write_all(&[referential_action_tag(col.on_delete), referential_action_tag(col.on_update)])?;
    }
    Ok(())
}

fn write_opt_string(w: &mut impl Write, s: Option<&str>) -> Result<(), CatalogError> {
    match s {
        Some(s) => {
            w.write_all(&[1u8])?;
            w.write_all(&(s.len() as u16).to_le_bytes())?;
            w.write_all(s.as_bytes())?;
        }
        None => w.write_all(&[0u8])?,
    }
    Ok(())
}

fn read_opt_string(r: &mut impl Read) -> Result<Option<String>, CatalogError> {
    let mut tag = [0u8; 1];
    r.read_exact(&mut tag)?;
    if tag[0] == 0 {
        return Ok(None);
    }
    let mut len_buf = [0u8; 2];
    r.read_exact(&mut len_buf)?;
    let len = u16::from_le_bytes(len_buf) as usize;
    let mut buf = vec![0u8; len];
    r.read_exact(&mut buf)?;
    Ok(Some(String::from_utf8(buf).unwrap_or_default()))
}

fn referential_action_tag(action: ReferentialAction) -> u8 {
    match action {
        ReferentialAction::Restrict => 0,
        ReferentialAction::Cascade => 1,
        ReferentialAction::SetNull => 2,
    }
}

fn referential_action_from_tag(tag: u8) -> ReferentialAction {
    match tag {
        1 => ReferentialAction::Cascade,
        2 => ReferentialAction::SetNull,
        _ => ReferentialAction::Restrict,
    }
}

fn read_table_entry(r: &mut impl Read) -> Result<TableSchema, CatalogError> {
    let mut len_buf = [0u8; 1];
    r.read_exact(&mut len_buf)?;
    let mut name_buf = vec![0u8; len_buf[0] as usize];
    r.read_exact(&mut name_buf)?;
    let name = String::from_utf8(name_buf).unwrap_or_default();

    let mut count_buf = [0u8; 1];
    r.read_exact(&mut count_buf)?;
    let mut columns = Vec::with_capacity(count_buf[0] as usize);
    for _ in 0..count_buf[0] {
        columns.push(read_column_def(r)?);
    }
    Ok(TableSchema::new(name, columns))
}

fn read_column_def(r: &mut impl Read) -> Result<ColumnDefinition, CatalogError> {
    let mut len_buf = [0u8; 1];
    r.read_exact(&mut len_buf)?;
    let mut name_buf = vec![0u8; len_buf[0] as usize];
    r.read_exact(&mut name_buf)?;
    let name = String::from_utf8(name_buf).unwrap_or_default();

    let mut kind_buf = [0u8; 1];
    r.read_exact(&mut kind_buf)?;
    let type_kind = type_kind_from_tag(kind_buf[0]);

    let mut flags_buf = [0u8; 1];
    r.read_exact(&mut flags_buf)?;
    let flags = flags_buf[0];

    let mut varchar_buf = [0u8; 1];
    r.read_exact(&mut varchar_buf)?;
    let mut decimal_buf = [0u8; 2];
    r.read_exact(&mut decimal_buf)?;

    let default_value = read_opt_string(r)?;
    let check_expr = read_opt_string(r)?;

    let is_foreign_key = flags & 0b1000_0000 != 0;
    let (foreign_table, foreign_column, on_delete, on_update) = if is_foreign_key {
        let table = read_opt_string(r)?.map(Into::into);
        let column = read_opt_string(r)?.map(Into::into);
        let mut action_buf = [0u8; 2];
        r.read_exact(&mut action_buf)?;
        (
            table,
            column,
            referential_action_from_tag(action_buf[0]),
            referential_action_from_tag(action_buf[1]),
        )
    } else {
        (None, None, ReferentialAction::default(), ReferentialAction::default())
    };

    let mut def = ColumnDefinition::new(name, type_kind);
    def.is_array = flags & 0b0000_0001 != 0;
    def.is_primary_key = flags & 0b0000_0010 != 0;
    def.is_unique = flags & 0b0000_0100 != 0;
    def.is_not_null = flags & 0b0000_1000 != 0;
    def.is_index = flags & 0b0001_0000 != 0;
    def.has_sequence = flags & 0b0010_0000 != 0;
    def.has_default = flags & 0b0100_0000 != 0;
    def.is_foreign_key = is_foreign_key;
    def.type_varchar_len = (varchar_buf[0] != 0).then_some(varchar_buf[0] as u16);
    def.decimal_precision = (decimal_buf[0] != 0).then_some(decimal_buf[0]);
    def.decimal_scale = (decimal_buf[1] != 0).then_some(decimal_buf[1]);
    def.default_value = default_value;
    def.has_check = check_expr.is_some();
    def.check_expr = check_expr;
    def.foreign_table = foreign_table;
    def.foreign_column = foreign_column;
    def.on_delete = on_delete;
    def.on_update = on_update;
    Ok(def)
}

fn type_kind_from_tag(tag: u8) -> TypeKind {
    const KINDS: [TypeKind; 20] = [
        TypeKind::Int,
        TypeKind::Uint,
        TypeKind::Varchar,
        TypeKind::Char,
        TypeKind::Text,
        TypeKind::Bool,
        TypeKind::Float,
        TypeKind::Double,
        TypeKind::Decimal,
        TypeKind::Date,
        TypeKind::Time,
        TypeKind::Timetz,
        TypeKind::Datetime,
        TypeKind::Datetimetz,
        TypeKind::Timestamp,
        TypeKind::Timestamptz,
        TypeKind::Interval,
        TypeKind::Blob,
        TypeKind::Json,
        TypeKind::Uuid,
    ];
    KINDS.get(tag as usize).copied().unwrap_or(TypeKind::Int)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jugadb_types::schema::TypeKind;

    fn users_schema() -> TableSchema {
        let mut id = ColumnDefinition::new("id", TypeKind::Int);
        id.is_primary_key = true;
        id.has_sequence = true;
        let name = ColumnDefinition::new("name", TypeKind::Varchar);
        TableSchema::new("users", vec![id, name])
    }

    #[test]
    fn create_table_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut db = Database::open(dir.path()).unwrap();
            db.create_table(users_schema()).unwrap();
        }
        let db = Database::open(dir.path()).unwrap();
        assert!(db.find_table_schema_tc("users").is_some());
        assert_eq!(db.table("users").unwrap().schema.columns.len(), 2);
    }

    #[test]
    fn insert_and_scan_round_trips_rows() {
        let dir = tempfile::tempdir().unwrap();
        let mut db = Database::open(dir.path()).unwrap();
        db.create_table(users_schema()).unwrap();

        db.insert_row("users", vec![ColumnValue::Null, ColumnValue::Varchar("ada".into())]).unwrap();
        db.insert_row("users", vec![ColumnValue::Null, ColumnValue::Varchar("grace".into())]).unwrap();

        let rows = db.scan_table("users").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].values[0], ColumnValue::Int(0));
        assert_eq!(rows[1].values[0], ColumnValue::Int(1));
    }

    #[test]
    fn delete_row_tombstones_without_compaction() {
        let dir = tempfile::tempdir().unwrap();
        let mut db = Database::open(dir.path()).unwrap();
        db.create_table(users_schema()).unwrap();
        let row = db.insert_row("users", vec![ColumnValue::Null, ColumnValue::Varchar("ada".into())]).unwrap();

        db.delete_row("users", row.id, Some(&row.values[0])).unwrap();
        assert!(db.scan_table("users").unwrap().is_empty());
    }
}
