//! `save_btree` / `load_btree` (spec.md §4.5 "Persistence"): a node header
//! (`is_leaf`, `num_keys`) followed by keys (sized by `key_size_for_type`)
//! and row pointers for leaves, recursing into children for internal nodes.

use std::io::{self, Read, Write};

use jugadb_types::schema::TypeKind;
use jugadb_types::{ColumnValue, RowId};

use crate::node::BTreeNode;
use crate::tree::BTree;

/// How many `process` calls a loaded tree stays resident before the catalog
/// persists it back to disk and releases the in-memory form (spec.md §4.5
/// "lifetime threshold").
pub const BTREE_LIFETIME_THRESHOLD: u32 = 64;

#[derive(Debug, thiserror::Error)]
pub enum BTreeIoError {
    #[error("I/O error persisting B-tree: {0}")]
    Io(#[from] io::Error),
    #[error("corrupted B-tree node header")]
    CorruptHeader,
    #[error("unsupported key type for persistence: {0:?}")]
    UnsupportedKeyType(TypeKind),
}

pub fn save_btree<W: Write>(writer: &mut W, tree: &BTree) -> Result<(), BTreeIoError> {
    writer.write_all(&tree.id.to_le_bytes())?;
    writer.write_all(&(tree.key_type as u8 as u32).to_le_bytes())?;
    writer.write_all(&(tree.btree_order as u32).to_le_bytes())?;
    save_node(writer, &tree.root, tree.key_type)
}

fn save_node<W: Write>(writer: &mut W, node: &BTreeNode, key_type: TypeKind) -> Result<(), BTreeIoError> {
    writer.write_all(&[node.is_leaf as u8])?;
    writer.write_all(&(node.num_keys() as u32).to_le_bytes())?;

    for key in &node.keys {
        write_key(writer, key, key_type)?;
    }

    if node.is_leaf {
        for row_id in &node.row_pointers {
            writer.write_all(&row_id.page_id.to_le_bytes())?;
            writer.write_all(&row_id.row_id.to_le_bytes())?;
        }
    } else {
        for child in &node.children {
            save_node(writer, child, key_type)?;
        }
    }
    Ok(())
}

pub fn load_btree<R: Read>(reader: &mut R) -> Result<BTree, BTreeIoError> {
    let id = read_u32(reader)?;
    let key_type = type_kind_from_tag(read_u32(reader)?)?;
    let btree_order = read_u32(reader)? as usize;
    let root = load_node(reader, key_type)?;
    Ok(BTree {
        id,
        root,
        btree_order,
        key_type,
    })
}

fn load_node<R: Read>(reader: &mut R, key_type: TypeKind) -> Result<BTreeNode, BTreeIoError> {
    let mut is_leaf_buf = [0u8; 1];
    reader.read_exact(&mut is_leaf_buf)?;
    let is_leaf = match is_leaf_buf[0] {
        0 => false,
        1 => true,
        _ => return Err(BTreeIoError::CorruptHeader),
    };
    let num_keys = read_u32(reader)? as usize;

    let mut keys = Vec::with_capacity(num_keys);
    for _ in 0..num_keys {
        keys.push(read_key(reader, key_type)?);
    }

    let mut node = if is_leaf {
        BTreeNode::new_leaf()
    } else {
        BTreeNode::new_internal()
    };
    node.keys = keys;

    if is_leaf {
        let mut row_pointers = Vec::with_capacity(num_keys);
        for _ in 0..num_keys {
            let page_id = read_u32(reader)?;
            let row_id = read_u32(reader)?;
            row_pointers.push(RowId::new(page_id, row_id));
        }
        node.row_pointers = row_pointers;
    } else {
        let mut children = Vec::with_capacity(num_keys + 1);
        for _ in 0..=num_keys {
            children.push(load_node(reader, key_type)?);
        }
        node.children = children;
    }

    Ok(node)
}

fn read_u32<R: Read>(reader: &mut R) -> Result<u32, BTreeIoError> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn write_key<W: Write>(writer: &mut W, key: &ColumnValue, key_type: TypeKind) -> Result<(), BTreeIoError> {
    match (key, key_type) {
        (ColumnValue::Null, _) => {
            writer.write_all(&[1u8])?;
        }
        (value, _) => {
            writer.write_all(&[0u8])?;
            let encoded = encode_key_bytes(value, key_type)?;
            writer.write_all(&(encoded.len() as u32).to_le_bytes())?;
            writer.write_all(&encoded)?;
        }
    }
    Ok(())
}

fn read_key<R: Read>(reader: &mut R, key_type: TypeKind) -> Result<ColumnValue, BTreeIoError> {
    let mut tag = [0u8; 1];
    reader.read_exact(&mut tag)?;
    if tag[0] == 1 {
        return Ok(ColumnValue::Null);
    }
    let len = read_u32(reader)? as usize;
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf)?;
    decode_key_bytes(&buf, key_type)
}

fn encode_key_bytes(value: &ColumnValue, key_type: TypeKind) -> Result<Vec<u8>, BTreeIoError> {
    Ok(match value {
        ColumnValue::Int(i) => i.to_le_bytes().to_vec(),
        ColumnValue::Uint(u) => u.to_le_bytes().to_vec(),
        ColumnValue::Float(f) => f.to_le_bytes().to_vec(),
        ColumnValue::Double(d) => d.to_le_bytes().to_vec(),
        ColumnValue::Bool(b) => vec![*b as u8],
        ColumnValue::Char(c) => c.to_string().into_bytes(),
        ColumnValue::Str(s) | ColumnValue::Varchar(s) => s.clone().into_bytes(),
        ColumnValue::Uuid(u) => u.as_bytes().to_vec(),
        ColumnValue::Decimal(d) => d.digits.clone().into_bytes(),
        ColumnValue::Date(d) => d.format("%Y-%m-%d").to_string().into_bytes(),
        ColumnValue::Time(t) => t.format("%H:%M:%S%.f").to_string().into_bytes(),
        ColumnValue::Datetime(dt) | ColumnValue::Timestamp(dt) => {
            dt.format("%Y-%m-%d %H:%M:%S%.f").to_string().into_bytes()
        }
        other => return Err(BTreeIoError::UnsupportedKeyType(other.type_kind().unwrap_or(key_type))),
    })
}

fn decode_key_bytes(bytes: &[u8], key_type: TypeKind) -> Result<ColumnValue, BTreeIoError> {
    Ok(match key_type {
        TypeKind::Int | TypeKind::Serial => {
            ColumnValue::Int(i64::from_le_bytes(bytes.try_into().map_err(|_| BTreeIoError::CorruptHeader)?))
        }
        TypeKind::Uint => {
            ColumnValue::Uint(u64::from_le_bytes(bytes.try_into().map_err(|_| BTreeIoError::CorruptHeader)?))
        }
        TypeKind::Float => {
            ColumnValue::Float(f32::from_le_bytes(bytes.try_into().map_err(|_| BTreeIoError::CorruptHeader)?))
        }
        TypeKind::Double => {
            ColumnValue::Double(f64::from_le_bytes(bytes.try_into().map_err(|_| BTreeIoError::CorruptHeader)?))
        }
        TypeKind::Bool => ColumnValue::Bool(bytes.first() == Some(&1)),
        TypeKind::Char => ColumnValue::Char(
            std::str::from_utf8(bytes)
                .ok()
                .and_then(|s| s.chars().next())
                .ok_or(BTreeIoError::CorruptHeader)?,
        ),
        TypeKind::Varchar => ColumnValue::Varchar(
            String::from_utf8(bytes.to_vec()).map_err(|_| BTreeIoError::CorruptHeader)?,
        ),
        TypeKind::Uuid => ColumnValue::Uuid(uuid::Uuid::from_slice(bytes).map_err(|_| BTreeIoError::CorruptHeader)?),
        TypeKind::Decimal => ColumnValue::Decimal(jugadb_types::DecimalValue {
            digits: String::from_utf8(bytes.to_vec()).map_err(|_| BTreeIoError::CorruptHeader)?,
            precision: 18,
            scale: 0,
        }),
        TypeKind::Date => {
            let s = std::str::from_utf8(bytes).map_err(|_| BTreeIoError::CorruptHeader)?;
            ColumnValue::Date(
                chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| BTreeIoError::CorruptHeader)?,
            )
        }
        TypeKind::Time => {
            let s = std::str::from_utf8(bytes).map_err(|_| BTreeIoError::CorruptHeader)?;
            ColumnValue::Time(
                chrono::NaiveTime::parse_from_str(s, "%H:%M:%S%.f").map_err(|_| BTreeIoError::CorruptHeader)?,
            )
        }
        TypeKind::Datetime | TypeKind::Timestamp => {
            let s = std::str::from_utf8(bytes).map_err(|_| BTreeIoError::CorruptHeader)?;
            let dt = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
                .map_err(|_| BTreeIoError::CorruptHeader)?;
            if key_type == TypeKind::Timestamp {
                ColumnValue::Timestamp(dt)
            } else {
                ColumnValue::Datetime(dt)
            }
        }
        other => return Err(BTreeIoError::UnsupportedKeyType(other)),
    })
}

fn type_kind_from_tag(tag: u32) -> Result<TypeKind, BTreeIoError> {
    const KINDS: [TypeKind; 21] = [
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
        TypeKind::Serial,
    ];
    KINDS.get(tag as usize).copied().ok_or(BTreeIoError::CorruptHeader)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::BTree;

    #[test]
    fn save_then_load_round_trips_int_tree() {
        let mut tree = BTree::new(7, TypeKind::Int);
        for i in 0..80i64 {
            tree.insert(ColumnValue::Int(i), RowId::new(0, i as u32));
        }

        let mut buf = Vec::new();
        save_btree(&mut buf, &tree).unwrap();
        let loaded = load_btree(&mut &buf[..]).unwrap();

        assert_eq!(loaded.id, tree.id);
        assert_eq!(loaded.key_type, tree.key_type);
        for i in 0..80i64 {
            assert_eq!(loaded.search(&ColumnValue::Int(i)), Some(RowId::new(0, i as u32)));
        }
    }

    #[test]
    fn save_then_load_round_trips_varchar_tree() {
        let mut tree = BTree::new(3, TypeKind::Varchar);
        for (i, name) in ["alice", "bob", "carol", "dave"].iter().enumerate() {
            tree.insert(ColumnValue::Varchar(name.to_string()), RowId::new(0, i as u32));
        }

        let mut buf = Vec::new();
        save_btree(&mut buf, &tree).unwrap();
        let loaded = load_btree(&mut &buf[..]).unwrap();
        assert_eq!(
            loaded.search(&ColumnValue::Varchar("carol".into())),
            Some(RowId::new(0, 2))
        );
    }
}
