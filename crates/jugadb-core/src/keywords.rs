//! The fixed keyword table (spec.md §4.1): exact-match lookup from an
//! uppercased identifier lexeme to its `TokenKind`, including the
//! shortened forms (`LIM`, `PRIMKEY`, `FRNKEY`, `DISCT`) and the 21 type
//! keywords.

use crate::tokens::TokenKind;

pub fn lookup_keyword(word: &str) -> Option<TokenKind> {
    use TokenKind::*;
    Some(match word.to_ascii_uppercase().as_str() {
        "CREATE" => Create,
        "TABLE" => Table,
        "INSERT" => Insert,
        "INTO" => Into,
        "VALUES" => Values,
        "SELECT" => Select,
        "FROM" => From,
        "WHERE" => Where,
        "UPDATE" => Update,
        "SET" => Set,
        "DELETE" => Delete,
        "ALTER" => Alter,
        "DROP" => Drop,
        "ORDER" => Order,
        "BY" => By,
        "ASC" => Asc,
        "DESC" => Desc,
        "LIM" => Lim,
        "OFFSET" => Offset,
        "GROUP" => Group,
        "HAVING" => Having,
        "JOIN" => Join,
        "ON" => On,
        "AND" => And,
        "OR" => Or,
        "NOT" => Not,
        "NULL" => Null,
        "IN" => In,
        "BETWEEN" => Between,
        "LIKE" => Like,
        "IS" => Is,
        "PRIMKEY" => PrimKey,
        "FRNKEY" => FrnKey,
        "REFERENCES" | "REF" => References,
        "UNIQUE" => Unique,
        "INDEX" => Index,
        "DEFAULT" => Default,
        "CHECK" => Check,
        "CASCADE" => Cascade,
        "SETNULL" => SetNull,
        "RESTRICT" => Restrict,
        "DISCT" => Disct,
        "AS" => As,
        "CAST" => Cast,

        "INT" => TypeInt,
        "UINT" => TypeUint,
        "VARCHAR" => TypeVarchar,
        "CHAR" => TypeChar,
        "TEXT" => TypeText,
        "BOOL" => TypeBool,
        "FLOAT" => TypeFloat,
        "DOUBLE" => TypeDouble,
        "DECIMAL" => TypeDecimal,
        "DATE" => TypeDate,
        "TIME" => TypeTime,
        "TIMETZ" => TypeTimetz,
        "DATETIME" => TypeDatetime,
        "DATETIMETZ" => TypeDatetimetz,
        "TIMESTAMP" => TypeTimestamp,
        "TIMESTAMPTZ" => TypeTimestamptz,
        "INTERVAL" => TypeInterval,
        "BLOB" => TypeBlob,
        "JSON" => TypeJson,
        "UUID" => TypeUuid,
        "SERIAL" => TypeSerial,

        "TRUE" | "FALSE" => return None, // handled as boolean literals, not keywords
        _ => return None,
    })
}

/// Whether `word` (case-insensitively) is one of the 21 type keywords.
pub fn is_type_keyword(kind: TokenKind) -> bool {
    use TokenKind::*;
    matches!(
        kind,
        TypeInt
            | TypeUint
            | TypeVarchar
            | TypeChar
            | TypeText
            | TypeBool
            | TypeFloat
            | TypeDouble
            | TypeDecimal
            | TypeDate
            | TypeTime
            | TypeTimetz
            | TypeDatetime
            | TypeDatetimetz
            | TypeTimestamp
            | TypeTimestamptz
            | TypeInterval
            | TypeBlob
            | TypeJson
            | TypeUuid
            | TypeSerial
    )
}
