#![forbid(unsafe_code)]

use std::fmt;

use adminql_core::{DatabaseId, Datum, DatumType, IdentifierFormat, Name, TableId};
use adminql_store::ClusterMetadata;

use crate::convert::{id_from_datum, name_from_datum, name_to_datum, string_from_datum, string_to_datum, uuid_to_datum};
use crate::error::{AdminError, AdminResult, ErrorKind};
use crate::object::ObjectConverter;
use crate::resolve::{database_id_from_datum, table_database_to_datum};

pub const DEFAULT_PRIMARY_KEY: &str = "id";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Durability {
    #[default]
    Hard,
    Soft,
}

impl Durability {
    pub fn as_str(self) -> &'static str {
        match self { Durability::Hard => "hard", Durability::Soft => "soft" }
    }

    fn from_datum(datum: &Datum) -> AdminResult<Self> {
        let kind = if datum.get_type() == DatumType::String { ErrorKind::Validation } else { ErrorKind::TypeMismatch };
        match datum.as_str().and_then(|s| s.as_str()) {
            Some("hard") => Ok(Durability::Hard),
            Some("soft") => Ok(Durability::Soft),
            _ => Err(AdminError::new(kind, format!("Expected \"hard\" or \"soft\"; got {}", datum.print()))),
        }
    }
}

impl fmt::Display for Durability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// A row of `table_config`. `db` is written and read in the request's
/// identifier format. The row carries its own `name` and `database`; the
/// metadata only decides whether the table still exists and how the
/// database is spelled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableConfig {
    pub id: TableId,
    pub name: Name,
    pub database: DatabaseId,
    pub primary_key: String,
    pub durability: Durability,
}

impl TableConfig {
    /// `None` when the table no longer exists in `meta`.
    pub fn to_datum(&self, format: IdentifierFormat, meta: &ClusterMetadata) -> Option<Datum> {
        meta.table(&self.id)?.live()?;
        let db = table_database_to_datum(self.database, format, meta);
        Some(Datum::from_pairs([
            ("id", uuid_to_datum(self.id.into())),
            ("name", name_to_datum(&self.name)),
            ("db", db.datum),
            ("primary_key", string_to_datum(&self.primary_key)),
            ("durability", string_to_datum(self.durability.as_str())),
        ]))
    }

    pub fn from_datum(datum: &Datum, format: IdentifierFormat, meta: &ClusterMetadata) -> AdminResult<Self> {
        let mut obj = ObjectConverter::new(datum)?;
        let id = id_from_datum(&obj.get("id")?)?;
        let name = name_from_datum(&obj.get("name")?, "table name")?;
        let database = database_id_from_datum(&obj.get("db")?, format, meta)?.id;
        let primary_key = match obj.get_optional("primary_key") {
            Some(d) => string_from_datum(&d)?,
            None => DEFAULT_PRIMARY_KEY.to_string(),
        };
        let durability = match obj.get_optional("durability") {
            Some(d) => Durability::from_datum(&d)?,
            None => Durability::default(),
        };
        obj.check_no_extra_keys()?;
        Ok(Self { id, name, database, primary_key, durability })
    }
}
