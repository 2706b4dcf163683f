#![forbid(unsafe_code)]

use adminql_core::{DatabaseId, Datum, IdentifierFormat, Name};
use adminql_store::ClusterMetadata;

use crate::convert::{id_from_datum, name_from_datum, name_to_datum, uuid_to_datum};
use crate::error::AdminResult;
use crate::object::ObjectConverter;
use crate::resolve::database_id_to_datum;

/// A row of `db_config`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub id: DatabaseId,
    pub name: Name,
}

impl DatabaseConfig {
    /// Row for a database listed in `meta`; `None` once it is deleted.
    pub fn for_database(id: DatabaseId, meta: &ClusterMetadata) -> Option<Self> {
        let identity = database_id_to_datum(id, IdentifierFormat::Name, meta)?;
        Some(Self { id, name: identity.name })
    }

    /// Every live database, ordered by name then id.
    pub fn all(meta: &ClusterMetadata) -> Vec<Self> {
        let mut rows: Vec<Self> = meta.databases().keys().filter_map(|id| Self::for_database(*id, meta)).collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        rows
    }

    pub fn to_datum(&self) -> Datum {
        Datum::from_pairs([("id", uuid_to_datum(self.id.into())), ("name", name_to_datum(&self.name))])
    }

    pub fn from_datum(datum: &Datum) -> AdminResult<Self> {
        let mut obj = ObjectConverter::new(datum)?;
        let id = id_from_datum(&obj.get("id")?)?;
        let name = name_from_datum(&obj.get("name")?, "database name")?;
        obj.check_no_extra_keys()?;
        Ok(Self { id, name })
    }
}
