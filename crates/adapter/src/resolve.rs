//! Resolution of entity references between their document form (a name or a
//! UUID, depending on the request's [`IdentifierFormat`]) and canonical ids.
//!
//! Everything here is a pure function of the datum, the format and one
//! metadata snapshot. Reverse lookups (`*_from_datum`) return a user-facing
//! [`AdminError`]; forward lookups (`*_to_datum`) return `None` when the entity
//! disappeared, which is not the user's fault and carries no message.

#![forbid(unsafe_code)]

use adminql_core::{uuid_to_str, DatabaseId, Datum, EntityId, IdentifierFormat, Name, ServerId, TableId};
use adminql_store::{ClusterMetadata, Deletable, UniqueMatch};
use metrics::counter;
use tracing::{debug, warn};

use crate::convert::{id_from_datum, name_from_datum, name_or_uuid_to_datum};
use crate::error::{AdminError, AdminResult};

/// Display name used for a table's database once that database is gone.
pub const DELETED_DATABASE_NAME: &str = "__deleted_database__";

/// An id together with its current name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved<Id> {
    pub id: Id,
    pub name: Name,
}

/// Document form of an entity and its plain name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub datum: Datum,
    pub name: Name,
}

/// Table identity plus that of its owning database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableIdentity {
    pub table: Identity,
    pub database_id: DatabaseId,
    pub db: Identity,
}

fn rejected<T>(what: &'static str, err: AdminError) -> AdminResult<T> {
    debug!(what, kind = err.kind.as_str(), message = %err.message, "identifier rejected");
    counter!("adminql_resolve_errors_total", 1u64, "kind" => err.kind.as_str());
    Err(err)
}

fn capitalized(kind: &str) -> String {
    let mut chars = kind.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Turn a name lookup into a result: exactly one match or a message saying
/// why not.
fn resolve_unique<Id: EntityId>(m: UniqueMatch<Id>, name: Name) -> AdminResult<Resolved<Id>> {
    let kind = capitalized(Id::KIND);
    match m {
        UniqueMatch::Found(id) => Ok(Resolved { id, name }),
        UniqueMatch::NotFound => rejected(Id::KIND, AdminError::not_found(format!(
            "{} `{}` does not exist.", kind, name
        ))),
        UniqueMatch::Ambiguous(_) => rejected(Id::KIND, AdminError::ambiguous(format!(
            "{} `{}` is ambiguous; there are multiple {}s with that name.", kind, name, Id::KIND
        ))),
    }
}

fn no_such_uuid<Id: EntityId>(id: Id) -> AdminError {
    AdminError::not_found(format!("There is no {} with UUID `{}`.", Id::KIND, uuid_to_str(id.uuid())))
}

pub fn server_id_to_datum(id: ServerId, format: IdentifierFormat, meta: &ClusterMetadata) -> Option<Identity> {
    let name = meta.server_name(&id)?;
    Some(Identity { datum: name_or_uuid_to_datum(name, id, format), name: name.clone() })
}

pub fn server_id_from_datum(
    datum: &Datum,
    format: IdentifierFormat,
    meta: &ClusterMetadata,
) -> AdminResult<Resolved<ServerId>> {
    match format {
        IdentifierFormat::Name => {
            let name = match name_from_datum(datum, "server name") {
                Ok(n) => n,
                Err(e) => return rejected("server", e),
            };
            // Count and fetch come from the same read of the index.
            resolve_unique(meta.server_names().lookup(&name), name)
        }
        IdentifierFormat::Uuid => {
            let id: ServerId = match id_from_datum(datum) {
                Ok(id) => id,
                Err(e) => return rejected("server", e),
            };
            match meta.server_name(&id) {
                Some(name) => Ok(Resolved { id, name: name.clone() }),
                None => rejected("server", no_such_uuid(id)),
            }
        }
    }
}

/// `id` must exist in `meta` (possibly as a tombstone); a missing id is a
/// caller bug and panics. A tombstone yields `None`.
pub fn database_id_to_datum(id: DatabaseId, format: IdentifierFormat, meta: &ClusterMetadata) -> Option<Identity> {
    let entry = match meta.database(&id) {
        Some(entry) => entry,
        None => panic!("database {} expected in metadata but is missing", id),
    };
    let rec = entry.live()?;
    Some(Identity { datum: name_or_uuid_to_datum(&rec.name, id, format), name: rec.name.clone() })
}

pub fn database_id_from_datum(
    datum: &Datum,
    format: IdentifierFormat,
    meta: &ClusterMetadata,
) -> AdminResult<Resolved<DatabaseId>> {
    match format {
        IdentifierFormat::Name => {
            let name = match name_from_datum(datum, "database name") {
                Ok(n) => n,
                Err(e) => return rejected("database", e),
            };
            resolve_unique(meta.find_database(&name), name)
        }
        IdentifierFormat::Uuid => {
            let id: DatabaseId = match id_from_datum(datum) {
                Ok(id) => id,
                Err(e) => return rejected("database", e),
            };
            match meta.database_name(&id) {
                Some(name) => Ok(Resolved { id, name: name.clone() }),
                None => rejected("database", no_such_uuid(id)),
            }
        }
    }
}

/// Identity of a database as seen from one of its tables. A missing or
/// tombstoned database shows up as [`DELETED_DATABASE_NAME`]; in UUID format
/// the datum keeps the dangling id.
pub fn table_database_to_datum(db_id: DatabaseId, format: IdentifierFormat, meta: &ClusterMetadata) -> Identity {
    let name = match meta.database(&db_id) {
        Some(Deletable::Live(db)) => db.name.clone(),
        _ => {
            warn!(database = %db_id, "table refers to a deleted database");
            Name::guarantee_valid(DELETED_DATABASE_NAME)
        }
    };
    Identity { datum: name_or_uuid_to_datum(&name, db_id, format), name }
}

/// Identity of a table and its database. `None` if the table is gone.
///
/// The owning database may already be gone while the table record still
/// points at it; the database then shows up as [`DELETED_DATABASE_NAME`].
pub fn table_id_to_datums(id: TableId, format: IdentifierFormat, meta: &ClusterMetadata) -> Option<TableIdentity> {
    let rec = meta.table(&id)?.live()?;
    let table = Identity { datum: name_or_uuid_to_datum(&rec.name, id, format), name: rec.name.clone() };
    let db = table_database_to_datum(rec.database, format, meta);
    Some(TableIdentity { table, database_id: rec.database, db })
}
