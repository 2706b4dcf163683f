//! adminql adapter: converts between datums and typed cluster entities for
//! the administrative query interface.
//!
//! - [`convert`]: scalar converters (strings, names, UUIDs, ports, times)
//! - [`resolve`]: name-or-UUID resolution against a metadata snapshot
//! - [`object`]: strict "no unexpected fields" object parsing
//! - [`system`]: system-table rows built on the three above

#![forbid(unsafe_code)]

pub mod config;
pub mod convert;
pub mod error;
pub mod object;
pub mod resolve;
pub mod system;

pub use config::AdminConfig;
pub use error::{AdminError, AdminResult, ErrorKind};
pub use object::ObjectConverter;
pub use resolve::{
    database_id_from_datum, database_id_to_datum, server_id_from_datum, server_id_to_datum, table_database_to_datum,
    table_id_to_datums,
    Identity, Resolved, TableIdentity, DELETED_DATABASE_NAME,
};
