//! adminql core types: datum strings, datums, validated names and entity ids.

#![forbid(unsafe_code)]

pub mod datum;
pub mod datum_string;
pub mod ids;
pub mod name;

pub use datum::{current_microtime, Datum, DatumObject, DatumType, Microtime, Pseudo, TimeValue};
pub use datum_string::{concat, DatumString};
pub use ids::{uuid_to_str, DatabaseId, EntityId, IdentifierFormat, ServerId, TableId};
pub use name::{Name, NameError, VALID_CHAR_MSG};
