//! Entity ids and the identifier format used when rendering them.

#![forbid(unsafe_code)]

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Common surface of the typed entity ids.
pub trait EntityId: Copy + Eq + Ord + std::hash::Hash + fmt::Debug + Send + Sync + 'static {
    /// Lowercase kind used in messages, e.g. "server".
    const KIND: &'static str;
    fn from_uuid(uuid: Uuid) -> Self;
    fn uuid(&self) -> Uuid;
}

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            pub const fn from_u128(v: u128) -> Self { Self(Uuid::from_u128(v)) }
            pub fn new_random() -> Self { Self(Uuid::new_v4()) }
        }

        impl EntityId for $name {
            const KIND: &'static str = $kind;
            fn from_uuid(uuid: Uuid) -> Self { Self(uuid) }
            fn uuid(&self) -> Uuid { self.0 }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self { Self(uuid) }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self { id.0 }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0.hyphenated()) }
        }
    };
}

entity_id!(
    /// Id of a server in the cluster.
    ServerId, "server"
);
entity_id!(
    /// Id of a database.
    DatabaseId, "database"
);
entity_id!(
    /// Id of a table (namespace).
    TableId, "table"
);

/// Canonical text form of a UUID: lowercase and hyphenated.
pub fn uuid_to_str(uuid: Uuid) -> String { uuid.hyphenated().to_string() }

/// Which representation a document uses for entity references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentifierFormat {
    #[default]
    Name,
    Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown identifier format {0:?} (expected \"name\" or \"uuid\")")]
pub struct ParseIdentifierFormatError(pub String);

impl FromStr for IdentifierFormat {
    type Err = ParseIdentifierFormatError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "uuid" => Ok(Self::Uuid),
            _ => Err(ParseIdentifierFormatError(s.to_string())),
        }
    }
}

impl fmt::Display for IdentifierFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self { Self::Name => "name", Self::Uuid => "uuid" })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_render_canonically() {
        let id = ServerId::from_u128(0x0123_4567_89ab_cdef_0123_4567_89ab_cdef);
        assert_eq!(id.to_string(), "01234567-89ab-cdef-0123-456789abcdef");
        assert_eq!(uuid_to_str(id.uuid()), id.to_string());
        assert_eq!(<ServerId as EntityId>::KIND, "server");
        assert_eq!(TableId::KIND, "table");
    }

    #[test]
    fn identifier_format_parses_and_serializes() {
        assert_eq!("name".parse::<IdentifierFormat>().unwrap(), IdentifierFormat::Name);
        assert_eq!(" UUID ".parse::<IdentifierFormat>().unwrap(), IdentifierFormat::Uuid);
        assert!("both".parse::<IdentifierFormat>().is_err());
        assert_eq!(serde_json::to_string(&IdentifierFormat::Uuid).unwrap(), "\"uuid\"");
        assert_eq!(IdentifierFormat::default(), IdentifierFormat::Name);
    }
}
