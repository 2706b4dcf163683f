//! Validated entity names.

#![forbid(unsafe_code)]

use std::fmt;
use std::sync::OnceLock;

use regex::bytes::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::DatumString;

/// Description of the accepted character set, used verbatim in error text.
pub const VALID_CHAR_MSG: &str = "Use A-Z, a-z, 0-9, _ and - only.";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{VALID_CHAR_MSG}")]
pub struct NameError;

fn name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_\-]+$").unwrap())
}

pub fn is_acceptable_name(bytes: &[u8]) -> bool { name_re().is_match(bytes) }

/// Human-readable name of a server, database or table.
///
/// Only built through [`Name::assign`] (or [`Name::guarantee_valid`] for
/// compile-time constants), so every `Name` satisfies the charset.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Name(DatumString);

impl Name {
    /// Validate and wrap `value`. The buffer is shared, not copied.
    pub fn assign(value: impl Into<DatumString>) -> Result<Self, NameError> {
        let value = value.into();
        if is_acceptable_name(value.data()) { Ok(Self(value)) } else { Err(NameError) }
    }

    /// For names known to be valid at the call site. Panics otherwise.
    pub fn guarantee_valid(value: &str) -> Self {
        match Self::assign(value) {
            Ok(name) => name,
            Err(_) => panic!("name {:?} was guaranteed valid but is not", value),
        }
    }

    pub fn as_datum_string(&self) -> &DatumString { &self.0 }

    pub fn into_datum_string(self) -> DatumString { self.0 }

    pub fn as_str(&self) -> &str {
        // The charset is ASCII, so this never falls through.
        self.0.as_str().unwrap_or_default()
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "Name({})", self.as_str()) }
}

impl PartialEq<str> for Name {
    fn eq(&self, other: &str) -> bool { self.as_str() == other }
}

impl PartialEq<&str> for Name {
    fn eq(&self, other: &&str) -> bool { self.as_str() == *other }
}

impl std::str::FromStr for Name {
    type Err = NameError;
    fn from_str(s: &str) -> Result<Self, Self::Err> { Self::assign(s) }
}

impl Serialize for Name {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Name {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Name::assign(s.as_str()).map_err(|e| serde::de::Error::custom(format!("invalid name {:?}: {}", s, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charset_is_enforced() {
        assert!(Name::assign("alpha_01-x").is_ok());
        assert!(Name::assign("").is_err());
        assert!(Name::assign("has space").is_err());
        assert!(Name::assign("dot.ted").is_err());
        assert!(Name::assign("ünïcode").is_err());
        assert!(Name::assign(DatumString::from_bytes(b"nul\0")).is_err());
        assert_eq!(NameError.to_string(), VALID_CHAR_MSG);
    }

    #[test]
    fn assign_shares_buffer() {
        let raw = DatumString::from("beta");
        let name = Name::assign(raw.clone()).unwrap();
        assert!(name.as_datum_string().shares_buffer_with(&raw));
        assert_eq!(name, "beta");
    }

    #[test]
    fn serde_validates_on_the_way_in() {
        let name: Name = serde_json::from_str("\"gamma\"").unwrap();
        assert_eq!(serde_json::to_string(&name).unwrap(), "\"gamma\"");
        assert!(serde_json::from_str::<Name>("\"not valid\"").is_err());
    }

    #[test]
    #[should_panic(expected = "guaranteed valid")]
    fn guarantee_valid_panics_on_bad_constant() {
        let _ = Name::guarantee_valid("bad name");
    }
}
