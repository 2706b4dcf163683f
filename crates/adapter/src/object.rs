//! Strict field-by-field parsing of object datums.
//!
//! ```ignore
//! let mut obj = ObjectConverter::new(&datum)?;
//! let name = name_from_datum(&obj.get("name")?, "server name")?;
//! let tags = obj.get_optional("tags");
//! obj.check_no_extra_keys()?;
//! ```
//! Every key read through `get`/`get_optional` counts as recognized, present
//! or not. `check_no_extra_keys` consumes the converter and fails if the
//! document had any key that was never asked for.

#![forbid(unsafe_code)]

use std::collections::BTreeSet;

use adminql_core::{Datum, DatumObject, DatumString};
use metrics::counter;

use crate::error::{AdminError, AdminResult, ErrorKind};

pub struct ObjectConverter<'a> {
    fields: &'a DatumObject,
    // Sorted so the error lists keys deterministically.
    extra_keys: BTreeSet<DatumString>,
}

impl<'a> ObjectConverter<'a> {
    pub fn new(datum: &'a Datum) -> AdminResult<Self> {
        let fields = datum
            .as_object()
            .ok_or_else(|| AdminError::type_mismatch(format!("Expected an object; got {}", datum.print())))?;
        Ok(Self { fields, extra_keys: fields.keys().cloned().collect() })
    }

    pub fn get(&mut self, key: &str) -> AdminResult<Datum> {
        self.get_optional(key)
            .ok_or_else(|| AdminError::new(ErrorKind::MissingField, format!("Expected a field named `{}`.", key)))
    }

    pub fn get_optional(&mut self, key: &str) -> Option<Datum> {
        self.extra_keys.remove(key.as_bytes());
        self.fields.get(key.as_bytes()).cloned()
    }

    /// Presence check that does not mark the key as recognized.
    pub fn has(&self, key: &str) -> bool { self.fields.contains_key(key.as_bytes()) }

    pub fn check_no_extra_keys(self) -> AdminResult<()> {
        if self.extra_keys.is_empty() {
            return Ok(());
        }
        counter!("adminql_unexpected_keys_total", self.extra_keys.len() as u64);
        let mut message = String::from("Unexpected key(s):");
        for key in &self.extra_keys {
            message.push(' ');
            message.push_str(&key.to_string_lossy());
        }
        Err(AdminError::new(ErrorKind::UnexpectedFields, message))
    }
}
