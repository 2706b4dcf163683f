#![forbid(unsafe_code)]

use adminql_core::{Datum, Name, ServerId};

use crate::convert::{id_from_datum, name_from_datum, name_to_datum, uuid_to_datum};
use crate::error::{AdminError, AdminResult};
use crate::object::ObjectConverter;

pub const DEFAULT_SERVER_TAG: &str = "default";

/// A row of `server_config`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub id: ServerId,
    pub name: Name,
    pub tags: Vec<Name>,
}

impl ServerConfig {
    pub fn to_datum(&self) -> Datum {
        Datum::from_pairs([
            ("id", uuid_to_datum(self.id.into())),
            ("name", name_to_datum(&self.name)),
            ("tags", Datum::array(self.tags.iter().map(name_to_datum).collect())),
        ])
    }

    pub fn from_datum(datum: &Datum) -> AdminResult<Self> {
        let mut obj = ObjectConverter::new(datum)?;
        let id = id_from_datum(&obj.get("id")?)?;
        let name = name_from_datum(&obj.get("name")?, "server name")?;
        let tags = match obj.get_optional("tags") {
            None => vec![Name::guarantee_valid(DEFAULT_SERVER_TAG)],
            Some(d) => tags_from_datum(&d)?,
        };
        obj.check_no_extra_keys()?;
        Ok(Self { id, name, tags })
    }
}

fn tags_from_datum(datum: &Datum) -> AdminResult<Vec<Name>> {
    let items = datum
        .as_array()
        .ok_or_else(|| AdminError::type_mismatch(format!("Expected an array; got {}", datum.print())))?;
    let mut tags: Vec<Name> = Vec::with_capacity(items.len());
    for item in items {
        let tag = name_from_datum(item, "server tag")?;
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    Ok(tags)
}
