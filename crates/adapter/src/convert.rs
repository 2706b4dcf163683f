//! Scalar converters between typed values and datums.
//!
//! Every `*_to_datum` is infallible. Every `*_from_datum` checks the type tag
//! first, then the content, and reports the printed datum in its message.

#![forbid(unsafe_code)]

use adminql_core::{uuid_to_str, Datum, DatumString, DatumType, EntityId, IdentifierFormat, Microtime, Name, VALID_CHAR_MSG};
use uuid::Uuid;

use crate::error::{AdminError, AdminResult, ErrorKind};

pub fn string_to_datum(value: &str) -> Datum { Datum::string(value) }

pub fn string_from_datum(datum: &Datum) -> AdminResult<String> {
    match datum {
        Datum::String(s) => Ok(s.to_string_lossy().into_owned()),
        _ => Err(AdminError::type_mismatch(format!("Expected a string; got {}", datum.print()))),
    }
}

/// Raw string without copying the bytes out of the datum.
pub fn datum_string_from_datum(datum: &Datum) -> AdminResult<DatumString> {
    datum
        .as_str()
        .cloned()
        .ok_or_else(|| AdminError::type_mismatch(format!("Expected a string; got {}", datum.print())))
}

pub fn name_to_datum(name: &Name) -> Datum { Datum::String(name.as_datum_string().clone()) }

/// `what` names the expected kind, e.g. "server name" or "table name".
pub fn name_from_datum(datum: &Datum, what: &str) -> AdminResult<Name> {
    let s = match datum {
        Datum::String(s) => s,
        _ => return Err(AdminError::type_mismatch(format!("Expected a {}; got {}", what, datum.print()))),
    };
    Name::assign(s.clone())
        .map_err(|_| AdminError::validation(format!("{} is not a valid {}; {}", datum.print(), what, VALID_CHAR_MSG)))
}

pub fn uuid_to_datum(uuid: Uuid) -> Datum { Datum::string(uuid_to_str(uuid)) }

/// Only the canonical 36-character hyphenated form is accepted.
pub fn uuid_from_datum(datum: &Datum) -> AdminResult<Uuid> {
    let bad = || AdminError::new(
        if datum.get_type() == DatumType::String { ErrorKind::Validation } else { ErrorKind::TypeMismatch },
        format!("Expected a UUID; got {}", datum.print()),
    );
    let text = datum.as_str().and_then(DatumString::as_str).ok_or_else(bad)?;
    if text.len() != 36 {
        return Err(bad());
    }
    Uuid::try_parse(text).map_err(|_| bad())
}

/// Typed variant of [`uuid_from_datum`].
pub fn id_from_datum<Id: EntityId>(datum: &Datum) -> AdminResult<Id> {
    uuid_from_datum(datum).map(Id::from_uuid)
}

pub fn port_to_datum(port: u16) -> Datum { Datum::Number(f64::from(port)) }

pub fn port_from_datum(datum: &Datum) -> AdminResult<u16> {
    let n = match datum {
        Datum::Number(n) => *n,
        _ => return Err(AdminError::type_mismatch(format!("Expected a port number; got {}", datum.print()))),
    };
    if n.fract() != 0.0 || !(0.0..=f64::from(u16::MAX)).contains(&n) {
        return Err(AdminError::validation(format!("Expected a port number; got {}", datum.print())));
    }
    Ok(n as u16)
}

/// TIME pseudo-datum at UTC for `value` microseconds since the epoch.
pub fn microtime_to_datum(value: Microtime) -> Datum { Datum::time(value as f64 / 1.0e6) }

/// The name when `format` is `Name`, the UUID otherwise.
pub fn name_or_uuid_to_datum<Id: EntityId>(name: &Name, id: Id, format: IdentifierFormat) -> Datum {
    match format {
        IdentifierFormat::Name => name_to_datum(name),
        IdentifierFormat::Uuid => uuid_to_datum(id.uuid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adminql_core::{Pseudo, ServerId};
    use serde_json::json;

    #[test]
    fn string_roundtrip_and_type_check() {
        assert_eq!(string_from_datum(&string_to_datum("hello")).unwrap(), "hello");
        let err = string_from_datum(&Datum::Number(5.0)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
        assert_eq!(err.to_string(), "Expected a string; got 5");
    }

    #[test]
    fn name_errors_mention_kind_and_charset() {
        let name = Name::guarantee_valid("db_1");
        assert_eq!(name_from_datum(&name_to_datum(&name), "database name").unwrap(), name);

        let err = name_from_datum(&Datum::Null, "server name").unwrap_err();
        assert_eq!(err.message, "Expected a server name; got null");

        let err = name_from_datum(&Datum::string("no spaces"), "table name").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(err.message, format!("\"no spaces\" is not a valid table name; {}", VALID_CHAR_MSG));
    }

    #[test]
    fn uuid_roundtrip_and_errors() {
        let u = Uuid::from_u128(0xdead_beef);
        let d = uuid_to_datum(u);
        assert_eq!(d, Datum::string("00000000-0000-0000-0000-0000deadbeef"));
        assert_eq!(uuid_from_datum(&d).unwrap(), u);
        assert_eq!(id_from_datum::<ServerId>(&d).unwrap(), ServerId::from_u128(0xdead_beef));

        let err = uuid_from_datum(&Datum::string("nope")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(err.message, "Expected a UUID; got \"nope\"");
        assert_eq!(uuid_from_datum(&Datum::Bool(true)).unwrap_err().kind, ErrorKind::TypeMismatch);
    }

    #[test]
    fn uuid_needs_canonical_text() {
        for loose in [
            "{00000000-0000-0000-0000-000000000001}",
            "urn:uuid:00000000-0000-0000-0000-000000000001",
            "00000000000000000000000000000001",
        ] {
            let err = uuid_from_datum(&Datum::string(loose)).unwrap_err();
            assert_eq!(err.kind, ErrorKind::Validation, "{}", loose);
        }
        let upper = Datum::string("0000ABCD-0000-0000-0000-000000000001");
        assert_eq!(uuid_from_datum(&upper).unwrap(), Uuid::from_u128(0x0000abcd_0000_0000_0000_000000000001));
    }

    #[test]
    fn datum_string_is_taken_without_copy() {
        let d = Datum::string("raw\0bytes");
        let s = datum_string_from_datum(&d).unwrap();
        assert_eq!(s.data(), b"raw\0bytes");
        assert!(s.shares_buffer_with(d.as_str().unwrap()));
        let err = datum_string_from_datum(&Datum::Null).unwrap_err();
        assert_eq!(err.message, "Expected a string; got null");
    }

    #[test]
    fn ports_are_exact_integers() {
        for p in [0u16, 1, 28015, u16::MAX] {
            assert_eq!(port_to_datum(p), Datum::from(json!(p)));
            assert_eq!(port_from_datum(&port_to_datum(p)).unwrap(), p);
        }
        assert!(port_from_datum(&Datum::Number(1.5)).is_err());
        assert!(port_from_datum(&Datum::Number(65_536.0)).is_err());
        assert!(port_from_datum(&Datum::Number(-1.0)).is_err());
        assert!(port_from_datum(&Datum::string("80")).is_err());
    }

    #[test]
    fn microtime_is_utc_time_pseudo() {
        match microtime_to_datum(1_700_000_000_500_000) {
            Datum::Pseudo(Pseudo::Time(t)) => {
                assert_eq!(t.epoch_time, 1_700_000_000.5);
                assert_eq!(t.timezone, "+00:00");
            }
            other => panic!("expected time, got {:?}", other),
        }
    }

    #[test]
    fn name_or_uuid_picks_one_representation() {
        let name = Name::guarantee_valid("alpha");
        let id = ServerId::from_u128(7);
        assert_eq!(name_or_uuid_to_datum(&name, id, IdentifierFormat::Name), Datum::string("alpha"));
        assert_eq!(
            name_or_uuid_to_datum(&name, id, IdentifierFormat::Uuid),
            Datum::string("00000000-0000-0000-0000-000000000007")
        );
    }
}
