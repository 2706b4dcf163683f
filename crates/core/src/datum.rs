//! Immutable document values exchanged with the query layer.

#![forbid(unsafe_code)]

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value as Json;

use crate::DatumString;

/// Key marking an object as a pseudo-type in its JSON form.
pub const REQL_TYPE_KEY: &str = "$reql_type$";
pub const TIME_TYPE: &str = "TIME";
pub const UTC_OFFSET: &str = "+00:00";

pub type DatumObject = BTreeMap<DatumString, Datum>;

/// Microseconds since the Unix epoch.
pub type Microtime = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DatumType {
    // Declared in type-name order; the derived `Ord` is the cross-type order.
    Array,
    Bool,
    Null,
    Number,
    Object,
    Pseudo,
    String,
}

impl DatumType {
    pub fn name(self) -> &'static str {
        match self {
            Self::Array => "ARRAY",
            Self::Bool => "BOOL",
            Self::Null => "NULL",
            Self::Number => "NUMBER",
            Self::Object => "OBJECT",
            Self::Pseudo => "PTYPE",
            Self::String => "STRING",
        }
    }
}

/// Point in time with a fixed UTC offset string.
#[derive(Debug, Clone)]
pub struct TimeValue {
    pub epoch_time: f64,
    pub timezone: DatumString,
}

impl TimeValue {
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        let micros = (self.epoch_time * 1.0e6).round();
        if !micros.is_finite() { return None; }
        DateTime::<Utc>::from_timestamp_micros(micros as i64)
    }
}

/// Pseudo-types: objects the query language treats as distinct scalars.
#[derive(Debug, Clone)]
pub enum Pseudo {
    Time(TimeValue),
}

impl Pseudo {
    pub fn type_name(&self) -> &'static str {
        match self { Pseudo::Time(_) => TIME_TYPE }
    }
}

#[derive(Debug, Clone)]
pub enum Datum {
    Null,
    Bool(bool),
    Number(f64),
    String(DatumString),
    Array(Arc<Vec<Datum>>),
    Object(Arc<DatumObject>),
    Pseudo(Pseudo),
}

impl Datum {
    pub fn string(s: impl Into<DatumString>) -> Self { Datum::String(s.into()) }

    pub fn array(items: Vec<Datum>) -> Self { Datum::Array(Arc::new(items)) }

    pub fn object(fields: DatumObject) -> Self { Datum::Object(Arc::new(fields)) }

    pub fn from_pairs<K: Into<DatumString>>(pairs: impl IntoIterator<Item = (K, Datum)>) -> Self {
        Datum::object(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// TIME pseudo-datum for `epoch_time` seconds at UTC.
    pub fn time(epoch_time: f64) -> Self {
        Datum::Pseudo(Pseudo::Time(TimeValue { epoch_time, timezone: DatumString::from(UTC_OFFSET) }))
    }

    pub fn get_type(&self) -> DatumType {
        match self {
            Datum::Null => DatumType::Null,
            Datum::Bool(_) => DatumType::Bool,
            Datum::Number(_) => DatumType::Number,
            Datum::String(_) => DatumType::String,
            Datum::Array(_) => DatumType::Array,
            Datum::Object(_) => DatumType::Object,
            Datum::Pseudo(_) => DatumType::Pseudo,
        }
    }

    pub fn as_str(&self) -> Option<&DatumString> {
        match self { Datum::String(s) => Some(s), _ => None }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self { Datum::Number(n) => Some(*n), _ => None }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self { Datum::Bool(b) => Some(*b), _ => None }
    }

    pub fn as_array(&self) -> Option<&[Datum]> {
        match self { Datum::Array(items) => Some(items.as_slice()), _ => None }
    }

    pub fn as_object(&self) -> Option<&DatumObject> {
        match self { Datum::Object(fields) => Some(fields), _ => None }
    }

    /// Field lookup on objects; `None` for missing fields and non-objects.
    pub fn get_field(&self, key: &str) -> Option<&Datum> {
        self.as_object().and_then(|o| o.get(key.as_bytes()))
    }

    /// Human-readable form used in error messages.
    pub fn print(&self) -> String { self.to_string() }

    pub fn to_json(&self) -> Json {
        match self {
            Datum::Null => Json::Null,
            Datum::Bool(b) => Json::Bool(*b),
            Datum::Number(n) => number_to_json(*n),
            Datum::String(s) => Json::String(s.to_string_lossy().into_owned()),
            Datum::Array(items) => Json::Array(items.iter().map(Datum::to_json).collect()),
            Datum::Object(fields) => Json::Object(
                fields.iter().map(|(k, v)| (k.to_string_lossy().into_owned(), v.to_json())).collect(),
            ),
            Datum::Pseudo(Pseudo::Time(t)) => serde_json::json!({
                REQL_TYPE_KEY: TIME_TYPE,
                "epoch_time": number_to_json(t.epoch_time),
                "timezone": t.timezone.to_string_lossy(),
            }),
        }
    }
}

fn number_to_json(n: f64) -> Json {
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        Json::from(n as i64)
    } else {
        serde_json::Number::from_f64(n).map(Json::Number).unwrap_or(Json::Null)
    }
}

fn time_from_json(map: &serde_json::Map<String, Json>) -> Option<Datum> {
    if map.get(REQL_TYPE_KEY)?.as_str()? != TIME_TYPE || map.len() != 3 { return None; }
    let epoch_time = map.get("epoch_time")?.as_f64()?;
    let timezone = map.get("timezone")?.as_str()?;
    Some(Datum::Pseudo(Pseudo::Time(TimeValue { epoch_time, timezone: DatumString::from(timezone) })))
}

impl From<&Json> for Datum {
    fn from(v: &Json) -> Self {
        match v {
            Json::Null => Datum::Null,
            Json::Bool(b) => Datum::Bool(*b),
            Json::Number(n) => Datum::Number(n.as_f64().unwrap_or(0.0)),
            Json::String(s) => Datum::string(s.as_str()),
            Json::Array(items) => Datum::array(items.iter().map(Datum::from).collect()),
            Json::Object(map) => time_from_json(map).unwrap_or_else(|| {
                Datum::object(map.iter().map(|(k, v)| (DatumString::from(k.as_str()), Datum::from(v))).collect())
            }),
        }
    }
}

impl From<Json> for Datum {
    fn from(v: Json) -> Self { Datum::from(&v) }
}

impl From<bool> for Datum {
    fn from(b: bool) -> Self { Datum::Bool(b) }
}

impl From<f64> for Datum {
    fn from(n: f64) -> Self { Datum::Number(n) }
}

impl From<DatumString> for Datum {
    fn from(s: DatumString) -> Self { Datum::String(s) }
}

impl From<&str> for Datum {
    fn from(s: &str) -> Self { Datum::string(s) }
}

impl PartialEq for Datum {
    fn eq(&self, other: &Self) -> bool { self.cmp(other) == Ordering::Equal }
}

impl Eq for Datum {}

impl PartialOrd for Datum {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

// Zeros of either sign are equal, matching the print form. NaN still needs
// a place in the order, which `total_cmp` gives it.
fn cmp_numbers(a: f64, b: f64) -> Ordering { a.partial_cmp(&b).unwrap_or_else(|| a.total_cmp(&b)) }

impl Ord for Datum {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Datum::Null, Datum::Null) => Ordering::Equal,
            (Datum::Bool(a), Datum::Bool(b)) => a.cmp(b),
            (Datum::Number(a), Datum::Number(b)) => cmp_numbers(*a, *b),
            (Datum::String(a), Datum::String(b)) => a.cmp(b),
            (Datum::Array(a), Datum::Array(b)) => a.iter().cmp(b.iter()),
            (Datum::Object(a), Datum::Object(b)) => a.iter().cmp(b.iter()),
            (Datum::Pseudo(Pseudo::Time(a)), Datum::Pseudo(Pseudo::Time(b))) => cmp_numbers(a.epoch_time, b.epoch_time),
            _ => self.get_type().cmp(&other.get_type()),
        }
    }
}

fn write_json_str(f: &mut fmt::Formatter<'_>, s: &DatumString) -> fmt::Result {
    match serde_json::to_string(s.to_string_lossy().as_ref()) {
        Ok(quoted) => f.write_str(&quoted),
        Err(_) => Err(fmt::Error),
    }
}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Datum::Null => f.write_str("null"),
            Datum::Bool(b) => write!(f, "{}", b),
            Datum::Number(n) => write!(f, "{}", number_to_json(*n)),
            Datum::String(s) => write_json_str(f, s),
            Datum::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 { f.write_str(",")?; }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Datum::Object(fields) => {
                f.write_str("{")?;
                for (i, (k, v)) in fields.iter().enumerate() {
                    if i > 0 { f.write_str(",")?; }
                    write_json_str(f, k)?;
                    write!(f, ":{}", v)?;
                }
                f.write_str("}")
            }
            Datum::Pseudo(_) => write!(f, "{}", self.to_json()),
        }
    }
}

/// Current wall-clock time in microseconds since the epoch.
pub fn current_microtime() -> Microtime {
    Utc::now().timestamp_micros().max(0) as Microtime
}
