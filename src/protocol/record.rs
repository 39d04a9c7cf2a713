//! Records and typed field access
//!
//! A record is one entity in a listing reply, e.g. one client in
//! `clientlist`. Fields are looked up by name, never by position.
//!
//! ```text
//! clid=5 cid=1 client_database_id=2 client_nickname=Dr.\sHouse client_type=0
//! └─┬──┘                            └────────────┬──────────────┘
//!  key=value                          value still escaped until accessed
//! ```

use std::str::FromStr;

use serde_json::{Map, Value};

use crate::error::{QueryError, Result};
use super::escape::decode;

/// How the values of a record are encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldEncoding {
    /// ServerQuery escape table (TCP transport)
    Escaped,

    /// Already plain text (WebQuery JSON)
    Plain,
}

/// Ordered field map of a single entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, String)>,
    encoding: FieldEncoding,
}

impl Record {
    /// Parse one record of space-delimited `key=value` tokens
    ///
    /// Only the first `=` separates key from value. A token without `=` is
    /// kept as a flag with an empty value.
    pub fn parse(text: &str) -> Self {
        let fields = text
            .split(' ')
            .filter(|token| !token.is_empty())
            .map(|token| match token.split_once('=') {
                Some((key, value)) => (key.to_string(), value.to_string()),
                None => (token.to_string(), String::new()),
            })
            .collect();

        Self {
            fields,
            encoding: FieldEncoding::Escaped,
        }
    }

    /// Build a record from a WebQuery JSON object
    ///
    /// Scalars are stringified; `null` fields are treated as absent.
    pub fn from_json(object: &Map<String, Value>) -> Self {
        let fields = object
            .iter()
            .filter_map(|(key, value)| {
                let text = match value {
                    Value::Null => return None,
                    Value::String(s) => s.clone(),
                    Value::Bool(b) => (if *b { "1" } else { "0" }).to_string(),
                    other => other.to_string(),
                };
                Some((key.clone(), text))
            })
            .collect();

        Self {
            fields,
            encoding: FieldEncoding::Plain,
        }
    }

    /// Build a record from already-decoded pairs
    pub fn from_pairs<K: Into<String>, V: Into<String>>(pairs: impl IntoIterator<Item = (K, V)>) -> Self {
        Self {
            fields: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
            encoding: FieldEncoding::Plain,
        }
    }

    pub fn encoding(&self) -> FieldEncoding {
        self.encoding
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.iter().any(|(key, _)| key == field)
    }

    /// Field names in wire order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(key, _)| key.as_str())
    }

    /// The value exactly as received
    pub fn raw(&self, field: &str) -> Result<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == field)
            .map(|(_, value)| value.as_str())
            .ok_or_else(|| QueryError::MissingField(field.to_string()))
    }

    /// Decoded string value
    pub fn string(&self, field: &str) -> Result<String> {
        let raw = self.raw(field)?;
        Ok(match self.encoding {
            FieldEncoding::Escaped => decode(raw),
            FieldEncoding::Plain => raw.to_string(),
        })
    }

    /// Decoded value parsed through `FromStr`
    pub fn parse_field<T>(&self, field: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let value = self.string(field)?;
        value
            .trim()
            .parse::<T>()
            .map_err(|e| QueryError::malformed(field, &value, e))
    }

    /// Base-10 integer field
    pub fn int(&self, field: &str) -> Result<i64> {
        self.parse_field(field)
    }

    /// `"1"` / `"0"` boolean field
    pub fn flag(&self, field: &str) -> Result<bool> {
        let value = self.string(field)?;
        match value.as_str() {
            "1" => Ok(true),
            "0" => Ok(false),
            _ => Err(QueryError::malformed(field, &value, "expected 0 or 1")),
        }
    }

    /// Integer field mapped onto an enum
    pub fn int_enum<T>(&self, field: &str) -> Result<T>
    where
        T: TryFrom<i64>,
    {
        let value = self.int(field)?;
        T::try_from(value).map_err(|_| {
            QueryError::malformed(field, &value.to_string(), "unknown enum value")
        })
    }

    /// Like [`Record::string`], but an absent field is `None`
    pub fn opt_string(&self, field: &str) -> Result<Option<String>> {
        optional(self.string(field))
    }

    /// Like [`Record::int`], but an absent field is `None`
    pub fn opt_int(&self, field: &str) -> Result<Option<i64>> {
        optional(self.int(field))
    }
}

/// Turn `MissingField` into `None`, keep every other outcome
fn optional<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(QueryError::MissingField(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Types that can be built from a single record
pub trait FromRecord: Sized {
    fn from_record(record: &Record) -> Result<Self>;
}

/// Convert every record, logging and skipping the ones that fail to parse
pub fn collect_records<T: FromRecord>(records: &[Record]) -> Vec<T> {
    records
        .iter()
        .filter_map(|record| match T::from_record(record) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!(
                    "Skipping {} record: {}",
                    std::any::type_name::<T>().rsplit("::").next().unwrap_or("unknown"),
                    e
                );
                None
            }
        })
        .collect()
}
