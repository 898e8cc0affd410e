//! A module defining serde models for the extended JSON representations of the various BSON types.

use serde::Deserialize;

use crate::{
    error::{Error, Result},
    oid,
    raw::{self, RawBson},
    spec::BinarySubtype,
};

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Int32 {
    #[serde(rename = "$numberInt")]
    value: String,
}

impl Int32 {
    pub(crate) fn parse(self) -> Result<i32> {
        self.value
            .parse()
            .map_err(|_| Error::json_parse(format!("expected i32 as a string, got {:?}", self.value)))
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Int64 {
    #[serde(rename = "$numberLong")]
    value: String,
}

impl Int64 {
    pub(crate) fn parse(self) -> Result<i64> {
        self.value
            .parse()
            .map_err(|_| Error::json_parse(format!("expected i64 as a string, got {:?}", self.value)))
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Double {
    #[serde(rename = "$numberDouble")]
    value: String,
}

impl Double {
    pub(crate) fn parse(self) -> Result<f64> {
        match self.value.as_str() {
            "Infinity" => Ok(f64::INFINITY),
            "-Infinity" => Ok(f64::NEG_INFINITY),
            "NaN" | "-NaN" => Ok(f64::NAN),
            other => other.parse().map_err(|_| {
                Error::json_parse(format!("expected bson double as string, got {:?}", other))
            }),
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Decimal128 {
    #[serde(rename = "$numberDecimal")]
    value: String,
}

impl Decimal128 {
    pub(crate) fn parse(self) -> Result<crate::Decimal128> {
        self.value
            .parse()
            .map_err(|e: Error| Error::json_parse(format!("{:?}: {}", self.value, e)))
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ObjectId {
    #[serde(rename = "$oid")]
    oid: String,
}

impl ObjectId {
    pub(crate) fn parse(self) -> Result<oid::ObjectId> {
        oid::ObjectId::parse_str(self.oid.as_str()).map_err(Error::json_parse)
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Symbol {
    #[serde(rename = "$symbol")]
    pub(crate) value: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Regex {
    #[serde(rename = "$regularExpression")]
    body: RegexBody,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RegexBody {
    pattern: String,
    options: String,
}

impl Regex {
    pub(crate) fn parse(self) -> raw::Regex {
        raw::Regex::new(self.body.pattern, self.body.options)
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Binary {
    #[serde(rename = "$binary")]
    body: BinaryBody,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct BinaryBody {
    base64: String,
    #[serde(rename = "subType")]
    subtype: String,
}

/// The pre-v2 form `{"$binary": "<base64>", "$type": "<hex>"}`.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct LegacyBinary {
    #[serde(rename = "$binary")]
    base64: String,
    #[serde(rename = "$type")]
    subtype: String,
}

fn parse_subtype(subtype: &str) -> Result<BinarySubtype> {
    let bytes = hex::decode(subtype).map_err(|_| {
        Error::json_parse(format!("expected hexadecimal subtype, got {:?}", subtype))
    })?;
    match bytes.as_slice() {
        [byte] => Ok(BinarySubtype::from(*byte)),
        _ => Err(Error::json_parse(format!(
            "expected one byte subtype, got {:?}",
            subtype
        ))),
    }
}

fn parse_binary(base64: &str, subtype: &str) -> Result<crate::Binary> {
    let subtype = parse_subtype(subtype)?;
    crate::Binary::from_base64(base64, subtype).map_err(Error::json_parse)
}

impl Binary {
    pub(crate) fn parse(self) -> Result<crate::Binary> {
        parse_binary(&self.body.base64, &self.body.subtype)
    }
}

impl LegacyBinary {
    pub(crate) fn parse(self) -> Result<crate::Binary> {
        parse_binary(&self.base64, &self.subtype)
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Uuid {
    #[serde(rename = "$uuid")]
    value: String,
}

impl Uuid {
    pub(crate) fn parse(self) -> Result<crate::Binary> {
        let uuid = uuid::Uuid::parse_str(&self.value).map_err(|_| {
            Error::json_parse(format!(
                "$uuid value {:?} does not follow RFC 4122 format regarding length and hyphens",
                self.value
            ))
        })?;
        Ok(crate::Binary::from_uuid(uuid))
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct JavaScriptCodeWithScope {
    #[serde(rename = "$code")]
    pub(crate) code: String,

    #[serde(rename = "$scope")]
    #[serde(default)]
    pub(crate) scope: Option<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Timestamp {
    #[serde(rename = "$timestamp")]
    body: TimestampBody,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TimestampBody {
    t: u32,
    i: u32,
}

impl Timestamp {
    pub(crate) fn parse(self) -> crate::Timestamp {
        crate::Timestamp {
            time: self.body.t,
            increment: self.body.i,
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct DateTime {
    #[serde(rename = "$date")]
    body: DateTimeBody,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DateTimeBody {
    Canonical(Int64),
    Relaxed(String),
}

impl DateTime {
    pub(crate) fn parse(self) -> Result<crate::DateTime> {
        match self.body {
            DateTimeBody::Canonical(date) => Ok(crate::DateTime::from_millis(date.parse()?)),
            DateTimeBody::Relaxed(date) => {
                crate::DateTime::parse_rfc3339_str(&date).map_err(|_| {
                    Error::json_parse(format!(
                        "expected rfc3339 formatted utc datetime, got {:?}",
                        date
                    ))
                })
            }
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct MinKey {
    #[serde(rename = "$minKey")]
    value: u8,
}

impl MinKey {
    pub(crate) fn parse(self) -> Result<RawBson> {
        if self.value == 1 {
            Ok(RawBson::MinKey)
        } else {
            Err(Error::json_parse("value of $minKey should always be 1"))
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct MaxKey {
    #[serde(rename = "$maxKey")]
    value: u8,
}

impl MaxKey {
    pub(crate) fn parse(self) -> Result<RawBson> {
        if self.value == 1 {
            Ok(RawBson::MaxKey)
        } else {
            Err(Error::json_parse("value of $maxKey should always be 1"))
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct DbPointer {
    #[serde(rename = "$dbPointer")]
    body: DbPointerBody,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct DbPointerBody {
    #[serde(rename = "$ref")]
    ref_ns: String,

    #[serde(rename = "$id")]
    id: ObjectId,
}

impl DbPointer {
    pub(crate) fn parse(self) -> Result<raw::DbPointer> {
        Ok(raw::DbPointer {
            namespace: self.body.ref_ns,
            id: self.body.id.parse()?,
        })
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Undefined {
    #[serde(rename = "$undefined")]
    value: bool,
}

impl Undefined {
    pub(crate) fn parse(self) -> Result<RawBson> {
        if self.value {
            Ok(RawBson::Undefined)
        } else {
            Err(Error::json_parse("$undefined should always be true"))
        }
    }
}
