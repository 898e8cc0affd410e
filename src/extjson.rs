//! Conversion between BSON documents and [MongoDB Extended JSON v2](https://www.mongodb.com/docs/manual/reference/mongodb-extended-json/).
//!
//! ## Overview of Extended JSON
//!
//! MongoDB Extended JSON (abbreviated extJSON) is a format of JSON that allows for the encoding of
//! BSON type information. Normal JSON cannot unambiguously represent all BSON types losslessly, so
//! an extension was designed to include conventions for representing those types.
//!
//! For example, a BSON binary is represented by the following format:
//! ```text
//! {
//!    "$binary": {
//!        "base64": <base64 encoded payload as a string>,
//!        "subType": <subtype as a one or two character hex string>,
//!    }
//! }
//! ```
//!
//! ### Canonical and Relaxed Modes
//!
//! There are two modes of extJSON: "Canonical" and "Relaxed". They are the same except for the
//! following differences:
//!   - In relaxed mode, finite doubles and all integers are represented by the JSON number type,
//!     rather than the object notation.
//!   - In relaxed mode, the string in the datetime object notation is RFC 3339 formatted if the
//!     date falls between 1970 and 9999.
//!
//! ```rust
//! use rawbson::{extjson::{self, ExtendedJsonMode}, rawdoc};
//!
//! let doc = rawdoc! { "x" => 5, "y" => 2.5 }?;
//!
//! assert_eq!(extjson::to_json(&doc)?, r#"{"x":5,"y":2.5}"#);
//! assert_eq!(
//!     extjson::to_json_with_mode(&doc, ExtendedJsonMode::Canonical)?,
//!     r#"{"x":{"$numberInt":"5"},"y":{"$numberDouble":"2.5"}}"#,
//! );
//! # Ok::<(), rawbson::error::Error>(())
//! ```
//!
//! Canonical mode is useful when BSON values need to be round tripped without losing any type
//! information. Relaxed mode is more useful when debugging or logging BSON data.
//!
//! ## Parsing Extended JSON
//!
//! [`from_json`] accepts both canonical and relaxed extJSON, and the two modes can even be mixed
//! within a single input. Plain JSON numbers become an int32 when they fit, an int64 when they
//! are integral, and a double otherwise.
//!
//! ```rust
//! use rawbson::extjson;
//!
//! let doc = extjson::from_json(r#"{ "x": 5, "y": { "$numberLong": "5" }, "z": { "sub": "doc" } }"#)?;
//!
//! assert_eq!(doc.get_i32("x")?, 5);
//! assert_eq!(doc.get_i64("y")?, 5);
//! assert_eq!(doc.get_document("z")?.get_str("sub")?, "doc");
//! # Ok::<(), rawbson::error::Error>(())
//! ```

mod models;

use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};

use crate::{
    builder::RawBuilder,
    error::{Error, ErrorKind, Result},
    raw::{
        self,
        RawArray,
        RawBson,
        RawBsonRef,
        RawDocument,
        RawDocumentBuf,
        RawJavaScriptCodeWithScope,
    },
};

/// The output flavor of [`to_json_with_mode`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ExtendedJsonMode {
    /// Every value carries its exact BSON type.
    Canonical,

    /// Numbers and recent dates use their natural JSON form.
    #[default]
    Relaxed,
}

/// Formats `doc` as relaxed extended JSON.
pub fn to_json(doc: &RawDocument) -> Result<String> {
    to_json_with_mode(doc, ExtendedJsonMode::Relaxed)
}

/// Formats `doc` as extended JSON in the given mode.
pub fn to_json_with_mode(doc: &RawDocument, mode: ExtendedJsonMode) -> Result<String> {
    let value = to_json_value(doc, mode)?;
    serde_json::to_string(&value).map_err(Error::json_from_bson)
}

/// Converts `doc` into a [`serde_json::Value`] holding its extended JSON representation.
///
/// The whole document is validated first, so a corrupt buffer is reported instead of being
/// silently truncated.
pub fn to_json_value(doc: &RawDocument, mode: ExtendedJsonMode) -> Result<Value> {
    raw::validate(doc.as_bytes())
        .and_then(|doc| document_to_json(doc, mode))
        .map_err(|e| {
            tracing::debug!("failed converting BSON to JSON: {}", e);
            match e.kind {
                ErrorKind::Json { .. } => e,
                _ => Error::json_from_bson(e),
            }
        })
}

/// Parses extended JSON text into a document. The top-level value must be a JSON object.
pub fn from_json(json: &str) -> Result<RawDocumentBuf> {
    let value: Value = serde_json::from_str(json).map_err(|e| {
        tracing::debug!("JSON parse failure: {}", e);
        Error::json_parse(e)
    })?;
    from_json_value(value)
}

/// Converts a parsed JSON object into a document, interpreting extended JSON wrappers at every
/// level below the root.
pub fn from_json_value(value: Value) -> Result<RawDocumentBuf> {
    let map = match value {
        Value::Object(map) => map,
        other => {
            return Err(Error::json_parse(format!(
                "expected a JSON object at the top level, got {}",
                other
            )))
        }
    };

    let mut builder = RawBuilder::new_document();
    append_members(&mut builder, map).map_err(|e| {
        tracing::debug!("JSON parse failure: {}", e);
        match e.kind {
            ErrorKind::Json { .. } => e,
            _ => Error::json_parse(e),
        }
    })?;
    builder.extract_document()
}

fn document_to_json(doc: &RawDocument, mode: ExtendedJsonMode) -> Result<Value> {
    let mut map = Map::new();
    for element in doc {
        let value = element.value()?;
        map.insert(element.key()?.to_string(), bson_to_json(value, mode)?);
    }
    Ok(Value::Object(map))
}

fn array_to_json(array: &RawArray, mode: ExtendedJsonMode) -> Result<Value> {
    array
        .iter()
        .map(|element| bson_to_json(element.value()?, mode))
        .collect::<Result<Vec<_>>>()
        .map(Value::Array)
}

fn bson_to_json(value: RawBsonRef<'_>, mode: ExtendedJsonMode) -> Result<Value> {
    let canonical = mode == ExtendedJsonMode::Canonical;
    Ok(match value {
        RawBsonRef::Double(v) if v.is_nan() => {
            let s = if v.is_sign_negative() { "-NaN" } else { "NaN" };
            json!({ "$numberDouble": s })
        }
        RawBsonRef::Double(v) if v.is_infinite() => {
            let s = if v.is_sign_negative() {
                "-Infinity"
            } else {
                "Infinity"
            };
            json!({ "$numberDouble": s })
        }
        RawBsonRef::Double(v) if canonical => {
            let mut s = v.to_string();
            if v.fract() == 0.0 {
                s.push_str(".0");
            }
            json!({ "$numberDouble": s })
        }
        RawBsonRef::Double(v) => json!(v),
        RawBsonRef::String(s) => json!(s),
        RawBsonRef::Array(array) => array_to_json(array, mode)?,
        RawBsonRef::Document(doc) => document_to_json(doc, mode)?,
        RawBsonRef::Boolean(b) => json!(b),
        RawBsonRef::Null => Value::Null,
        RawBsonRef::RegularExpression(regex) => {
            let mut options: Vec<char> = regex.options.chars().collect();
            options.sort_unstable();
            json!({
                "$regularExpression": {
                    "pattern": regex.pattern,
                    "options": options.into_iter().collect::<String>(),
                }
            })
        }
        RawBsonRef::JavaScriptCode(code) => json!({ "$code": code }),
        RawBsonRef::JavaScriptCodeWithScope(code_w_scope) => json!({
            "$code": code_w_scope.code,
            "$scope": document_to_json(code_w_scope.scope, mode)?,
        }),
        RawBsonRef::Int32(v) if canonical => json!({ "$numberInt": v.to_string() }),
        RawBsonRef::Int32(v) => json!(v),
        RawBsonRef::Int64(v) if canonical => json!({ "$numberLong": v.to_string() }),
        RawBsonRef::Int64(v) => json!(v),
        RawBsonRef::Timestamp(ts) => json!({
            "$timestamp": {
                "t": ts.time,
                "i": ts.increment,
            }
        }),
        RawBsonRef::Binary(binary) => json!({
            "$binary": {
                "base64": binary.to_binary().to_base64(),
                "subType": hex::encode([u8::from(binary.subtype)]),
            }
        }),
        RawBsonRef::ObjectId(oid) => json!({ "$oid": oid.to_hex() }),
        RawBsonRef::DateTime(dt) => {
            let rfc3339 = !canonical
                && dt.timestamp_millis() >= 0
                && dt.to_time_opt().is_some_and(|t| t.year() <= 9999);
            if rfc3339 {
                json!({ "$date": dt.try_to_rfc3339_string()? })
            } else {
                json!({ "$date": { "$numberLong": dt.timestamp_millis().to_string() } })
            }
        }
        RawBsonRef::Symbol(s) => json!({ "$symbol": s }),
        RawBsonRef::Decimal128(d) => json!({ "$numberDecimal": d.to_string() }),
        RawBsonRef::Undefined => json!({ "$undefined": true }),
        RawBsonRef::MaxKey => json!({ "$maxKey": 1 }),
        RawBsonRef::MinKey => json!({ "$minKey": 1 }),
        RawBsonRef::DbPointer(db_pointer) => json!({
            "$dbPointer": {
                "$ref": db_pointer.namespace,
                "$id": { "$oid": db_pointer.id.to_hex() },
            }
        }),
    })
}

/// Keys that mark an object as an extended JSON wrapper rather than a plain document.
const WRAPPER_KEYS: &[&str] = &[
    "$oid",
    "$symbol",
    "$numberInt",
    "$numberLong",
    "$numberDouble",
    "$numberDecimal",
    "$binary",
    "$uuid",
    "$code",
    "$timestamp",
    "$regularExpression",
    "$dbPointer",
    "$date",
    "$minKey",
    "$maxKey",
    "$undefined",
];

fn append_members(builder: &mut RawBuilder, map: Map<String, Value>) -> Result<()> {
    for (key, value) in map {
        builder.key(key.as_str())?;
        append_json(builder, value)?;
    }
    Ok(())
}

fn append_json(builder: &mut RawBuilder, value: Value) -> Result<()> {
    match value {
        Value::Null => {
            builder.append(RawBsonRef::Null)?;
        }
        Value::Bool(b) => {
            builder.append(b)?;
        }
        Value::Number(n) => {
            builder.append(number_to_bson(&n)?)?;
        }
        Value::String(s) => {
            builder.append(s.as_str())?;
        }
        Value::Array(items) => {
            builder.open_array()?;
            for item in items {
                append_json(builder, item)?;
            }
            builder.close_array()?;
        }
        Value::Object(map) if map.keys().any(|k| WRAPPER_KEYS.contains(&k.as_str())) => {
            let value = parse_wrapper(map)?;
            builder.append(&value)?;
        }
        Value::Object(map) => {
            builder.open_document()?;
            append_members(builder, map)?;
            builder.close_document()?;
        }
    }
    Ok(())
}

fn number_to_bson(n: &serde_json::Number) -> Result<RawBsonRef<'static>> {
    if let Some(i) = n.as_i64() {
        return Ok(match i32::try_from(i) {
            Ok(i) => RawBsonRef::Int32(i),
            Err(_) => RawBsonRef::Int64(i),
        });
    }
    n.as_f64()
        .map(RawBsonRef::Double)
        .ok_or_else(|| Error::json_parse(format!("number {} cannot be represented in BSON", n)))
}

fn model<T: DeserializeOwned>(map: Map<String, Value>) -> Result<T> {
    serde_json::from_value(Value::Object(map)).map_err(Error::json_parse)
}

fn parse_wrapper(map: Map<String, Value>) -> Result<RawBson> {
    if map.contains_key("$oid") {
        return Ok(RawBson::ObjectId(model::<models::ObjectId>(map)?.parse()?));
    }

    if map.contains_key("$symbol") {
        return Ok(RawBson::Symbol(model::<models::Symbol>(map)?.value));
    }

    if map.contains_key("$numberInt") {
        return Ok(RawBson::Int32(model::<models::Int32>(map)?.parse()?));
    }

    if map.contains_key("$numberLong") {
        return Ok(RawBson::Int64(model::<models::Int64>(map)?.parse()?));
    }

    if map.contains_key("$numberDouble") {
        return Ok(RawBson::Double(model::<models::Double>(map)?.parse()?));
    }

    if map.contains_key("$numberDecimal") {
        return Ok(RawBson::Decimal128(
            model::<models::Decimal128>(map)?.parse()?,
        ));
    }

    if map.contains_key("$binary") {
        let binary = if map.contains_key("$type") {
            model::<models::LegacyBinary>(map)?.parse()?
        } else {
            model::<models::Binary>(map)?.parse()?
        };
        return Ok(RawBson::Binary(binary));
    }

    if map.contains_key("$uuid") {
        return Ok(RawBson::Binary(model::<models::Uuid>(map)?.parse()?));
    }

    if map.contains_key("$code") {
        let code = model::<models::JavaScriptCodeWithScope>(map)?;
        return Ok(match code.scope {
            None => RawBson::JavaScriptCode(code.code),
            Some(scope) => RawBson::JavaScriptCodeWithScope(RawJavaScriptCodeWithScope {
                code: code.code,
                scope: from_json_value(Value::Object(scope))?,
            }),
        });
    }

    if map.contains_key("$timestamp") {
        return Ok(RawBson::Timestamp(model::<models::Timestamp>(map)?.parse()));
    }

    if map.contains_key("$regularExpression") {
        return Ok(RawBson::RegularExpression(
            model::<models::Regex>(map)?.parse(),
        ));
    }

    if map.contains_key("$dbPointer") {
        return Ok(RawBson::DbPointer(model::<models::DbPointer>(map)?.parse()?));
    }

    if map.contains_key("$date") {
        return Ok(RawBson::DateTime(model::<models::DateTime>(map)?.parse()?));
    }

    if map.contains_key("$minKey") {
        return model::<models::MinKey>(map)?.parse();
    }

    if map.contains_key("$maxKey") {
        return model::<models::MaxKey>(map)?.parse();
    }

    model::<models::Undefined>(map)?.parse()
}
