use crate::{
    error::{BuilderErrorKind, Error, Result},
    oid::ObjectId,
    spec::{BinarySubtype, ElementType},
    Binary,
    DateTime,
    Decimal128,
    Timestamp,
};

use super::{
    bson::sort_options,
    write_cstring,
    write_string,
    DbPointer,
    RawArray,
    RawArrayBuf,
    RawBson,
    RawDocument,
    RawDocumentBuf,
    RawJavaScriptCodeWithScope,
    Regex,
};

/// A BSON value referencing raw bytes stored elsewhere.
///
/// The default value is [`RawBsonRef::Null`]. Equality compares the element type first, so values
/// of different types are never equal (`Int32(1) != Double(1.0)`); doubles compare by their bit
/// pattern.
#[derive(Debug, Clone, Copy, Default)]
pub enum RawBsonRef<'a> {
    /// 64-bit binary floating point
    Double(f64),
    /// UTF-8 string
    String(&'a str),
    /// Array
    Array(&'a RawArray),
    /// Embedded document
    Document(&'a RawDocument),
    /// Boolean value
    Boolean(bool),
    /// Null value
    #[default]
    Null,
    /// Regular expression
    RegularExpression(RawRegexRef<'a>),
    /// JavaScript code
    JavaScriptCode(&'a str),
    /// JavaScript code w/ scope
    JavaScriptCodeWithScope(RawJavaScriptCodeWithScopeRef<'a>),
    /// 32-bit signed integer
    Int32(i32),
    /// 64-bit signed integer
    Int64(i64),
    /// Timestamp
    Timestamp(Timestamp),
    /// Binary data
    Binary(RawBinaryRef<'a>),
    /// [ObjectId](http://dochub.mongodb.org/core/objectids)
    ObjectId(ObjectId),
    /// UTC datetime
    DateTime(DateTime),
    /// Symbol (Deprecated)
    Symbol(&'a str),
    /// [128-bit decimal floating point](https://github.com/mongodb/specifications/blob/master/source/bson-decimal128/decimal128.md)
    Decimal128(Decimal128),
    /// Undefined value (Deprecated)
    Undefined,
    /// Max key
    MaxKey,
    /// Min key
    MinKey,
    /// DBPointer (Deprecated)
    DbPointer(RawDbPointerRef<'a>),
}

impl<'a> RawBsonRef<'a> {
    /// Get the [`ElementType`] of this value.
    pub fn element_type(&self) -> ElementType {
        match *self {
            RawBsonRef::Double(..) => ElementType::Double,
            RawBsonRef::String(..) => ElementType::String,
            RawBsonRef::Array(..) => ElementType::Array,
            RawBsonRef::Document(..) => ElementType::EmbeddedDocument,
            RawBsonRef::Boolean(..) => ElementType::Boolean,
            RawBsonRef::Null => ElementType::Null,
            RawBsonRef::RegularExpression(..) => ElementType::RegularExpression,
            RawBsonRef::JavaScriptCode(..) => ElementType::JavaScriptCode,
            RawBsonRef::JavaScriptCodeWithScope(..) => ElementType::JavaScriptCodeWithScope,
            RawBsonRef::Int32(..) => ElementType::Int32,
            RawBsonRef::Int64(..) => ElementType::Int64,
            RawBsonRef::Timestamp(..) => ElementType::Timestamp,
            RawBsonRef::Binary(..) => ElementType::Binary,
            RawBsonRef::ObjectId(..) => ElementType::ObjectId,
            RawBsonRef::DateTime(..) => ElementType::DateTime,
            RawBsonRef::Symbol(..) => ElementType::Symbol,
            RawBsonRef::Decimal128(..) => ElementType::Decimal128,
            RawBsonRef::Undefined => ElementType::Undefined,
            RawBsonRef::MaxKey => ElementType::MaxKey,
            RawBsonRef::MinKey => ElementType::MinKey,
            RawBsonRef::DbPointer(..) => ElementType::DbPointer,
        }
    }

    /// Gets the `f64` that's referenced or returns [`None`] if the referenced value isn't a BSON
    /// double.
    pub fn as_f64(self) -> Option<f64> {
        match self {
            RawBsonRef::Double(d) => Some(d),
            _ => None,
        }
    }

    /// Gets the `&str` that's referenced or returns [`None`] if the referenced value isn't a BSON
    /// String.
    pub fn as_str(self) -> Option<&'a str> {
        match self {
            RawBsonRef::String(s) => Some(s),
            _ => None,
        }
    }

    /// Gets the [`RawArray`] that's referenced or returns [`None`] if the referenced value
    /// isn't a BSON array.
    pub fn as_array(self) -> Option<&'a RawArray> {
        match self {
            RawBsonRef::Array(v) => Some(v),
            _ => None,
        }
    }

    /// Gets the [`RawDocument`] that's referenced or returns [`None`] if the referenced value
    /// isn't a BSON document.
    pub fn as_document(self) -> Option<&'a RawDocument> {
        match self {
            RawBsonRef::Document(v) => Some(v),
            _ => None,
        }
    }

    /// Gets the `bool` that's referenced or returns [`None`] if the referenced value isn't a BSON
    /// boolean.
    pub fn as_bool(self) -> Option<bool> {
        match self {
            RawBsonRef::Boolean(v) => Some(v),
            _ => None,
        }
    }

    /// Gets the `i32` that's referenced or returns [`None`] if the referenced value isn't a BSON
    /// Int32.
    pub fn as_i32(self) -> Option<i32> {
        match self {
            RawBsonRef::Int32(v) => Some(v),
            _ => None,
        }
    }

    /// Gets the `i64` that's referenced or returns [`None`] if the referenced value isn't a BSON
    /// Int64.
    pub fn as_i64(self) -> Option<i64> {
        match self {
            RawBsonRef::Int64(v) => Some(v),
            _ => None,
        }
    }

    /// Gets the [`ObjectId`] that's referenced or returns [`None`] if the referenced value isn't a
    /// BSON ObjectID.
    pub fn as_object_id(self) -> Option<ObjectId> {
        match self {
            RawBsonRef::ObjectId(v) => Some(v),
            _ => None,
        }
    }

    /// Gets the [`RawBinaryRef`] that's referenced or returns [`None`] if the referenced value
    /// isn't a BSON binary.
    pub fn as_binary(self) -> Option<RawBinaryRef<'a>> {
        match self {
            RawBsonRef::Binary(v) => Some(v),
            _ => None,
        }
    }

    /// Gets the [`RawRegexRef`] that's referenced or returns [`None`] if the referenced value isn't
    /// a BSON regular expression.
    pub fn as_regex(self) -> Option<RawRegexRef<'a>> {
        match self {
            RawBsonRef::RegularExpression(v) => Some(v),
            _ => None,
        }
    }

    /// Gets the [`DateTime`] that's referenced or returns [`None`] if the referenced value isn't a
    /// BSON datetime.
    pub fn as_datetime(self) -> Option<DateTime> {
        match self {
            RawBsonRef::DateTime(v) => Some(v),
            _ => None,
        }
    }

    /// Gets the symbol that's referenced or returns [`None`] if the referenced value isn't a BSON
    /// symbol.
    pub fn as_symbol(self) -> Option<&'a str> {
        match self {
            RawBsonRef::Symbol(v) => Some(v),
            _ => None,
        }
    }

    /// Gets the [`Timestamp`] that's referenced or returns [`None`] if the referenced value isn't
    /// a BSON timestamp.
    pub fn as_timestamp(self) -> Option<Timestamp> {
        match self {
            RawBsonRef::Timestamp(timestamp) => Some(timestamp),
            _ => None,
        }
    }

    /// Gets the [`Decimal128`] that's referenced or returns [`None`] if the referenced value isn't
    /// a BSON decimal128.
    pub fn as_decimal128(self) -> Option<Decimal128> {
        match self {
            RawBsonRef::Decimal128(d) => Some(d),
            _ => None,
        }
    }

    /// Returns `Some(())` if this value is null, otherwise [`None`].
    pub fn as_null(self) -> Option<()> {
        match self {
            RawBsonRef::Null => Some(()),
            _ => None,
        }
    }

    /// Returns `Some(())` if this value is undefined, otherwise [`None`].
    pub fn as_undefined(self) -> Option<()> {
        match self {
            RawBsonRef::Undefined => Some(()),
            _ => None,
        }
    }

    /// Returns `Some(())` if this value is max key, otherwise [`None`].
    pub fn as_max_key(self) -> Option<()> {
        match self {
            RawBsonRef::MaxKey => Some(()),
            _ => None,
        }
    }

    /// Returns `Some(())` if this value is min key, otherwise [`None`].
    pub fn as_min_key(self) -> Option<()> {
        match self {
            RawBsonRef::MinKey => Some(()),
            _ => None,
        }
    }

    /// Gets the [`RawDbPointerRef`] that's referenced or returns [`None`] if the referenced value
    /// isn't a BSON DB pointer.
    pub fn as_db_pointer(self) -> Option<RawDbPointerRef<'a>> {
        match self {
            RawBsonRef::DbPointer(d) => Some(d),
            _ => None,
        }
    }

    /// Gets the code that's referenced or returns [`None`] if the referenced value isn't a BSON
    /// JavaScript.
    pub fn as_javascript(self) -> Option<&'a str> {
        match self {
            RawBsonRef::JavaScriptCode(s) => Some(s),
            _ => None,
        }
    }

    /// Gets the [`RawJavaScriptCodeWithScopeRef`] that's referenced or returns [`None`] if the
    /// referenced value isn't a BSON JavaScript with scope.
    pub fn as_javascript_with_scope(self) -> Option<RawJavaScriptCodeWithScopeRef<'a>> {
        match self {
            RawBsonRef::JavaScriptCodeWithScope(s) => Some(s),
            _ => None,
        }
    }

    fn get_with<T>(
        self,
        expected: ElementType,
        f: impl FnOnce(Self) -> Option<T>,
    ) -> Result<T> {
        let actual = self.element_type();
        f(self).ok_or_else(|| Error::value_access_unexpected_type(actual, expected))
    }

    /// Gets the double, failing with "need element type double" for any other type.
    pub fn get_f64(self) -> Result<f64> {
        self.get_with(ElementType::Double, Self::as_f64)
    }

    /// Gets the string.
    pub fn get_str(self) -> Result<&'a str> {
        self.get_with(ElementType::String, Self::as_str)
    }

    /// Gets the embedded document.
    pub fn get_document(self) -> Result<&'a RawDocument> {
        self.get_with(ElementType::EmbeddedDocument, Self::as_document)
    }

    /// Gets the array.
    pub fn get_array(self) -> Result<&'a RawArray> {
        self.get_with(ElementType::Array, Self::as_array)
    }

    /// Gets the binary payload.
    pub fn get_binary(self) -> Result<RawBinaryRef<'a>> {
        self.get_with(ElementType::Binary, Self::as_binary)
    }

    /// Succeeds if the value is undefined.
    pub fn get_undefined(self) -> Result<()> {
        self.get_with(ElementType::Undefined, Self::as_undefined)
    }

    /// Gets the ObjectId.
    pub fn get_object_id(self) -> Result<ObjectId> {
        self.get_with(ElementType::ObjectId, Self::as_object_id)
    }

    /// Gets the boolean.
    pub fn get_bool(self) -> Result<bool> {
        self.get_with(ElementType::Boolean, Self::as_bool)
    }

    /// Gets the datetime.
    pub fn get_datetime(self) -> Result<DateTime> {
        self.get_with(ElementType::DateTime, Self::as_datetime)
    }

    /// Succeeds if the value is null.
    pub fn get_null(self) -> Result<()> {
        self.get_with(ElementType::Null, Self::as_null)
    }

    /// Gets the regular expression.
    pub fn get_regex(self) -> Result<RawRegexRef<'a>> {
        self.get_with(ElementType::RegularExpression, Self::as_regex)
    }

    /// Gets the DB pointer.
    pub fn get_db_pointer(self) -> Result<RawDbPointerRef<'a>> {
        self.get_with(ElementType::DbPointer, Self::as_db_pointer)
    }

    /// Gets the JavaScript code.
    pub fn get_javascript_code(self) -> Result<&'a str> {
        self.get_with(ElementType::JavaScriptCode, Self::as_javascript)
    }

    /// Gets the symbol.
    pub fn get_symbol(self) -> Result<&'a str> {
        self.get_with(ElementType::Symbol, Self::as_symbol)
    }

    /// Gets the JavaScript code with scope.
    pub fn get_javascript_code_with_scope(self) -> Result<RawJavaScriptCodeWithScopeRef<'a>> {
        self.get_with(
            ElementType::JavaScriptCodeWithScope,
            Self::as_javascript_with_scope,
        )
    }

    /// Gets the 32-bit integer.
    pub fn get_i32(self) -> Result<i32> {
        self.get_with(ElementType::Int32, Self::as_i32)
    }

    /// Gets the timestamp.
    pub fn get_timestamp(self) -> Result<Timestamp> {
        self.get_with(ElementType::Timestamp, Self::as_timestamp)
    }

    /// Gets the 64-bit integer.
    pub fn get_i64(self) -> Result<i64> {
        self.get_with(ElementType::Int64, Self::as_i64)
    }

    /// Gets the decimal128.
    pub fn get_decimal128(self) -> Result<Decimal128> {
        self.get_with(ElementType::Decimal128, Self::as_decimal128)
    }

    /// Succeeds if the value is max key.
    pub fn get_max_key(self) -> Result<()> {
        self.get_with(ElementType::MaxKey, Self::as_max_key)
    }

    /// Succeeds if the value is min key.
    pub fn get_min_key(self) -> Result<()> {
        self.get_with(ElementType::MinKey, Self::as_min_key)
    }

    /// Convert this [`RawBsonRef`] to the equivalent [`RawBson`], copying every referenced byte.
    pub fn to_raw_bson(self) -> RawBson {
        match self {
            RawBsonRef::Double(d) => RawBson::Double(d),
            RawBsonRef::String(s) => RawBson::String(s.to_string()),
            RawBsonRef::Array(a) => RawBson::Array(a.to_owned()),
            RawBsonRef::Document(d) => RawBson::Document(d.to_owned()),
            RawBsonRef::Boolean(b) => RawBson::Boolean(b),
            RawBsonRef::Null => RawBson::Null,
            RawBsonRef::RegularExpression(re) => RawBson::RegularExpression(Regex {
                pattern: re.pattern.to_string(),
                options: re.options.to_string(),
            }),
            RawBsonRef::JavaScriptCode(c) => RawBson::JavaScriptCode(c.to_owned()),
            RawBsonRef::JavaScriptCodeWithScope(c_w_s) => {
                RawBson::JavaScriptCodeWithScope(RawJavaScriptCodeWithScope {
                    code: c_w_s.code.to_string(),
                    scope: c_w_s.scope.to_owned(),
                })
            }
            RawBsonRef::Int32(i) => RawBson::Int32(i),
            RawBsonRef::Int64(i) => RawBson::Int64(i),
            RawBsonRef::Timestamp(t) => RawBson::Timestamp(t),
            RawBsonRef::Binary(b) => RawBson::Binary(Binary {
                bytes: b.bytes.to_vec(),
                subtype: b.subtype,
            }),
            RawBsonRef::ObjectId(o) => RawBson::ObjectId(o),
            RawBsonRef::DateTime(dt) => RawBson::DateTime(dt),
            RawBsonRef::Symbol(s) => RawBson::Symbol(s.to_string()),
            RawBsonRef::Decimal128(d) => RawBson::Decimal128(d),
            RawBsonRef::Undefined => RawBson::Undefined,
            RawBsonRef::MaxKey => RawBson::MaxKey,
            RawBsonRef::MinKey => RawBson::MinKey,
            RawBsonRef::DbPointer(d) => RawBson::DbPointer(DbPointer {
                namespace: d.namespace.to_string(),
                id: d.id,
            }),
        }
    }

    /// The number of bytes [`RawBsonRef::append_to`] will write.
    pub(crate) fn encoded_len(&self) -> usize {
        match self {
            RawBsonRef::Double(_)
            | RawBsonRef::Int64(_)
            | RawBsonRef::DateTime(_)
            | RawBsonRef::Timestamp(_) => 8,
            RawBsonRef::Int32(_) => 4,
            RawBsonRef::Boolean(_) => 1,
            RawBsonRef::ObjectId(_) => 12,
            RawBsonRef::Decimal128(_) => 16,
            RawBsonRef::Null | RawBsonRef::Undefined | RawBsonRef::MaxKey | RawBsonRef::MinKey => 0,
            RawBsonRef::String(s) | RawBsonRef::JavaScriptCode(s) | RawBsonRef::Symbol(s) => {
                4 + s.len() + 1
            }
            RawBsonRef::Document(d) => d.as_bytes().len(),
            RawBsonRef::Array(a) => a.as_bytes().len(),
            RawBsonRef::Binary(b) => 4 + 1 + b.payload_len(),
            RawBsonRef::RegularExpression(re) => re.pattern.len() + 1 + re.options.len() + 1,
            RawBsonRef::DbPointer(d) => 4 + d.namespace.len() + 1 + 12,
            RawBsonRef::JavaScriptCodeWithScope(cws) => {
                4 + 4 + cws.code.len() + 1 + cws.scope.as_bytes().len()
            }
        }
    }

    /// Checks that this value can be written as well-formed BSON: cstrings without interior NUL,
    /// lengths that fit in an int32, and embedded documents that carry valid framing.
    pub(crate) fn check_encodable(&self) -> Result<()> {
        let length = self.encoded_len();
        if length > i32::MAX as usize {
            return Err(Error::builder(BuilderErrorKind::TooLarge { length }));
        }
        match self {
            RawBsonRef::RegularExpression(re) => {
                check_cstring(re.pattern)?;
                check_cstring(re.options)?;
            }
            RawBsonRef::Document(d) => d.check_framing()?,
            RawBsonRef::Array(a) => a.as_doc().check_framing()?,
            RawBsonRef::JavaScriptCodeWithScope(cws) => cws.scope.check_framing()?,
            _ => {}
        }
        Ok(())
    }

    /// Writes the value payload (no type tag or key) to `buf`.
    pub(crate) fn append_to(&self, buf: &mut Vec<u8>) {
        match self {
            RawBsonRef::Double(d) => buf.extend(d.to_le_bytes()),
            RawBsonRef::String(s) | RawBsonRef::JavaScriptCode(s) | RawBsonRef::Symbol(s) => {
                write_string(buf, s)
            }
            RawBsonRef::Document(d) => buf.extend(d.as_bytes()),
            RawBsonRef::Array(a) => buf.extend(a.as_bytes()),
            RawBsonRef::Binary(b) => {
                buf.extend((b.payload_len() as i32).to_le_bytes());
                buf.push(b.subtype.into());
                if b.subtype == BinarySubtype::BinaryOld {
                    buf.extend((b.bytes.len() as i32).to_le_bytes());
                }
                buf.extend(b.bytes);
            }
            RawBsonRef::ObjectId(oid) => buf.extend(oid.bytes()),
            RawBsonRef::Boolean(b) => buf.push(*b as u8),
            RawBsonRef::DateTime(dt) => buf.extend(dt.timestamp_millis().to_le_bytes()),
            RawBsonRef::RegularExpression(re) => {
                write_cstring(buf, re.pattern);
                write_cstring(buf, &sort_options(re.options));
            }
            RawBsonRef::DbPointer(d) => {
                write_string(buf, d.namespace);
                buf.extend(d.id.bytes());
            }
            RawBsonRef::JavaScriptCodeWithScope(cws) => {
                buf.extend((self.encoded_len() as i32).to_le_bytes());
                write_string(buf, cws.code);
                buf.extend(cws.scope.as_bytes());
            }
            RawBsonRef::Int32(i) => buf.extend(i.to_le_bytes()),
            RawBsonRef::Timestamp(ts) => buf.extend(ts.to_le_bytes()),
            RawBsonRef::Int64(i) => buf.extend(i.to_le_bytes()),
            RawBsonRef::Decimal128(d) => buf.extend(d.bytes()),
            RawBsonRef::Null | RawBsonRef::Undefined | RawBsonRef::MaxKey | RawBsonRef::MinKey => {}
        }
    }
}

pub(crate) fn check_cstring(s: &str) -> Result<()> {
    if s.as_bytes().contains(&0) {
        return Err(Error::builder(BuilderErrorKind::InteriorNul {
            value: s.to_string(),
        }));
    }
    Ok(())
}

impl PartialEq for RawBsonRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        use RawBsonRef::*;
        match (self, other) {
            (Double(a), Double(b)) => a.to_bits() == b.to_bits(),
            (String(a), String(b)) => a == b,
            (Array(a), Array(b)) => a == b,
            (Document(a), Document(b)) => a == b,
            (Boolean(a), Boolean(b)) => a == b,
            (Null, Null) | (Undefined, Undefined) | (MaxKey, MaxKey) | (MinKey, MinKey) => true,
            (RegularExpression(a), RegularExpression(b)) => a == b,
            (JavaScriptCode(a), JavaScriptCode(b)) => a == b,
            (JavaScriptCodeWithScope(a), JavaScriptCodeWithScope(b)) => a == b,
            (Int32(a), Int32(b)) => a == b,
            (Int64(a), Int64(b)) => a == b,
            (Timestamp(a), Timestamp(b)) => a == b,
            (Binary(a), Binary(b)) => a == b,
            (ObjectId(a), ObjectId(b)) => a == b,
            (DateTime(a), DateTime(b)) => a == b,
            (Symbol(a), Symbol(b)) => a == b,
            (Decimal128(a), Decimal128(b)) => a == b,
            (DbPointer(a), DbPointer(b)) => a == b,
            _ => false,
        }
    }
}

impl<'a> From<i32> for RawBsonRef<'a> {
    fn from(i: i32) -> Self {
        RawBsonRef::Int32(i)
    }
}

impl<'a> From<i64> for RawBsonRef<'a> {
    fn from(i: i64) -> Self {
        RawBsonRef::Int64(i)
    }
}

impl<'a> From<&'a str> for RawBsonRef<'a> {
    fn from(s: &'a str) -> Self {
        RawBsonRef::String(s)
    }
}

impl<'a> From<&'a String> for RawBsonRef<'a> {
    fn from(s: &'a String) -> Self {
        RawBsonRef::String(s.as_str())
    }
}

impl<'a> From<f64> for RawBsonRef<'a> {
    fn from(f: f64) -> Self {
        RawBsonRef::Double(f)
    }
}

impl<'a> From<bool> for RawBsonRef<'a> {
    fn from(b: bool) -> Self {
        RawBsonRef::Boolean(b)
    }
}

impl<'a> From<&'a RawDocumentBuf> for RawBsonRef<'a> {
    fn from(d: &'a RawDocumentBuf) -> Self {
        RawBsonRef::Document(d.as_ref())
    }
}

impl<'a> From<&'a RawDocument> for RawBsonRef<'a> {
    fn from(d: &'a RawDocument) -> Self {
        RawBsonRef::Document(d)
    }
}

impl<'a> From<&'a RawArray> for RawBsonRef<'a> {
    fn from(a: &'a RawArray) -> Self {
        RawBsonRef::Array(a)
    }
}

impl<'a> From<&'a RawArrayBuf> for RawBsonRef<'a> {
    fn from(a: &'a RawArrayBuf) -> Self {
        RawBsonRef::Array(a.as_ref())
    }
}

impl<'a> From<DateTime> for RawBsonRef<'a> {
    fn from(dt: DateTime) -> Self {
        RawBsonRef::DateTime(dt)
    }
}

impl<'a> From<Timestamp> for RawBsonRef<'a> {
    fn from(ts: Timestamp) -> Self {
        RawBsonRef::Timestamp(ts)
    }
}

impl<'a> From<ObjectId> for RawBsonRef<'a> {
    fn from(oid: ObjectId) -> Self {
        RawBsonRef::ObjectId(oid)
    }
}

impl<'a> From<Decimal128> for RawBsonRef<'a> {
    fn from(d: Decimal128) -> Self {
        RawBsonRef::Decimal128(d)
    }
}

impl<'a> From<RawBinaryRef<'a>> for RawBsonRef<'a> {
    fn from(b: RawBinaryRef<'a>) -> Self {
        RawBsonRef::Binary(b)
    }
}

impl<'a> From<&'a Binary> for RawBsonRef<'a> {
    fn from(b: &'a Binary) -> Self {
        RawBsonRef::Binary(b.as_raw_binary())
    }
}

impl<'a> From<RawRegexRef<'a>> for RawBsonRef<'a> {
    fn from(re: RawRegexRef<'a>) -> Self {
        RawBsonRef::RegularExpression(re)
    }
}

impl<'a> From<RawDbPointerRef<'a>> for RawBsonRef<'a> {
    fn from(d: RawDbPointerRef<'a>) -> Self {
        RawBsonRef::DbPointer(d)
    }
}

impl<'a> From<RawJavaScriptCodeWithScopeRef<'a>> for RawBsonRef<'a> {
    fn from(code_w_scope: RawJavaScriptCodeWithScopeRef<'a>) -> Self {
        RawBsonRef::JavaScriptCodeWithScope(code_w_scope)
    }
}

impl<'a> From<&'a RawBson> for RawBsonRef<'a> {
    fn from(b: &'a RawBson) -> Self {
        b.as_raw_bson_ref()
    }
}

impl<'a, T> From<Option<T>> for RawBsonRef<'a>
where
    T: Into<RawBsonRef<'a>>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(RawBsonRef::Null, Into::into)
    }
}

/// A BSON binary value referencing raw bytes stored elsewhere.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawBinaryRef<'a> {
    /// The subtype of the binary value.
    pub subtype: BinarySubtype,

    /// The binary bytes. For [`BinarySubtype::BinaryOld`] this excludes the inner length prefix.
    pub bytes: &'a [u8],
}

impl RawBinaryRef<'_> {
    /// Copy the contents into a [`Binary`].
    pub fn to_binary(&self) -> Binary {
        Binary {
            subtype: self.subtype,
            bytes: self.bytes.to_owned(),
        }
    }

    /// The size of the payload as declared by the outer length prefix.
    pub(crate) fn payload_len(&self) -> usize {
        match self.subtype {
            BinarySubtype::BinaryOld => self.bytes.len() + 4,
            _ => self.bytes.len(),
        }
    }
}

/// A BSON regex referenced from raw bytes stored elsewhere.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawRegexRef<'a> {
    /// The regex pattern to match.
    pub pattern: &'a str,

    /// The options for the regex. They are written in alphabetical order.
    pub options: &'a str,
}

/// A BSON "code with scope" value referenced from raw bytes stored elsewhere.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RawJavaScriptCodeWithScopeRef<'a> {
    /// The JavaScript code.
    pub code: &'a str,

    /// The scope document containing variable bindings.
    pub scope: &'a RawDocument,
}

/// A BSON DB pointer value referencing raw bytes stored elesewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawDbPointerRef<'a> {
    /// The namespace the pointer refers to.
    pub namespace: &'a str,

    /// The id of the referenced document.
    pub id: ObjectId,
}
