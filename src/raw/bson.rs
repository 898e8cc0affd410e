use std::fmt;

use crate::{
    error::Result,
    oid::ObjectId,
    spec::ElementType,
    Binary,
    DateTime,
    Decimal128,
    Timestamp,
};

use super::{
    RawArray,
    RawArrayBuf,
    RawBinaryRef,
    RawBsonRef,
    RawDbPointerRef,
    RawDocument,
    RawDocumentBuf,
    RawJavaScriptCodeWithScopeRef,
    RawRegexRef,
};

/// A BSON value backed by owned raw BSON bytes.
///
/// Unlike [`RawBsonRef`], a `RawBson` has no dependency on the buffer it was read from: strings,
/// binary payloads and embedded documents are all copied into storage owned by the value. The
/// default value is [`RawBson::Null`].
#[derive(Debug, Clone, Default)]
pub enum RawBson {
    /// 64-bit binary floating point
    Double(f64),
    /// UTF-8 string
    String(String),
    /// Array
    Array(RawArrayBuf),
    /// Embedded document
    Document(RawDocumentBuf),
    /// Boolean value
    Boolean(bool),
    /// Null value
    #[default]
    Null,
    /// Regular expression
    RegularExpression(Regex),
    /// JavaScript code
    JavaScriptCode(String),
    /// JavaScript code w/ scope
    JavaScriptCodeWithScope(RawJavaScriptCodeWithScope),
    /// 32-bit signed integer
    Int32(i32),
    /// 64-bit signed integer
    Int64(i64),
    /// Timestamp
    Timestamp(Timestamp),
    /// Binary data
    Binary(Binary),
    /// [ObjectId](http://dochub.mongodb.org/core/objectids)
    ObjectId(ObjectId),
    /// UTC datetime
    DateTime(DateTime),
    /// Symbol (Deprecated)
    Symbol(String),
    /// [128-bit decimal floating point](https://github.com/mongodb/specifications/blob/master/source/bson-decimal128/decimal128.md)
    Decimal128(Decimal128),
    /// Undefined value (Deprecated)
    Undefined,
    /// Max key
    MaxKey,
    /// Min key
    MinKey,
    /// DBPointer (Deprecated)
    DbPointer(DbPointer),
}

impl RawBson {
    /// Get the [`ElementType`] of this value.
    pub fn element_type(&self) -> ElementType {
        self.as_raw_bson_ref().element_type()
    }

    /// Gets a [`RawBsonRef`] value referencing this owned raw BSON value.
    pub fn as_raw_bson_ref(&self) -> RawBsonRef<'_> {
        match self {
            RawBson::Double(d) => RawBsonRef::Double(*d),
            RawBson::String(s) => RawBsonRef::String(s.as_str()),
            RawBson::Array(a) => RawBsonRef::Array(a),
            RawBson::Document(d) => RawBsonRef::Document(d),
            RawBson::Boolean(b) => RawBsonRef::Boolean(*b),
            RawBson::Null => RawBsonRef::Null,
            RawBson::RegularExpression(re) => RawBsonRef::RegularExpression(RawRegexRef {
                pattern: re.pattern.as_str(),
                options: re.options.as_str(),
            }),
            RawBson::JavaScriptCode(c) => RawBsonRef::JavaScriptCode(c.as_str()),
            RawBson::JavaScriptCodeWithScope(code_w_scope) => {
                RawBsonRef::JavaScriptCodeWithScope(RawJavaScriptCodeWithScopeRef {
                    code: code_w_scope.code.as_str(),
                    scope: &code_w_scope.scope,
                })
            }
            RawBson::Int32(i) => RawBsonRef::Int32(*i),
            RawBson::Int64(i) => RawBsonRef::Int64(*i),
            RawBson::Timestamp(ts) => RawBsonRef::Timestamp(*ts),
            RawBson::Binary(b) => RawBsonRef::Binary(b.as_raw_binary()),
            RawBson::ObjectId(oid) => RawBsonRef::ObjectId(*oid),
            RawBson::DateTime(dt) => RawBsonRef::DateTime(*dt),
            RawBson::Symbol(s) => RawBsonRef::Symbol(s.as_str()),
            RawBson::Decimal128(d) => RawBsonRef::Decimal128(*d),
            RawBson::Undefined => RawBsonRef::Undefined,
            RawBson::MaxKey => RawBsonRef::MaxKey,
            RawBson::MinKey => RawBsonRef::MinKey,
            RawBson::DbPointer(d) => RawBsonRef::DbPointer(RawDbPointerRef {
                namespace: d.namespace.as_str(),
                id: d.id,
            }),
        }
    }

    /// Gets the wrapped `f64` value or returns [`None`] if the value isn't a BSON double.
    pub fn as_f64(&self) -> Option<f64> {
        self.as_raw_bson_ref().as_f64()
    }

    /// Gets a reference to the `String` that's wrapped or returns [`None`] if the wrapped value
    /// isn't a BSON String.
    pub fn as_str(&self) -> Option<&'_ str> {
        match self {
            RawBson::String(s) => Some(s),
            _ => None,
        }
    }

    /// Gets a reference to the [`RawArrayBuf`] that's wrapped or returns [`None`] if the wrapped
    /// value isn't a BSON array.
    pub fn as_array(&self) -> Option<&'_ RawArray> {
        match self {
            RawBson::Array(v) => Some(v),
            _ => None,
        }
    }

    /// Gets a reference to the document that's wrapped or returns [`None`] if the wrapped value
    /// isn't a BSON document.
    pub fn as_document(&self) -> Option<&'_ RawDocument> {
        match self {
            RawBson::Document(v) => Some(v),
            _ => None,
        }
    }

    /// Gets the wrapped `bool` value or returns [`None`] if the wrapped value isn't a BSON
    /// boolean.
    pub fn as_bool(&self) -> Option<bool> {
        self.as_raw_bson_ref().as_bool()
    }

    /// Gets the wrapped `i32` value or returns [`None`] if the wrapped value isn't a BSON
    /// Int32.
    pub fn as_i32(&self) -> Option<i32> {
        self.as_raw_bson_ref().as_i32()
    }

    /// Gets the wrapped `i64` value or returns [`None`] if the wrapped value isn't a BSON
    /// Int64.
    pub fn as_i64(&self) -> Option<i64> {
        self.as_raw_bson_ref().as_i64()
    }

    /// Gets the wrapped [`ObjectId`] value or returns [`None`] if the wrapped value isn't a BSON
    /// ObjectID.
    pub fn as_object_id(&self) -> Option<ObjectId> {
        self.as_raw_bson_ref().as_object_id()
    }

    /// Gets a reference to the [`Binary`] that's wrapped or returns [`None`] if the wrapped value
    /// isn't a BSON binary.
    pub fn as_binary(&self) -> Option<RawBinaryRef<'_>> {
        self.as_raw_bson_ref().as_binary()
    }

    /// Gets a reference to the [`Regex`] that's wrapped or returns [`None`] if the wrapped value
    /// isn't a BSON regular expression.
    pub fn as_regex(&self) -> Option<RawRegexRef<'_>> {
        self.as_raw_bson_ref().as_regex()
    }

    /// Gets the wrapped [`DateTime`] value or returns [`None`] if the wrapped value isn't a BSON
    /// datetime.
    pub fn as_datetime(&self) -> Option<DateTime> {
        self.as_raw_bson_ref().as_datetime()
    }

    /// Gets the wrapped [`Timestamp`] value or returns [`None`] if the wrapped value isn't a BSON
    /// timestamp.
    pub fn as_timestamp(&self) -> Option<Timestamp> {
        self.as_raw_bson_ref().as_timestamp()
    }

    /// Gets the wrapped [`Decimal128`] value or returns [`None`] if the wrapped value isn't a BSON
    /// decimal128.
    pub fn as_decimal128(&self) -> Option<Decimal128> {
        self.as_raw_bson_ref().as_decimal128()
    }

    /// Returns `Some(())` if this value is null, otherwise [`None`].
    pub fn as_null(&self) -> Option<()> {
        self.as_raw_bson_ref().as_null()
    }

    /// Gets the double, failing with "need element type double" for any other type.
    pub fn get_f64(&self) -> Result<f64> {
        self.as_raw_bson_ref().get_f64()
    }

    /// Gets the string.
    pub fn get_str(&self) -> Result<&'_ str> {
        self.as_raw_bson_ref().get_str()
    }

    /// Gets the embedded document.
    pub fn get_document(&self) -> Result<&'_ RawDocument> {
        self.as_raw_bson_ref().get_document()
    }

    /// Gets the array.
    pub fn get_array(&self) -> Result<&'_ RawArray> {
        self.as_raw_bson_ref().get_array()
    }

    /// Gets the binary payload.
    pub fn get_binary(&self) -> Result<RawBinaryRef<'_>> {
        self.as_raw_bson_ref().get_binary()
    }

    /// Succeeds if the value is undefined.
    pub fn get_undefined(&self) -> Result<()> {
        self.as_raw_bson_ref().get_undefined()
    }

    /// Gets the ObjectId.
    pub fn get_object_id(&self) -> Result<ObjectId> {
        self.as_raw_bson_ref().get_object_id()
    }

    /// Gets the boolean.
    pub fn get_bool(&self) -> Result<bool> {
        self.as_raw_bson_ref().get_bool()
    }

    /// Gets the datetime.
    pub fn get_datetime(&self) -> Result<DateTime> {
        self.as_raw_bson_ref().get_datetime()
    }

    /// Succeeds if the value is null.
    pub fn get_null(&self) -> Result<()> {
        self.as_raw_bson_ref().get_null()
    }

    /// Gets the regular expression.
    pub fn get_regex(&self) -> Result<RawRegexRef<'_>> {
        self.as_raw_bson_ref().get_regex()
    }

    /// Gets the DB pointer.
    pub fn get_db_pointer(&self) -> Result<RawDbPointerRef<'_>> {
        self.as_raw_bson_ref().get_db_pointer()
    }

    /// Gets the JavaScript code.
    pub fn get_javascript_code(&self) -> Result<&'_ str> {
        self.as_raw_bson_ref().get_javascript_code()
    }

    /// Gets the symbol.
    pub fn get_symbol(&self) -> Result<&'_ str> {
        self.as_raw_bson_ref().get_symbol()
    }

    /// Gets the JavaScript code with scope.
    pub fn get_javascript_code_with_scope(&self) -> Result<RawJavaScriptCodeWithScopeRef<'_>> {
        self.as_raw_bson_ref().get_javascript_code_with_scope()
    }

    /// Gets the 32-bit integer.
    pub fn get_i32(&self) -> Result<i32> {
        self.as_raw_bson_ref().get_i32()
    }

    /// Gets the timestamp.
    pub fn get_timestamp(&self) -> Result<Timestamp> {
        self.as_raw_bson_ref().get_timestamp()
    }

    /// Gets the 64-bit integer.
    pub fn get_i64(&self) -> Result<i64> {
        self.as_raw_bson_ref().get_i64()
    }

    /// Gets the decimal128.
    pub fn get_decimal128(&self) -> Result<Decimal128> {
        self.as_raw_bson_ref().get_decimal128()
    }

    /// Succeeds if the value is max key.
    pub fn get_max_key(&self) -> Result<()> {
        self.as_raw_bson_ref().get_max_key()
    }

    /// Succeeds if the value is min key.
    pub fn get_min_key(&self) -> Result<()> {
        self.as_raw_bson_ref().get_min_key()
    }
}

impl PartialEq for RawBson {
    fn eq(&self, other: &Self) -> bool {
        self.as_raw_bson_ref() == other.as_raw_bson_ref()
    }
}

impl From<i32> for RawBson {
    fn from(n: i32) -> Self {
        RawBson::Int32(n)
    }
}

impl From<i64> for RawBson {
    fn from(n: i64) -> Self {
        RawBson::Int64(n)
    }
}

impl From<f64> for RawBson {
    fn from(f: f64) -> Self {
        RawBson::Double(f)
    }
}

impl From<bool> for RawBson {
    fn from(b: bool) -> Self {
        RawBson::Boolean(b)
    }
}

impl From<String> for RawBson {
    fn from(s: String) -> Self {
        RawBson::String(s)
    }
}

impl From<&str> for RawBson {
    fn from(s: &str) -> Self {
        RawBson::String(s.to_owned())
    }
}

impl From<RawDocumentBuf> for RawBson {
    fn from(d: RawDocumentBuf) -> Self {
        RawBson::Document(d)
    }
}

impl From<RawArrayBuf> for RawBson {
    fn from(a: RawArrayBuf) -> Self {
        RawBson::Array(a)
    }
}

impl From<Binary> for RawBson {
    fn from(b: Binary) -> Self {
        RawBson::Binary(b)
    }
}

impl From<Regex> for RawBson {
    fn from(re: Regex) -> Self {
        RawBson::RegularExpression(re)
    }
}

impl From<ObjectId> for RawBson {
    fn from(oid: ObjectId) -> Self {
        RawBson::ObjectId(oid)
    }
}

impl From<DateTime> for RawBson {
    fn from(dt: DateTime) -> Self {
        RawBson::DateTime(dt)
    }
}

impl From<Timestamp> for RawBson {
    fn from(ts: Timestamp) -> Self {
        RawBson::Timestamp(ts)
    }
}

impl From<Decimal128> for RawBson {
    fn from(d: Decimal128) -> Self {
        RawBson::Decimal128(d)
    }
}

impl From<DbPointer> for RawBson {
    fn from(d: DbPointer) -> Self {
        RawBson::DbPointer(d)
    }
}

impl From<RawJavaScriptCodeWithScope> for RawBson {
    fn from(code_w_scope: RawJavaScriptCodeWithScope) -> Self {
        RawBson::JavaScriptCodeWithScope(code_w_scope)
    }
}

impl<'a> From<RawBsonRef<'a>> for RawBson {
    fn from(value: RawBsonRef<'a>) -> Self {
        value.to_raw_bson()
    }
}

/// Represents a BSON regular expression value.
///
/// Neither the pattern nor the options may contain a NUL byte when the value is written to a
/// buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Regex {
    /// The regex pattern to match.
    pub pattern: String,

    /// The options for the regex. Valid options are 'i' for case insensitive matching, 'm' for
    /// multiline matching, 'x' for verbose mode, 'l' to make \w, \W, etc. locale dependent,
    /// 's' for dotall mode ('.' matches everything), and 'u' to make \w, \W, etc. match
    /// unicode.
    pub options: String,
}

impl Regex {
    /// Creates a new regex from a pattern and options. The options are sorted alphabetically.
    pub fn new(pattern: impl Into<String>, options: impl AsRef<str>) -> Self {
        Self {
            pattern: pattern.into(),
            options: sort_options(options.as_ref()),
        }
    }
}

pub(crate) fn sort_options(options: &str) -> String {
    let mut chars: Vec<_> = options.chars().collect();
    chars.sort_unstable();
    chars.into_iter().collect()
}

impl fmt::Display for Regex {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "/{}/{}", self.pattern, self.options)
    }
}

/// Represents a DBPointer. (Deprecated)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DbPointer {
    /// The namespace the pointer refers to.
    pub namespace: String,

    /// The id of the referenced document.
    pub id: ObjectId,
}

/// A BSON "code with scope" value backed by owned raw BSON.
#[derive(Debug, Clone, PartialEq)]
pub struct RawJavaScriptCodeWithScope {
    /// The code value.
    pub code: String,

    /// The scope document.
    pub scope: RawDocumentBuf,
}
