//! BSON is a binary format in which zero or more ordered key/value pairs are stored as a single
//! entity. We call this entity a document.
//!
//! This library supports version 1.1 of the [BSON standard](http://bsonspec.org/spec.html) and
//! works on the encoded bytes directly. Nothing is parsed up front: a
//! [`&RawDocument`](raw::RawDocument) is a view over a byte slice whose elements are located
//! lazily as they are iterated or looked up, and a [`RawDocumentBuf`](raw::RawDocumentBuf) is the
//! owning counterpart.
//!
//! ## Installation
//! ### Requirements
//! - Rust 1.74+
//!
//! ### Importing
//! This crate is available on [crates.io](https://crates.io/crates/rawbson). To use it in your
//! application, simply add it to your project's `Cargo.toml`.
//!
//! ```toml
//! [dependencies]
//! rawbson = "0.1"
//! ```
//!
//! ## Reading documents
//!
//! Bytes from an untrusted source should be checked with [`raw::validate`] before they are read;
//! the returned view is then known to be well formed all the way down.
//!
//! ```rust
//! use rawbson::raw;
//!
//! let bytes = b"\x16\x00\x00\x00\x10answer\x00\x2a\x00\x00\x00\x08ok\x00\x01\x00";
//! let doc = raw::validate(bytes)?;
//!
//! assert_eq!(doc.get_i32("answer")?, 42);
//! assert!(doc.get_bool("ok")?);
//! for element in doc {
//!     println!("{} => {:?}", element.key()?, element.value()?);
//! }
//! # Ok::<(), rawbson::error::Error>(())
//! ```
//!
//! ## Building documents
//!
//! [`builder::RawBuilder`] appends elements to a single growing buffer. The
//! [`basic`](builder::basic) and [`stream`](builder::stream) facades and the [`rawdoc!`] and
//! [`rawarr!`] macros wrap it in APIs that cannot produce an unbalanced document.
//!
//! ```rust
//! use rawbson::{rawdoc, oid::ObjectId};
//!
//! let doc = rawdoc! {
//!     "_id" => ObjectId::new(),
//!     "title" => "Jurassic Park",
//!     "cast" => ["Sam Neill", "Laura Dern"],
//! }?;
//!
//! assert_eq!(doc.get_array("cast")?.get_str(1)?, "Laura Dern");
//! # Ok::<(), rawbson::error::Error>(())
//! ```
//!
//! ## Extended JSON
//!
//! With the default `serde_json-1` feature, the [`extjson`] module converts documents to and from
//! [MongoDB Extended JSON](https://www.mongodb.com/docs/manual/reference/mongodb-extended-json/).

#![doc(html_root_url = "https://docs.rs/rawbson/0.1.0")]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

#[doc(inline)]
pub use self::{
    binary::Binary,
    datetime::DateTime,
    decimal128::Decimal128,
    raw::{
        DbPointer,
        RawArray,
        RawArrayBuf,
        RawBson,
        RawBsonRef,
        RawDocument,
        RawDocumentBuf,
        Regex,
    },
    timestamp::Timestamp,
};

#[macro_use]
mod macros;
mod binary;
pub mod builder;
pub mod datetime;
pub mod decimal128;
pub mod error;
#[cfg(feature = "serde_json-1")]
pub mod extjson;
pub mod oid;
pub mod raw;
pub mod spec;
mod timestamp;
