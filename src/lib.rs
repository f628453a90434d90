#![doc = include_str!("../README.md")]

//! A lazy BSON codec plus a type-safe MongoDB query/update expression DSL.
//!
//! The crate is split into two halves that meet at [`builder::FieldWriter`]
//! and [`document::ValueReader`]:
//!
//! - **Codec** ([`bytes`], [`raw`], [`builder`], [`document`], [`types`],
//!   [`binary`], [`regex`], [`extjson`]) -- binary encode/decode of every
//!   BSON type, lazy field lookup, and a canonical Extended-JSON-like
//!   rendering used by the test suite.
//! - **DSL** ([`path`], [`expr`], [`query`]) -- a typed field-path model and
//!   an expression tree (`simplify` / `write` / `freeze`) that the filter,
//!   update, and aggregation-value sub-DSLs build on top of, producing BSON
//!   documents compatible with MongoDB's query language.
//!
//! Network drivers, cursor execution, and reflection-based object mapping
//! are out of scope; [`builder::ObjectSafeWrite`] is the hook a hosting
//! serialization layer binds to reach this codec.

pub mod binary;
pub mod builder;
pub mod bytes;
pub mod document;
pub mod error;
pub mod expr;
pub mod extjson;
pub mod path;
pub mod query;
pub mod raw;
pub mod regex;
pub mod types;

#[doc(inline)]
pub use self::{
    binary::{Binary, BinarySubtype},
    builder::{build_array, build_document, BsonContext, MAX_DOCUMENT_SIZE},
    bytes::Bytes,
    document::{ArrayReader, BsonArray, BsonDocument, DocumentReader, ValueReader},
    error::{Error, ErrorKind, Result},
    expr::{BsonNode, CompoundBsonNode},
    path::{Field, Path, Segment},
    regex::Regex,
    types::{BsonType, Decimal128, DefaultObjectIdGenerator, ObjectId, ObjectIdGenerator, Timestamp},
};

#[doc(inline)]
pub use self::query::{
    All, BitsAllClear, BitsAllSet, BitsAnyClear, BitsAnySet, CurrentDateKind, ElemMatch, Eq, Exists,
    Expr, FilterQuery, Gt, Gte, In, Logical, Lt, Lte, Mask, MatchesRegex, Ne, Nin, Not, Operator,
    Predicate, RegexOptions, TypeIs, UpdateQuery, Value, ValueExpr,
};
