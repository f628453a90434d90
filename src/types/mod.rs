//! Scalar BSON types that do not need a full reader/writer of their own.

mod bson_type;
mod decimal128;
mod object_id;
mod timestamp;

pub use bson_type::BsonType;
pub use decimal128::Decimal128;
pub use object_id::{DefaultObjectIdGenerator, ObjectId, ObjectIdGenerator};
pub use timestamp::Timestamp;
