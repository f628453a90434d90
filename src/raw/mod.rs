//! Byte-level BSON primitives: cursors, sinks, and the per-field size table
//! used by the lazy document/array readers.

pub mod reader;
pub mod size;
pub mod writer;

pub use reader::RawBsonReader;
pub use writer::RawBsonWriter;
