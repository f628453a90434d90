//! BSON ObjectIds: 12-byte unique document identifiers.
//! See <https://www.mongodb.com/docs/manual/reference/object-id/>.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::LazyLock;
use std::time::SystemTime;

use rand::{random, Rng};

use crate::error::{Error, ErrorKind};

const TIMESTAMP_SIZE: usize = 4;
const PROCESS_ID_SIZE: usize = 5;
const COUNTER_SIZE: usize = 3;

const PROCESS_ID_OFFSET: usize = TIMESTAMP_SIZE;
const COUNTER_OFFSET: usize = PROCESS_ID_OFFSET + PROCESS_ID_SIZE;

const MAX_U24: usize = 0xFF_FFFF;

static OID_COUNTER: LazyLock<AtomicUsize> =
    LazyLock::new(|| AtomicUsize::new(rand::rng().random_range(0..=MAX_U24)));

/// A wrapper around a raw 12-byte ObjectId. Equality is byte equality.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId {
    bytes: [u8; 12],
}

impl ObjectId {
    /// The all-zero ObjectId; smaller than every other value.
    pub const MIN: ObjectId = ObjectId { bytes: [0; 12] };

    /// The all-0xFF ObjectId; larger than every other value.
    pub const MAX: ObjectId = ObjectId { bytes: [0xFF; 12] };

    /// Generates a fresh ObjectId from the current time, a random process
    /// identifier, and a monotonic counter.
    pub fn new() -> Self {
        let timestamp = Self::gen_timestamp();
        let process_id = Self::gen_process_id();
        let counter = Self::gen_counter();

        let mut bytes = [0u8; 12];
        bytes[0..4].copy_from_slice(&timestamp.to_be_bytes());
        bytes[PROCESS_ID_OFFSET..PROCESS_ID_OFFSET + PROCESS_ID_SIZE].copy_from_slice(&process_id);
        bytes[COUNTER_OFFSET..COUNTER_OFFSET + COUNTER_SIZE].copy_from_slice(&counter);
        Self { bytes }
    }

    /// Wraps a raw 12-byte representation.
    pub const fn from_bytes(bytes: [u8; 12]) -> Self {
        ObjectId { bytes }
    }

    /// Parses a 24-character lowercase hex string into an `ObjectId`.
    pub fn parse_str(s: impl AsRef<str>) -> Result<ObjectId, Error> {
        let s = s.as_ref();
        let decoded = hex::decode(s)
            .map_err(|e| Error::from(ErrorKind::InvalidUtf8).with_message(e))?;
        if decoded.len() != 12 {
            return Err(Error::from(ErrorKind::LengthMismatch)
                .with_message(format!("expected 12 bytes, got {}", decoded.len())));
        }
        let mut bytes = [0u8; 12];
        bytes.copy_from_slice(&decoded);
        Ok(ObjectId { bytes })
    }

    /// The raw byte representation of this ObjectId.
    pub const fn bytes(&self) -> [u8; 12] {
        self.bytes
    }

    /// Renders this ObjectId as a 24-character lowercase hex string.
    pub fn to_hex(self) -> String {
        hex::encode(self.bytes)
    }

    fn gen_timestamp() -> u32 {
        SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .expect("system clock is before 1970")
            .as_secs() as u32
    }

    fn gen_process_id() -> [u8; 5] {
        static BUF: LazyLock<[u8; 5]> = LazyLock::new(random);
        *BUF
    }

    fn gen_counter() -> [u8; 3] {
        let counter = OID_COUNTER.fetch_add(1, Ordering::SeqCst) % (MAX_U24 + 1);
        let buf = (counter as u64).to_be_bytes();
        [buf[5], buf[6], buf[7]]
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for ObjectId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        Self::parse_str(s)
    }
}

impl From<[u8; 12]> for ObjectId {
    fn from(bytes: [u8; 12]) -> Self {
        Self::from_bytes(bytes)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ObjectId").field(&self.to_hex()).finish()
    }
}

/// A capability for contexts that need to auto-create ObjectIds, e.g. when
/// inserting a document that has no identifier of its own.
///
/// The default implementation delegates to [`ObjectId::new`]; callers may
/// substitute a deterministic generator (for tests, or for a fixed
/// process/counter policy) by implementing this trait themselves.
pub trait ObjectIdGenerator {
    /// Produces a fresh identifier.
    fn generate(&self) -> ObjectId;
}

/// The default generator, backed by [`ObjectId::new`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultObjectIdGenerator;

impl ObjectIdGenerator for DefaultObjectIdGenerator {
    fn generate(&self) -> ObjectId {
        ObjectId::new()
    }
}
