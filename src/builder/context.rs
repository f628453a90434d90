//! The environment expression-tree nodes are built against.

use std::sync::Arc;

use crate::types::{DefaultObjectIdGenerator, ObjectId, ObjectIdGenerator};

/// A small factory/environment shared by every node in an expression tree.
/// Nodes keep a clone of the context they were built with so they can reach
/// capabilities like [`ObjectIdGenerator`] without a global.
///
/// Cloning is cheap: it only bumps an `Arc` refcount.
#[derive(Clone)]
pub struct BsonContext {
    id_generator: Arc<dyn ObjectIdGenerator + Send + Sync>,
}

impl BsonContext {
    /// A context using the default, random/monotonic ObjectId generator.
    pub fn new() -> Self {
        Self::with_id_generator(DefaultObjectIdGenerator)
    }

    /// A context using a caller-supplied ObjectId generator, e.g. a
    /// deterministic one for tests.
    pub fn with_id_generator(generator: impl ObjectIdGenerator + Send + Sync + 'static) -> Self {
        BsonContext {
            id_generator: Arc::new(generator),
        }
    }

    /// Generates a fresh ObjectId via this context's generator.
    pub fn generate_object_id(&self) -> ObjectId {
        self.id_generator.generate()
    }
}

impl Default for BsonContext {
    fn default() -> Self {
        Self::new()
    }
}
