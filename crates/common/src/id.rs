//! ID generation utilities.

use ulid::Ulid;
use uuid::Uuid;

/// Length of the random part of an order number, after the `SO-` prefix.
/// The column is varchar(20), so 17 hex chars fit exactly.
const ORDER_NUMBER_RANDOM_LEN: usize = 17;

/// ID generator for entities.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    _private: (),
}

impl IdGenerator {
    /// Create a new ID generator.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// Generate a new ULID-based ID.
    ///
    /// ULIDs are:
    /// - Lexicographically sortable
    /// - Monotonically increasing within the same millisecond
    /// - Shorter than UUIDs when represented as strings
    #[must_use]
    pub fn generate(&self) -> String {
        Ulid::new().to_string().to_lowercase()
    }

    /// Generate a random object-key component for stored files.
    #[must_use]
    pub fn generate_object_id(&self) -> String {
        Uuid::new_v4().to_string()
    }

    /// Generate a human-readable order number (`SO-` + 17 hex chars).
    ///
    /// Random rather than sequential so order volume is not guessable;
    /// the unique index on the column backstops collisions.
    #[must_use]
    pub fn generate_order_number(&self) -> String {
        let random = Uuid::new_v4().simple().to_string().to_uppercase();
        format!("SO-{}", &random[..ORDER_NUMBER_RANDOM_LEN])
    }
}

/// Check that a string has the shape of a generated entity ID.
///
/// Lets detail routes reject malformed path parameters before touching
/// the database.
#[must_use]
pub fn is_valid_id(id: &str) -> bool {
    id.len() == 26 && Ulid::from_string(&id.to_uppercase()).is_ok()
}
