//! ID generation utilities.

use rand::{Rng, distributions::Alphanumeric};
use ulid::Ulid;
use uuid::Uuid;

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

    /// Generate a cryptographically secure random session token.
    #[must_use]
    pub fn generate_token(&self) -> String {
        let random: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect();
        format!("{}{random}", Uuid::new_v4().simple())
    }

    /// Generate a short lowercase random name for stored files.
    #[must_use]
    pub fn generate_file_stem(&self, len: usize) -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(len)
            .map(|b| char::from(b).to_ascii_lowercase())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_ulid() {
        let id_gen = IdGenerator::new();
        let id1 = id_gen.generate();
        let id2 = id_gen.generate();

        assert_eq!(id1.len(), 26);
        assert_eq!(id2.len(), 26);
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_generate_token() {
        let id_gen = IdGenerator::new();
        let token = id_gen.generate_token();

        assert_eq!(token.len(), 64);
        assert_ne!(token, id_gen.generate_token());
    }

    #[test]
    fn test_generate_file_stem() {
        let stem = IdGenerator::new().generate_file_stem(13);
        assert_eq!(stem.len(), 13);
        assert!(stem.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }
}
