//! Identifier generation for entities created without one.
//!
//! The generator is an injected collaborator rather than a global, so
//! tests can substitute a deterministic implementation and assert exact
//! identifiers.

use bson::Uuid;

/// Produces a fresh, collision-resistant identifier per call.
///
/// Implementations must be stateless from the caller's point of view:
/// two calls never return the same value, and no call can fail.
pub trait IdGenerator<I>: Send + Sync {
    /// The next identifier.
    fn next_id(&self) -> I;
}

/// Random UUID identifiers.
///
/// The default generator for entities keyed by [`bson::Uuid`] or by
/// string renditions of one.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator<Uuid> for UuidGenerator {
    fn next_id(&self) -> Uuid {
        Uuid::new()
    }
}

impl IdGenerator<String> for UuidGenerator {
    fn next_id(&self) -> String {
        Uuid::new().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_ids_are_unique() {
        let generator = UuidGenerator;
        let a: Uuid = generator.next_id();
        let b: Uuid = generator.next_id();

        assert_ne!(a, b);
    }

    #[test]
    fn string_ids_are_non_empty() {
        let generator = UuidGenerator;
        let id: String = generator.next_id();

        assert!(!id.is_empty());
    }
}
