// Unique id generation for tasks

use uuid::Uuid;

/// Source of unique task ids
///
/// Every call must return a value no previous call returned.
pub trait IdGenerator {
    fn next_id(&mut self) -> String;
}

/// Time-ordered UUID v7 ids
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn next_id(&mut self) -> String {
        Uuid::now_v7().to_string()
    }
}

/// Counter-based ids with a fixed prefix
///
/// Deterministic, for tests that need to address tasks by known ids.
#[derive(Debug)]
pub struct SequentialIdGenerator {
    prefix: String,
    next: u64,
}

impl SequentialIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&mut self) -> String {
        let id = format!("{}-{}", self.prefix, self.next);
        self.next += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_ids_are_unique_and_parseable() {
        let mut ids = UuidIdGenerator;

        let a = ids.next_id();
        let b = ids.next_id();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(&a).is_ok());
        assert!(Uuid::parse_str(&b).is_ok());
    }

    #[test]
    fn test_sequential_ids() {
        let mut ids = SequentialIdGenerator::new("task");

        assert_eq!(ids.next_id(), "task-1");
        assert_eq!(ids.next_id(), "task-2");
        assert_eq!(ids.next_id(), "task-3");
    }
}
