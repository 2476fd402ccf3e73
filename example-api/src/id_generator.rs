use std::fmt::Debug;

/// Source of ids for newly created examples.
pub trait IdGenerator: Debug {
    fn next_id(&self) -> i64;
}

/// Draws ids uniformly from `2..=100`; id 1 belongs to the stored example.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
    fn next_id(&self) -> i64 {
        fastrand::i64(2..=100)
    }
}

/// Always hands out the same id.
#[derive(Debug, Clone, Copy)]
pub struct FixedIdGenerator(pub i64);

impl IdGenerator for FixedIdGenerator {
    fn next_id(&self) -> i64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_ids_stay_in_range() {
        for _ in 0..1000 {
            let id = RandomIdGenerator.next_id();
            assert!((2..=100).contains(&id), "id {} out of range", id);
        }
    }

    #[test]
    fn fixed_ids_repeat() {
        let generator = FixedIdGenerator(42);

        assert_eq!(generator.next_id(), 42);
        assert_eq!(generator.next_id(), 42);
    }
}
