use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ControlId(Uuid);

impl ControlId {
    pub const fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    pub const fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl Display for ControlId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

/// Identity source for controls, injected at arena construction so hosts can
/// substitute a deterministic generator.
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> ControlId;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn generate(&self) -> ControlId {
        ControlId(Uuid::new_v4())
    }
}

/// Counter-backed generator producing a stable id sequence.
#[derive(Debug)]
pub struct SequentialIds {
    next: AtomicU64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for SequentialIds {
    fn generate(&self) -> ControlId {
        let next = self.next.fetch_add(1, Ordering::SeqCst);
        ControlId(Uuid::from_u128(u128::from(next)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_ids_are_deterministic() {
        let first = SequentialIds::new();
        let second = SequentialIds::new();
        let from_first = (0..3).map(|_| first.generate()).collect::<Vec<_>>();
        let from_second = (0..3).map(|_| second.generate()).collect::<Vec<_>>();
        assert_eq!(from_first, from_second);
    }

    #[test]
    fn random_ids_do_not_collide() {
        let ids = RandomIds;
        assert_ne!(ids.generate(), ids.generate());
    }
}
