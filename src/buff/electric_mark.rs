//! ElectricMark registry and chain linking.
//!
//! Every actor that carries at least one mark layer is registered here
//! once, in the order it was first marked. Lightning chains walk the
//! registry in that order.

use indexmap::IndexSet;
use serde::Serialize;

use crate::sim::ActorId;

/// One hop of a lightning chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChainLink {
    /// Actor the chain arrives from
    pub from: ActorId,
    /// Actor the chain jumps to
    pub to: ActorId,
}

/// Insertion-ordered set of marked actors.
#[derive(Debug, Clone, Default)]
pub struct MarkRegistry {
    marked: IndexSet<ActorId>,
}

impl MarkRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `id`. Returns `true` if it was not already present.
    pub fn register(&mut self, id: ActorId) -> bool {
        self.marked.insert(id)
    }

    /// Removes `id`, keeping the order of the remaining entries.
    pub fn unregister(&mut self, id: ActorId) -> bool {
        self.marked.shift_remove(&id)
    }

    /// Whether `id` is registered.
    #[must_use]
    pub fn contains(&self, id: ActorId) -> bool {
        self.marked.contains(&id)
    }

    /// Number of registered actors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.marked.len()
    }

    /// Whether no actor is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.marked.is_empty()
    }

    /// Registered actors in registration order.
    pub fn iter(&self) -> impl Iterator<Item = ActorId> + '_ {
        self.marked.iter().copied()
    }

    /// Builds the lightning chain across all registered actors.
    ///
    /// Links join consecutive entries in registration order, so every
    /// actor is visited at most once and the chain cannot cycle. Fewer
    /// than two registered actors yields an empty chain.
    #[must_use]
    pub fn link_targets(&self) -> Vec<ChainLink> {
        self.marked
            .iter()
            .zip(self.marked.iter().skip(1))
            .map(|(&from, &to)| ChainLink { from, to })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_once() {
        let mut registry = MarkRegistry::new();
        assert!(registry.register(ActorId(3)));
        assert!(!registry.register(ActorId(3)));
        assert!(!registry.register(ActorId(3)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_link_targets_in_registration_order() {
        let mut registry = MarkRegistry::new();
        registry.register(ActorId(5));
        registry.register(ActorId(1));
        registry.register(ActorId(9));
        registry.register(ActorId(1));

        let links = registry.link_targets();
        assert_eq!(
            links,
            vec![
                ChainLink {
                    from: ActorId(5),
                    to: ActorId(1)
                },
                ChainLink {
                    from: ActorId(1),
                    to: ActorId(9)
                },
            ]
        );
    }

    #[test]
    fn test_link_targets_single_or_empty() {
        let mut registry = MarkRegistry::new();
        assert!(registry.link_targets().is_empty());
        registry.register(ActorId(0));
        assert!(registry.link_targets().is_empty());
    }

    #[test]
    fn test_unregister_keeps_order() {
        let mut registry = MarkRegistry::new();
        for id in [2, 4, 6] {
            registry.register(ActorId(id));
        }
        assert!(registry.unregister(ActorId(4)));
        assert!(!registry.unregister(ActorId(4)));
        assert_eq!(
            registry.iter().collect::<Vec<_>>(),
            vec![ActorId(2), ActorId(6)]
        );
    }
}
