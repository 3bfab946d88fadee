//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}

/// Position of the entity with `id` in an ordered collection.
pub fn position_of<E: Entity>(entities: &[E], id: &E::Id) -> Option<usize> {
    entities.iter().position(|e| e.id() == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row(u8);

    impl Entity for Row {
        type Id = u8;

        fn id(&self) -> &u8 {
            &self.0
        }
    }

    #[test]
    fn position_follows_collection_order() {
        let rows = [Row(7), Row(3), Row(9)];
        assert_eq!(position_of(&rows, &3), Some(1));
        assert_eq!(position_of(&rows, &4), None);
    }
}
