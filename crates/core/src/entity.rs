//! Things with identity that outlives their field values.

/// A domain object identified by [`Entity::id`] rather than by its fields.
///
/// An inventory record keeps its [`RecordId`](crate::RecordId) while its
/// quantity changes; a catalog item is identified by its natural key.
pub trait Entity {
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;

    /// Whether `other` is the same entity, whatever its current fields.
    fn same_entity(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}
