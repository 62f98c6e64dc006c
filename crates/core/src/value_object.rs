//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values. A
/// [`NaturalKey`](crate::NaturalKey) is one: two keys built from the same
/// manufacturer, code and sequence are the same key.
///
/// ## Value Object vs Entity
///
/// - **Value Object**: no identity (`NaturalKey`, `Coe`, dimensions)
/// - **Entity**: has identity (an inventory record keeps its `RecordId` while
///   its quantity changes)
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
