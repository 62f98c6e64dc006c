//! `molten-core` — shared building blocks for the glass inventory crates.
//!
//! This crate contains **pure domain** primitives (no storage, no IO).

pub mod entity;
pub mod error;
pub mod id;
pub mod natural_key;
pub mod value_object;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{ImportRunId, RecordId};
pub use natural_key::NaturalKey;
pub use value_object::ValueObject;
