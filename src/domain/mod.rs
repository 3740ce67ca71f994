//! Domain types for the item store.
//!
//! This module provides:
//! - The `Item` entity and its create/patch inputs
//! - Payload validation producing per-field violations

pub mod item;
pub mod validation;

pub use item::{Item, ItemId, ItemPatch, NewItem};
pub use validation::{FieldViolation, ValidationErrors};
