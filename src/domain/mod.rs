//! Domain layer types and invariants.

pub mod certificates;
pub mod entities;
pub mod types;
