//! Application services layer scaffolding.

pub mod certificates;
pub mod error;
pub mod payments;
pub mod registration;
pub mod repos;
