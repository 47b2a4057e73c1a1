//! SeaORM entities for the treasure catalog.

pub mod treasure;
pub mod user;
