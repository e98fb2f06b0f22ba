//! SeaORM entities for the local sqlite backend.

pub mod prelude;

pub mod current_book;
pub mod reading_event;
