pub use super::current_book::Entity as CurrentBook;
pub use super::reading_event::Entity as ReadingEvent;
