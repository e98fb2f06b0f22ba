// Mapping between Notion pages and domain models

use serde_json::{Map, Value};

use super::models::{BookRecord, ProgressEvent};
use crate::notion_client::{Page, properties};

pub const BOOK_TITLE: &str = "Book Title";
pub const CURRENT_PAGE: &str = "Current Page";
pub const TOTAL_PAGES: &str = "Total Pages";
pub const PAGES_READ: &str = "Pages Read";
pub const BOOK_FINISHED: &str = "Book Finished";

pub fn map_page_to_book(page: &Page) -> BookRecord {
    BookRecord {
        id: page.id.clone(),
        title: page.title(BOOK_TITLE),
        current_page: page.number(CURRENT_PAGE),
        total_pages: page.number(TOTAL_PAGES),
    }
}

impl From<entities::current_book::Model> for BookRecord {
    fn from(row: entities::current_book::Model) -> Self {
        BookRecord {
            id: row.id.to_string(),
            title: row.title,
            current_page: row.current_page,
            total_pages: row.total_pages,
        }
    }
}

pub fn new_book_properties(title: &str, current_page: i64, total_pages: i64) -> Map<String, Value> {
    let mut props = progress_properties(current_page, total_pages);
    props.insert(BOOK_TITLE.into(), properties::title(title));
    props
}

/// Only the page counts; the title of an existing record never changes.
pub fn progress_properties(current_page: i64, total_pages: i64) -> Map<String, Value> {
    let mut props = Map::new();
    props.insert(CURRENT_PAGE.into(), properties::number(current_page));
    props.insert(TOTAL_PAGES.into(), properties::number(total_pages));
    props
}

pub fn event_properties(event: &ProgressEvent) -> Map<String, Value> {
    let mut props = Map::new();
    props.insert(BOOK_TITLE.into(), properties::title(&event.title));
    props.insert(PAGES_READ.into(), properties::number(event.pages_read));
    props.insert(BOOK_FINISHED.into(), properties::checkbox(event.finished));
    props
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn maps_page_with_missing_numbers_to_zero() {
        let page: Page = serde_json::from_value(json!({
            "id": "abc",
            "properties": {
                "Book Title": { "type": "title", "title": [{ "plain_text": "Dune" }] },
                "Current Page": { "type": "number", "number": null }
            }
        }))
        .unwrap();

        let book = map_page_to_book(&page);
        assert_eq!(
            book,
            BookRecord {
                id: "abc".into(),
                title: "Dune".into(),
                current_page: 0,
                total_pages: 0,
            }
        );
    }

    #[test]
    fn event_properties_shape() {
        let props = event_properties(&ProgressEvent::finished("Dune", 190));
        assert_eq!(props[BOOK_TITLE]["title"][0]["text"]["content"], "Dune");
        assert_eq!(props[PAGES_READ]["number"], 190);
        assert_eq!(props[BOOK_FINISHED]["checkbox"], true);
    }

    #[test]
    fn progress_properties_leave_title_alone() {
        let props = progress_properties(30, 200);
        assert!(!props.contains_key(BOOK_TITLE));
        assert_eq!(props[CURRENT_PAGE]["number"], 30);
        assert_eq!(props[TOTAL_PAGES]["number"], 200);
    }
}
