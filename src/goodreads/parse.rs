use scraper::{ElementRef, Html, Selector};

use crate::domain::models::SnapshotEntry;

const SECTION_HEADING: &str = "is Currently Reading";

fn selector(css: &str) -> anyhow::Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow::anyhow!("invalid selector {css:?}: {e:?}"))
}

/// Collapse runs of whitespace, as browsers render text.
fn normalized_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Extract the "currently reading" books from a profile page, in display order.
///
/// Fails when the section cannot be located. Individual updates whose progress
/// cannot be read are returned without page data.
pub fn parse_currently_reading(html: &str) -> anyhow::Result<Vec<SnapshotEntry>> {
    let document = Html::parse_document(html);

    let heading = document
        .select(&selector("h2")?)
        .find(|h| normalized_text(*h).contains(SECTION_HEADING))
        .ok_or_else(|| anyhow::anyhow!("could not find '{SECTION_HEADING}' section in the page"))?;

    // The heading sits in its own container; the updates are in the enclosing box.
    let section = heading
        .ancestors()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "div")
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!("'{SECTION_HEADING}' heading has no enclosing section"))?;

    let updates = selector("div.Updates")?;
    let title = selector("a.bookTitle")?;
    let progress = selector(r#"a[onclick*="clickPageOfBook"]"#)?;

    let mut entries = Vec::new();
    for update in section.select(&updates) {
        let Some(book_title) = update
            .select(&title)
            .next()
            .map(normalized_text)
            .filter(|t| !t.is_empty())
        else {
            tracing::warn!("skipping reading update without a book title");
            continue;
        };

        let pages = update
            .select(&progress)
            .next()
            .map(normalized_text)
            .and_then(|text| {
                let parsed = parse_progress(&text);
                if parsed.is_none() {
                    tracing::debug!(title = %book_title, %text, "unrecognised progress text");
                }
                parsed
            });

        entries.push(match pages {
            Some((current, total)) => SnapshotEntry::new(book_title, current, total),
            None => SnapshotEntry::without_progress(book_title),
        });
    }

    Ok(entries)
}

/// "(page 30 of 412)" -> (30, 412)
fn parse_progress(text: &str) -> Option<(i64, i64)> {
    let inner = text.trim().strip_prefix("(page ")?.strip_suffix(')')?;
    let (current, total) = inner.split_once(" of ")?;
    Some((parse_count(current)?, parse_count(total)?))
}

fn parse_count(s: &str) -> Option<i64> {
    s.trim().replace(',', "").parse().ok()
}
