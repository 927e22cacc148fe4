//! Page list built from the configured pictures.
//!
//! The cover faces the first picture, the remaining pictures are paired
//! front/back across the inner pages, and the last picture faces the back
//! cover.

use crate::config::CatalogConfig;
use crate::error::{Result, StorybookError};
use crate::types::PageSpec;

/// Build the page list of a book.
pub fn build_pages(catalog: &CatalogConfig) -> Result<Vec<PageSpec>> {
    let pictures = &catalog.pictures;
    let len = pictures.len();
    if len == 0 {
        return Err(StorybookError::InvalidConfig(
            "catalog needs at least one picture".to_string(),
        ));
    }

    let mut pages = vec![PageSpec::new(catalog.cover.as_str(), pictures[0].as_str())];

    let mut i = 1;
    while i + 1 < len {
        pages.push(PageSpec::new(
            pictures[i % len].as_str(),
            pictures[(i + 1) % len].as_str(),
        ));
        i += 2;
    }

    pages.push(PageSpec::new(
        pictures[len - 1].as_str(),
        catalog.back_cover.as_str(),
    ));

    Ok(pages)
}

/// Label shown on the page selector button.
pub fn page_label(index: usize) -> String {
    if index == 0 {
        "Cover".to_string()
    } else {
        format!("Page {}", index)
    }
}

/// Every texture id a page list references, in first-use order.
pub fn texture_ids(pages: &[PageSpec]) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for page in pages {
        for id in [&page.front, &page.back] {
            if !ids.contains(id) {
                ids.push(id.clone());
            }
        }
    }
    ids
}
