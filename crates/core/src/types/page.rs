//! Paginated responses from the backend.

use serde::{Deserialize, Serialize};

/// One page of results, zero-based.
///
/// Mirrors the backend's page envelope
/// (`{ content, totalPages, totalElements, number, size }`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_elements: u64,
    /// Zero-based index of this page.
    #[serde(default)]
    pub number: u32,
    #[serde(default)]
    pub size: u32,
}

impl<T> Page<T> {
    /// A page holding every item, used when results are not paginated (search).
    #[must_use]
    pub fn single(content: Vec<T>) -> Self {
        let len = content.len();
        Self {
            content,
            total_pages: 1,
            total_elements: len as u64,
            number: 0,
            size: u32::try_from(len).unwrap_or(u32::MAX),
        }
    }

    /// Whether there is more than one page to navigate between.
    #[must_use]
    pub const fn is_paginated(&self) -> bool {
        self.total_pages > 1
    }

    /// Whether a page follows this one.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.number + 1 < self.total_pages
    }

    /// Whether a page precedes this one.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.number > 0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_page_envelope() {
        let json = r#"{"content":[1,2,3],"totalPages":4,"totalElements":40,"number":1,"size":12,"first":false}"#;
        let page: Page<u8> = serde_json::from_str(json).unwrap();
        assert_eq!(page.content, vec![1, 2, 3]);
        assert!(page.is_paginated());
        assert!(page.has_next());
        assert!(page.has_previous());
    }

    #[test]
    fn test_last_page_has_no_next() {
        let page = Page {
            content: vec!["a"],
            total_pages: 2,
            total_elements: 13,
            number: 1,
            size: 12,
        };
        assert!(!page.has_next());
    }

    #[test]
    fn test_single_page() {
        let page = Page::single(vec!["a", "b"]);
        assert!(!page.is_paginated());
        assert!(!page.has_previous());
        assert_eq!(page.total_elements, 2);
    }
}
