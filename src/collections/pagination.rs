//! Splitting ordered records into listing pages.
//!
//! Page `k` (1-based) holds items `[(k-1)·P, k·P)`; the last page holds the
//! remainder. An empty input still yields one empty page so every listing
//! has an index. Page 1 is written as `index.html` and linked by its
//! folder URL; later pages are `k.html`.

use crate::layout::INDEX_FILE;

/// One listing page borrowed from the full sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page<'a, T> {
    /// 1-based page number.
    pub number: usize,
    /// Total number of pages in the listing.
    pub count: usize,
    pub items: &'a [T],
}

impl<T> Page<'_, T> {
    pub fn is_last(&self) -> bool {
        self.number == self.count
    }

    /// File name inside the listing's folder.
    pub fn file_name(&self) -> String {
        if self.number == 1 {
            INDEX_FILE.to_string()
        } else {
            format!("{}.html", self.number)
        }
    }

    /// Destination-relative path under the listing folder `dir`.
    pub fn output_path(&self, dir: &str) -> String {
        format!("{}/{}", dir.trim_end_matches('/'), self.file_name())
    }

    /// Site URL path under the listing folder `dir` (`/blog/` or `/blog/3.html`).
    pub fn url(&self, dir: &str) -> String {
        let dir = dir.trim_end_matches('/');
        if self.number == 1 {
            format!("{dir}/")
        } else {
            format!("{dir}/{}", self.file_name())
        }
    }
}

/// Split `items` into pages of `per_page` items.
pub fn paginate<T>(items: &[T], per_page: usize) -> Vec<Page<'_, T>> {
    let per_page = per_page.max(1);
    if items.is_empty() {
        return vec![Page {
            number: 1,
            count: 1,
            items,
        }];
    }
    let count = items.len().div_ceil(per_page);
    items
        .chunks(per_page)
        .enumerate()
        .map(|(i, chunk)| Page {
            number: i + 1,
            count,
            items: chunk,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sizes(pages: &[Page<'_, u32>]) -> Vec<usize> {
        pages.iter().map(|p| p.items.len()).collect()
    }

    #[test]
    fn twenty_five_items_make_three_pages() {
        let items: Vec<u32> = (0..25).collect();
        let pages = paginate(&items, 10);
        assert_eq!(sizes(&pages), vec![10, 10, 5]);
        assert_eq!(pages[2].items, &items[20..]);
        assert!(pages[2].is_last());
        assert!(!pages[1].is_last());
    }

    #[test]
    fn exact_multiple_has_no_empty_trailing_page() {
        let items: Vec<u32> = (0..10).collect();
        let pages = paginate(&items, 10);
        assert_eq!(sizes(&pages), vec![10]);
        assert_eq!(pages[0].count, 1);
    }

    #[test]
    fn empty_input_yields_single_empty_page() {
        let pages = paginate::<u32>(&[], 10);
        assert_eq!(pages.len(), 1);
        assert!(pages[0].items.is_empty());
        assert!(pages[0].is_last());
    }

    #[test]
    fn first_page_is_index() {
        let items = [1u32, 2, 3];
        let pages = paginate(&items, 2);
        assert_eq!(pages[0].file_name(), "index.html");
        assert_eq!(pages[0].output_path("blog"), "blog/index.html");
        assert_eq!(pages[0].url("/blog"), "/blog/");
        assert_eq!(pages[1].file_name(), "2.html");
        assert_eq!(pages[1].output_path("blog/4"), "blog/4/2.html");
        assert_eq!(pages[1].url("/blog/4/"), "/blog/4/2.html");
    }

    #[test]
    fn zero_page_size_treated_as_one() {
        let items = [1u32, 2];
        assert_eq!(paginate(&items, 0).len(), 2);
    }
}
