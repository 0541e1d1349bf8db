use serde::Serialize;

/// A record that could not be projected and was left out of the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectionFailure {
    /// `None` when the record was too malformed to read an id from.
    pub request_id: Option<i64>,
    pub reason: String,
}

/// An offset window over an ordered result set.
///
/// `pages == ceil(results / page_size)` and `1 <= page <= max(pages, 1)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub page: u32,
    pub page_size: u32,
    pub pages: u32,
    pub results: u32,
    pub items: Vec<T>,
    /// Records excluded because they failed to project. Not part of `results`.
    pub errors: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<ProjectionFailure>,
}

#[must_use]
pub fn page_count(results: u32, page_size: u32) -> u32 {
    if page_size == 0 {
        0
    } else {
        results.div_ceil(page_size)
    }
}

impl<T> Page<T> {
    /// Cuts `take` items starting at `skip` out of the full ordered set.
    ///
    /// Callers validate `take > 0` and `skip < results` beforehand.
    #[must_use]
    pub fn window(all: Vec<T>, take: u32, skip: u32, failures: Vec<ProjectionFailure>) -> Self {
        let results = u32::try_from(all.len()).unwrap_or(u32::MAX);
        let pages = page_count(results, take);
        let page = (if take == 0 { 1 } else { skip / take + 1 }).min(pages.max(1));

        let items = all
            .into_iter()
            .skip(skip as usize)
            .take(take as usize)
            .collect();

        Self {
            page,
            page_size: take,
            pages,
            results,
            items,
            errors: u32::try_from(failures.len()).unwrap_or(u32::MAX),
            failures,
        }
    }

    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.page < self.pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(page_count(5, 20), 1);
        assert_eq!(page_count(45, 20), 3);
        assert_eq!(page_count(40, 20), 2);
        assert_eq!(page_count(0, 20), 0);
        assert_eq!(page_count(10, 0), 0);
    }

    #[test]
    fn window_slices_and_numbers_pages() {
        let all: Vec<u32> = (0..45).collect();
        let page = Page::window(all, 20, 40, vec![]);

        assert_eq!(page.page, 3);
        assert_eq!(page.pages, 3);
        assert_eq!(page.results, 45);
        assert_eq!(page.items, vec![40, 41, 42, 43, 44]);
        assert!(!page.has_more());
    }

    #[test]
    fn unaligned_skip_stays_in_range() {
        let all: Vec<u32> = (0..2).collect();
        let page = Page::window(all, 20, 1, vec![]);
        assert_eq!(page.page, 1);
        assert_eq!(page.pages, 1);
        assert_eq!(page.items, vec![1]);
    }

    #[test]
    fn empty_set_is_page_one_of_zero() {
        let page: Page<u32> = Page::window(vec![], 20, 0, vec![]);
        assert_eq!(page.page, 1);
        assert_eq!(page.pages, 0);
        assert_eq!(page.results, 0);
        assert!(page.items.is_empty());
    }

    #[test]
    fn failures_are_tallied_separately() {
        let failures = vec![ProjectionFailure {
            request_id: Some(9),
            reason: "bad".into(),
        }];
        let page = Page::window(vec![1, 2, 3], 20, 0, failures);
        assert_eq!(page.results, 3);
        assert_eq!(page.errors, 1);

        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["pageSize"], 20);
        assert_eq!(json["errors"], 1);
        assert_eq!(json["failures"][0]["request_id"], 9);
    }
}
