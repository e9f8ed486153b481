//! Pagination over bounded scan results

use serde::Serialize;

/// Default page size
pub const DEFAULT_LIMIT: usize = 100;

/// Default upper bound on a single page
pub const DEFAULT_MAX_LIMIT: usize = 1000;

/// A normalized page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Number of items to skip
    pub offset: usize,
    /// Number of items per page, never zero
    pub limit: usize,
}

impl PageRequest {
    /// Create a page request, replacing a zero limit with `DEFAULT_LIMIT`
    pub fn new(offset: usize, limit: usize) -> Self {
        Self {
            offset,
            limit: if limit == 0 { DEFAULT_LIMIT } else { limit },
        }
    }

    /// Build a page request from raw query values.
    ///
    /// Each key may be given several times; the first valid value wins.
    /// Invalid values are replaced rather than rejected: a missing,
    /// non-numeric, negative or zero limit becomes `default_limit`, a limit
    /// above `max_limit` is clamped, and a bad offset becomes zero.
    pub fn from_query(
        offsets: &[&str],
        limits: &[&str],
        default_limit: usize,
        max_limit: usize,
    ) -> Self {
        let default_limit = default_limit.max(1);
        let limit = limits
            .iter()
            .filter_map(|raw| raw.trim().parse::<usize>().ok())
            .find(|&limit| limit > 0)
            .unwrap_or(default_limit)
            .min(max_limit.max(1));
        let offset = offsets
            .iter()
            .find_map(|raw| raw.trim().parse::<usize>().ok())
            .unwrap_or(0);
        Self { offset, limit }
    }

    /// Work limit to hand to the scanner.
    ///
    /// One past the end of the page, so that `has_more` can tell whether at
    /// least one further item exists.
    pub fn work_limit(&self) -> usize {
        self.offset.saturating_add(self.limit).saturating_add(1)
    }

    /// One-based page number
    pub fn current_page(&self) -> usize {
        self.offset / self.limit + 1
    }
}

/// A page of items cut from a bounded scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items on this page, in scan order
    pub items: Vec<T>,
    /// Items found within the scan bound. A lower bound on the real total
    /// when `total_is_exact` is false.
    pub total_count: usize,
    /// Whether at least one item exists past this page
    pub has_more: bool,
    /// Number of items skipped
    pub offset: usize,
    /// Page size
    pub limit: usize,
    /// False when the scan stopped at its work limit
    pub total_is_exact: bool,
}

impl<T> Page<T> {
    /// One-based page number
    pub fn current_page(&self) -> usize {
        PageRequest::new(self.offset, self.limit).current_page()
    }
}

/// Slice `items` (the result of a scan bounded by `work_limit`) into a page.
pub fn paginate<T>(items: Vec<T>, request: PageRequest, work_limit: usize) -> Page<T> {
    let total_count = items.len();
    let end = request.offset.saturating_add(request.limit);
    let items: Vec<T> = items
        .into_iter()
        .skip(request.offset)
        .take(request.limit)
        .collect();

    Page {
        items,
        total_count,
        has_more: total_count > end,
        offset: request.offset,
        limit: request.limit,
        total_is_exact: total_count < work_limit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_of_25(request: PageRequest) -> Page<usize> {
        let work_limit = request.work_limit();
        let scanned: Vec<usize> = (0..25).take(work_limit).collect();
        paginate(scanned, request, work_limit)
    }

    #[test]
    fn test_first_page() {
        let page = page_of_25(PageRequest::new(0, 10));
        assert_eq!(page.items, (0..10).collect::<Vec<_>>());
        assert!(page.has_more);
        assert_eq!(page.current_page(), 1);
        assert!(!page.total_is_exact);
    }

    #[test]
    fn test_last_partial_page() {
        let page = page_of_25(PageRequest::new(20, 10));
        assert_eq!(page.items, vec![20, 21, 22, 23, 24]);
        assert!(!page.has_more);
        assert_eq!(page.total_count, 25);
        assert_eq!(page.current_page(), 3);
        assert!(page.total_is_exact);
    }

    #[test]
    fn test_exact_boundary_has_no_more() {
        let page = page_of_25(PageRequest::new(15, 10));
        assert_eq!(page.items.len(), 10);
        assert!(!page.has_more);
    }

    #[test]
    fn test_offset_past_end() {
        let page = page_of_25(PageRequest::new(40, 10));
        assert!(page.items.is_empty());
        assert!(!page.has_more);
        assert_eq!(page.current_page(), 5);
    }

    #[test]
    fn test_from_query_defaults() {
        let request = PageRequest::from_query(&[], &[], 100, 1000);
        assert_eq!(request, PageRequest { offset: 0, limit: 100 });

        let request = PageRequest::from_query(&["abc"], &["-5"], 100, 1000);
        assert_eq!(request, PageRequest { offset: 0, limit: 100 });

        let request = PageRequest::from_query(&["-1"], &["0"], 100, 1000);
        assert_eq!(request, PageRequest { offset: 0, limit: 100 });

        let request = PageRequest::from_query(&["30"], &["15"], 100, 1000);
        assert_eq!(request, PageRequest { offset: 30, limit: 15 });
        assert_eq!(request.current_page(), 3);
    }

    #[test]
    fn test_from_query_repeated_keys() {
        let request = PageRequest::from_query(&["10", "20"], &["5", "7"], 100, 1000);
        assert_eq!(request, PageRequest { offset: 10, limit: 5 });

        let request = PageRequest::from_query(&["x", "4"], &["0", "bad", "8"], 100, 1000);
        assert_eq!(request, PageRequest { offset: 4, limit: 8 });
    }

    #[test]
    fn test_from_query_clamps_limit() {
        let request = PageRequest::from_query(&[], &["5000"], 100, 1000);
        assert_eq!(request.limit, 1000);
    }

    #[test]
    fn test_zero_limit_is_replaced() {
        assert_eq!(PageRequest::new(0, 0).limit, DEFAULT_LIMIT);
    }

    #[test]
    fn test_work_limit_covers_page_plus_lookahead() {
        assert_eq!(PageRequest::new(20, 10).work_limit(), 31);
        assert_eq!(PageRequest::new(usize::MAX, 10).work_limit(), usize::MAX);
    }
}
