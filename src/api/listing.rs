//! Shared pieces of the filtered-list pattern: query-parameter
//! normalization, the pagination window, and the response metadata block.
//!
//! Every list endpoint goes through the same steps: normalize the raw
//! parameters into a per-resource list spec, run count and fetch off that
//! one spec, then report `_page` / `_limit` / `_totalRows` computed from the
//! raw parameters and the filter-only total.

use serde::Serialize;

/// Reference-filter value that means "no filter on this field".
pub(crate) const REFERENCE_ALL: &str = "all";

/// A resolved pagination window. Only exists when both `_page` and `_limit`
/// were supplied and positive; otherwise the full filtered set is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PageWindow {
    pub(crate) page: i64,
    pub(crate) limit: i64,
}

impl PageWindow {
    /// Zero and negative values count as unset.
    pub(crate) fn from_params(page: Option<i64>, limit: Option<i64>) -> Option<Self> {
        match (page, limit) {
            (Some(page), Some(limit)) if page > 0 && limit > 0 => Some(Self { page, limit }),
            _ => None,
        }
    }

    pub(crate) fn skip(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

/// Trim the search term; an absent or blank `_q` disables search entirely.
pub(crate) fn normalize_search(raw: Option<String>) -> Option<String> {
    raw.map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

/// Parse a reference filter at the boundary: blank or the `"all"` sentinel
/// become "no filter".
pub(crate) fn normalize_reference(raw: Option<String>) -> Option<String> {
    raw.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty() && value != REFERENCE_ALL)
}

#[derive(Debug, Serialize)]
pub(crate) struct PaginationMeta {
    #[serde(rename = "_page")]
    pub(crate) page: i64,
    #[serde(rename = "_limit")]
    pub(crate) limit: i64,
    #[serde(rename = "_totalRows")]
    pub(crate) total_rows: i64,
}

impl PaginationMeta {
    /// `_page` falls back to 1 and `_limit` to the total row count, mirroring
    /// the raw parameters rather than the resolved window.
    pub(crate) fn new(page: Option<i64>, limit: Option<i64>, total_rows: i64) -> Self {
        Self {
            page: page.filter(|value| *value > 0).unwrap_or(1),
            limit: limit.filter(|value| *value > 0).unwrap_or(total_rows),
            total_rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_requires_both_parameters() {
        assert_eq!(PageWindow::from_params(Some(2), None), None);
        assert_eq!(PageWindow::from_params(None, Some(10)), None);
        assert_eq!(PageWindow::from_params(None, None), None);
        assert_eq!(
            PageWindow::from_params(Some(2), Some(10)),
            Some(PageWindow { page: 2, limit: 10 })
        );
    }

    #[test]
    fn non_positive_window_values_count_as_unset() {
        assert_eq!(PageWindow::from_params(Some(0), Some(10)), None);
        assert_eq!(PageWindow::from_params(Some(-1), Some(10)), None);
        assert_eq!(PageWindow::from_params(Some(1), Some(0)), None);
        assert_eq!(PageWindow::from_params(Some(1), Some(-5)), None);
    }

    #[test]
    fn skip_is_zero_based() {
        assert_eq!(PageWindow { page: 1, limit: 25 }.skip(), 0);
        assert_eq!(PageWindow { page: 3, limit: 25 }.skip(), 50);
    }

    #[test]
    fn blank_search_is_absent() {
        assert_eq!(normalize_search(None), None);
        assert_eq!(normalize_search(Some("".to_string())), None);
        assert_eq!(normalize_search(Some("   ".to_string())), None);
        assert_eq!(normalize_search(Some(" algebra ".to_string())), Some("algebra".to_string()));
    }

    #[test]
    fn all_sentinel_means_no_reference_filter() {
        assert_eq!(normalize_reference(Some("all".to_string())), None);
        assert_eq!(normalize_reference(Some("".to_string())), None);
        assert_eq!(normalize_reference(None), None);
        assert_eq!(normalize_reference(Some("course-1".to_string())), Some("course-1".to_string()));
    }

    #[test]
    fn pagination_meta_defaults() {
        let meta = PaginationMeta::new(None, None, 42);
        assert_eq!(meta.page, 1);
        assert_eq!(meta.limit, 42);
        assert_eq!(meta.total_rows, 42);
    }

    #[test]
    fn pagination_meta_echoes_raw_parameters() {
        let meta = PaginationMeta::new(Some(3), Some(10), 42);
        assert_eq!(meta.page, 3);
        assert_eq!(meta.limit, 10);

        // A lone `_page` is echoed even though no slicing happened.
        let meta = PaginationMeta::new(Some(5), None, 42);
        assert_eq!(meta.page, 5);
        assert_eq!(meta.limit, 42);
    }

    #[test]
    fn pagination_meta_treats_non_positive_as_unset() {
        let meta = PaginationMeta::new(Some(0), Some(-3), 7);
        assert_eq!(meta.page, 1);
        assert_eq!(meta.limit, 7);
    }

    #[test]
    fn pagination_meta_serializes_underscore_keys() {
        let meta = PaginationMeta::new(Some(2), Some(10), 42);
        let json = serde_json::to_value(&meta).expect("serialize");
        assert_eq!(json["_page"], 2);
        assert_eq!(json["_limit"], 10);
        assert_eq!(json["_totalRows"], 42);
    }
}
