//! Page-number windows for paginated listings.

use std::ops::Range;

use serde::{Serialize, Serializer};

/// Default number of items in a page window.
pub const DEFAULT_MAX_VISIBLE: u32 = 7;

/// Smallest window that still fits first, last, current and two ellipses.
pub const MIN_MAX_VISIBLE: u32 = 5;

/// One slot of a rendered page window.
///
/// Serializes as a bare page number or the string `"ellipsis"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page(u32),
    Ellipsis,
}

impl Serialize for PageItem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PageItem::Page(page) => serializer.serialize_u32(*page),
            PageItem::Ellipsis => serializer.serialize_str("ellipsis"),
        }
    }
}

/// Whether `max_visible` is inside the supported domain (odd, at least 5).
pub fn is_valid_max_visible(max_visible: u32) -> bool {
    max_visible >= MIN_MAX_VISIBLE && max_visible % 2 == 1
}

/// Computes which page numbers and ellipses to render.
///
/// `current` is 1-indexed. Inputs outside the documented domain are pulled
/// back into it (`total` of at least 1, `current` clamped, `max_visible`
/// raised to the next odd value of at least 5), so the function is total.
pub fn page_window(current: u32, total: u32, max_visible: u32) -> Vec<PageItem> {
    let total = total.max(1);
    let current = current.clamp(1, total);
    let max_visible = normalize_max_visible(max_visible);

    if total <= max_visible {
        return (1..=total).map(PageItem::Page).collect();
    }

    let half = max_visible / 2;
    let mut items = Vec::with_capacity(max_visible as usize);

    if current <= half + 1 {
        items.extend((1..=max_visible - 2).map(PageItem::Page));
        items.push(PageItem::Ellipsis);
        items.push(PageItem::Page(total));
    } else if current >= total - half {
        items.push(PageItem::Page(1));
        items.push(PageItem::Ellipsis);
        items.extend((total - (max_visible - 3)..=total).map(PageItem::Page));
    } else {
        // first, ellipsis, current and its neighbours, ellipsis, last.
        // At 5 there is only room for current itself.
        let siblings = if max_visible >= 7 { 1 } else { 0 };
        items.push(PageItem::Page(1));
        items.push(PageItem::Ellipsis);
        items.extend((current - siblings..=current + siblings).map(PageItem::Page));
        items.push(PageItem::Ellipsis);
        items.push(PageItem::Page(total));
    }

    items
}

fn normalize_max_visible(max_visible: u32) -> u32 {
    let max_visible = max_visible.max(MIN_MAX_VISIBLE);
    if max_visible % 2 == 0 {
        max_visible + 1
    } else {
        max_visible
    }
}

/// Number of pages needed for `item_count` items, never less than one.
pub fn total_pages(item_count: usize, per_page: usize) -> u32 {
    let pages = item_count.div_ceil(per_page.max(1)).max(1);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// Index range of `page` (1-indexed) inside a list of `item_count` items.
pub fn page_bounds(item_count: usize, page: u32, per_page: usize) -> Range<usize> {
    let per_page = per_page.max(1);
    let start = (page.max(1) as usize - 1)
        .saturating_mul(per_page)
        .min(item_count);
    let end = start.saturating_add(per_page).min(item_count);
    start..end
}

#[cfg(test)]
mod tests {
    use super::PageItem::{Ellipsis, Page};
    use super::*;

    fn concrete_pages(items: &[PageItem]) -> usize {
        items.iter().filter(|i| matches!(i, Page(_))).count()
    }

    #[test]
    fn test_near_start() {
        assert_eq!(
            page_window(1, 20, 7),
            vec![Page(1), Page(2), Page(3), Page(4), Page(5), Ellipsis, Page(20)]
        );
    }

    #[test]
    fn test_middle() {
        assert_eq!(
            page_window(10, 20, 7),
            vec![Page(1), Ellipsis, Page(9), Page(10), Page(11), Ellipsis, Page(20)]
        );
    }

    #[test]
    fn test_middle_keeps_one_neighbour_for_wider_windows() {
        let expected = vec![
            Page(1),
            Ellipsis,
            Page(19),
            Page(20),
            Page(21),
            Ellipsis,
            Page(40),
        ];
        assert_eq!(page_window(20, 40, 9), expected);
        assert_eq!(page_window(20, 40, 11), expected);
    }

    #[test]
    fn test_middle_at_minimum_width() {
        assert_eq!(
            page_window(10, 20, 5),
            vec![Page(1), Ellipsis, Page(10), Ellipsis, Page(20)]
        );
    }

    #[test]
    fn test_near_end() {
        assert_eq!(
            page_window(20, 20, 7),
            vec![Page(1), Ellipsis, Page(16), Page(17), Page(18), Page(19), Page(20)]
        );
    }

    #[test]
    fn test_regime_boundaries() {
        // last page still rendered from the start layout
        assert_eq!(page_window(4, 20, 7)[..5], [Page(1), Page(2), Page(3), Page(4), Page(5)]);
        assert_eq!(page_window(5, 20, 7)[2], Page(4));
        assert_eq!(page_window(17, 20, 7)[2], Page(16));
        assert_eq!(page_window(16, 20, 7)[2], Page(15));
    }

    #[test]
    fn test_single_page() {
        assert_eq!(page_window(1, 1, 7), vec![Page(1)]);
    }

    #[test]
    fn test_small_totals_have_no_ellipsis() {
        for total in 1..=7 {
            for current in 1..=total {
                let items = page_window(current, total, 7);
                assert_eq!(items.len(), total as usize);
                assert!(!items.contains(&Ellipsis));
            }
        }
    }

    #[test]
    fn test_start_and_end_are_mirror_images() {
        for max_visible in [5, 7, 9, 11] {
            let total = 50;
            let start = page_window(1, total, max_visible);
            let end = page_window(total, total, max_visible);
            assert_eq!(concrete_pages(&start), concrete_pages(&end));
            assert_eq!(start.len(), end.len());
        }
    }

    #[test]
    fn test_window_never_exceeds_max_visible() {
        for max_visible in [5, 7, 9] {
            for total in 1..=40 {
                for current in 1..=total {
                    let items = page_window(current, total, max_visible);
                    assert!(items.len() <= max_visible as usize);
                    assert!(items.contains(&Page(current)));
                    assert_eq!(items.first(), Some(&Page(1)));
                    assert_eq!(items.last(), Some(&Page(total)));
                }
            }
        }
    }

    #[test]
    fn test_pages_are_strictly_increasing() {
        for current in 1..=30 {
            let pages: Vec<u32> = page_window(current, 30, 9)
                .into_iter()
                .filter_map(|item| match item {
                    Page(page) => Some(page),
                    Ellipsis => None,
                })
                .collect();
            assert!(pages.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_out_of_domain_inputs_are_normalized() {
        assert_eq!(page_window(0, 0, 7), vec![Page(1)]);
        assert_eq!(page_window(99, 20, 7), page_window(20, 20, 7));
        assert_eq!(page_window(10, 20, 3), page_window(10, 20, 5));
        assert_eq!(page_window(10, 20, 6), page_window(10, 20, 7));
    }

    #[test]
    fn test_max_visible_domain() {
        assert!(is_valid_max_visible(5));
        assert!(is_valid_max_visible(7));
        assert!(!is_valid_max_visible(3));
        assert!(!is_valid_max_visible(8));
    }

    #[test]
    fn test_serializes_as_numbers_and_ellipsis() {
        let json = serde_json::to_string(&page_window(1, 20, 7)).unwrap();
        assert_eq!(json, r#"[1,2,3,4,5,"ellipsis",20]"#);
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 20), 1);
        assert_eq!(total_pages(20, 20), 1);
        assert_eq!(total_pages(21, 20), 2);
        assert_eq!(total_pages(5, 0), 5);
    }

    #[test]
    fn test_page_bounds() {
        assert_eq!(page_bounds(45, 1, 20), 0..20);
        assert_eq!(page_bounds(45, 3, 20), 40..45);
        assert_eq!(page_bounds(45, 4, 20), 45..45);
        assert_eq!(page_bounds(0, 1, 20), 0..0);
    }
}
