//! Consistency check for `result_info` descriptors

use super::types::ResultInfo;

/// Check that a page descriptor is internally consistent and matches the request
///
/// `per_page` and `page` are the values the caller asked for and `count` is
/// the number of items actually present in the result array.
///
/// The empty collection is represented by `total == 0`, `total_pages == 0`
/// and `count == 0`. For non-empty collections every page before the last
/// must be full and the last page must hold exactly the remainder.
pub fn is_consistent(per_page: u32, page: u32, count: u32, info: &ResultInfo) -> bool {
    if info.per_page != per_page || info.page != page || info.count != count {
        return false;
    }

    if info.total == 0 {
        return info.total_pages == 0 && info.count == 0;
    }

    if info.per_page == 0 || info.page == 0 || info.page > info.total_pages {
        return false;
    }

    let per_page = u64::from(info.per_page);
    let total = u64::from(info.total);
    let total_pages = u64::from(info.total_pages);

    if total_pages != total.div_ceil(per_page) {
        return false;
    }

    if info.page < info.total_pages {
        return info.count == info.per_page;
    }

    u64::from(info.count) == total - per_page * (total_pages - 1)
}
