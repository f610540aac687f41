use crate::models::PageMeta;

/// Table pagination. `page` is 1-based and always within `[1, total_pages]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u64,
    pub page_size: u64,
    pub total: u64,
    pub total_pages: u64,
}

pub fn total_pages(total: u64, page_size: u64) -> u64 {
    if total == 0 || page_size == 0 {
        1
    } else {
        total.div_ceil(page_size)
    }
}

impl Pagination {
    pub fn empty(page_size: u64) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            total: 0,
            total_pages: 1,
        }
    }

    /// Builds the pagination for a freshly loaded table page. Missing or
    /// nonsensical meta fields fall back to the request and the entry count.
    pub fn resolve(meta: Option<PageMeta>, requested_page: u64, entry_count: usize, default_page_size: u64) -> Self {
        let total = meta.map(|m| m.total).unwrap_or(entry_count as u64);
        let page_size = meta
            .map(|m| m.page_size)
            .filter(|size| *size > 0)
            .unwrap_or(default_page_size.max(1));
        let page = meta.map(|m| m.page).unwrap_or(requested_page);

        let mut pagination = Self {
            page,
            page_size,
            total,
            total_pages: total_pages(total, page_size),
        };
        pagination.set_page(page);
        pagination
    }

    /// Moves to `requested`, clamped to the valid range. With no entries the
    /// page is pinned to 1.
    pub fn set_page(&mut self, requested: u64) -> u64 {
        self.page = if self.total == 0 {
            1
        } else {
            requested.clamp(1, self.total_pages)
        };
        self.page
    }

    pub fn prev_enabled(&self) -> bool {
        self.total > 0 && self.page > 1
    }

    pub fn next_enabled(&self) -> bool {
        self.total > 0 && self.page < self.total_pages
    }

    pub fn prev_page(&self) -> Option<u64> {
        self.prev_enabled().then(|| self.page - 1)
    }

    pub fn next_page(&self) -> Option<u64> {
        self.next_enabled().then(|| self.page + 1)
    }

    pub fn summary(&self) -> String {
        if self.total == 0 {
            "no entries yet".to_string()
        } else {
            format!(
                "page {} / {}, {} entries in total",
                self.page, self.total_pages, self.total
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_is_ceiling() {
        assert_eq!(total_pages(0, 20), 1);
        assert_eq!(total_pages(1, 20), 1);
        assert_eq!(total_pages(20, 20), 1);
        assert_eq!(total_pages(21, 20), 2);
        assert_eq!(total_pages(95, 10), 10);
    }

    #[test]
    fn set_page_stays_in_range() {
        for total in 1..=60u64 {
            for page_size in 1..=12u64 {
                let mut pagination = Pagination {
                    page: 1,
                    page_size,
                    total,
                    total_pages: total_pages(total, page_size),
                };
                assert_eq!(pagination.total_pages, total.div_ceil(page_size));
                for requested in [0, 1, 2, 5, 50, u64::MAX] {
                    let page = pagination.set_page(requested);
                    assert!((1..=pagination.total_pages).contains(&page));
                }
            }
        }
    }

    #[test]
    fn empty_total_pins_page_and_disables_controls() {
        let mut pagination = Pagination::resolve(
            Some(PageMeta { page: 3, page_size: 20, total: 0 }),
            3,
            0,
            20,
        );
        assert_eq!(pagination.page, 1);
        assert_eq!(pagination.total_pages, 1);
        assert_eq!(pagination.set_page(7), 1);
        assert!(!pagination.prev_enabled());
        assert!(!pagination.next_enabled());
        assert_eq!(pagination.summary(), "no entries yet");
    }

    #[test]
    fn resolve_clamps_server_page() {
        let pagination = Pagination::resolve(
            Some(PageMeta { page: 9, page_size: 20, total: 45 }),
            9,
            5,
            20,
        );
        assert_eq!(pagination.page, 3);
        assert_eq!(pagination.total_pages, 3);
        assert!(pagination.prev_enabled());
        assert!(!pagination.next_enabled());
        assert_eq!(pagination.prev_page(), Some(2));
        assert_eq!(pagination.next_page(), None);
        assert_eq!(pagination.summary(), "page 3 / 3, 45 entries in total");
    }

    #[test]
    fn resolve_without_meta_uses_entry_count() {
        let pagination = Pagination::resolve(None, 2, 7, 20);
        assert_eq!(pagination.total, 7);
        assert_eq!(pagination.page_size, 20);
        assert_eq!(pagination.page, 1);
    }
}
