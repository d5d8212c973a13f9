//! Page windows for one fetch cycle.

/// The `(offset, limit)` windows covering `min(count, max_results)` features.
///
/// Windows are contiguous, start at zero and never overlap; every window
/// but the last is exactly `page_size` long.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagePlan {
    total: usize,
    page_size: usize,
}

impl PagePlan {
    /// Plan pages for `count` matching features, capped by `max_results`.
    ///
    /// A zero `page_size` is treated as 1.
    pub fn new(count: usize, max_results: Option<usize>, page_size: usize) -> Self {
        Self {
            total: max_results.map_or(count, |cap| count.min(cap)),
            page_size: page_size.max(1),
        }
    }

    /// Number of features the cycle will fetch.
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Number of pages.
    pub fn len(&self) -> usize {
        self.total.div_ceil(self.page_size)
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// The windows in offset order.
    pub fn pages(&self) -> impl Iterator<Item = (usize, usize)> + Clone + Send + 'static {
        let (total, page_size) = (self.total, self.page_size);
        (0..total)
            .step_by(page_size)
            .map(move |offset| (offset, page_size.min(total - offset)))
    }
}
