pub const DEFAULT_PAGE_SIZE: usize = 25;

/// Page arithmetic over `total` rows. Only clamps; never resets the page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pager {
    pub total: usize,
    pub page_size: usize,
}

impl Pager {
    pub fn new(total: usize, page_size: usize) -> Self {
        Self {
            total,
            page_size: page_size.max(1),
        }
    }

    pub fn page_count(&self) -> usize {
        self.total.div_ceil(self.page_size).max(1)
    }

    /// Half-open row range shown on 1-based `page`, clamped to the rows present.
    pub fn bounds(&self, page: usize) -> (usize, usize) {
        let start = page
            .saturating_sub(1)
            .saturating_mul(self.page_size)
            .min(self.total);
        let end = start.saturating_add(self.page_size).min(self.total);
        (start, end)
    }

    pub fn slice<'a, T>(&self, rows: &'a [T], page: usize) -> &'a [T] {
        let (start, end) = self.bounds(page);
        let end = end.min(rows.len());
        let start = start.min(end);
        &rows[start..end]
    }

    pub fn has_prev(&self, page: usize) -> bool {
        page > 1
    }

    pub fn has_next(&self, page: usize) -> bool {
        page < self.page_count()
    }

    pub fn first(&self, page: usize) -> usize {
        if self.has_prev(page) {
            1
        } else {
            page
        }
    }

    pub fn prev(&self, page: usize) -> usize {
        if self.has_prev(page) {
            page - 1
        } else {
            page
        }
    }

    pub fn next(&self, page: usize) -> usize {
        if self.has_next(page) {
            page + 1
        } else {
            page
        }
    }

    pub fn last(&self, page: usize) -> usize {
        if self.has_next(page) {
            self.page_count()
        } else {
            page
        }
    }

    /// `Showing a–b of n`, with `a` = 0 when there are no rows.
    pub fn showing_label(&self, page: usize) -> String {
        let (start, end) = self.bounds(page);
        let first = if self.total == 0 { 0 } else { start + 1 };
        format!("Showing {}–{} of {}", first, end, self.total)
    }
}
