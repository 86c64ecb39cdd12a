use tracing::trace;

/// Fixed size window over the filtered records.
///
/// The page index always points at an existing page, out of range requests
/// are clamped instead of rejected. An empty collection still has one page.
#[derive(Debug, Clone, PartialEq)]
pub struct Paginator {
    page_index: usize,
    page_size: usize,
}

impl Paginator {
    pub fn new(page_size: usize) -> Self {
        Paginator {
            page_index: 0,
            page_size: page_size.max(1),
        }
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn page_count(&self, total: usize) -> usize {
        total.div_ceil(self.page_size).max(1)
    }

    pub fn can_go_next(&self, total: usize) -> bool {
        self.page_index + 1 < self.page_count(total)
    }

    pub fn can_go_previous(&self) -> bool {
        self.page_index > 0
    }

    pub fn set_page_index(&mut self, index: usize, total: usize) {
        let last = self.page_count(total) - 1;
        self.page_index = index.min(last);
        trace!("Page index {index} => {}/{last}", self.page_index);
    }

    pub fn set_page_size(&mut self, page_size: usize, total: usize) {
        self.page_size = page_size.max(1);
        self.clamp(total);
    }

    pub fn next_page(&mut self, total: usize) {
        if self.can_go_next(total) {
            self.page_index += 1;
        }
    }

    pub fn previous_page(&mut self) {
        if self.can_go_previous() {
            self.page_index -= 1;
        }
    }

    pub fn first_page(&mut self) {
        self.page_index = 0;
    }

    pub fn last_page(&mut self, total: usize) {
        self.page_index = self.page_count(total) - 1;
    }

    pub fn reset(&mut self) {
        self.page_index = 0;
    }

    pub fn clamp(&mut self, total: usize) {
        self.set_page_index(self.page_index, total);
    }

    /// Range of filtered positions visible on the current page.
    pub fn page_range(&self, total: usize) -> std::ops::Range<usize> {
        let begin = std::cmp::min(self.page_index * self.page_size, total);
        let end = std::cmp::min(begin + self.page_size, total);
        begin..end
    }
}
