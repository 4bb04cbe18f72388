use serde::Serialize;

pub const DEFAULT_PAGE_NUMBER: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// A normalized page request.
///
/// Page numbers below 1 collapse to the first page and a non-positive page
/// size falls back to [`DEFAULT_PAGE_SIZE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page_number: i64,
    page_size: i64,
}

impl PageRequest {
    pub fn new(page_number: Option<i64>, page_size: Option<i64>) -> Self {
        let page_number = match page_number {
            Some(n) if n > 0 => n,
            _ => DEFAULT_PAGE_NUMBER,
        };
        let page_size = match page_size {
            Some(n) if n > 0 => n,
            _ => DEFAULT_PAGE_SIZE,
        };

        Self {
            page_number,
            page_size,
        }
    }

    pub fn page_number(&self) -> i64 {
        self.page_number
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    /// Number of rows to skip before this page.
    pub fn offset(&self) -> i64 {
        (self.page_number - 1).saturating_mul(self.page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// One page of results plus the total number of matching rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub current_page: i64,
    pub page_size: i64,
    pub total_count: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total_count: i64, request: PageRequest) -> Self {
        Self {
            items,
            current_page: request.page_number(),
            page_size: request.page_size(),
            total_count,
        }
    }

    pub fn total_pages(&self) -> i64 {
        if self.total_count <= 0 {
            return 0;
        }
        self.total_count / self.page_size + i64::from(self.total_count % self.page_size != 0)
    }

    pub fn has_next_page(&self) -> bool {
        self.current_page < self.total_pages()
    }

    pub fn has_previous_page(&self) -> bool {
        self.current_page > 1
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            current_page: self.current_page,
            page_size: self.page_size,
            total_count: self.total_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_and_negative_pages_collapse_to_first_page() {
        assert_eq!(PageRequest::new(Some(0), Some(5)).page_number(), 1);
        assert_eq!(PageRequest::new(Some(-3), Some(5)).page_number(), 1);
        assert_eq!(PageRequest::new(None, None).page_number(), 1);
    }

    #[test]
    fn zero_page_size_defaults_to_ten() {
        assert_eq!(PageRequest::new(Some(2), Some(0)).page_size(), 10);
        assert_eq!(PageRequest::new(Some(2), None).page_size(), 10);
    }

    #[test]
    fn offset_skips_previous_pages() {
        assert_eq!(PageRequest::new(Some(1), Some(10)).offset(), 0);
        assert_eq!(PageRequest::new(Some(3), Some(25)).offset(), 50);
    }

    #[test]
    fn total_pages_rounds_up() {
        let page = Page::new(vec![1, 2, 3], 23, PageRequest::new(Some(1), Some(10)));
        assert_eq!(page.total_pages(), 3);
        assert!(page.has_next_page());
        assert!(!page.has_previous_page());

        let exact = Page::<i32>::new(vec![], 20, PageRequest::new(Some(2), Some(10)));
        assert_eq!(exact.total_pages(), 2);
        assert!(!exact.has_next_page());
        assert!(exact.has_previous_page());
    }

    #[test]
    fn huge_page_size_does_not_overflow() {
        let page = Page::<i32>::new(vec![], 2, PageRequest::new(Some(1), Some(i64::MAX)));
        assert_eq!(page.total_pages(), 1);
        assert!(!page.has_next_page());

        let far = PageRequest::new(Some(i64::MAX), Some(i64::MAX));
        assert_eq!(far.offset(), i64::MAX);
    }

    #[test]
    fn empty_result_has_no_pages() {
        let page = Page::<i32>::new(vec![], 0, PageRequest::default());
        assert_eq!(page.total_pages(), 0);
        assert!(!page.has_next_page());
    }
}
