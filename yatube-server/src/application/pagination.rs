//! Постраничная разбивка упорядоченных списков.
//!
//! Номер страницы за пределами диапазона даёт пустую страницу, а не ошибку.

use std::ops::RangeInclusive;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Paginator {
    page_size: u32,
}

impl Paginator {
    pub(crate) const DEFAULT_PAGE_SIZE: u32 = 10;

    pub(crate) fn new(page_size: u32) -> Self {
        let page_size = if page_size == 0 {
            Self::DEFAULT_PAGE_SIZE
        } else {
            page_size
        };
        Self { page_size }
    }

    pub(crate) fn paginate<T>(&self, items: Vec<T>, page_number: u32) -> Page<T> {
        let number = page_number.max(1);
        let total_items = items.len();
        let size = self.page_size as usize;
        let offset = (number as usize - 1).saturating_mul(size);

        let items = items.into_iter().skip(offset).take(size).collect();
        let num_pages = total_items.div_ceil(size).max(1) as u32;

        Page {
            items,
            number,
            total_items,
            num_pages,
        }
    }
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PAGE_SIZE)
    }
}

/// Разбирает `?page=` снисходительно: отсутствующее, нечисловое или нулевое значение даёт 1.
pub(crate) fn parse_page_number(raw: Option<&str>) -> u32 {
    raw.and_then(|value| value.trim().parse::<u32>().ok())
        .filter(|number| *number > 0)
        .unwrap_or(1)
}

#[derive(Debug, Clone)]
pub(crate) struct Page<T> {
    pub(crate) items: Vec<T>,
    pub(crate) number: u32,
    pub(crate) total_items: usize,
    pub(crate) num_pages: u32,
}

impl<T> Page<T> {
    pub(crate) fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub(crate) fn has_previous(&self) -> bool {
        self.number > 1 && self.number <= self.num_pages
    }

    pub(crate) fn next_page_number(&self) -> Option<u32> {
        self.has_next().then(|| self.number + 1)
    }

    pub(crate) fn previous_page_number(&self) -> Option<u32> {
        self.has_previous().then(|| self.number - 1)
    }

    pub(crate) fn page_range(&self) -> RangeInclusive<u32> {
        1..=self.num_pages
    }
}
