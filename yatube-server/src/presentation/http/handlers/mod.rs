use serde::Deserialize;
use utoipa::IntoParams;

use crate::application::pagination::parse_page_number;

pub(crate) mod api;
pub(crate) mod auth;
pub(crate) mod pages;

/// `?page=N` для лент постов.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub(crate) struct PageQuery {
    /// Номер страницы, начиная с 1. Некорректное значение трактуется как 1.
    page: Option<String>,
}

impl PageQuery {
    pub(crate) fn number(&self) -> u32 {
        parse_page_number(self.page.as_deref())
    }
}
