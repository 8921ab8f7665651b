pub(crate) mod auth_service;
pub(crate) mod group_service;
pub(crate) mod pagination;
pub(crate) mod post_service;
