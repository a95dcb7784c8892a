//! HTTP request handlers.

pub(crate) mod offline;
pub(crate) mod pages;
pub(crate) mod print;
