//! `oficina-api` — REST backend for the shop.

pub mod app;
