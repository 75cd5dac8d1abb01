//! HTTP handlers, one module per resource.

pub mod auth;
pub mod cattle;
pub mod checkup;
pub mod employee;
pub mod feed;
pub mod feed_stock;
pub mod milk;
pub mod role;
pub mod vaccination;
