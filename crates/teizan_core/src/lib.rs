pub mod affiliate;
pub mod article;
pub mod catalog;
pub mod config;
pub mod content;
pub mod error;
pub mod model;
pub mod plan;
pub mod prefecture;
pub mod render;
pub mod resolve;
pub mod sitemap;
pub mod store;
pub mod templates;
pub mod url;
pub mod wxr;
