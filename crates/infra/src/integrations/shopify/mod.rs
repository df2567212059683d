//! Shopify Admin REST API adapter

mod adapter;
mod types;

pub use adapter::ShopifyAdapter;
