//! Shopify Admin API resources and payloads

use reqwest::header::{HeaderMap, LINK};
use serde::Deserialize;
use syncbridge_domain::DataType;
use url::Url;

/// REST collection backing one data type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Resource {
    pub path: &'static str,
    /// Top-level key holding the record array in the response body.
    pub key: &'static str,
}

impl Resource {
    pub fn for_data_type(data_type: DataType) -> Self {
        match data_type {
            DataType::Products => Self { path: "products.json", key: "products" },
            DataType::Orders => Self { path: "orders.json", key: "orders" },
            DataType::Customers => Self { path: "customers.json", key: "customers" },
            DataType::Inventory => Self { path: "inventory_levels.json", key: "inventory_levels" },
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ShopEnvelope {
    pub shop: Shop,
}

#[derive(Debug, Deserialize)]
pub(super) struct Shop {
    pub name: String,
    #[serde(default)]
    pub myshopify_domain: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct LocationsEnvelope {
    pub locations: Vec<Location>,
}

#[derive(Debug, Deserialize)]
pub(super) struct Location {
    pub id: u64,
}

/// Cursor URL of the next page from a `Link` header, if any.
///
/// Shopify answers with `<url>; rel="previous", <url>; rel="next"`.
pub(super) fn next_page(headers: &HeaderMap) -> Option<Url> {
    let link = headers.get(LINK)?.to_str().ok()?;
    link.split(',').find_map(|entry| {
        let mut parts = entry.split(';');
        let target = parts.next()?.trim().strip_prefix('<')?.strip_suffix('>')?;
        parts
            .any(|param| param.trim().eq_ignore_ascii_case("rel=\"next\""))
            .then(|| Url::parse(target).ok())
            .flatten()
    })
}
