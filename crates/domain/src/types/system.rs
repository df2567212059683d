//! Integrated system types
//!
//! An [`IntegratedSystem`] is one configured connection slot to an external
//! commerce/ERP back-end. The registry owns these records; the bound adapter
//! instance lives next to the record for as long as the system is registered.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
#[cfg(feature = "ts-gen")]
use ts_rs::TS;

use crate::errors::{Result, SyncBridgeError};

/* -------------------------------------------------------------------------- */
/* Enumerations */
/* -------------------------------------------------------------------------- */

/// External-system type (closed set)
///
/// Every variant is a known back-end; whether an adapter exists for it is
/// decided by the adapter catalog at registration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum SystemType {
    Shopify,
    WooCommerce,
    Odoo,
    QuickBooks,
}

crate::impl_domain_status_conversions!(SystemType {
    Shopify => "shopify",
    WooCommerce => "woo_commerce",
    Odoo => "odoo",
    QuickBooks => "quick_books",
});

impl SystemType {
    pub const ALL: [SystemType; 4] =
        [SystemType::Shopify, SystemType::WooCommerce, SystemType::Odoo, SystemType::QuickBooks];

    pub fn category(&self) -> SystemCategory {
        match self {
            Self::Shopify | Self::WooCommerce => SystemCategory::CommercePlatform,
            Self::Odoo => SystemCategory::Erp,
            Self::QuickBooks => SystemCategory::AccountingPlatform,
        }
    }
}

/// Broad family an external system belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemCategory {
    CommercePlatform,
    Erp,
    AccountingPlatform,
}

/// Connection lifecycle state
///
/// ```text
/// inactive ──connect──▶ connecting ──ok──▶ active
///     ▲                     │
///     │                     └──fail──▶ error ──connect──▶ connecting
///     └────────── disconnect (from any state) ────────────
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
#[serde(rename_all = "lowercase")]
pub enum SystemStatus {
    #[default]
    Inactive,
    Connecting,
    Active,
    Error,
}

crate::impl_domain_status_conversions!(SystemStatus {
    Inactive => "inactive",
    Connecting => "connecting",
    Active => "active",
    Error => "error",
});

impl SystemStatus {
    /// Active or in the middle of connecting.
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Active | Self::Connecting)
    }
}

/// Business-data category exchanged with external systems
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Products,
    Orders,
    Customers,
    Inventory,
}

crate::impl_domain_status_conversions!(DataType {
    Products => "products",
    Orders => "orders",
    Customers => "customers",
    Inventory => "inventory",
});

impl DataType {
    pub const ALL: [DataType; 4] =
        [DataType::Products, DataType::Orders, DataType::Customers, DataType::Inventory];
}

/// Deduplicate while keeping first-seen order.
pub fn dedup_data_types(types: &[DataType]) -> Vec<DataType> {
    let mut seen = BTreeSet::new();
    types.iter().copied().filter(|data_type| seen.insert(*data_type)).collect()
}

/* -------------------------------------------------------------------------- */
/* Connection configuration */
/* -------------------------------------------------------------------------- */

/// Opaque connection configuration handed verbatim to the bound adapter
///
/// Keys are adapter-specific (`shop_url`, `access_token`, `database`, ...).
/// The engine only merges overrides onto it; adapters validate what they need.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export, type = "Record<string, unknown>"))]
#[serde(transparent)]
pub struct ConnectionConfig(Map<String, Value>);

impl ConnectionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// String value for `key`, ignoring blank strings.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str).map(str::trim).filter(|s| !s.is_empty())
    }

    /// Required string value; a missing field is a configuration error.
    pub fn require_str(&self, key: &str) -> Result<&str> {
        self.get_str(key).ok_or_else(|| {
            SyncBridgeError::Config(format!("missing required config field '{key}'"))
        })
    }

    /// Copy of `self` with every key of `overrides` replacing its counterpart.
    pub fn merged(&self, overrides: &ConnectionConfig) -> ConnectionConfig {
        let mut merged = self.0.clone();
        for (key, value) in &overrides.0 {
            merged.insert(key.clone(), value.clone());
        }
        ConnectionConfig(merged)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for ConnectionConfig {
    fn from(value: Map<String, Value>) -> Self {
        Self(value)
    }
}

fn is_secret_key(key: &str) -> bool {
    let lower = key.to_ascii_lowercase();
    ["token", "secret", "password", "key"].iter().any(|marker| lower.contains(marker))
}

// Credentials end up in tracing fields via `?config`; never print them.
impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (key, value) in &self.0 {
            if is_secret_key(key) {
                map.entry(key, &"<redacted>");
            } else {
                map.entry(key, value);
            }
        }
        map.finish()
    }
}

/* -------------------------------------------------------------------------- */
/* Records */
/* -------------------------------------------------------------------------- */

/// One configured connection to an external business system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
pub struct IntegratedSystem {
    pub id: String,
    pub name: String,
    pub system_type: SystemType,
    pub version: String,
    pub status: SystemStatus,
    /// Never serialized: carries credentials.
    #[serde(skip_serializing, default)]
    #[cfg_attr(feature = "ts-gen", ts(skip))]
    pub config: ConnectionConfig,
    /// Data types this system is declared to synchronize, in declaration order.
    pub features: Vec<DataType>,
    pub last_sync_at: Option<DateTime<Utc>>,
    /// Start time of the latest `completed` job; incremental syncs fetch
    /// changes from here.
    #[serde(default)]
    pub sync_watermark: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl IntegratedSystem {
    pub fn supports(&self, data_type: DataType) -> bool {
        self.features.contains(&data_type)
    }
}

/// Registration request for a new system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSystem {
    pub name: String,
    pub system_type: SystemType,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub config: ConnectionConfig,
    /// Empty means "everything the adapter can do".
    #[serde(default)]
    pub features: Vec<DataType>,
}

impl NewSystem {
    pub fn new(name: impl Into<String>, system_type: SystemType) -> Self {
        Self {
            name: name.into(),
            system_type,
            version: String::new(),
            config: ConnectionConfig::new(),
            features: Vec::new(),
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_config(mut self, config: ConnectionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_features(mut self, features: impl IntoIterator<Item = DataType>) -> Self {
        self.features = features.into_iter().collect();
        self
    }
}

/// Result of a connectivity probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct ConnectionTestReport {
    pub success: bool,
    pub message: String,
    #[cfg_attr(feature = "ts-gen", ts(type = "number"))]
    pub response_time_ms: u64,
}

impl ConnectionTestReport {
    pub fn ok(message: impl Into<String>, response_time_ms: u64) -> Self {
        Self { success: true, message: message.into(), response_time_ms }
    }

    pub fn failed(message: impl Into<String>, response_time_ms: u64) -> Self {
        Self { success: false, message: message.into(), response_time_ms }
    }
}
