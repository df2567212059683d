//! Sync statistics types
//!
//! Reports are derived views: recomputed from history on every request and
//! never stored.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "ts-gen")]
use ts_rs::TS;

use super::system::{DataType, SystemType};

/// Rolling lookback window for reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
#[serde(rename_all = "lowercase")]
pub enum StatsPeriod {
    #[default]
    Day,
    Week,
    Month,
}

crate::impl_domain_status_conversions!(StatsPeriod {
    Day => "day",
    Week => "week",
    Month => "month",
});

impl StatsPeriod {
    /// Start of the window ending at `now`.
    ///
    /// Month is one calendar month back; if that date is not representable
    /// the window falls back to 31 days.
    pub fn window_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Self::Day => now - Duration::days(1),
            Self::Week => now - Duration::days(7),
            Self::Month => {
                now.checked_sub_months(Months::new(1)).unwrap_or_else(|| now - Duration::days(31))
            }
        }
    }
}

/* -------------------------------------------------------------------------- */
/* Reports */
/* -------------------------------------------------------------------------- */

/// Aggregate sync statistics over one window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
pub struct StatsReport {
    pub period: StatsPeriod,
    pub window_start: DateTime<Utc>,
    pub generated_at: DateTime<Utc>,
    #[cfg_attr(feature = "ts-gen", ts(type = "number"))]
    pub total_syncs: u64,
    #[cfg_attr(feature = "ts-gen", ts(type = "number"))]
    pub successful_syncs: u64,
    #[cfg_attr(feature = "ts-gen", ts(type = "number"))]
    pub failed_syncs: u64,
    #[cfg_attr(feature = "ts-gen", ts(type = "number"))]
    pub partial_syncs: u64,
    #[cfg_attr(feature = "ts-gen", ts(type = "number"))]
    pub total_records_processed: u64,
    #[cfg_attr(feature = "ts-gen", ts(type = "number"))]
    pub total_records_failed: u64,
    /// successful / total, `0.0` for an empty window.
    pub success_rate: f64,
    /// Mean job duration in seconds, `0.0` for an empty window.
    pub average_duration_secs: f64,
    pub by_system: Vec<SystemSyncStats>,
    /// Each job credits its full processed count to every data type it
    /// targeted; counts are not split between types.
    #[cfg_attr(feature = "ts-gen", ts(type = "Record<string, number>"))]
    pub by_data_type: BTreeMap<DataType, u64>,
}

/// Per-system slice of a [`StatsReport`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
pub struct SystemSyncStats {
    pub system_id: String,
    pub name: String,
    pub system_type: SystemType,
    #[cfg_attr(feature = "ts-gen", ts(type = "number"))]
    pub total_syncs: u64,
    #[cfg_attr(feature = "ts-gen", ts(type = "number"))]
    pub successful_syncs: u64,
    #[cfg_attr(feature = "ts-gen", ts(type = "number"))]
    pub failed_syncs: u64,
    #[cfg_attr(feature = "ts-gen", ts(type = "number"))]
    pub records_processed: u64,
    pub last_sync_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn day_and_week_windows_are_fixed_offsets() {
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();

        assert_eq!(
            StatsPeriod::Day.window_start(now),
            Utc.with_ymd_and_hms(2025, 3, 9, 12, 0, 0).unwrap()
        );
        assert_eq!(
            StatsPeriod::Week.window_start(now),
            Utc.with_ymd_and_hms(2025, 3, 3, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn month_window_is_calendar_month() {
        let now = Utc.with_ymd_and_hms(2025, 3, 31, 8, 0, 0).unwrap();

        // 31 March minus one month clamps to the end of February
        assert_eq!(
            StatsPeriod::Month.window_start(now),
            Utc.with_ymd_and_hms(2025, 2, 28, 8, 0, 0).unwrap()
        );
    }

    #[test]
    fn data_type_keys_serialize_as_names() {
        let mut by_type = BTreeMap::new();
        by_type.insert(DataType::Orders, 5u64);

        let json = serde_json::to_string(&by_type).unwrap();
        assert_eq!(json, r#"{"orders":5}"#);
    }
}
