//! Precomputed dashboard counters served by the remote service.

use serde::{Deserialize, Serialize};

/// Counters computed server-side and fetched alongside the collections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardStats {
    #[serde(rename = "cultures_actives")]
    pub active_crops: u64,
    #[serde(rename = "rappels_pending")]
    pub pending_reminders: u64,
    #[serde(rename = "fiches_total")]
    pub sheet_count: u64,
    /// Revenue since the first day of the current month.
    #[serde(rename = "ca_mois")]
    pub month_revenue: f64,
    #[serde(rename = "stock_alertes")]
    pub stock_alerts: u64,
}
