//! Dashboard summary.

use chrono::NaiveDate;

use zbalo_records::{DashboardStats, StockItem, StockLevel};

use crate::reminders::{ReminderScheduler, ReminderView};
use crate::store::Snapshot;

#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    /// Counters as precomputed by the service.
    pub stats: DashboardStats,
    /// Overdue reminders and those due within the dashboard window.
    pub upcoming: Vec<ReminderView>,
    /// Count shown on the reminders tab.
    pub reminder_badge: usize,
    /// Stock items running out or low, lowest first.
    pub low_stock: Vec<StockItem>,
}

impl Dashboard {
    pub fn build(snapshot: &Snapshot, scheduler: &ReminderScheduler, today: NaiveDate) -> Self {
        let mut low_stock: Vec<StockItem> = snapshot
            .stock
            .iter()
            .filter(|item| item.level() != StockLevel::Ok)
            .cloned()
            .collect();
        low_stock.sort_by_key(StockItem::level_percent);

        Self {
            stats: snapshot.stats.clone(),
            upcoming: scheduler.dashboard(&snapshot.reminders, today),
            reminder_badge: scheduler.badge_count(&snapshot.reminders, today),
            low_stock,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use zbalo_core::RecordId;
    use zbalo_records::Reminder;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
    }

    fn stock(id: i64, quantity: f64) -> StockItem {
        serde_json::from_value(serde_json::json!({
            "id": id, "nom": format!("s{id}"), "qte": quantity, "qte_max": 100
        }))
        .unwrap()
    }

    #[test]
    fn dashboard_combines_stats_reminders_and_stock() {
        let reminders = [0, 5, 10, 20]
            .into_iter()
            .map(|d| Reminder {
                id: RecordId::new(d),
                date: Some(today() + Duration::days(d)),
                label: "x".into(),
                icon: None,
            })
            .collect();
        let snapshot = Snapshot {
            reminders,
            stock: vec![stock(1, 80.0), stock(2, 30.0), stock(3, 5.0)],
            stats: DashboardStats {
                active_crops: 4,
                month_revenue: 210.0,
                ..Default::default()
            },
            ..Default::default()
        };

        let dash = Dashboard::build(&snapshot, &ReminderScheduler::default(), today());
        assert_eq!(dash.stats.active_crops, 4);
        assert_eq!(dash.upcoming.len(), 2);
        assert_eq!(dash.reminder_badge, 3);
        let low: Vec<i64> = dash.low_stock.iter().map(|s| s.id.get()).collect();
        assert_eq!(low, vec![3, 2]);
    }
}
