//! Reminder urgency and the three reminder views.

use chrono::NaiveDate;

use zbalo_records::Reminder;

use crate::config::ReminderThresholds;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Urgency {
    Urgent,
    Soon,
    Normal,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Urgent => "urgent",
            Urgency::Soon => "soon",
            Urgency::Normal => "normal",
        }
    }
}

/// A reminder as displayed on a given day.
#[derive(Debug, Clone, PartialEq)]
pub struct ReminderView {
    pub reminder: Reminder,
    /// `None` for an undated reminder.
    pub days_until: Option<i64>,
    pub urgency: Urgency,
    /// "3j de retard", "Aujourd'hui", "5j" or "Sans date".
    pub due_label: String,
}

/// Whole days from `today` to `date`; negative when overdue.
pub fn days_until(date: NaiveDate, today: NaiveDate) -> i64 {
    (date - today).num_days()
}

pub fn due_label(days_until: Option<i64>) -> String {
    match days_until {
        None => UNDATED_LABEL.to_string(),
        Some(d) if d < 0 => format!("{}j de retard", d.unsigned_abs()),
        Some(0) => "Aujourd'hui".to_string(),
        Some(d) => format!("{d}j"),
    }
}

pub const UNDATED_LABEL: &str = "Sans date";

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct ReminderScheduler {
    thresholds: ReminderThresholds,
}

impl ReminderScheduler {
    pub fn new(thresholds: ReminderThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &ReminderThresholds {
        &self.thresholds
    }

    pub fn classify(&self, days_until: i64) -> Urgency {
        if days_until <= self.thresholds.urgent_within {
            Urgency::Urgent
        } else if days_until <= self.thresholds.soon_within {
            Urgency::Soon
        } else {
            Urgency::Normal
        }
    }

    pub fn view(&self, reminder: &Reminder, today: NaiveDate) -> ReminderView {
        let days = reminder.date.map(|date| days_until(date, today));
        ReminderView {
            reminder: reminder.clone(),
            days_until: days,
            urgency: days.map_or(Urgency::Normal, |d| self.classify(d)),
            due_label: due_label(days),
        }
    }

    /// Every reminder, earliest first; undated ones last.
    pub fn all(&self, reminders: &[Reminder], today: NaiveDate) -> Vec<ReminderView> {
        let mut views: Vec<ReminderView> = reminders.iter().map(|r| self.view(r, today)).collect();
        views.sort_by_key(|v| (v.reminder.date.is_none(), v.reminder.date));
        views
    }

    /// Overdue reminders and those due within the dashboard window.
    pub fn dashboard(&self, reminders: &[Reminder], today: NaiveDate) -> Vec<ReminderView> {
        self.all(reminders, today)
            .into_iter()
            .filter(|v| v.days_until.is_some_and(|d| d <= self.thresholds.dashboard_within))
            .collect()
    }

    /// Count shown on the reminders tab.
    pub fn badge_count(&self, reminders: &[Reminder], today: NaiveDate) -> usize {
        reminders
            .iter()
            .filter_map(|r| r.date)
            .filter(|date| days_until(*date, today) <= self.thresholds.badge_within)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use zbalo_core::RecordId;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
    }

    fn due_in(id: i64, days: i64) -> Reminder {
        Reminder {
            id: RecordId::new(id),
            date: Some(today() + chrono::Duration::days(days)),
            label: format!("r{id}"),
            icon: None,
        }
    }

    #[test]
    fn tiers_follow_day_boundaries() {
        let s = ReminderScheduler::default();
        assert_eq!(s.classify(-1), Urgency::Urgent);
        assert_eq!(s.classify(0), Urgency::Urgent);
        assert_eq!(s.classify(3), Urgency::Urgent);
        assert_eq!(s.classify(4), Urgency::Soon);
        assert_eq!(s.classify(7), Urgency::Soon);
        assert_eq!(s.classify(8), Urgency::Normal);
    }

    #[test]
    fn reminder_due_today() {
        let s = ReminderScheduler::default();
        let reminders = vec![due_in(1, 0)];
        let view = s.view(&reminders[0], today());
        assert_eq!(view.due_label, "Aujourd'hui");
        assert_eq!(view.urgency, Urgency::Urgent);
        assert_eq!(s.dashboard(&reminders, today()).len(), 1);
        assert_eq!(s.badge_count(&reminders, today()), 1);
    }

    #[test]
    fn overdue_label_counts_days_late() {
        assert_eq!(due_label(Some(-3)), "3j de retard");
        assert_eq!(due_label(Some(5)), "5j");
    }

    #[test]
    fn undated_reminders_sort_last_and_stay_off_the_dashboard() {
        let s = ReminderScheduler::default();
        let undated = Reminder {
            date: None,
            ..due_in(9, 0)
        };
        let reminders = vec![undated, due_in(1, 30), due_in(2, -1)];

        let all = s.all(&reminders, today());
        let order: Vec<i64> = all.iter().map(|v| v.reminder.id.get()).collect();
        assert_eq!(order, vec![2, 1, 9]);
        assert_eq!(all[2].urgency, Urgency::Normal);
        assert_eq!(all[2].days_until, None);
        assert_eq!(all[2].due_label, UNDATED_LABEL);

        let dash: Vec<i64> = s.dashboard(&reminders, today()).iter().map(|v| v.reminder.id.get()).collect();
        assert_eq!(dash, vec![2]);
        assert_eq!(s.badge_count(&reminders, today()), 1);
    }

    #[test]
    fn views_use_independent_windows() {
        let s = ReminderScheduler::default();
        let reminders = vec![due_in(1, 10), due_in(2, -2), due_in(3, 7), due_in(4, 15)];

        let all = s.all(&reminders, today());
        let order: Vec<i64> = all.iter().map(|v| v.reminder.id.get()).collect();
        assert_eq!(order, vec![2, 3, 1, 4]);

        let dash: Vec<i64> = s.dashboard(&reminders, today()).iter().map(|v| v.reminder.id.get()).collect();
        assert_eq!(dash, vec![2, 3]);
        assert_eq!(s.badge_count(&reminders, today()), 3);
    }

    proptest! {
        #[test]
        fn classification_is_monotonic(a in -400i64..400, b in -400i64..400) {
            let s = ReminderScheduler::default();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(s.classify(lo) <= s.classify(hi));
        }

        #[test]
        fn dashboard_is_within_badge(offsets in proptest::collection::vec(-30i64..60, 0..40)) {
            let s = ReminderScheduler::default();
            let reminders: Vec<Reminder> = offsets
                .iter()
                .enumerate()
                .map(|(i, d)| due_in(i as i64, *d))
                .collect();
            let all = s.all(&reminders, today());
            let dash = s.dashboard(&reminders, today());
            prop_assert_eq!(all.len(), reminders.len());
            prop_assert!(dash.iter().all(|v| all.contains(v)));
            prop_assert!(s.badge_count(&reminders, today()) >= dash.len());
        }
    }
}
