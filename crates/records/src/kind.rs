//! Entity kinds mirrored from the remote record service.

use serde::{Deserialize, Serialize};

/// One mirrored collection.
///
/// The nine kinds fetched by a bulk load. `Plot` and `Settings` are
/// name-keyed collections without server identifiers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    CropCycle,
    MaintenanceEvent,
    StockItem,
    Sale,
    Expense,
    Reminder,
    CropSheet,
    Plot,
    Settings,
}

/// Where a freshly confirmed record lands in its collection.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CreatePlacement {
    Prepend,
    Append,
}

impl EntityKind {
    pub const ALL: [EntityKind; 9] = [
        EntityKind::CropCycle,
        EntityKind::MaintenanceEvent,
        EntityKind::StockItem,
        EntityKind::Sale,
        EntityKind::Expense,
        EntityKind::Reminder,
        EntityKind::CropSheet,
        EntityKind::Plot,
        EntityKind::Settings,
    ];

    /// Collection path segment on the remote service (`/api/{path}`).
    pub fn collection_path(&self) -> &'static str {
        match self {
            EntityKind::CropCycle => "cultures",
            EntityKind::MaintenanceEvent => "entretiens",
            EntityKind::StockItem => "stocks",
            EntityKind::Sale => "ventes",
            EntityKind::Expense => "depenses",
            EntityKind::Reminder => "rappels",
            EntityKind::CropSheet => "fiches",
            EntityKind::Plot => "serres",
            EntityKind::Settings => "settings",
        }
    }

    /// Whether the remote service exposes `PUT /{path}/{id}` for this kind.
    pub fn supports_update(&self) -> bool {
        matches!(
            self,
            EntityKind::CropCycle | EntityKind::StockItem | EntityKind::Expense | EntityKind::CropSheet
        )
    }

    pub fn create_placement(&self) -> CreatePlacement {
        match self {
            EntityKind::CropCycle
            | EntityKind::MaintenanceEvent
            | EntityKind::Sale
            | EntityKind::Expense => CreatePlacement::Prepend,
            _ => CreatePlacement::Append,
        }
    }

    /// Human-readable (operator-facing) singular label.
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::CropCycle => "culture",
            EntityKind::MaintenanceEvent => "entretien",
            EntityKind::StockItem => "stock",
            EntityKind::Sale => "vente",
            EntityKind::Expense => "dépense",
            EntityKind::Reminder => "rappel",
            EntityKind::CropSheet => "fiche",
            EntityKind::Plot => "serre",
            EntityKind::Settings => "réglage",
        }
    }
}

impl core::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.collection_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_has_a_distinct_path() {
        let mut paths: Vec<_> = EntityKind::ALL.iter().map(|k| k.collection_path()).collect();
        paths.sort();
        paths.dedup();
        assert_eq!(paths.len(), EntityKind::ALL.len());
    }

    #[test]
    fn append_only_kinds_have_no_update_endpoint() {
        assert!(!EntityKind::Sale.supports_update());
        assert!(!EntityKind::MaintenanceEvent.supports_update());
        assert!(!EntityKind::Reminder.supports_update());
        assert!(EntityKind::Expense.supports_update());
    }

    #[test]
    fn journal_kinds_are_prepended() {
        assert_eq!(EntityKind::Sale.create_placement(), CreatePlacement::Prepend);
        assert_eq!(EntityKind::StockItem.create_placement(), CreatePlacement::Append);
    }
}
