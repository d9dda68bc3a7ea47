//! Operator preferences kept on local disk.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Tab {
    Dashboard,
    Sheets,
    Crops,
    Reminders,
    Maintenance,
    Stock,
    Sales,
    History,
    Ledger,
    Assistant,
    Admin,
}

impl Tab {
    pub const DEFAULT_ORDER: [Tab; 11] = [
        Tab::Dashboard,
        Tab::Sheets,
        Tab::Crops,
        Tab::Reminders,
        Tab::Maintenance,
        Tab::Stock,
        Tab::Sales,
        Tab::History,
        Tab::Ledger,
        Tab::Assistant,
        Tab::Admin,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Tab::Dashboard => "dashboard",
            Tab::Sheets => "fiches",
            Tab::Crops => "culture",
            Tab::Reminders => "rappels",
            Tab::Maintenance => "entretien",
            Tab::Stock => "stock",
            Tab::Sales => "ventes",
            Tab::History => "historique",
            Tab::Ledger => "compta",
            Tab::Assistant => "assistant",
            Tab::Admin => "admin",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::DEFAULT_ORDER.into_iter().find(|t| t.id() == id)
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Tab order as arranged by the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabOrder(Vec<Tab>);

impl Default for TabOrder {
    fn default() -> Self {
        Self(Tab::DEFAULT_ORDER.to_vec())
    }
}

impl TabOrder {
    /// Saved ids in order. Unknown ids and repeats are skipped; tabs missing
    /// from the list are appended in default order.
    pub fn from_ids<S: AsRef<str>>(ids: &[S]) -> Self {
        let mut tabs: Vec<Tab> = Vec::with_capacity(Tab::DEFAULT_ORDER.len());
        for tab in ids.iter().filter_map(|id| Tab::from_id(id.as_ref())) {
            if !tabs.contains(&tab) {
                tabs.push(tab);
            }
        }
        for tab in Tab::DEFAULT_ORDER {
            if !tabs.contains(&tab) {
                tabs.push(tab);
            }
        }
        Self(tabs)
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.0
    }

    pub fn ids(&self) -> Vec<&'static str> {
        self.0.iter().map(Tab::id).collect()
    }

    /// Drag the tab at `from` onto position `to`. Returns `false` when
    /// nothing moved.
    pub fn move_tab(&mut self, from: usize, to: usize) -> bool {
        if from == to || from >= self.0.len() || to >= self.0.len() {
            return false;
        }
        let tab = self.0.remove(from);
        self.0.insert(to, tab);
        true
    }
}

#[derive(Debug, Error)]
pub enum PreferencesError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid preferences: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredPreferences {
    #[serde(default)]
    tab_order: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preferences {
    pub tab_order: TabOrder,
}

impl Preferences {
    /// Read preferences; a missing or unreadable file yields the defaults.
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(prefs) => prefs,
            Err(PreferencesError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring preferences file");
                Self::default()
            }
        }
    }

    pub fn try_load(path: &Path) -> Result<Self, PreferencesError> {
        let raw = std::fs::read_to_string(path)?;
        let stored: StoredPreferences = serde_json::from_str(&raw)?;
        Ok(Self {
            tab_order: TabOrder::from_ids(&stored.tab_order),
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), PreferencesError> {
        let stored = StoredPreferences {
            tab_order: self.tab_order.ids().into_iter().map(str::to_string).collect(),
        };
        std::fs::write(path, serde_json::to_vec_pretty(&stored)?)?;
        Ok(())
    }
}
