//! In-memory mirror of the remote record service.
//!
//! The store holds only confirmed records. Writes replace a whole collection
//! (or the whole snapshot on a bulk load), or edit one collection in place
//! under the write lock. There is no field-level mutation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use zbalo_core::{Entity, RecordId};
use zbalo_records::{
    ConfigurationVocabulary, CropCycle, CropSheet, DashboardStats, EntityKind, ExpenseRecord,
    MaintenanceEvent, Plot, Reminder, SaleRecord, StockItem, VocabularyKey,
};

/// Everything the mirror holds at one point in time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub crops: Vec<CropCycle>,
    pub maintenance: Vec<MaintenanceEvent>,
    pub stock: Vec<StockItem>,
    pub sales: Vec<SaleRecord>,
    pub expenses: Vec<ExpenseRecord>,
    pub reminders: Vec<Reminder>,
    pub sheets: Vec<CropSheet>,
    pub plots: Vec<Plot>,
    pub vocabulary: ConfigurationVocabulary,
    pub stats: DashboardStats,
}

/// A record kind that has its own collection in the mirror.
pub trait Mirrored: Entity + Clone + Send + Sync + 'static {
    const KIND: EntityKind;

    fn collection(snapshot: &Snapshot) -> &Vec<Self>;

    fn collection_mut(snapshot: &mut Snapshot) -> &mut Vec<Self>;
}

macro_rules! impl_mirrored {
    ($t:ty, $kind:ident, $field:ident) => {
        impl Mirrored for $t {
            const KIND: EntityKind = EntityKind::$kind;

            fn collection(snapshot: &Snapshot) -> &Vec<Self> {
                &snapshot.$field
            }

            fn collection_mut(snapshot: &mut Snapshot) -> &mut Vec<Self> {
                &mut snapshot.$field
            }
        }
    };
}

impl_mirrored!(CropCycle, CropCycle, crops);
impl_mirrored!(MaintenanceEvent, MaintenanceEvent, maintenance);
impl_mirrored!(StockItem, StockItem, stock);
impl_mirrored!(SaleRecord, Sale, sales);
impl_mirrored!(ExpenseRecord, Expense, expenses);
impl_mirrored!(Reminder, Reminder, reminders);
impl_mirrored!(CropSheet, CropSheet, sheets);

/// Shared mirror. Owned by the console root and handed to every component
/// that reads or writes it.
#[derive(Debug, Default)]
pub struct RecordStore {
    inner: RwLock<Snapshot>,
    revision: AtomicU64,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bumped on every write; views compare it to know they are stale.
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::Acquire)
    }

    /// Run `f` against the current snapshot.
    pub fn read<R>(&self, f: impl FnOnce(&Snapshot) -> R) -> R {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&*guard)
    }

    pub fn snapshot(&self) -> Snapshot {
        self.read(Snapshot::clone)
    }

    pub fn collection<T: Mirrored>(&self) -> Vec<T> {
        self.read(|s| T::collection(s).clone())
    }

    pub fn find<T: Mirrored>(&self, id: RecordId) -> Option<T> {
        self.read(|s| T::collection(s).iter().find(|r| r.id() == id).cloned())
    }

    pub fn contains<T: Mirrored>(&self, id: RecordId) -> bool {
        self.read(|s| T::collection(s).iter().any(|r| r.id() == id))
    }

    fn write(&self, f: impl FnOnce(&mut Snapshot)) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut *guard);
        self.revision.fetch_add(1, Ordering::AcqRel);
    }

    /// Replace one collection wholesale.
    pub fn replace<T: Mirrored>(&self, records: Vec<T>) {
        let records = dedupe(T::KIND, records);
        tracing::debug!(kind = %T::KIND, count = records.len(), "replacing collection");
        self.write(|s| *T::collection_mut(s) = records);
    }

    /// Edit one collection in place. The edit and the id dedupe run under
    /// one write guard, so a concurrent bulk load is never overwritten with
    /// a stale copy.
    pub fn modify<T: Mirrored>(&self, f: impl FnOnce(&mut Vec<T>)) {
        self.write(|s| {
            let records = T::collection_mut(s);
            f(records);
            *records = dedupe(T::KIND, std::mem::take(records));
        });
    }

    pub fn modify_plots(&self, f: impl FnOnce(&mut Vec<Plot>)) {
        self.write(|s| {
            f(&mut s.plots);
            s.plots = dedupe_plots(std::mem::take(&mut s.plots));
        });
    }

    /// Replace the whole snapshot, as a bulk load does.
    pub fn replace_all(&self, snapshot: Snapshot) {
        let snapshot = Snapshot {
            crops: dedupe(EntityKind::CropCycle, snapshot.crops),
            maintenance: dedupe(EntityKind::MaintenanceEvent, snapshot.maintenance),
            stock: dedupe(EntityKind::StockItem, snapshot.stock),
            sales: dedupe(EntityKind::Sale, snapshot.sales),
            expenses: dedupe(EntityKind::Expense, snapshot.expenses),
            reminders: dedupe(EntityKind::Reminder, snapshot.reminders),
            sheets: dedupe(EntityKind::CropSheet, snapshot.sheets),
            plots: dedupe_plots(snapshot.plots),
            ..snapshot
        };
        self.write(|s| *s = snapshot);
    }

    pub fn replace_vocabulary(&self, key: VocabularyKey, values: Vec<String>) {
        self.write(|s| s.vocabulary.set(key, values));
    }
}

/// Identifiers are unique within a collection; keep the first occurrence.
fn dedupe<T: Entity>(kind: EntityKind, records: Vec<T>) -> Vec<T> {
    let mut seen = std::collections::HashSet::with_capacity(records.len());
    let before = records.len();
    let records: Vec<T> = records.into_iter().filter(|r| seen.insert(r.id())).collect();
    if records.len() != before {
        tracing::warn!(%kind, dropped = before - records.len(), "duplicate ids in collection");
    }
    records
}

fn dedupe_plots(plots: Vec<Plot>) -> Vec<Plot> {
    let mut seen = std::collections::HashSet::with_capacity(plots.len());
    plots.into_iter().filter(|p| seen.insert(p.name.clone())).collect()
}
