//! Mutations against the remote service.
//!
//! Every operation validates locally, issues exactly one outbound request and
//! touches the mirror only once the service has confirmed. A failed call
//! leaves the mirror as it was; nothing is retried.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use zbalo_core::{DomainError, Entity, RecordId};
use zbalo_records::{
    CreatePlacement, Draft, EntityKind, Plot, RecordDraft, Reminder, VocabularyKey,
};

use crate::error::{ConsoleError, ConsoleResult, ServiceError};
use crate::loader::decode;
use crate::service::RecordService;
use crate::store::{Mirrored, RecordStore};

fn to_body<T: Serialize>(kind: EntityKind, payload: &T) -> ConsoleResult<Value> {
    serde_json::to_value(payload)
        .map_err(|e| ServiceError::Parse(format!("{kind}: cannot encode request: {e}")).into())
}

#[derive(Clone)]
pub struct MutationGateway {
    service: Arc<dyn RecordService>,
    store: Arc<RecordStore>,
}

impl MutationGateway {
    pub fn new(service: Arc<dyn RecordService>, store: Arc<RecordStore>) -> Self {
        Self { service, store }
    }

    /// Create a record and place the confirmed row in the mirror.
    pub async fn create<D>(&self, draft: D) -> ConsoleResult<D::Record>
    where
        D: RecordDraft,
        D::Record: Mirrored,
    {
        let kind = D::KIND;
        let draft = draft.validated()?;
        let body = to_body(kind, &draft)?;

        tracing::debug!(%kind, "create");
        let row = self.service.create(kind, body).await.inspect_err(|e| {
            tracing::warn!(%kind, error = %e, "create failed");
        })?;
        let record: D::Record = decode(kind, row)?;

        self.store.modify::<D::Record>(|records| {
            // A confirmed row replaces any stale entry carrying the same id.
            records.retain(|r| r.id() != record.id());
            match kind.create_placement() {
                CreatePlacement::Prepend => records.insert(0, record.clone()),
                CreatePlacement::Append => records.push(record.clone()),
            }
        });

        tracing::info!(%kind, id = %record.id(), "record created");
        Ok(record)
    }

    /// Replace a record and swap the confirmed row into the mirror.
    pub async fn update<D>(&self, id: RecordId, draft: D) -> ConsoleResult<D::Record>
    where
        D: RecordDraft,
        D::Record: Mirrored,
    {
        let kind = D::KIND;
        if !kind.supports_update() {
            return Err(DomainError::validation(format!("{} records cannot be edited", kind.label())).into());
        }
        let draft = draft.validated()?;
        if !self.store.contains::<D::Record>(id) {
            return Err(ConsoleError::not_found(kind, id));
        }
        let body = to_body(kind, &draft)?;

        tracing::debug!(%kind, %id, "update");
        let row = self.service.update(kind, id, body).await.inspect_err(|e| {
            tracing::warn!(%kind, %id, error = %e, "update failed");
        })?;
        let record: D::Record = decode(kind, row)?;

        self.store.modify::<D::Record>(|records| {
            for r in records.iter_mut().filter(|r| r.id() == id) {
                *r = record.clone();
            }
        });

        tracing::info!(%kind, %id, "record updated");
        Ok(record)
    }

    /// Delete a record and drop it from the mirror.
    pub async fn remove<T: Mirrored>(&self, id: RecordId) -> ConsoleResult<()> {
        let kind = T::KIND;
        tracing::debug!(%kind, %id, "remove");
        self.service
            .remove(kind, &id.to_string())
            .await
            .inspect_err(|e| tracing::warn!(%kind, %id, error = %e, "remove failed"))?;

        self.store.modify::<T>(|records| records.retain(|r| r.id() != id));

        tracing::info!(%kind, %id, "record removed");
        Ok(())
    }

    /// Save a form: create when `target` is `None`, otherwise update.
    /// Returns the id of the confirmed record.
    pub async fn submit(&self, draft: Draft, target: Option<RecordId>) -> ConsoleResult<RecordId> {
        macro_rules! save {
            ($d:expr) => {
                match target {
                    None => self.create($d).await.map(|r| r.id()),
                    Some(id) => self.update(id, $d).await.map(|r| r.id()),
                }
            };
        }

        match draft {
            Draft::CropCycle(d) => save!(d),
            Draft::Maintenance(d) => save!(d),
            Draft::Stock(d) => save!(d),
            Draft::Sale(d) => save!(d),
            Draft::Expense(d) => save!(d),
            Draft::Reminder(d) => save!(d),
            Draft::CropSheet(d) => save!(d),
        }
    }

    /// Mark a reminder done; it disappears from the mirror.
    pub async fn complete_reminder(&self, id: RecordId) -> ConsoleResult<()> {
        if !self.store.contains::<Reminder>(id) {
            return Err(ConsoleError::not_found(EntityKind::Reminder, id));
        }
        self.service
            .complete_reminder(id)
            .await
            .inspect_err(|e| tracing::warn!(%id, error = %e, "completing reminder failed"))?;

        self.store
            .modify::<Reminder>(|reminders| reminders.retain(|r| r.id() != id));
        tracing::info!(%id, "reminder done");
        Ok(())
    }

    /// Add a plot by name. Returns `false` when it already existed.
    pub async fn add_plot(&self, name: &str) -> ConsoleResult<bool> {
        let plot = Plot::parse(name)?;
        if self.store.read(|s| s.plots.contains(&plot)) {
            return Ok(false);
        }
        let body = serde_json::json!({ "nom": plot.name() });
        self.service.create(EntityKind::Plot, body).await?;

        self.store.modify_plots(|plots| {
            if !plots.contains(&plot) {
                plots.push(plot);
            }
        });
        Ok(true)
    }

    pub async fn remove_plot(&self, name: &str) -> ConsoleResult<()> {
        self.service.remove(EntityKind::Plot, name).await?;
        self.store.modify_plots(|plots| plots.retain(|p| p.name() != name));
        Ok(())
    }

    /// Send a full replacement list for one vocabulary.
    pub async fn replace_vocabulary(&self, key: VocabularyKey, values: Vec<String>) -> ConsoleResult<()> {
        self.service
            .put_vocabulary(key, &values)
            .await
            .inspect_err(|e| tracing::warn!(%key, error = %e, "vocabulary update failed"))?;
        self.store.replace_vocabulary(key, values);
        Ok(())
    }

    /// Append an option. Returns `false` when it was already listed.
    pub async fn add_vocabulary_option(&self, key: VocabularyKey, value: &str) -> ConsoleResult<bool> {
        match self.store.read(|s| s.vocabulary.with_added(key, value))? {
            Some(values) => self.replace_vocabulary(key, values).await.map(|_| true),
            None => Ok(false),
        }
    }

    pub async fn rename_vocabulary_option(&self, key: VocabularyKey, index: usize, value: &str) -> ConsoleResult<()> {
        let values = self.store.read(|s| s.vocabulary.with_renamed(key, index, value))?;
        self.replace_vocabulary(key, values).await
    }

    pub async fn remove_vocabulary_option(&self, key: VocabularyKey, index: usize) -> ConsoleResult<()> {
        let values = self.store.read(|s| s.vocabulary.with_removed(key, index))?;
        self.replace_vocabulary(key, values).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Snapshot;
    use crate::testing::FakeService;
    use chrono::NaiveDate;
    use serde_json::json;
    use zbalo_records::{
        CropCycle, CropCycleDraft, ExpenseDraft, ExpenseRecord, MaintenanceDraft, MaintenanceEvent,
        Provenance, ReminderDraft, SaleDraft, SaleRecord, StockDraft, StockItem,
    };

    fn gateway() -> (MutationGateway, FakeService, Arc<RecordStore>) {
        let fake = FakeService::new();
        let store = Arc::new(RecordStore::new());
        (MutationGateway::new(Arc::new(fake.clone()), store.clone()), fake, store)
    }

    fn sale(product: &str) -> SaleDraft {
        SaleDraft {
            date: NaiveDate::from_ymd_opt(2024, 7, 14),
            product: product.into(),
            quantity: 3.0,
            unit_price: 2.5,
            unit: Some("kg".into()),
            client: None,
        }
    }

    #[tokio::test]
    async fn created_sales_are_prepended() {
        let (gateway, _, store) = gateway();
        gateway.create(sale("Tomate")).await.unwrap();
        let second = gateway.create(sale("Courgette")).await.unwrap();

        let sales = store.collection::<SaleRecord>();
        assert_eq!(sales.len(), 2);
        assert_eq!(sales[0].id, second.id);
        assert_eq!(sales[0].product, "Courgette");
        assert_eq!(sales[1].revenue(), 7.5);
    }

    #[tokio::test]
    async fn created_stock_items_are_appended() {
        let (gateway, _, store) = gateway();
        let draft = StockDraft {
            name: "Terreau".into(),
            ..Default::default()
        };
        let first = gateway.create(draft.clone()).await.unwrap();
        gateway
            .create(StockDraft {
                name: "Engrais".into(),
                ..draft
            })
            .await
            .unwrap();
        let stock = store.collection::<StockItem>();
        assert_eq!(stock[0].id, first.id);
        assert_eq!(stock[1].name, "Engrais");
    }

    #[tokio::test]
    async fn invalid_draft_never_reaches_the_service() {
        let (gateway, fake, store) = gateway();
        let draft = ExpenseDraft {
            supplier: "Coop".into(),
            ..Default::default()
        }
        .with_total_input("");

        let err = gateway.create(draft).await.unwrap_err();
        assert!(err.is_validation());
        assert!(fake.calls().is_empty());
        assert!(store.collection::<ExpenseRecord>().is_empty());
    }

    #[tokio::test]
    async fn failed_create_leaves_the_mirror_alone() {
        let (gateway, fake, store) = gateway();
        fake.fail_mutations();
        let err = gateway.create(sale("Tomate")).await.unwrap_err();
        assert!(matches!(err, ConsoleError::Service(ServiceError::Api(500, _))));
        assert!(store.collection::<SaleRecord>().is_empty());
        assert_eq!(store.revision(), 0);
    }

    #[tokio::test]
    async fn update_replaces_the_matching_entry() {
        let (gateway, _, store) = gateway();
        let created = gateway
            .create(CropCycleDraft {
                plant: "Tomate".into(),
                status: Some("En cours".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        let mut draft = created.to_draft();
        draft.status = Some("Terminé".into());

        gateway.update(created.id, draft).await.unwrap();

        let crops = store.collection::<CropCycle>();
        assert_eq!(crops.len(), 1);
        assert_eq!(crops[0].status(), "Terminé");
    }

    #[tokio::test]
    async fn update_of_unknown_id_is_not_found() {
        let (gateway, fake, _) = gateway();
        let draft = StockDraft {
            name: "Terreau".into(),
            ..Default::default()
        };
        let err = gateway.update(RecordId::new(42), draft).await.unwrap_err();
        assert!(matches!(err, ConsoleError::NotFound { kind: EntityKind::StockItem, .. }));
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn kinds_without_update_endpoint_are_rejected_locally() {
        let (gateway, fake, _) = gateway();
        let draft = MaintenanceDraft {
            date: NaiveDate::from_ymd_opt(2024, 4, 2),
            ..Default::default()
        };
        let err = gateway.update(RecordId::new(1), draft).await.unwrap_err();
        assert!(err.is_validation());
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn remove_filters_the_id_out() {
        let (gateway, fake, store) = gateway();
        let a = gateway.create(sale("Tomate")).await.unwrap();
        let b = gateway.create(sale("Radis")).await.unwrap();

        gateway.remove::<SaleRecord>(a.id).await.unwrap();

        let sales = store.collection::<SaleRecord>();
        assert_eq!(sales.len(), 1);
        assert_eq!(sales[0].id, b.id);
        assert!(fake.calls().contains(&format!("DELETE ventes/{}", a.id)));
    }

    #[tokio::test]
    async fn failed_remove_keeps_the_record() {
        let (gateway, fake, store) = gateway();
        let a = gateway.create(sale("Tomate")).await.unwrap();
        fake.fail_mutations();
        assert!(gateway.remove::<SaleRecord>(a.id).await.is_err());
        assert_eq!(store.collection::<SaleRecord>().len(), 1);
    }

    #[tokio::test]
    async fn submit_dispatches_on_variant() {
        let (gateway, _, store) = gateway();
        let id = gateway
            .submit(
                ReminderDraft {
                    date: NaiveDate::from_ymd_opt(2024, 5, 1),
                    label: "Semer radis".into(),
                    icon: None,
                }
                .into(),
                None,
            )
            .await
            .unwrap();
        assert!(store.contains::<Reminder>(id));

        let id = gateway
            .submit(
                ExpenseDraft {
                    supplier: "Coop".into(),
                    total: Some(12.0),
                    provenance: Provenance::Recognized,
                    ..Default::default()
                }
                .into(),
                None,
            )
            .await
            .unwrap();
        let expense = store.find::<ExpenseRecord>(id).unwrap();
        assert_eq!(expense.provenance, Provenance::Recognized);
        assert!(store.collection::<MaintenanceEvent>().is_empty());
    }

    #[tokio::test]
    async fn completing_a_reminder_removes_it() {
        let (gateway, fake, store) = gateway();
        store.replace::<Reminder>(
            serde_json::from_value(json!([
                {"id": 1, "date": "2024-05-01", "label": "a"},
                {"id": 2, "date": "2024-05-02", "label": "b"}
            ]))
            .unwrap(),
        );
        gateway.complete_reminder(RecordId::new(1)).await.unwrap();
        assert_eq!(store.collection::<Reminder>().len(), 1);
        assert_eq!(fake.mutation_calls(), vec!["POST rappels/1/done"]);
    }

    #[tokio::test]
    async fn plots_are_added_once_and_removed_by_name() {
        let (gateway, fake, store) = gateway();
        assert!(gateway.add_plot(" Serre Nord ").await.unwrap());
        assert!(!gateway.add_plot("Serre Nord").await.unwrap());
        assert!(gateway.add_plot("").await.unwrap_err().is_validation());
        assert_eq!(fake.mutation_calls().len(), 1);

        gateway.remove_plot("Serre Nord").await.unwrap();
        assert!(store.read(|s| s.plots.is_empty()));
        assert_eq!(fake.mutation_calls()[1], "DELETE serres/Serre Nord");
    }

    #[tokio::test]
    async fn reload_during_a_create_is_not_overwritten() {
        let (gateway, fake, store) = gateway();
        store.replace::<SaleRecord>(
            serde_json::from_value(json!([
                {"id": 1, "date": "2024-07-01", "produit": "Ail", "qte": 1, "prix_unit": 4}
            ]))
            .unwrap(),
        );
        let reload_target = store.clone();
        fake.on_create(move || {
            reload_target.replace_all(Snapshot {
                sales: serde_json::from_value(json!([
                    {"id": 2, "date": "2024-07-02", "produit": "Basilic", "qte": 1, "prix_unit": 2},
                    {"id": 1, "date": "2024-07-01", "produit": "Ail", "qte": 1, "prix_unit": 4}
                ]))
                .unwrap(),
                ..Default::default()
            });
        });

        let created = gateway.create(sale("Tomate")).await.unwrap();

        let ids: Vec<RecordId> = store.collection::<SaleRecord>().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![created.id, RecordId::new(2), RecordId::new(1)]);
    }

    #[tokio::test]
    async fn vocabulary_edits_send_full_lists() {
        let (gateway, fake, store) = gateway();
        let key = VocabularyKey::CropStatuses;
        assert!(gateway.add_vocabulary_option(key, "En cours").await.unwrap());
        assert!(gateway.add_vocabulary_option(key, "Terminé").await.unwrap());
        assert!(!gateway.add_vocabulary_option(key, "Terminé").await.unwrap());

        gateway.rename_vocabulary_option(key, 1, "Fini").await.unwrap();
        gateway.remove_vocabulary_option(key, 0).await.unwrap();

        assert_eq!(store.read(|s| s.vocabulary.list(key).to_vec()), vec!["Fini"]);
        assert_eq!(fake.mutation_calls().len(), 4);
        assert!(gateway.remove_vocabulary_option(key, 3).await.is_err());
        assert_eq!(fake.mutation_calls().len(), 4);
    }
}
