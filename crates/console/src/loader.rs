//! Bulk load: one concurrent fetch per collection, applied all-or-nothing.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::Instrument;

use zbalo_core::CorrelationId;
use zbalo_records::{ConfigurationVocabulary, EntityKind, Plot};

use crate::error::{ServiceError, ServiceResult};
use crate::service::RecordService;
use crate::status::{self, StatusNotifier};
use crate::store::{RecordStore, Snapshot};

/// Decode one fetched collection into typed rows.
pub(crate) fn decode<T: DeserializeOwned>(kind: EntityKind, value: Value) -> ServiceResult<T> {
    serde_json::from_value(value).map_err(|e| {
        tracing::warn!(%kind, error = %e, "undecodable response");
        ServiceError::Parse(format!("{kind}: {e}"))
    })
}

/// Fetch every collection plus the stats object.
///
/// The first failing request fails the whole fetch; nothing partial is
/// returned.
pub async fn fetch_snapshot(service: &dyn RecordService) -> ServiceResult<Snapshot> {
    let (crops, maintenance, stock, sales, expenses, reminders, sheets, plots, settings, stats) = tokio::try_join!(
        service.list(EntityKind::CropCycle),
        service.list(EntityKind::MaintenanceEvent),
        service.list(EntityKind::StockItem),
        service.list(EntityKind::Sale),
        service.list(EntityKind::Expense),
        service.list(EntityKind::Reminder),
        service.list(EntityKind::CropSheet),
        service.list(EntityKind::Plot),
        service.list(EntityKind::Settings),
        service.stats(),
    )?;

    Ok(Snapshot {
        crops: decode(EntityKind::CropCycle, crops)?,
        maintenance: decode(EntityKind::MaintenanceEvent, maintenance)?,
        stock: decode(EntityKind::StockItem, stock)?,
        sales: decode(EntityKind::Sale, sales)?,
        expenses: decode(EntityKind::Expense, expenses)?,
        reminders: decode(EntityKind::Reminder, reminders)?,
        sheets: decode(EntityKind::CropSheet, sheets)?,
        plots: decode::<Vec<Plot>>(EntityKind::Plot, plots)?,
        vocabulary: decode::<ConfigurationVocabulary>(EntityKind::Settings, settings)?,
        stats,
    })
}

/// Refreshes the whole mirror from the remote service.
#[derive(Clone)]
pub struct BulkLoader {
    service: Arc<dyn RecordService>,
    store: Arc<RecordStore>,
    status: StatusNotifier,
}

impl BulkLoader {
    pub fn new(service: Arc<dyn RecordService>, store: Arc<RecordStore>, status: StatusNotifier) -> Self {
        Self {
            service,
            store,
            status,
        }
    }

    /// Reload every collection. On failure the mirror is left untouched.
    pub async fn reload(&self) -> ServiceResult<()> {
        let load_id = CorrelationId::new();
        let span = tracing::info_span!("bulk_load", %load_id);

        async {
            self.status.show(status::LOADING);
            match fetch_snapshot(self.service.as_ref()).await {
                Ok(snapshot) => {
                    tracing::info!(
                        crops = snapshot.crops.len(),
                        sales = snapshot.sales.len(),
                        reminders = snapshot.reminders.len(),
                        "bulk load complete"
                    );
                    self.store.replace_all(snapshot);
                    self.status.show(status::LOADED);
                    Ok(())
                }
                Err(e) => {
                    tracing::error!(error = %e, "bulk load failed; mirror left unchanged");
                    self.status
                        .show_for(status::LOAD_FAILED, status::LOAD_FAILED_DURATION);
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }
}
