//! Application root wiring the mirror, the gateway and the derived views.

use std::sync::Arc;

use chrono::NaiveDate;
use tokio::task::JoinHandle;

use zbalo_core::RecordId;
use zbalo_records::{Draft, EntityKind, ExpenseDraft};

use crate::aggregation::{AggregationEngine, HistoryReport, LedgerFilter, LedgerReport, Period};
use crate::assistant::{AssistantBridge, spawn_reload_on_external_mutation};
use crate::charts::{ChartRenderer, RenderedChart};
use crate::config::ConsoleConfig;
use crate::dashboard::Dashboard;
use crate::error::{ConsoleError, ConsoleResult, ServiceResult};
use crate::gateway::MutationGateway;
use crate::loader::BulkLoader;
use crate::preferences::{Preferences, PreferencesError, TabOrder};
use crate::receipts::ReceiptScanner;
use crate::reminders::{ReminderScheduler, ReminderView};
use crate::service::{HttpRecordService, RecordService};
use crate::status::StatusNotifier;
use crate::store::{Mirrored, RecordStore};

/// Asks the operator before anything destructive happens.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

fn saved_message(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::CropCycle => "✅ Culture enregistrée",
        EntityKind::MaintenanceEvent => "✅ Entretien enregistré",
        EntityKind::StockItem => "✅ Stock enregistré",
        EntityKind::Sale => "✅ Vente enregistrée",
        EntityKind::Expense => "✅ Dépense enregistrée",
        EntityKind::Reminder => "✅ Rappel ajouté",
        EntityKind::CropSheet => "✅ Fiche enregistrée",
        EntityKind::Plot => "✅ Serre ajoutée",
        EntityKind::Settings => "✅ Réglages enregistrés",
    }
}

fn deleted_message(kind: EntityKind) -> String {
    let label = kind.label();
    let mut chars = label.chars();
    let capitalized: String = chars
        .next()
        .map(|c| c.to_uppercase().chain(chars).collect())
        .unwrap_or_default();
    format!("✅ {capitalized} supprimé(e)")
}

pub struct Console {
    config: ConsoleConfig,
    store: Arc<RecordStore>,
    gateway: MutationGateway,
    loader: BulkLoader,
    scheduler: ReminderScheduler,
    status: StatusNotifier,
    assistant: AssistantBridge,
    receipts: ReceiptScanner,
    charts: ChartRenderer,
}

impl Console {
    pub fn new(config: ConsoleConfig, service: Arc<dyn RecordService>) -> Self {
        let store = Arc::new(RecordStore::new());
        let status = StatusNotifier::new(config.status_duration);
        let gateway = MutationGateway::new(service.clone(), store.clone());
        Self {
            loader: BulkLoader::new(service.clone(), store.clone(), status.clone()),
            receipts: ReceiptScanner::new(service.clone(), gateway.clone()),
            assistant: AssistantBridge::new(service),
            scheduler: ReminderScheduler::new(config.reminders),
            charts: ChartRenderer::new(config.charts.clone()),
            gateway,
            store,
            status,
            config,
        }
    }

    /// Console talking to the HTTP service named in `config`.
    pub fn connect(config: ConsoleConfig) -> ServiceResult<Self> {
        let service = match &config.auth_token {
            Some(token) => HttpRecordService::with_token(&config.api_url, token.clone())?,
            None => HttpRecordService::new(&config.api_url)?,
        };
        Ok(Self::new(config, Arc::new(service)))
    }

    /// Subscribe the mirror to the assistant's external mutations.
    pub fn start(&self) -> JoinHandle<()> {
        spawn_reload_on_external_mutation(self.loader.clone(), self.assistant.subscribe(), self.status.clone())
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<RecordStore> {
        &self.store
    }

    pub fn gateway(&self) -> &MutationGateway {
        &self.gateway
    }

    pub fn status(&self) -> &StatusNotifier {
        &self.status
    }

    pub fn assistant(&self) -> &AssistantBridge {
        &self.assistant
    }

    pub fn scheduler(&self) -> &ReminderScheduler {
        &self.scheduler
    }

    pub fn preferences(&self) -> Preferences {
        Preferences::load(&self.config.prefs_path)
    }

    /// Drag a tab and persist the new order.
    pub fn move_tab(&self, from: usize, to: usize) -> Result<TabOrder, PreferencesError> {
        let mut prefs = self.preferences();
        if prefs.tab_order.move_tab(from, to) {
            prefs.save(&self.config.prefs_path)?;
        }
        Ok(prefs.tab_order)
    }

    pub async fn reload(&self) -> ServiceResult<()> {
        self.loader.reload().await
    }

    pub fn dashboard(&self, today: NaiveDate) -> Dashboard {
        self.store.read(|s| Dashboard::build(s, &self.scheduler, today))
    }

    pub fn reminders(&self, today: NaiveDate) -> Vec<ReminderView> {
        self.store.read(|s| self.scheduler.all(&s.reminders, today))
    }

    pub fn history(&self, period: Period) -> HistoryReport {
        self.store.read(|s| AggregationEngine::new(s).history(period))
    }

    pub fn history_charts(&self, period: Period) -> Vec<RenderedChart> {
        self.charts.history(&self.history(period))
    }

    pub fn ledger(&self, filter: LedgerFilter) -> LedgerReport {
        self.store.read(|s| AggregationEngine::new(s).ledger(filter))
    }

    /// Post the outcome of an operator action on the status banner.
    fn report<T>(&self, result: ConsoleResult<T>, success: impl FnOnce(&T) -> Option<String>) -> ConsoleResult<T> {
        match &result {
            Ok(value) => {
                if let Some(message) = success(value) {
                    self.status.show(message);
                }
            }
            Err(ConsoleError::Service(e)) => self.status.show(format!("❌ {}", e.operator_message())),
            Err(e) => self.status.show(format!("⚠️ {e}")),
        }
        result
    }

    /// Save a form; `target` selects update over create.
    pub async fn save(&self, draft: Draft, target: Option<RecordId>) -> ConsoleResult<RecordId> {
        let kind = draft.kind();
        let result = self.gateway.submit(draft, target).await;
        self.report(result, |_| Some(saved_message(kind).to_string()))
    }

    /// Delete a record after confirmation. Returns `false` when declined.
    pub async fn delete<T: Mirrored>(&self, id: RecordId, confirm: &dyn Confirm) -> ConsoleResult<bool> {
        let kind = T::KIND;
        if !confirm.confirm(&format!("Supprimer cette {} ?", kind.label())) {
            return Ok(false);
        }
        let result = self.gateway.remove::<T>(id).await.map(|_| true);
        self.report(result, |_| Some(deleted_message(kind)))
    }

    pub async fn delete_plot(&self, name: &str, confirm: &dyn Confirm) -> ConsoleResult<bool> {
        if !confirm.confirm(&format!("Supprimer la serre « {name} » ?")) {
            return Ok(false);
        }
        let result = self.gateway.remove_plot(name).await.map(|_| true);
        self.report(result, |_| Some(deleted_message(EntityKind::Plot)))
    }

    pub async fn add_plot(&self, name: &str) -> ConsoleResult<bool> {
        let result = self.gateway.add_plot(name).await;
        self.report(result, |added| added.then(|| saved_message(EntityKind::Plot).to_string()))
    }

    pub async fn complete_reminder(&self, id: RecordId) -> ConsoleResult<()> {
        let result = self.gateway.complete_reminder(id).await;
        self.report(result, |_| Some("✅ Rappel terminé".to_string()))
    }

    /// Send a chat message and return the text to display.
    pub async fn chat(&self, message: &str) -> ConsoleResult<String> {
        let result = self.assistant.send(message).await.map_err(ConsoleError::from);
        self.report(result, |_| None).map(|reply| reply.display_text())
    }

    /// Recognize a receipt; the draft is returned for review, not saved.
    pub async fn scan_receipt(&self, image: &[u8]) -> ConsoleResult<ExpenseDraft> {
        self.status.show("🔍 Analyse du ticket...");
        let result = self.receipts.scan(image).await;
        self.report(result, |_| Some("✅ Ticket analysé".to_string()))
    }

    pub async fn save_receipt(&self, draft: ExpenseDraft) -> ConsoleResult<RecordId> {
        let result = self.receipts.save(draft).await.map(|r| r.id);
        self.report(result, |_| Some(saved_message(EntityKind::Expense).to_string()))
    }
}
