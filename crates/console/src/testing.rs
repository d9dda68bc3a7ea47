//! In-memory `RecordService` used by the unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Map, Value, json};

use zbalo_core::RecordId;
use zbalo_records::{
    ChatReply, ChatTurn, DashboardStats, EntityKind, ReceiptScanRequest, ReceiptScanResponse,
    VocabularyKey,
};

use crate::error::{ServiceError, ServiceResult};
use crate::service::RecordService;

type Hook = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct FakeState {
    collections: HashMap<EntityKind, Value>,
    next_id: i64,
    failing_lists: HashSet<EntityKind>,
    fail_mutations: bool,
    calls: Vec<String>,
    stats: DashboardStats,
    scan: Option<ServiceResult<ReceiptScanResponse>>,
    scan_requests: Vec<ReceiptScanRequest>,
    chat: Option<ServiceResult<ChatReply>>,
    transcripts: Vec<Vec<ChatTurn>>,
    on_create: Option<Hook>,
}

/// Behaves like the remote service: assigns ids, echoes stored rows with
/// snake_case columns, and can be told to fail.
#[derive(Clone, Default)]
pub struct FakeService {
    state: Arc<Mutex<FakeState>>,
}

impl FakeService {
    pub fn new() -> Self {
        let fake = Self::default();
        fake.state.lock().unwrap().next_id = 100;
        fake
    }

    pub fn seed(&self, kind: EntityKind, rows: Value) {
        self.state.lock().unwrap().collections.insert(kind, rows);
    }

    pub fn fail_list(&self, kind: EntityKind) {
        self.state.lock().unwrap().failing_lists.insert(kind);
    }

    pub fn fail_mutations(&self) {
        self.state.lock().unwrap().fail_mutations = true;
    }

    pub fn set_stats(&self, stats: DashboardStats) {
        self.state.lock().unwrap().stats = stats;
    }

    /// Run `hook` while a create request is in flight.
    pub fn on_create(&self, hook: impl Fn() + Send + Sync + 'static) {
        self.state.lock().unwrap().on_create = Some(Arc::new(hook));
    }

    pub fn set_scan(&self, result: ServiceResult<ReceiptScanResponse>) {
        self.state.lock().unwrap().scan = Some(result);
    }

    pub fn set_chat(&self, result: ServiceResult<ChatReply>) {
        self.state.lock().unwrap().chat = Some(result);
    }

    /// Outbound calls made so far, as `METHOD path`.
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn mutation_calls(&self) -> Vec<String> {
        self.calls().into_iter().filter(|c| !c.starts_with("GET")).collect()
    }

    pub fn scan_requests(&self) -> Vec<ReceiptScanRequest> {
        self.state.lock().unwrap().scan_requests.clone()
    }

    pub fn transcripts(&self) -> Vec<Vec<ChatTurn>> {
        self.state.lock().unwrap().transcripts.clone()
    }

    fn record(&self, call: String) -> ServiceResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        if state.fail_mutations {
            return Err(ServiceError::Api(500, "Internal Server Error".into()));
        }
        Ok(())
    }
}

fn empty_collection(kind: EntityKind) -> Value {
    match kind {
        EntityKind::Settings => json!({}),
        _ => json!([]),
    }
}

/// Request keys are camelCase, stored columns snake_case.
fn stored_column(key: &str) -> String {
    if key == "scanAI" {
        return "scan_ai".to_string();
    }
    let mut out = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            out.push('_');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

fn stored_row(id: i64, body: Value) -> Value {
    let mut row = Map::new();
    row.insert("id".into(), json!(id));
    if let Value::Object(fields) = body {
        for (key, value) in fields {
            row.insert(stored_column(&key), value);
        }
    }
    Value::Object(row)
}

#[async_trait]
impl RecordService for FakeService {
    async fn list(&self, kind: EntityKind) -> ServiceResult<Value> {
        // Let concurrent fetches interleave like real requests would.
        tokio::task::yield_now().await;
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("GET {kind}"));
        if state.failing_lists.contains(&kind) {
            return Err(ServiceError::Api(500, format!("{kind} unavailable")));
        }
        Ok(state
            .collections
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| empty_collection(kind)))
    }

    async fn create(&self, kind: EntityKind, body: Value) -> ServiceResult<Value> {
        self.record(format!("POST {kind}"))?;
        let hook = self.state.lock().unwrap().on_create.clone();
        if let Some(hook) = hook {
            hook();
        }
        let mut state = self.state.lock().unwrap();
        if kind == EntityKind::Plot {
            let name = body["nom"].as_str().unwrap_or_default().to_string();
            let plots = state.collections.entry(kind).or_insert_with(|| json!([]));
            if let Some(list) = plots.as_array_mut() {
                if !list.iter().any(|p| p == &json!(name)) {
                    list.push(json!(name));
                }
            }
            return Ok(json!({"ok": true, "nom": name}));
        }
        state.next_id += 1;
        let row = stored_row(state.next_id, body);
        let rows = state.collections.entry(kind).or_insert_with(|| json!([]));
        if let Some(list) = rows.as_array_mut() {
            list.push(row.clone());
        }
        Ok(row)
    }

    async fn update(&self, kind: EntityKind, id: RecordId, body: Value) -> ServiceResult<Value> {
        self.record(format!("PUT {kind}/{id}"))?;
        let row = stored_row(id.get(), body);
        let mut state = self.state.lock().unwrap();
        if let Some(list) = state.collections.get_mut(&kind).and_then(Value::as_array_mut) {
            for existing in list.iter_mut() {
                if existing["id"] == json!(id.get()) {
                    *existing = row.clone();
                }
            }
        }
        Ok(row)
    }

    async fn remove(&self, kind: EntityKind, key: &str) -> ServiceResult<()> {
        self.record(format!("DELETE {kind}/{key}"))?;
        let mut state = self.state.lock().unwrap();
        if let Some(list) = state.collections.get_mut(&kind).and_then(Value::as_array_mut) {
            list.retain(|row| match row {
                Value::String(name) => name != key,
                other => other["id"].to_string() != key,
            });
        }
        Ok(())
    }

    async fn complete_reminder(&self, id: RecordId) -> ServiceResult<()> {
        self.record(format!("POST rappels/{id}/done"))?;
        let mut state = self.state.lock().unwrap();
        if let Some(list) = state
            .collections
            .get_mut(&EntityKind::Reminder)
            .and_then(Value::as_array_mut)
        {
            list.retain(|row| row["id"] != json!(id.get()));
        }
        Ok(())
    }

    async fn put_vocabulary(&self, key: VocabularyKey, values: &[String]) -> ServiceResult<()> {
        self.record(format!("PUT settings/{key}"))?;
        let mut state = self.state.lock().unwrap();
        let settings = state
            .collections
            .entry(EntityKind::Settings)
            .or_insert_with(|| json!({}));
        settings[key.as_str()] = json!(values);
        Ok(())
    }

    async fn stats(&self) -> ServiceResult<DashboardStats> {
        tokio::task::yield_now().await;
        let mut state = self.state.lock().unwrap();
        state.calls.push("GET stats".into());
        Ok(state.stats.clone())
    }

    async fn scan_receipt(&self, request: &ReceiptScanRequest) -> ServiceResult<ReceiptScanResponse> {
        self.record("POST scan-ticket".into())?;
        let mut state = self.state.lock().unwrap();
        state.scan_requests.push(request.clone());
        state
            .scan
            .clone()
            .unwrap_or_else(|| Err(ServiceError::Rejected("Image manquante".into())))
    }

    async fn chat(&self, transcript: &[ChatTurn]) -> ServiceResult<ChatReply> {
        self.record("POST chat".into())?;
        let mut state = self.state.lock().unwrap();
        state.transcripts.push(transcript.to_vec());
        state.chat.clone().unwrap_or_else(|| Ok(ChatReply::default()))
    }
}

#[test]
fn request_keys_map_to_stored_columns() {
    assert_eq!(stored_column("prixUnit"), "prix_unit");
    assert_eq!(stored_column("dureeSemisRecolte"), "duree_semis_recolte");
    assert_eq!(stored_column("scanAI"), "scan_ai");
    assert_eq!(stored_column("nom"), "nom");
}
