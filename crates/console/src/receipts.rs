//! Receipt scanning: upload an image, get back an expense draft.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use zbalo_core::DomainError;
use zbalo_records::{ExpenseDraft, ExpenseRecord, ReceiptScanRequest};

use crate::error::{ConsoleResult, ServiceError};
use crate::gateway::MutationGateway;
use crate::service::RecordService;

const FALLBACK_MEDIA_TYPE: &str = "image/jpeg";

/// Media type sniffed from the image header.
pub fn media_type(bytes: &[u8]) -> &'static str {
    image::guess_format(bytes)
        .map(|format| format.to_mime_type())
        .unwrap_or(FALLBACK_MEDIA_TYPE)
}

#[derive(Clone)]
pub struct ReceiptScanner {
    service: Arc<dyn RecordService>,
    gateway: MutationGateway,
}

impl ReceiptScanner {
    pub fn new(service: Arc<dyn RecordService>, gateway: MutationGateway) -> Self {
        Self { service, gateway }
    }

    /// Send the image for recognition. The draft comes back for the operator
    /// to review; nothing is saved yet.
    pub async fn scan(&self, image: &[u8]) -> ConsoleResult<ExpenseDraft> {
        if image.is_empty() {
            return Err(DomainError::validation("no receipt image selected").into());
        }
        let request = ReceiptScanRequest {
            image: STANDARD.encode(image),
            media_type: media_type(image).to_string(),
        };

        tracing::debug!(bytes = image.len(), media_type = %request.media_type, "scan receipt");
        let response = self
            .service
            .scan_receipt(&request)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "receipt scan failed"))?;
        let extract = response.into_result().map_err(ServiceError::Rejected)?;
        Ok(extract.into_draft())
    }

    /// Save a reviewed draft like any other expense.
    pub async fn save(&self, draft: ExpenseDraft) -> ConsoleResult<ExpenseRecord> {
        self.gateway.create(draft).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConsoleError;
    use crate::store::RecordStore;
    use crate::testing::FakeService;
    use zbalo_records::{Provenance, ReceiptExtract, ReceiptScanResponse};

    const PNG_HEADER: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    fn scanner() -> (ReceiptScanner, FakeService, Arc<RecordStore>) {
        let fake = FakeService::new();
        let store = Arc::new(RecordStore::new());
        let service: Arc<dyn RecordService> = Arc::new(fake.clone());
        let gateway = MutationGateway::new(service.clone(), store.clone());
        (ReceiptScanner::new(service, gateway), fake, store)
    }

    #[test]
    fn media_type_is_sniffed() {
        assert_eq!(media_type(PNG_HEADER), "image/png");
        assert_eq!(media_type(b"\xff\xd8\xff\xe0rest"), "image/jpeg");
        assert_eq!(media_type(b"not an image"), FALLBACK_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn recognized_receipt_is_saved_as_recognized_expense() {
        let (scanner, fake, store) = scanner();
        fake.set_scan(Ok(ReceiptScanResponse {
            ok: true,
            data: Some(ReceiptExtract {
                supplier: Some("Agri Sud".into()),
                total: Some(42.5),
                line_items: vec!["Terreau".into()],
                ..Default::default()
            }),
            error: None,
        }));

        let draft = scanner.scan(PNG_HEADER).await.unwrap();
        assert_eq!(draft.provenance, Provenance::Recognized);
        let request = &fake.scan_requests()[0];
        assert_eq!(request.media_type, "image/png");
        assert_eq!(request.image, STANDARD.encode(PNG_HEADER));

        let saved = scanner.save(draft).await.unwrap();
        assert_eq!(saved.provenance, Provenance::Recognized);
        assert_eq!(store.collection::<ExpenseRecord>()[0].id, saved.id);
    }

    #[tokio::test]
    async fn service_error_surfaces_its_message() {
        let (scanner, fake, store) = scanner();
        fake.set_scan(Ok(ReceiptScanResponse {
            ok: false,
            data: None,
            error: Some("Ticket illisible".into()),
        }));

        let err = scanner.scan(PNG_HEADER).await.unwrap_err();
        assert_eq!(
            err,
            ConsoleError::Service(ServiceError::Rejected("Ticket illisible".into()))
        );
        assert!(store.collection::<ExpenseRecord>().is_empty());
    }

    #[tokio::test]
    async fn recognized_draft_still_needs_a_total() {
        let (scanner, fake, _) = scanner();
        fake.set_scan(Ok(ReceiptScanResponse {
            ok: true,
            data: Some(ReceiptExtract {
                supplier: Some("Agri Sud".into()),
                ..Default::default()
            }),
            error: None,
        }));
        let draft = scanner.scan(PNG_HEADER).await.unwrap();
        assert!(scanner.save(draft).await.unwrap_err().is_validation());
        assert_eq!(fake.mutation_calls(), vec!["POST scan-ticket"]);
    }

    #[tokio::test]
    async fn empty_image_is_rejected_locally() {
        let (scanner, fake, _) = scanner();
        assert!(scanner.scan(&[]).await.unwrap_err().is_validation());
        assert!(fake.calls().is_empty());
    }
}
