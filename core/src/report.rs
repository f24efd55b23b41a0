//! Content reporting through the remote `reportContent` procedure.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ReportError;
use crate::models::{Recipe, ReportReceipt, ReportRequest, ReportResponse};

pub const REPORT_PROCEDURE: &str = "reportContent";

/// Remote procedure transport. Returns the procedure's decoded result payload.
#[async_trait]
pub trait ReportEndpoint: Send + Sync {
    async fn call(&self, procedure: &str, request: &ReportRequest) -> anyhow::Result<Value>;
}

#[derive(Clone)]
pub struct ReportSubmissionService {
    endpoint: Arc<dyn ReportEndpoint>,
}

impl ReportSubmissionService {
    pub fn new(endpoint: Arc<dyn ReportEndpoint>) -> Self {
        Self { endpoint }
    }

    /// Submit a report. Every failure comes back as a [`ReportError`]; nothing is raised
    /// past this call.
    pub async fn submit(
        &self,
        content_id: &str,
        transcript: &str,
        reason: &str,
    ) -> Result<ReportReceipt, ReportError> {
        let reason = reason.trim();
        let request = ReportRequest {
            content_id: content_id.to_string(),
            recipe: transcript.to_string(),
            reason: (!reason.is_empty()).then(|| reason.to_string()),
        };

        let value = self
            .endpoint
            .call(REPORT_PROCEDURE, &request)
            .await
            .map_err(|e| {
                tracing::warn!(content_id, error = %format!("{e:#}"), "report call failed");
                ReportError::Transport(format!("{e:#}"))
            })?;

        let response = parse_response(value)?;
        if !response.success {
            let cause = response
                .message
                .unwrap_or_else(|| "the server did not accept the report".to_string());
            tracing::warn!(content_id, cause = %cause, "report rejected");
            return Err(ReportError::Rejected(cause));
        }

        tracing::info!(content_id, report_id = ?response.report_id, "report submitted");
        Ok(ReportReceipt {
            content_id: request.content_id,
            report_id: response.report_id,
        })
    }

    /// Report a stored recipe, using its id as the content id.
    pub async fn submit_recipe(
        &self,
        recipe: &Recipe,
        reason: &str,
    ) -> Result<ReportReceipt, ReportError> {
        self.submit(&recipe.id.to_string(), &recipe.transcript(), reason)
            .await
    }
}

fn parse_response(value: Value) -> Result<ReportResponse, ReportError> {
    if !value.is_object() {
        return Err(ReportError::InvalidResponse(format!(
            "expected an object, got {value}"
        )));
    }
    serde_json::from_value(value).map_err(|e| ReportError::InvalidResponse(e.to_string()))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    pub(crate) struct FakeEndpoint {
        reply: Result<Value, String>,
        pub(crate) calls: Mutex<Vec<(String, ReportRequest)>>,
    }

    impl FakeEndpoint {
        pub(crate) fn replying(reply: Value) -> Self {
            Self {
                reply: Ok(reply),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn failing(message: &str) -> Self {
            Self {
                reply: Err(message.to_string()),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ReportEndpoint for FakeEndpoint {
        async fn call(&self, procedure: &str, request: &ReportRequest) -> anyhow::Result<Value> {
            self.calls
                .lock()
                .unwrap()
                .push((procedure.to_string(), request.clone()));
            match &self.reply {
                Ok(value) => Ok(value.clone()),
                Err(message) => Err(anyhow::anyhow!("{message}")),
            }
        }
    }

    fn service(endpoint: FakeEndpoint) -> (ReportSubmissionService, Arc<FakeEndpoint>) {
        let endpoint = Arc::new(endpoint);
        (ReportSubmissionService::new(endpoint.clone()), endpoint)
    }

    #[tokio::test]
    async fn test_success_yields_receipt() {
        let (svc, endpoint) =
            service(FakeEndpoint::replying(json!({"success": true, "reportId": "r1"})));

        let receipt = svc.submit("7", "Soup\n[]\nBoil it.", "spam").await.unwrap();
        assert_eq!(receipt.report_id.as_deref(), Some("r1"));
        assert_eq!(receipt.content_id, "7");

        let calls = endpoint.calls.lock().unwrap();
        assert_eq!(calls[0].0, "reportContent");
        assert_eq!(calls[0].1.recipe, "Soup\n[]\nBoil it.");
        assert_eq!(calls[0].1.reason.as_deref(), Some("spam"));
    }

    #[tokio::test]
    async fn test_success_without_report_id() {
        let (svc, _) = service(FakeEndpoint::replying(json!({"success": true})));
        let receipt = svc.submit("7", "t", "r").await.unwrap();
        assert!(receipt.report_id.is_none());
    }

    #[tokio::test]
    async fn test_success_false_is_rejected() {
        let (svc, _) = service(FakeEndpoint::replying(json!({"success": false})));
        let err = svc.submit("7", "t", "r").await.unwrap_err();
        assert!(matches!(err, ReportError::Rejected(_)));
    }

    #[tokio::test]
    async fn test_missing_success_is_rejected() {
        let (svc, _) = service(FakeEndpoint::replying(json!({"reportId": "r1"})));
        let err = svc.submit("7", "t", "r").await.unwrap_err();
        assert!(matches!(err, ReportError::Rejected(_)));
    }

    #[tokio::test]
    async fn test_non_object_is_invalid() {
        let (svc, _) = service(FakeEndpoint::replying(json!("ok")));
        let err = svc.submit("7", "t", "r").await.unwrap_err();
        assert!(matches!(err, ReportError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_transport_error() {
        let (svc, _) = service(FakeEndpoint::failing("timed out"));
        let err = svc.submit("7", "t", "r").await.unwrap_err();
        assert_eq!(err, ReportError::Transport("timed out".to_string()));
        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn test_blank_reason_sent_as_null() {
        let (svc, endpoint) = service(FakeEndpoint::replying(json!({"success": true})));
        svc.submit("7", "t", "   ").await.unwrap();
        assert!(endpoint.calls.lock().unwrap()[0].1.reason.is_none());
    }

    #[tokio::test]
    async fn test_submit_recipe_uses_transcript() {
        let (svc, endpoint) = service(FakeEndpoint::replying(json!({"success": true})));
        let recipe = Recipe {
            id: 12,
            title: "Soup".to_string(),
            ingredients: "[]".to_string(),
            instructions: "Boil it.".to_string(),
            created_at: String::new(),
        };

        svc.submit_recipe(&recipe, "offensive").await.unwrap();
        let calls = endpoint.calls.lock().unwrap();
        assert_eq!(calls[0].1.content_id, "12");
        assert_eq!(calls[0].1.recipe, "Soup\n[]\nBoil it.");
    }
}
