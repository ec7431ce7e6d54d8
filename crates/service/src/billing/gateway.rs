//! Payment gateway integration.
//!
//! The gateway only ever sees an opaque payment token (`source`); card data
//! never reaches this service.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use configs::{PaymentConfig, PaymentProvider};
use models::PaymentStatus;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Clone, Serialize)]
pub struct ChargeRequest {
    /// Amount in minor units.
    pub amount: i64,
    pub currency: String,
    pub source: String,
    pub description: String,
    pub idempotency_key: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChargeOutcome {
    pub reference: String,
    pub status: PaymentStatus,
    pub failure_reason: Option<String>,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum GatewayError {
    /// Network trouble, timeouts, 429 and 5xx answers.
    #[error("gateway unavailable: {0}")]
    Transient(String),
    #[error("charge rejected: {0}")]
    Rejected(String),
    #[error("unexpected gateway response: {0}")]
    Decode(String),
}

impl GatewayError {
    pub fn is_retryable(&self) -> bool { matches!(self, GatewayError::Transient(_)) }
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    fn name(&self) -> &'static str;
    async fn charge(&self, req: &ChargeRequest) -> Result<ChargeOutcome, GatewayError>;
}

#[derive(Debug, Deserialize)]
struct ChargeResponse {
    id: String,
    status: String,
    #[serde(default)]
    failure_message: Option<String>,
}

fn map_status(raw: &str) -> Option<PaymentStatus> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "succeeded" | "paid" => Some(PaymentStatus::Succeeded),
        "pending" | "processing" => Some(PaymentStatus::Pending),
        "failed" | "declined" => Some(PaymentStatus::Failed),
        _ => None,
    }
}

/// REST gateway client: `POST {base_url}/v1/charges` with a bearer key.
pub struct HttpPaymentGateway {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpPaymentGateway {
    pub fn new(cfg: &PaymentConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs.max(1)))
            .build()
            .map_err(|e| GatewayError::Transient(e.to_string()))?;
        Ok(Self { client, base_url: cfg.base_url.trim_end_matches('/').to_string(), api_key: cfg.api_key.clone() })
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    fn name(&self) -> &'static str { "http" }

    async fn charge(&self, req: &ChargeRequest) -> Result<ChargeOutcome, GatewayError> {
        let url = format!("{}/v1/charges", self.base_url);
        let resp = self.client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("Idempotency-Key", &req.idempotency_key)
            .json(req)
            .send()
            .await
            .map_err(|e| GatewayError::Transient(e.to_string()))?;

        let status = resp.status();
        if status.is_server_error() || status.as_u16() == 429 {
            return Err(GatewayError::Transient(format!("status {}", status.as_u16())));
        }
        if status.is_client_error() {
            let body = resp.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "gateway rejected charge");
            return Err(GatewayError::Rejected(format!("status {}: {}", status.as_u16(), body.trim())));
        }

        let body: ChargeResponse = resp.json().await.map_err(|e| GatewayError::Decode(e.to_string()))?;
        let mapped = map_status(&body.status).ok_or_else(|| GatewayError::Decode(format!("unknown status {:?}", body.status)))?;
        debug!(reference = %body.id, status = %mapped, "gateway charge answered");
        Ok(ChargeOutcome { reference: body.id, status: mapped, failure_reason: body.failure_message })
    }
}

/// One scripted answer of [`MockPaymentGateway`].
#[derive(Debug, Clone)]
pub enum MockStep {
    Succeed,
    Pending,
    Decline(String),
    Unavailable,
}

/// In-process gateway. Replays scripted steps, then succeeds.
#[derive(Default)]
pub struct MockPaymentGateway {
    script: Mutex<VecDeque<MockStep>>,
    charges: Mutex<Vec<ChargeRequest>>,
}

impl MockPaymentGateway {
    pub fn succeeding() -> Self { Self::default() }

    pub fn with_script(steps: impl IntoIterator<Item = MockStep>) -> Self {
        Self { script: Mutex::new(steps.into_iter().collect()), charges: Mutex::new(Vec::new()) }
    }

    /// Requests received so far, including failed attempts.
    pub fn charges(&self) -> Vec<ChargeRequest> {
        self.charges.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    fn name(&self) -> &'static str { "mock" }

    async fn charge(&self, req: &ChargeRequest) -> Result<ChargeOutcome, GatewayError> {
        let attempt = {
            let mut charges = self.charges.lock().map_err(|e| GatewayError::Transient(e.to_string()))?;
            charges.push(req.clone());
            charges.len()
        };
        let step = self.script
            .lock()
            .map_err(|e| GatewayError::Transient(e.to_string()))?
            .pop_front()
            .unwrap_or(MockStep::Succeed);
        let reference = format!("mock_ch_{}_{attempt}", req.idempotency_key);
        match step {
            MockStep::Succeed => Ok(ChargeOutcome { reference, status: PaymentStatus::Succeeded, failure_reason: None }),
            MockStep::Pending => Ok(ChargeOutcome { reference, status: PaymentStatus::Pending, failure_reason: None }),
            MockStep::Decline(reason) => Ok(ChargeOutcome { reference, status: PaymentStatus::Failed, failure_reason: Some(reason) }),
            MockStep::Unavailable => Err(GatewayError::Transient("mock gateway unavailable".into())),
        }
    }
}

/// Build the gateway selected by `[payment].provider`.
pub fn build_gateway(cfg: &PaymentConfig) -> Result<Arc<dyn PaymentGateway>, GatewayError> {
    match cfg.provider {
        PaymentProvider::Mock => Ok(Arc::new(MockPaymentGateway::succeeding())),
        PaymentProvider::Http => Ok(Arc::new(HttpPaymentGateway::new(cfg)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req() -> ChargeRequest {
        ChargeRequest {
            amount: 2900,
            currency: "USD".into(),
            source: "tok_visa".into(),
            description: "premium plan".into(),
            idempotency_key: "k1".into(),
        }
    }

    #[test]
    fn gateway_statuses_are_normalized() {
        assert_eq!(map_status("Succeeded"), Some(PaymentStatus::Succeeded));
        assert_eq!(map_status("processing"), Some(PaymentStatus::Pending));
        assert_eq!(map_status("declined"), Some(PaymentStatus::Failed));
        assert_eq!(map_status("refunded"), None);
    }

    #[test]
    fn only_transient_errors_retry() {
        assert!(GatewayError::Transient("503".into()).is_retryable());
        assert!(!GatewayError::Rejected("card".into()).is_retryable());
        assert!(!GatewayError::Decode("json".into()).is_retryable());
    }

    #[tokio::test]
    async fn mock_replays_script_then_succeeds() {
        let gw = MockPaymentGateway::with_script([MockStep::Unavailable, MockStep::Decline("insufficient funds".into())]);
        assert!(matches!(gw.charge(&req()).await, Err(GatewayError::Transient(_))));
        let declined = gw.charge(&req()).await.unwrap();
        assert_eq!(declined.status, PaymentStatus::Failed);
        assert_eq!(declined.failure_reason.as_deref(), Some("insufficient funds"));
        assert_eq!(gw.charge(&req()).await.unwrap().status, PaymentStatus::Succeeded);
        assert_eq!(gw.charges().len(), 3);
    }

    #[test]
    fn charge_body_uses_wire_names() {
        let v = serde_json::to_value(req()).unwrap();
        assert_eq!(v["amount"], 2900);
        assert_eq!(v["source"], "tok_visa");
        assert_eq!(v["idempotency_key"], "k1");
    }

    #[test]
    fn mock_provider_builds_without_network() {
        let gw = build_gateway(&PaymentConfig::default()).unwrap();
        assert_eq!(gw.name(), "mock");
    }
}
