use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use pantry_core::models::ReportRequest;
use pantry_core::report::ReportEndpoint;

use crate::config::{CONNECT_TIMEOUT_SECS, DEFAULT_REPORT_TIMEOUT_SECS};

/// Client for HTTPS callable cloud functions (`{"data": ...}` in, `{"result": ...}` out).
pub struct CallableFunctionsClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Serialize)]
struct CallableRequest<'a, T> {
    data: &'a T,
}

#[derive(Debug, Deserialize)]
struct CallableResponse {
    result: Option<Value>,
    error: Option<CallableError>,
}

#[derive(Debug, Deserialize)]
struct CallableError {
    message: String,
    status: Option<String>,
}

impl CallableFunctionsClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(format!("pantry-cli/{}", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(DEFAULT_REPORT_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, procedure: &str) -> String {
        format!("{}/{procedure}", self.base_url)
    }
}

fn unwrap_callable(response: CallableResponse) -> Result<Value> {
    if let Some(err) = response.error {
        let status = err.status.unwrap_or_else(|| "UNKNOWN".to_string());
        bail!("{status}: {}", err.message);
    }
    response
        .result
        .context("Callable response has neither result nor error")
}

#[async_trait]
impl ReportEndpoint for CallableFunctionsClient {
    async fn call(&self, procedure: &str, request: &ReportRequest) -> Result<Value> {
        let resp = self
            .client
            .post(self.url(procedure))
            .json(&CallableRequest { data: request })
            .send()
            .await
            .with_context(|| format!("Failed to reach {procedure}"))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .with_context(|| format!("Failed to read {procedure} response"))?;

        match serde_json::from_str::<CallableResponse>(&body) {
            Ok(parsed) => unwrap_callable(parsed),
            Err(_) if !status.is_success() => bail!("{procedure} returned {status}: {body}"),
            Err(e) => Err(e).with_context(|| format!("Failed to parse {procedure} response")),
        }
    }
}
