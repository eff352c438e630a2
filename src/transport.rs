use async_trait::async_trait;
use reqwest::{header::USER_AGENT, Client, StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::{
    config::Config,
    error::SignupError,
    model::{RegistrationPayload, RegistrationReceipt},
};

type Result<T> = std::result::Result<T, TransportError>;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The server answered with a non-success status.
    #[error("registration rejected with status {status}")]
    Rejected { status: u16, detail: Option<String> },

    #[error("could not reach registration server: {0}")]
    Unreachable(String),

    #[error("malformed response from registration server: {0}")]
    MalformedResponse(String),
}

/// Delivers a registration payload to the registration service.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn submit(&self, payload: &RegistrationPayload) -> Result<RegistrationReceipt>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn submit(&self, payload: &RegistrationPayload) -> Result<RegistrationReceipt> {
        (**self).submit(payload).await
    }
}

/// JSON over HTTP POST to the `/register` resource.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: Client,
    endpoint: Url,
}

impl HttpTransport {
    pub fn new(endpoint: &str, timeout: Duration) -> std::result::Result<Self, SignupError> {
        let endpoint = Url::parse(endpoint).map_err(|source| SignupError::Endpoint {
            url: endpoint.to_string(),
            source,
        })?;
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self { client, endpoint })
    }

    pub fn from_config(config: &Config) -> std::result::Result<Self, SignupError> {
        Self::new(
            &config.endpoint(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn submit(&self, payload: &RegistrationPayload) -> Result<RegistrationReceipt> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(USER_AGENT, concat!("signup/", env!("CARGO_PKG_VERSION")))
            .json(payload)
            .send()
            .await
            .map_err(|e| TransportError::Unreachable(e.to_string()))?;

        let status = response.status();
        debug!("registration endpoint answered {status}");

        if status.is_success() {
            return response
                .json::<RegistrationReceipt>()
                .await
                .map_err(|e| TransportError::MalformedResponse(e.to_string()));
        }

        let detail = match response.json::<ErrorBody>().await {
            Ok(body) => body.into_detail(),
            Err(e) => {
                debug!("could not decode error body for {status}: {e}");
                None
            }
        };

        Err(rejected(status, detail))
    }
}

fn rejected(status: StatusCode, detail: Option<String>) -> TransportError {
    TransportError::Rejected {
        status: status.as_u16(),
        detail,
    }
}

/// Error body of the registration service. `detail` is a plain string for application errors
/// and a list of `{loc, msg, type}` objects for request validation errors.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Value,
}

impl ErrorBody {
    fn into_detail(self) -> Option<String> {
        match self.detail {
            Value::String(detail) if !detail.trim().is_empty() => Some(detail),
            Value::Array(items) => items
                .into_iter()
                .find_map(|item| item.get("msg")?.as_str().map(str::to_owned)),
            _ => None,
        }
    }
}
