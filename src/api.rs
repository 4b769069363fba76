//! Duino-Coin REST API client
//!
//! Endpoints:
//! - `GET /v2/users/{username}` account lookup and detail
//! - `GET /api.json`             network stats, carries "Duco price"

use std::time::Duration;
use thiserror::Error;

use crate::config::Config;
use crate::models::{PriceResponse, UserData, UserResponse};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("API returned status: {0}")]
    Status(u16),
    #[error("API rejected request: {0}")]
    Rejected(String),
    #[error("invalid response: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ApiError>;

/// Read-only view of the remote API the resolver and stats engine depend on
#[allow(async_fn_in_trait)]
pub trait DucoApi {
    /// Account detail for `username`; fails unless HTTP 200 with `success: true`
    async fn fetch_user(&self, username: &str) -> Result<UserData>;

    /// Current USD price of one DUCO
    async fn fetch_price(&self) -> Result<f64>;
}

/// HTTP implementation backed by a single reqwest client
pub struct DucoClient {
    client: reqwest::Client,
    base_url: String,
}

impl DucoClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("duco-monitor/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            &config.api_url,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    fn user_url(&self, username: &str) -> String {
        format!("{}/v2/users/{}", self.base_url, urlencoding::encode(username))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        tracing::debug!("GET {}", url);

        let response = self.client.get(url).send().await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(ApiError::Status(status.as_u16()));
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

impl DucoApi for DucoClient {
    async fn fetch_user(&self, username: &str) -> Result<UserData> {
        let response: UserResponse = self.get_json(&self.user_url(username)).await?;
        user_data(response)
    }

    async fn fetch_price(&self) -> Result<f64> {
        let url = format!("{}/api.json", self.base_url);
        let response: PriceResponse = self.get_json(&url).await?;
        Ok(response.duco_price)
    }
}

fn user_data(response: UserResponse) -> Result<UserData> {
    if !response.success {
        let message = if response.message.is_empty() {
            "success flag was false".to_string()
        } else {
            response.message
        };
        return Err(ApiError::Rejected(message));
    }

    // success without a payload still counts as a valid account
    Ok(response.result.unwrap_or_default())
}
