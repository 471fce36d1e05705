//! Transport to the authoritative ticket store.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::config::SyncConfig;
use crate::ticket::{Ticket, TicketPatch};

use super::SyncError;

/// Operations the sync layer needs from the store.
#[async_trait]
pub trait TicketRemote: Send + Sync {
    /// Full snapshot of every ticket.
    async fn list(&self) -> Result<Vec<Ticket>, SyncError>;

    /// Submit a client-created ticket. The store dedupes by id.
    async fn create(&self, ticket: &Ticket) -> Result<Ticket, SyncError>;

    /// Send a partial update for one ticket.
    async fn update(&self, id: &str, patch: &TicketPatch) -> Result<Ticket, SyncError>;

    /// Clear every ticket.
    async fn reset(&self) -> Result<(), SyncError>;
}

/// Error body returned by the server.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// [`TicketRemote`] over the server's HTTP API.
pub struct HttpTicketRemote {
    client: Client,
    base_url: String,
}

impl HttpTicketRemote {
    /// Create a remote for `base_url` (e.g. `http://10.0.0.5:8080`).
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SyncError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SyncError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn from_config(config: &SyncConfig) -> Result<Self, SyncError> {
        Self::new(
            config.server_url.clone(),
            Duration::from_millis(config.request_timeout_ms),
        )
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url.trim_end_matches('/'), path)
    }

    fn ticket_url(&self, id: &str) -> String {
        self.url(&format!("/tickets/{}", urlencoding::encode(id)))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, SyncError> {
        let response = request
            .send()
            .await
            .map_err(|e| SyncError::Unreachable(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        // A gateway in front of the store answering for it.
        if matches!(
            status,
            StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT
        ) {
            return Err(SyncError::Unreachable(format!("HTTP {}", status)));
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.error)
            .unwrap_or_else(|_| body.chars().take(200).collect());

        Err(SyncError::Rejected {
            status: status.as_u16(),
            message,
        })
    }

    async fn ticket_from(response: Response) -> Result<Ticket, SyncError> {
        response
            .json()
            .await
            .map_err(|e| SyncError::Decode(e.to_string()))
    }
}

#[async_trait]
impl TicketRemote for HttpTicketRemote {
    async fn list(&self) -> Result<Vec<Ticket>, SyncError> {
        let response = self.send(self.client.get(self.url("/tickets"))).await?;
        let tickets: Vec<Ticket> = response
            .json()
            .await
            .map_err(|e| SyncError::Decode(e.to_string()))?;
        debug!(count = tickets.len(), "Fetched ticket snapshot");
        Ok(tickets)
    }

    async fn create(&self, ticket: &Ticket) -> Result<Ticket, SyncError> {
        let response = self
            .send(self.client.post(self.url("/tickets")).json(ticket))
            .await?;
        Self::ticket_from(response).await
    }

    async fn update(&self, id: &str, patch: &TicketPatch) -> Result<Ticket, SyncError> {
        let response = self
            .send(self.client.put(self.ticket_url(id)).json(patch))
            .await?;
        Self::ticket_from(response).await
    }

    async fn reset(&self) -> Result<(), SyncError> {
        self.send(self.client.post(self.url("/reset")).json(&json!({})))
            .await?;
        Ok(())
    }
}
