//! HTTP client for the merge backend.
use async_trait::async_trait;
use board_core::{CraftedItem, InventoryItem, ItemId};
use board_runtime::{BackendError, InventorySource, MergeApi};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::RestConfig;
use crate::error::RestError;
use crate::types::{CraftedPayload, InventoryPayload, MergeRequest, WireIds};

/// Inventory source and merge RPC backed by the game's REST API.
#[derive(Clone, Debug)]
pub struct RestBackend {
    config: RestConfig,
    http_client: reqwest::Client,
    wire_ids: WireIds,
}

impl RestBackend {
    pub fn new(config: RestConfig) -> Result<Self, RestError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(RestError::Client)?;
        Ok(Self {
            config,
            http_client,
            wire_ids: WireIds::new(),
        })
    }

    pub fn config(&self) -> &RestConfig {
        &self.config
    }

    /// Fetches the inventory without going through [`BackendError`].
    pub async fn inventory(&self, search: &str) -> Result<Vec<InventoryItem>, RestError> {
        let url = self.config.endpoint("inventory");
        debug!(target: "backend::rest", %url, search, "fetching inventory");

        let request = self.http_client.get(&url).query(&[("search", search)]);
        let payload: InventoryPayload = self.send(&url, request).await?;
        Ok(payload.into_items(&self.wire_ids))
    }

    /// Calls the merge RPC without going through [`BackendError`].
    pub async fn craft(
        &self,
        target: &ItemId,
        dropped: &ItemId,
    ) -> Result<CraftedItem, RestError> {
        let url = self.config.endpoint("merge");
        debug!(
            target: "backend::rest",
            %url,
            target_item = %target,
            dropped_item = %dropped,
            "requesting merge"
        );

        let request = self
            .http_client
            .post(&url)
            .json(&MergeRequest::new(&self.wire_ids, target, dropped));
        let payload: CraftedPayload = self.send(&url, request).await?;
        Ok(payload.into_crafted(&self.wire_ids))
    }

    async fn send<T>(&self, url: &str, request: reqwest::RequestBuilder) -> Result<T, RestError>
    where
        T: DeserializeOwned,
    {
        let mut request = request;
        if let Some(token) = &self.config.auth_token {
            request = request.bearer_auth(token);
        }
        if let Some(session) = &self.config.session_id {
            request = request.header("X-Session-Id", session);
        }

        let response = request.send().await.map_err(|source| RestError::Request {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|source| RestError::Request {
            url: url.to_string(),
            source,
        })?;

        if !status.is_success() {
            warn!(
                target: "backend::rest",
                %url,
                status = status.as_u16(),
                "backend returned an error status"
            );
            return Err(RestError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|source| RestError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

#[async_trait]
impl InventorySource for RestBackend {
    async fn fetch_inventory(&self, search: &str) -> Result<Vec<InventoryItem>, BackendError> {
        Ok(self.inventory(search).await?)
    }
}

#[async_trait]
impl MergeApi for RestBackend {
    async fn merge(&self, target: &ItemId, dropped: &ItemId) -> Result<CraftedItem, BackendError> {
        Ok(self.craft(target, dropped).await?)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn unreachable_backend_maps_to_network_error() {
        let config =
            RestConfig::new("http://127.0.0.1:9").with_timeout(Duration::from_millis(500));
        let backend = RestBackend::new(config).unwrap();

        let error = backend.fetch_inventory("").await.unwrap_err();
        assert!(matches!(error, BackendError::Network(_)), "got {error:?}");
    }

    #[test]
    fn status_errors_keep_the_code() {
        let error: BackendError = RestError::Status {
            url: "http://merge.example/merge".into(),
            status: 422,
            body: "no recipe".into(),
        }
        .into();
        assert_eq!(error, BackendError::rejected(422, "no recipe"));
    }
}
