//! REST client for the cluster HTTP endpoints.
//!
//! Wraps node statistics, alias listing and index deletion using
//! [`reqwest`]. Bodies are read as text and decoded separately so that a
//! malformed body surfaces as [`ClusterError::Decode`] rather than as a
//! transport failure.

use std::time::Duration;

use reqwest::{Method, Url};
use serde::de::DeserializeOwned;

use esguard_core::cluster::{ClusterApi, ClusterError};
use esguard_core::space::NodeSpace;

use crate::types::{AliasesResponse, NodeStatsResponse};

/// HTTP client for a single cluster endpoint.
pub struct ElasticsearchApi {
    client: reqwest::Client,
    base_url: Url,
}

impl ElasticsearchApi {
    /// Create a client for `base_url`, e.g. `http://localhost:9200`.
    ///
    /// `timeout` bounds each whole request; `None` keeps reqwest's default
    /// of no timeout.
    pub fn new(base_url: Url, timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            base_url,
        })
    }

    /// `GET /_nodes/stats`.
    pub async fn node_stats(&self) -> Result<NodeStatsResponse, ClusterError> {
        self.get_json("node_stats", &["_nodes", "stats"]).await
    }

    /// `GET /_aliases`.
    pub async fn aliases(&self) -> Result<AliasesResponse, ClusterError> {
        self.get_json("aliases", &["_aliases"]).await
    }

    /// `DELETE /{index}`. Any 2xx status counts as success.
    pub async fn delete(&self, index: &str) -> Result<(), ClusterError> {
        let url = self.endpoint("delete_index", &[index])?;
        self.send("delete_index", Method::DELETE, url).await?;
        Ok(())
    }

    // ---- private helpers ----

    /// Append path segments to the base URL. Each segment is
    /// percent-encoded, so index names cannot escape their segment.
    fn endpoint(&self, operation: &'static str, segments: &[&str]) -> Result<Url, ClusterError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|()| ClusterError::Transport {
                operation,
                target: self.base_url.to_string(),
                source: "base URL cannot carry a path".into(),
            })?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    /// Send a request and return the body of a 2xx response.
    async fn send(
        &self,
        operation: &'static str,
        method: Method,
        url: Url,
    ) -> Result<String, ClusterError> {
        let target = url.to_string();
        tracing::debug!(operation, %method, url = %target, "Sending cluster request");

        let transport = |e: reqwest::Error| ClusterError::Transport {
            operation,
            target: target.clone(),
            source: Box::new(e),
        };

        let response = self
            .client
            .request(method, url)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        let body = response.text().await.map_err(transport)?;

        if !status.is_success() {
            return Err(ClusterError::Status {
                operation,
                target,
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }

    /// `GET` a JSON document and decode it into `T`.
    async fn get_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        segments: &[&str],
    ) -> Result<T, ClusterError> {
        let url = self.endpoint(operation, segments)?;
        let target = url.to_string();
        let body = self.send(operation, Method::GET, url).await?;

        serde_json::from_str(&body).map_err(|source| ClusterError::Decode {
            operation,
            target,
            source,
        })
    }
}

impl ClusterApi for ElasticsearchApi {
    async fn node_space(&self) -> Result<Vec<NodeSpace>, ClusterError> {
        Ok(self.node_stats().await?.into_node_space())
    }

    async fn index_names(&self) -> Result<Vec<String>, ClusterError> {
        Ok(self.aliases().await?.into_keys().collect())
    }

    async fn delete_index(&self, name: &str) -> Result<(), ClusterError> {
        self.delete(name).await
    }
}
