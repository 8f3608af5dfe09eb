//! The seam between retirement logic and the cluster transport.
//!
//! [`ClusterApi`] is implemented over HTTP by `esguard-client` and by
//! in-memory fakes in tests.

use std::future::Future;

use crate::space::NodeSpace;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while talking to the cluster.
#[derive(Debug, thiserror::Error)]
pub enum ClusterError {
    /// The request could not be sent or the response could not be read.
    #[error("{operation} request to {target} failed: {source}")]
    Transport {
        operation: &'static str,
        target: String,
        #[source]
        source: BoxError,
    },

    /// The cluster answered with a non-2xx status.
    #[error("{operation} request to {target} returned HTTP {status}: {body}")]
    Status {
        operation: &'static str,
        target: String,
        status: u16,
        body: String,
    },

    /// The response body did not have the expected shape.
    #[error("{operation} response from {target} could not be decoded: {source}")]
    Decode {
        operation: &'static str,
        target: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ClusterError {
    /// `true` for send failures and non-success statuses.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Status { .. })
    }
}

/// Operations the retirement controller needs from the cluster.
pub trait ClusterApi: Send + Sync {
    /// Per-node filesystem snapshots from the node stats endpoint.
    fn node_space(&self) -> impl Future<Output = Result<Vec<NodeSpace>, ClusterError>> + Send;

    /// Every index name known to the cluster, in no particular order.
    fn index_names(&self) -> impl Future<Output = Result<Vec<String>, ClusterError>> + Send;

    /// Delete one index by exact name.
    fn delete_index(&self, name: &str) -> impl Future<Output = Result<(), ClusterError>> + Send;
}
