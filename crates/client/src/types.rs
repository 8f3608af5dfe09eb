//! Wire types for the cluster responses the guardian reads.
//!
//! Byte fields accept both the cluster's `*_in_bytes` names and the short
//! `*_bytes` spelling.

use std::collections::HashMap;

use serde::Deserialize;

use esguard_core::space::{MountSpace, NodeSpace};

/// `GET /_nodes/stats`.
#[derive(Debug, Deserialize)]
pub struct NodeStatsResponse {
    #[serde(default)]
    pub nodes: HashMap<String, NodeStats>,
}

#[derive(Debug, Deserialize)]
pub struct NodeStats {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub host: String,
    #[serde(rename = "fs", alias = "filesystem")]
    pub fs: FsStats,
}

#[derive(Debug, Deserialize)]
pub struct FsStats {
    #[serde(default)]
    pub timestamp: Option<i64>,
    pub total: FsTotal,
    #[serde(default)]
    pub data: Vec<FsData>,
}

#[derive(Debug, Deserialize)]
pub struct FsTotal {
    #[serde(rename = "total_in_bytes", alias = "total_bytes")]
    pub total: u64,
    #[serde(rename = "free_in_bytes", alias = "free_bytes", default)]
    pub free: u64,
    #[serde(rename = "available_in_bytes", alias = "available_bytes")]
    pub available: u64,
}

#[derive(Debug, Deserialize)]
pub struct FsData {
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub mount: String,
    #[serde(rename = "dev", alias = "device", default)]
    pub device: String,
    #[serde(rename = "total_in_bytes", alias = "total_bytes", default)]
    pub total: u64,
    #[serde(rename = "free_in_bytes", alias = "free_bytes", default)]
    pub free: u64,
    #[serde(rename = "available_in_bytes", alias = "available_bytes", default)]
    pub available: u64,
}

/// `GET /_aliases`: index name to alias metadata. Only the keys matter.
pub type AliasesResponse = HashMap<String, serde_json::Value>;

impl NodeStatsResponse {
    /// Convert into core snapshots, ordered by node id.
    pub fn into_node_space(self) -> Vec<NodeSpace> {
        let mut nodes: Vec<NodeSpace> = self
            .nodes
            .into_iter()
            .map(|(id, node)| NodeSpace {
                id,
                name: node.name,
                host: node.host,
                total_bytes: node.fs.total.total,
                free_bytes: node.fs.total.free,
                available_bytes: node.fs.total.available,
                mounts: node.fs.data.into_iter().map(MountSpace::from).collect(),
            })
            .collect();
        nodes.sort_by(|a, b| a.id.cmp(&b.id));
        nodes
    }
}

impl From<FsData> for MountSpace {
    fn from(data: FsData) -> Self {
        Self {
            path: data.path,
            mount: data.mount,
            device: data.device,
            total_bytes: data.total,
            free_bytes: data.free,
            available_bytes: data.available,
        }
    }
}
