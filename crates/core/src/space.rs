//! Node filesystem snapshots and cluster free-space reduction.
//!
//! Snapshots are rebuilt on every poll and dropped once the cluster
//! percentage has been computed.

use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SpaceError {
    #[error("No node reported a usable filesystem total ({nodes} nodes in response)")]
    NoUsableNodes { nodes: usize },

    #[error("Unknown space mode '{0}' (expected min, aggregate or last)")]
    UnknownMode(String),
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// One data path reported by a node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MountSpace {
    pub path: String,
    pub mount: String,
    pub device: String,
    pub total_bytes: u64,
    pub free_bytes: u64,
    pub available_bytes: u64,
}

/// Filesystem totals for one cluster node, summed across its mounts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeSpace {
    /// Node identifier (key of the stats response).
    pub id: String,
    pub name: String,
    pub host: String,
    pub total_bytes: u64,
    pub free_bytes: u64,
    pub available_bytes: u64,
    pub mounts: Vec<MountSpace>,
}

impl NodeSpace {
    /// Available bytes, never more than the total.
    pub fn usable_available(&self) -> u64 {
        self.available_bytes.min(self.total_bytes)
    }

    /// `floor(available * 100 / total)`, or `None` for a zero total.
    pub fn available_percent(&self) -> Option<u64> {
        percent_of(self.usable_available().into(), self.total_bytes.into())
    }
}

fn percent_of(available: u128, total: u128) -> Option<u64> {
    if total == 0 {
        return None;
    }
    Some((available * 100 / total) as u64)
}

// ---------------------------------------------------------------------------
// Reduction
// ---------------------------------------------------------------------------

/// How per-node percentages collapse into one cluster value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SpaceMode {
    /// Lowest per-node percentage.
    #[default]
    Minimum,
    /// Percentage of summed available bytes over summed totals.
    Aggregate,
    /// Percentage of the last node in ascending node-id order.
    LastNode,
}

impl SpaceMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Minimum => "min",
            Self::Aggregate => "aggregate",
            Self::LastNode => "last",
        }
    }
}

impl fmt::Display for SpaceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpaceMode {
    type Err = SpaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "min" | "minimum" => Ok(Self::Minimum),
            "aggregate" | "sum" => Ok(Self::Aggregate),
            "last" | "last-node" => Ok(Self::LastNode),
            other => Err(SpaceError::UnknownMode(other.to_string())),
        }
    }
}

/// Cluster free-space figure used for the retirement decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClusterFreeSpace {
    pub percent: u64,
    /// Nodes that contributed (nodes with a zero total are left out).
    pub node_count: usize,
    pub mode: SpaceMode,
}

impl ClusterFreeSpace {
    /// Reduce node snapshots to a single percentage.
    pub fn reduce(nodes: &[NodeSpace], mode: SpaceMode) -> Result<Self, SpaceError> {
        let mut usable: Vec<&NodeSpace> = nodes.iter().filter(|n| n.total_bytes > 0).collect();
        usable.sort_by(|a, b| a.id.cmp(&b.id));

        let percent = match mode {
            SpaceMode::Minimum => usable.iter().filter_map(|n| n.available_percent()).min(),
            SpaceMode::LastNode => usable.last().and_then(|n| n.available_percent()),
            SpaceMode::Aggregate => {
                let total: u128 = usable.iter().map(|n| u128::from(n.total_bytes)).sum();
                let available: u128 = usable
                    .iter()
                    .map(|n| u128::from(n.usable_available()))
                    .sum();
                percent_of(available, total)
            }
        };

        let percent = percent.ok_or(SpaceError::NoUsableNodes { nodes: nodes.len() })?;

        Ok(Self {
            percent,
            node_count: usable.len(),
            mode,
        })
    }

    /// Space is low at or below the threshold.
    pub fn is_low(&self, threshold_percent: u64) -> bool {
        self.percent <= threshold_percent
    }
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

/// Human-readable byte formatting.
pub fn format_bytes(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;
    const TB: f64 = GB * 1024.0;

    let b = bytes as f64;
    if b >= TB {
        format!("{:.2} TB", b / TB)
    } else if b >= GB {
        format!("{:.2} GB", b / GB)
    } else if b >= MB {
        format!("{:.2} MB", b / MB)
    } else if b >= KB {
        format!("{:.2} KB", b / KB)
    } else {
        format!("{bytes} B")
    }
}
