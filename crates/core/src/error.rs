use crate::catalog::CatalogError;
use crate::cluster::ClusterError;
use crate::space::SpaceError;

/// Any failure inside one check/retire cycle. All of them are retryable.
#[derive(Debug, thiserror::Error)]
pub enum GuardError {
    #[error(transparent)]
    Cluster(#[from] ClusterError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Space(#[from] SpaceError),
}

impl GuardError {
    /// Short category name used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Cluster(e) if e.is_transport() => "transport",
            Self::Cluster(_) => "decode",
            Self::Catalog(_) => "no_eligible_indices",
            Self::Space(_) => "no_node_stats",
        }
    }
}
