/// Identifies the cluster a request operates on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClusterRef {
    pub id: String,
}

impl ClusterRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Per-request data handed to the bridge.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Needed to look up plugin schemas that are not loaded yet.
    pub cluster: Option<ClusterRef>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cluster(cluster: ClusterRef) -> Self {
        Self {
            cluster: Some(cluster),
        }
    }
}
