use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::ids::{BookerId, ClipperId};

/// One row of the remote bookmark table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteBookmarkRecord {
    pub booker_id: BookerId,
    pub clipper_id: ClipperId,
    pub notes: Option<String>,
}

/// Booker-scoped remote bookmark table.
///
/// No pagination and no error taxonomy: any failure is a generic error.
#[async_trait]
pub trait RemoteBookmarkPort: Send + Sync {
    async fn list(&self, booker_id: &BookerId) -> anyhow::Result<Vec<RemoteBookmarkRecord>>;

    async fn insert(
        &self,
        booker_id: &BookerId,
        clipper_id: &ClipperId,
        notes: Option<String>,
    ) -> anyhow::Result<()>;

    async fn delete(&self, booker_id: &BookerId, clipper_id: &ClipperId) -> anyhow::Result<()>;
}
