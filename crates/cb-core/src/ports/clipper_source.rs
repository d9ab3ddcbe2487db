use async_trait::async_trait;

use crate::clipper::ClipperSummary;

/// Supplies the candidate clipper list a listing renders.
///
/// Directory, dashboard and marketplace views differ only in which source
/// they are mounted with.
#[async_trait]
pub trait ClipperSourcePort: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &str;

    async fn fetch_clippers(&self) -> anyhow::Result<Vec<ClipperSummary>>;
}
