//! Live and historical container metrics

use crate::error::ApiResult;

use super::ApiClient;
use super::types::{HistoryRange, LiveMetrics, MetricsHistory};

impl ApiClient {
    /// Current reading with cumulative I/O counters
    pub async fn live_metrics(&self, instance_id: &str) -> ApiResult<LiveMetrics> {
        self.require_token()?;
        self.get(&format!("/instances/{instance_id}/metrics")).await
    }

    pub async fn metrics_history(
        &self,
        instance_id: &str,
        range: HistoryRange,
    ) -> ApiResult<MetricsHistory> {
        self.require_token()?;
        self.get(&format!(
            "/instances/{instance_id}/metrics/history?range={}",
            range.as_str()
        ))
        .await
    }
}
