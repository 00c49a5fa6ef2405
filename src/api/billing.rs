//! Subscriptions and plans

use crate::error::ApiResult;

use super::ApiClient;
use super::types::{SubscribeRequest, Subscription, SubscriptionPlan};

impl ApiClient {
    pub async fn list_subscriptions(&self) -> ApiResult<Vec<Subscription>> {
        self.require_token()?;
        self.get_list("/subscriptions").await
    }

    /// Public plan catalogue; works without a session
    pub async fn list_plans(&self) -> ApiResult<Vec<SubscriptionPlan>> {
        self.get_list("/subscription-plans").await
    }

    pub async fn subscribe(
        &self,
        plan_id: &str,
        instance_id: Option<&str>,
    ) -> ApiResult<Subscription> {
        self.require_token()?;
        let request = SubscribeRequest {
            plan_id: plan_id.to_string(),
            instance_id: instance_id.map(str::to_string),
        };
        self.post("/subscriptions", &request).await
    }

    pub async fn cancel_subscription(&self, subscription_id: &str) -> ApiResult<()> {
        self.require_token()?;
        self.delete(&format!("/subscriptions/{subscription_id}")).await
    }
}
