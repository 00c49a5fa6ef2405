//! Custom domains

use crate::error::ApiResult;

use super::ApiClient;
use super::types::{AddDomainRequest, Domain};

impl ApiClient {
    pub async fn list_domains(&self, instance_id: &str) -> ApiResult<Vec<Domain>> {
        self.require_token()?;
        self.get_list(&format!("/instances/{instance_id}/domains")).await
    }

    pub async fn add_domain(&self, instance_id: &str, name: &str) -> ApiResult<Domain> {
        self.require_token()?;
        let request = AddDomainRequest {
            name: name.trim().to_ascii_lowercase(),
        };
        self.post(&format!("/instances/{instance_id}/domains"), &request).await
    }

    /// Ask the backend to re-check DNS for a pending domain
    pub async fn verify_domain(&self, domain_id: &str) -> ApiResult<Domain> {
        self.require_token()?;
        self.post(
            &format!("/domains/{domain_id}/verify"),
            &serde_json::json!({}),
        )
        .await
    }

    pub async fn remove_domain(&self, domain_id: &str) -> ApiResult<()> {
        self.require_token()?;
        self.delete(&format!("/domains/{domain_id}")).await
    }
}
