//! Instance CRUD

use crate::error::ApiResult;

use super::ApiClient;
use super::types::{CreateInstanceRequest, Instance};

impl ApiClient {
    pub async fn list_instances(&self) -> ApiResult<Vec<Instance>> {
        self.require_token()?;
        self.get_list("/instances").await
    }

    pub async fn get_instance(&self, instance_id: &str) -> ApiResult<Instance> {
        self.require_token()?;
        self.get(&format!("/instances/{instance_id}")).await
    }

    pub async fn create_instance(&self, request: &CreateInstanceRequest) -> ApiResult<Instance> {
        self.require_token()?;
        self.post("/instances", request).await
    }

    pub async fn delete_instance(&self, instance_id: &str) -> ApiResult<()> {
        self.require_token()?;
        self.delete(&format!("/instances/{instance_id}")).await
    }

    pub async fn restart_instance(&self, instance_id: &str) -> ApiResult<()> {
        self.require_token()?;
        self.post_empty(&format!("/instances/{instance_id}/restart")).await
    }
}
