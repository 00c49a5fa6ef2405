//! Git collaborators of an instance

use crate::error::ApiResult;

use super::ApiClient;
use super::types::{AddCollaboratorRequest, Collaborator, Permission};

impl ApiClient {
    pub async fn list_collaborators(&self, instance_id: &str) -> ApiResult<Vec<Collaborator>> {
        self.require_token()?;
        self.get_list(&format!("/instances/{instance_id}/collaborators")).await
    }

    pub async fn add_collaborator(
        &self,
        instance_id: &str,
        username: &str,
        permission: Permission,
    ) -> ApiResult<Collaborator> {
        self.require_token()?;
        let request = AddCollaboratorRequest {
            username: username.to_string(),
            permission,
        };
        self.post(&format!("/instances/{instance_id}/collaborators"), &request).await
    }

    pub async fn remove_collaborator(&self, instance_id: &str, username: &str) -> ApiResult<()> {
        self.require_token()?;
        self.delete(&format!("/instances/{instance_id}/collaborators/{username}")).await
    }
}
