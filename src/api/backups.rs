//! Backups and backup schedules

use crate::error::ApiResult;

use super::ApiClient;
use super::types::{Backup, BackupConfiguration};

impl ApiClient {
    pub async fn list_backups(&self, instance_id: &str) -> ApiResult<Vec<Backup>> {
        self.require_token()?;
        self.get_list(&format!("/instances/{instance_id}/backups")).await
    }

    /// Trigger a manual backup
    pub async fn create_backup(&self, instance_id: &str) -> ApiResult<Backup> {
        self.require_token()?;
        self.post(
            &format!("/instances/{instance_id}/backups"),
            &serde_json::json!({ "kind": "manual" }),
        )
        .await
    }

    pub async fn restore_backup(&self, backup_id: &str) -> ApiResult<()> {
        self.require_token()?;
        self.post_empty(&format!("/backups/{backup_id}/restore")).await
    }

    pub async fn delete_backup(&self, backup_id: &str) -> ApiResult<()> {
        self.require_token()?;
        self.delete(&format!("/backups/{backup_id}")).await
    }

    pub async fn backup_configuration(&self, instance_id: &str) -> ApiResult<BackupConfiguration> {
        self.require_token()?;
        self.get(&format!("/instances/{instance_id}/backup-configurations")).await
    }

    pub async fn update_backup_configuration(
        &self,
        instance_id: &str,
        configuration: &BackupConfiguration,
    ) -> ApiResult<BackupConfiguration> {
        self.require_token()?;
        self.put(
            &format!("/instances/{instance_id}/backup-configurations"),
            configuration,
        )
        .await
    }
}
