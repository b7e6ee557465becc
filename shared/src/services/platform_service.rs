use sea_orm::prelude::DatabaseConnection;
use std::sync::Arc;
use tracing::info;

use crate::entity::platforms;
use crate::error::{TrackerError, TrackerResult};
use crate::repositories::platform_repository::PlatformRepository;
use crate::validation::parse_name;

pub struct PlatformService {
    repo: PlatformRepository,
}

impl PlatformService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        let repo = PlatformRepository::new(db);
        Self { repo }
    }

    pub async fn list_platforms(&self) -> TrackerResult<Vec<platforms::Model>> {
        Ok(self.repo.list_all().await?)
    }

    pub async fn get_platform(&self, platform_id: i32) -> TrackerResult<platforms::Model> {
        self.repo
            .find_by_id(platform_id)
            .await?
            .ok_or_else(|| TrackerError::not_found("Platform not found."))
    }

    pub async fn create_platform(&self, raw_name: &str) -> TrackerResult<platforms::Model> {
        let name = parse_name(raw_name, "Platform")?;
        if self.repo.find_by_name(&name, None).await?.is_some() {
            return Err(TrackerError::conflict(format!(
                "Platform '{}' already exists.",
                name
            )));
        }
        let platform = self.repo.create(&name).await?;
        info!("Created platform {} ({})", platform.name, platform.platform_id);
        Ok(platform)
    }

    pub async fn rename_platform(
        &self,
        platform_id: i32,
        raw_name: &str,
    ) -> TrackerResult<(String, platforms::Model)> {
        let platform = self.get_platform(platform_id).await?;
        let name = parse_name(raw_name, "Platform")?;
        if self.repo.find_by_name(&name, Some(platform_id)).await?.is_some() {
            return Err(TrackerError::conflict(format!(
                "Another platform with the name '{}' already exists.",
                name
            )));
        }
        if name == platform.name {
            return Err(TrackerError::no_changes(
                "No changes made to the platform name.",
            ));
        }
        let updated = self.repo.rename(platform_id, &name).await?;
        Ok((platform.name, updated))
    }

    pub async fn delete_platform(&self, platform_id: i32) -> TrackerResult<platforms::Model> {
        let platform = self
            .repo
            .find_by_id(platform_id)
            .await?
            .ok_or_else(|| TrackerError::not_found("Platform not found or already deleted."))?;
        if self.repo.delete(platform_id).await? == 0 {
            return Err(TrackerError::not_found(format!(
                "Platform '{}' not found or already deleted.",
                platform.name
            )));
        }
        info!(
            "Deleted platform {} ({}) with its accounts",
            platform.name, platform.platform_id
        );
        Ok(platform)
    }
}
