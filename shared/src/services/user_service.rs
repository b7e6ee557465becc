use sea_orm::prelude::DatabaseConnection;
use std::sync::Arc;
use tracing::info;

use crate::entity::users;
use crate::error::{TrackerError, TrackerResult};
use crate::repositories::user_repository::UserRepository;
use crate::validation::parse_name;

pub struct UserService {
    repo: UserRepository,
}

impl UserService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        let repo = UserRepository::new(db);
        Self { repo }
    }

    pub async fn list_users(&self) -> TrackerResult<Vec<users::Model>> {
        Ok(self.repo.list_all().await?)
    }

    pub async fn get_user(&self, user_id: i32) -> TrackerResult<users::Model> {
        self.repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| TrackerError::not_found("User not found."))
    }

    pub async fn create_user(&self, raw_name: &str) -> TrackerResult<users::Model> {
        let name = parse_name(raw_name, "User")?;
        if self.repo.find_by_name(&name, None).await?.is_some() {
            return Err(TrackerError::conflict(format!("User '{}' already exists.", name)));
        }
        let user = self.repo.create(&name).await?;
        info!("Created user {} ({})", user.name, user.user_id);
        Ok(user)
    }

    /// Returns the previous name alongside the updated row.
    pub async fn rename_user(
        &self,
        user_id: i32,
        raw_name: &str,
    ) -> TrackerResult<(String, users::Model)> {
        let user = self.get_user(user_id).await?;
        let name = parse_name(raw_name, "User")?;
        if self.repo.find_by_name(&name, Some(user_id)).await?.is_some() {
            return Err(TrackerError::conflict(format!(
                "Another user with the name '{}' already exists.",
                name
            )));
        }
        if name == user.name {
            return Err(TrackerError::no_changes("No changes made to the user name."));
        }
        let updated = self.repo.rename(user_id, &name).await?;
        Ok((user.name, updated))
    }

    /// Deletes the user with every account and asset they own.
    pub async fn delete_user(&self, user_id: i32) -> TrackerResult<users::Model> {
        let user = self
            .repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| TrackerError::not_found("User not found or already deleted."))?;
        if self.repo.delete(user_id).await? == 0 {
            return Err(TrackerError::not_found(format!(
                "User '{}' not found or already deleted.",
                user.name
            )));
        }
        info!("Deleted user {} ({})", user.name, user.user_id);
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::test_db;

    #[tokio::test]
    async fn test_create_and_list_users_sorted() {
        let service = UserService::new(test_db().await);
        service.create_user("  Zoe ").await.unwrap();
        service.create_user("Adam").await.unwrap();

        let names: Vec<String> = service
            .list_users()
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.name)
            .collect();
        assert_eq!(names, vec!["Adam", "Zoe"]);
    }

    #[tokio::test]
    async fn test_create_user_rejects_empty_and_duplicate() {
        let service = UserService::new(test_db().await);
        let empty = service.create_user("   ").await.unwrap_err();
        assert_eq!(empty.to_string(), "User name cannot be empty.");

        service.create_user("Adam").await.unwrap();
        let dup = service.create_user("Adam").await.unwrap_err();
        assert!(matches!(dup, TrackerError::Conflict(_)));
        assert_eq!(dup.to_string(), "User 'Adam' already exists.");
    }

    #[tokio::test]
    async fn test_rename_user() {
        let service = UserService::new(test_db().await);
        let adam = service.create_user("Adam").await.unwrap();
        service.create_user("Eve").await.unwrap();

        let same = service.rename_user(adam.user_id, "Adam").await.unwrap_err();
        assert!(matches!(same, TrackerError::NoChanges(_)));

        let taken = service.rename_user(adam.user_id, "Eve").await.unwrap_err();
        assert_eq!(taken.to_string(), "Another user with the name 'Eve' already exists.");

        let (old, renamed) = service.rename_user(adam.user_id, "Adam B").await.unwrap();
        assert_eq!(old, "Adam");
        assert_eq!(renamed.name, "Adam B");

        let missing = service.rename_user(999, "Nobody").await.unwrap_err();
        assert!(matches!(missing, TrackerError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_user() {
        let service = UserService::new(test_db().await);
        let adam = service.create_user("Adam").await.unwrap();

        let deleted = service.delete_user(adam.user_id).await.unwrap();
        assert_eq!(deleted.name, "Adam");
        assert!(service.list_users().await.unwrap().is_empty());
        assert!(matches!(
            service.delete_user(adam.user_id).await.unwrap_err(),
            TrackerError::NotFound(_)
        ));
    }
}
