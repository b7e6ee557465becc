use sea_orm::prelude::DatabaseConnection;
use std::sync::Arc;
use tracing::info;

use crate::entity::accounts;
use crate::error::{TrackerError, TrackerResult};
use crate::repositories::{
    account_repository::{AccountListing, AccountRepository},
    platform_repository::PlatformRepository,
    user_repository::UserRepository,
};
use crate::validation::AccountDraft;

pub struct AccountService {
    repo: AccountRepository,
    users: UserRepository,
    platforms: PlatformRepository,
}

impl AccountService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            repo: AccountRepository::new(db.clone()),
            users: UserRepository::new(db.clone()),
            platforms: PlatformRepository::new(db),
        }
    }

    pub async fn list_accounts(&self) -> TrackerResult<Vec<AccountListing>> {
        Ok(self.repo.list_with_owners().await?)
    }

    pub async fn get_account(&self, account_id: i32) -> TrackerResult<accounts::Model> {
        self.repo
            .find_by_id(account_id)
            .await?
            .ok_or_else(|| TrackerError::not_found("Account not found."))
    }

    pub async fn get_listing(&self, account_id: i32) -> TrackerResult<AccountListing> {
        self.repo.find_listing(account_id).await?.ok_or_else(|| {
            TrackerError::not_found(format!("Account with ID {} not found.", account_id))
        })
    }

    async fn check_owners(&self, draft: &AccountDraft) -> TrackerResult<()> {
        if self.users.find_by_id(draft.user_id).await?.is_none() {
            return Err(TrackerError::validation("Please select a valid user."));
        }
        if self.platforms.find_by_id(draft.platform_id).await?.is_none() {
            return Err(TrackerError::validation("Please select a valid platform."));
        }
        Ok(())
    }

    pub async fn create_account(&self, draft: &AccountDraft) -> TrackerResult<accounts::Model> {
        self.check_owners(draft).await?;
        if self.repo.find_by_name(&draft.account_name, None).await?.is_some() {
            return Err(TrackerError::conflict(format!(
                "Account with name '{}' already exists.",
                draft.account_name
            )));
        }
        let account = self.repo.create(draft).await?;
        info!("Created account {} ({})", account.account_name, account.account_id);
        Ok(account)
    }

    /// Returns the account as it was before the update plus the new row.
    pub async fn update_account(
        &self,
        account_id: i32,
        draft: &AccountDraft,
    ) -> TrackerResult<(accounts::Model, accounts::Model)> {
        let existing = self.get_account(account_id).await?;
        self.check_owners(draft).await?;
        if self
            .repo
            .find_by_name(&draft.account_name, Some(account_id))
            .await?
            .is_some()
        {
            return Err(TrackerError::conflict(format!(
                "Another account with the name '{}' already exists.",
                draft.account_name
            )));
        }

        let unchanged = existing.user_id == draft.user_id
            && existing.platform_id == draft.platform_id
            && existing.account_type == draft.account_type
            && existing.account_name == draft.account_name
            && existing.cash() == draft.cash_balance;
        if unchanged {
            return Err(TrackerError::no_changes("No changes detected for the account."));
        }

        let updated = self.repo.update(account_id, draft).await?;
        Ok((existing, updated))
    }

    /// Deletes the account and its assets.
    pub async fn delete_account(&self, account_id: i32) -> TrackerResult<accounts::Model> {
        let account = self
            .repo
            .find_by_id(account_id)
            .await?
            .ok_or_else(|| TrackerError::not_found("Account not found or already deleted."))?;
        if self.repo.delete(account_id).await? == 0 {
            return Err(TrackerError::not_found(format!(
                "Account '{}' not found or already deleted.",
                account.account_name
            )));
        }
        info!("Deleted account {} ({})", account.account_name, account.account_id);
        Ok(account)
    }
}
