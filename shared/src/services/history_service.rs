use sea_orm::prelude::DatabaseConnection;
use std::sync::Arc;
use tracing::info;

use crate::entity::portfolio_history;
use crate::error::{TrackerError, TrackerResult};
use crate::repositories::history_repository::HistoryRepository;
use crate::validation::{parse_amount, parse_date};

pub struct HistoryService {
    repo: HistoryRepository,
}

impl HistoryService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            repo: HistoryRepository::new(db),
        }
    }

    /// Newest first.
    pub async fn list_snapshots(&self) -> TrackerResult<Vec<portfolio_history::Model>> {
        Ok(self.repo.list_newest_first().await?)
    }

    pub async fn get_snapshot(&self, raw_date: &str) -> TrackerResult<portfolio_history::Model> {
        let date = parse_date(raw_date)?;
        self.repo
            .find(date)
            .await?
            .ok_or_else(|| TrackerError::not_found(format!("No snapshot recorded for {}.", date)))
    }

    /// Writes the value for a day, replacing any existing one. Returns the
    /// snapshot and whether it replaced an earlier value.
    pub async fn record_snapshot(
        &self,
        raw_date: &str,
        raw_value: &str,
    ) -> TrackerResult<(portfolio_history::Model, bool)> {
        let date = parse_date(raw_date)?;
        let value = parse_amount(raw_value, "Portfolio value")?;
        let replaced = self.repo.find(date).await?.is_some();
        self.repo.upsert(date, value).await?;
        info!("Recorded snapshot {} = {:.2}", date, value);
        Ok((
            portfolio_history::Model {
                snapshot_date: date,
                total_portfolio_value: value,
            },
            replaced,
        ))
    }

    pub async fn update_snapshot(
        &self,
        raw_date: &str,
        raw_value: &str,
    ) -> TrackerResult<portfolio_history::Model> {
        let existing = self.get_snapshot(raw_date).await?;
        let value = parse_amount(raw_value, "Portfolio value")?;
        if value == existing.total_portfolio_value {
            return Err(TrackerError::no_changes("No changes made to the snapshot."));
        }
        self.repo.upsert(existing.snapshot_date, value).await?;
        Ok(portfolio_history::Model {
            snapshot_date: existing.snapshot_date,
            total_portfolio_value: value,
        })
    }

    pub async fn delete_snapshot(&self, raw_date: &str) -> TrackerResult<portfolio_history::Model> {
        let snapshot = self.get_snapshot(raw_date).await?;
        self.repo.delete(snapshot.snapshot_date).await?;
        info!("Deleted snapshot {}", snapshot.snapshot_date);
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::test_db;

    #[tokio::test]
    async fn test_record_and_list_newest_first() {
        let service = HistoryService::new(test_db().await);
        let (_, replaced) = service.record_snapshot("2025-01-01", "1000").await.unwrap();
        assert!(!replaced);
        service.record_snapshot("2025-02-01", "1500.5").await.unwrap();
        let (snapshot, replaced) = service.record_snapshot("2025-01-01", "1100").await.unwrap();
        assert!(replaced);
        assert_eq!(snapshot.total_portfolio_value, 1100.0);

        let listed = service.list_snapshots().await.unwrap();
        let values: Vec<f64> = listed.iter().map(|s| s.total_portfolio_value).collect();
        assert_eq!(values, vec![1500.5, 1100.0]);
    }

    #[tokio::test]
    async fn test_record_snapshot_validation() {
        let service = HistoryService::new(test_db().await);
        assert!(matches!(
            service.record_snapshot("01/02/2025", "10").await,
            Err(TrackerError::Validation(_))
        ));
        assert_eq!(
            service
                .record_snapshot("2025-01-01", "-1")
                .await
                .unwrap_err()
                .to_string(),
            "Portfolio value cannot be negative."
        );
    }

    #[tokio::test]
    async fn test_update_and_delete_snapshot() {
        let service = HistoryService::new(test_db().await);
        service.record_snapshot("2025-01-01", "1000").await.unwrap();

        assert!(matches!(
            service.update_snapshot("2025-01-01", "1000").await,
            Err(TrackerError::NoChanges(_))
        ));
        let updated = service.update_snapshot("2025-01-01", "900").await.unwrap();
        assert_eq!(updated.total_portfolio_value, 900.0);

        assert!(matches!(
            service.update_snapshot("2025-05-05", "1").await,
            Err(TrackerError::NotFound(_))
        ));

        service.delete_snapshot("2025-01-01").await.unwrap();
        assert!(service.list_snapshots().await.unwrap().is_empty());
        assert!(service.delete_snapshot("2025-01-01").await.is_err());
    }
}
