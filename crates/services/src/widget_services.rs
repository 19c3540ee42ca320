use std::sync::Arc;

use storage::repository::Storage;

use crate::completion_service::CompletionService;
use crate::error::WidgetServicesError;

/// Assembles the services a hosted widget instance needs.
#[derive(Clone)]
pub struct WidgetServices {
    completion: Arc<CompletionService>,
}

impl WidgetServices {
    /// Build services from an existing storage aggregate.
    #[must_use]
    pub fn with_storage(storage: &Storage) -> Self {
        let completion = Arc::new(CompletionService::new(Arc::clone(&storage.completions)));
        Self { completion }
    }

    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `WidgetServicesError` if storage initialization fails.
    pub async fn new_sqlite(db_url: &str) -> Result<Self, WidgetServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::with_storage(&storage))
    }

    #[must_use]
    pub fn completion(&self) -> Arc<CompletionService> {
        Arc::clone(&self.completion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use track_core::model::{EvidenceSource, RoleId, UserId};

    #[tokio::test]
    async fn with_storage_wires_completion_service() {
        let storage = Storage::in_memory();
        let services = WidgetServices::with_storage(&storage);

        let record = services
            .completion()
            .completion_for_user(
                UserId::new(1),
                RoleId::STUDENT,
                EvidenceSource::CompletionTracking,
            )
            .await
            .unwrap();

        assert_eq!(record.total_courses(), 0);
    }

    #[tokio::test]
    async fn new_sqlite_runs_migrations() {
        let services =
            WidgetServices::new_sqlite("sqlite:file:memdb_services?mode=memory&cache=shared")
                .await
                .expect("connect sqlite");

        let record = services
            .completion()
            .completion_for_user(
                UserId::new(1),
                RoleId::STUDENT,
                EvidenceSource::CompletionTracking,
            )
            .await
            .unwrap();

        assert!(record.percent_completed().is_zero());
    }
}
